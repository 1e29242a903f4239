//! Identity Provider Adapters
//!
//! Credential storage and account status live in a managed identity
//! provider. The directories only need two calls from it: register a new
//! account and disable an existing one.

#[cfg(feature = "cognito")]
pub mod cognito;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "cognito")]
pub use cognito::CognitoIdentityProvider;
pub use memory::MemoryIdentityProvider;

/// Identity provider failures. Surfaced to callers verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityProviderError {
    #[error("User account already exists: {username}")]
    UsernameExists { username: String },

    #[error("User account not found: {username}")]
    UserNotFound { username: String },

    #[error("Identity provider rejected the request: {message}")]
    Rejected { message: String },

    #[error("Identity provider unavailable: {message}")]
    Unavailable { message: String },
}

/// Account registration payload.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, request: SignUpRequest) -> Result<(), IdentityProviderError>;

    /// Disable an account so it can no longer authenticate.
    async fn disable_user(&self, username: &str) -> Result<(), IdentityProviderError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
