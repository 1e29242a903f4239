//! In-process identity provider for tests and local development.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{IdentityProvider, IdentityProviderError, SignUpRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub enabled: bool,
}

/// Mirrors the managed service's observable rules: usernames are unique and
/// only registered accounts can be disabled. Passwords are not retained.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: DashMap<String, Account>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, username: &str) -> Option<Account> {
        self.accounts.get(username).map(|a| a.value().clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<(), IdentityProviderError> {
        match self.accounts.entry(request.username.clone()) {
            Entry::Occupied(_) => Err(IdentityProviderError::UsernameExists {
                username: request.username,
            }),
            Entry::Vacant(entry) => {
                entry.insert(Account {
                    email: request.email,
                    enabled: true,
                });
                Ok(())
            }
        }
    }

    async fn disable_user(&self, username: &str) -> Result<(), IdentityProviderError> {
        match self.accounts.get_mut(username) {
            Some(mut account) => {
                account.enabled = false;
                Ok(())
            }
            None => Err(IdentityProviderError::UserNotFound {
                username: username.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.to_string(),
            password: "Secret123!".to_string(),
            email: format!("{}@example.com", username),
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_disable() {
        let idp = MemoryIdentityProvider::new();
        idp.sign_up(request("alice")).await.unwrap();
        assert!(idp.account("alice").unwrap().enabled);

        idp.disable_user("alice").await.unwrap();
        assert!(!idp.account("alice").unwrap().enabled);

        // disabling twice is accepted
        idp.disable_user("alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let idp = MemoryIdentityProvider::new();
        idp.sign_up(request("alice")).await.unwrap();
        let err = idp.sign_up(request("alice")).await.unwrap_err();
        assert_eq!(err, IdentityProviderError::UsernameExists { username: "alice".to_string() });
        assert_eq!(idp.account_count(), 1);
    }

    #[tokio::test]
    async fn test_disable_unknown_user() {
        let idp = MemoryIdentityProvider::new();
        assert!(matches!(
            idp.disable_user("ghost").await,
            Err(IdentityProviderError::UserNotFound { .. })
        ));
    }

    #[test]
    fn test_sign_up_request_debug_redacts_password() {
        let rendered = format!("{:?}", request("bob"));
        assert!(!rendered.contains("Secret123!"));
        assert!(rendered.contains("bob@example.com"));
    }
}
