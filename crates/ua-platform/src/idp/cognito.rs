//! AWS Cognito identity provider
//!
//! Sign-up goes through the public app client (`SignUp`), disable through the
//! admin API (`AdminDisableUser`) against the configured user pool.
//!
//! Credentials come from the standard AWS SDK chain (env vars, instance
//! profile, etc.).

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::AttributeType;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::{debug, info};

use super::{IdentityProvider, IdentityProviderError, SignUpRequest};

pub struct CognitoIdentityProvider {
    client: Client,
    user_pool_id: String,
    app_client_id: String,
}

impl CognitoIdentityProvider {
    /// Create a provider from SDK defaults.
    ///
    /// # Arguments
    /// * `region` - Optional AWS region (uses default chain if not specified)
    /// * `user_pool_id` - Pool used for admin operations
    /// * `app_client_id` - App client used for sign-up
    pub async fn new(
        region: Option<String>,
        user_pool_id: impl Into<String>,
        app_client_id: impl Into<String>,
    ) -> Self {
        let config = if let Some(region) = region {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region))
                .load()
                .await
        } else {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        };

        let provider = Self::with_client(Client::new(&config), user_pool_id, app_client_id);
        info!(user_pool_id = %provider.user_pool_id, "Initialized Cognito identity provider");
        provider
    }

    pub fn with_client(client: Client, user_pool_id: impl Into<String>, app_client_id: impl Into<String>) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            app_client_id: app_client_id.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<(), IdentityProviderError> {
        let email = AttributeType::builder()
            .name("email")
            .value(request.email)
            .build()
            .map_err(|e| IdentityProviderError::Rejected { message: e.to_string() })?;

        let result = self
            .client
            .sign_up()
            .client_id(&self.app_client_id)
            .username(&request.username)
            .password(request.password)
            .user_attributes(email)
            .send()
            .await;

        match result {
            Ok(output) => {
                debug!(username = %request.username, confirmed = ?output.user_confirmed(), "Cognito sign-up accepted");
                Ok(())
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_username_exists_exception() {
                    Err(IdentityProviderError::UsernameExists { username: request.username })
                } else {
                    Err(IdentityProviderError::Rejected { message: service_error.to_string() })
                }
            }
        }
    }

    async fn disable_user(&self, username: &str) -> Result<(), IdentityProviderError> {
        let result = self
            .client
            .admin_disable_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_user_not_found_exception() {
                    Err(IdentityProviderError::UserNotFound { username: username.to_string() })
                } else {
                    Err(IdentityProviderError::Unavailable { message: service_error.to_string() })
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "cognito"
    }
}
