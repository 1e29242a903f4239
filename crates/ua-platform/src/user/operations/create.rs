//! Create User Use Case
//!
//! Registers the identity with the identity provider, then writes the
//! directory record. The two systems are not written atomically: when the
//! record write fails after a successful sign-up the identity stays
//! registered and the failure is logged at error level.

use std::sync::Arc;
use serde::Deserialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::idp::{IdentityProvider, SignUpRequest};
use crate::role::operations::ensure_roles_exist;
use crate::role::repository::RoleRepository;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Command for registering a new user.
#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub username: String,

    /// Forwarded to the identity provider, never stored
    pub password: String,

    pub email: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl std::fmt::Debug for CreateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserCommand")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish()
    }
}

pub struct CreateUserUseCase {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl CreateUserUseCase {
    pub fn new(
        role_repo: Arc<RoleRepository>,
        user_repo: Arc<UserRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            role_repo,
            user_repo,
            identity_provider,
        }
    }

    pub async fn execute(&self, command: CreateUserCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        for (field, value) in [
            ("Username", &command.username),
            ("Password", &command.password),
            ("Email", &command.email),
        ] {
            if value.trim().is_empty() {
                return Err(UseCaseError::validation(
                    format!("{}_REQUIRED", field.to_uppercase()),
                    format!("{} is required", field),
                ));
            }
        }

        ensure_roles_exist(&self.role_repo, &command.roles).await?;

        self.identity_provider
            .sign_up(SignUpRequest {
                username: command.username.clone(),
                password: command.password,
                email: command.email,
            })
            .await?;

        let user = User::new(command.username, command.roles);
        let inserted = match self.user_repo.insert(&user).await {
            Ok(inserted) => inserted,
            Err(e) => {
                error!(
                    username = %user.username,
                    identity_provider = self.identity_provider.name(),
                    correlation_id = %ctx.correlation_id,
                    error = %e,
                    "User record write failed after sign-up; identity left registered"
                );
                return Err(e.into());
            }
        };

        if !inserted {
            error!(
                username = %user.username,
                correlation_id = %ctx.correlation_id,
                "User record already exists after sign-up; identity left registered"
            );
            return Err(UseCaseError::conflict(
                "USER_EXISTS",
                format!("User already exist with {}", user.username),
            ));
        }

        info!(
            username = %user.username,
            roles = ?user.roles,
            correlation_id = %ctx.correlation_id,
            "User created"
        );

        Ok(user)
    }
}
