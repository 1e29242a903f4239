//! Suspend User Use Case
//!
//! Disables the identity first, then records SUSPENDED. When the record
//! write fails the identity stays disabled while the record still reads
//! ACTIVE; the failure is logged at error level.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::user_not_found;
use crate::idp::IdentityProvider;
use crate::usecase::{read_modify_write, ExecutionContext, UseCaseResult, WritePolicy};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendUserCommand {
    pub username: String,
}

pub struct SuspendUserUseCase {
    user_repo: Arc<UserRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
    policy: WritePolicy,
}

impl SuspendUserUseCase {
    pub fn new(
        user_repo: Arc<UserRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            user_repo,
            identity_provider,
            policy,
        }
    }

    /// Suspending an already suspended user repeats the disable call and
    /// succeeds.
    pub async fn execute(&self, command: SuspendUserCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        let username = command.username;

        if self.user_repo.find_by_username(&username).await?.is_none() {
            return Err(user_not_found(&username));
        }

        self.identity_provider.disable_user(&username).await?;

        let result = read_modify_write(
            self.user_repo.as_ref(),
            &username,
            self.policy,
            || user_not_found(&username),
            |user: &mut User| {
                user.suspend();
                Ok(())
            },
        )
        .await;

        match result {
            Ok(user) => {
                info!(
                    username = %user.username,
                    correlation_id = %ctx.correlation_id,
                    "User suspended"
                );
                Ok(user)
            }
            Err(e) => {
                error!(
                    username = %username,
                    identity_provider = self.identity_provider.name(),
                    correlation_id = %ctx.correlation_id,
                    error = %e,
                    "Identity disabled but user record not marked SUSPENDED"
                );
                Err(e)
            }
        }
    }
}
