//! Update Role Use Case
//!
//! Unions child role names into an existing role.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::role::entity::Role;
use crate::role::repository::RoleRepository;
use super::validation::ensure_roles_exist;
use crate::usecase::{read_modify_write, ExecutionContext, UseCaseError, UseCaseResult, WritePolicy};

/// Command for adding child roles to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleCommand {
    pub role_name: String,

    /// Must all be existing role names (exact match)
    pub child_roles: Vec<String>,
}

pub struct UpdateRoleUseCase {
    role_repo: Arc<RoleRepository>,
    policy: WritePolicy,
}

impl UpdateRoleUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self { role_repo, policy }
    }

    pub async fn execute(
        &self,
        command: UpdateRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<Role> {
        // Child references are checked before the role itself
        ensure_roles_exist(&self.role_repo, &command.child_roles).await?;

        let role = read_modify_write(
            self.role_repo.as_ref(),
            &command.role_name,
            self.policy,
            || role_not_found(&command.role_name),
            |role: &mut Role| {
                role.add_child_roles(command.child_roles.iter().cloned());
                Ok(())
            },
        )
        .await?;

        info!(
            role = %role.name,
            child_roles = ?command.child_roles,
            correlation_id = %ctx.correlation_id,
            "Role child roles updated"
        );

        Ok(role)
    }
}

pub(crate) fn role_not_found(name: &str) -> UseCaseError {
    UseCaseError::not_found("ROLE_NOT_FOUND", format!("Role does not exist for {}", name))
}
