//! Create Role Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::role::entity::Role;
use crate::role::repository::RoleRepository;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

/// Command for creating a new role. The role is stored as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleCommand {
    pub role: Role,
}

/// Use case for creating a new role.
pub struct CreateRoleUseCase {
    role_repo: Arc<RoleRepository>,
}

impl CreateRoleUseCase {
    pub fn new(role_repo: Arc<RoleRepository>) -> Self {
        Self { role_repo }
    }

    pub async fn execute(
        &self,
        command: CreateRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<Role> {
        let role = command.role;

        if role.name.trim().is_empty() {
            return Err(UseCaseError::validation(
                "ROLE_NAME_REQUIRED",
                "Role name is required",
            ));
        }

        // Existence is checked ignoring case; the insert guards the exact key.
        // Two concurrent creates differing only in case can both pass.
        if self.role_repo.exists(&role.name).await? || !self.role_repo.insert(&role).await? {
            return Err(conflict(&role.name));
        }

        info!(
            role = %role.name,
            correlation_id = %ctx.correlation_id,
            "Role created"
        );

        Ok(role)
    }
}

fn conflict(name: &str) -> UseCaseError {
    UseCaseError::conflict("ROLE_EXISTS", format!("Role already exist with {}", name))
}
