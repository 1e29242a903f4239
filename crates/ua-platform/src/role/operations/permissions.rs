//! Permission Use Cases
//!
//! Union permissions into, or subtract them from, one module of a role.
//! The module is matched ignoring case; the first match wins.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::update::role_not_found;
use crate::role::entity::{Module, Role};
use crate::role::repository::RoleRepository;
use crate::usecase::{read_modify_write, ExecutionContext, UseCaseError, UseCaseResult, WritePolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPermissionsCommand {
    pub role_name: String,
    pub module_name: String,
    pub permissions: Vec<String>,
}

pub struct AddPermissionsUseCase {
    role_repo: Arc<RoleRepository>,
    policy: WritePolicy,
}

impl AddPermissionsUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self { role_repo, policy }
    }

    /// Returns the module as written.
    pub async fn execute(&self, command: AddPermissionsCommand, ctx: ExecutionContext) -> UseCaseResult<Module> {
        let role = read_modify_write(
            self.role_repo.as_ref(),
            &command.role_name,
            self.policy,
            || role_not_found(&command.role_name),
            |role: &mut Role| {
                module_of(role, &command.module_name)?.grant(command.permissions.iter().cloned());
                Ok(())
            },
        )
        .await?;

        info!(
            role = %role.name,
            module = %command.module_name,
            permissions = ?command.permissions,
            correlation_id = %ctx.correlation_id,
            "Permissions added"
        );

        written_module(role, &command.module_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePermissionsCommand {
    pub role_name: String,
    pub module_name: String,

    /// Exact permission strings; absent ones are ignored
    pub permissions: Vec<String>,
}

pub struct DeletePermissionsUseCase {
    role_repo: Arc<RoleRepository>,
    policy: WritePolicy,
}

impl DeletePermissionsUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self { role_repo, policy }
    }

    pub async fn execute(&self, command: DeletePermissionsCommand, ctx: ExecutionContext) -> UseCaseResult<Module> {
        let role = read_modify_write(
            self.role_repo.as_ref(),
            &command.role_name,
            self.policy,
            || role_not_found(&command.role_name),
            |role: &mut Role| {
                module_of(role, &command.module_name)?.revoke(&command.permissions);
                Ok(())
            },
        )
        .await?;

        info!(
            role = %role.name,
            module = %command.module_name,
            permissions = ?command.permissions,
            correlation_id = %ctx.correlation_id,
            "Permissions deleted"
        );

        written_module(role, &command.module_name)
    }
}

fn module_of<'a>(role: &'a mut Role, module_name: &str) -> UseCaseResult<&'a mut Module> {
    role.module_mut(module_name).ok_or_else(|| module_not_found(module_name))
}

fn written_module(role: Role, module_name: &str) -> UseCaseResult<Module> {
    role.module(module_name)
        .cloned()
        .ok_or_else(|| module_not_found(module_name))
}

fn module_not_found(name: &str) -> UseCaseError {
    UseCaseError::not_found("MODULE_NOT_FOUND", format!("Module does not exist for {}", name))
}
