//! Module Use Cases
//!
//! Appending modules to a role and removing them by name.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::update::role_not_found;
use crate::role::entity::{Module, Role};
use crate::role::repository::RoleRepository;
use crate::usecase::{read_modify_write, ExecutionContext, UseCaseResult, WritePolicy};

/// Command for appending a module to a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddModuleCommand {
    pub role_name: String,
    pub module: Module,
}

/// Appends the module as given. Module names are not checked for
/// duplicates, so repeating the call yields two entries.
pub struct AddModuleUseCase {
    role_repo: Arc<RoleRepository>,
    policy: WritePolicy,
}

impl AddModuleUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self { role_repo, policy }
    }

    pub async fn execute(&self, command: AddModuleCommand, ctx: ExecutionContext) -> UseCaseResult<Role> {
        let role = read_modify_write(
            self.role_repo.as_ref(),
            &command.role_name,
            self.policy,
            || role_not_found(&command.role_name),
            |role: &mut Role| {
                role.add_module(command.module.clone());
                Ok(())
            },
        )
        .await?;

        info!(
            role = %role.name,
            module = %command.module.name,
            correlation_id = %ctx.correlation_id,
            "Module added"
        );

        Ok(role)
    }
}

/// Command for removing modules from a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteModulesCommand {
    pub role_name: String,

    /// Exact module names; unknown names are ignored
    pub module_names: Vec<String>,
}

pub struct DeleteModulesUseCase {
    role_repo: Arc<RoleRepository>,
    policy: WritePolicy,
}

impl DeleteModulesUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self { role_repo, policy }
    }

    pub async fn execute(&self, command: DeleteModulesCommand, ctx: ExecutionContext) -> UseCaseResult<Role> {
        let mut removed = 0;
        let role = read_modify_write(
            self.role_repo.as_ref(),
            &command.role_name,
            self.policy,
            || role_not_found(&command.role_name),
            |role: &mut Role| {
                removed = role.remove_modules(&command.module_names);
                Ok(())
            },
        )
        .await?;

        info!(
            role = %role.name,
            removed,
            correlation_id = %ctx.correlation_id,
            "Modules deleted"
        );

        Ok(role)
    }
}
