//! Role Operations
//!
//! Use cases for role, module and permission management.

pub mod create;
pub mod update;
pub mod modules;
pub mod permissions;
pub mod validation;

pub use create::{CreateRoleCommand, CreateRoleUseCase};
pub use update::{UpdateRoleCommand, UpdateRoleUseCase};
pub use modules::{AddModuleCommand, AddModuleUseCase, DeleteModulesCommand, DeleteModulesUseCase};
pub use permissions::{
    AddPermissionsCommand, AddPermissionsUseCase, DeletePermissionsCommand, DeletePermissionsUseCase,
};
pub use validation::ensure_roles_exist;
