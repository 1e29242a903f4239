//! User Operations
//!
//! Use cases for user registration, role assignment and suspension.

pub mod create;
pub mod assign_roles;
pub mod suspend;

pub use create::{CreateUserCommand, CreateUserUseCase};
pub use assign_roles::{AssignRolesCommand, AssignRolesUseCase};
pub use suspend::{SuspendUserCommand, SuspendUserUseCase};

use crate::usecase::UseCaseError;

pub(crate) fn user_not_found(username: &str) -> UseCaseError {
    UseCaseError::not_found("USER_NOT_FOUND", format!("User not found for {}", username))
}
