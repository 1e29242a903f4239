//! Role reference checks shared by role and user use cases.

use crate::role::repository::RoleRepository;
use crate::usecase::{format_names, UseCaseError, UseCaseResult};

/// Fail with a validation error unless every name is an existing role
/// (exact match). The message lists the whole request.
pub async fn ensure_roles_exist(role_repo: &RoleRepository, names: &[String]) -> UseCaseResult<()> {
    let unknown = role_repo.unknown_names(names).await?;
    if unknown.is_empty() {
        return Ok(());
    }

    tracing::debug!(unknown = ?unknown, "Rejected unknown role references");
    Err(UseCaseError::validation(
        "INVALID_ROLES",
        format!("Invalid roles provided {}", format_names(names)),
    ))
}
