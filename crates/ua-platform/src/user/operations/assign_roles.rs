//! Assign Roles Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::user_not_found;
use crate::role::operations::ensure_roles_exist;
use crate::role::repository::RoleRepository;
use crate::usecase::{read_modify_write, ExecutionContext, UseCaseResult, WritePolicy};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesCommand {
    pub username: String,
    pub roles: Vec<String>,
}

/// Unions role names into a user's roles. Role names are validated before
/// the user is looked up, so unknown roles are rejected whether or not the
/// user exists.
pub struct AssignRolesUseCase {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
    policy: WritePolicy,
}

impl AssignRolesUseCase {
    pub fn new(role_repo: Arc<RoleRepository>, user_repo: Arc<UserRepository>, policy: WritePolicy) -> Self {
        Self {
            role_repo,
            user_repo,
            policy,
        }
    }

    pub async fn execute(&self, command: AssignRolesCommand, ctx: ExecutionContext) -> UseCaseResult<User> {
        ensure_roles_exist(&self.role_repo, &command.roles).await?;

        let user = read_modify_write(
            self.user_repo.as_ref(),
            &command.username,
            self.policy,
            || user_not_found(&command.username),
            |user: &mut User| {
                user.assign_roles(command.roles.iter().cloned());
                Ok(())
            },
        )
        .await?;

        info!(
            username = %user.username,
            roles = ?user.roles,
            correlation_id = %ctx.correlation_id,
            "User roles assigned"
        );

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::entity::Role;
    use crate::store::MemoryDocumentStore;

    async fn setup() -> (AssignRolesUseCase, Arc<UserRepository>, Arc<MemoryDocumentStore>) {
        let store = MemoryDocumentStore::new_shared();
        let role_repo = Arc::new(RoleRepository::new(store.clone(), "Roles"));
        for name in ["a", "b"] {
            role_repo.insert(&Role::new(name)).await.unwrap();
        }
        let user_repo = Arc::new(UserRepository::new(store.clone(), "Users"));
        user_repo.insert(&User::new("jdoe", ["a", "a"])).await.unwrap();
        (
            AssignRolesUseCase::new(role_repo, user_repo.clone(), WritePolicy::default()),
            user_repo,
            store,
        )
    }

    fn command(username: &str, roles: &[&str]) -> AssignRolesCommand {
        AssignRolesCommand {
            username: username.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_assigning_is_idempotent() {
        let (use_case, user_repo, _) = setup().await;
        use_case.execute(command("jdoe", &["a"]), ExecutionContext::create()).await.unwrap();
        use_case.execute(command("jdoe", &["b", "a"]), ExecutionContext::create()).await.unwrap();

        let user = user_repo.find_by_username("jdoe").await.unwrap().unwrap();
        assert_eq!(user.roles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unknown_role_is_validation_error_for_any_user() {
        let (use_case, _, store) = setup().await;
        let writes = store.write_count();
        for username in ["jdoe", "ghost"] {
            let err = use_case
                .execute(command(username, &["missing"]), ExecutionContext::create())
                .await
                .unwrap_err();
            assert_eq!(err.http_status_code(), 400);
        }
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let (use_case, _, _) = setup().await;
        let err = use_case
            .execute(command("ghost", &["a"]), ExecutionContext::create())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.message(), "User not found for ghost");
    }
}
