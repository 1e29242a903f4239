//! Users API
//!
//! REST endpoints for directory users.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::idp::IdentityProvider;
use crate::role::repository::RoleRepository;
use crate::shared::api_common::{JsonBody, MessageResponse};
use crate::shared::error::PlatformError;
use crate::usecase::{ExecutionContext, WritePolicy};
use crate::user::entity::User;
use crate::user::operations::{
    AssignRolesCommand, AssignRolesUseCase, CreateUserCommand, CreateUserUseCase, SuspendUserCommand,
    SuspendUserUseCase,
};
use crate::user::repository::UserRepository;

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
    pub create_use_case: Arc<CreateUserUseCase>,
    pub assign_roles_use_case: Arc<AssignRolesUseCase>,
    pub suspend_use_case: Arc<SuspendUserUseCase>,
}

impl UsersState {
    pub fn new(
        role_repo: Arc<RoleRepository>,
        user_repo: Arc<UserRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            create_use_case: Arc::new(CreateUserUseCase::new(
                role_repo.clone(),
                user_repo.clone(),
                identity_provider.clone(),
            )),
            assign_roles_use_case: Arc::new(AssignRolesUseCase::new(role_repo, user_repo.clone(), policy)),
            suspend_use_case: Arc::new(SuspendUserUseCase::new(user_repo.clone(), identity_provider, policy)),
            user_repo,
        }
    }
}

/// Register a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserCommand,
    responses(
        (status = 200, description = "User saved", body = MessageResponse),
        (status = 400, description = "Invalid roles or identity provider failure", body = MessageResponse),
        (status = 409, description = "User record exists", body = MessageResponse)
    )
)]
pub async fn create_user(
    State(state): State<UsersState>,
    ctx: ExecutionContext,
    JsonBody(command): JsonBody<CreateUserCommand>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state.create_use_case.execute(command, ctx).await?;
    Ok(Json(MessageResponse::new("User Saved successfully")))
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "Every user, unordered", body = Vec<User>)
    )
)]
pub async fn list_users(State(state): State<UsersState>) -> Result<Json<Vec<User>>, PlatformError> {
    Ok(Json(state.user_repo.find_all().await?))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(username): Path<String>,
) -> Result<Json<User>, PlatformError> {
    let user = state
        .user_repo
        .find_by_username(&username)
        .await?
        .ok_or_else(|| PlatformError::not_found(format!("User not found for {}", username)))?;

    Ok(Json(user))
}

/// Assign roles to a user
#[utoipa::path(
    post,
    path = "/users/{username}/roles",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    request_body(content = Vec<String>, description = "Role names"),
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Unknown roles", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn assign_roles(
    State(state): State<UsersState>,
    ctx: ExecutionContext,
    Path(username): Path<String>,
    JsonBody(roles): JsonBody<Vec<String>>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .assign_roles_use_case
        .execute(AssignRolesCommand { username, roles }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("User Updated successfully")))
}

/// Suspend a user
#[utoipa::path(
    post,
    path = "/users/{username}/suspend",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User suspended", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn suspend_user(
    State(state): State<UsersState>,
    ctx: ExecutionContext,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .suspend_use_case
        .execute(SuspendUserCommand { username }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("User Suspended successfully")))
}

pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_user, list_users))
        .routes(routes!(get_user))
        .routes(routes!(assign_roles))
        .routes(routes!(suspend_user))
        .with_state(state)
}
