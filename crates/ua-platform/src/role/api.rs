//! Roles API
//!
//! REST endpoints for roles, their modules and module permissions.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::role::entity::{Module, Role};
use crate::role::operations::{
    AddModuleCommand, AddModuleUseCase, AddPermissionsCommand, AddPermissionsUseCase,
    CreateRoleCommand, CreateRoleUseCase, DeleteModulesCommand, DeleteModulesUseCase,
    DeletePermissionsCommand, DeletePermissionsUseCase, UpdateRoleCommand, UpdateRoleUseCase,
};
use crate::role::repository::RoleRepository;
use crate::shared::api_common::{JsonBody, MessageResponse};
use crate::shared::error::PlatformError;
use crate::usecase::{ExecutionContext, WritePolicy};

/// Roles service state
#[derive(Clone)]
pub struct RolesState {
    pub role_repo: Arc<RoleRepository>,
    pub create_use_case: Arc<CreateRoleUseCase>,
    pub update_use_case: Arc<UpdateRoleUseCase>,
    pub add_module_use_case: Arc<AddModuleUseCase>,
    pub delete_modules_use_case: Arc<DeleteModulesUseCase>,
    pub add_permissions_use_case: Arc<AddPermissionsUseCase>,
    pub delete_permissions_use_case: Arc<DeletePermissionsUseCase>,
}

impl RolesState {
    pub fn new(role_repo: Arc<RoleRepository>, policy: WritePolicy) -> Self {
        Self {
            create_use_case: Arc::new(CreateRoleUseCase::new(role_repo.clone())),
            update_use_case: Arc::new(UpdateRoleUseCase::new(role_repo.clone(), policy)),
            add_module_use_case: Arc::new(AddModuleUseCase::new(role_repo.clone(), policy)),
            delete_modules_use_case: Arc::new(DeleteModulesUseCase::new(role_repo.clone(), policy)),
            add_permissions_use_case: Arc::new(AddPermissionsUseCase::new(role_repo.clone(), policy)),
            delete_permissions_use_case: Arc::new(DeletePermissionsUseCase::new(role_repo.clone(), policy)),
            role_repo,
        }
    }
}

/// Create a new role
#[utoipa::path(
    post,
    path = "/roles",
    tag = "roles",
    request_body = Role,
    responses(
        (status = 200, description = "Role created", body = MessageResponse),
        (status = 400, description = "Validation error", body = MessageResponse),
        (status = 409, description = "A role with the same name exists", body = MessageResponse)
    )
)]
pub async fn create_role(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    JsonBody(role): JsonBody<Role>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .create_use_case
        .execute(CreateRoleCommand { role }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("Role Created successfully")))
}

/// List roles
#[utoipa::path(
    get,
    path = "/roles",
    tag = "roles",
    responses(
        (status = 200, description = "Every role, unordered", body = Vec<Role>)
    )
)]
pub async fn list_roles(State(state): State<RolesState>) -> Result<Json<Vec<Role>>, PlatformError> {
    Ok(Json(state.role_repo.find_all().await?))
}

/// Get role by name (exact match)
#[utoipa::path(
    get,
    path = "/roles/{roleName}",
    tag = "roles",
    params(
        ("roleName" = String, Path, description = "Role name")
    ),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 404, description = "Role not found", body = MessageResponse)
    )
)]
pub async fn get_role(
    State(state): State<RolesState>,
    Path(role_name): Path<String>,
) -> Result<Json<Role>, PlatformError> {
    let role = state
        .role_repo
        .find_by_name(&role_name)
        .await?
        .ok_or_else(|| PlatformError::not_found(format!("Role does not exist for {}", role_name)))?;

    Ok(Json(role))
}

/// Add child roles
#[utoipa::path(
    put,
    path = "/roles/{roleName}",
    tag = "roles",
    params(
        ("roleName" = String, Path, description = "Role name")
    ),
    request_body(content = Vec<String>, description = "Child role names"),
    responses(
        (status = 200, description = "Role updated", body = MessageResponse),
        (status = 400, description = "Unknown child roles", body = MessageResponse),
        (status = 404, description = "Role not found", body = MessageResponse)
    )
)]
pub async fn update_role(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    Path(role_name): Path<String>,
    JsonBody(child_roles): JsonBody<Vec<String>>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .update_use_case
        .execute(UpdateRoleCommand { role_name, child_roles }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("Role Updated successfully")))
}

/// Append a module to a role
#[utoipa::path(
    post,
    path = "/modules/{roleName}",
    tag = "modules",
    params(
        ("roleName" = String, Path, description = "Role name")
    ),
    request_body = Module,
    responses(
        (status = 200, description = "Module added", body = MessageResponse),
        (status = 404, description = "Role not found", body = MessageResponse)
    )
)]
pub async fn add_module(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    Path(role_name): Path<String>,
    JsonBody(module): JsonBody<Module>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .add_module_use_case
        .execute(AddModuleCommand { role_name, module }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("Module Added successfully")))
}

/// Remove modules by name
#[utoipa::path(
    delete,
    path = "/modules/{roleName}",
    tag = "modules",
    params(
        ("roleName" = String, Path, description = "Role name")
    ),
    request_body(content = Vec<String>, description = "Module names (exact match)"),
    responses(
        (status = 200, description = "Modules deleted", body = MessageResponse),
        (status = 404, description = "Role not found", body = MessageResponse)
    )
)]
pub async fn delete_modules(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    Path(role_name): Path<String>,
    JsonBody(module_names): JsonBody<Vec<String>>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .delete_modules_use_case
        .execute(DeleteModulesCommand { role_name, module_names }, ctx)
        .await?;

    Ok(Json(MessageResponse::new("Module Deleted successfully")))
}

/// Add permissions to a module
#[utoipa::path(
    post,
    path = "/permissions/{roleName}/{moduleName}",
    tag = "permissions",
    params(
        ("roleName" = String, Path, description = "Role name"),
        ("moduleName" = String, Path, description = "Module name, matched ignoring case")
    ),
    request_body(content = Vec<String>, description = "Permissions to add"),
    responses(
        (status = 200, description = "Permissions added", body = MessageResponse),
        (status = 404, description = "Role or module not found", body = MessageResponse)
    )
)]
pub async fn add_permissions(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    Path((role_name, module_name)): Path<(String, String)>,
    JsonBody(permissions): JsonBody<Vec<String>>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .add_permissions_use_case
        .execute(
            AddPermissionsCommand {
                role_name,
                module_name,
                permissions,
            },
            ctx,
        )
        .await?;

    Ok(Json(MessageResponse::new("Permission Added successfully")))
}

/// Remove permissions from a module
#[utoipa::path(
    delete,
    path = "/permissions/{roleName}/{moduleName}",
    tag = "permissions",
    params(
        ("roleName" = String, Path, description = "Role name"),
        ("moduleName" = String, Path, description = "Module name, matched ignoring case")
    ),
    request_body(content = Vec<String>, description = "Permissions to remove (exact match)"),
    responses(
        (status = 200, description = "Permissions deleted", body = MessageResponse),
        (status = 404, description = "Role or module not found", body = MessageResponse)
    )
)]
pub async fn delete_permissions(
    State(state): State<RolesState>,
    ctx: ExecutionContext,
    Path((role_name, module_name)): Path<(String, String)>,
    JsonBody(permissions): JsonBody<Vec<String>>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state
        .delete_permissions_use_case
        .execute(
            DeletePermissionsCommand {
                role_name,
                module_name,
                permissions,
            },
            ctx,
        )
        .await?;

    Ok(Json(MessageResponse::new("Permissions Deleted successfully")))
}

pub fn roles_router(state: RolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_role, list_roles))
        .routes(routes!(get_role, update_role))
        .routes(routes!(add_module, delete_modules))
        .routes(routes!(add_permissions, delete_permissions))
        .with_state(state)
}
