//! Router Assembly
//!
//! Builds the full HTTP application from injected store and identity
//! provider handles. Both the HTTP server and the gateway event adapter
//! drive the same router.

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Uri},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa_axum::router::OpenApiRouter;

use crate::idp::IdentityProvider;
use crate::role::{roles_router, RoleRepository, RolesState};
use crate::shared::error::{PlatformError, Result};
use crate::shared::health_api::{health_router, HealthState};
use crate::store::{DocumentStore, Tables};
use crate::usecase::WritePolicy;
use crate::user::{users_router, UserRepository, UsersState};

/// External collaborators and store layout.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn DocumentStore>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub tables: Tables,
    pub write_policy: WritePolicy,
}

impl AppServices {
    pub fn new(store: Arc<dyn DocumentStore>, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity_provider,
            tables: Tables::default(),
            write_policy: WritePolicy::default(),
        }
    }

    pub fn with_tables(mut self, tables: Tables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }
}

/// Response decoration and CORS.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub custom_header_name: HeaderName,
    pub custom_header_value: HeaderValue,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            custom_header_name: HeaderName::from_static("x-custom-header"),
            custom_header_value: HeaderValue::from_static("application/json"),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl RouterOptions {
    pub fn from_config(config: &ua_config::AppConfig) -> Result<Self> {
        let custom_header_name = HeaderName::try_from(config.response.custom_header_name.as_str())
            .map_err(|e| PlatformError::validation(format!("Invalid custom header name: {}", e)))?;
        let custom_header_value = HeaderValue::try_from(config.response.custom_header_value.as_str())
            .map_err(|e| PlatformError::validation(format!("Invalid custom header value: {}", e)))?;

        Ok(Self {
            custom_header_name,
            custom_header_value,
            cors_origins: config.http.cors_origins.clone(),
        })
    }

    fn cors_layer(&self) -> CorsLayer {
        let allow_origin = if self.cors_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(
                self.cors_origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the application router with every route, the unmatched-route
/// handler and response decoration.
pub fn build_router(services: AppServices, options: RouterOptions) -> Router {
    let role_repo = Arc::new(RoleRepository::new(services.store.clone(), services.tables.roles.clone()));
    let user_repo = Arc::new(UserRepository::new(services.store.clone(), services.tables.users.clone()));

    let roles_state = RolesState::new(role_repo.clone(), services.write_policy);
    let users_state = UsersState::new(
        role_repo,
        user_repo,
        services.identity_provider.clone(),
        services.write_policy,
    );
    let health_state = HealthState::new(services.store.clone(), services.identity_provider.name());

    let (router, mut openapi) = OpenApiRouter::new()
        .merge(roles_router(roles_state))
        .merge(users_router(users_state))
        .merge(health_router(health_state))
        .split_for_parts();

    openapi.info.title = "Users API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Users, roles, modules and permissions".to_string());
    let spec = Json(openapi);

    Router::new()
        .merge(router)
        .route("/openapi.json", get(move || async move { spec }))
        .fallback(no_route)
        .method_not_allowed_fallback(no_route)
        .layer(TraceLayer::new_for_http())
        .layer(options.cors_layer())
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            options.custom_header_name,
            options.custom_header_value,
        ))
}

async fn no_route(method: Method, uri: Uri) -> PlatformError {
    PlatformError::no_route(method.as_str(), uri.path())
}
