//! Health Check Endpoint
//!
//! `GET /health` pings the document store and reports which backends are
//! wired in.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::store::DocumentStore;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Individual health check result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// Full health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub store_backend: String,
    pub identity_provider: String,
    pub checks: Vec<HealthCheck>,
}

/// Health service state
#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn DocumentStore>,
    pub identity_provider: &'static str,
    pub version: String,
}

impl HealthState {
    pub fn new(store: Arc<dyn DocumentStore>, identity_provider: &'static str) -> Self {
        Self {
            store,
            identity_provider,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Service health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Document store unreachable", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let start = Instant::now();
    let store_check = match state.store.ping().await {
        Ok(()) => HealthCheck {
            name: state.store.name().to_string(),
            status: HealthStatus::Up,
            message: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => HealthCheck {
            name: state.store.name().to_string(),
            status: HealthStatus::Down,
            message: Some(format!("Connection failed: {}", e)),
            duration_ms: start.elapsed().as_millis() as u64,
        },
    };

    let status = store_check.status;
    let response = HealthResponse {
        status,
        timestamp: Utc::now(),
        version: state.version.clone(),
        store_backend: state.store.name().to_string(),
        identity_provider: state.identity_provider.to_string(),
        checks: vec![store_check],
    };

    let status_code = match status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

pub fn health_router(state: HealthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_health))
        .with_state(state)
}
