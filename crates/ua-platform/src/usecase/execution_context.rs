//! Execution Context
//!
//! Tracing IDs carried through a use case execution. Every log line a use
//! case emits includes the correlation id, so one request can be followed
//! across the store and identity provider calls it triggers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use std::convert::Infallible;

/// Header carrying an upstream correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique ID for this execution (generated)
    pub execution_id: String,
    /// ID for distributed tracing (from the request when present)
    pub correlation_id: String,
    /// When the execution was initiated
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Fresh context; the correlation id starts as the execution id.
    pub fn create() -> Self {
        let execution_id = format!("exec-{}", uuid::Uuid::new_v4());
        Self {
            correlation_id: execution_id.clone(),
            execution_id,
            initiated_at: Utc::now(),
        }
    }

    /// Context continuing an upstream correlation id.
    pub fn with_correlation(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            ..Self::create()
        }
    }
}

impl<S> FromRequestParts<S> for ExecutionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        Ok(match correlation {
            Some(id) => ExecutionContext::with_correlation(id),
            None => ExecutionContext::create(),
        })
    }
}
