//! Platform Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::idp::IdentityProviderError;
use crate::shared::api_common::MessageResponse;
use crate::store::StoreError;
use crate::usecase::UseCaseError;

/// Errors crossing the repository and HTTP boundaries.
///
/// Categorised variants render their message verbatim so callers see the
/// directory's wording; everything else is an unhandled failure and is
/// reported as 400 with the underlying message.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Concurrency { message: String },

    #[error("No implementation found for {method} {path}")]
    NoRoute { method: String, path: String },

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    IdentityProvider(#[from] IdentityProviderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn no_route(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NoRoute {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PlatformError::NotFound { .. } | PlatformError::NoRoute { .. } => StatusCode::NOT_FOUND,
            PlatformError::Conflict { .. } | PlatformError::Concurrency { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn is_unhandled(&self) -> bool {
        matches!(
            self,
            PlatformError::Store(_)
                | PlatformError::IdentityProvider(_)
                | PlatformError::Json(_)
                | PlatformError::Internal { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if self.is_unhandled() {
            warn!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(MessageResponse::new(message))).into_response()
    }
}

impl From<UseCaseError> for PlatformError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::ValidationError { message, .. } => PlatformError::Validation { message },
            UseCaseError::ConflictError { message, .. } => PlatformError::Conflict { message },
            UseCaseError::NotFoundError { message, .. } => PlatformError::NotFound { message },
            UseCaseError::ConcurrencyError { message, .. } => PlatformError::Concurrency { message },
            UseCaseError::UnhandledError { message, .. } => PlatformError::Internal { message },
        }
    }
}

impl From<PlatformError> for UseCaseError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound { message } => UseCaseError::not_found("NOT_FOUND", message),
            PlatformError::Conflict { message } => UseCaseError::conflict("CONFLICT", message),
            PlatformError::Validation { message } => UseCaseError::validation("VALIDATION_ERROR", message),
            PlatformError::Concurrency { message } => UseCaseError::concurrency("CONCURRENT_MODIFICATION", message),
            PlatformError::Store(e) => e.into(),
            PlatformError::IdentityProvider(e) => e.into(),
            other => UseCaseError::unhandled("UNHANDLED", other.to_string()),
        }
    }
}
