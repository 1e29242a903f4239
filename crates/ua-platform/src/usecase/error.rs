//! Use Case Errors
//!
//! Categorized error types for use case failures.
//! Errors are categorized by type to enable consistent HTTP status mapping.
//!
//! ```ignore
//! use ua_platform::usecase::UseCaseError;
//!
//! UseCaseError::not_found("ROLE_NOT_FOUND", format!("Role does not exist for {}", name));
//! ```

/// Categorized error types for use case failures.
///
/// Each variant maps to a specific HTTP status code:
/// - `ValidationError` -> 400 Bad Request
/// - `ConflictError` -> 409 Conflict
/// - `NotFoundError` -> 404 Not Found
/// - `ConcurrencyError` -> 409 Conflict
/// - `UnhandledError` -> 400 Bad Request (raw message surfaced)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseCaseError {
    /// Unknown references or malformed input.
    ValidationError { code: String, message: String },

    /// A record with the same identity already exists.
    ConflictError { code: String, message: String },

    /// The addressed role, module or user does not exist.
    NotFoundError { code: String, message: String },

    /// Version-checked write kept losing to other writers.
    ConcurrencyError { code: String, message: String },

    /// Store or identity provider failure.
    UnhandledError { code: String, message: String },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConflictError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn concurrency(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unhandled(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnhandledError {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::ConflictError { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::ConcurrencyError { code, .. } => code,
            Self::UnhandledError { code, .. } => code,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::ConflictError { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::ConcurrencyError { message, .. } => message,
            Self::UnhandledError { message, .. } => message,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::ConflictError { .. } => 409,
            Self::NotFoundError { .. } => 404,
            Self::ConcurrencyError { .. } => 409,
            Self::UnhandledError { .. } => 400,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

impl From<crate::store::StoreError> for UseCaseError {
    fn from(err: crate::store::StoreError) -> Self {
        Self::unhandled("STORE_ERROR", err.to_string())
    }
}

impl From<crate::idp::IdentityProviderError> for UseCaseError {
    fn from(err: crate::idp::IdentityProviderError) -> Self {
        Self::unhandled("IDENTITY_PROVIDER_ERROR", err.to_string())
    }
}

/// Render names the way error messages list them: `[a, b]`.
pub fn format_names<S: AsRef<str>>(names: &[S]) -> String {
    let joined: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    format!("[{}]", joined.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = UseCaseError::validation("INVALID_ROLES", "Invalid roles provided [x]");
        assert_eq!(err.code(), "INVALID_ROLES");
        assert_eq!(err.message(), "Invalid roles provided [x]");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(UseCaseError::conflict("C", "m").http_status_code(), 409);
        assert_eq!(UseCaseError::not_found("N", "m").http_status_code(), 404);
        assert_eq!(UseCaseError::concurrency("X", "m").http_status_code(), 409);
        assert_eq!(UseCaseError::unhandled("U", "m").http_status_code(), 400);
    }

    #[test]
    fn test_store_error_is_unhandled_with_raw_message() {
        let err: UseCaseError = crate::store::StoreError::Serialization("boom".to_string()).into();
        assert!(matches!(err, UseCaseError::UnhandledError { .. }));
        assert_eq!(err.message(), "Serialization error: boom");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(format_names(&["a", "b"]), "[a, b]");
        assert_eq!(format_names::<&str>(&[]), "[]");
    }
}
