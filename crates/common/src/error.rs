//! Error types for alertboard.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Session Errors ===
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Session store error: {0}")]
    Session(String),

    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Remote Errors ===
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    // === Local Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code shown to users and written to logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::Session(_) => "SESSION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error means the user has to sign in again.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Schema(err.to_string())
        } else {
            Self::ExternalService(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("Invalid URL: {err}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::AuthenticationRequired.error_code(),
            "AUTHENTICATION_REQUIRED"
        );
        assert_eq!(AppError::Schema("x".into()).error_code(), "SCHEMA_ERROR");
        assert_eq!(AppError::NotFound("n1".into()).to_string(), "Not found: n1");
    }

    #[test]
    fn test_error_classes() {
        assert!(AppError::AuthenticationRequired.is_authentication());
        assert!(!AppError::Internal("x".into()).is_authentication());
    }

    #[test]
    fn test_from_serde_json_is_schema() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Schema(_)));
    }
}
