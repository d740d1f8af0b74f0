/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Errors reported by the remote backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend rejected a write because the target record changed
    /// or already carries a settlement/invoice.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        /// True when the conflict means "this obligation already has an
        /// invoice/settlement" — a safe skip on retry, not a failure.
        already_settled: bool,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// HTTP middleware errors (retry layer)
    #[error("HTTP client error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        AppError::Backend(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn duplicate_settlement(msg: impl Into<String>) -> Self {
        AppError::Conflict {
            message: msg.into(),
            already_settled: true,
        }
    }

    pub fn balance_conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict {
            message: msg.into(),
            already_settled: false,
        }
    }

    /// True when the error means the obligation already carries a
    /// settlement/invoice and the write can be skipped safely.
    pub fn is_duplicate_settlement(&self) -> bool {
        matches!(
            self,
            AppError::Conflict {
                already_settled: true,
                ..
            }
        )
    }
}
