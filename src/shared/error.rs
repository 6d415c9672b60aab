use serde_json::Value;
use thiserror::Error;

const GENERIC_USER_MESSAGE: &str = "Something went wrong. Please try again.";
const NETWORK_USER_MESSAGE: &str = "Network error. Check your connection and try again.";
const SESSION_USER_MESSAGE: &str = "Your session has ended. Please sign in again.";

/// Coarse classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Validation,
    Transport,
    Upstream,
    Local,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthorized(_) => ErrorKind::Authentication,
            AppError::ValidationError(_) => ErrorKind::Validation,
            AppError::Network(_) => ErrorKind::Transport,
            AppError::Http { .. } | AppError::Upstream(_) | AppError::NotFound(_) => {
                ErrorKind::Upstream
            }
            _ => ErrorKind::Local,
        }
    }

    /// Transport failures are the only ones worth deferring to an offline queue.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Network(_))
    }

    /// Text suitable for a blocking alert.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized(_) => SESSION_USER_MESSAGE.to_string(),
            AppError::ValidationError(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Network(_) => NETWORK_USER_MESSAGE.to_string(),
            AppError::Http { body, .. } => {
                extract_error_detail(body).unwrap_or_else(|| GENERIC_USER_MESSAGE.to_string())
            }
            AppError::Upstream(msg) => {
                extract_error_detail(msg).unwrap_or_else(|| msg.clone())
            }
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }
}

/// Pulls the `detail` field out of a backend error body.
///
/// `detail` is either a string or an array whose items are strings or
/// validation objects carrying a `msg`. Returns `None` when the body is not
/// JSON or carries no usable detail.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map
                        .get("msg")
                        .and_then(|msg| msg.as_str())
                        .map(str::to_string),
                    _ => None,
                })
                .filter(|s| !s.trim().is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DeserializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<keyring::Error> for AppError {
    fn from(err: keyring::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
