use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned at the fallible edges of the list pipeline.
///
/// Filtering, metrics and pagination never fail; only query parsing, payload
/// decoding and configuration loading surface these.
#[derive(Debug, Error)]
pub enum ListError {
    /// Invalid input supplied to a query/filter/sort operation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Payload could not be decoded as JSON at all.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file was unreadable or inconsistent.
    #[error("config error: {message}")]
    Config { message: Cow<'static, str> },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ListError {
    /// Convenience helper for the common invalid-request case.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

pub type ListResult<T> = Result<T, ListError>;
