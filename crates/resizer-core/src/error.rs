//! Error types module
//!
//! Every failure on the synchronous request path is classified into one `ResizerError`
//! variant. The variant decides the HTTP status, whether a client may retry, and the log
//! level used when the error is rendered.
//!
//! `From<sqlx::Error>` is gated behind the `sqlx` feature and maps to
//! `DependencyUnavailable`.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for upstream or input issues outside our control
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_REQUEST")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ResizerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Source fetch failed: {0}")]
    SourceFetch(String),

    #[error("Unprocessable source: {0}")]
    UnprocessableSource(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type ResizerResult<T> = Result<T, ResizerError>;

#[cfg(feature = "sqlx")]
impl From<SqlxError> for ResizerError {
    fn from(err: SqlxError) -> Self {
        ResizerError::DependencyUnavailable(format!("database: {}", err))
    }
}

impl From<anyhow::Error> for ResizerError {
    fn from(err: anyhow::Error) -> Self {
        ResizerError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for ResizerError {
    fn from(err: io::Error) -> Self {
        ResizerError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn static_metadata(
    err: &ResizerError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        ResizerError::InvalidRequest(_) => (
            400,
            "INVALID_REQUEST",
            false,
            Some("Check url, width, height, method, format and quality parameters"),
            false,
            LogLevel::Debug,
        ),
        ResizerError::SourceFetch(_) => (
            502,
            "SOURCE_FETCH_FAILED",
            true,
            Some("Verify the source URL is reachable"),
            false,
            LogLevel::Warn,
        ),
        ResizerError::UnprocessableSource(_) => (
            422,
            "UNPROCESSABLE_SOURCE",
            false,
            Some("The source must be a JPEG, PNG or GIF image"),
            false,
            LogLevel::Warn,
        ),
        ResizerError::InvalidGeometry(_) => (
            500,
            "INVALID_GEOMETRY",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        ResizerError::DependencyUnavailable(_) => (
            503,
            "DEPENDENCY_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        ResizerError::Internal(_) | ResizerError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ResizerError {
    /// Short variant name used in logs
    pub fn error_type(&self) -> &'static str {
        match self {
            ResizerError::InvalidRequest(_) => "InvalidRequest",
            ResizerError::SourceFetch(_) => "SourceFetch",
            ResizerError::UnprocessableSource(_) => "UnprocessableSource",
            ResizerError::InvalidGeometry(_) => "InvalidGeometry",
            ResizerError::DependencyUnavailable(_) => "DependencyUnavailable",
            ResizerError::Internal(_) => "Internal",
            ResizerError::InternalWithSource { .. } => "InternalWithSource",
        }
    }

    /// Full message including the source chain
    pub fn detailed_message(&self) -> String {
        match self {
            ResizerError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for ResizerError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            ResizerError::InvalidRequest(msg)
            | ResizerError::SourceFetch(msg)
            | ResizerError::UnprocessableSource(msg) => msg.clone(),
            ResizerError::InvalidGeometry(_) => "Failed to compute output geometry".to_string(),
            ResizerError::DependencyUnavailable(_) => {
                "A backing service is temporarily unavailable".to_string()
            }
            ResizerError::Internal(_) | ResizerError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
