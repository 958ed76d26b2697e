//! Error taxonomy for client calls.
//!
//! Two layers:
//! - [`ApiFailure`] is a *value*: the payload of `Decoded::Err`, produced for
//!   business failures, non-2xx statuses and unparseable bodies.
//! - [`ApiError`] is the rejected path, reserved for requests that never
//!   produced an HTTP response (or could not be built).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::code::ResponseCode;

/// Failure classification, stable across log lines and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network unreachable, or non-2xx status.
    Transport,
    /// Envelope header carried an `rtcd` other than `S00`.
    Protocol,
    /// HTTP 401; handled centrally by navigating to the login route.
    AuthRequired,
    /// A local precondition failed before any request was made.
    Validation,
    /// Response body was not the expected JSON.
    Parse,
}

impl ErrorCategory {
    /// Machine-readable code for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT_ERROR",
            Self::Protocol => "PROTOCOL_ERROR",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Parse => "PARSE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, human-readable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub category: ErrorCategory,
    pub message: String,
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Envelope return code, for protocol failures.
    pub code: Option<ResponseCode>,
}

impl ApiFailure {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Transport,
            message: message.into(),
            status,
            code: None,
        }
    }

    pub fn protocol(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Protocol,
            message: message.into(),
            status: None,
            code: Some(code),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Parse,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Validation,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiFailure {}

/// Errors that reject a client call outright.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client configuration was unusable (bad header value, bad base URL).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Transport
    }

    /// Downgrade into a failure value for display.
    pub fn into_failure(self) -> ApiFailure {
        ApiFailure::transport(None, self.to_string())
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors loading [`crate::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
