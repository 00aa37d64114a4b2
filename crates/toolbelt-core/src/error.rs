//! Error types for toolbelt.

use thiserror::Error;
use tracing::warn;

/// Main error type for toolbelt operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(String),

    /// 401 from the remote API
    #[error("{service}: invalid credentials (HTTP 401). Check the configured API key.")]
    Unauthorized { service: String },

    /// 403 from the remote API
    #[error("{service}: permission denied (HTTP 403).")]
    Forbidden { service: String },

    /// 404 from the remote API
    #[error("{service}: resource not found (HTTP 404).")]
    NotFound { service: String },

    /// 422 from the remote API
    #[error("{service}: request rejected as invalid (HTTP 422).")]
    Unprocessable { service: String },

    /// 429 from the remote API
    #[error("{service}: rate limit exceeded (HTTP 429). Try again later.")]
    RateLimited { service: String },

    /// Any other non-success status
    #[error("{service} API error: {status} - {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// A paginated lookup ran out of pages without a match
    #[error("{what} '{id}' not found after scanning {pages} page(s)")]
    ScanExhausted {
        what: String,
        id: String,
        pages: usize,
    },

    /// Tool input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Response could not be interpreted
    #[error("Invalid response data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a non-success HTTP status to an error.
    ///
    /// The documented statuses (401, 403, 404, 422, 429) produce fixed messages;
    /// their response bodies are only logged.
    pub fn from_status(service: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let service = service.to_string();

        match status {
            401 | 403 | 404 | 422 | 429 => {
                warn!(service = %service, status, body = %body, "API error response");
            }
            _ => {}
        }

        match status {
            401 => Error::Unauthorized { service },
            403 => Error::Forbidden { service },
            404 => Error::NotFound { service },
            422 => Error::Unprocessable { service },
            429 => Error::RateLimited { service },
            _ => Error::Api {
                service,
                status,
                message: body,
            },
        }
    }

    /// HTTP status this error was mapped from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::Forbidden { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::Unprocessable { .. } => Some(422),
            Error::RateLimited { .. } => Some(429),
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for toolbelt operations.
pub type Result<T> = std::result::Result<T, Error>;
