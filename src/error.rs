//! Error types for Sakai direct API operations.

use thiserror::Error;

/// Errors that can occur during Sakai API operations.
#[derive(Debug, Error)]
pub enum SakaiError {
    /// Configuration is missing or incomplete.
    #[error("Sakai configuration required: {0}")]
    ConfigMissing(String),

    /// The login exchange was rejected or yielded no session cookie.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server refused a request because the session is missing or expired.
    #[error("Session is not authenticated (HTTP {status})")]
    Unauthenticated { status: u16 },

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The site has no reachable gradebook and no local cache file.
    #[error("No gradebook available for site '{site_id}'")]
    NoGradebook { site_id: String },

    /// The response body was not the JSON shape the client expects.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// API request failed.
    #[error("Sakai API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Local cache file could not be read.
    #[error("Cache read failed: {0}")]
    Cache(#[from] std::io::Error),
}

/// Ways a response body can fail to match the expected shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body is not valid JSON.
    #[error("failed to parse response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body is JSON, but not in the expected layout.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl SakaiError {
    pub(crate) fn site_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "site",
            id: id.into(),
        }
    }

    pub(crate) fn assignment_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "assignment",
            id: id.into(),
        }
    }

    pub(crate) fn unexpected_shape(message: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::UnexpectedShape(message.into()))
    }

    /// Returns true for any `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the response body could not be interpreted.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

impl From<serde_json::Error> for SakaiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(ProtocolError::InvalidJson(err))
    }
}

/// Result type alias for Sakai operations.
pub type Result<T> = core::result::Result<T, SakaiError>;
