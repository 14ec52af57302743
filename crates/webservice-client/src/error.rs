//! Error kinds reported by the webservice client.

use thiserror::Error;

/// Errors from the webservice client layer.
///
/// Every variant carries only owned strings so errors can be cloned into
/// route-error events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebserviceError {
    /// The configured base URL is unusable.
    #[error("Invalid webservice URL: {0}")]
    InvalidUrl(String),

    /// Nothing is listening at the webservice address.
    #[error("Connection refused by webservice at {0}")]
    ConnectionRefused(String),

    /// The webservice could not be reached for another reason (DNS, routing).
    #[error("Cannot reach webservice at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// 404 - the task or result does not exist.
    #[error("Not found")]
    NotFound,

    /// 400 - the webservice rejected the submitted data.
    #[error("{0}")]
    Invalid(String),

    /// Any other non-success status.
    #[error("Webservice error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The request failed after the connection was made (timeout, reset).
    #[error("Webservice request failed: {0}")]
    Request(String),

    /// The response body was not the expected JSON.
    #[error("Failed to decode webservice response: {0}")]
    Decode(String),
}

impl WebserviceError {
    /// Whether the backend could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionRefused(_) | Self::Unreachable { .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, WebserviceError>;
