//! Webcam HTTP adapter error types.

use reqwest::StatusCode;

/// Errors specific to the HTTP webcam controller.
#[derive(Debug, thiserror::Error)]
pub enum WebcamHttpError {
    /// The camera address does not form a valid URL.
    #[error("invalid camera address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The request could not be completed (connect, timeout, IO).
    #[error("webcam request failed")]
    Request(#[from] reqwest::Error),

    /// The camera answered with a non-success status.
    #[error("camera answered with status {0}")]
    Status(StatusCode),

    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    /// The HTTP client could not be constructed.
    #[error("unable to build HTTP client")]
    Client(#[source] reqwest::Error),
}

impl WebcamHttpError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures, timeouts, other request-level IO failures, 5xx
    /// answers and `429 Too Many Requests` are transient. Everything else is
    /// definitive.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            Self::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::InvalidAddress { .. } | Self::InvalidRetryPolicy(_) | Self::Client(_) => false,
        }
    }
}
