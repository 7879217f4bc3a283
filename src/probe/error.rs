//! Failure classification for a single probe attempt.

use thiserror::Error;
use tokio::task::JoinError;

/// Coarse failure class; each tier maps to its own span status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTier {
    Timeout,
    Request,
    Unexpected,
}

/// Why a probe attempt did not produce a response.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request (headers or body) exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure: connection refused, DNS, TLS, bad response.
    #[error("{0}")]
    Request(#[source] reqwest::Error),

    /// A 4xx/5xx response while `fail_on_http_error` is enabled.
    #[error("HTTP status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Anything outside the request layer, e.g. a panic in the attempt task.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ProbeError {
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::Timeout => ErrorTier::Timeout,
            Self::Request(_) | Self::HttpStatus { .. } => ErrorTier::Request,
            Self::Unexpected(_) => ErrorTier::Unexpected,
        }
    }

    /// Description set on the span's ERROR status.
    pub fn status_message(&self) -> String {
        match self.tier() {
            ErrorTier::Timeout => "Request timed out".to_string(),
            ErrorTier::Request => self.to_string(),
            ErrorTier::Unexpected => "Unexpected error".to_string(),
        }
    }

    /// Value of `exception.type` on the recorded exception event.
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::Request(_) => "RequestError",
            Self::HttpStatus { .. } => "HttpStatusError",
            Self::Unexpected(_) => "UnexpectedError",
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

impl From<JoinError> for ProbeError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "probe task panicked".to_string());
            Self::Unexpected(message)
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}
