//! HTTP-call wrapper for probe attempts.
//!
//! [`Fetch`] is the seam between the span emitter and the transport;
//! [`HttpProbe`] is the reqwest-backed implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;

use super::error::ProbeError;

/// Performs one GET against a URL.
///
/// The emitter runs each call on its own Tokio task, hence the `Clone` and
/// `'static` bounds.
#[async_trait]
pub trait Fetch: Clone + Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, ProbeError>;
}

/// What a completed GET looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    /// Bytes in the fully-read response body.
    pub content_length: usize,
    pub elapsed: Duration,
}

/// Issues bounded GET requests.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    fail_on_http_error: bool,
}

impl HttpProbe {
    /// Build a probe whose requests (headers and body) are bounded by `timeout`.
    pub fn new(timeout: Duration, fail_on_http_error: bool) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plumbline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            fail_on_http_error,
        })
    }

    /// GET `url` and read the whole body.
    pub async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if self.fail_on_http_error && (status.is_client_error() || status.is_server_error()) {
            return Err(ProbeError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.bytes().await?;

        Ok(ProbeResponse {
            status: status.as_u16(),
            content_length: body.len(),
            elapsed: start.elapsed(),
        })
    }
}

#[async_trait]
impl Fetch for HttpProbe {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        self.get(url).await
    }
}
