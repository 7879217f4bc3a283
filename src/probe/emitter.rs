//! Span emitter: one probe attempt, one closed `probe-request` span.
//!
//! The HTTP call itself is traced as a `GET` client span nested under the
//! attempt span, the way HTTP client instrumentation would record it.

use std::time::Instant;

use async_trait::async_trait;
use opentelemetry::trace::{Span, SpanKind, SpanRef, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::Tracer;

use super::error::ProbeError;
use super::http::{Fetch, HttpProbe, ProbeResponse};
use crate::runner::Probe;

/// Name of the span wrapping each attempt.
pub const SPAN_NAME: &str = "probe-request";

/// Name of the HTTP client span nested under [`SPAN_NAME`].
pub const CLIENT_SPAN_NAME: &str = "GET";

/// Runs probe attempts against a single target and traces each one.
pub struct SpanEmitter<F = HttpProbe> {
    tracer: Tracer,
    fetcher: F,
    target_url: String,
}

impl<F: Fetch> SpanEmitter<F> {
    pub fn new(tracer: Tracer, fetcher: F, target_url: impl Into<String>) -> Self {
        Self {
            tracer,
            fetcher,
            target_url: target_url.into(),
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Execute one attempt.
    ///
    /// The attempt span lives in `cx`, which this call owns; it ends when
    /// `cx` is dropped, so it is closed on every path out, including
    /// cancellation of this future.
    pub async fn run_probe(&self, attempt: u64) -> Result<ProbeResponse, ProbeError> {
        let cx = Context::current_with_span(self.tracer.start(SPAN_NAME));
        cx.span()
            .set_attribute(KeyValue::new("target.url", self.target_url.clone()));
        cx.span()
            .set_attribute(KeyValue::new("probe.attempt", attempt as i64));

        tracing::info!(attempt, url = %self.target_url, "Making GET request");

        let start = Instant::now();
        let result = self.traced_fetch(&cx).await;
        let elapsed = start.elapsed();

        cx.span().set_attribute(KeyValue::new(
            "probe.duration_ms",
            elapsed.as_secs_f64() * 1000.0,
        ));
        record_outcome(&cx.span(), &result);

        match &result {
            Ok(response) => tracing::info!(
                attempt,
                url = %self.target_url,
                status = response.status,
                content_length = response.content_length,
                elapsed_ms = elapsed.as_millis() as u64,
                "Request completed"
            ),
            Err(ProbeError::Timeout) => tracing::error!(
                attempt,
                url = %self.target_url,
                elapsed_ms = elapsed.as_millis() as u64,
                "Request timed out"
            ),
            Err(e @ ProbeError::Unexpected(_)) => {
                tracing::error!(attempt, error = %e, "Unexpected error during probe")
            }
            Err(e) => tracing::error!(
                attempt,
                url = %self.target_url,
                error = %e,
                "Request failed"
            ),
        }

        result
    }

    /// Run the fetch on its own task under a `GET` client span.
    ///
    /// A panic in the fetch comes back as [`ProbeError::Unexpected`].
    async fn traced_fetch(&self, parent: &Context) -> Result<ProbeResponse, ProbeError> {
        let mut client_span = self
            .tracer
            .span_builder(CLIENT_SPAN_NAME)
            .with_kind(SpanKind::Client)
            .with_attributes(vec![
                KeyValue::new("http.request.method", "GET"),
                KeyValue::new("url.full", self.target_url.clone()),
            ])
            .start_with_context(&self.tracer, parent);

        let fetcher = self.fetcher.clone();
        let url = self.target_url.clone();
        let result = match tokio::spawn(async move { fetcher.fetch(&url).await }).await {
            Ok(result) => result,
            Err(join_err) => Err(ProbeError::from(join_err)),
        };

        match &result {
            Ok(response) => client_span.set_attribute(KeyValue::new(
                "http.response.status_code",
                i64::from(response.status),
            )),
            Err(e) => {
                client_span.set_attribute(KeyValue::new("error.type", e.exception_type()));
                client_span.set_status(Status::error(e.status_message()));
            }
        }

        result
    }
}

#[async_trait]
impl<F: Fetch> Probe for SpanEmitter<F> {
    async fn probe(&self, attempt: u64) {
        // Failures are already on the span and in the log.
        let _ = self.run_probe(attempt).await;
    }
}

/// Annotate the attempt span with the result of the HTTP call.
///
/// Success leaves the status unset; every failure sets ERROR and records
/// an `exception` event.
pub fn record_outcome(span: &SpanRef<'_>, result: &Result<ProbeResponse, ProbeError>) {
    match result {
        Ok(response) => {
            span.set_attribute(KeyValue::new("http.status_code", i64::from(response.status)));
            span.set_attribute(KeyValue::new(
                "http.response.content_length",
                response.content_length as i64,
            ));
        }
        Err(e) => {
            span.set_status(Status::error(e.status_message()));
            span.add_event(
                "exception",
                vec![
                    KeyValue::new("exception.type", e.exception_type()),
                    KeyValue::new("exception.message", e.to_string()),
                ],
            );
        }
    }
}
