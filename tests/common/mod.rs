//! Test utilities for Plumbline tests.
//!
//! Provides:
//! - In-memory span pipeline fixture
//! - Span attribute lookup helpers
//! - An address that refuses connections

#![allow(dead_code)]

use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use plumbline::observability::telemetry::Telemetry;

/// Telemetry context whose spans land in memory, exported synchronously on end.
pub struct TestTelemetry {
    pub exporter: InMemorySpanExporter,
    pub telemetry: Telemetry,
}

impl TestTelemetry {
    pub fn new() -> Self {
        plumbline::observability::tracing::init_test_tracing();

        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        Self {
            exporter,
            telemetry: Telemetry::from_provider(provider),
        }
    }

    /// All spans that have ended so far.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter
            .get_finished_spans()
            .expect("in-memory exporter poisoned")
    }

    /// Ended spans with the given name, in end order.
    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.finished_spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }
}

impl Default for TestTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up a span attribute by key.
pub fn attr(span: &SpanData, key: &str) -> Option<Value> {
    span.attributes
        .iter()
        .find(|kv: &&KeyValue| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

/// Look up an attribute on the span's `exception` event.
pub fn exception_attr(span: &SpanData, key: &str) -> Option<Value> {
    span.events
        .events
        .iter()
        .find(|event| event.name == "exception")
        .and_then(|event| {
            event
                .attributes
                .iter()
                .find(|kv| kv.key.as_str() == key)
                .map(|kv| kv.value.clone())
        })
}

/// A local URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("no local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}
