//! Process-wide span pipeline.
//!
//! [`Telemetry`] is built once at startup and handed to the probe loop.
//! Finished spans go to a batch processor that exports over OTLP/gRPC on
//! the Tokio runtime, so the probe cadence never waits on the collector.

use std::time::Duration;

use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Config as TraceConfig, Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use thiserror::Error;

use crate::config::Config;

/// Instrumentation scope name for probe spans.
pub const TRACER_NAME: &str = "plumbline";

/// Errors from setting up or tearing down the span pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP span pipeline: {0}")]
    Init(#[from] TraceError),

    #[error("span pipeline shutdown failed: {0}")]
    Shutdown(#[source] TraceError),

    #[error("span pipeline did not shut down within {0:?}")]
    ShutdownTimedOut(Duration),

    #[error("span pipeline shutdown task aborted")]
    ShutdownAborted,
}

/// Owned handle to the tracer provider and the probe tracer.
pub struct Telemetry {
    provider: TracerProvider,
    tracer: Tracer,
}

impl Telemetry {
    /// Build the OTLP export pipeline described by `config`.
    ///
    /// Must be called from within a Tokio runtime; the batch processor
    /// spawns its export task there.
    pub fn init_otlp(config: &Config) -> Result<Self, TelemetryError> {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(config.otel_endpoint.clone());

        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .with_trace_config(TraceConfig::default().with_resource(build_resource(config)))
            .install_batch(runtime::Tokio)?;

        tracing::info!(endpoint = %config.otel_endpoint, "OTLP span exporter configured");
        Ok(Self::from_provider(provider))
    }

    /// Wrap an already-built provider (tests use an in-memory exporter).
    pub fn from_provider(provider: TracerProvider) -> Self {
        let tracer = provider.tracer(TRACER_NAME);
        Self { provider, tracer }
    }

    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }

    /// Flush buffered spans and close the exporter, waiting at most `timeout`.
    ///
    /// The provider's shutdown blocks, so it runs on the blocking pool. If
    /// the collector hangs, the blocking task is left behind and the caller
    /// gets [`TelemetryError::ShutdownTimedOut`].
    pub async fn shutdown(self, timeout: Duration) -> Result<(), TelemetryError> {
        let Self { provider, tracer } = self;
        drop(tracer);

        let task = tokio::task::spawn_blocking(move || provider.shutdown());

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(TelemetryError::Shutdown(e)),
            Ok(Err(_)) => Err(TelemetryError::ShutdownAborted),
            Err(_) => Err(TelemetryError::ShutdownTimedOut(timeout)),
        }
    }
}

/// SDK default resource overlaid with the configured resource attributes,
/// then the service name and crate version.
fn build_resource(config: &Config) -> Resource {
    let extra = Resource::new(parse_resource_attributes(
        config.resource_attributes.as_deref().unwrap_or_default(),
    ));
    let identity = Resource::new([
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    Resource::default().merge(&extra).merge(&identity)
}

/// Parse `key=value,key=value`; malformed pairs are skipped.
fn parse_resource_attributes(raw: &str) -> Vec<KeyValue> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(KeyValue::new(key.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{Span as _, Tracer as _};
    use opentelemetry::Key;
    use opentelemetry_sdk::testing::trace::InMemorySpanExporter;

    #[test]
    fn test_resource_carries_service_identity() {
        let config = Config {
            service_name: "edge-probe".into(),
            ..Config::default()
        };
        let resource = build_resource(&config);

        assert_eq!(
            resource.get(Key::from_static_str("service.name")),
            Some("edge-probe".into())
        );
        assert_eq!(
            resource.get(Key::from_static_str("service.version")),
            Some(env!("CARGO_PKG_VERSION").into())
        );
    }

    #[test]
    fn test_parse_resource_attributes() {
        let attrs = parse_resource_attributes("team=sre, region = eu-west-1,broken,=x");
        assert_eq!(
            attrs,
            vec![
                KeyValue::new("team", "sre"),
                KeyValue::new("region", "eu-west-1"),
            ]
        );
        assert!(parse_resource_attributes("").is_empty());
    }

    #[test]
    fn test_service_name_wins_over_resource_attributes() {
        let config = Config {
            service_name: "edge-probe".into(),
            resource_attributes: Some("service.name=other,team=sre".into()),
            ..Config::default()
        };
        let resource = build_resource(&config);

        assert_eq!(
            resource.get(Key::from_static_str("service.name")),
            Some("edge-probe".into())
        );
        assert_eq!(
            resource.get(Key::from_static_str("team")),
            Some("sre".into())
        );
    }

    #[tokio::test]
    async fn test_tracer_exports_through_provider() {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let telemetry = Telemetry::from_provider(provider);

        let mut span = telemetry.tracer().start("unit");
        span.end();

        let spans = exporter.get_finished_spans().expect("exporter poisoned");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "unit");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_with_batch_processor_completes() {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .build();
        let telemetry = Telemetry::from_provider(provider);

        telemetry.tracer().start("buffered").end();

        let result = telemetry.shutdown(Duration::from_secs(5)).await;
        assert!(result.is_ok(), "shutdown failed: {result:?}");
    }
}
