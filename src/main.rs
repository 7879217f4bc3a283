//! Plumbline: periodic HTTP probe exporting one trace span per attempt.
//!
//! # Usage
//!
//! ```bash
//! TARGET_URL=https://example.com REQUEST_INTERVAL_SECONDS=5 plumbline
//! ```
//!
//! Environment variables:
//! - `TARGET_URL`: URL to probe
//! - `REQUEST_INTERVAL_SECONDS`: Seconds between attempts (default 3)
//! - `OTEL_SERVICE_NAME`: Reported service identity
//! - `OTEL_RESOURCE_ATTRIBUTES`: Extra resource tags
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector address (default http://localhost:4317)
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use plumbline::config::Config;
use plumbline::observability::telemetry::Telemetry;
use plumbline::observability::tracing::init_tracing;
use plumbline::runner::run;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  Plumbline v{} - synthetic HTTP probe

  Configuration:
    Target:     {}
    Interval:   {}s
    Timeout:    {}s
    Service:    {}
    Collector:  {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.target_url,
        config.interval_secs,
        config.request_timeout_secs,
        config.service_name,
        config.otel_endpoint,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    init_tracing(&config.log_level, config.log_format);
    print_banner(&config);

    tracing::info!(
        target_url = %config.target_url,
        interval_secs = config.interval_secs,
        "Starting the application"
    );
    tracing::info!(service_name = %config.service_name, "OTEL_SERVICE_NAME");
    tracing::info!(
        resource_attributes = config.resource_attributes.as_deref().unwrap_or("<unset>"),
        "OTEL_RESOURCE_ATTRIBUTES"
    );
    tracing::info!(endpoint = %config.otel_endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT");

    let telemetry = Telemetry::init_otlp(&config)?;

    run(config, telemetry).await?;

    tracing::info!("Application stopped");
    Ok(())
}
