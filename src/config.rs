//! Configuration parsing for the Plumbline probe.
//!
//! Supports:
//! - Environment variables (the primary interface)
//! - One long flag per variable, same name in kebab case; there are no
//!   flags without an environment counterpart
//! - Defaults for every setting, so a bare start probes the built-in target

use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Target probed when `TARGET_URL` is unset.
pub const DEFAULT_TARGET_URL: &str = "https://teams.microsoft.com/v2";

/// Service name reported when `OTEL_SERVICE_NAME` is unset.
pub const DEFAULT_SERVICE_NAME: &str = "plumbline";

/// Standard local OTLP/gRPC collector address.
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Plumbline: periodic HTTP probe exporting one trace span per attempt.
#[derive(Parser, Debug, Clone)]
#[command(name = "plumbline")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// URL to issue the GET request against
    #[arg(long, env = "TARGET_URL", default_value = DEFAULT_TARGET_URL)]
    pub target_url: String,

    /// Seconds to wait between probe attempts
    #[arg(
        long,
        env = "REQUEST_INTERVAL_SECONDS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Upper bound on a single request, body included
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// Mark 4xx/5xx responses as failed attempts
    #[arg(long, env = "FAIL_ON_HTTP_ERROR", default_value_t = false)]
    pub fail_on_http_error: bool,

    /// Service name attached to every exported span
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Extra resource tags (key=value,...); the SDK reads these itself
    #[arg(long, env = "OTEL_RESOURCE_ATTRIBUTES")]
    pub resource_attributes: Option<String>,

    /// OpenTelemetry collector endpoint for span export
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", default_value = DEFAULT_OTLP_ENDPOINT)]
    pub otel_endpoint: String,

    /// Seconds to wait for buffered spans to flush at shutdown
    #[arg(long, env = "OTEL_SHUTDOWN_TIMEOUT_SECONDS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "PLUMBLINE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    ///
    /// Exits the process with a usage error if a value cannot be parsed.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Delay between the end of one attempt and the start of the next.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.into(),
            interval_secs: 3,
            request_timeout_secs: 10,
            fail_on_http_error: false,
            service_name: DEFAULT_SERVICE_NAME.into(),
            resource_attributes: None,
            otel_endpoint: DEFAULT_OTLP_ENDPOINT.into(),
            shutdown_timeout_secs: 5,
            log_level: "info".into(),
            log_format: LogFormat::Text,
        }
    }
}
