//! Logging setup.
//!
//! Configures structured logging with:
//! - Environment-based filter (RUST_LOG wins over the configured level)
//! - Text or JSON line output on stdout

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Initialize logging with the given level and format.
///
/// This sets up:
/// - Console logging with structured fields
/// - Environment-based filter (via RUST_LOG)
///
/// # Panics
///
/// Panics if logging has already been initialized.
pub fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true),
            )
            .init(),
    }

    tracing::debug!(level = log_level, ?format, "Logging initialized");
}

/// Initialize logging for tests (only logs errors).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("error")
        .with_test_writer()
        .try_init();
}
