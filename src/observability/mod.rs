//! OpenTelemetry observability infrastructure.
//!
//! Provides:
//! - Structured logging via `tracing` (the side channel for operators)
//! - The process-wide span pipeline exporting probe spans over OTLP

pub mod telemetry;
pub mod tracing;
