//! Plumbline: a synthetic-monitoring probe.
//!
//! On a fixed interval Plumbline issues an HTTP GET to one target URL and
//! records the outcome as an OpenTelemetry span exported over OTLP.
//!
//! # Architecture
//!
//! - **One span per attempt**: every attempt opens exactly one
//!   `probe-request` span and closes it before the next attempt starts
//! - **Three-tier failures**: timeout, request-layer and unexpected errors
//!   each get their own ERROR status text
//! - **Decoupled export**: spans leave through a batch processor, so the
//!   probe cadence never waits on the collector
//!
//! # Modules
//!
//! - [`config`]: environment and CLI configuration
//! - [`observability`]: logging and the span pipeline
//! - [`probe`]: HTTP wrapper, error classification, span emitter
//! - [`runner`]: probe loop and shutdown handling

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // probe::error::ProbeError is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc,      // Panic docs can be verbose
    clippy::cast_possible_wrap       // Attempt counters and body sizes fit in i64
)]

pub mod config;
pub mod observability;
pub mod probe;
pub mod runner;
