//! Probe attempts and their spans.
//!
//! - [`http`]: the [`Fetch`] seam and the bounded reqwest GET behind it
//! - [`error`]: timeout / request / unexpected classification
//! - [`emitter`]: wraps one attempt in one `probe-request` span with a
//!   nested `GET` client span

pub mod emitter;
pub mod error;
pub mod http;

pub use emitter::{SpanEmitter, CLIENT_SPAN_NAME, SPAN_NAME};
pub use error::{ErrorTier, ProbeError};
pub use http::{Fetch, HttpProbe, ProbeResponse};
