#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Telemetry primitives shared across the TestHub relay.
//!
//! Centralises logging, metrics, and request-scoped tracing helpers so the API, the remote
//! client, and the binary agree on a single observability story.

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{
    GlobalContextGuard, current_request_id, current_route, spawn_in_request_context,
    with_request_context,
};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{
    ActivePollGuard, Metrics, MetricsSnapshot, PollOutcome, RelayStep, StepOutcome,
};
