#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! HTTP surface of the TestHub relay.
//!
//! Layout: `http/` (router, handlers, problem responses, metrics middleware), `relay.rs` (the
//! [`RelayFacade`] seam handlers call through), `state.rs` (shared handler state), `error.rs`
//! (bootstrap and serve failures).

pub mod error;
pub mod http;
pub mod relay;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use relay::RelayFacade;
