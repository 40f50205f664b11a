#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for a running TestHub relay.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: upload and results handlers
//! - `client.rs`: shared HTTP client and error types
//! - `output.rs`: renderers for JSON and raw report output
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
