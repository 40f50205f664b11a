#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Remote container API client and the contract relay pipeline.
//!
//! Layout: `client.rs` (deposit, trigger, report polling), `poll.rs` (poll session state),
//! `relay.rs` (`ContractRelay` composing pack, deposit, trigger, and fetch), `error.rs`.

pub mod client;
pub mod error;
mod poll;
pub mod relay;

pub use client::RemoteJobClient;
pub use error::{RelayError, RemoteError, ReportError};
pub use relay::{ContractRelay, ReportLookup, Submission};
