#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (sample contracts, report archives, fast configs), http.rs (request
//! builders), remote.rs (scripted remote container API).

pub mod fixtures;
pub mod http;
pub mod remote;

pub use remote::{Deposit, MockRemote, RemoteScript};
