#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Relay domain types shared by every TestHub crate.
//!
//! Layout: `model/` (categories and artifacts), `naming.rs` (report filename derivation and
//! extension checks), `error.rs` (validation failures raised before any network call).

pub mod error;
pub mod model;
pub mod naming;

pub use error::{ValidationError, ValidationResult};
pub use model::{Artifact, Category};
pub use naming::{REPORT_SUFFIX, basename, file_extension, file_stem, report_filename};
