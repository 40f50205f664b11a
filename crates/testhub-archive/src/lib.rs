#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Tar packaging used to move contracts into, and reports out of, remote containers.
//!
//! # Design
//! - Archives are built entirely in memory; nothing touches the local filesystem.
//! - Packing produces exactly one regular-file entry with a deterministic header.
//! - Extraction is tolerant of multi-entry archives and directory prefixes.

pub mod error;
mod extract;
mod pack;

pub use error::{ArchiveError, ArchiveResult};
pub use extract::{ArchiveEntry, entries, extract_entry};
pub use pack::{ENTRY_MODE, pack};
