//! # Design
//!
//! - Constant error messages; offending values travel as fields.
//! - Decode errors keep their IO source for diagnostics.

use std::io;

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors produced while packing or reading tar archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Caller-supplied input was rejected before any archive work.
    #[error("invalid archive input")]
    InvalidInput {
        /// Input that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Writing the archive failed.
    #[error("failed to build archive")]
    Build {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The bytes could not be read as a tar archive.
    #[error("failed to decode archive")]
    Decode {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying IO error.
        source: io::Error,
    },
    /// No regular-file entry matched the requested suffix.
    #[error("archive entry not found")]
    EntryNotFound {
        /// Suffix that was searched for.
        suffix: String,
    },
}

impl ArchiveError {
    pub(crate) fn invalid_name(reason: &'static str, value: &str) -> Self {
        Self::InvalidInput {
            field: "entry_name",
            reason,
            value: Some(value.to_string()),
        }
    }

    pub(crate) const fn decode(operation: &'static str, source: io::Error) -> Self {
        Self::Decode { operation, source }
    }
}
