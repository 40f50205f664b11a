//! # Design
//!
//! - `RemoteError` aborts a submission; `ReportError` is rendered into the response body.
//! - `ReportError` messages are user-facing text, so they carry the filename and remote detail.

use std::time::Duration;

use testhub_archive::ArchiveError;
use testhub_core::{Category, ValidationError};
use thiserror::Error;

/// Failures that abort a submission before the remote run starts.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No remote container is configured for the category.
    #[error("no remote container mapped for category '{category}'")]
    UnknownCategory {
        /// Category without a container.
        category: Category,
    },
    /// The remote answered the archive upload with a non-success status.
    #[error("upload to remote container '{container}' failed: {status} - {body}")]
    DepositRejected {
        /// Target container.
        container: String,
        /// HTTP status returned by the remote.
        status: u16,
        /// Response body returned by the remote.
        body: String,
    },
    /// The request never produced a response.
    #[error("remote request failed during {operation}")]
    Transport {
        /// Client operation that failed.
        operation: &'static str,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The configured base URL cannot carry path segments.
    #[error("remote base url cannot be used as a base")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
}

/// Outcome of a report lookup that did not yield report text.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No remote container is configured for the category.
    #[error("Unknown contract type '{category}'")]
    UnknownCategory {
        /// Category without a container.
        category: Category,
    },
    /// The report never appeared within the timeout.
    #[error("File '{filename}' not available after {}s.", .waited.as_secs_f64())]
    TimedOut {
        /// Report filename that was polled for.
        filename: String,
        /// Time spent polling, rounded to tenths of a second.
        waited: Duration,
    },
    /// The remote returned something other than a readable report archive.
    #[error("Error extracting '{filename}' from archive: {detail}")]
    Malformed {
        /// Report filename that was requested.
        filename: String,
        /// What went wrong while reading the archive.
        detail: String,
    },
    /// The remote answered with a status other than 200 or 404.
    #[error("Unexpected response {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the remote.
        status: u16,
        /// Response body returned by the remote.
        body: String,
    },
    /// The poll request never produced a response.
    #[error("Report request failed: {source}")]
    Transport {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The lookup was cancelled before the report arrived.
    #[error("Report lookup for '{filename}' was cancelled.")]
    Cancelled {
        /// Report filename that was polled for.
        filename: String,
    },
    /// The remote base URL could not be extended into a report URL.
    #[error("Invalid remote base url '{url}'")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
    },
}

impl ReportError {
    pub(crate) fn malformed(filename: &str, err: &ArchiveError) -> Self {
        let detail = match err {
            ArchiveError::EntryNotFound { .. } => "entry not found inside archive".to_string(),
            ArchiveError::Decode { source, .. } => format!("invalid tar archive ({source})"),
            other => other.to_string(),
        };
        Self::Malformed {
            filename: filename.to_string(),
            detail,
        }
    }
}

/// Failures that abort a relay submission or lookup.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upload or lookup input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The contract could not be packed into an archive.
    #[error("failed to package contract")]
    Pack {
        /// Underlying archive error.
        #[source]
        source: ArchiveError,
    },
    /// The archive could not be deposited.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
