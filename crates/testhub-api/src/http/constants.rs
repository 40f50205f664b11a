//! Shared HTTP constants (headers, problem URIs, upload limits).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const NO_STORE: &str = "no-cache, no-store, must-revalidate";

pub(crate) const PROBLEM_INTERNAL: &str = "https://smarttesthub.live/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://smarttesthub.live/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://smarttesthub.live/problems/not-found";
pub(crate) const PROBLEM_UNSUPPORTED_FILE: &str =
    "https://smarttesthub.live/problems/unsupported-file-type";
pub(crate) const PROBLEM_PAYLOAD_TOO_LARGE: &str =
    "https://smarttesthub.live/problems/payload-too-large";
pub(crate) const PROBLEM_REMOTE_UNAVAILABLE: &str =
    "https://smarttesthub.live/problems/remote-unavailable";

/// Multipart form field carrying the contract.
pub(crate) const UPLOAD_FIELD: &str = "contract_file";
/// Room for multipart boundaries and part headers on top of the file limit.
pub(crate) const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024;
