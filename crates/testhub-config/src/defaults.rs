//! Baseline configuration values.
//!
//! # Design
//! - Mirror the production remote runner layout so an empty environment still targets it.
//! - Keep timing defaults explicit; the poll loop ticks once per interval until the timeout.

/// Address the HTTP listener binds to.
pub const BIND_ADDR: &str = "0.0.0.0:8000";
/// Base URL of the remote container API.
pub const REMOTE_URL: &str = "https://dockerapi.smarttesthub.live";
/// Directory inside the remote container that receives uploaded archives.
pub const DEPOSIT_DIR: &str = "/app/input";
/// Directory inside the remote container where reports are written.
pub const REPORTS_DIR: &str = "/app/logs/reports";
/// Path on the remote API that starts a test run.
pub const TRIGGER_PATH: &str = "/trigger-test";
/// Delay between report polls.
pub const POLL_INTERVAL_MS: u64 = 1_000;
/// Upper bound on how long a single report lookup waits.
pub const POLL_TIMEOUT_SECS: u64 = 60;
/// Timeout applied to each individual remote HTTP request.
pub const HTTP_TIMEOUT_SECS: u64 = 30;
/// Local directory receiving transient copies of uploads.
pub const UPLOAD_DIR: &str = "uploaded_contracts";
/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Log level used when neither `RUST_LOG` nor the relay override is set.
pub const LOG_LEVEL: &str = "info";
/// Browser origins allowed to call the relay.
pub const CORS_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "https://smarttest-hub.vercel.app",
    "https://smarttesthub-backend.onrender.com",
];
