//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers; parsing lives in `loader.rs` and `validate.rs`.
//! - Remote state (base URL, container mapping, paths, timings) is injected into the job client
//!   through [`RemoteConfig`] rather than read from globals, so tests can point it at a mock.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use testhub_core::Category;
use url::Url;

use crate::defaults;

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Remote container API settings.
    pub remote: RemoteConfig,
    /// Logging preferences.
    pub logging: LoggingSettings,
}

/// HTTP listener and upload handling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address the API binds to.
    pub bind_addr: SocketAddr,
    /// Browser origins allowed by the CORS layer. Empty allows any origin without credentials.
    pub cors_origins: Vec<String>,
    /// Directory receiving transient upload copies; `None` disables local copies.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origins: defaults::CORS_ORIGINS
                .iter()
                .map(|origin| (*origin).to_string())
                .collect(),
            upload_dir: Some(PathBuf::from(defaults::UPLOAD_DIR)),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

/// Settings for the remote container API and the report poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the remote container API.
    pub base_url: Url,
    /// Category to remote container identifier mapping.
    pub containers: BTreeMap<Category, String>,
    /// Directory inside the container that receives deposited archives.
    pub deposit_dir: String,
    /// Directory inside the container where reports appear.
    pub reports_dir: String,
    /// Path (relative to `base_url`) that starts a test run.
    pub trigger_path: String,
    /// Delay between report polls.
    pub poll_interval: Duration,
    /// Upper bound on a single report lookup.
    pub poll_timeout: Duration,
    /// Timeout applied to each remote HTTP request.
    pub request_timeout: Duration,
}

impl RemoteConfig {
    /// Configuration targeting `base_url` with every other setting at its default.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            containers: Category::ALL
                .into_iter()
                .map(|category| (category, category.default_container().to_string()))
                .collect(),
            deposit_dir: defaults::DEPOSIT_DIR.to_string(),
            reports_dir: defaults::REPORTS_DIR.to_string(),
            trigger_path: defaults::TRIGGER_PATH.to_string(),
            poll_interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
            poll_timeout: Duration::from_secs(defaults::POLL_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
        }
    }

    /// Remote container identifier for `category`, if one is mapped.
    #[must_use]
    pub fn container_for(&self, category: Category) -> Option<&str> {
        self.containers.get(&category).map(String::as_str)
    }

    /// Absolute path of a report inside the remote container.
    #[must_use]
    pub fn report_path(&self, report_filename: &str) -> String {
        format!(
            "{}/{}",
            self.reports_dir.trim_end_matches('/'),
            report_filename
        )
    }

    /// Number of poll ticks that fit in `timeout`; never less than one.
    #[must_use]
    pub fn ticks_for(&self, timeout: Duration) -> u32 {
        let interval = self.poll_interval.as_millis().max(1);
        let ticks = timeout.as_millis() / interval;
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}

/// Logging preferences resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format for the subscriber.
    pub format: LogFormatSetting,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: LogFormatSetting::Auto,
        }
    }
}

/// Requested log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
    /// Pretty in debug builds, JSON in release builds.
    Auto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn production() -> Result<RemoteConfig> {
        Ok(RemoteConfig::with_base_url(Url::parse(defaults::REMOTE_URL)?))
    }

    #[test]
    fn default_remote_targets_production_layout() -> Result<()> {
        let remote = production()?;
        assert_eq!(remote.base_url.as_str(), "https://dockerapi.smarttesthub.live/");
        assert_eq!(remote.container_for(Category::Evm), Some("evm-container"));
        assert_eq!(
            remote.container_for(Category::NonEvm),
            Some("non-evm-container")
        );
        assert_eq!(
            remote.report_path("Crowdfunding-report.md"),
            "/app/logs/reports/Crowdfunding-report.md"
        );
        assert_eq!(remote.ticks_for(remote.poll_timeout), 60);
        Ok(())
    }

    #[test]
    fn ticks_never_drop_below_one() -> Result<()> {
        let mut remote = production()?;
        remote.poll_interval = Duration::from_millis(250);
        assert_eq!(remote.ticks_for(Duration::from_secs(2)), 8);
        assert_eq!(remote.ticks_for(Duration::from_millis(10)), 1);
        assert_eq!(remote.ticks_for(Duration::ZERO), 1);
        Ok(())
    }
}
