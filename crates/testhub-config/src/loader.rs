//! Environment-backed configuration loading.
//!
//! # Design
//! - Every setting is read through an injected lookup so tests never mutate the process
//!   environment.
//! - Unset or blank variables fall back to `defaults.rs`; present-but-invalid values are errors.

use std::path::PathBuf;

use testhub_core::Category;
use tracing::debug;
use url::Url;

use crate::defaults;
use crate::error::ConfigResult;
use crate::model::{LoggingSettings, RelayConfig, RemoteConfig, ServerConfig};
use crate::validate::{
    parse_base_url, parse_container, parse_log_format, parse_millis, parse_origins,
    parse_positive, parse_remote_dir, parse_seconds, parse_socket_addr,
};

/// Prefix shared by every relay environment variable.
pub const ENV_PREFIX: &str = "TESTHUB_";

const BIND_ADDR: &str = "TESTHUB_BIND_ADDR";
const REMOTE_URL: &str = "TESTHUB_REMOTE_URL";
const DEPOSIT_DIR: &str = "TESTHUB_DEPOSIT_DIR";
const REPORTS_DIR: &str = "TESTHUB_REPORTS_DIR";
const TRIGGER_PATH: &str = "TESTHUB_TRIGGER_PATH";
const POLL_INTERVAL_MS: &str = "TESTHUB_POLL_INTERVAL_MS";
const POLL_TIMEOUT_SECS: &str = "TESTHUB_POLL_TIMEOUT_SECS";
const HTTP_TIMEOUT_SECS: &str = "TESTHUB_HTTP_TIMEOUT_SECS";
const CORS_ORIGINS: &str = "TESTHUB_CORS_ORIGINS";
const UPLOAD_DIR: &str = "TESTHUB_UPLOAD_DIR";
const MAX_UPLOAD_BYTES: &str = "TESTHUB_MAX_UPLOAD_BYTES";
const LOG_LEVEL: &str = "TESTHUB_LOG_LEVEL";
const LOG_FORMAT: &str = "TESTHUB_LOG_FORMAT";

impl RelayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] when a variable is set to an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidField`] when a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let config = Self {
            server: load_server(&env)?,
            remote: load_remote(&env)?,
            logging: load_logging(&env)?,
        };
        debug!(
            bind_addr = %config.server.bind_addr,
            remote = %config.remote.base_url,
            poll_interval_ms = config.remote.poll_interval.as_millis(),
            poll_timeout_secs = config.remote.poll_timeout.as_secs(),
            "configuration loaded"
        );
        Ok(config)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Raw value, treating blank strings as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(
        &self,
        key: &str,
        parse: impl Fn(&str, &str) -> ConfigResult<T>,
    ) -> ConfigResult<Option<T>> {
        self.get(key).map(|value| parse(key, &value)).transpose()
    }
}

fn load_server<F>(env: &Env<F>) -> ConfigResult<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut server = ServerConfig::default();
    if let Some(addr) = env.parse(BIND_ADDR, parse_socket_addr)? {
        server.bind_addr = addr;
    }
    if let Some(raw) = (env.lookup)(CORS_ORIGINS) {
        server.cors_origins = parse_origins(CORS_ORIGINS, &raw)?;
    }
    // Present but empty disables local copies entirely.
    if let Some(raw) = (env.lookup)(UPLOAD_DIR) {
        let trimmed = raw.trim();
        server.upload_dir = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
    }
    if let Some(limit) = env.parse(MAX_UPLOAD_BYTES, parse_positive)? {
        server.max_upload_bytes = usize::try_from(limit).unwrap_or(usize::MAX);
    }
    Ok(server)
}

fn load_remote<F>(env: &Env<F>) -> ConfigResult<RemoteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = match env.get(REMOTE_URL) {
        Some(raw) => parse_base_url(REMOTE_URL, &raw)?,
        None => parse_base_url(REMOTE_URL, defaults::REMOTE_URL)?,
    };
    let mut remote = RemoteConfig::with_base_url(base_url);

    for category in Category::ALL {
        let key = container_key(category);
        if let Some(container) = env.parse(&key, parse_container)? {
            remote.containers.insert(category, container);
        }
    }
    if let Some(dir) = env.parse(DEPOSIT_DIR, parse_remote_dir)? {
        remote.deposit_dir = dir;
    }
    if let Some(dir) = env.parse(REPORTS_DIR, parse_remote_dir)? {
        remote.reports_dir = dir;
    }
    if let Some(path) = env.parse(TRIGGER_PATH, parse_remote_dir)? {
        remote.trigger_path = path;
    }
    if let Some(interval) = env.parse(POLL_INTERVAL_MS, parse_millis)? {
        remote.poll_interval = interval;
    }
    if let Some(timeout) = env.parse(POLL_TIMEOUT_SECS, parse_seconds)? {
        remote.poll_timeout = timeout;
    }
    if let Some(timeout) = env.parse(HTTP_TIMEOUT_SECS, parse_seconds)? {
        remote.request_timeout = timeout;
    }
    Ok(remote)
}

fn load_logging<F>(env: &Env<F>) -> ConfigResult<LoggingSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut logging = LoggingSettings::default();
    if let Some(level) = env.get(LOG_LEVEL) {
        logging.level = level.trim().to_string();
    }
    if let Some(format) = env.parse(LOG_FORMAT, parse_log_format)? {
        logging.format = format;
    }
    Ok(logging)
}

/// Environment variable overriding the container for `category`.
#[must_use]
pub fn container_key(category: Category) -> String {
    format!("{ENV_PREFIX}CONTAINER_{}", category.env_suffix())
}

/// Parse the default remote URL; exposed for callers building a [`RemoteConfig`] by hand.
///
/// # Errors
///
/// Only fails if the compiled-in default is malformed.
pub fn default_remote_url() -> ConfigResult<Url> {
    parse_base_url(REMOTE_URL, defaults::REMOTE_URL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() -> Result<()> {
        let config = RelayConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config.server.bind_addr.to_string(), defaults::BIND_ADDR);
        assert_eq!(config.server.cors_origins.len(), 3);
        assert_eq!(config.remote.base_url, default_remote_url()?);
        assert_eq!(config.remote.poll_interval, Duration::from_secs(1));
        assert_eq!(config.remote.poll_timeout, Duration::from_secs(60));
        assert_eq!(config.remote.trigger_path, "/trigger-test");
        Ok(())
    }

    #[test]
    fn container_keys_follow_category_suffix() {
        assert_eq!(container_key(Category::Evm), "TESTHUB_CONTAINER_EVM");
        assert_eq!(
            container_key(Category::NonEvmStarknet),
            "TESTHUB_CONTAINER_NON_EVM_STARKNET"
        );
    }

    #[test]
    fn blank_upload_dir_disables_local_copies() -> Result<()> {
        let config = RelayConfig::from_lookup(lookup(&[("TESTHUB_UPLOAD_DIR", "  ")]))?;
        assert_eq!(config.server.upload_dir, None);
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let result = RelayConfig::from_lookup(lookup(&[("TESTHUB_POLL_INTERVAL_MS", "soon")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField { ref field, reason: "not_an_integer", .. })
                if field == "TESTHUB_POLL_INTERVAL_MS"
        ));
    }
}
