//! Parsing helpers for configuration values.
//!
//! Each helper takes the variable name so failures point at the offending setting.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::LogFormatSetting;

/// Parse a socket address such as `0.0.0.0:8000`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not `ip:port`.
pub fn parse_socket_addr(field: &str, value: &str) -> ConfigResult<SocketAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "not_a_socket_address", value))
}

/// Parse an absolute `http`/`https` base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for unparsable URLs or unsupported schemes.
pub fn parse_base_url(field: &str, value: &str) -> ConfigResult<Url> {
    let url =
        Url::parse(value.trim()).map_err(|_| ConfigError::invalid(field, "not_a_url", value))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(field, "unsupported_scheme", value)),
    }
}

/// Parse a strictly positive integer.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_positive(field: &str, value: &str) -> ConfigResult<u64> {
    let parsed: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "not_an_integer", value))?;
    if parsed == 0 {
        return Err(ConfigError::invalid(field, "must_be_positive", value));
    }
    Ok(parsed)
}

/// Parse a positive number of seconds.
///
/// # Errors
///
/// See [`parse_positive`].
pub fn parse_seconds(field: &str, value: &str) -> ConfigResult<Duration> {
    parse_positive(field, value).map(Duration::from_secs)
}

/// Parse a positive number of milliseconds.
///
/// # Errors
///
/// See [`parse_positive`].
pub fn parse_millis(field: &str, value: &str) -> ConfigResult<Duration> {
    parse_positive(field, value).map(Duration::from_millis)
}

/// Parse an absolute path inside a remote container (`/app/input`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for relative paths or `..` segments.
pub fn parse_remote_dir(field: &str, value: &str) -> ConfigResult<String> {
    let trimmed = value.trim();
    if !trimmed.starts_with('/') {
        return Err(ConfigError::invalid(field, "must_be_absolute", value));
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(ConfigError::invalid(field, "parent_segment", value));
    }
    let normalised = trimmed.trim_end_matches('/');
    Ok(if normalised.is_empty() {
        "/".to_string()
    } else {
        normalised.to_string()
    })
}

/// Parse a container identifier override.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the identifier is empty or contains characters
/// that would alter the request path.
pub fn parse_container(field: &str, value: &str) -> ConfigResult<String> {
    let trimmed = value.trim();
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::invalid(field, "invalid_container_name", value))
    }
}

/// Parse a comma-separated origin list. Blank entries are dropped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when an entry is not an `http(s)` origin.
pub fn parse_origins(field: &str, value: &str) -> ConfigResult<Vec<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let url = parse_base_url(field, entry)?;
            if url.path() != "/" || url.query().is_some() {
                return Err(ConfigError::invalid(field, "origin_has_path", entry));
            }
            Ok(entry.trim_end_matches('/').to_string())
        })
        .collect()
}

/// Parse the log format selector.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything other than `json`, `pretty`, or `auto`.
pub fn parse_log_format(field: &str, value: &str) -> ConfigResult<LogFormatSetting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" => Ok(LogFormatSetting::Pretty),
        "auto" | "" => Ok(LogFormatSetting::Auto),
        _ => Err(ConfigError::invalid(field, "unknown_log_format", value)),
    }
}
