use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use testhub_config::loader::container_key;
use testhub_config::{ConfigError, LogFormatSetting, RelayConfig};
use testhub_core::Category;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn overrides_apply_to_every_section() -> Result<()> {
    let starknet_key = container_key(Category::NonEvmStarknet);
    let config = RelayConfig::from_lookup(env(&[
        ("TESTHUB_BIND_ADDR", "127.0.0.1:9000"),
        ("TESTHUB_REMOTE_URL", "http://127.0.0.1:2375"),
        (starknet_key.as_str(), "cairo-runner"),
        ("TESTHUB_REPORTS_DIR", "/reports/"),
        ("TESTHUB_POLL_INTERVAL_MS", "50"),
        ("TESTHUB_POLL_TIMEOUT_SECS", "2"),
        ("TESTHUB_HTTP_TIMEOUT_SECS", "5"),
        ("TESTHUB_CORS_ORIGINS", "http://localhost:3000"),
        ("TESTHUB_UPLOAD_DIR", "/tmp/uploads"),
        ("TESTHUB_MAX_UPLOAD_BYTES", "1024"),
        ("TESTHUB_LOG_LEVEL", "debug"),
        ("TESTHUB_LOG_FORMAT", "json"),
    ]))?;

    assert_eq!(config.server.bind_addr.port(), 9000);
    assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
    assert_eq!(config.server.upload_dir, Some(PathBuf::from("/tmp/uploads")));
    assert_eq!(config.server.max_upload_bytes, 1024);

    assert_eq!(config.remote.base_url.as_str(), "http://127.0.0.1:2375/");
    assert_eq!(
        config.remote.container_for(Category::NonEvmStarknet),
        Some("cairo-runner")
    );
    assert_eq!(
        config.remote.container_for(Category::Evm),
        Some("evm-container")
    );
    assert_eq!(
        config.remote.report_path("Counter-report.md"),
        "/reports/Counter-report.md"
    );
    assert_eq!(config.remote.poll_interval, Duration::from_millis(50));
    assert_eq!(config.remote.ticks_for(config.remote.poll_timeout), 40);
    assert_eq!(config.remote.request_timeout, Duration::from_secs(5));

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormatSetting::Json);
    Ok(())
}

#[test]
fn empty_cors_list_allows_any_origin() -> Result<()> {
    let config = RelayConfig::from_lookup(env(&[("TESTHUB_CORS_ORIGINS", "")]))?;
    assert!(config.server.cors_origins.is_empty());
    Ok(())
}

#[test]
fn rejects_relative_deposit_dir() {
    let err = RelayConfig::from_lookup(env(&[("TESTHUB_DEPOSIT_DIR", "app/input")]));
    assert!(matches!(
        err,
        Err(ConfigError::InvalidField {
            reason: "must_be_absolute",
            ..
        })
    ));
}

#[test]
fn rejects_zero_timeout() {
    let err = RelayConfig::from_lookup(env(&[("TESTHUB_POLL_TIMEOUT_SECS", "0")]));
    assert!(err.is_err());
}
