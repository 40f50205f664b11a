//! Sample payloads and configuration shortcuts.

use std::time::Duration;

use anyhow::Result;
use testhub_config::RemoteConfig;
use url::Url;

/// Solidity contract used by the end-to-end scenarios.
pub const CROWDFUNDING_SOL: &str = "// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

contract Crowdfunding {
    mapping(address => uint256) public contributions;

    function contribute() external payable {
        contributions[msg.sender] += msg.value;
    }
}
";

/// Report body the scripted remote hands back for the Crowdfunding contract.
pub const CROWDFUNDING_REPORT: &str = "# Crowdfunding test report

- contribute_records_value: passed
- total: 1 passed, 0 failed
";

/// Build a tar archive the way the remote container API returns a single file.
///
/// # Errors
///
/// Returns an error when `name` is not a valid entry name.
pub fn report_archive(name: &str, body: &str) -> Result<Vec<u8>> {
    Ok(testhub_archive::pack(body.as_bytes(), name)?.to_vec())
}

/// Remote configuration pointed at `base_url` with a short poll cadence.
///
/// # Errors
///
/// Returns an error when `base_url` does not parse.
pub fn fast_remote_config(base_url: &str, poll_timeout: Duration) -> Result<RemoteConfig> {
    let mut config = RemoteConfig::with_base_url(Url::parse(base_url)?);
    config.poll_interval = Duration::from_millis(20);
    config.poll_timeout = poll_timeout;
    config.request_timeout = Duration::from_secs(5);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testhub_core::Category;

    #[test]
    fn report_archive_contains_body() -> Result<()> {
        let blob = report_archive("Crowdfunding-report.md", CROWDFUNDING_REPORT)?;
        let body = testhub_archive::extract_entry(&blob, "Crowdfunding-report.md")?;
        assert_eq!(body, CROWDFUNDING_REPORT.as_bytes());
        Ok(())
    }

    #[test]
    fn fast_config_keeps_default_containers() -> Result<()> {
        let config = fast_remote_config("http://127.0.0.1:9", Duration::from_millis(200))?;
        assert_eq!(config.ticks_for(config.poll_timeout), 10);
        assert_eq!(config.container_for(Category::Evm), Some("evm-container"));
        Ok(())
    }
}
