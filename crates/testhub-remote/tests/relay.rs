use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use testhub_core::{Artifact, Category};
use testhub_remote::{ContractRelay, RelayError, RemoteError, RemoteJobClient};
use testhub_telemetry::Metrics;
use testhub_test_support::fixtures::{CROWDFUNDING_REPORT, CROWDFUNDING_SOL, fast_remote_config};
use testhub_test_support::{MockRemote, RemoteScript};
use tokio_util::sync::CancellationToken;

fn relay_for(remote: &MockRemote, poll_timeout: Duration) -> Result<(ContractRelay, Metrics)> {
    let metrics = Metrics::new()?;
    let config = fast_remote_config(&remote.base_url(), poll_timeout)?;
    let client = RemoteJobClient::new(config, metrics.clone())?;
    Ok((ContractRelay::new(client, metrics.clone()), metrics))
}

#[tokio::test]
async fn crowdfunding_submission_runs_every_step() -> Result<()> {
    let remote = MockRemote::start(
        RemoteScript::default()
            .with_trigger(StatusCode::OK, "forge test\n[PASS] contribute_records_value")
            .with_report(CROWDFUNDING_REPORT, 1),
    )
    .await?;
    let (relay, metrics) = relay_for(&remote, Duration::from_secs(2))?;
    let artifact = Artifact::new("Crowdfunding.sol", Category::Evm, CROWDFUNDING_SOL)?;

    let submission = relay.submit(&artifact, &CancellationToken::new()).await?;
    assert_eq!(submission.report_filename, "Crowdfunding-report.md");
    assert_eq!(
        submission.docker_logs,
        "forge test\n[PASS] contribute_records_value"
    );
    assert_eq!(submission.aggregated_report, CROWDFUNDING_REPORT);

    let deposits = remote.deposits().await;
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].container, "evm-container");
    assert_eq!(deposits[0].path.as_deref(), Some("/app/input"));
    let deposited = testhub_archive::extract_entry(&deposits[0].body, "Crowdfunding.sol")?;
    assert_eq!(deposited, CROWDFUNDING_SOL.as_bytes());

    assert_eq!(
        remote.triggers().await,
        vec![json!({"filename": "Crowdfunding.sol", "contract_type": "evm"})]
    );
    assert_eq!(remote.report_polls(), 2);
    assert_eq!(metrics.snapshot().active_polls, 0);
    Ok(())
}

#[tokio::test]
async fn rejected_deposit_aborts_before_trigger() -> Result<()> {
    let remote = MockRemote::start(
        RemoteScript::default().with_deposit_status(StatusCode::INTERNAL_SERVER_ERROR),
    )
    .await?;
    let (relay, _) = relay_for(&remote, Duration::from_secs(1))?;
    let artifact = Artifact::new("Token.wasm", Category::NonEvm, vec![0_u8, 97, 115, 109])?;

    let err = relay.submit(&artifact, &CancellationToken::new()).await;
    assert!(matches!(
        err,
        Err(RelayError::Remote(RemoteError::DepositRejected { status: 500, .. }))
    ));
    assert!(remote.triggers().await.is_empty());
    assert_eq!(remote.report_polls(), 0);
    Ok(())
}

#[tokio::test]
async fn trigger_and_report_failures_still_produce_a_submission() -> Result<()> {
    let remote = MockRemote::start(
        RemoteScript::default().with_trigger(StatusCode::BAD_GATEWAY, "no runner"),
    )
    .await?;
    let (relay, _) = relay_for(&remote, Duration::from_millis(100))?;
    let artifact = Artifact::new("Vault.cairo", Category::NonEvmStarknet, "mod vault {}")?;

    let submission = relay.submit(&artifact, &CancellationToken::new()).await?;
    assert_eq!(submission.docker_logs, "Remote execution failed: 502 - no runner");
    assert_eq!(
        submission.aggregated_report,
        "File 'Vault-report.md' not available after 0.1s."
    );
    Ok(())
}

#[tokio::test]
async fn lookup_targets_category_container() -> Result<()> {
    let remote = MockRemote::start(RemoteScript::default().with_report("token ok", 0)).await?;
    let (relay, _) = relay_for(&remote, Duration::from_secs(1))?;

    let lookup = relay
        .lookup("MyToken.txt", Category::NonEvm, &CancellationToken::new())
        .await?;
    assert_eq!(lookup.report_filename, "MyToken-report.md");
    assert_eq!(lookup.report, "token ok");
    assert_eq!(
        remote.report_requests().await,
        vec![(
            "non-evm-container".to_string(),
            "/app/logs/reports/MyToken-report.md".to_string()
        )]
    );
    Ok(())
}

#[tokio::test]
async fn lookup_rejects_names_without_stem() -> Result<()> {
    let remote = MockRemote::start(RemoteScript::default()).await?;
    let (relay, _) = relay_for(&remote, Duration::from_secs(1))?;
    let err = relay
        .lookup("contracts/", Category::Evm, &CancellationToken::new())
        .await;
    assert!(matches!(err, Err(RelayError::Validation(_))));
    assert_eq!(remote.report_polls(), 0);
    Ok(())
}

#[tokio::test]
async fn cancelled_submission_reports_cancellation() -> Result<()> {
    let remote = MockRemote::start(RemoteScript::default()).await?;
    let (relay, _) = relay_for(&remote, Duration::from_secs(30))?;
    let artifact = Artifact::new("Slow.sol", Category::Evm, "contract Slow {}")?;

    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let submission = relay.submit(&artifact, &cancel).await?;
    assert_eq!(
        submission.aggregated_report,
        "Report lookup for 'Slow-report.md' was cancelled."
    );
    Ok(())
}
