//! Service wiring for the relay binary.
//!
//! # Design
//! - `BootstrapDependencies` gathers everything built from the environment so the boot sequence
//!   itself (`run_app_with`) only consumes injected values.
//! - One root `CancellationToken` drives graceful shutdown; request handlers and poll tasks
//!   hang child tokens off it.

use std::sync::Arc;

use testhub_api::ApiServer;
use testhub_config::{LogFormatSetting, LoggingSettings, RelayConfig};
use testhub_remote::{ContractRelay, RemoteJobClient};
use testhub_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics, build_sha};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the relay.
pub(crate) struct BootstrapDependencies {
    config: RelayConfig,
    telemetry: Metrics,
    shutdown: CancellationToken,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            RelayConfig::from_env().map_err(|err| AppError::config("relay_config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self {
            config,
            telemetry,
            shutdown: CancellationToken::new(),
        })
    }
}

/// Entry point for the relay boot sequence.
///
/// # Errors
///
/// Returns an error if configuration, logging, client construction, or the listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence that relies entirely on injected dependencies.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        telemetry,
        shutdown,
    } = dependencies;

    testhub_telemetry::init_logging(&logging_config(&config.logging))
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("testhub-relay");

    info!(
        remote = %config.remote.base_url,
        poll_interval_ms = config.remote.poll_interval.as_millis(),
        poll_timeout_secs = config.remote.poll_timeout.as_secs(),
        "relay bootstrap starting"
    );

    let client = RemoteJobClient::new(config.remote.clone(), telemetry.clone())
        .map_err(|err| AppError::remote("remote_client.new", err))?;
    let relay = ContractRelay::new(client, telemetry.clone());

    let api = ApiServer::new(
        Arc::new(relay),
        telemetry,
        &config.server,
        shutdown.clone(),
    );

    let signal_task = tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let addr = config.server.bind_addr;
    info!(addr = %addr, "launching api listener");
    let result = api
        .serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err));

    shutdown.cancel();
    signal_task.abort();
    info!("relay stopped");
    result
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => warn!(error = %err, "failed to listen for shutdown signal"),
    }
    shutdown.cancel();
}

fn logging_config(settings: &LoggingSettings) -> LoggingConfig<'_> {
    LoggingConfig {
        level: &settings.level,
        format: match settings.format {
            LogFormatSetting::Json => LogFormat::Json,
            LogFormatSetting::Pretty => LogFormat::Pretty,
            LogFormatSetting::Auto => LogFormat::infer(),
        },
        build_sha: build_sha(),
    }
}
