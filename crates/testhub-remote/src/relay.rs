//! The contract relay pipeline: pack, deposit, trigger, then wait for the report.

use serde::Serialize;
use testhub_core::{Artifact, Category, report_filename};
use testhub_telemetry::{
    Metrics, RelayStep, StepOutcome, current_request_id, spawn_in_request_context,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::client::RemoteJobClient;
use crate::error::RelayError;

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Report filename derived from the artifact name.
    pub report_filename: String,
    /// Text returned by the trigger call, or its failure description.
    pub docker_logs: String,
    /// Report text, or a description of why it could not be retrieved.
    pub aggregated_report: String,
}

/// Result of a standalone report lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLookup {
    /// Report filename derived from the requested contract filename.
    pub report_filename: String,
    /// Report text, or a description of why it could not be retrieved.
    pub report: String,
}

/// Composes archive packing and the remote job client into one submission flow.
#[derive(Clone)]
pub struct ContractRelay {
    client: RemoteJobClient,
    metrics: Metrics,
}

impl ContractRelay {
    /// Wrap a configured client.
    #[must_use]
    pub const fn new(client: RemoteJobClient, metrics: Metrics) -> Self {
        Self { client, metrics }
    }

    /// The underlying remote client.
    #[must_use]
    pub const fn client(&self) -> &RemoteJobClient {
        &self.client
    }

    /// Run the full pipeline for `artifact`.
    ///
    /// Packing and deposit failures abort; trigger and report failures are folded into the
    /// returned text. The report wait runs on its own task and is cancelled with `cancel`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Pack`] or [`RelayError::Remote`] when the contract never reached the
    /// remote container.
    #[instrument(
        name = "relay.submit",
        skip_all,
        fields(
            filename = artifact.name(),
            category = %artifact.category(),
            request_id = %current_request_id().unwrap_or_default()
        )
    )]
    pub async fn submit(
        &self,
        artifact: &Artifact,
        cancel: &CancellationToken,
    ) -> Result<Submission, RelayError> {
        let report_name = artifact.report_filename()?;

        let archive = testhub_archive::pack(artifact.bytes(), artifact.name()).map_err(|source| {
            self.record(RelayStep::Pack, StepOutcome::Failed);
            RelayError::Pack { source }
        })?;
        self.record(RelayStep::Pack, StepOutcome::Ok);

        if let Err(err) = self.client.deposit(archive, artifact.category()).await {
            self.record(RelayStep::Deposit, StepOutcome::Failed);
            warn!(error = %err, "deposit failed; aborting submission");
            return Err(err.into());
        }
        self.record(RelayStep::Deposit, StepOutcome::Ok);

        let docker_logs = match self
            .client
            .try_trigger(artifact.name(), artifact.category())
            .await
        {
            Ok(logs) => {
                self.record(RelayStep::Trigger, StepOutcome::Ok);
                logs
            }
            Err(failure) => {
                self.record(RelayStep::Trigger, StepOutcome::Failed);
                failure
            }
        };

        let aggregated_report = self
            .wait_for_report(report_name.clone(), artifact.category(), cancel)
            .await;
        info!(report = %report_name, "submission complete");

        Ok(Submission {
            report_filename: report_name,
            docker_logs,
            aggregated_report,
        })
    }

    /// Look up the report for a previously uploaded `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Validation`] when no report name can be derived from `filename`.
    #[instrument(
        name = "relay.lookup",
        skip(self, cancel),
        fields(request_id = %current_request_id().unwrap_or_default())
    )]
    pub async fn lookup(
        &self,
        filename: &str,
        category: Category,
        cancel: &CancellationToken,
    ) -> Result<ReportLookup, RelayError> {
        let report_name = report_filename(filename)?;
        let report = self
            .wait_for_report(report_name.clone(), category, cancel)
            .await;
        Ok(ReportLookup {
            report_filename: report_name,
            report,
        })
    }

    async fn wait_for_report(
        &self,
        report_name: String,
        category: Category,
        cancel: &CancellationToken,
    ) -> String {
        let child = cancel.child_token();
        // Cancels the spawned poll if this future is dropped first.
        let _guard = child.clone().drop_guard();
        let client = self.client.clone();
        let timeout = client.config().poll_timeout;
        let task = spawn_in_request_context(async move {
            client
                .fetch_report(&report_name, category, timeout, &child)
                .await
        });

        let outcome = match task.await {
            Ok(result) => result,
            Err(join) => {
                self.record(RelayStep::Fetch, StepOutcome::Failed);
                warn!(error = %join, "report task did not complete");
                return format!("Report task failed: {join}");
            }
        };
        match outcome {
            Ok(report) => {
                self.record(RelayStep::Fetch, StepOutcome::Ok);
                report
            }
            Err(err) => {
                self.record(RelayStep::Fetch, StepOutcome::Failed);
                err.to_string()
            }
        }
    }

    fn record(&self, step: RelayStep, outcome: StepOutcome) {
        self.metrics.inc_relay_step(step, outcome);
    }
}
