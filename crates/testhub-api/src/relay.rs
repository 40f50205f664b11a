//! Relay abstraction used by the HTTP handlers.

use async_trait::async_trait;
use testhub_core::{Artifact, Category};
use testhub_remote::{ContractRelay, RelayError, ReportLookup, Submission};
use tokio_util::sync::CancellationToken;

/// Pipeline operations the API exposes.
#[async_trait]
pub trait RelayFacade: Send + Sync {
    /// Pack, deposit, trigger, and wait for the report of `artifact`.
    async fn submit(
        &self,
        artifact: &Artifact,
        cancel: &CancellationToken,
    ) -> Result<Submission, RelayError>;

    /// Wait for the report of a previously uploaded contract.
    async fn lookup(
        &self,
        filename: &str,
        category: Category,
        cancel: &CancellationToken,
    ) -> Result<ReportLookup, RelayError>;
}

#[async_trait]
impl RelayFacade for ContractRelay {
    async fn submit(
        &self,
        artifact: &Artifact,
        cancel: &CancellationToken,
    ) -> Result<Submission, RelayError> {
        Self::submit(self, artifact, cancel).await
    }

    async fn lookup(
        &self,
        filename: &str,
        category: Category,
        cancel: &CancellationToken,
    ) -> Result<ReportLookup, RelayError> {
        Self::lookup(self, filename, category, cancel).await
    }
}
