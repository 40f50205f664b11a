//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;

use testhub_telemetry::Metrics;
use tokio_util::sync::CancellationToken;

use crate::relay::RelayFacade;

pub(crate) struct ApiState {
    pub(crate) relay: Arc<dyn RelayFacade>,
    pub(crate) telemetry: Metrics,
    pub(crate) upload_dir: Option<PathBuf>,
    pub(crate) max_upload_bytes: usize,
    /// Parent of every per-request cancellation token.
    pub(crate) shutdown: CancellationToken,
}

impl ApiState {
    /// Token cancelled on server shutdown or when the returned guard's request is dropped.
    pub(crate) fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
