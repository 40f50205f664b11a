//! HTTP client for the remote container API.
//!
//! # Design
//! - Every remote coordinate (base URL, containers, directories, timings) comes from an injected
//!   [`RemoteConfig`].
//! - `deposit` is strict, `trigger` degrades to text, `fetch_report` returns a typed error the
//!   caller renders.
//! - Category resolution happens before any request is built.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url, header};
use serde::Serialize;
use testhub_config::RemoteConfig;
use testhub_core::Category;
use testhub_telemetry::{Metrics, PollOutcome, current_request_id};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{RemoteError, ReportError};
use crate::poll::{Observation, PollSession};

const TAR_CONTENT_TYPE: &str = "application/x-tar";

/// Client for the three remote operations used by the relay.
#[derive(Clone)]
pub struct RemoteJobClient {
    http: Client,
    config: Arc<RemoteConfig>,
    metrics: Metrics,
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    filename: &'a str,
    contract_type: &'a str,
}

impl RemoteJobClient {
    /// Build a client whose requests time out after `config.request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig, metrics: Metrics) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("testhub-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RemoteError::Transport {
                operation: "build_client",
                source,
            })?;
        Ok(Self {
            http,
            config: Arc::new(config),
            metrics,
        })
    }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn container(&self, category: Category) -> Option<&str> {
        self.config.container_for(category)
    }

    fn archive_url(&self, container: &str, path: &str) -> Option<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["containers", container, "archive"]);
        url.query_pairs_mut().append_pair("path", path);
        Some(url)
    }

    fn trigger_url(&self) -> Option<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(self.config.trigger_path.split('/').filter(|s| !s.is_empty()));
        Some(url)
    }

    /// Upload `archive` into the deposit directory of the category's container.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::UnknownCategory`] without touching the network when no container
    /// is mapped, [`RemoteError::DepositRejected`] for non-2xx answers, and
    /// [`RemoteError::Transport`] when the request fails outright.
    #[instrument(name = "remote.deposit", skip(self, archive), fields(bytes = archive.len()))]
    pub async fn deposit(&self, archive: Bytes, category: Category) -> Result<(), RemoteError> {
        let container = self
            .container(category)
            .ok_or(RemoteError::UnknownCategory { category })?;
        let url = self
            .archive_url(container, &self.config.deposit_dir)
            .ok_or_else(|| RemoteError::InvalidBaseUrl {
                url: self.config.base_url.to_string(),
            })?;

        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, TAR_CONTENT_TYPE)
            .body(archive)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                operation: "deposit",
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%container, status = status.as_u16(), "remote rejected archive deposit");
            return Err(RemoteError::DepositRejected {
                container: container.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        info!(%container, dir = %self.config.deposit_dir, "archive deposited");
        Ok(())
    }

    /// Ask the remote to start testing `filename`; returns the remote's log text.
    ///
    /// Failures are returned as descriptive text rather than errors.
    pub async fn trigger(&self, filename: &str, category: Category) -> String {
        self.try_trigger(filename, category)
            .await
            .unwrap_or_else(|failure| failure)
    }

    /// Like [`Self::trigger`], but keeps success and failure text apart.
    #[instrument(name = "remote.trigger", skip(self))]
    pub(crate) async fn try_trigger(
        &self,
        filename: &str,
        category: Category,
    ) -> Result<String, String> {
        let Some(url) = self.trigger_url() else {
            return Err(format!(
                "Remote execution failed: invalid base url {}",
                self.config.base_url
            ));
        };
        let request = TriggerRequest {
            filename,
            contract_type: category.as_str(),
        };
        match self.http.post(url).json(&request).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    debug!(status = status.as_u16(), "test run triggered");
                    Ok(body)
                } else {
                    warn!(status = status.as_u16(), "remote trigger returned failure");
                    Err(format!("Remote execution failed: {} - {body}", status.as_u16()))
                }
            }
            Err(err) => {
                warn!(error = %err, "remote trigger request failed");
                Err(format!("Remote execution failed: {err}"))
            }
        }
    }

    /// Poll for `report_filename` until it appears, `timeout` elapses, or `cancel` fires.
    ///
    /// Issues at most `max(1, timeout / poll_interval)` requests, waiting one interval after each
    /// 404 that leaves ticks to spare. The whole lookup, requests and body reads included, ends by
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the [`ReportError`] describing why no report text was produced.
    #[instrument(
        name = "remote.fetch_report",
        skip(self, cancel),
        fields(
            timeout_ms = timeout.as_millis(),
            request_id = %current_request_id().unwrap_or_default()
        )
    )]
    pub async fn fetch_report(
        &self,
        report_filename: &str,
        category: Category,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String, ReportError> {
        let container = self
            .container(category)
            .ok_or(ReportError::UnknownCategory { category })?;
        let url = self
            .archive_url(container, &self.config.report_path(report_filename))
            .ok_or_else(|| ReportError::InvalidBaseUrl {
                url: self.config.base_url.to_string(),
            })?;

        let _active = self.metrics.track_active_poll();
        let mut session =
            PollSession::new(report_filename, self.config.ticks_for(timeout), timeout);
        debug!(%url, ticks = session.ticks(), "polling for report");

        let outcome = self.poll(&mut session, url, cancel).await;
        let label = match &outcome {
            Ok(_) => PollOutcome::Found,
            Err(ReportError::TimedOut { .. }) => PollOutcome::TimedOut,
            Err(ReportError::Cancelled { .. }) => PollOutcome::Cancelled,
            Err(_) => PollOutcome::Failed,
        };
        self.metrics.inc_report_poll(label);
        if let Err(err) = &outcome {
            warn!(error = %err, ticks = session.tick(), "report lookup finished without a report");
        }
        outcome
    }

    async fn poll(
        &self,
        session: &mut PollSession,
        url: Url,
        cancel: &CancellationToken,
    ) -> Result<String, ReportError> {
        while session.has_ticks_left() {
            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(session.cancelled()),
                () = tokio::time::sleep_until(session.deadline()) => return Err(session.timed_out()),
                response = self.read_report(url.clone()) => response?,
            };
            let (status, body) = response;

            match session.observe(status, &body)? {
                Observation::Found(report) => {
                    info!(
                        filename = session.filename(),
                        ticks = session.tick() + 1,
                        "report retrieved"
                    );
                    return Ok(report);
                }
                Observation::Pending => {
                    self.metrics.inc_report_poll(PollOutcome::Pending);
                    session.advance();
                    debug!(tick = session.tick(), of = session.ticks(), "report not ready");
                    if !session.has_ticks_left() {
                        break;
                    }
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(session.cancelled()),
                        () = tokio::time::sleep_until(session.next_wake(self.config.poll_interval)) => {}
                    }
                }
            }
        }
        Err(session.timed_out())
    }

    /// One report request, body included; 404 bodies are not read.
    async fn read_report(&self, url: Url) -> Result<(StatusCode, Bytes), ReportError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ReportError::Transport { source })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status, Bytes::new()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| ReportError::Transport { source })?;
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use testhub_test_support::fixtures::fast_remote_config;

    fn client(base: &str) -> Result<RemoteJobClient> {
        let config = fast_remote_config(base, Duration::from_millis(100))?;
        Ok(RemoteJobClient::new(config, Metrics::new()?)?)
    }

    #[test]
    fn archive_url_keeps_base_path_and_encodes_query() -> Result<()> {
        let client = client("http://remote.test/docker/")?;
        let url = client
            .archive_url("evm-container", "/app/input")
            .ok_or_else(|| anyhow::anyhow!("no url"))?;
        assert_eq!(url.path(), "/docker/containers/evm-container/archive");
        let path: Vec<_> = url.query_pairs().collect();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].0, "path");
        assert_eq!(path[0].1, "/app/input");
        Ok(())
    }

    #[test]
    fn trigger_url_appends_configured_path() -> Result<()> {
        let client = client("http://remote.test")?;
        let url = client
            .trigger_url()
            .ok_or_else(|| anyhow::anyhow!("no url"))?;
        assert_eq!(url.as_str(), "http://remote.test/trigger-test");
        Ok(())
    }

    #[test]
    fn trigger_body_uses_wire_names() -> Result<()> {
        let body = serde_json::to_value(TriggerRequest {
            filename: "Crowdfunding.sol",
            contract_type: Category::Evm.as_str(),
        })?;
        assert_eq!(
            body,
            serde_json::json!({"filename": "Crowdfunding.sol", "contract_type": "evm"})
        );
        Ok(())
    }
}
