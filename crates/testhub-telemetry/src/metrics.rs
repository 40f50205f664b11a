//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Relay steps and poll outcomes are typed so label values stay bounded.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, core::Collector};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across the relay.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    relay_steps_total: IntCounterVec,
    report_polls_total: IntCounterVec,
    active_polls: IntGauge,
}

/// Stage of the submit pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStep {
    /// Building the tar archive.
    Pack,
    /// Uploading the archive into the remote container.
    Deposit,
    /// Starting the remote test run.
    Trigger,
    /// Waiting for and extracting the report.
    Fetch,
}

impl RelayStep {
    /// Label value used in `relay_steps_total`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pack => "pack",
            Self::Deposit => "deposit",
            Self::Trigger => "trigger",
            Self::Fetch => "fetch",
        }
    }
}

/// Result of a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed.
    Ok,
    /// The step failed; for trigger and fetch this still yields a response.
    Failed,
}

impl StepOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }
}

/// Observation made by one report poll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The report archive was returned.
    Found,
    /// The report did not exist yet.
    Pending,
    /// The remote answered with an unexpected status or the request failed.
    Failed,
    /// The lookup gave up after its timeout.
    TimedOut,
    /// The lookup was cancelled by its caller.
    Cancelled,
}

impl PollOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Report lookups currently polling the remote.
    pub active_polls: i64,
}

/// Decrements `active_polls` when dropped.
#[must_use = "the poll is only tracked while the guard is alive"]
pub struct ActivePollGuard {
    gauge: IntGauge,
}

impl Drop for ActivePollGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "category", "code"],
        )
        .map_err(|source| collector("http_requests_total", source))?;
        let relay_steps_total = IntCounterVec::new(
            Opts::new(
                "relay_steps_total",
                "Submit pipeline steps executed by outcome",
            ),
            &["step", "outcome"],
        )
        .map_err(|source| collector("relay_steps_total", source))?;
        let report_polls_total = IntCounterVec::new(
            Opts::new("report_polls_total", "Report poll observations by outcome"),
            &["outcome"],
        )
        .map_err(|source| collector("report_polls_total", source))?;
        let active_polls = IntGauge::with_opts(Opts::new(
            "active_polls",
            "Report lookups currently waiting on the remote",
        ))
        .map_err(|source| collector("active_polls", source))?;

        register(&registry, "http_requests_total", &http_requests_total)?;
        register(&registry, "relay_steps_total", &relay_steps_total)?;
        register(&registry, "report_polls_total", &report_polls_total)?;
        register(&registry, "active_polls", &active_polls)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                relay_steps_total,
                report_polls_total,
                active_polls,
            }),
        })
    }

    /// Increment the HTTP request counter for a route template, contract category, and status.
    ///
    /// Routes that carry no category pass `"none"`.
    pub fn inc_http_request(&self, route: &str, category: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, category, &status.to_string()])
            .inc();
    }

    /// Record the outcome of one submit pipeline step.
    pub fn inc_relay_step(&self, step: RelayStep, outcome: StepOutcome) {
        self.inner
            .relay_steps_total
            .with_label_values(&[step.as_str(), outcome.as_str()])
            .inc();
    }

    /// Record the outcome of one poll observation.
    pub fn inc_report_poll(&self, outcome: PollOutcome) {
        self.inner
            .report_polls_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Mark a report lookup as in flight until the returned guard is dropped.
    pub fn track_active_poll(&self) -> ActivePollGuard {
        self.inner.active_polls.inc();
        ActivePollGuard {
            gauge: self.inner.active_polls.clone(),
        }
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_polls: self.inner.active_polls.get(),
        }
    }
}

const fn collector(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsCollector { name, source }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
