//! Scripted stand-in for the remote container API.
//!
//! # Design
//! - Serves the three endpoints the relay talks to on an ephemeral localhost port.
//! - Report polls answer 404 a scripted number of times before returning a tar archive, so poll
//!   loops can be exercised end to end.
//! - Every deposit and trigger is recorded for later assertions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::fixtures::report_archive;

/// Behaviour of the scripted remote.
#[derive(Debug, Clone)]
pub struct RemoteScript {
    /// Status returned for archive uploads.
    pub deposit_status: StatusCode,
    /// Status returned by the trigger endpoint.
    pub trigger_status: StatusCode,
    /// Body returned by the trigger endpoint.
    pub trigger_body: String,
    /// Report body served once ready; `None` keeps answering 404.
    pub report: Option<String>,
    /// Number of 404 answers before the report becomes available.
    pub pending_polls: usize,
    /// Overrides the report endpoint with a fixed status and body.
    pub report_failure: Option<(StatusCode, String)>,
}

impl Default for RemoteScript {
    fn default() -> Self {
        Self {
            deposit_status: StatusCode::OK,
            trigger_status: StatusCode::OK,
            trigger_body: "forge test: 1 passed".to_string(),
            report: None,
            pending_polls: 0,
            report_failure: None,
        }
    }
}

impl RemoteScript {
    /// Serve `body` as the report after `pending_polls` 404 answers.
    #[must_use]
    pub fn with_report(mut self, body: impl Into<String>, pending_polls: usize) -> Self {
        self.report = Some(body.into());
        self.pending_polls = pending_polls;
        self
    }

    /// Answer the trigger endpoint with `status` and `body`.
    #[must_use]
    pub fn with_trigger(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.trigger_status = status;
        self.trigger_body = body.into();
        self
    }

    /// Answer archive uploads with `status`.
    #[must_use]
    pub const fn with_deposit_status(mut self, status: StatusCode) -> Self {
        self.deposit_status = status;
        self
    }

    /// Answer every report poll with `status` and `body`.
    #[must_use]
    pub fn with_report_failure(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.report_failure = Some((status, body.into()));
        self
    }
}

/// Archive upload observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    /// Container segment of the request path.
    pub container: String,
    /// `path` query parameter.
    pub path: Option<String>,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

struct MockState {
    script: RemoteScript,
    deposits: Mutex<Vec<Deposit>>,
    triggers: Mutex<Vec<Value>>,
    report_requests: Mutex<Vec<(String, String)>>,
    polls: AtomicUsize,
}

/// Running scripted remote; the server stops when this value is dropped.
pub struct MockRemote {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockRemote {
    /// Bind to an ephemeral localhost port and start serving `script`.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot be bound.
    pub async fn start(script: RemoteScript) -> Result<Self> {
        let state = Arc::new(MockState {
            script,
            deposits: Mutex::new(Vec::new()),
            triggers: Mutex::new(Vec::new()),
            report_requests: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        });
        let router = Router::new()
            .route(
                "/containers/{container}/archive",
                put(deposit_archive).get(fetch_archive),
            )
            .route("/trigger-test", post(trigger_test))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind mock remote listener")?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(Self { addr, state, task })
    }

    /// Base URL of the mock, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Archive uploads received so far.
    pub async fn deposits(&self) -> Vec<Deposit> {
        self.state.deposits.lock().await.clone()
    }

    /// JSON bodies posted to the trigger endpoint.
    pub async fn triggers(&self) -> Vec<Value> {
        self.state.triggers.lock().await.clone()
    }

    /// `(container, path)` pairs requested from the report endpoint.
    pub async fn report_requests(&self) -> Vec<(String, String)> {
        self.state.report_requests.lock().await.clone()
    }

    /// Number of report polls answered.
    #[must_use]
    pub fn report_polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }
}

impl Drop for MockRemote {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn deposit_archive(
    State(state): State<Arc<MockState>>,
    Path(container): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.deposits.lock().await.push(Deposit {
        container,
        path: query.get("path").cloned(),
        content_type,
        body: body.to_vec(),
    });
    state.script.deposit_status
}

async fn trigger_test(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.triggers.lock().await.push(payload);
    (
        state.script.trigger_status,
        state.script.trigger_body.clone(),
    )
        .into_response()
}

async fn fetch_archive(
    State(state): State<Arc<MockState>>,
    Path(container): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = query.get("path").cloned().unwrap_or_default();
    state
        .report_requests
        .lock()
        .await
        .push((container, path.clone()));
    let seen = state.polls.fetch_add(1, Ordering::SeqCst);

    if let Some((status, body)) = &state.script.report_failure {
        return (*status, body.clone()).into_response();
    }
    let Some(report) = &state.script.report else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if seen < state.script.pending_polls {
        return StatusCode::NOT_FOUND.into_response();
    }
    let name = path.rsplit('/').next().unwrap_or_default();
    match report_archive(name, report) {
        Ok(blob) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/x-tar")],
            blob,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
