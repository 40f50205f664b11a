//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use testhub_config::ServerConfig;
use testhub_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info, warn};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::{HEADER_REQUEST_ID, MULTIPART_OVERHEAD_BYTES};
use crate::http::health::{health, metrics, root};
use crate::http::results::get_results;
use crate::http::telemetry::HttpMetricsLayer;
use crate::http::upload::{upload_contract, upload_evm, upload_non_evm};
use crate::relay::RelayFacade;
use crate::state::ApiState;

/// Axum router wrapper that hosts the relay API.
pub struct ApiServer {
    router: Router,
    shutdown: CancellationToken,
}

impl ApiServer {
    /// Wire handlers, CORS, tracing, request ids, and metrics around `relay`.
    ///
    /// Cancelling `shutdown` stops the server and every in-flight report poll.
    #[must_use]
    pub fn new(
        relay: Arc<dyn RelayFacade>,
        telemetry: Metrics,
        config: &ServerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let state = Arc::new(ApiState {
            relay,
            telemetry: telemetry.clone(),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            shutdown: shutdown.clone(),
        });

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(testhub_telemetry::propagate_request_id_layer())
            .layer(testhub_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::routes()
            .layer(DefaultBodyLimit::max(
                config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            ))
            .layer(layered)
            .layer(cors_layer(&config.cors_origins))
            .with_state(state);

        Self { router, shutdown }
    }

    fn routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/", get(root))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/upload/{category}", post(upload_contract))
            .route("/upload-evm", post(upload_evm))
            .route("/upload-non-evm", post(upload_non_evm))
            .route("/results/{category}/{filename}", get(get_results))
    }

    /// The fully layered router, for embedding or in-process testing.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `addr` until the shutdown token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server terminates abnormally.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "relay api listening");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(self.shutdown.cancelled_owned())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}

/// Credentialed CORS for a fixed origin list; an empty list allows any origin without credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring CORS origin that is not a valid header value");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(methods)
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
            HeaderName::from_static(HEADER_REQUEST_ID),
        ])
        .expose_headers([HeaderName::from_static(HEADER_REQUEST_ID)])
}
