//! Request accounting middleware.
//!
//! # Design
//! - Counts every routed request by route template, contract category, and status code.
//! - Category labels come from a parsed [`Category`] so arbitrary path input never becomes a label.
//! - Runs the handler inside a request context so the relay's spawned poll task can tag its
//!   spans with the originating request id.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use axum::extract::MatchedPath;
use axum::http::Request;
use testhub_core::Category;
use testhub_telemetry::{Metrics, with_request_context};
use tower::{Layer, Service};

use crate::http::constants::HEADER_REQUEST_ID;

const NO_CATEGORY: &str = "none";
const INVALID_CATEGORY: &str = "invalid";
const UNMATCHED_ROUTE: &str = "unmatched";

/// Labels derived from one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestLabels {
    route: String,
    category: &'static str,
    request_id: String,
}

impl RequestLabels {
    fn from_request<B>(req: &Request<B>) -> Self {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
            .to_string();
        let category = category_label(&route, req.uri().path());
        let request_id = req
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Self {
            route,
            category,
            request_id,
        }
    }
}

/// Category a route operates on: fixed for the legacy upload routes, the second path segment for
/// `{category}` templates, `"none"` elsewhere.
fn category_label(route: &str, path: &str) -> &'static str {
    match route {
        "/upload-evm" => Category::Evm.as_str(),
        "/upload-non-evm" => Category::NonEvm.as_str(),
        template if template.contains("{category}") => path
            .split('/')
            .nth(2)
            .and_then(|segment| segment.parse::<Category>().ok())
            .map_or(INVALID_CATEGORY, Category::as_str),
        _ => NO_CATEGORY,
    }
}

/// Layer wrapping routed services with [`HttpMetricsService`].
#[derive(Clone)]
pub(crate) struct HttpMetricsLayer {
    telemetry: Metrics,
}

impl HttpMetricsLayer {
    pub(crate) const fn new(telemetry: Metrics) -> Self {
        Self { telemetry }
    }
}

impl<S> Layer<S> for HttpMetricsLayer {
    type Service = HttpMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpMetricsService {
            inner,
            telemetry: self.telemetry.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct HttpMetricsService<S> {
    inner: S,
    telemetry: Metrics,
}

impl<S, B> Service<Request<B>> for HttpMetricsService<S>
where
    S: Service<Request<B>, Response = axum::response::Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let labels = RequestLabels::from_request(&req);
        let telemetry = self.telemetry.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let RequestLabels {
                route,
                category,
                request_id,
            } = labels;
            let response = with_request_context(request_id, route.clone(), fut).await?;
            telemetry.inc_http_request(&route, category, response.status().as_u16());
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn category_follows_route_shape() {
        assert_eq!(category_label("/upload-evm", "/upload-evm"), "evm");
        assert_eq!(category_label("/upload-non-evm", "/upload-non-evm"), "non-evm");
        assert_eq!(
            category_label("/upload/{category}", "/upload/non-evm-starknet"),
            "non-evm-starknet"
        );
        assert_eq!(
            category_label(
                "/results/{category}/{filename}",
                "/results/non-evm/MyToken.txt"
            ),
            "non-evm"
        );
        assert_eq!(category_label("/upload/{category}", "/upload/solana"), "invalid");
        assert_eq!(category_label("/health", "/health"), "none");
    }

    #[test]
    fn labels_read_request_id_header() -> Result<(), axum::http::Error> {
        let req = Request::builder()
            .uri("/health")
            .header(HEADER_REQUEST_ID, "req-7")
            .body(Body::empty())?;
        let labels = RequestLabels::from_request(&req);
        assert_eq!(labels.route, "unmatched");
        assert_eq!(labels.category, "none");
        assert_eq!(labels.request_id, "req-7");
        Ok(())
    }
}
