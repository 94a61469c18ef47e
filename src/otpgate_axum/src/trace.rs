//! Request tracing for routers that mount the gate.

use std::time::Duration;

use axum::{Router, body::Body, extract::Request, response::Response};
use tower_http::trace::TraceLayer;
use tracing::{Level, Span};

pub fn make_span_with_request_id(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %uuid::Uuid::new_v4(),
    )
}

pub fn on_request(_request: &Request<Body>, _span: &Span) {
    tracing::debug!("Request started");
}

/// Gate rejections (400, 422) are routine and logged at warn; only server
/// errors reach error level.
pub fn on_response(response: &Response, latency: Duration, _span: &Span) {
    let status = response.status().as_u16();
    match status {
        500.. => tracing::event!(Level::ERROR, ?latency, status, "Request failed"),
        400..=499 => tracing::event!(Level::WARN, ?latency, status, "Request rejected"),
        _ => tracing::event!(Level::INFO, ?latency, status, "Request finished"),
    }
}

/// Wrap `router` in a `TraceLayer` using the functions above.
pub fn with_trace_layer<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(make_span_with_request_id)
            .on_request(on_request)
            .on_response(on_response),
    )
}
