//! Mounting the gateway in front of an axum application

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use authgate::Gateway;

use super::middleware::authgate_middleware;

/// Wraps `router` with the gateway and HTTP request tracing.
///
/// Gateway paths (login, register, logout, password reset, provider callbacks) are answered
/// before the router sees them; everything else, and every request the gateway declines,
/// reaches `router` unchanged.
pub fn with_authgate(router: Router, gateway: Arc<Gateway>) -> Router {
    with_authgate_no_trace(router, gateway).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(false),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`with_authgate`] without the tracing layer, for hosts that trace requests
/// themselves.
pub fn with_authgate_no_trace(router: Router, gateway: Arc<Gateway>) -> Router {
    router.layer(from_fn_with_state(gateway, authgate_middleware))
}
