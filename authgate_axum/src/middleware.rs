use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

use authgate::{Gateway, GatewayResponse, RequestContext};

use super::config::AUTHGATE_MAX_BODY_BYTES;
use super::error::{IntoResponseError, error_response};

fn into_axum_response(response: GatewayResponse) -> Response {
    let GatewayResponse {
        status,
        headers,
        body,
    } = response;
    (status, headers, body).into_response()
}

/// Runs the gateway in front of the rest of the application.
///
/// Requests to paths the gateway does not mount go straight to `next`. For mounted paths
/// the body is buffered (up to `AUTHGATE_MAX_BODY_BYTES`) so the request can be rebuilt
/// and passed on unchanged when the gateway declines it.
pub async fn authgate_middleware(
    State(gateway): State<Arc<Gateway>>,
    req: Request,
    next: Next,
) -> Response {
    if !gateway.handles_path(req.uri().path()) {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, *AUTHGATE_MAX_BODY_BYTES)
        .await
        .into_response_error()
    {
        Ok(bytes) => bytes,
        Err(err) => return error_response(err),
    };

    // The token fires if this future is dropped, e.g. when the client goes away.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let mut ctx = RequestContext::new(
        parts.method.clone(),
        &parts.uri,
        parts.headers.clone(),
        bytes.to_vec(),
        cancel,
    );

    match gateway.invoke(&mut ctx).await.into_response_error() {
        Ok(true) => into_axum_response(ctx.response),
        Ok(false) => next.run(Request::from_parts(parts, Body::from(bytes))).await,
        Err(err) => error_response(err),
    }
}
