use http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::coordination::GatewayError;
use crate::utils::{Params, parse_params};

/// Per-request state owned by the gateway while it handles one request.
#[derive(Debug)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Params,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub cancel: CancellationToken,
    pub response: GatewayResponse,
}

impl RequestContext {
    pub fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Vec<u8>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(parse_params).unwrap_or_default(),
            headers,
            body,
            cancel,
            response: GatewayResponse::default(),
        }
    }
}

/// Response being built for the host. Untouched (`200`, no headers, empty body) until a
/// handler writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Default for GatewayResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

impl GatewayResponse {
    pub fn is_untouched(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn redirect(&mut self, location: &str) -> Result<(), GatewayError> {
        let value = HeaderValue::from_str(location)
            .map_err(|e| GatewayError::Unexpected(format!("Invalid redirect target: {e}")))?;
        self.status = StatusCode::FOUND;
        self.headers.insert(LOCATION, value);
        self.headers
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        self.body.clear();
        Ok(())
    }

    pub(crate) fn json<T: Serialize>(
        &mut self,
        status: StatusCode,
        body: &T,
    ) -> Result<(), GatewayError> {
        self.body = serde_json::to_vec(body)
            .map_err(|e| GatewayError::Unexpected(format!("Failed to serialize response: {e}")))?;
        self.status = status;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.headers
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        Ok(())
    }

    pub(crate) fn html(&mut self, status: StatusCode, body: Vec<u8>) {
        self.status = status;
        self.body = body;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        self.headers
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    /// Status code only, for JSON routes that have nothing to say on success.
    pub(crate) fn empty(&mut self, status: StatusCode) {
        self.status = status;
        self.body.clear();
    }
}
