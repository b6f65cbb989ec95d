use authgate::GatewayError;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Faults that reach the adapter are HTML-mode faults; their details stay in the log.
impl<T> IntoResponseError<T> for Result<T, GatewayError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                GatewayError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let message = status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string();
            (status, message)
        })
    }
}

/// Implementation for axum's body collection errors
impl<T> IntoResponseError<T> for Result<T, axum::Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            tracing::debug!("Failed to read request body: {}", e);
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            )
        })
    }
}

pub(super) fn error_response((status, message): (StatusCode, String)) -> Response {
    (status, message).into_response()
}
