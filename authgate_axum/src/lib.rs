//! authgate-axum - axum adapter for the authgate authentication gateway
//!
//! Buffers requests for gateway paths, runs [`authgate::Gateway::invoke`], and either
//! answers with the gateway's response or hands the request on to the application.

mod config;
mod error;
mod middleware;
mod router;
mod views;

#[cfg(test)]
mod test_utils;

pub use config::AUTHGATE_MAX_BODY_BYTES;
pub use middleware::authgate_middleware;
pub use router::{with_authgate, with_authgate_no_trace};
pub use views::AskamaViewRenderer;

pub use authgate::{Gateway, GatewayConfig};
