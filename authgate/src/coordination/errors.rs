//! Error type returned at the gateway boundary

use thiserror::Error;

use crate::identity::IdentityError;
use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::utils::UtilError;
use crate::views::RenderError;

use super::hooks::HookError;

/// Every failure a route handler can produce.
///
/// The dispatcher turns these into sanitized JSON bodies or hands them to the host,
/// depending on the negotiated representation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed fields in the submitted form
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error reported by the identity provider
    #[error("Identity provider error: {0}")]
    Identity(IdentityError),

    /// An application hook aborted the operation
    #[error("Hook error: {0}")]
    Hook(HookError),

    /// A token or account exchange returned nothing
    #[error("Exchange failed: {0}")]
    ExchangeFailed(String),

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    #[error("Render error: {0}")]
    Render(RenderError),

    #[error("Session error: {0}")]
    Session(SessionError),

    #[error("OAuth2 error: {0}")]
    OAuth2(OAuth2Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidInput(msg) => tracing::debug!("Invalid input: {}", msg),
            Self::Identity(err) => tracing::warn!("Identity provider error: {}", err),
            Self::Hook(err) => tracing::error!("Hook error: {}", err),
            Self::ExchangeFailed(msg) => tracing::warn!("Exchange failed: {}", msg),
            Self::Cancelled => tracing::debug!("Request cancelled"),
            Self::Render(err) => tracing::error!("Render error: {}", err),
            Self::Session(err) => tracing::error!("Session error: {}", err),
            Self::OAuth2(err) => tracing::error!("OAuth2 error: {}", err),
            Self::Unexpected(msg) => tracing::error!("Unexpected error: {}", msg),
        }
        self
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status for the sanitized JSON body: the provider's own status when it sent one,
    /// 400 otherwise.
    pub fn status(&self) -> u16 {
        match self {
            Self::Identity(err) => err.status().unwrap_or(400),
            _ => 400,
        }
    }

    /// Message for the sanitized JSON body. Provider errors contribute only their
    /// user-facing message.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) | Self::Unexpected(msg) => msg.clone(),
            // Detail names internal account hrefs; it stays in the log.
            Self::ExchangeFailed(_) => "The login could not be completed.".to_string(),
            Self::Identity(err) => err.user_message(),
            Self::Hook(err) => err.user_message(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Render(err) => err.to_string(),
            Self::Session(err) => err.to_string(),
            Self::OAuth2(err) => err.to_string(),
        }
    }
}

// Conversions log as they wrap, so `?` leaves a trace of where things went wrong

impl From<IdentityError> for GatewayError {
    fn from(err: IdentityError) -> Self {
        let error = Self::Identity(err);
        tracing::warn!("{}", error);
        error
    }
}

impl From<HookError> for GatewayError {
    fn from(err: HookError) -> Self {
        let error = Self::Hook(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for GatewayError {
    fn from(err: SessionError) -> Self {
        let error = Self::Session(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for GatewayError {
    fn from(err: UtilError) -> Self {
        Self::from(SessionError::from(err))
    }
}

impl From<RenderError> for GatewayError {
    fn from(err: RenderError) -> Self {
        let error = Self::Render(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<OAuth2Error> for GatewayError {
    fn from(err: OAuth2Error) -> Self {
        if matches!(err, OAuth2Error::Cancelled) {
            return Self::Cancelled;
        }
        let error = Self::OAuth2(err);
        tracing::error!("{}", error);
        error
    }
}
