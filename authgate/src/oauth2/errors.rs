use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    #[error("Http client error: {0}")]
    Client(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Serde error: {0}")]
    Serde(String),

    /// The request was cancelled while the provider call was in flight
    #[error("Token exchange cancelled")]
    Cancelled,
}
