mod errors;
mod main;
mod types;

pub use errors::OAuth2Error;
pub use main::{CodeExchanger, sanitize_code};
pub use types::TokenExchangeRequest;
