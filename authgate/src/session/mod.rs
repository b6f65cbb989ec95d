mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{issue_state_token, read_cookie, read_state_token, verify_state_token};
pub use types::ExchangeResult;

pub(crate) use main::{
    add_state_token_cookie, add_token_cookies, clear_state_token_cookie, clear_token_cookies,
};
