mod cookie;
mod csrf;

pub use cookie::read_cookie;
pub use csrf::{issue_state_token, read_state_token, verify_state_token};

pub(crate) use cookie::{add_token_cookies, clear_token_cookies};
pub(crate) use csrf::{add_state_token_cookie, clear_state_token_cookie};
