//! OAuth state tokens carried across the social-login redirect.

use http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::config::WebConfig;
use crate::utils::gen_random_string;

use super::super::errors::SessionError;
use super::cookie::{read_cookie, set_cookie};

/// Generates a fresh, unguessable state token (256 bits).
pub fn issue_state_token() -> Result<String, SessionError> {
    Ok(gen_random_string(32)?)
}

/// Stores the token in the short-lived state cookie.
pub(crate) fn add_state_token_cookie(
    headers: &mut HeaderMap,
    web: &WebConfig,
    token: &str,
) -> Result<(), SessionError> {
    let cookie = &web.state_token_cookie;
    let max_age = cookie.max_age.unwrap_or(300);
    set_cookie(headers, cookie, token, max_age, &web.server_uri)
}

/// Overwrites the state cookie with an expired empty value once the token is consumed.
pub(crate) fn clear_state_token_cookie(
    headers: &mut HeaderMap,
    web: &WebConfig,
) -> Result<(), SessionError> {
    set_cookie(headers, &web.state_token_cookie, "", 0, &web.server_uri)
}

pub fn read_state_token(headers: &HeaderMap, web: &WebConfig) -> Option<String> {
    read_cookie(headers, &web.state_token_cookie.name)
}

/// Constant-time comparison of the stored token with the one presented by the client.
///
/// Absent or empty tokens never verify, not even against each other.
pub fn verify_state_token(expected: Option<&str>, presented: Option<&str>) -> bool {
    match (expected, presented) {
        (Some(expected), Some(presented)) if !expected.is_empty() && !presented.is_empty() => {
            expected.as_bytes().ct_eq(presented.as_bytes()).into()
        }
        _ => false,
    }
}
