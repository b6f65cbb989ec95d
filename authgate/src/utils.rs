use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;
use url::Url;

/// Multi-valued parameters decoded from a query string or a form body.
pub type Params = BTreeMap<String, Vec<String>>;

pub(crate) fn base64url_encode(input: Vec<u8>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Generates `len` random bytes and returns them base64url-encoded.
///
/// 32 bytes gives 256 bits of entropy, which is what every token in this crate uses.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(buf))
}

pub(crate) fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) -> Result<(), UtilError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

/// Decodes `application/x-www-form-urlencoded` data, keeping every value of repeated keys.
pub(crate) fn parse_params(input: &str) -> Params {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut params = Params::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

pub(crate) fn first_param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Reduces a redirect candidate to a same-origin path-and-query.
///
/// Absolute and protocol-relative URIs lose their scheme and authority, so a `next`
/// parameter can never send the browser to another origin.
pub(crate) fn same_origin_target(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    let base = Url::parse("http://localhost/").ok()?;
    let resolved = base.join(candidate).ok()?;
    // A leading `//` would read as scheme-relative to the browser.
    let mut target = format!("/{}", resolved.path().trim_start_matches(['/', '\\']));
    if let Some(query) = resolved.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}
