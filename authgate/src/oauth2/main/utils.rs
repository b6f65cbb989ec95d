use std::time::Duration;

use super::super::errors::OAuth2Error;

/// Creates the HTTP client used for provider calls.
///
/// - `timeout`: 30 seconds, so a stalled provider cannot hold a request forever.
/// - `pool_idle_timeout`: 90 seconds, the reqwest default.
/// - `pool_max_idle_per_host`: 32 idle connections per provider host.
pub(super) fn get_client() -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::Client(e.to_string()))
}

/// Strips characters that cannot appear in an authorization code.
///
/// Codes travel through a redirect URL and a re-parsed query string; anything outside the
/// URL-safe and base64 alphabets is treated as transport debris and removed before use.
pub fn sanitize_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+' | '/' | '='))
        .collect()
}
