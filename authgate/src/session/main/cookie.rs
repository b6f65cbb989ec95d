use chrono::Utc;
use headers::{Cookie, HeaderMapExt};
use http::HeaderMap;

use crate::config::{CookieConfig, WebConfig};
use crate::utils::append_set_cookie;

use super::super::errors::SessionError;
use super::super::types::ExchangeResult;

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(name).map(str::to_string))
}

pub(super) fn set_cookie(
    headers: &mut HeaderMap,
    config: &CookieConfig,
    value: &str,
    max_age: i64,
    server_uri: &str,
) -> Result<(), SessionError> {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; SameSite={}",
        config.name, value, config.path, max_age, config.same_site
    );
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.is_secure(server_uri) {
        cookie.push_str("; Secure");
    }
    append_set_cookie(headers, &cookie)?;
    Ok(())
}

/// Writes the access token cookie and, when present, the refresh token cookie.
pub(crate) fn add_token_cookies(
    headers: &mut HeaderMap,
    web: &WebConfig,
    result: &ExchangeResult,
) -> Result<(), SessionError> {
    let now = Utc::now();
    set_cookie(
        headers,
        &web.access_token_cookie,
        &result.access_token,
        result.access_max_age(now),
        &web.server_uri,
    )?;

    if let Some(refresh_token) = &result.refresh_token {
        let max_age = result
            .refresh_max_age(now)
            .or(web.refresh_token_cookie.max_age)
            .unwrap_or(0);
        set_cookie(
            headers,
            &web.refresh_token_cookie,
            refresh_token,
            max_age,
            &web.server_uri,
        )?;
    }

    tracing::debug!("Token cookies written: {:?}", headers);
    Ok(())
}

pub(crate) fn clear_token_cookies(headers: &mut HeaderMap, web: &WebConfig) -> Result<(), SessionError> {
    set_cookie(headers, &web.access_token_cookie, "", 0, &web.server_uri)?;
    set_cookie(headers, &web.refresh_token_cookie, "", 0, &web.server_uri)?;
    Ok(())
}
