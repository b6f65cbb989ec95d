use http::header::ACCEPT;
use tokio_util::sync::CancellationToken;

use super::super::errors::OAuth2Error;
use super::super::types::{ProviderTokenResponse, TokenExchangeRequest};
use super::utils::{get_client, sanitize_code};

/// Exchanges authorization codes for provider access tokens.
///
/// Holds one pooled HTTP client shared by every request.
#[derive(Debug, Clone)]
pub struct CodeExchanger {
    client: reqwest::Client,
}

impl CodeExchanger {
    pub fn new() -> Result<Self, OAuth2Error> {
        Ok(Self {
            client: get_client()?,
        })
    }

    /// Returns the provider access token, or `None` when the provider rejected the code,
    /// the call failed, or the response carried no token.
    ///
    /// The only error is [`OAuth2Error::Cancelled`].
    pub async fn exchange_code_for_token(
        &self,
        request: &TokenExchangeRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, OAuth2Error> {
        let code = sanitize_code(request.code);
        if code.is_empty() {
            tracing::warn!("Authorization code empty after sanitization");
            return Ok(None);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OAuth2Error::Cancelled),
            result = self.request_access_token(&code, request) => result,
        };

        match result {
            Ok(access_token) => Ok(Some(access_token)),
            Err(e) => {
                tracing::warn!("Token exchange with {} failed: {}", request.token_endpoint, e);
                Ok(None)
            }
        }
    }

    async fn request_access_token(
        &self,
        code: &str,
        request: &TokenExchangeRequest<'_>,
    ) -> Result<String, OAuth2Error> {
        let mut form = vec![
            ("code", code),
            ("client_id", request.client_id),
            ("client_secret", request.client_secret),
            ("redirect_uri", request.callback_uri),
            ("grant_type", "authorization_code"),
        ];
        if let Some(state) = request.state {
            form.push(("state", state));
        }

        let response = self
            .client
            .post(request.token_endpoint)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;
        tracing::debug!("Token Exchange Response: {} {:#?}", status, response_body);

        if !status.is_success() {
            return Err(OAuth2Error::TokenExchange(status.to_string()));
        }

        let parsed = parse_token_response(&response_body)?;
        if let Some(error) = parsed.error {
            return Err(OAuth2Error::TokenExchange(format!(
                "{}: {}",
                error,
                parsed.error_description.unwrap_or_default()
            )));
        }

        parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OAuth2Error::TokenExchange("Access token not present in response".to_string())
            })
    }
}

/// Parses a JSON token response, falling back to the form-encoded body some providers
/// still send regardless of `Accept`.
fn parse_token_response(body: &str) -> Result<ProviderTokenResponse, OAuth2Error> {
    if let Ok(parsed) = serde_json::from_str::<ProviderTokenResponse>(body) {
        return Ok(parsed);
    }

    let mut parsed = ProviderTokenResponse {
        access_token: None,
        error: None,
        error_description: None,
    };
    let mut seen = false;
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        seen = true;
        match key.as_ref() {
            "access_token" => parsed.access_token = Some(value.into_owned()),
            "error" => parsed.error = Some(value.into_owned()),
            "error_description" => parsed.error_description = Some(value.into_owned()),
            _ => {}
        }
    }
    if !seen {
        return Err(OAuth2Error::Serde("Empty token response".to_string()));
    }
    Ok(parsed)
}
