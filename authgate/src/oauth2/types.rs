use serde::Deserialize;

/// Parameters of a single authorization-code exchange against a provider token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchangeRequest<'a> {
    pub code: &'a str,
    pub callback_uri: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    /// State token stored on the client, forwarded to providers that echo it back.
    pub state: Option<&'a str>,
    pub token_endpoint: &'a str,
}

/// The fields we care about in a provider token response.
///
/// Providers disagree on everything else (GitHub adds `scope`, Google adds `id_token`,
/// Facebook omits `token_type`), so only `access_token` is read.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ProviderTokenResponse {
    pub(super) access_token: Option<String>,
    #[serde(default)]
    pub(super) error: Option<String>,
    #[serde(default)]
    pub(super) error_description: Option<String>,
}
