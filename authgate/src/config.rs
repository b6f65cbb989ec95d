//! Gateway configuration
//!
//! Everything has a conventional default so `GatewayConfig::default()` is usable as-is;
//! `GatewayConfig::from_env()` overlays `AUTHGATE_*` environment variables on top.

use std::collections::BTreeMap;
use std::env;

use url::Url;

use crate::negotiation::ContentType;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Identifier of the application at the identity provider.
    pub application_href: String,
    pub web: WebConfig,
    /// Enabled social providers keyed by lower-case provider name.
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub server_uri: String,
    /// Representations the gateway produces, in order of preference.
    pub produces: Vec<ContentType>,
    pub login: RouteConfig,
    pub register: RouteConfig,
    pub logout: RouteConfig,
    pub forgot_password: RouteConfig,
    pub change_password: RouteConfig,
    /// Social callbacks are mounted at `{callback_prefix}/{provider}`.
    pub callback_prefix: String,
    pub register_fields: Vec<FormFieldConfig>,
    pub access_token_cookie: CookieConfig,
    pub refresh_token_cookie: CookieConfig,
    pub state_token_cookie: CookieConfig,
}

#[derive(Debug, Clone)]
pub struct RouteConfig {
    pub enabled: bool,
    pub uri: String,
    pub next_uri: String,
    pub view: String,
    pub error_uri: Option<String>,
    /// Register only: log the new account in right away when it is enabled.
    pub auto_login: bool,
}

impl RouteConfig {
    fn new(uri: &str, next_uri: &str, view: &str) -> Self {
        Self {
            enabled: true,
            uri: uri.to_string(),
            next_uri: next_uri.to_string(),
            view: view.to_string(),
            error_uri: None,
            auto_login: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldConfig {
    pub name: String,
    pub label: String,
    pub placeholder: String,
    pub field_type: String,
    pub enabled: bool,
    pub required: bool,
}

impl FormFieldConfig {
    fn new(name: &str, label: &str, field_type: &str, enabled: bool, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            placeholder: label.to_string(),
            field_type: field_type.to_string(),
            enabled,
            required,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub http_only: bool,
    /// `None` infers the flag from the scheme of `server_uri`.
    pub secure: Option<bool>,
    pub same_site: String,
    /// Used when the token itself does not say how long it lives.
    pub max_age: Option<i64>,
}

impl CookieConfig {
    fn new(name: &str, max_age: Option<i64>) -> Self {
        Self {
            name: name.to_string(),
            path: "/".to_string(),
            http_only: true,
            secure: None,
            same_site: "Lax".to_string(),
            max_age,
        }
    }

    pub fn is_secure(&self, server_uri: &str) -> bool {
        self.secure
            .unwrap_or_else(|| server_uri.to_ascii_lowercase().starts_with("https://"))
    }
}

/// How a provider hands its credential back to the callback route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFlow {
    /// `?code=...` that must be exchanged at the provider's token endpoint.
    AuthorizationCode,
    /// `?access_token=...` obtained client-side.
    AccessToken,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_uri: String,
    pub authorize_uri: String,
    pub token_endpoint: String,
    pub scope: String,
    pub flow: ProviderFlow,
}

impl ProviderConfig {
    /// Endpoints of the providers the gateway knows out of the box.
    pub fn builtin(name: &str) -> Option<Self> {
        let (authorize_uri, token_endpoint, scope, flow) = match name {
            "github" => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                "user:email",
                ProviderFlow::AuthorizationCode,
            ),
            "google" => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                "openid email profile",
                ProviderFlow::AuthorizationCode,
            ),
            "linkedin" => (
                "https://www.linkedin.com/oauth/v2/authorization",
                "https://www.linkedin.com/oauth/v2/accessToken",
                "openid profile email",
                ProviderFlow::AuthorizationCode,
            ),
            "facebook" => (
                "https://www.facebook.com/v19.0/dialog/oauth",
                "https://graph.facebook.com/v19.0/oauth/access_token",
                "email public_profile",
                ProviderFlow::AccessToken,
            ),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            callback_uri: String::new(),
            authorize_uri: authorize_uri.to_string(),
            token_endpoint: token_endpoint.to_string(),
            scope: scope.to_string(),
            flow,
        })
    }
}

pub(crate) const BUILTIN_PROVIDERS: [&str; 4] = ["facebook", "github", "google", "linkedin"];

impl Default for WebConfig {
    fn default() -> Self {
        let mut change_password = RouteConfig::new("/change", "/login?status=reset", "change_password");
        change_password.error_uri = Some("/forgot?status=invalid_sptoken".to_string());

        Self {
            server_uri: "http://localhost:3001".to_string(),
            produces: vec![ContentType::Json, ContentType::Html],
            login: RouteConfig::new("/login", "/", "login"),
            register: RouteConfig::new("/register", "/", "register"),
            logout: RouteConfig::new("/logout", "/", "logout"),
            forgot_password: RouteConfig::new("/forgot", "/login?status=forgot", "forgot_password"),
            change_password,
            callback_prefix: "/callbacks".to_string(),
            register_fields: vec![
                FormFieldConfig::new("givenName", "First Name", "text", true, true),
                FormFieldConfig::new("surname", "Last Name", "text", true, true),
                FormFieldConfig::new("email", "Email", "email", true, true),
                FormFieldConfig::new("password", "Password", "password", true, true),
                FormFieldConfig::new("confirmPassword", "Confirm Password", "password", false, false),
            ],
            access_token_cookie: CookieConfig::new("access_token", None),
            refresh_token_cookie: CookieConfig::new("refresh_token", Some(60 * 60 * 24 * 30)),
            state_token_cookie: CookieConfig::new("oauthStateToken", Some(300)),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            application_href: "memory://application".to_string(),
            web: WebConfig::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overlaid with `AUTHGATE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let web = &mut config.web;

        if let Some(href) = lookup("AUTHGATE_APPLICATION_HREF") {
            config.application_href = href;
        }
        if let Some(server_uri) = lookup("AUTHGATE_SERVER_URI") {
            web.server_uri = server_uri.trim_end_matches('/').to_string();
        }
        if let Some(produces) = lookup("AUTHGATE_PRODUCES") {
            let parsed: Vec<ContentType> = produces
                .split(',')
                .filter_map(|item| match item.parse() {
                    Ok(content_type) => Some(content_type),
                    Err(e) => {
                        tracing::warn!("Ignoring AUTHGATE_PRODUCES entry: {}", e);
                        None
                    }
                })
                .collect();
            if !parsed.is_empty() {
                web.produces = parsed;
            }
        }

        for (prefix, route) in [
            ("LOGIN", &mut web.login),
            ("REGISTER", &mut web.register),
            ("LOGOUT", &mut web.logout),
            ("FORGOT", &mut web.forgot_password),
            ("CHANGE", &mut web.change_password),
        ] {
            if let Some(uri) = lookup(&format!("AUTHGATE_{prefix}_URI")) {
                route.uri = uri;
            }
            if let Some(next_uri) = lookup(&format!("AUTHGATE_{prefix}_NEXT_URI")) {
                route.next_uri = next_uri;
            }
            if let Some(enabled) = lookup(&format!("AUTHGATE_{prefix}_ENABLED")) {
                route.enabled = enabled.to_lowercase() != "false";
            }
        }
        if let Some(auto_login) = lookup("AUTHGATE_REGISTER_AUTO_LOGIN") {
            web.register.auto_login = auto_login.to_lowercase() == "true";
        }
        if let Some(secure) = lookup("AUTHGATE_COOKIE_SECURE") {
            let secure = Some(secure.to_lowercase() != "false");
            web.access_token_cookie.secure = secure;
            web.refresh_token_cookie.secure = secure;
            web.state_token_cookie.secure = secure;
        }

        for name in BUILTIN_PROVIDERS {
            let key = name.to_uppercase();
            let client_id = lookup(&format!("AUTHGATE_{key}_CLIENT_ID"));
            let client_secret = lookup(&format!("AUTHGATE_{key}_CLIENT_SECRET"));
            let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
                continue;
            };
            let Some(mut provider) = ProviderConfig::builtin(name) else {
                continue;
            };
            provider.client_id = client_id;
            provider.client_secret = client_secret;
            provider.callback_uri = lookup(&format!("AUTHGATE_{key}_CALLBACK_URI"))
                .unwrap_or_else(|| {
                    format!("{}{}/{}", web.server_uri, web.callback_prefix, name)
                });
            if let Some(token_endpoint) = lookup(&format!("AUTHGATE_{key}_TOKEN_URL")) {
                provider.token_endpoint = token_endpoint;
            }
            config.providers.insert(name.to_string(), provider);
        }

        config
    }

    /// Path of the callback route for a provider. Follows the path of the
    /// configured callback URI so the provider redirects to a mounted route.
    pub fn callback_path(&self, provider: &str) -> String {
        let fallback = || format!("{}/{}", self.web.callback_prefix, provider);
        let Some(callback_uri) = self.providers.get(provider).map(|p| p.callback_uri.as_str())
        else {
            return fallback();
        };
        let path = match Url::parse(callback_uri) {
            Ok(url) => url.path().to_string(),
            Err(_) if callback_uri.starts_with('/') => callback_uri
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
            Err(_) => return fallback(),
        };
        if path.is_empty() || path == "/" {
            return fallback();
        }
        path
    }
}
