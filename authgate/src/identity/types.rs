use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::ExchangeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Enabled,
    Unverified,
    Disabled,
}

/// An account as returned by the identity provider. Carries no secrets, so it can be
/// serialized straight into a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub href: String,
    pub username: String,
    pub email: String,
    pub given_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub full_name: String,
    pub status: AccountStatus,
    pub custom_data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordGrantRequest {
    pub login: String,
    pub password: String,
    /// Restricts the lookup to one account store (directory) when set.
    pub account_store: Option<String>,
}

/// Credential handed back by a social provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCredential {
    AccessToken(String),
    Code(String),
}

impl ProviderCredential {
    pub fn value(&self) -> &str {
        match self {
            Self::AccessToken(value) | Self::Code(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAccountResult {
    pub account: Account,
    pub is_new: bool,
}

/// Pending account, editable by the pre-registration hook before it is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub given_name: String,
    pub surname: String,
    pub middle_name: Option<String>,
    pub username: Option<String>,
    pub custom_data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHandle {
    pub href: String,
    pub jwt: String,
    pub account_href: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub access_token: TokenHandle,
    pub refresh_token: Option<TokenHandle>,
}

impl SessionGrant {
    pub fn exchange_result(&self) -> ExchangeResult {
        ExchangeResult {
            access_token: self.access_token.jwt.clone(),
            refresh_token: self.refresh_token.as_ref().map(|t| t.jwt.clone()),
            expires_at: self.access_token.expires_at,
            refresh_expires_at: self.refresh_token.as_ref().map(|t| t.expires_at),
        }
    }
}
