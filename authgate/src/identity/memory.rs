use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Map;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::utils::gen_random_string;

use super::errors::IdentityError;
use super::traits::{Application, IdentityClient};
use super::types::{
    Account, AccountStatus, NewAccount, PasswordGrantRequest, ProviderAccountResult,
    ProviderCredential, SessionGrant, TokenHandle,
};

const ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const REFRESH_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;
const MIN_PASSWORD_LENGTH: usize = 8;

/// Password-reset email recorded instead of being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentResetEmail {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_digest: Vec<u8>,
}

#[derive(Debug, Clone)]
struct ProviderIdentity {
    email: String,
    given_name: String,
    surname: String,
}

#[derive(Debug, Clone)]
struct IssuedToken {
    account_href: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<String, StoredAccount>,
    /// `(provider, credential)` -> identity the provider vouches for
    provider_identities: HashMap<(String, String), ProviderIdentity>,
    /// `(provider, email)` -> account href
    linked_accounts: HashMap<(String, String), String>,
    tokens: HashMap<String, IssuedToken>,
    reset_tokens: HashMap<String, String>,
    outbox: Vec<SentResetEmail>,
}

/// In-process identity provider.
///
/// Accounts, linked social identities and issued tokens live in memory; nothing survives a
/// restart. Cloning shares the same state.
#[derive(Clone)]
pub struct MemoryIdentityClient {
    application: Arc<MemoryApplication>,
}

struct MemoryApplication {
    href: String,
    directory: String,
    verification_required: bool,
    state: RwLock<MemoryState>,
}

impl MemoryIdentityClient {
    pub fn new(application_href: &str) -> Self {
        Self::build(application_href, false)
    }

    /// New accounts start out `UNVERIFIED` instead of `ENABLED`.
    pub fn with_email_verification(application_href: &str) -> Self {
        Self::build(application_href, true)
    }

    fn build(application_href: &str, verification_required: bool) -> Self {
        Self {
            application: Arc::new(MemoryApplication {
                href: application_href.to_string(),
                directory: format!("{application_href}/directory"),
                verification_required,
                state: RwLock::new(MemoryState::default()),
            }),
        }
    }

    /// Href of the single account store backing the application.
    pub fn directory_href(&self) -> &str {
        &self.application.directory
    }

    pub async fn seed_account(&self, new_account: NewAccount) -> Result<Account, IdentityError> {
        let mut account = self.application.create_account(new_account).await?;
        if account.status != AccountStatus::Enabled {
            account = self
                .application
                .set_status(&account.href, AccountStatus::Enabled)
                .await?;
        }
        Ok(account)
    }

    pub async fn set_account_status(
        &self,
        href: &str,
        status: AccountStatus,
    ) -> Result<Account, IdentityError> {
        self.application.set_status(href, status).await
    }

    /// Teaches the fake provider that `credential` (a code or access token) belongs to the
    /// given person.
    pub async fn add_provider_identity(
        &self,
        provider: &str,
        credential: &str,
        email: &str,
        given_name: &str,
        surname: &str,
    ) {
        let mut state = self.application.state.write().await;
        state.provider_identities.insert(
            (provider.to_string(), credential.to_string()),
            ProviderIdentity {
                email: email.to_string(),
                given_name: given_name.to_string(),
                surname: surname.to_string(),
            },
        );
    }

    pub async fn sent_reset_emails(&self) -> Vec<SentResetEmail> {
        self.application.state.read().await.outbox.clone()
    }

    pub async fn issued_token_count(&self) -> usize {
        self.application.state.read().await.tokens.len()
    }
}

#[async_trait]
impl IdentityClient for MemoryIdentityClient {
    async fn get_application(&self, href: &str) -> Result<Arc<dyn Application>, IdentityError> {
        if href != self.application.href {
            return Err(IdentityError::NotFound(format!("application {href}")));
        }
        Ok(self.application.clone())
    }
}

fn digest_password(password: &str) -> Vec<u8> {
    Sha256::digest(password.as_bytes()).to_vec()
}

fn check_password_policy(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::ProviderRejected {
            status: 400,
            code: 2007,
            message: format!(
                "Account password minimum length not satisfied (at least {MIN_PASSWORD_LENGTH} characters)."
            ),
            developer_message: None,
        });
    }
    Ok(())
}

fn random_token() -> Result<String, IdentityError> {
    gen_random_string(32).map_err(|e| IdentityError::Transport(e.to_string()))
}

impl MemoryApplication {
    async fn set_status(&self, href: &str, status: AccountStatus) -> Result<Account, IdentityError> {
        let mut state = self.state.write().await;
        let stored = state
            .accounts
            .get_mut(href)
            .ok_or_else(|| IdentityError::NotFound(format!("account {href}")))?;
        stored.account.status = status;
        stored.account.modified_at = Utc::now();
        Ok(stored.account.clone())
    }

    fn issue_token(
        &self,
        state: &mut MemoryState,
        kind: &str,
        account_href: &str,
        ttl_seconds: i64,
    ) -> Result<TokenHandle, IdentityError> {
        let jwt = random_token()?;
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);
        state.tokens.insert(
            jwt.clone(),
            IssuedToken {
                account_href: account_href.to_string(),
                expires_at,
            },
        );
        Ok(TokenHandle {
            href: format!("{}/{}/{}", self.href, kind, Uuid::new_v4()),
            jwt,
            account_href: account_href.to_string(),
            expires_at,
        })
    }

    fn issue_grant(
        &self,
        state: &mut MemoryState,
        account_href: &str,
    ) -> Result<SessionGrant, IdentityError> {
        let access_token =
            self.issue_token(state, "accessTokens", account_href, ACCESS_TOKEN_TTL_SECONDS)?;
        let refresh_token =
            self.issue_token(state, "refreshTokens", account_href, REFRESH_TOKEN_TTL_SECONDS)?;
        Ok(SessionGrant {
            access_token,
            refresh_token: Some(refresh_token),
        })
    }

    fn insert_account(
        &self,
        state: &mut MemoryState,
        new_account: NewAccount,
    ) -> Result<Account, IdentityError> {
        let email = new_account.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(IdentityError::ProviderRejected {
                status: 400,
                code: 2000,
                message: "Account email is required.".to_string(),
                developer_message: None,
            });
        }
        if state.accounts.values().any(|s| s.account.email == email) {
            return Err(IdentityError::ProviderRejected {
                status: 409,
                code: 2001,
                message: "Account with that email already exists. Please choose another email."
                    .to_string(),
                developer_message: Some(format!("Duplicate email in {}", self.directory)),
            });
        }

        let now = Utc::now();
        let full_name = [
            new_account.given_name.as_str(),
            new_account.middle_name.as_deref().unwrap_or(""),
            new_account.surname.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

        let account = Account {
            href: format!("{}/accounts/{}", self.href, Uuid::new_v4()),
            username: new_account.username.unwrap_or_else(|| email.clone()),
            email,
            given_name: new_account.given_name,
            middle_name: new_account.middle_name,
            surname: new_account.surname,
            full_name,
            status: if self.verification_required {
                AccountStatus::Unverified
            } else {
                AccountStatus::Enabled
            },
            custom_data: new_account.custom_data,
            created_at: now,
            modified_at: now,
        };
        state.accounts.insert(
            account.href.clone(),
            StoredAccount {
                account: account.clone(),
                password_digest: digest_password(&new_account.password),
            },
        );
        Ok(account)
    }
}

#[async_trait]
impl Application for MemoryApplication {
    fn href(&self) -> &str {
        &self.href
    }

    async fn authenticate_with_password(
        &self,
        request: PasswordGrantRequest,
    ) -> Result<SessionGrant, IdentityError> {
        if let Some(account_store) = &request.account_store {
            if account_store != &self.directory {
                return Err(IdentityError::NotFound(format!(
                    "account store {account_store}"
                )));
            }
        }

        let mut state = self.state.write().await;
        let login = request.login.trim().to_lowercase();
        let digest = digest_password(&request.password);
        let account_href = state
            .accounts
            .values()
            .find(|stored| {
                stored.account.email == login || stored.account.username.to_lowercase() == login
            })
            .filter(|stored| bool::from(stored.password_digest.ct_eq(&digest)))
            .filter(|stored| stored.account.status == AccountStatus::Enabled)
            .map(|stored| stored.account.href.clone())
            .ok_or_else(IdentityError::invalid_login)?;

        self.issue_grant(&mut state, &account_href)
    }

    async fn resolve_external_account(
        &self,
        provider: &str,
        credential: ProviderCredential,
    ) -> Result<ProviderAccountResult, IdentityError> {
        let mut state = self.state.write().await;
        let identity = state
            .provider_identities
            .get(&(provider.to_string(), credential.value().to_string()))
            .cloned()
            .ok_or_else(|| IdentityError::ProviderRejected {
                status: 400,
                code: 7200,
                message: format!("The {provider} credential could not be verified."),
                developer_message: Some(format!("Unknown {provider} credential {credential:?}")),
            })?;

        let key = (provider.to_string(), identity.email.to_lowercase());
        if let Some(href) = state.linked_accounts.get(&key) {
            if let Some(stored) = state.accounts.get(href) {
                return Ok(ProviderAccountResult {
                    account: stored.account.clone(),
                    is_new: false,
                });
            }
        }

        let existing = state
            .accounts
            .values()
            .find(|stored| stored.account.email == key.1)
            .map(|stored| stored.account.clone());
        if let Some(account) = existing {
            state.linked_accounts.insert(key, account.href.clone());
            return Ok(ProviderAccountResult {
                account,
                is_new: false,
            });
        }

        let password = random_token()?;
        let mut account = self.insert_account(
            &mut state,
            NewAccount {
                email: identity.email,
                password,
                given_name: identity.given_name,
                surname: identity.surname,
                custom_data: Map::new(),
                ..Default::default()
            },
        )?;
        // the provider has already verified the address
        if let Some(stored) = state.accounts.get_mut(&account.href) {
            stored.account.status = AccountStatus::Enabled;
            account.status = AccountStatus::Enabled;
        }
        state.linked_accounts.insert(key, account.href.clone());
        Ok(ProviderAccountResult {
            account,
            is_new: true,
        })
    }

    async fn exchange_account_for_token(
        &self,
        account: &Account,
    ) -> Result<Option<SessionGrant>, IdentityError> {
        let mut state = self.state.write().await;
        let enabled = state
            .accounts
            .get(&account.href)
            .is_some_and(|stored| stored.account.status == AccountStatus::Enabled);
        if !enabled {
            return Ok(None);
        }
        Ok(Some(self.issue_grant(&mut state, &account.href)?))
    }

    async fn account_for_token(&self, token: &TokenHandle) -> Result<Account, IdentityError> {
        let state = self.state.read().await;
        let issued = state
            .tokens
            .get(&token.jwt)
            .filter(|issued| issued.expires_at > Utc::now())
            .ok_or_else(|| IdentityError::InvalidCredentials {
                status: 401,
                message: "Token is invalid or expired.".to_string(),
            })?;
        state
            .accounts
            .get(&issued.account_href)
            .map(|stored| stored.account.clone())
            .ok_or_else(|| IdentityError::NotFound(format!("account {}", issued.account_href)))
    }

    async fn create_account(&self, new_account: NewAccount) -> Result<Account, IdentityError> {
        check_password_policy(&new_account.password)?;
        let mut state = self.state.write().await;
        self.insert_account(&mut state, new_account)
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        let mut state = self.state.write().await;
        let email = email.trim().to_lowercase();
        let href = state
            .accounts
            .values()
            .find(|stored| stored.account.email == email)
            .map(|stored| stored.account.href.clone())
            .ok_or_else(|| IdentityError::NotFound(format!("account {email}")))?;

        let token = random_token()?;
        state.reset_tokens.insert(token.clone(), href);
        tracing::info!("Password reset email queued for {}", email);
        state.outbox.push(SentResetEmail { email, token });
        Ok(())
    }

    async fn verify_password_reset_token(&self, token: &str) -> Result<Account, IdentityError> {
        let state = self.state.read().await;
        state
            .reset_tokens
            .get(token)
            .and_then(|href| state.accounts.get(href))
            .map(|stored| stored.account.clone())
            .ok_or_else(|| IdentityError::NotFound("password reset token".to_string()))
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<Account, IdentityError> {
        check_password_policy(password)?;
        let mut state = self.state.write().await;
        let href = state
            .reset_tokens
            .remove(token)
            .ok_or_else(|| IdentityError::NotFound("password reset token".to_string()))?;
        let stored = state
            .accounts
            .get_mut(&href)
            .ok_or_else(|| IdentityError::NotFound(format!("account {href}")))?;
        stored.password_digest = digest_password(password);
        stored.account.modified_at = Utc::now();
        Ok(stored.account.clone())
    }

    async fn revoke_token(&self, token: &str) -> Result<(), IdentityError> {
        self.state.write().await.tokens.remove(token);
        Ok(())
    }
}
