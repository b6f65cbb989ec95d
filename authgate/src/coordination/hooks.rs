//! Extension points the embedding application can use to observe or veto authentication.

use async_trait::async_trait;
use http::HeaderMap;
use thiserror::Error;

use crate::identity::{Account, NewAccount};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Refusal with a message that may be shown to the user
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Hook failed: {0}")]
    Failed(String),
}

impl HookError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(msg) => msg.clone(),
            Self::Failed(_) => "The request could not be completed.".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreLoginContext {
    pub login: String,
    /// Forwarded with the password grant; set it to pin the login to one account store.
    pub account_store: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct PostLoginContext {
    pub account: Account,
    /// `true` when the login came from a social provider.
    pub social: bool,
}

#[derive(Debug, Clone)]
pub struct PreRegistrationContext {
    pub account: NewAccount,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct PostRegistrationContext {
    pub account: Account,
    pub social: bool,
}

/// Lifecycle hooks. Every method defaults to a no-op; an error aborts the enclosing
/// operation.
#[async_trait]
pub trait AuthHooks: Send + Sync + 'static {
    async fn pre_login(&self, _context: &mut PreLoginContext) -> Result<(), HookError> {
        Ok(())
    }

    async fn post_login(&self, _context: &PostLoginContext) -> Result<(), HookError> {
        Ok(())
    }

    async fn pre_registration(
        &self,
        _context: &mut PreRegistrationContext,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn post_registration(&self, _context: &PostRegistrationContext) -> Result<(), HookError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl AuthHooks for NoopHooks {}
