use std::sync::Arc;

use async_trait::async_trait;

use super::errors::IdentityError;
use super::types::{
    Account, NewAccount, PasswordGrantRequest, ProviderAccountResult, ProviderCredential,
    SessionGrant, TokenHandle,
};

/// Long-lived client shared by every request.
#[async_trait]
pub trait IdentityClient: Send + Sync + 'static {
    async fn get_application(&self, href: &str) -> Result<Arc<dyn Application>, IdentityError>;
}

#[async_trait]
pub trait Application: Send + Sync + 'static {
    fn href(&self) -> &str;

    async fn authenticate_with_password(
        &self,
        request: PasswordGrantRequest,
    ) -> Result<SessionGrant, IdentityError>;

    async fn resolve_external_account(
        &self,
        provider: &str,
        credential: ProviderCredential,
    ) -> Result<ProviderAccountResult, IdentityError>;

    /// Issues session tokens for an account that was authenticated elsewhere.
    /// `None` means the provider declined to issue them.
    async fn exchange_account_for_token(
        &self,
        account: &Account,
    ) -> Result<Option<SessionGrant>, IdentityError>;

    async fn account_for_token(&self, token: &TokenHandle) -> Result<Account, IdentityError>;

    async fn create_account(&self, new_account: NewAccount) -> Result<Account, IdentityError>;

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError>;

    async fn verify_password_reset_token(&self, token: &str) -> Result<Account, IdentityError>;

    async fn reset_password(&self, token: &str, password: &str)
    -> Result<Account, IdentityError>;

    async fn revoke_token(&self, _token: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}
