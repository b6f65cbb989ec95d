use std::future::Future;
use std::sync::Arc;

use http::HeaderMap;
use tokio_util::sync::CancellationToken;

use crate::identity::{
    Account, Application, IdentityClient, NewAccount, PasswordGrantRequest,
    ProviderAccountResult, ProviderCredential, SessionGrant,
};
use crate::session::ExchangeResult;

use super::errors::GatewayError;
use super::hooks::{
    AuthHooks, NoopHooks, PostLoginContext, PostRegistrationContext, PreLoginContext,
    PreRegistrationContext,
};

/// Runs `future` unless `cancel` fires first.
pub(crate) async fn cancellable<T, E, F>(cancel: &CancellationToken, future: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, E>>,
    GatewayError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GatewayError::Cancelled),
        result = future => result.map_err(GatewayError::from),
    }
}

/// Identity operations the routes need, wrapped with the lifecycle hooks.
#[derive(Clone)]
pub struct IdentityExchange {
    client: Arc<dyn IdentityClient>,
    application_href: String,
    pub(crate) hooks: Arc<dyn AuthHooks>,
}

impl IdentityExchange {
    pub fn new(client: Arc<dyn IdentityClient>, application_href: &str) -> Self {
        Self {
            client,
            application_href: application_href.to_string(),
            hooks: Arc::new(NoopHooks),
        }
    }

    pub(crate) async fn application(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn Application>, GatewayError> {
        cancellable(cancel, self.client.get_application(&self.application_href)).await
    }

    /// Password grant: pre-login hook, credential check, account lookup, post-login hook.
    pub async fn password_grant(
        &self,
        login: &str,
        password: &str,
        account_store: Option<String>,
        headers: &HeaderMap,
        cancel: &CancellationToken,
    ) -> Result<(ExchangeResult, Account), GatewayError> {
        let mut context = PreLoginContext {
            login: login.to_string(),
            account_store,
            headers: headers.clone(),
        };
        cancellable(cancel, self.hooks.pre_login(&mut context)).await?;

        let application = self.application(cancel).await?;
        let grant = cancellable(
            cancel,
            application.authenticate_with_password(PasswordGrantRequest {
                login: context.login,
                password: password.to_string(),
                account_store: context.account_store,
            }),
        )
        .await?;
        let account = cancellable(cancel, application.account_for_token(&grant.access_token)).await?;

        self.post_login(&account, false, cancel).await?;
        Ok((grant.exchange_result(), account))
    }

    /// Turns a provider credential into an identity-provider account.
    pub async fn resolve_account_from_provider(
        &self,
        provider: &str,
        credential: ProviderCredential,
        cancel: &CancellationToken,
    ) -> Result<ProviderAccountResult, GatewayError> {
        let application = self.application(cancel).await?;
        let result = cancellable(
            cancel,
            application.resolve_external_account(provider, credential),
        )
        .await?;
        tracing::debug!(
            "Resolved {} account {} (new: {})",
            provider,
            result.account.href,
            result.is_new
        );
        Ok(result)
    }

    /// Finishes a social login once the account is known.
    ///
    /// Order: post-registration hook (new accounts only), token exchange, post-login hook.
    /// Nothing is written to the response here.
    pub async fn complete_social_login(
        &self,
        result: &ProviderAccountResult,
        cancel: &CancellationToken,
    ) -> Result<ExchangeResult, GatewayError> {
        if result.is_new {
            let context = PostRegistrationContext {
                account: result.account.clone(),
                social: true,
            };
            cancellable(cancel, self.hooks.post_registration(&context)).await?;
        }

        let grant = self.exchange_account(&result.account, cancel).await?;
        self.post_login(&result.account, true, cancel).await?;
        Ok(grant.exchange_result())
    }

    /// Logs in an account without a password, e.g. right after registration.
    pub async fn login_account(
        &self,
        account: &Account,
        cancel: &CancellationToken,
    ) -> Result<ExchangeResult, GatewayError> {
        let grant = self.exchange_account(account, cancel).await?;
        self.post_login(account, false, cancel).await?;
        Ok(grant.exchange_result())
    }

    /// Pre-registration hook, account creation, post-registration hook.
    pub async fn register(
        &self,
        new_account: NewAccount,
        headers: &HeaderMap,
        cancel: &CancellationToken,
    ) -> Result<Account, GatewayError> {
        let mut context = PreRegistrationContext {
            account: new_account,
            headers: headers.clone(),
        };
        cancellable(cancel, self.hooks.pre_registration(&mut context)).await?;

        let application = self.application(cancel).await?;
        let account = cancellable(cancel, application.create_account(context.account)).await?;
        tracing::info!("Created account {}", account.href);

        let context = PostRegistrationContext {
            account: account.clone(),
            social: false,
        };
        cancellable(cancel, self.hooks.post_registration(&context)).await?;
        Ok(account)
    }

    pub async fn send_password_reset_email(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        let application = self.application(cancel).await?;
        cancellable(cancel, application.send_password_reset_email(email)).await
    }

    pub async fn verify_password_reset_token(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<Account, GatewayError> {
        let application = self.application(cancel).await?;
        cancellable(cancel, application.verify_password_reset_token(token)).await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Account, GatewayError> {
        let application = self.application(cancel).await?;
        cancellable(cancel, application.reset_password(token, password)).await
    }

    pub async fn revoke_token(&self, token: &str, cancel: &CancellationToken) -> Result<(), GatewayError> {
        let application = self.application(cancel).await?;
        cancellable(cancel, application.revoke_token(token)).await
    }

    async fn exchange_account(
        &self,
        account: &Account,
        cancel: &CancellationToken,
    ) -> Result<SessionGrant, GatewayError> {
        let application = self.application(cancel).await?;
        cancellable(cancel, application.exchange_account_for_token(account))
            .await?
            .ok_or_else(|| {
                GatewayError::ExchangeFailed(format!(
                    "No session token issued for {}",
                    account.href
                ))
                .log()
            })
    }

    async fn post_login(
        &self,
        account: &Account,
        social: bool,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        let context = PostLoginContext {
            account: account.clone(),
            social,
        };
        cancellable(cancel, self.hooks.post_login(&context)).await
    }
}
