//! Callback routes for social providers.
//!
//! The provider redirects the browser back here with either an authorization code or an
//! access token, plus the state token we handed out with the login form. Any failure ends
//! in a redirect to the login page with `status=social_failed`; nothing crosses the
//! redirect boundary except that flag.

use crate::config::{ProviderConfig, ProviderFlow};
use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::identity::ProviderCredential;
use crate::oauth2::TokenExchangeRequest;
use crate::session::{
    add_token_cookies, clear_state_token_cookie, read_state_token, verify_state_token,
};
use crate::utils::first_param;

use super::{next_target, with_status};

pub(super) fn table() -> HandlerTable {
    HandlerTable {
        get_html: Some(get_html),
        ..Default::default()
    }
}

fn get_html<'a>(
    env: &'a RouteEnv,
    route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(callback(env, route, ctx))
}

/// Why a callback did not produce a login. Only logged.
#[derive(Debug)]
enum SocialFailure {
    MissingCredential,
    StateMismatch,
    CodeExchange,
    Rejected(GatewayError),
}

async fn callback(
    env: &RouteEnv,
    route: &BoundRoute,
    ctx: &mut RequestContext,
) -> Result<RouteOutcome, GatewayError> {
    let provider = route
        .provider
        .as_deref()
        .and_then(|name| env.config.providers.get(name))
        .ok_or_else(|| {
            GatewayError::Unexpected(format!("No provider configured for {}", route.path))
        })?;

    match login_with_provider(env, provider, ctx).await {
        Ok(()) => Ok(RouteOutcome::Handled),
        Err(SocialFailure::Rejected(GatewayError::Cancelled)) => Err(GatewayError::Cancelled),
        Err(failure) => {
            tracing::warn!("Social login with {} failed: {:?}", provider.name, failure);
            ctx.response.reset();
            clear_state_token_cookie(&mut ctx.response.headers, &env.config.web)?;
            let error_uri = with_status(&env.config.web.login.uri, "social_failed");
            ctx.response.redirect(&error_uri)?;
            Ok(RouteOutcome::Handled)
        }
    }
}

impl From<GatewayError> for SocialFailure {
    fn from(err: GatewayError) -> Self {
        Self::Rejected(err)
    }
}

async fn login_with_provider(
    env: &RouteEnv,
    provider: &ProviderConfig,
    ctx: &mut RequestContext,
) -> Result<(), SocialFailure> {
    let parameter = match provider.flow {
        ProviderFlow::AuthorizationCode => "code",
        ProviderFlow::AccessToken => "access_token",
    };
    let credential = first_param(&ctx.query, parameter)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(SocialFailure::MissingCredential)?;

    let expected = read_state_token(&ctx.headers, &env.config.web);
    let presented = first_param(&ctx.query, "state");
    if !verify_state_token(expected.as_deref(), presented) {
        return Err(SocialFailure::StateMismatch);
    }

    let credential = match provider.flow {
        ProviderFlow::AuthorizationCode => {
            let request = TokenExchangeRequest {
                code: &credential,
                callback_uri: &provider.callback_uri,
                client_id: &provider.client_id,
                client_secret: &provider.client_secret,
                state: expected.as_deref(),
                token_endpoint: &provider.token_endpoint,
            };
            let access_token = env
                .exchanger
                .exchange_code_for_token(&request, &ctx.cancel)
                .await
                .map_err(GatewayError::from)?
                .ok_or(SocialFailure::CodeExchange)?;
            ProviderCredential::AccessToken(access_token)
        }
        ProviderFlow::AccessToken => ProviderCredential::AccessToken(credential),
    };

    let result = env
        .identity
        .resolve_account_from_provider(&provider.name, credential, &ctx.cancel)
        .await?;
    let exchange_result = env
        .identity
        .complete_social_login(&result, &ctx.cancel)
        .await?;

    let default_next = if result.is_new {
        &env.config.web.register.next_uri
    } else {
        &env.config.web.login.next_uri
    };
    let target = next_target(ctx, default_next);

    tracing::info!(
        "Social login with {} succeeded for {}",
        provider.name,
        result.account.href
    );
    let headers = &mut ctx.response.headers;
    clear_state_token_cookie(headers, &env.config.web).map_err(GatewayError::from)?;
    add_token_cookies(headers, &env.config.web, &exchange_result).map_err(GatewayError::from)?;
    ctx.response.redirect(&target)?;
    Ok(())
}
