use askama::Template;
use async_trait::async_trait;
use axum::{http::StatusCode, response::Html};
use http::HeaderMap;

use authgate::{
    AuthHooks, HookError, PostLoginContext, PostRegistrationContext, PreLoginContext,
    read_cookie,
};

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate<'a> {
    message: &'a str,
    signed_in: bool,
}

pub(crate) async fn index(headers: HeaderMap) -> Result<Html<String>, (StatusCode, String)> {
    let signed_in = read_cookie(&headers, "access_token").is_some_and(|token| !token.is_empty());
    let message = if signed_in {
        "You are signed in."
    } else {
        "Log in or create an account to get started."
    };
    let template = IndexTemplate { message, signed_in };
    let html = Html(
        template
            .render()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok(html)
}

/// Logs each authentication event.
pub(crate) struct LoggingHooks;

#[async_trait]
impl AuthHooks for LoggingHooks {
    async fn pre_login(&self, context: &mut PreLoginContext) -> Result<(), HookError> {
        tracing::info!("Login attempt for {}", context.login);
        Ok(())
    }

    async fn post_login(&self, context: &PostLoginContext) -> Result<(), HookError> {
        tracing::info!(
            "{} logged in (social: {})",
            context.account.email,
            context.social
        );
        Ok(())
    }

    async fn post_registration(&self, context: &PostRegistrationContext) -> Result<(), HookError> {
        tracing::info!(
            "{} registered (social: {})",
            context.account.email,
            context.social
        );
        Ok(())
    }
}
