use http::StatusCode;

use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::negotiation::ContentType;
use crate::session::{clear_token_cookies, read_cookie};

pub(super) fn table() -> HandlerTable {
    HandlerTable {
        post_json: Some(post_json),
        post_html: Some(post_html),
        ..Default::default()
    }
}

fn post_json<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(post(env, ctx, ContentType::Json))
}

fn post_html<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(post(env, ctx, ContentType::Html))
}

async fn post(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    representation: ContentType,
) -> Result<RouteOutcome, GatewayError> {
    let web = &env.config.web;
    let tokens = [&web.access_token_cookie, &web.refresh_token_cookie]
        .into_iter()
        .filter_map(|cookie| read_cookie(&ctx.headers, &cookie.name))
        .filter(|token| !token.is_empty());

    for token in tokens {
        match env.identity.revoke_token(&token, &ctx.cancel).await {
            Ok(()) => {}
            Err(GatewayError::Cancelled) => return Err(GatewayError::Cancelled),
            Err(err) => tracing::warn!("Failed to revoke token on logout: {}", err),
        }
    }

    clear_token_cookies(&mut ctx.response.headers, web)?;
    match representation {
        ContentType::Html => ctx.response.redirect(&web.logout.next_uri)?,
        ContentType::Json => ctx.response.empty(StatusCode::OK),
    }
    Ok(RouteOutcome::Handled)
}
