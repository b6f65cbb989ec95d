use http::StatusCode;
use serde_json::json;

use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::negotiation::ContentType;
use crate::session::{add_state_token_cookie, add_token_cookies, issue_state_token};
use crate::utils::first_param;
use crate::views::login_view_model;

use super::{next_target, parse_body, render_view};

const MISSING_CREDENTIALS: &str = "The login and password fields are required.";

pub(super) fn table() -> HandlerTable {
    HandlerTable {
        get_json: Some(get_json),
        get_html: Some(get_html),
        post_json: Some(post_json),
        post_html: Some(post_html),
    }
}

fn get_json<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let model = login_view_model(&env.config, None, None, None, Vec::new());
        ctx.response.json(StatusCode::OK, &model)?;
        Ok(RouteOutcome::Handled)
    })
}

fn get_html<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        render_login_form(env, ctx, None, Vec::new())?;
        Ok(RouteOutcome::Handled)
    })
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

/// Renders the login form with a freshly issued state token. Every render replaces the
/// state cookie.
fn render_login_form(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    submitted_login: Option<&str>,
    errors: Vec<String>,
) -> Result<(), GatewayError> {
    let state_token = issue_state_token()?;
    let status = first_param(&ctx.query, "status").map(str::to_string);
    let model = login_view_model(
        &env.config,
        submitted_login,
        status.as_deref(),
        Some(state_token.as_str()),
        errors,
    );

    render_view(env, ctx, &env.config.web.login.view, &model)?;
    add_state_token_cookie(&mut ctx.response.headers, &env.config.web, &state_token)?;
    Ok(())
}

async fn post(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    representation: ContentType,
) -> Result<RouteOutcome, GatewayError> {
    let form = parse_body(&ctx.headers, &ctx.body)?;
    let login = form
        .get("login")
        .or_else(|| form.get("username"))
        .map(str::to_string);
    let password = form.get_raw("password").map(str::to_string);

    let (Some(login), Some(password)) = (login.clone(), password) else {
        tracing::debug!("Login attempt without login or password");
        return match representation {
            ContentType::Html => {
                render_login_form(env, ctx, login.as_deref(), vec![MISSING_CREDENTIALS.to_string()])?;
                Ok(RouteOutcome::Handled)
            }
            ContentType::Json => Err(GatewayError::InvalidInput(MISSING_CREDENTIALS.to_string())),
        };
    };
    let account_store = form.get("accountStore").map(str::to_string);

    let result = env
        .identity
        .password_grant(&login, &password, account_store, &ctx.headers, &ctx.cancel)
        .await;

    match result {
        Ok((exchange_result, account)) => {
            tracing::info!("Password login succeeded for {}", account.href);
            add_token_cookies(&mut ctx.response.headers, &env.config.web, &exchange_result)?;
            match representation {
                ContentType::Html => {
                    let target = next_target(ctx, &env.config.web.login.next_uri);
                    ctx.response.redirect(&target)?;
                }
                ContentType::Json => {
                    ctx.response
                        .json(StatusCode::OK, &json!({ "account": account }))?;
                }
            }
            Ok(RouteOutcome::Handled)
        }
        Err(GatewayError::Identity(err)) if representation == ContentType::Html => {
            render_login_form(env, ctx, Some(&login), vec![err.user_message()])?;
            Ok(RouteOutcome::Handled)
        }
        Err(err) => Err(err),
    }
}
