use http::StatusCode;

use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::identity::IdentityError;
use crate::negotiation::ContentType;
use crate::utils::first_param;
use crate::views::ChangePasswordViewModel;

use super::{parse_body, render_view, with_status};

const MISSING_TOKEN: &str = "The sptoken parameter is required.";

pub(super) fn table() -> HandlerTable {
    HandlerTable {
        get_json: Some(get_json),
        get_html: Some(get_html),
        post_json: Some(post_json),
        post_html: Some(post_html),
    }
}

fn sptoken_from_query(ctx: &RequestContext) -> Option<String> {
    first_param(&ctx.query, "sptoken")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Where to send the browser when the reset token is missing or no longer valid.
fn error_target(env: &RouteEnv) -> String {
    let web = &env.config.web;
    web.change_password
        .error_uri
        .clone()
        .unwrap_or_else(|| with_status(&web.forgot_password.uri, "invalid_sptoken"))
}

fn get_json<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let Some(sptoken) = sptoken_from_query(ctx) else {
            return Err(GatewayError::InvalidInput(MISSING_TOKEN.to_string()));
        };
        env.identity
            .verify_password_reset_token(&sptoken, &ctx.cancel)
            .await?;
        ctx.response.empty(StatusCode::OK);
        Ok(RouteOutcome::Handled)
    })
}

fn get_html<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let Some(sptoken) = sptoken_from_query(ctx) else {
            ctx.response.redirect(&error_target(env))?;
            return Ok(RouteOutcome::Handled);
        };

        match env
            .identity
            .verify_password_reset_token(&sptoken, &ctx.cancel)
            .await
        {
            Ok(_) => {
                render_form(env, ctx, sptoken, Vec::new())?;
            }
            Err(GatewayError::Identity(err)) => {
                tracing::warn!("Password reset token rejected: {}", err);
                ctx.response.redirect(&error_target(env))?;
            }
            Err(err) => return Err(err),
        }
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

fn render_form(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    sptoken: String,
    errors: Vec<String>,
) -> Result<(), GatewayError> {
    let web = &env.config.web;
    let model = ChangePasswordViewModel {
        change_password_uri: web.change_password.uri.clone(),
        login_uri: web.login.uri.clone(),
        sptoken,
        errors,
    };
    render_view(env, ctx, &web.change_password.view, &model)
}

async fn post(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    representation: ContentType,
) -> Result<RouteOutcome, GatewayError> {
    let form = parse_body(&ctx.headers, &ctx.body)?;
    let sptoken = form
        .get("sptoken")
        .map(str::to_string)
        .or_else(|| sptoken_from_query(ctx));
    let Some(sptoken) = sptoken else {
        return match representation {
            ContentType::Html => {
                ctx.response.redirect(&error_target(env))?;
                Ok(RouteOutcome::Handled)
            }
            ContentType::Json => Err(GatewayError::InvalidInput(MISSING_TOKEN.to_string())),
        };
    };

    let password = form.get_raw("password");
    let mut errors = Vec::new();
    if password.is_none() {
        errors.push("Password is required.".to_string());
    } else if password != form.get_raw("confirmPassword") {
        errors.push("Passwords do not match.".to_string());
    }
    if !errors.is_empty() {
        return match representation {
            ContentType::Html => {
                render_form(env, ctx, sptoken, errors)?;
                Ok(RouteOutcome::Handled)
            }
            ContentType::Json => Err(GatewayError::InvalidInput(errors.join(" "))),
        };
    }
    let password = password.unwrap_or_default().to_string();

    match env
        .identity
        .reset_password(&sptoken, &password, &ctx.cancel)
        .await
    {
        Ok(account) => {
            tracing::info!("Password reset for {}", account.href);
            match representation {
                ContentType::Html => ctx
                    .response
                    .redirect(&env.config.web.change_password.next_uri)?,
                ContentType::Json => ctx.response.empty(StatusCode::OK),
            }
            Ok(RouteOutcome::Handled)
        }
        Err(GatewayError::Identity(IdentityError::NotFound(_)))
            if representation == ContentType::Html =>
        {
            ctx.response.redirect(&error_target(env))?;
            Ok(RouteOutcome::Handled)
        }
        Err(GatewayError::Identity(err)) if representation == ContentType::Html => {
            render_form(env, ctx, sptoken, vec![err.user_message()])?;
            Ok(RouteOutcome::Handled)
        }
        Err(err) => Err(err),
    }
}
