use http::StatusCode;

use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::identity::IdentityError;
use crate::negotiation::ContentType;
use crate::utils::first_param;
use crate::views::ForgotPasswordViewModel;

use super::{parse_body, render_view};

const MISSING_EMAIL: &str = "Email is required.";

pub(super) fn table() -> HandlerTable {
    HandlerTable {
        get_html: Some(get_html),
        post_json: Some(post_json),
        post_html: Some(post_html),
        ..Default::default()
    }
}

fn get_html<'a>(
    env: &'a RouteEnv,
    _route: &'a BoundRoute,
    ctx: &'a mut RequestContext,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        render_form(env, ctx, Vec::new())?;
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
    errors: Vec<String>,
) -> Result<(), GatewayError> {
    let web = &env.config.web;
    let model = ForgotPasswordViewModel {
        forgot_password_uri: web.forgot_password.uri.clone(),
        login_uri: web.login.uri.clone(),
        status: first_param(&ctx.query, "status").map(str::to_string),
        errors,
    };
    render_view(env, ctx, &web.forgot_password.view, &model)
}

async fn post(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    representation: ContentType,
) -> Result<RouteOutcome, GatewayError> {
    let form = parse_body(&ctx.headers, &ctx.body)?;
    let Some(email) = form.get("email").map(str::to_string) else {
        return match representation {
            ContentType::Html => {
                render_form(env, ctx, vec![MISSING_EMAIL.to_string()])?;
                Ok(RouteOutcome::Handled)
            }
            ContentType::Json => Err(GatewayError::InvalidInput(MISSING_EMAIL.to_string())),
        };
    };

    // Unknown accounts look exactly like known ones from the outside
    match env
        .identity
        .send_password_reset_email(&email, &ctx.cancel)
        .await
    {
        Ok(()) => {}
        Err(GatewayError::Identity(IdentityError::NotFound(_))) => {
            tracing::debug!("Password reset requested for unknown account");
        }
        Err(err) => return Err(err),
    }

    match representation {
        ContentType::Html => ctx
            .response
            .redirect(&env.config.web.forgot_password.next_uri)?,
        ContentType::Json => ctx.response.empty(StatusCode::OK),
    }
    Ok(RouteOutcome::Handled)
}
