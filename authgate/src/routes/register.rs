use http::StatusCode;
use serde_json::{Value, json};

use crate::config::GatewayConfig;
use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, HandlerFuture, HandlerTable, RequestContext, RouteEnv, RouteOutcome};
use crate::identity::{AccountStatus, NewAccount};
use crate::negotiation::ContentType;
use crate::session::add_token_cookies;
use crate::utils::Params;
use crate::views::register_view_model;

use super::{FormBody, parse_body, render_view, with_status};

/// Fields that map onto the account itself; anything else goes to custom data.
const ACCOUNT_FIELDS: [&str; 7] = [
    "email",
    "password",
    "confirmPassword",
    "givenName",
    "surname",
    "middleName",
    "username",
];

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
        let model = register_view_model(&env.config, None, Vec::new());
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
        render_register_form(env, ctx, None, Vec::new())?;
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

fn render_register_form(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    submitted: Option<&Params>,
    errors: Vec<String>,
) -> Result<(), GatewayError> {
    let model = register_view_model(&env.config, submitted, errors);
    render_view(env, ctx, &env.config.web.register.view, &model)
}

/// Checks required fields and the password confirmation.
fn validate(config: &GatewayConfig, form: &FormBody) -> Vec<String> {
    let mut errors: Vec<String> = config
        .web
        .register_fields
        .iter()
        .filter(|field| field.enabled && field.required)
        .filter(|field| form.get_raw(&field.name).is_none_or(|v| v.trim().is_empty()))
        .map(|field| format!("{} is required.", field.label))
        .collect();

    let confirm_enabled = config
        .web
        .register_fields
        .iter()
        .any(|field| field.name == "confirmPassword" && field.enabled);
    if confirm_enabled && form.get_raw("password") != form.get_raw("confirmPassword") {
        errors.push("Passwords do not match.".to_string());
    }
    errors
}

fn new_account(form: &FormBody) -> NewAccount {
    let mut custom_data = form.custom_data.clone();
    for (key, values) in &form.params {
        if ACCOUNT_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = values.first() {
            custom_data.insert(key.clone(), Value::String(value.clone()));
        }
    }

    NewAccount {
        email: form.get("email").unwrap_or_default().to_string(),
        password: form.get_raw("password").unwrap_or_default().to_string(),
        given_name: form.get("givenName").unwrap_or_default().to_string(),
        surname: form.get("surname").unwrap_or_default().to_string(),
        middle_name: form.get("middleName").map(str::to_string),
        username: form.get("username").map(str::to_string),
        custom_data,
    }
}

async fn post(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    representation: ContentType,
) -> Result<RouteOutcome, GatewayError> {
    let form = parse_body(&ctx.headers, &ctx.body)?;

    let errors = validate(&env.config, &form);
    if !errors.is_empty() {
        return match representation {
            ContentType::Html => {
                render_register_form(env, ctx, Some(&form.params), errors)?;
                Ok(RouteOutcome::Handled)
            }
            ContentType::Json => Err(GatewayError::InvalidInput(errors.join(" "))),
        };
    }

    let account = match env
        .identity
        .register(new_account(&form), &ctx.headers, &ctx.cancel)
        .await
    {
        Ok(account) => account,
        Err(GatewayError::Identity(err)) if representation == ContentType::Html => {
            render_register_form(env, ctx, Some(&form.params), vec![err.user_message()])?;
            return Ok(RouteOutcome::Handled);
        }
        Err(err) => return Err(err),
    };

    let web = &env.config.web;
    match representation {
        ContentType::Json => {
            ctx.response
                .json(StatusCode::OK, &json!({ "account": account }))?;
        }
        ContentType::Html if web.register.auto_login && account.status == AccountStatus::Enabled => {
            let result = env.identity.login_account(&account, &ctx.cancel).await?;
            add_token_cookies(&mut ctx.response.headers, web, &result)?;
            ctx.response.redirect(&web.register.next_uri)?;
        }
        ContentType::Html => {
            let status = match account.status {
                AccountStatus::Unverified => "unverified",
                _ => "created",
            };
            ctx.response.redirect(&with_status(&web.login.uri, status))?;
        }
    }
    Ok(RouteOutcome::Handled)
}
