//! Concrete routes, each a handler table mounted at a configured path.

mod body;
mod change_password;
mod forgot_password;
mod login;
mod logout;
mod register;
mod social;

use http::StatusCode;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::coordination::GatewayError;
use crate::dispatch::{BoundRoute, RequestContext, RouteEnv};
use crate::utils::{first_param, same_origin_target};

pub(crate) use body::{FormBody, parse_body};

/// Mounts every enabled route. Disabled routes are simply absent, so requests to their
/// paths pass through.
pub(crate) fn bind_routes(config: &GatewayConfig) -> Vec<BoundRoute> {
    let web = &config.web;
    let mut routes = Vec::new();

    for (route_config, table) in [
        (&web.login, login::table()),
        (&web.register, register::table()),
        (&web.logout, logout::table()),
        (&web.forgot_password, forgot_password::table()),
        (&web.change_password, change_password::table()),
    ] {
        if route_config.enabled {
            routes.push(BoundRoute {
                path: route_config.uri.clone(),
                table,
                provider: None,
            });
        }
    }

    for name in config.providers.keys() {
        routes.push(BoundRoute {
            path: config.callback_path(name),
            table: social::table(),
            provider: Some(name.clone()),
        });
    }

    routes
}

/// Renders `view` with `model` into the response.
pub(super) fn render_view<T: Serialize>(
    env: &RouteEnv,
    ctx: &mut RequestContext,
    view: &str,
    model: &T,
) -> Result<(), GatewayError> {
    let model = serde_json::to_value(model)
        .map_err(|e| GatewayError::Unexpected(format!("Failed to serialize view model: {e}")))?;
    let markup = env.renderer.render(view, &model)?;
    ctx.response.html(StatusCode::OK, markup);
    Ok(())
}

/// Where to send the browser after success: the `next` query parameter reduced to a
/// same-origin path, or the configured default.
pub(super) fn next_target(ctx: &RequestContext, default: &str) -> String {
    first_param(&ctx.query, "next")
        .and_then(same_origin_target)
        .or_else(|| same_origin_target(default))
        .unwrap_or_else(|| "/".to_string())
}

/// `uri` with `status=<status>` appended.
pub(super) fn with_status(uri: &str, status: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}status={}", urlencoding::encode(status))
}
