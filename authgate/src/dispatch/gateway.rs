use std::sync::Arc;

use http::StatusCode;
use http::header::ACCEPT;
use serde_json::json;

use crate::config::GatewayConfig;
use crate::coordination::{AuthHooks, GatewayError, IdentityExchange};
use crate::identity::IdentityClient;
use crate::negotiation::{ContentType, negotiate};
use crate::oauth2::CodeExchanger;
use crate::routes;
use crate::views::ViewRenderer;

use super::request::RequestContext;
use super::table::{BoundRoute, RouteOutcome};

/// Everything a route handler may use. Shared, immutable, built once.
pub(crate) struct RouteEnv {
    pub(crate) config: GatewayConfig,
    pub(crate) identity: IdentityExchange,
    pub(crate) exchanger: CodeExchanger,
    pub(crate) renderer: Arc<dyn ViewRenderer>,
}

/// The authentication gateway: decides whether a request is one of its routes, negotiates
/// the representation, runs the matching handler and sanitizes its failures.
pub struct Gateway {
    env: RouteEnv,
    routes: Vec<BoundRoute>,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        client: Arc<dyn IdentityClient>,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Result<Self, GatewayError> {
        let routes = routes::bind_routes(&config);
        for route in &routes {
            tracing::debug!("Mounted route {}", route.path);
        }

        Ok(Self {
            env: RouteEnv {
                identity: IdentityExchange::new(client, &config.application_href),
                exchanger: CodeExchanger::new()?,
                renderer,
                config,
            },
            routes,
        })
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AuthHooks>) -> Self {
        self.env.identity.hooks = hooks;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.env.config
    }

    /// Whether any route is mounted at `path`. Cheap enough to call before buffering a body.
    pub fn handles_path(&self, path: &str) -> bool {
        self.find_route(path).is_some()
    }

    fn find_route(&self, path: &str) -> Option<&BoundRoute> {
        self.routes.iter().find(|route| route.path == path)
    }

    /// Runs the gateway for one request.
    ///
    /// - `Ok(true)`: `ctx.response` holds the complete response.
    /// - `Ok(false)`: not ours, `ctx.response` is untouched.
    /// - `Err(_)`: an HTML-mode fault or a cancellation the host must deal with;
    ///   `ctx.response` is untouched.
    pub async fn invoke(&self, ctx: &mut RequestContext) -> Result<bool, GatewayError> {
        let Some(route) = self.find_route(&ctx.path) else {
            return Ok(false);
        };

        let accept = ctx.headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        let negotiation = negotiate(accept, &self.env.config.web.produces);
        let Some(preferred) = negotiation.preferred else {
            tracing::debug!(
                "No acceptable representation for {} (Accept: {:?})",
                ctx.path,
                accept
            );
            return Ok(false);
        };

        let Some(handler) = route.table.slot(&ctx.method, preferred) else {
            tracing::debug!("No {} {:?} handler for {}", ctx.method, preferred, ctx.path);
            return Ok(false);
        };

        tracing::info!("Handling {} {} as {:?}", ctx.method, ctx.path, preferred);

        let cancel = ctx.cancel.clone();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => RouteOutcome::Faulted(GatewayError::Cancelled),
            result = handler(&self.env, route, ctx) => {
                result.unwrap_or_else(RouteOutcome::Faulted)
            }
        };

        match outcome {
            RouteOutcome::Handled => Ok(true),
            RouteOutcome::NotHandled => {
                ctx.response.reset();
                Ok(false)
            }
            RouteOutcome::Faulted(err) => {
                ctx.response.reset();
                self.sanitize(ctx, preferred, err)
            }
        }
    }

    fn sanitize(
        &self,
        ctx: &mut RequestContext,
        preferred: ContentType,
        err: GatewayError,
    ) -> Result<bool, GatewayError> {
        if err.is_cancelled() {
            tracing::debug!("Request to {} cancelled", ctx.path);
            return Err(err);
        }

        match preferred {
            ContentType::Json => {
                let status = err.status();
                let message = err.log().client_message();
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::BAD_REQUEST);
                ctx.response.json(
                    code,
                    &json!({
                        "status": code.as_u16(),
                        "message": message,
                    }),
                )?;
                Ok(true)
            }
            ContentType::Html => Err(err.log()),
        }
    }
}
