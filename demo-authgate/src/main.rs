use std::sync::Arc;

use axum::{Router, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate::{GatewayConfig, MemoryIdentityClient, NewAccount};
use authgate_axum::{AskamaViewRenderer, Gateway, with_authgate};

mod handlers;
mod server;

use crate::{
    handlers::{LoggingHooks, index},
    server::spawn_http_server,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,authgate=debug,tower_http=info", env!("CARGO_CRATE_NAME"))
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env();

    // The demo keeps its accounts in memory; restart to reset.
    let client = MemoryIdentityClient::new(&config.application_href);
    client
        .seed_account(NewAccount {
            email: "demo@example.com".to_string(),
            password: "demo password".to_string(),
            given_name: "Demo".to_string(),
            surname: "User".to_string(),
            ..Default::default()
        })
        .await?;

    let gateway = Gateway::new(config, Arc::new(client), Arc::new(AskamaViewRenderer))?
        .with_hooks(Arc::new(LoggingHooks));

    let app = with_authgate(Router::new().route("/", get(index)), Arc::new(gateway));

    let port = std::env::var("AUTHGATE_DEMO_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3001);

    spawn_http_server(port, app).await??;
    Ok(())
}
