//! Shared setup for the adapter's tests: a host router wrapped by a gateway backed by the
//! in-memory identity client.

use std::sync::Arc;

use authgate::{
    Gateway, GatewayConfig, MemoryIdentityClient, NewAccount, RenderError, ViewRenderer,
};
use axum::{Router, body::Body, response::Response, routing::any, routing::get};
use http::{HeaderName, Method, Request};

use crate::views::AskamaViewRenderer;
use crate::with_authgate_no_trace;

pub(crate) const APPLICATION_HREF: &str = "memory://application";

struct BrokenRenderer;

impl ViewRenderer for BrokenRenderer {
    fn render(&self, _view: &str, _model: &serde_json::Value) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Template("disk on fire".to_string()))
    }
}

fn host() -> Router {
    Router::new()
        .route("/", get(|| async { "host index" }))
        .route(
            "/login",
            any(|body: String| async move { format!("host login: {body}") }),
        )
}

async fn gateway(renderer: Arc<dyn ViewRenderer>) -> Arc<Gateway> {
    let client = MemoryIdentityClient::new(APPLICATION_HREF);
    client
        .seed_account(NewAccount {
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
            given_name: "Alice".to_string(),
            surname: "Liddell".to_string(),
            ..Default::default()
        })
        .await
        .expect("seed alice");

    let config = GatewayConfig {
        application_href: APPLICATION_HREF.to_string(),
        ..Default::default()
    };
    Arc::new(Gateway::new(config, Arc::new(client), renderer).expect("gateway builds"))
}

pub(crate) async fn app() -> Router {
    with_authgate_no_trace(host(), gateway(Arc::new(AskamaViewRenderer)).await)
}

pub(crate) async fn failing_app() -> Router {
    with_authgate_no_trace(host(), gateway(Arc::new(BrokenRenderer)).await)
}

pub(crate) fn request(
    method: Method,
    uri: &str,
    headers: &[(HeaderName, &str)],
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub(crate) async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
