use std::sync::Arc;

use authgate::{
    AuthHooks, Gateway, GatewayConfig, GatewayError, MemoryIdentityClient, ProviderConfig,
    RenderError, RequestContext, ViewRenderer,
};
use http::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderValue, Method, Uri};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{
    APPLICATION_HREF, GITHUB_ACCESS_TOKEN, GITHUB_CODE, alice,
};

/// Renders `<view>` followed by the JSON model, so tests can read back what was rendered.
#[derive(Debug, Default)]
pub struct EchoRenderer;

impl ViewRenderer for EchoRenderer {
    fn render(&self, view: &str, model: &Value) -> Result<Vec<u8>, RenderError> {
        Ok(format!("<{view}>{model}").into_bytes())
    }
}

impl EchoRenderer {
    /// Splits a rendered body back into view name and model.
    pub fn parse(body: &[u8]) -> (String, Value) {
        let text = std::str::from_utf8(body).expect("rendered body is utf-8");
        let end = text.find('>').expect("rendered body starts with <view>");
        let view = text[1..end].to_string();
        let model = serde_json::from_str(&text[end + 1..]).expect("model is json");
        (view, model)
    }
}

pub struct TestGateway {
    pub gateway: Gateway,
    pub client: MemoryIdentityClient,
    pub provider: MockServer,
}

impl TestGateway {
    pub async fn start() -> Self {
        Self::start_with(|_| {}, None).await
    }

    /// Gateway with GitHub enabled against a mock token endpoint and Alice seeded.
    pub async fn start_with(
        customize: impl FnOnce(&mut GatewayConfig),
        hooks: Option<Arc<dyn AuthHooks>>,
    ) -> Self {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(body_string_contains(format!("code={GITHUB_CODE}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": GITHUB_ACCESS_TOKEN,
                "token_type": "bearer",
                "scope": "user:email"
            })))
            .mount(&provider)
            .await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code"
            })))
            .mount(&provider)
            .await;

        let mut config = GatewayConfig::default();
        config.application_href = APPLICATION_HREF.to_string();
        let mut github = ProviderConfig::builtin("github").expect("github is builtin");
        github.client_id = "github-client".to_string();
        github.client_secret = "github-secret".to_string();
        github.callback_uri = "http://localhost:3001/callbacks/github".to_string();
        github.token_endpoint = format!("{}/login/oauth/access_token", provider.uri());
        config.providers.insert("github".to_string(), github);
        customize(&mut config);

        let client = MemoryIdentityClient::new(APPLICATION_HREF);
        client.seed_account(alice()).await.expect("seed alice");

        let mut gateway = Gateway::new(config, Arc::new(client.clone()), Arc::new(EchoRenderer))
            .expect("gateway builds");
        if let Some(hooks) = hooks {
            gateway = gateway.with_hooks(hooks);
        }

        Self {
            gateway,
            client,
            provider,
        }
    }

    pub fn context(
        method: Method,
        uri: &str,
        headers: &[(http::HeaderName, &str)],
        body: &[u8],
    ) -> RequestContext {
        let uri: Uri = uri.parse().expect("valid uri");
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(name.clone(), HeaderValue::from_str(value).expect("valid header"));
        }
        RequestContext::new(method, &uri, map, body.to_vec(), CancellationToken::new())
    }

    pub async fn invoke(&self, mut ctx: RequestContext) -> (Result<bool, GatewayError>, RequestContext) {
        let result = self.gateway.invoke(&mut ctx).await;
        (result, ctx)
    }

    pub async fn get_html(&self, uri: &str, cookie: Option<&str>) -> (Result<bool, GatewayError>, RequestContext) {
        let mut headers = vec![(ACCEPT, "text/html")];
        if let Some(cookie) = cookie {
            headers.push((COOKIE, cookie));
        }
        self.invoke(Self::context(Method::GET, uri, &headers, b"")).await
    }

    pub async fn get_json(&self, uri: &str) -> (Result<bool, GatewayError>, RequestContext) {
        self.invoke(Self::context(Method::GET, uri, &[(ACCEPT, "application/json")], b""))
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> (Result<bool, GatewayError>, RequestContext) {
        self.invoke(Self::context(
            Method::POST,
            uri,
            &[
                (ACCEPT, "text/html"),
                (CONTENT_TYPE, "application/x-www-form-urlencoded"),
            ],
            body.as_bytes(),
        ))
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (Result<bool, GatewayError>, RequestContext) {
        let body = serde_json::to_vec(&body).expect("json body");
        self.invoke(Self::context(
            Method::POST,
            uri,
            &[
                (ACCEPT, "application/json"),
                (CONTENT_TYPE, "application/json"),
            ],
            &body,
        ))
        .await
    }

    /// Fetches the login page and returns the issued state token.
    pub async fn state_token(&self) -> String {
        let (result, ctx) = self.get_html("/login", None).await;
        assert!(result.expect("login page renders"));
        super::fixtures::set_cookie_value(&ctx.response.headers, "oauthStateToken")
            .expect("login page sets a state cookie")
    }
}
