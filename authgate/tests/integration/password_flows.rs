//! Password login over both representations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::common::{
    ALICE_EMAIL, ALICE_PASSWORD, EchoRenderer, TestGateway, location, set_cookie_value,
    set_cookies,
};
use async_trait::async_trait;
use authgate::{AuthHooks, GatewayError, HookError, PostLoginContext, PreLoginContext};
use http::header::{ACCEPT, COOKIE};
use http::{Method, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
async fn test_login_page_issues_state_token() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw.get_html("/login?status=created", None).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::OK);

    let token = set_cookie_value(&ctx.response.headers, "oauthStateToken").unwrap();
    assert!(token.len() >= 22, "state token must carry at least 128 bits");

    let (view, model) = EchoRenderer::parse(&ctx.response.body);
    assert_eq!(view, "login");
    assert_eq!(model["status"], "created");
    assert_eq!(model["stateToken"], token.as_str());
    let github = model["providers"][0]["authorizeUri"].as_str().unwrap();
    assert!(github.starts_with("https://github.com/login/oauth/authorize?response_type=code"));
    assert!(github.ends_with(&format!("&state={token}")));
}

#[tokio::test]
async fn test_each_render_issues_a_new_state_token() {
    let gw = TestGateway::start().await;
    let first = gw.state_token().await;
    let second = gw.state_token().await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_login_json_view_model() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw.get_json("/login").await;
    assert!(result.unwrap());
    let model: Value = serde_json::from_slice(&ctx.response.body).unwrap();
    assert_eq!(model["fields"][0]["name"], "login");
    assert_eq!(model["providers"][0]["name"], "github");
    assert!(model["stateToken"].is_null());
    assert!(set_cookies(&ctx.response.headers).is_empty());
}

#[tokio::test]
async fn test_successful_html_login_sets_cookies_and_redirects() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_form(
            "/login?next=https%3A%2F%2Fevil.example.com%2Faccount%3Ftab%3D2",
            "login=alice%40example.com&password=correct+horse",
        )
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/account?tab=2"));

    let cookies = set_cookies(&ctx.response.headers);
    let access = cookies
        .iter()
        .find(|c| c.starts_with("access_token="))
        .expect("access token cookie");
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("Path=/"));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
}

#[tokio::test]
async fn test_html_login_next_never_scheme_relative() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_form(
            "/login?next=%2F.%2F%2Fevil.example.com",
            "login=alice%40example.com&password=correct+horse",
        )
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    let target = location(&ctx.response.headers).expect("location header");
    assert!(!target.starts_with("//"));
    assert_eq!(target, "/evil.example.com");
}

#[tokio::test]
async fn test_successful_html_login_default_next() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_form("/login", "login=alice%40example.com&password=correct+horse")
        .await;
    assert!(result.unwrap());
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/"));
}

#[tokio::test]
async fn test_invalid_credentials_rerenders_form() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_form("/login", "login=a%40b.com&password=secret")
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::OK);
    assert!(set_cookie_value(&ctx.response.headers, "access_token").is_none());

    let (view, model) = EchoRenderer::parse(&ctx.response.body);
    assert_eq!(view, "login");
    assert_eq!(model["fields"][0]["value"], "a@b.com");
    assert_eq!(model["fields"][1]["value"], "");
    assert_eq!(model["errors"], json!(["Invalid username or password."]));
}

#[tokio::test]
async fn test_empty_credentials_never_reach_provider() {
    let hooks = Arc::new(CountingHooks::default());
    let gw = TestGateway::start_with(|_| {}, Some(hooks.clone())).await;

    for body in ["login=&password=secret", "login=a%40b.com&password=", ""] {
        let (result, ctx) = gw.post_form("/login", body).await;
        assert!(result.unwrap());
        let (_, model) = EchoRenderer::parse(&ctx.response.body);
        assert!(!model["errors"].as_array().unwrap().is_empty());
    }

    let (result, ctx) = gw.post_json("/login", json!({"login": "a@b.com"})).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::BAD_REQUEST);

    assert_eq!(hooks.pre_login.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_json_login_success() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_json(
            "/login",
            json!({"username": ALICE_EMAIL, "password": ALICE_PASSWORD}),
        )
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&ctx.response.body).unwrap();
    assert_eq!(body["account"]["email"], ALICE_EMAIL);
    assert_eq!(body["account"]["status"], "ENABLED");
    assert!(body["account"].get("password").is_none());
    assert!(set_cookie_value(&ctx.response.headers, "access_token").is_some());
}

#[tokio::test]
async fn test_json_login_failure_uses_provider_status() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw
        .post_json("/login", json!({"login": ALICE_EMAIL, "password": "wrong"}))
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&ctx.response.body).unwrap();
    assert_eq!(
        body,
        json!({"status": 400, "message": "Invalid username or password."})
    );
    assert!(set_cookies(&ctx.response.headers).is_empty());
}

#[tokio::test]
async fn test_rejecting_hook_faults_html_login() {
    let hooks = Arc::new(CountingHooks {
        reject: true,
        ..Default::default()
    });
    let gw = TestGateway::start_with(|_| {}, Some(hooks.clone())).await;
    let (result, ctx) = gw
        .post_form("/login", "login=alice%40example.com&password=correct+horse")
        .await;
    assert!(matches!(result, Err(GatewayError::Hook(_))));
    assert!(ctx.response.is_untouched());
    assert_eq!(hooks.post_login.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pre_login_hook_can_pin_account_store() {
    let hooks = Arc::new(CountingHooks {
        account_store: Some("memory://elsewhere".to_string()),
        ..Default::default()
    });
    let gw = TestGateway::start_with(|_| {}, Some(hooks)).await;
    let (result, ctx) = gw
        .post_json(
            "/login",
            json!({"login": ALICE_EMAIL, "password": ALICE_PASSWORD}),
        )
        .await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_revokes_and_clears_tokens() {
    let gw = TestGateway::start().await;
    let (_, login) = gw
        .post_form("/login", "login=alice%40example.com&password=correct+horse")
        .await;
    let access = set_cookie_value(&login.response.headers, "access_token").unwrap();
    let refresh = set_cookie_value(&login.response.headers, "refresh_token").unwrap();
    assert_eq!(gw.client.issued_token_count().await, 2);

    let cookie = format!("access_token={access}; refresh_token={refresh}");
    let ctx = TestGateway::context(
        Method::POST,
        "/logout",
        &[(ACCEPT, "text/html"), (COOKIE, &cookie)],
        b"",
    );
    let (result, ctx) = gw.invoke(ctx).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/"));
    assert_eq!(gw.client.issued_token_count().await, 0);

    let cookies = set_cookies(&ctx.response.headers);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("access_token=;") && c.contains("Max-Age=0"))
    );
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("refresh_token=;") && c.contains("Max-Age=0"))
    );
}

#[tokio::test]
async fn test_logout_without_cookies_json() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw.post_json("/logout", json!({})).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::OK);
    assert!(ctx.response.body.is_empty());
    assert_eq!(set_cookies(&ctx.response.headers).len(), 2);
}

#[tokio::test]
async fn test_logout_get_passes_through() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw.get_html("/logout", None).await;
    assert!(!result.unwrap());
    assert!(ctx.response.is_untouched());
}

#[derive(Default)]
struct CountingHooks {
    pre_login: AtomicUsize,
    post_login: AtomicUsize,
    reject: bool,
    account_store: Option<String>,
}

#[async_trait]
impl AuthHooks for CountingHooks {
    async fn pre_login(&self, context: &mut PreLoginContext) -> Result<(), HookError> {
        self.pre_login.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(HookError::Rejected("Logins are paused.".to_string()));
        }
        if let Some(store) = &self.account_store {
            context.account_store = Some(store.clone());
        }
        Ok(())
    }

    async fn post_login(&self, _context: &PostLoginContext) -> Result<(), HookError> {
        self.post_login.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
