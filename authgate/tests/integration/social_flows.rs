//! Social callbacks: state verification, code exchange and account resolution.

use std::sync::{Arc, Mutex};

use crate::common::{
    ALICE_EMAIL, GITHUB_ACCESS_TOKEN, GITHUB_CODE, TestGateway, location, set_cookie_value,
    set_cookies,
};
use async_trait::async_trait;
use authgate::{
    AuthHooks, GatewayConfig, GatewayError, HookError, PostLoginContext,
    PostRegistrationContext, ProviderConfig,
};
use http::StatusCode;

fn state_cookie(token: &str) -> String {
    format!("oauthStateToken={token}")
}

async fn received_exchanges(gw: &TestGateway) -> usize {
    gw.provider
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

fn assert_social_failed(ctx: &authgate::RequestContext) {
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    assert_eq!(
        location(&ctx.response.headers).as_deref(),
        Some("/login?status=social_failed")
    );
    assert!(set_cookie_value(&ctx.response.headers, "access_token").is_none());
    let cleared = set_cookies(&ctx.response.headers)
        .into_iter()
        .any(|c| c.starts_with("oauthStateToken=;") && c.contains("Max-Age=0"));
    assert!(cleared, "state cookie must be cleared on failure");
}

#[tokio::test]
async fn test_new_account_via_code_flow() {
    let gw = TestGateway::start().await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, "octo@example.com", "Octo", "Cat")
        .await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    // new accounts land on the registration target
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/"));
    assert!(set_cookie_value(&ctx.response.headers, "access_token").is_some());
    assert!(set_cookie_value(&ctx.response.headers, "refresh_token").is_some());
    assert_eq!(
        set_cookie_value(&ctx.response.headers, "oauthStateToken").as_deref(),
        Some("")
    );
    assert_eq!(received_exchanges(&gw).await, 1);
}

#[tokio::test]
async fn test_existing_account_uses_login_next_uri() {
    let gw = TestGateway::start_with(
        |config: &mut GatewayConfig| {
            config.web.login.next_uri = "/home".to_string();
            config.web.register.next_uri = "/welcome".to_string();
        },
        None,
    )
    .await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, ALICE_EMAIL, "Alice", "Liddell")
        .await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/home"));
}

#[tokio::test]
async fn test_next_parameter_is_honored() {
    let gw = TestGateway::start().await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, ALICE_EMAIL, "Alice", "Liddell")
        .await;
    let token = gw.state_token().await;

    let uri = format!(
        "/callbacks/github?code={GITHUB_CODE}&state={token}&next=https%3A%2F%2Fevil.example.com%2Fdocs"
    );
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(location(&ctx.response.headers).as_deref(), Some("/docs"));
}

#[tokio::test]
async fn test_missing_or_empty_code_skips_exchange() {
    let gw = TestGateway::start().await;
    let token = gw.state_token().await;

    for uri in [
        format!("/callbacks/github?state={token}"),
        format!("/callbacks/github?code=&state={token}"),
        format!("/callbacks/github?code=%20%20&state={token}"),
    ] {
        let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
        assert!(result.unwrap());
        assert_social_failed(&ctx);
    }
    assert_eq!(received_exchanges(&gw).await, 0);
}

#[tokio::test]
async fn test_state_mismatch_is_rejected_before_exchange() {
    let gw = TestGateway::start().await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, ALICE_EMAIL, "Alice", "Liddell")
        .await;
    let token = gw.state_token().await;
    let other = gw.state_token().await;

    let cases = [
        // state from another login page
        (format!("/callbacks/github?code={GITHUB_CODE}&state={other}"), Some(state_cookie(&token))),
        // no state parameter
        (format!("/callbacks/github?code={GITHUB_CODE}"), Some(state_cookie(&token))),
        // no state cookie
        (format!("/callbacks/github?code={GITHUB_CODE}&state={token}"), None),
    ];
    for (uri, cookie) in cases {
        let (result, ctx) = gw.get_html(&uri, cookie.as_deref()).await;
        assert!(result.unwrap());
        assert_social_failed(&ctx);
    }
    assert_eq!(received_exchanges(&gw).await, 0);
}

#[tokio::test]
async fn test_rejected_code_redirects_to_login() {
    let gw = TestGateway::start().await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code=stale-code&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_social_failed(&ctx);
    assert_eq!(received_exchanges(&gw).await, 1);
}

#[tokio::test]
async fn test_unknown_provider_account_redirects_to_login() {
    // the token endpoint accepts the code but the identity provider does not know the token
    let gw = TestGateway::start().await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_social_failed(&ctx);
    assert_eq!(gw.client.issued_token_count().await, 0);
}

#[tokio::test]
async fn test_access_token_flow() {
    let gw = TestGateway::start_with(
        |config: &mut GatewayConfig| {
            let mut facebook = ProviderConfig::builtin("facebook").unwrap();
            facebook.client_id = "fb-app".to_string();
            facebook.callback_uri = "http://localhost:3001/callbacks/facebook".to_string();
            config.providers.insert("facebook".to_string(), facebook);
        },
        None,
    )
    .await;
    gw.client
        .add_provider_identity("facebook", "EAAB-token", "fb@example.com", "Face", "Book")
        .await;

    let (_, page) = gw.get_html("/login", None).await;
    let token = set_cookie_value(&page.response.headers, "oauthStateToken").unwrap();

    let uri = format!("/callbacks/facebook?access_token=EAAB-token&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(ctx.response.status, StatusCode::FOUND);
    assert!(set_cookie_value(&ctx.response.headers, "access_token").is_some());
    // the access token flow never talks to a token endpoint
    assert_eq!(received_exchanges(&gw).await, 0);
}

#[tokio::test]
async fn test_callback_json_passes_through() {
    let gw = TestGateway::start().await;
    let (result, ctx) = gw.get_json("/callbacks/github?code=good-code").await;
    assert!(!result.unwrap());
    assert!(ctx.response.is_untouched());
}

#[tokio::test]
async fn test_hook_order_for_new_social_account() {
    let hooks = Arc::new(OrderHooks::default());
    let gw = TestGateway::start_with(|_| {}, Some(hooks.clone())).await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, "octo@example.com", "Octo", "Cat")
        .await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, _) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(
        hooks.calls(),
        vec!["post_registration(social)", "post_login(social)"]
    );

    // second login: the account already exists
    let token = gw.state_token().await;
    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, _) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_eq!(hooks.calls().len(), 3);
}

#[tokio::test]
async fn test_failing_hook_turns_into_social_failure() {
    let hooks = Arc::new(OrderHooks {
        fail_post_login: true,
        ..Default::default()
    });
    let gw = TestGateway::start_with(|_| {}, Some(hooks)).await;
    gw.client
        .add_provider_identity("github", GITHUB_ACCESS_TOKEN, ALICE_EMAIL, "Alice", "Liddell")
        .await;
    let token = gw.state_token().await;

    let uri = format!("/callbacks/github?code={GITHUB_CODE}&state={token}");
    let (result, ctx) = gw.get_html(&uri, Some(&state_cookie(&token))).await;
    assert!(result.unwrap());
    assert_social_failed(&ctx);
}

#[tokio::test]
async fn test_cancelled_callback_propagates() {
    let gw = TestGateway::start().await;
    let token = gw.state_token().await;
    let cookie = state_cookie(&token);
    let ctx = TestGateway::context(
        http::Method::GET,
        &format!("/callbacks/github?code={GITHUB_CODE}&state={token}"),
        &[(http::header::ACCEPT, "text/html"), (http::header::COOKIE, &cookie)],
        b"",
    );
    ctx.cancel.cancel();
    let (result, ctx) = gw.invoke(ctx).await;
    assert!(matches!(result, Err(GatewayError::Cancelled)));
    assert!(ctx.response.is_untouched());
}

#[derive(Default)]
struct OrderHooks {
    calls: Mutex<Vec<String>>,
    fail_post_login: bool,
}

impl OrderHooks {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, hook: &str, social: bool) {
        let suffix = if social { "(social)" } else { "" };
        self.calls.lock().unwrap().push(format!("{hook}{suffix}"));
    }
}

#[async_trait]
impl AuthHooks for OrderHooks {
    async fn post_login(&self, context: &PostLoginContext) -> Result<(), HookError> {
        self.record("post_login", context.social);
        if self.fail_post_login {
            return Err(HookError::Failed("audit log unavailable".to_string()));
        }
        Ok(())
    }

    async fn post_registration(&self, context: &PostRegistrationContext) -> Result<(), HookError> {
        self.record("post_registration", context.social);
        Ok(())
    }
}
