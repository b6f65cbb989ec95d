//! authgate - Embeddable authentication gateway
//!
//! Intercepts the login, registration, logout, password-reset and social-callback paths of
//! a web application, answers them as HTML views or JSON, and delegates identity
//! operations to an external identity provider.
//!
//! The crate is framework-agnostic: a host adapter builds a [`RequestContext`] from its
//! own request type, calls [`Gateway::invoke`], and either returns
//! [`RequestContext::response`] or passes the request on.

mod config;
mod coordination;
mod dispatch;
mod identity;
mod negotiation;
mod oauth2;
mod routes;
mod session;
mod utils;
mod views;

#[cfg(test)]
mod test_utils;

pub use config::{
    CookieConfig, FormFieldConfig, GatewayConfig, ProviderConfig, ProviderFlow, RouteConfig,
    WebConfig,
};

pub use coordination::{
    AuthHooks, GatewayError, HookError, IdentityExchange, NoopHooks, PostLoginContext,
    PostRegistrationContext, PreLoginContext, PreRegistrationContext,
};

pub use dispatch::{Gateway, GatewayResponse, RequestContext, RouteOutcome};

pub use identity::{
    Account, AccountStatus, Application, IdentityClient, IdentityError, MemoryIdentityClient,
    NewAccount, PasswordGrantRequest, ProviderAccountResult, ProviderCredential, SentResetEmail,
    SessionGrant, TokenHandle,
};

pub use negotiation::{ContentNegotiationResult, ContentType, negotiate};

pub use oauth2::{CodeExchanger, OAuth2Error, TokenExchangeRequest, sanitize_code};

pub use session::{
    ExchangeResult, SessionError, issue_state_token, read_cookie, read_state_token,
    verify_state_token,
};

pub use utils::{Params, UtilError};

pub use views::{
    ChangePasswordViewModel, FormFieldModel, ForgotPasswordViewModel, LoginViewModel,
    ProviderLinkModel, RegisterViewModel, RenderError, ViewRenderer,
};
