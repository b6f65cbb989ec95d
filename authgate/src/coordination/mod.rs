//! Identity exchange coordination
//!
//! Ties the identity-provider client, the lifecycle hooks and cancellation together:
//! - `errors`: the gateway-boundary error type
//! - `exchange`: password grant, social account resolution, registration, password reset
//! - `hooks`: pre/post login and registration extension points

mod errors;
mod exchange;
mod hooks;

pub use errors::GatewayError;
pub use exchange::IdentityExchange;
pub use hooks::{
    AuthHooks, HookError, NoopHooks, PostLoginContext, PostRegistrationContext, PreLoginContext,
    PreRegistrationContext,
};
