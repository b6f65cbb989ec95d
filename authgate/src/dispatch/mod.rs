mod gateway;
mod request;
mod table;

pub use gateway::Gateway;
pub use request::{GatewayResponse, RequestContext};
pub use table::RouteOutcome;

pub(crate) use gateway::RouteEnv;
pub(crate) use table::{BoundRoute, HandlerFuture, HandlerTable};
