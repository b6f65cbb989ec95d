use std::future::Future;
use std::pin::Pin;

use http::Method;

use crate::coordination::GatewayError;
use crate::negotiation::ContentType;

use super::gateway::RouteEnv;
use super::request::RequestContext;

/// What a handler did with the request.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Response fully written; stop the pipeline.
    Handled,
    /// Not ours; the response must be left untouched.
    NotHandled,
    /// Something failed; the dispatcher still owes the host a response or an error.
    Faulted(GatewayError),
}

pub(crate) type HandlerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RouteOutcome, GatewayError>> + Send + 'a>>;

pub(crate) type Handler =
    for<'a> fn(&'a RouteEnv, &'a BoundRoute, &'a mut RequestContext) -> HandlerFuture<'a>;

/// The four `(method, representation)` slots of a route. Empty slots mean `NotHandled`.
#[derive(Clone, Copy, Default)]
pub(crate) struct HandlerTable {
    pub(crate) get_json: Option<Handler>,
    pub(crate) get_html: Option<Handler>,
    pub(crate) post_json: Option<Handler>,
    pub(crate) post_html: Option<Handler>,
}

impl HandlerTable {
    pub(crate) fn slot(&self, method: &Method, representation: ContentType) -> Option<Handler> {
        // Method names are case-sensitive; a lowercase `get` is not GET and passes through.
        match (method, representation) {
            (&Method::GET, ContentType::Json) => self.get_json,
            (&Method::GET, ContentType::Html) => self.get_html,
            (&Method::POST, ContentType::Json) => self.post_json,
            (&Method::POST, ContentType::Html) => self.post_html,
            _ => None,
        }
    }
}

/// A handler table mounted at a path.
#[derive(Clone)]
pub(crate) struct BoundRoute {
    pub(crate) path: String,
    pub(crate) table: HandlerTable,
    /// Set for social callback routes.
    pub(crate) provider: Option<String>,
}
