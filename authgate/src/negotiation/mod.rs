mod negotiate;
mod types;

pub use negotiate::negotiate;
pub use types::{ContentNegotiationResult, ContentType};
