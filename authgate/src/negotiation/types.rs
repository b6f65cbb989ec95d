use serde::{Deserialize, Serialize};

/// A representation the gateway can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Json,
    Html,
}

impl ContentType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html",
        }
    }

    pub(crate) fn type_and_subtype(&self) -> (&'static str, &'static str) {
        match self {
            Self::Json => ("application", "json"),
            Self::Html => ("text", "html"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "application/json" | "json" => Ok(Self::Json),
            "text/html" | "html" => Ok(Self::Html),
            other => Err(format!("Unsupported content type: {other}")),
        }
    }
}

/// Outcome of negotiating an `Accept` header against the server's representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNegotiationResult {
    /// `None` when the client accepts nothing the server produces.
    pub preferred: Option<ContentType>,
    pub supported: Vec<ContentType>,
}
