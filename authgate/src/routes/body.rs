use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::coordination::GatewayError;
use crate::utils::{Params, first_param, parse_params};

/// A submitted form, from either a JSON or a url-encoded body.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FormBody {
    pub(crate) params: Params,
    /// Nested `customData` object of a JSON body.
    pub(crate) custom_data: Map<String, Value>,
}

impl FormBody {
    /// First value of `key`, trimmed. Blank values count as absent.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        first_param(&self.params, key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Like `get` but without trimming, for passwords.
    pub(crate) fn get_raw(&self, key: &str) -> Option<&str> {
        first_param(&self.params, key).filter(|value| !value.is_empty())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn from_json(body: &[u8]) -> Result<FormBody, GatewayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidInput(format!("Malformed JSON body: {e}")))?;
    let Value::Object(object) = value else {
        return Err(GatewayError::InvalidInput(
            "JSON body must be an object".to_string(),
        ));
    };

    let mut form = FormBody::default();
    for (key, value) in object {
        match value {
            Value::Object(nested) if key == "customData" => form.custom_data = nested,
            Value::Array(items) => {
                let values: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
                if !values.is_empty() {
                    form.params.insert(key, values);
                }
            }
            other => {
                if let Some(value) = scalar_to_string(&other) {
                    form.params.insert(key, vec![value]);
                }
            }
        }
    }
    Ok(form)
}

/// Parses a POST body according to its `Content-Type`.
///
/// An empty body without a content type is an empty form; any other media type is an
/// unexpected request.
pub(crate) fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<FormBody, GatewayError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        });

    match content_type.as_deref() {
        Some("application/json") => from_json(body),
        Some("application/x-www-form-urlencoded") => {
            let text = std::str::from_utf8(body)
                .map_err(|_| GatewayError::InvalidInput("Form body is not UTF-8".to_string()))?;
            Ok(FormBody {
                params: parse_params(text),
                custom_data: Map::new(),
            })
        }
        None if body.is_empty() => Ok(FormBody::default()),
        other => Err(GatewayError::Unexpected(format!(
            "Unsupported content type: {}",
            other.unwrap_or("none")
        ))),
    }
}
