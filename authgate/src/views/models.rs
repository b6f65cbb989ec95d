use serde::{Deserialize, Serialize};

use crate::config::{GatewayConfig, ProviderFlow};
use crate::utils::Params;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldModel {
    pub name: String,
    pub label: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLinkModel {
    pub name: String,
    pub authorize_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginViewModel {
    pub login_uri: String,
    pub register_uri: Option<String>,
    pub forgot_password_uri: Option<String>,
    pub fields: Vec<FormFieldModel>,
    pub providers: Vec<ProviderLinkModel>,
    pub status: Option<String>,
    pub state_token: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterViewModel {
    pub register_uri: String,
    pub login_uri: String,
    pub fields: Vec<FormFieldModel>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordViewModel {
    pub forgot_password_uri: String,
    pub login_uri: String,
    pub status: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordViewModel {
    pub change_password_uri: String,
    pub login_uri: String,
    pub sptoken: String,
    pub errors: Vec<String>,
}

fn enabled_uri(enabled: bool, uri: &str) -> Option<String> {
    enabled.then(|| uri.to_string())
}

/// Authorization link for one provider. The state token rides along in `state` when there
/// is one.
fn provider_link(config: &GatewayConfig, name: &str, state_token: Option<&str>) -> Option<ProviderLinkModel> {
    let provider = config.providers.get(name)?;
    let response_type = match provider.flow {
        ProviderFlow::AuthorizationCode => "code",
        ProviderFlow::AccessToken => "token",
    };
    let mut authorize_uri = format!(
        "{}?response_type={}&client_id={}&redirect_uri={}&scope={}",
        provider.authorize_uri,
        response_type,
        urlencoding::encode(&provider.client_id),
        urlencoding::encode(&provider.callback_uri),
        urlencoding::encode(&provider.scope),
    );
    if let Some(state) = state_token {
        authorize_uri.push_str("&state=");
        authorize_uri.push_str(&urlencoding::encode(state));
    }
    Some(ProviderLinkModel {
        name: name.to_string(),
        authorize_uri,
    })
}

/// Login form model. `submitted` re-populates the login field; the password never is.
pub(crate) fn login_view_model(
    config: &GatewayConfig,
    submitted_login: Option<&str>,
    status: Option<&str>,
    state_token: Option<&str>,
    errors: Vec<String>,
) -> LoginViewModel {
    let web = &config.web;
    let fields = vec![
        FormFieldModel {
            name: "login".to_string(),
            label: "Username or Email".to_string(),
            placeholder: "Username or Email".to_string(),
            field_type: "text".to_string(),
            required: true,
            value: submitted_login.unwrap_or_default().to_string(),
        },
        FormFieldModel {
            name: "password".to_string(),
            label: "Password".to_string(),
            placeholder: "Password".to_string(),
            field_type: "password".to_string(),
            required: true,
            value: String::new(),
        },
    ];

    LoginViewModel {
        login_uri: web.login.uri.clone(),
        register_uri: enabled_uri(web.register.enabled, &web.register.uri),
        forgot_password_uri: enabled_uri(web.forgot_password.enabled, &web.forgot_password.uri),
        fields,
        providers: config
            .providers
            .keys()
            .filter_map(|name| provider_link(config, name, state_token))
            .collect(),
        status: status.map(str::to_string),
        state_token: state_token.map(str::to_string),
        errors,
    }
}

/// Registration form model built from the enabled field definitions.
pub(crate) fn register_view_model(
    config: &GatewayConfig,
    submitted: Option<&Params>,
    errors: Vec<String>,
) -> RegisterViewModel {
    let web = &config.web;
    let fields = web
        .register_fields
        .iter()
        .filter(|field| field.enabled)
        .map(|field| {
            let value = if field.field_type == "password" {
                String::new()
            } else {
                submitted
                    .and_then(|params| params.get(&field.name))
                    .and_then(|values| values.first())
                    .cloned()
                    .unwrap_or_default()
            };
            FormFieldModel {
                name: field.name.clone(),
                label: field.label.clone(),
                placeholder: field.placeholder.clone(),
                field_type: field.field_type.clone(),
                required: field.required,
                value,
            }
        })
        .collect();

    RegisterViewModel {
        register_uri: web.register.uri.clone(),
        login_uri: web.login.uri.clone(),
        fields,
        errors,
    }
}
