use askama::Template;
use serde::de::DeserializeOwned;
use serde_json::Value;

use authgate::{
    ChangePasswordViewModel, ForgotPasswordViewModel, LoginViewModel, RegisterViewModel,
    RenderError, ViewRenderer,
};

/// Renders the built-in views with askama.
///
/// View names must be the defaults (`login`, `register`, `forgot_password`,
/// `change_password`); hosts that rename views supply their own [`ViewRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AskamaViewRenderer;

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate {
    view: LoginViewModel,
    notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "register.j2", escape = "html")]
struct RegisterTemplate {
    view: RegisterViewModel,
}

#[derive(Template)]
#[template(path = "forgot_password.j2", escape = "html")]
struct ForgotPasswordTemplate {
    view: ForgotPasswordViewModel,
    notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "change_password.j2", escape = "html")]
struct ChangePasswordTemplate {
    view: ChangePasswordViewModel,
}

fn parse_model<T: DeserializeOwned>(model: &Value) -> Result<T, RenderError> {
    T::deserialize(model).map_err(|e| RenderError::Model(e.to_string()))
}

/// Banner text for the `status` query parameter the gateway redirects with.
fn status_notice(status: Option<&str>) -> Option<&'static str> {
    match status? {
        "created" => Some("Your account has been created. You may now log in."),
        "unverified" => Some("Your account has been created. Check your email to verify it."),
        "forgot" => Some("If an account exists for that email, a reset link is on its way."),
        "reset" => Some("Your password has been changed. You may now log in."),
        "social_failed" => Some("Social login failed. Please try again."),
        "invalid_sptoken" => Some("That reset link is invalid or has expired. Request a new one."),
        _ => None,
    }
}

impl ViewRenderer for AskamaViewRenderer {
    fn render(&self, view: &str, model: &Value) -> Result<Vec<u8>, RenderError> {
        let html = match view {
            "login" => {
                let view: LoginViewModel = parse_model(model)?;
                let notice = status_notice(view.status.as_deref());
                LoginTemplate { view, notice }.render()
            }
            "register" => RegisterTemplate {
                view: parse_model(model)?,
            }
            .render(),
            "forgot_password" => {
                let view: ForgotPasswordViewModel = parse_model(model)?;
                let notice = status_notice(view.status.as_deref());
                ForgotPasswordTemplate { view, notice }.render()
            }
            "change_password" => ChangePasswordTemplate {
                view: parse_model(model)?,
            }
            .render(),
            other => return Err(RenderError::UnknownView(other.to_string())),
        }
        .map_err(|e| RenderError::Template(e.to_string()))?;
        Ok(html.into_bytes())
    }
}
