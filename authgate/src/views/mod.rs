//! View names, view models, and the renderer seam.

mod models;

use thiserror::Error;

pub use models::{
    ChangePasswordViewModel, FormFieldModel, ForgotPasswordViewModel, LoginViewModel,
    ProviderLinkModel, RegisterViewModel,
};

pub(crate) use models::{login_view_model, register_view_model};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Invalid view model: {0}")]
    Model(String),

    #[error("Template error: {0}")]
    Template(String),
}

/// Turns a view model into markup.
///
/// `view` is one of the configured view names (`login`, `register`, `forgot_password`,
/// `change_password` by default); `model` is the serialized view model for that view.
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<Vec<u8>, RenderError>;
}
