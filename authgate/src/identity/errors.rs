use thiserror::Error;

/// Errors reported by the identity provider.
///
/// Only `status()` and `user_message()` are ever shown to clients; the `Display` output and
/// `developer_message` are for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid credentials ({status}): {message}")]
    InvalidCredentials { status: u16, message: String },

    #[error("Provider rejected request ({status}/{code}): {message}")]
    ProviderRejected {
        status: u16,
        code: u32,
        message: String,
        developer_message: Option<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl IdentityError {
    /// HTTP status reported by the provider, when it reported one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredentials { status, .. } | Self::ProviderRejected { status, .. } => {
                Some(*status)
            }
            Self::NotFound(_) => Some(404),
            Self::Transport(_) => None,
        }
    }

    /// Message that is safe to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message, .. } | Self::ProviderRejected { message, .. } => {
                message.clone()
            }
            Self::NotFound(_) => "The requested resource does not exist.".to_string(),
            Self::Transport(_) => "The identity provider could not be reached.".to_string(),
        }
    }

    pub(crate) fn invalid_login() -> Self {
        Self::InvalidCredentials {
            status: 400,
            message: "Invalid username or password.".to_string(),
        }
    }
}
