use shared::error::{ApiError, FieldError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {}", .error.message)]
    Api { status: u16, error: ApiError },
    #[error("{0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Api { error, .. } => &error.fields,
            _ => &[],
        }
    }

    /// Message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { error, .. } => error.message.clone(),
            Self::Transport(_) => "Network error, please try again".to_string(),
            Self::InvalidUrl(err) => format!("invalid server url: {err}"),
            Self::Unavailable(message) => message.clone(),
        }
    }
}
