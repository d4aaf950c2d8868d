use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("position unavailable: {0}")]
    Position(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for inline display. Backend rejections surface the
    /// server's own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}
