use thiserror::Error;

/// Failure talking to the generative service. `Display` is the message shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    InvalidResponse(String),
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("video generation failed: {0}")]
    JobFailed(String),
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        GenerationError::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        GenerationError::Transport(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        GenerationError::InvalidResponse(msg.into())
    }

    /// Maps an HTTP error status to the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => GenerationError::Authentication(message),
            429 => GenerationError::RateLimited(message),
            _ => GenerationError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GenerationError::from_status(status.as_u16(), err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}
