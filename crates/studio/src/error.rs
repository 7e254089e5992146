use generation::GenerationError;
use project::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Input the panel refuses to send; the message is shown as-is.
    #[error("{0}")]
    Precondition(String),
    #[error("a request is already in progress")]
    Busy,
    #[error("{0} not found")]
    NotFound(String),
    #[error("could not read {}: {source}", .path.display())]
    Media {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PanelError {
    pub fn precondition(message: impl Into<String>) -> Self {
        PanelError::Precondition(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        PanelError::NotFound(what.into())
    }
}
