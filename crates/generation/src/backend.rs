use crate::{GeneratedImage, GenerationError, ImageRequest, PromptSpec, VideoOperation, VideoRequest};
use async_trait::async_trait;

/// Transport to a generative service. Implementations only move bytes; typed
/// parsing lives in [`GenerationService`](crate::GenerationService).
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Raw text of the first candidate.
    async fn generate_content(&self, spec: &PromptSpec) -> Result<String, GenerationError>;

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, GenerationError>;

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation, GenerationError>;

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenerationError>;

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError>;
}
