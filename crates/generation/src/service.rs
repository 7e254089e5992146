use crate::{
    GeminiBackend, GenerationConfig, GenerationError, GenerativeBackend, ImageRequest, PromptSpec,
    ScriptedBackend, VideoJob, VideoRequest,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Typed front door to a [`GenerativeBackend`].
#[derive(Clone)]
pub struct GenerationService {
    backend: Arc<dyn GenerativeBackend>,
    config: Arc<GenerationConfig>,
}

impl GenerationService {
    pub fn new(backend: Arc<dyn GenerativeBackend>, config: GenerationConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    pub fn gemini(config: GenerationConfig) -> Result<Self, GenerationError> {
        let backend = GeminiBackend::new(config.clone())?;
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn offline(config: GenerationConfig) -> Self {
        Self::new(Arc::new(ScriptedBackend::offline()), config)
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn GenerativeBackend> {
        Arc::clone(&self.backend)
    }

    /// Runs a prompt and parses the reply as `T`. Markdown code fences around
    /// the JSON are tolerated.
    pub async fn generate<T: DeserializeOwned>(&self, spec: PromptSpec) -> Result<T, GenerationError> {
        let raw = self.generate_raw(&spec).await?;
        let body = strip_code_fences(&raw);
        serde_json::from_str(body).map_err(|err| {
            let preview: String = body.chars().take(200).collect();
            GenerationError::invalid_response(format!(
                "Could not parse {} reply: {err}; got: {preview}",
                spec.model
            ))
        })
    }

    /// Free-text reply, trimmed.
    pub async fn generate_text(&self, spec: PromptSpec) -> Result<String, GenerationError> {
        Ok(self.generate_raw(&spec).await?.trim().to_string())
    }

    async fn generate_raw(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        let start = Instant::now();
        debug!(model = %spec.model, prompt = %spec.prompt_text(), "content request");
        let raw = self.backend.generate_content(spec).await?;
        debug!(
            model = %spec.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = raw.len(),
            "content reply"
        );
        Ok(raw)
    }

    /// One image from the configured image model, as a `data:` URL.
    pub async fn generate_image(&self, prompt: impl Into<String>) -> Result<String, GenerationError> {
        self.generate_image_with(ImageRequest::new(self.config.image_model.clone(), prompt))
            .await
    }

    pub async fn generate_image_with(&self, request: ImageRequest) -> Result<String, GenerationError> {
        debug!(model = %request.model, prompt = %request.prompt, "image request");
        let images = self.backend.generate_images(&request).await?;
        images
            .into_iter()
            .next()
            .map(|image| image.data_url())
            .ok_or_else(|| GenerationError::invalid_response("Image model returned no images."))
    }

    /// Starts a video render and hands back the polling job.
    pub async fn generate_video(&self, request: VideoRequest) -> Result<VideoJob, GenerationError> {
        let operation = self.backend.start_video(&request).await?;
        info!(operation = %operation.name, model = %request.model, "video job started");
        Ok(VideoJob::spawn(
            self.backend(),
            operation,
            self.config.video_poll_interval(),
        ))
    }

    /// Downloads a finished video into a `data:video/mp4` URL.
    pub async fn fetch_video(&self, uri: &str) -> Result<String, GenerationError> {
        let bytes = self.backend.download_video(uri).await?;
        Ok(format!("data:video/mp4;base64,{}", STANDARD.encode(bytes)))
    }
}

/// Drops a surrounding ```` ```json ```` fence if the model added one.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }
}
