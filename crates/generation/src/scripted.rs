use crate::{
    GeneratedImage, GenerationError, GenerativeBackend, ImageRequest, PromptSpec, VideoOperation,
    VideoRequest,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// 1x1 white PNG used when no image reply is queued in offline mode.
pub const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Content(PromptSpec),
    Images(ImageRequest),
    StartVideo(VideoRequest),
    PollVideo(String),
    DownloadVideo(String),
}

/// What to do when a queue runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    /// Fail the call.
    Fail,
    /// Synthesize a reply: schema samples for content, a placeholder image,
    /// an immediately finished video.
    Synthesize,
}

/// Backend that replays queued replies in order and records every request.
pub struct ScriptedBackend {
    texts: Mutex<VecDeque<Result<String, GenerationError>>>,
    images: Mutex<VecDeque<Result<Vec<GeneratedImage>, GenerationError>>>,
    polls: Mutex<VecDeque<Result<VideoOperation, GenerationError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    exhausted: Exhausted,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(VecDeque::new()),
            images: Mutex::new(VecDeque::new()),
            polls: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            exhausted: Exhausted::Fail,
        }
    }

    /// Never fails for lack of script; used by `--offline`.
    pub fn offline() -> Self {
        Self {
            exhausted: Exhausted::Synthesize,
            ..Self::new()
        }
    }

    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.texts.lock().push_back(Ok(text.into()));
        self
    }

    pub fn push_json(&self, value: serde_json::Value) -> &Self {
        self.push_text(value.to_string())
    }

    pub fn push_text_error(&self, err: GenerationError) -> &Self {
        self.texts.lock().push_back(Err(err));
        self
    }

    pub fn push_image(&self, base64: impl Into<String>) -> &Self {
        self.images.lock().push_back(Ok(vec![GeneratedImage {
            mime_type: "image/jpeg".to_string(),
            data: base64.into(),
        }]));
        self
    }

    pub fn push_image_error(&self, err: GenerationError) -> &Self {
        self.images.lock().push_back(Err(err));
        self
    }

    /// Queues the state returned by the next `poll_video` call.
    pub fn push_poll(&self, operation: Result<VideoOperation, GenerationError>) -> &Self {
        self.polls.lock().push_back(operation);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn content_requests(&self) -> Vec<PromptSpec> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::Content(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| match r {
                RecordedRequest::Images(req) => Some(req.prompt.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().push(request);
    }

    fn dry(&self, what: &str) -> GenerationError {
        GenerationError::invalid_response(format!("no scripted {what} reply left"))
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_content(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        self.record(RecordedRequest::Content(spec.clone()));
        if let Some(reply) = self.texts.lock().pop_front() {
            return reply;
        }
        match self.exhausted {
            Exhausted::Fail => Err(self.dry("content")),
            Exhausted::Synthesize => Ok(match &spec.response_schema {
                Some(schema) => schema.sample().to_string(),
                None => "Offline draft".to_string(),
            }),
        }
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, GenerationError> {
        self.record(RecordedRequest::Images(request.clone()));
        if let Some(reply) = self.images.lock().pop_front() {
            return reply;
        }
        match self.exhausted {
            Exhausted::Fail => Err(self.dry("image")),
            Exhausted::Synthesize => Ok(vec![GeneratedImage {
                mime_type: "image/png".to_string(),
                data: PLACEHOLDER_PNG.to_string(),
            }]),
        }
    }

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation, GenerationError> {
        self.record(RecordedRequest::StartVideo(request.clone()));
        Ok(VideoOperation {
            name: format!("operations/scripted-{}", self.requests.lock().len()),
            done: false,
            video_uri: None,
            error: None,
        })
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenerationError> {
        self.record(RecordedRequest::PollVideo(operation.name.clone()));
        if let Some(reply) = self.polls.lock().pop_front() {
            return reply;
        }
        match self.exhausted {
            Exhausted::Fail => Err(self.dry("video poll")),
            Exhausted::Synthesize => Ok(VideoOperation {
                name: operation.name.clone(),
                done: true,
                video_uri: Some("offline://video.mp4".to_string()),
                error: None,
            }),
        }
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        self.record(RecordedRequest::DownloadVideo(uri.to_string()));
        Ok(Vec::new())
    }
}
