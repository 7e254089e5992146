use crate::{
    GeneratedImage, GenerationConfig, GenerationError, GenerativeBackend, ImageRequest, Part,
    PromptSpec, VideoOperation, VideoRequest,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

/// Google Generative Language API (Gemini text, Imagen stills, Veo video).
pub struct GeminiBackend {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| GenerationError::configuration(format!("HTTP client: {err}")))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model.trim(),
            method
        )
    }

    fn api_key(&self) -> &str {
        self.config.api_key.trim()
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, GenerationError> {
        let start = Instant::now();
        let response = request
            .header("Accept", "application/json")
            .header("X-Goog-Api-Key", self.api_key())
            .send()
            .await
            .map_err(|err| GenerationError::transport(format!("Gemini request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GenerationError::transport(format!("Read Gemini response failed: {err}")))?;
        debug!(status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "gemini call");
        if !status.is_success() {
            return Err(GenerationError::from_status(status.as_u16(), error_message(&body)));
        }
        serde_json::from_str(&body).map_err(|err| {
            GenerationError::invalid_response(format!("Invalid Gemini response JSON: {err}"))
        })
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(300).collect())
}

fn content_payload(spec: &PromptSpec) -> Value {
    let parts: Vec<Value> = spec
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inlineData": { "mimeType": mime_type, "data": data }
            }),
        })
        .collect();
    let mut payload = json!({ "contents": [{ "role": "user", "parts": parts }] });
    if spec.json_response {
        let mut generation = json!({ "responseMimeType": "application/json" });
        if let Some(schema) = &spec.response_schema {
            generation["responseSchema"] = schema.to_value();
        }
        payload["generationConfig"] = generation;
    }
    payload
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl OperationResponse {
    fn into_operation(self) -> VideoOperation {
        let video_uri = self.response.as_ref().and_then(|r| {
            r["generateVideoResponse"]["generatedSamples"][0]["video"]["uri"]
                .as_str()
                .or_else(|| r["generatedVideos"][0]["video"]["uri"].as_str())
                .map(str::to_string)
        });
        let error = self.error.map(|e| {
            e["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string())
        });
        VideoOperation {
            name: self.name,
            done: self.done,
            video_uri,
            error,
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_content(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        let request = self
            .client
            .post(self.endpoint(&spec.model, "generateContent"))
            .json(&content_payload(spec));
        let parsed: GeminiResponse = self.send(request).await?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::invalid_response("Gemini response had no candidates."))?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GenerationError::invalid_response(format!(
                "Gemini returned no text (finish reason: {}).",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }

    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>, GenerationError> {
        let mut parameters = json!({
            "sampleCount": request.number_of_images,
            "outputMimeType": request.output_mime_type,
        });
        if let Some(ratio) = &request.aspect_ratio {
            parameters["aspectRatio"] = json!(ratio);
        }
        let body = json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": parameters,
        });
        let http = self
            .client
            .post(self.endpoint(&request.model, "predict"))
            .json(&body);
        let parsed: PredictResponse = self.send(http).await?;
        let images: Vec<GeneratedImage> = parsed
            .predictions
            .into_iter()
            .filter_map(|p| {
                p.bytes_base64_encoded.map(|data| GeneratedImage {
                    mime_type: p.mime_type.unwrap_or_else(|| request.output_mime_type.clone()),
                    data,
                })
            })
            .collect();
        if images.is_empty() {
            return Err(GenerationError::invalid_response("Image model returned no images."));
        }
        Ok(images)
    }

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation, GenerationError> {
        let mut instance = json!({ "prompt": request.prompt });
        if let Some(image) = &request.image {
            instance["image"] = json!({
                "bytesBase64Encoded": image.data,
                "mimeType": image.mime_type,
            });
        }
        let body = json!({
            "instances": [instance],
            "parameters": {
                "sampleCount": request.number_of_videos,
                "resolution": request.resolution,
                "aspectRatio": request.aspect_ratio,
            },
        });
        let http = self
            .client
            .post(self.endpoint(&request.model, "predictLongRunning"))
            .json(&body);
        let parsed: OperationResponse = self.send(http).await?;
        Ok(parsed.into_operation())
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenerationError> {
        let url = format!(
            "{}/v1beta/{}",
            self.config.base_url.trim_end_matches('/'),
            operation.name
        );
        let parsed: OperationResponse = self.send(self.client.get(url)).await?;
        Ok(parsed.into_operation())
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{uri}{separator}key={}", urlencoding::encode(self.api_key()));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GenerationError::transport(format!("Video download failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::from_status(status.as_u16(), "Video download failed."));
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;

    #[test]
    fn payload_carries_schema_and_inline_image() {
        let spec = PromptSpec::text("gemini-2.5-flash", "Describe the art style.")
            .with_image("image/png", "AAAA")
            .with_schema(Schema::object([("style", Schema::string())]));
        let payload = content_payload(&spec);
        let parts = &payload["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/png"));
        assert_eq!(parts[1]["text"], json!("Describe the art style."));
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(
            payload["generationConfig"]["responseSchema"]["type"],
            json!("OBJECT")
        );
    }

    #[test]
    fn plain_prompt_has_no_generation_config() {
        let payload = content_payload(&PromptSpec::text("m", "hi"));
        assert!(payload.get("generationConfig").is_none());
    }

    #[test]
    fn operation_extracts_video_uri_and_error() {
        let done: OperationResponse = serde_json::from_value(json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": "https://files/video?alt=media" } }
            ] } }
        }))
        .unwrap();
        let op = done.into_operation();
        assert!(op.done);
        assert_eq!(op.video_uri.as_deref(), Some("https://files/video?alt=media"));

        let failed: OperationResponse = serde_json::from_value(json!({
            "name": "op", "done": true, "error": { "code": 3, "message": "unsafe prompt" }
        }))
        .unwrap();
        assert_eq!(failed.into_operation().error.as_deref(), Some("unsafe prompt"));
    }

    #[test]
    fn api_error_message_is_extracted() {
        assert_eq!(
            error_message(r#"{"error":{"code":400,"message":"bad schema"}}"#),
            "bad schema"
        );
        assert_eq!(error_message("plain"), "plain");
    }

    #[test]
    fn backend_requires_key() {
        assert!(matches!(
            GeminiBackend::new(GenerationConfig::default()),
            Err(GenerationError::Configuration(_))
        ));
    }
}
