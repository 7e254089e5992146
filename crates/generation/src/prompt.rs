use crate::Schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    /// Base64 payload with its MIME type.
    InlineData { mime_type: String, data: String },
}

/// One structured or free-text request to a content model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub model: String,
    pub parts: Vec<Part>,
    pub response_schema: Option<Schema>,
    pub json_response: bool,
}

impl PromptSpec {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: vec![Part::Text(prompt.into())],
            response_schema: None,
            json_response: false,
        }
    }

    pub fn with_image(mut self, mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        self.parts.insert(
            0,
            Part::InlineData {
                mime_type: mime_type.into(),
                data: base64.into(),
            },
        );
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Requests JSON constrained to `schema`.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.response_schema = Some(schema);
        self.json_response = true;
        self
    }

    /// Requests JSON without a schema.
    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }

    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub number_of_images: u32,
    pub output_mime_type: String,
    pub aspect_ratio: Option<String>,
}

impl ImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            number_of_images: 1,
            output_mime_type: "image/jpeg".to_string(),
            aspect_ratio: None,
        }
    }

    pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64 image bytes.
    pub data: String,
}

impl GeneratedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<GeneratedImage>,
    pub resolution: String,
    pub aspect_ratio: String,
    pub number_of_videos: u32,
}

impl VideoRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image: None,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
            number_of_videos: 1,
        }
    }

    pub fn with_image(mut self, mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        self.image = Some(GeneratedImage {
            mime_type: mime_type.into(),
            data: base64.into(),
        });
        self
    }
}

/// Long-running video operation as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub video_uri: Option<String>,
    pub error: Option<String>,
}
