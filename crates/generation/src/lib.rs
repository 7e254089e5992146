//! Client side of the generative service: prompt and schema types, the
//! backend seam, the Gemini transport, a scripted stand-in and the typed
//! `generate<T>` entry point.

mod backend;
mod config;
mod error;
mod gemini;
mod prompt;
mod schema;
mod scripted;
mod service;
mod video;

pub use backend::GenerativeBackend;
pub use config::{GenerationConfig, GEMINI_API_BASE};
pub use error::GenerationError;
pub use gemini::GeminiBackend;
pub use prompt::{GeneratedImage, ImageRequest, Part, PromptSpec, VideoOperation, VideoRequest};
pub use schema::{Schema, SchemaType};
pub use scripted::{Exhausted, RecordedRequest, ScriptedBackend, PLACEHOLDER_PNG};
pub use service::{strip_code_fences, GenerationService};
pub use video::{VideoJob, VideoJobState};
