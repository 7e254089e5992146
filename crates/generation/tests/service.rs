use generation::{
    GenerationConfig, GenerationError, GenerationService, PromptSpec, RecordedRequest, Schema,
    ScriptedBackend, VideoOperation, VideoRequest,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Beat {
    scene_number: u32,
    setting: String,
}

fn service(backend: Arc<ScriptedBackend>) -> GenerationService {
    let config = GenerationConfig {
        video_poll_interval_ms: 1,
        ..GenerationConfig::default()
    };
    GenerationService::new(backend, config)
}

#[tokio::test]
async fn typed_generation_parses_fenced_json() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("```json\n[{\"sceneNumber\":1,\"setting\":\"Alley\"}]\n```");
    let beats: Vec<Beat> = service(backend.clone())
        .generate(PromptSpec::text("gemini-2.5-flash", "Break it down").json())
        .await
        .unwrap();
    assert_eq!(
        beats,
        vec![Beat {
            scene_number: 1,
            setting: "Alley".into()
        }]
    );
    assert_eq!(backend.content_requests()[0].prompt_text(), "Break it down");
}

#[tokio::test]
async fn malformed_reply_is_invalid_response() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("Sorry, I cannot help with that.");
    let result: Result<Vec<Beat>, _> = service(backend)
        .generate(PromptSpec::text("m", "x").json())
        .await;
    assert!(matches!(result, Err(GenerationError::InvalidResponse(_))));
}

#[tokio::test]
async fn backend_errors_pass_through() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text_error(GenerationError::from_status(429, "quota"));
    let err = service(backend)
        .generate_text(PromptSpec::text("m", "x"))
        .await
        .unwrap_err();
    assert_eq!(err, GenerationError::RateLimited("quota".into()));
}

#[tokio::test]
async fn image_comes_back_as_data_url() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_image("QUJD");
    let url = service(backend.clone()).generate_image("a castle").await.unwrap();
    assert_eq!(url, "data:image/jpeg;base64,QUJD");
    assert_eq!(backend.image_prompts(), vec!["a castle"]);
}

#[tokio::test]
async fn video_round_trip_through_job() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_poll(Ok(VideoOperation {
        name: "op".into(),
        done: true,
        video_uri: Some("https://files/v".into()),
        error: None,
    }));
    let service = service(backend.clone());
    let job = service
        .generate_video(VideoRequest::new("veo", "Subtly animate this image.").with_image("image/png", "AA"))
        .await
        .unwrap();
    let uri = job.wait().await.unwrap();
    let data_url = service.fetch_video(&uri).await.unwrap();
    assert_eq!(data_url, "data:video/mp4;base64,");
    assert!(matches!(backend.requests()[0], RecordedRequest::StartVideo(_)));
}

#[tokio::test]
async fn offline_backend_answers_from_schema() {
    let service = GenerationService::offline(GenerationConfig::default());
    let schema = Schema::array(
        Schema::object([
            ("sceneNumber", Schema::integer()),
            ("setting", Schema::string()),
        ])
        .require_all(),
    );
    let beats: Vec<Beat> = service
        .generate(PromptSpec::text("m", "x").with_schema(schema))
        .await
        .unwrap();
    assert_eq!(beats.len(), 1);
    assert_eq!(json!(beats[0].scene_number), json!(1));
}
