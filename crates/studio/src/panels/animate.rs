//! Image to video through the long-running video model.

use crate::{style_name_or, MediaFile, PanelError, Studio};
use generation::{VideoJob, VideoRequest};
use project::{scenes, AiAssetMetadata, Asset, AssetType, Project, Scene};
use tracing::info;

pub const DEFAULT_PROMPT: &str = "Subtly animate this image.";
pub const DEFAULT_CLIP_SECONDS: f64 = 4.0;

panel!(
    /// Animates a still into a background clip and drops it into a new scene.
    AnimatePanel
);

impl AnimatePanel {
    /// Submits the render and returns the polling job.
    pub async fn start(&self, image: &MediaFile, prompt: &str) -> Result<VideoJob, PanelError> {
        if !image.is_image() {
            return Err(PanelError::precondition(format!("{} is not an image.", image.name)));
        }
        let generation = self.studio.generation();
        let prompt = if prompt.trim().is_empty() { DEFAULT_PROMPT } else { prompt };
        let request = VideoRequest::new(generation.config().video_model.clone(), prompt)
            .with_image(image.mime_type.clone(), image.data.clone());
        Ok(generation.generate_video(request).await?)
    }

    /// Full flow: render, wait, download, then add the asset and scene.
    /// Dropping the returned future cancels the render.
    pub async fn animate(
        &self,
        project_id: &str,
        image: &MediaFile,
        prompt: &str,
        clip_seconds: Option<f64>,
    ) -> Result<Project, PanelError> {
        self.state
            .run(self.render(project_id, image, prompt, clip_seconds))
            .await
    }

    async fn render(
        &self,
        project_id: &str,
        image: &MediaFile,
        prompt: &str,
        clip_seconds: Option<f64>,
    ) -> Result<Project, PanelError> {
        self.studio.project(project_id)?;
        let job = self.start(image, prompt).await?;
        self.finish(project_id, job, prompt, clip_seconds).await
    }

    /// Waits for `job` and stores the downloaded clip.
    pub async fn finish(
        &self,
        project_id: &str,
        job: VideoJob,
        prompt: &str,
        clip_seconds: Option<f64>,
    ) -> Result<Project, PanelError> {
        let uri = job.wait().await?;
        let url = self.studio.generation().fetch_video(&uri).await?;
        self.commit(project_id, prompt, url, clip_seconds)
    }

    pub fn commit(
        &self,
        project_id: &str,
        prompt: &str,
        video_url: String,
        clip_seconds: Option<f64>,
    ) -> Result<Project, PanelError> {
        let seconds = clip_seconds
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_CLIP_SECONDS);
        let project = self.studio.store().modify(project_id, |project| {
            let label: String = prompt.chars().take(20).collect();
            let label = if label.is_empty() { "Image".to_string() } else { label };
            let mut asset = Asset::new(format!("Animated Scene BG: {label}"), AssetType::Video, video_url)
                .with_tags(["animated", "video", "background"]);
            asset.duration = Some(seconds);
            asset.ai_metadata = Some(AiAssetMetadata {
                description: format!("Animated background from prompt: {prompt}"),
                art_style: style_name_or(project, "AI Animated"),
                ..AiAssetMetadata::default()
            });
            let scene = Scene {
                script: format!("Animated scene: {prompt}"),
                duration: seconds.round().max(1.0),
                background_asset_id: Some(asset.id.clone()),
                ..Scene::new(0)
            };
            project.add_asset(asset);
            scenes::append_scenes(&mut project.scenes, [scene]);
            Ok(())
        })?;
        info!(project = %project_id, "animated scene added");
        Ok(project)
    }
}
