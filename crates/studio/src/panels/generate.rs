use crate::{style_name_or, PanelError, Studio};
use generation::ImageRequest;
use project::{AiAssetMetadata, Asset, AssetType, Project};
use tracing::info;

fn image_prompt(project: &Project, prompt: &str) -> String {
    match &project.current_style_reference {
        Some(style) => format!(
            "Generate an image of: \"{prompt}\". Match the following art style: {}",
            style.description
        ),
        None => format!("Generate an image of: \"{prompt}\""),
    }
}

fn generated_asset(project: &Project, prompt: &str, url: String) -> Asset {
    let name: String = prompt.chars().take(30).collect();
    let first_word = prompt.split(' ').next().unwrap_or_default().to_string();
    let mut asset = Asset::new(name, AssetType::Background, url).with_tags([first_word]);
    asset.ai_metadata = Some(AiAssetMetadata {
        description: format!("AI generated: {prompt}"),
        art_style: style_name_or(project, "AI Generated"),
        search_keywords: vec![prompt.to_string()],
        ..AiAssetMetadata::default()
    });
    asset
}

panel!(
    /// Text to image, saved straight into the asset library.
    GeneratePanel
);

impl GeneratePanel {
    pub async fn generate(&self, project_id: &str, prompt: &str) -> Result<Asset, PanelError> {
        self.state.run(self.create_asset(project_id, prompt)).await
    }

    async fn create_asset(&self, project_id: &str, prompt: &str) -> Result<Asset, PanelError> {
        if prompt.trim().is_empty() {
            return Err(PanelError::precondition("Please describe the image to generate."));
        }
        let project = self.studio.project(project_id)?;
        let generation = self.studio.generation();
        let request = ImageRequest::new(generation.config().image_model.clone(), image_prompt(&project, prompt));
        let url = generation.generate_image_with(request).await?;

        let asset = generated_asset(&project, prompt, url);
        let saved = asset.clone();
        self.studio.store().modify(project_id, |project| {
            project.add_asset(asset);
            Ok(())
        })?;
        info!(project = %project_id, asset = %saved.id, "image asset generated");
        Ok(saved)
    }
}
