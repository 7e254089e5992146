use crate::{MediaFile, PanelError, Studio};
use generation::PromptSpec;
use project::{Project, StoreError, StyleProfile};
use tracing::info;

const STYLE_QUESTION: &str = "Describe the art style of this image in a concise phrase (e.g., \
\"Vibrant cel-shaded cartoon\", \"Photorealistic digital painting\", \"Minimalist line art\").";

panel!(
    /// Reads an art style off a reference image and manages the project's
    /// style profiles.
    DrawingPanel
);

impl DrawingPanel {
    pub async fn analyze_style(&self, image: &MediaFile) -> Result<String, PanelError> {
        self.state.run(self.describe_style(image)).await
    }

    async fn describe_style(&self, image: &MediaFile) -> Result<String, PanelError> {
        if !image.is_image() {
            return Err(PanelError::precondition(format!(
                "{} is not an image.",
                image.name
            )));
        }
        let spec = PromptSpec::text(self.studio.text_model(), STYLE_QUESTION)
            .with_image(image.mime_type.clone(), image.data.clone());
        Ok(self.studio.generation().generate_text(spec).await?)
    }

    pub fn save_profile(&self, project_id: &str, name: &str, description: &str) -> Result<StyleProfile, PanelError> {
        let (name, description) = (name.trim(), description.trim());
        if name.is_empty() || description.is_empty() {
            return Err(PanelError::precondition(
                "A style profile needs both a name and a description.",
            ));
        }
        let profile = StyleProfile::new(name, description);
        let saved = profile.clone();
        self.studio.store().modify(project_id, |project| {
            project.add_style_profile(profile);
            Ok(())
        })?;
        info!(project = %project_id, style = %saved.name, "style profile saved");
        Ok(saved)
    }

    pub fn delete_profile(&self, project_id: &str, profile_id: &str) -> Result<Project, PanelError> {
        Ok(self.studio.store().modify(project_id, |project| {
            project
                .delete_style_profile(profile_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::StyleProfileNotFound(profile_id.to_string()))
        })?)
    }

    /// Makes a saved profile the active style, or clears it with `None`.
    pub fn select_profile(&self, project_id: &str, profile_id: Option<&str>) -> Result<Project, PanelError> {
        Ok(self.studio.store().modify(project_id, |project| {
            match profile_id {
                Some(id) => {
                    project.set_style_reference(id)?;
                }
                None => project.clear_style_reference(),
            }
            Ok(())
        })?)
    }
}
