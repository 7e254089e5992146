use super::sequence::{camera_angle_schema, camera_movement_schema};
use crate::{PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{new_id, Project, StoryboardPanel};
use tracing::{debug, info};

fn panel_schema() -> Schema {
    let text = [
        "timing",
        "shotType",
        "visualDescription",
        "characterPose",
        "keyVisualElements",
        "lightingAndMood",
        "backgroundDetails",
        "transition",
        "directorsNotes",
        "dialogueSnippet",
    ];
    let mut properties: Vec<(&str, Schema)> = text.iter().map(|k| (*k, Schema::string())).collect();
    properties.push(("panelNumber", Schema::integer()));
    properties.push(("cameraAngle", camera_angle_schema()));
    properties.push(("cameraMovement", camera_movement_schema()));
    Schema::array(Schema::object(properties).require(["panelNumber", "visualDescription"]))
}

pub(crate) fn sketch_prompt(visual_description: &str) -> String {
    format!(
        "A professional black and white storyboard sketch with clear annotations, composition guides, \
and movement arrows. Style: clean, architectural lines. Content: {visual_description}"
    )
}

panel!(
    /// Breaks one scene's script into 3-6 sketched storyboard panels.
    Storyboarder
);

impl Storyboarder {
    /// Replaces the scene's panels with a freshly generated set.
    pub async fn generate(&self, project_id: &str, scene_id: &str) -> Result<Project, PanelError> {
        self.state.run(self.run_generate(project_id, scene_id)).await
    }

    async fn run_generate(&self, project_id: &str, scene_id: &str) -> Result<Project, PanelError> {
        let (_, scene) = self.studio.scene(project_id, scene_id)?;
        if scene.script.trim().is_empty() {
            return Err(PanelError::precondition(
                "Scene script is empty. Please add a script in the 'Editor' tab first.",
            ));
        }
        let prompt = format!(
            "Analyze the following animation scene script and break it down into 3-6 key storyboard panels. \
For each panel, provide a JSON object with: panelNumber, timing (e.g., \"0s-1.5s\"), shotType (e.g., 'Medium Shot'), \
cameraAngle, cameraMovement, visualDescription, characterPose, keyVisualElements, lightingAndMood, \
backgroundDetails, transition (e.g., 'Cut to'), directorsNotes, and dialogueSnippet. \
Return a JSON array of these panel objects. SCRIPT: {}",
            scene.script
        );
        let spec = PromptSpec::text(self.studio.pro_model(), prompt).with_schema(panel_schema());
        let generation = self.studio.generation();
        let drafts: Vec<StoryboardPanel> = generation.generate(spec).await?;

        let total = drafts.len();
        let mut panels = Vec::with_capacity(total);
        for (index, draft) in drafts.into_iter().enumerate() {
            debug!(panel = index + 1, total, "sketching storyboard panel");
            let image_url = generation.generate_image(sketch_prompt(&draft.visual_description)).await?;
            panels.push(StoryboardPanel {
                id: new_id("panel"),
                image_url,
                ..draft
            });
        }

        let project = self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.storyboard_panels = panels;
            Ok(())
        })?;
        info!(scene = %scene_id, panels = total, "storyboard generated");
        Ok(project)
    }

    /// Redraws the sketch of the panel at `index`, keeping its text.
    pub async fn regenerate_panel(&self, project_id: &str, scene_id: &str, index: usize) -> Result<Project, PanelError> {
        self.state.run(self.run_regenerate(project_id, scene_id, index)).await
    }

    async fn run_regenerate(&self, project_id: &str, scene_id: &str, index: usize) -> Result<Project, PanelError> {
        let (_, scene) = self.studio.scene(project_id, scene_id)?;
        let panel = scene
            .storyboard_panels
            .get(index)
            .ok_or_else(|| PanelError::not_found(format!("storyboard panel {}", index + 1)))?;
        let image_url = self
            .studio
            .generation()
            .generate_image(sketch_prompt(&panel.visual_description))
            .await?;
        let panel_id = panel.id.clone();
        let project = self.studio.modify_scene(project_id, scene_id, |scene| {
            if let Some(panel) = scene.storyboard_panels.iter_mut().find(|p| p.id == panel_id) {
                panel.image_url = image_url;
            }
            Ok(())
        })?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::studio;
    use project::{scenes, CameraAngle};
    use serde_json::json;

    fn scene_with_script(studio: &Studio, id: &str, script: &str) -> String {
        let project = studio
            .store()
            .modify(id, |p| {
                scenes::add_scene(&mut p.scenes).script = script.to_string();
                Ok(())
            })
            .unwrap();
        project.scenes[0].id.clone()
    }

    #[tokio::test]
    async fn empty_script_is_a_precondition_error() {
        let (studio, backend, id) = studio();
        let scene_id = scene_with_script(&studio, &id, "   ");
        let panel = Storyboarder::new(studio);
        let err = panel.generate(&id, &scene_id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Scene script is empty. Please add a script in the 'Editor' tab first."
        );
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn panels_get_ids_and_sketches() {
        let (studio, backend, id) = studio();
        let scene_id = scene_with_script(&studio, &id, "Mira opens the door.");
        backend.push_json(json!([
            {"panelNumber": 1, "timing": "0s-1s", "cameraAngle": "low-angle", "cameraMovement": "static",
             "visualDescription": "door handle", "transition": "Cut to"},
            {"panelNumber": 2, "timing": "1s-3s", "cameraAngle": "eye-level", "cameraMovement": "dolly",
             "visualDescription": "Mira steps in"}
        ]));
        backend.push_image("AAAA").push_image("BBBB");

        let panel = Storyboarder::new(studio.clone());
        let project = panel.generate(&id, &scene_id).await.unwrap();
        let panels = &project.scenes[0].storyboard_panels;
        assert_eq!(panels.len(), 2);
        assert!(panels[0].id.starts_with("panel_"));
        assert_ne!(panels[0].id, panels[1].id);
        assert_eq!(panels[0].camera_angle, CameraAngle::LowAngle);
        assert_eq!(panels[1].image_url, "data:image/jpeg;base64,BBBB");
        assert_eq!(backend.image_prompts()[1], sketch_prompt("Mira steps in"));

        backend.push_image("CCCC");
        let project = panel.regenerate_panel(&id, &scene_id, 1).await.unwrap();
        let panels = &project.scenes[0].storyboard_panels;
        assert_eq!(panels[1].image_url, "data:image/jpeg;base64,CCCC");
        assert_eq!(panels[0].image_url, "data:image/jpeg;base64,AAAA");

        assert!(matches!(
            panel.regenerate_panel(&id, &scene_id, 5).await,
            Err(PanelError::NotFound(_))
        ));
    }
}
