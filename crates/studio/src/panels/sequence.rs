//! Script to shot list, with a storyboard sketch and a background painting
//! per shot, committed as new scenes.

use super::story::{script_line_schema, ScriptLine};
use crate::{style_name_or, PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{
    new_id, scenes, AiAssetMetadata, Asset, AssetType, CameraAngle, CameraMovement, Project, Scene,
    StoryboardPanel,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedShot {
    pub shot_number: u32,
    #[serde(default)]
    pub shot_type: String,
    #[serde(default)]
    pub shot_description: String,
    #[serde(default)]
    pub camera_movement: CameraMovement,
    #[serde(default)]
    pub camera_angle: CameraAngle,
    pub duration: f64,
    #[serde(default)]
    pub characters: Vec<ShotCharacter>,
    #[serde(default)]
    pub dialogue: Vec<ScriptLine>,
    #[serde(default)]
    pub background_description: String,
    #[serde(default)]
    pub storyboard_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotCharacter {
    pub name: String,
    pub position: String,
    pub action: String,
    pub emotion: String,
}

impl Default for ShotCharacter {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: "center".to_string(),
            action: String::new(),
            emotion: "neutral".to_string(),
        }
    }
}

/// A shot with its two generated images.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedShot {
    pub shot: GeneratedShot,
    pub storyboard_url: String,
    pub background_url: String,
}

pub(crate) fn camera_movement_schema() -> Schema {
    Schema::enumeration(CameraMovement::ALL.iter().map(|m| m.as_str()))
}

pub(crate) fn camera_angle_schema() -> Schema {
    Schema::enumeration(CameraAngle::ALL.iter().map(|a| a.as_str()))
}

fn shot_schema() -> Schema {
    Schema::array(
        Schema::object([
            ("shotNumber", Schema::integer()),
            ("shotType", Schema::string()),
            ("shotDescription", Schema::string()),
            ("cameraMovement", camera_movement_schema()),
            ("cameraAngle", camera_angle_schema()),
            ("duration", Schema::number()),
            (
                "characters",
                Schema::array(Schema::object([
                    ("name", Schema::string()),
                    ("position", Schema::string()),
                    ("action", Schema::string()),
                    ("emotion", Schema::string()),
                ])),
            ),
            ("dialogue", Schema::array(script_line_schema())),
            ("backgroundDescription", Schema::string()),
            ("storyboardDescription", Schema::string()),
        ])
        .require(["shotNumber", "duration"]),
    )
}

pub(crate) fn breakdown_prompt(script: &str) -> String {
    format!(
        "Analyze the following script and generate a detailed shot-by-shot sequence. Create 3-8 shots. \
For each shot, provide a JSON object with: shotNumber, shotType (e.g., 'Establishing Shot', 'Medium Shot'), \
shotDescription, cameraMovement, cameraAngle, duration (in seconds), backgroundDescription, \
storyboardDescription (a visual summary for an image generator), characters (name, position, action, emotion), \
and dialogue (character, line). Return a JSON array of these objects. SCRIPT: {script}"
    )
}

pub(crate) fn background_prompt(project: &Project, description: &str) -> String {
    format!(
        "A digital painting background for an animation scene. Style: {}. Description: {description}",
        style_name_or(project, "Vibrant Cartoon")
    )
}

panel!(
    /// Shot breakdown, per-shot artwork and commit into the scene list.
    SequencePanel
);

impl SequencePanel {
    /// Breaks the script into shots and renders both images for each.
    pub async fn generate(&self, project_id: &str, script: &str) -> Result<Vec<RenderedShot>, PanelError> {
        self.state.run(self.run_generate(project_id, script)).await
    }

    async fn run_generate(&self, project_id: &str, script: &str) -> Result<Vec<RenderedShot>, PanelError> {
        let shots = self.request_shots(script).await?;
        self.render(project_id, shots).await
    }

    pub async fn breakdown(&self, script: &str) -> Result<Vec<GeneratedShot>, PanelError> {
        self.state.run(self.request_shots(script)).await
    }

    async fn request_shots(&self, script: &str) -> Result<Vec<GeneratedShot>, PanelError> {
        if script.trim().is_empty() {
            return Err(PanelError::precondition("Please enter a script to generate a sequence."));
        }
        let spec = PromptSpec::text(self.studio.pro_model(), breakdown_prompt(script)).with_schema(shot_schema());
        let shots: Vec<GeneratedShot> = self.studio.generation().generate(spec).await?;
        info!(shots = shots.len(), "sequence broken down");
        Ok(shots)
    }

    async fn render(&self, project_id: &str, shots: Vec<GeneratedShot>) -> Result<Vec<RenderedShot>, PanelError> {
        let project = self.studio.project(project_id)?;
        let generation = self.studio.generation();
        let total = shots.len();
        let mut rendered = Vec::with_capacity(total);
        for (index, shot) in shots.into_iter().enumerate() {
            debug!(shot = index + 1, total, "rendering storyboard");
            let storyboard_url = generation
                .generate_image(format!(
                    "A charcoal sketch style storyboard panel illustrating: {}",
                    shot.storyboard_description
                ))
                .await?;
            debug!(shot = index + 1, total, "rendering background");
            let background_url = generation
                .generate_image(background_prompt(&project, &shot.background_description))
                .await?;
            rendered.push(RenderedShot {
                shot,
                storyboard_url,
                background_url,
            });
        }
        Ok(rendered)
    }

    /// Appends one scene and one background asset per shot.
    pub fn commit(&self, project_id: &str, shots: &[RenderedShot]) -> Result<Project, PanelError> {
        let project = self.studio.store().modify(project_id, |project| {
            let art_style = style_name_or(project, "AI Generated");
            let mut new_scenes = Vec::with_capacity(shots.len());
            for rendered in shots {
                let background = background_asset(rendered, &art_style);
                new_scenes.push(shot_scene(rendered, &background.id));
                project.add_asset(background);
            }
            scenes::append_scenes(&mut project.scenes, new_scenes);
            Ok(())
        })?;
        info!(project = %project_id, shots = shots.len(), "sequence committed");
        Ok(project)
    }
}

fn background_asset(rendered: &RenderedShot, art_style: &str) -> Asset {
    let shot = &rendered.shot;
    let mut asset = Asset::new(
        format!("Shot {} Background", shot.shot_number),
        AssetType::Background,
        rendered.background_url.clone(),
    )
    .with_tags(["background".to_string(), format!("shot-{}", shot.shot_number)]);
    asset.ai_metadata = Some(AiAssetMetadata {
        description: shot.background_description.clone(),
        art_style: art_style.to_string(),
        search_keywords: vec![shot.background_description.clone()],
        ..AiAssetMetadata::default()
    });
    asset
}

fn shot_scene(rendered: &RenderedShot, background_id: &str) -> Scene {
    let shot = &rendered.shot;
    let duration = if shot.duration > 0.0 {
        shot.duration
    } else {
        Scene::DEFAULT_DURATION
    };
    let panel = StoryboardPanel {
        id: new_id("panel"),
        panel_number: 1,
        timing: format!("0s - {duration}s"),
        shot_type: shot.shot_type.clone(),
        camera_angle: shot.camera_angle,
        camera_movement: shot.camera_movement,
        visual_description: shot.shot_description.clone(),
        character_pose: shot
            .characters
            .iter()
            .map(|c| format!("{}: {}", c.name, c.action))
            .collect::<Vec<_>>()
            .join(", "),
        background_details: shot.background_description.clone(),
        transition: "cut".to_string(),
        directors_notes: "Auto-generated from sequence.".to_string(),
        dialogue_snippet: shot
            .dialogue
            .iter()
            .map(|d| d.line.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        image_url: rendered.storyboard_url.clone(),
        ..StoryboardPanel::default()
    };
    Scene {
        script: shot.shot_description.clone(),
        duration,
        camera_movement: shot.camera_movement,
        camera_angle: shot.camera_angle,
        background_asset_id: Some(background_id.to_string()),
        storyboard_panels: vec![panel],
        ..Scene::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::studio;
    use project::StyleProfile;
    use serde_json::json;

    fn two_shots() -> serde_json::Value {
        json!([
            {"shotNumber": 1, "shotType": "Establishing Shot", "shotDescription": "City at dusk",
             "cameraMovement": "pan-left", "cameraAngle": "high-angle", "duration": 3,
             "characters": [], "dialogue": [],
             "backgroundDescription": "neon skyline", "storyboardDescription": "wide city"},
            {"shotNumber": 2, "shotType": "Close-up", "shotDescription": "Kai looks up",
             "cameraMovement": "zoom-in", "cameraAngle": "low-angle", "duration": 2.5,
             "characters": [{"name": "Kai", "position": "center", "action": "looks up", "emotion": "surprised"}],
             "dialogue": [{"character": "Kai", "line": "There it is."}, {"character": "Kai", "line": "Finally."}],
             "backgroundDescription": "rooftop", "storyboardDescription": "face close-up"}
        ])
    }

    #[tokio::test]
    async fn generate_then_commit_appends_numbered_scenes() {
        let (studio, backend, id) = studio();
        studio
            .store()
            .modify(&id, |p| {
                scenes::add_scene(&mut p.scenes);
                let profile = StyleProfile::new("Noir Ink", "high contrast ink");
                p.add_style_profile(profile.clone());
                p.current_style_reference = Some(profile);
                Ok(())
            })
            .unwrap();
        backend.push_json(two_shots());
        for data in ["c2IxCg==", "Ymcx", "c2IyCg==", "Ymcy"] {
            backend.push_image(data);
        }

        let panel = SequencePanel::new(studio.clone());
        let shots = panel.generate(&id, "Kai finds the signal.").await.unwrap();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].storyboard_url, "data:image/jpeg;base64,c2IxCg==");
        assert_eq!(shots[0].background_url, "data:image/jpeg;base64,Ymcx");

        let prompts = backend.image_prompts();
        assert_eq!(
            prompts[0],
            "A charcoal sketch style storyboard panel illustrating: wide city"
        );
        assert_eq!(
            prompts[1],
            "A digital painting background for an animation scene. Style: Noir Ink. Description: neon skyline"
        );
        assert_eq!(backend.content_requests()[0].model, "gemini-2.5-pro");

        let project = panel.commit(&id, &shots).unwrap();
        let numbers: Vec<u32> = project.scenes.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let second = &project.scenes[2];
        assert_eq!(second.script, "Kai looks up");
        assert_eq!(second.duration, 2.5);
        assert_eq!(second.camera_movement, CameraMovement::ZoomIn);
        let panel = &second.storyboard_panels[0];
        assert_eq!(panel.timing, "0s - 2.5s");
        assert_eq!(panel.character_pose, "Kai: looks up");
        assert_eq!(panel.dialogue_snippet, "There it is. Finally.");
        assert_eq!(panel.transition, "cut");

        let background = project.asset(second.background_asset_id.as_deref().unwrap()).unwrap();
        assert_eq!(background.name, "Shot 2 Background");
        assert_eq!(background.tags, vec!["background", "shot-2"]);
        assert_eq!(background.ai_metadata.as_ref().unwrap().art_style, "Noir Ink");
        assert!(project.is_consistent());
    }

    #[tokio::test]
    async fn image_failure_leaves_project_untouched() {
        let (studio, backend, id) = studio();
        backend.push_json(two_shots());
        backend.push_image("c2IxCg==");
        backend.push_image_error(generation::GenerationError::RateLimited("quota".into()));

        let before = studio.project(&id).unwrap();
        let panel = SequencePanel::new(studio.clone());
        let err = panel.generate(&id, "script").await.unwrap_err();
        assert!(matches!(err, PanelError::Generation(_)));
        assert_eq!(panel.state().error().as_deref(), Some("quota"));
        assert_eq!(studio.project(&id).unwrap(), before);
    }

    #[test]
    fn zero_length_shots_fall_back_to_default_duration() {
        let rendered = RenderedShot {
            shot: GeneratedShot {
                shot_number: 1,
                shot_type: String::new(),
                shot_description: "x".into(),
                camera_movement: CameraMovement::Static,
                camera_angle: CameraAngle::EyeLevel,
                duration: 0.0,
                characters: vec![],
                dialogue: vec![],
                background_description: String::new(),
                storyboard_description: String::new(),
            },
            storyboard_url: String::new(),
            background_url: String::new(),
        };
        assert_eq!(shot_scene(&rendered, "asset_1").duration, Scene::DEFAULT_DURATION);
    }
}
