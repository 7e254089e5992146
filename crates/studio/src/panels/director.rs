use super::sequence::{camera_angle_schema, camera_movement_schema};
use crate::{PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{CameraAngle, CameraMovement, CharacterAnimation, CharacterPosition, Project, Scene};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneAnalysis {
    pub overall_assessment: OverallAssessment,
    pub composition: Composition,
    pub camera_work: CameraWork,
    pub pacing: Pacing,
    pub emotional_impact: EmotionalImpact,
    pub character_choreography: Choreography,
    pub visual_flow: VisualFlow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverallAssessment {
    pub score: u32,
    pub strengths: String,
    pub weaknesses: String,
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Composition {
    pub arrangement: String,
    pub focal_point: String,
    pub balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraWork {
    pub recommended_angle: CameraAngle,
    pub recommended_movement: CameraMovement,
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pacing {
    pub current_duration: f64,
    pub recommended_duration: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmotionalImpact {
    pub target_emotion: String,
    pub technique_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choreography {
    pub blocking: Vec<Blocking>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Blocking {
    pub character: String,
    pub start_position: String,
    pub movement_path: String,
    pub key_poses: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualFlow {
    pub continuity_notes: String,
    pub lighting: String,
    pub mood: String,
}

fn strings() -> Schema {
    Schema::array(Schema::string())
}

fn analysis_schema() -> Schema {
    Schema::object([
        (
            "overallAssessment",
            Schema::object([
                ("score", Schema::integer()),
                ("strengths", Schema::string()),
                ("weaknesses", Schema::string()),
                ("priorities", strings()),
            ]),
        ),
        (
            "composition",
            Schema::object([
                ("arrangement", Schema::string()),
                ("focalPoint", Schema::string()),
                ("balance", Schema::string()),
            ]),
        ),
        (
            "cameraWork",
            Schema::object([
                ("recommendedAngle", camera_angle_schema()),
                ("recommendedMovement", camera_movement_schema()),
                ("reasoning", Schema::string()),
            ]),
        ),
        (
            "pacing",
            Schema::object([
                ("currentDuration", Schema::number()),
                ("recommendedDuration", Schema::number()),
                ("rationale", Schema::string()),
            ]),
        ),
        (
            "emotionalImpact",
            Schema::object([
                ("targetEmotion", Schema::string()),
                ("techniqueSuggestions", strings()),
            ]),
        ),
        (
            "characterChoreography",
            Schema::object([(
                "blocking",
                Schema::array(Schema::object([
                    ("character", Schema::string()),
                    ("startPosition", Schema::string()),
                    ("movementPath", Schema::string()),
                    ("keyPoses", Schema::string()),
                ])),
            )]),
        ),
        (
            "visualFlow",
            Schema::object([
                ("continuityNotes", Schema::string()),
                ("lighting", Schema::string()),
                ("mood", Schema::string()),
            ]),
        ),
    ])
}

#[derive(Serialize)]
struct CastEntry<'a> {
    name: &'a str,
    position: CharacterPosition,
    animation: CharacterAnimation,
}

fn analysis_prompt(project: &Project, scene: &Scene) -> String {
    let name_of = |asset_id: &str| {
        project
            .asset(asset_id)
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    };
    let cast: Vec<CastEntry<'_>> = scene
        .characters
        .iter()
        .map(|c| CastEntry {
            name: name_of(&c.asset_id),
            position: c.position,
            animation: c.animation,
        })
        .collect();
    let cast = serde_json::to_string(&cast).unwrap_or_else(|_| "[]".to_string());
    let dialogue = scene
        .dialogue
        .iter()
        .map(|d| {
            let speaker = scene
                .character(&d.character_id)
                .map(|c| name_of(&c.asset_id))
                .unwrap_or("Unknown");
            format!("{speaker}: \"{}\" ({})", d.line, d.emotion)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this animation scene and provide feedback as a professional director. Return a JSON object with the specified structure.
Scene Context:
- Script: \"{script}\"
- Duration: {duration} seconds
- Characters: {cast}
- Dialogue:
{dialogue}

Provide specific, actionable advice for each section. The quality score should be from 0-100. Be critical but constructive.
For characterChoreography, provide blocking for at least one character.
For cameraWork, choose from these angles: 'eye-level', 'high-angle', 'low-angle', 'birds-eye', 'worms-eye' and these movements: 'static', 'pan-left', 'pan-right', 'zoom-in', 'zoom-out', 'dolly', 'truck'.
For character positions, use stage directions like 'upstage', 'downstage', 'stage-left', 'stage-right', 'center'.",
        script = scene.script,
        duration = scene.duration,
    )
}

panel!(
    /// Director's critique of a scene, with one-click camera and pacing fixes.
    DirectorPanel
);

impl DirectorPanel {
    pub async fn analyze(&self, project_id: &str, scene_id: &str) -> Result<SceneAnalysis, PanelError> {
        self.state.run(self.request_analysis(project_id, scene_id)).await
    }

    async fn request_analysis(&self, project_id: &str, scene_id: &str) -> Result<SceneAnalysis, PanelError> {
        let (project, scene) = self.studio.scene(project_id, scene_id)?;
        let spec = PromptSpec::text(self.studio.text_model(), analysis_prompt(&project, &scene))
            .with_schema(analysis_schema());
        let analysis: SceneAnalysis = self.studio.generation().generate(spec).await?;
        info!(
            scene = %scene_id,
            score = analysis.overall_assessment.score,
            "scene analyzed"
        );
        Ok(analysis)
    }

    pub fn apply_camera_movement(
        &self,
        project_id: &str,
        scene_id: &str,
        movement: CameraMovement,
    ) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.camera_movement = movement;
            Ok(())
        })
    }

    pub fn apply_duration(&self, project_id: &str, scene_id: &str, duration: f64) -> Result<Project, PanelError> {
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(PanelError::precondition(format!(
                "Suggested duration {duration} is not a positive number of seconds."
            )));
        }
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.duration = duration;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::studio;
    use project::{scenes, Asset, AssetType, DialogueEmotion, SceneCharacter, SceneDialogue};
    use serde_json::json;

    #[tokio::test]
    async fn prompt_lists_cast_and_dialogue() {
        let (studio, backend, id) = studio();
        let asset = Asset::new("Rex", AssetType::Character, "u");
        let character = SceneCharacter::new(asset.id.clone());
        let line = SceneDialogue {
            line: "Run!".into(),
            emotion: DialogueEmotion::Angry,
            ..SceneDialogue::new(character.id.clone())
        };
        let project = studio
            .store()
            .modify(&id, |p| {
                p.add_asset(asset);
                let scene = scenes::add_scene(&mut p.scenes);
                scene.script = "The chase".into();
                scene.characters.push(character);
                scene.dialogue.push(line);
                Ok(())
            })
            .unwrap();
        let scene_id = project.scenes[0].id.clone();

        backend.push_json(json!({
            "overallAssessment": {"score": 72, "strengths": "energy", "weaknesses": "static", "priorities": ["move camera"]},
            "cameraWork": {"recommendedAngle": "low-angle", "recommendedMovement": "truck", "reasoning": "follow the run"},
            "pacing": {"currentDuration": 5, "recommendedDuration": 3.5, "rationale": "tighter"}
        }));
        let panel = DirectorPanel::new(studio.clone());
        let analysis = panel.analyze(&id, &scene_id).await.unwrap();
        assert_eq!(analysis.overall_assessment.score, 72);
        assert_eq!(analysis.camera_work.recommended_movement, CameraMovement::Truck);
        assert!(analysis.character_choreography.blocking.is_empty());

        let prompt = backend.content_requests()[0].prompt_text();
        assert!(prompt.contains(r#"- Characters: [{"name":"Rex","position":"center","animation":"idle"}]"#));
        assert!(prompt.contains("Rex: \"Run!\" (angry)"));
        assert!(prompt.contains("- Duration: 5 seconds"));

        panel
            .apply_camera_movement(&id, &scene_id, analysis.camera_work.recommended_movement)
            .unwrap();
        let project = panel
            .apply_duration(&id, &scene_id, analysis.pacing.recommended_duration)
            .unwrap();
        assert_eq!(project.scenes[0].camera_movement, CameraMovement::Truck);
        assert_eq!(project.scenes[0].duration, 3.5);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let (studio, _, id) = studio();
        let project = studio
            .store()
            .modify(&id, |p| {
                scenes::add_scene(&mut p.scenes);
                Ok(())
            })
            .unwrap();
        let panel = DirectorPanel::new(studio);
        assert!(matches!(
            panel.apply_duration(&id, &project.scenes[0].id, 0.0),
            Err(PanelError::Precondition(_))
        ));
    }
}
