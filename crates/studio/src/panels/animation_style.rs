use crate::{PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{
    AnimationData, AnimationKind, AnimationMeta, AnimationStyle, PhonemeTiming, Project, Scene,
    SceneCharacter, StoreError,
};
use tracing::{debug, info};

pub const MOUTH_SHAPES: [&str; 6] = ["closed", "open", "wide", "smile", "o-shape", "ee-shape"];

pub fn style_description(style: AnimationStyle) -> &'static str {
    match style {
        AnimationStyle::Realistic => "Natural, lifelike movements.",
        AnimationStyle::SquashAndStretch => "Exaggerated, classic cartoon style.",
        AnimationStyle::Limited => "Efficient, fewer frames.",
        AnimationStyle::Bouncy => "Energetic, spring-like motions.",
        AnimationStyle::Robotic => "Mechanical, rigid movements.",
    }
}

/// Which layer to generate for a character instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationTarget {
    Idle,
    Walking,
    LipSync { dialogue_id: String },
}

fn phoneme_schema() -> Schema {
    Schema::array(Schema::object([
        ("phoneme", Schema::string()),
        ("mouthShape", Schema::enumeration(MOUTH_SHAPES)),
        ("start", Schema::number()),
        ("end", Schema::number()),
    ]))
}

/// Longest phoneme end, or zero for an empty track.
fn track_duration(phonemes: &[PhonemeTiming]) -> f64 {
    phonemes.iter().map(|p| p.end).fold(0.0, f64::max)
}

panel!(
    /// Per-character animation style and generated idle, walk and
    /// lip-sync layers.
    AnimationStylePanel
);

impl AnimationStylePanel {
    pub fn set_style(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
        style: AnimationStyle,
    ) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            character_mut(scene, character_id)?.animation_style = style;
            Ok(())
        })
    }

    pub async fn generate(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
        target: AnimationTarget,
    ) -> Result<Project, PanelError> {
        self.state
            .run(self.generate_layer(project_id, scene_id, character_id, target))
            .await
    }

    /// Lip-syncs every line of the character that has no talking layer yet.
    /// Stops at the first failure; layers generated before it are kept.
    pub async fn generate_all_lip_sync(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
    ) -> Result<Project, PanelError> {
        self.state
            .run(self.lip_sync_missing(project_id, scene_id, character_id))
            .await
    }

    async fn lip_sync_missing(&self, project_id: &str, scene_id: &str, character_id: &str) -> Result<Project, PanelError> {
        let (mut project, scene) = self.studio.scene(project_id, scene_id)?;
        let character = scene
            .character(character_id)
            .ok_or_else(|| PanelError::precondition("Please select a character with a valid asset."))?;
        let pending: Vec<String> = scene
            .dialogue
            .iter()
            .filter(|d| d.character_id == character_id)
            .filter(|d| !character.animation_layers.talking.contains_key(&d.id))
            .map(|d| d.id.clone())
            .collect();
        debug!(character = %character_id, lines = pending.len(), "lip-syncing missing lines");
        for dialogue_id in pending {
            project = self
                .generate_layer(project_id, scene_id, character_id, AnimationTarget::LipSync { dialogue_id })
                .await?;
        }
        Ok(project)
    }

    async fn generate_layer(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
        target: AnimationTarget,
    ) -> Result<Project, PanelError> {
        let (project, scene) = self.studio.scene(project_id, scene_id)?;
        let (character, asset) = scene
            .character(character_id)
            .and_then(|c| project.asset(&c.asset_id).map(|a| (c, a)))
            .ok_or_else(|| PanelError::precondition("Please select a character with a valid asset."))?;

        let who = asset
            .ai_metadata
            .as_ref()
            .map(|m| m.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("a character named {}", asset.name));
        let style = style_description(character.animation_style);
        let generation = self.studio.generation();

        let layer = match &target {
            AnimationTarget::Idle => {
                let url = generation
                    .generate_image(format!(
                        "Generate a 4-frame sprite sheet of this character in a standing idle animation with subtle breathing. \
The animation should be loopable. The character is {who}. The style should be {style}."
                    ))
                    .await?;
                AnimationData {
                    kind: AnimationKind::Idle,
                    frames: vec![url],
                    duration: 2.0,
                    meta: None,
                }
            }
            AnimationTarget::Walking => {
                let url = generation
                    .generate_image(format!(
                        "Generate an 8-frame horizontal sprite sheet of this character in a side-view walking cycle animation. \
The animation must be seamlessly loopable. The character is {who}. The style should be {style}."
                    ))
                    .await?;
                AnimationData {
                    kind: AnimationKind::Walking,
                    frames: vec![url],
                    duration: 0.8,
                    meta: None,
                }
            }
            AnimationTarget::LipSync { dialogue_id } => {
                let line = scene
                    .dialogue_line(dialogue_id)
                    .map(|d| d.line.clone())
                    .ok_or_else(|| PanelError::precondition("Dialogue line not found."))?;
                let sheet = generation
                    .generate_image(format!(
                        "Generate a single horizontal sprite sheet with 6 key mouth shapes for lip-syncing. \
The shapes are: {}. The character is {who}. The style is {style}.",
                        MOUTH_SHAPES.join(", ")
                    ))
                    .await?;
                let prompt = format!(
                    "Analyze the following dialogue line and map it to a sequence of phonemes with precise timing. \
For each phoneme, assign one of the following mouth shapes: 'closed', 'open', 'wide', 'smile', 'o-shape', 'ee-shape'. \
The total duration should match a natural speaking pace for the line. Return a JSON array of objects, \
where each object has \"phoneme\", \"mouthShape\", \"start\" (in seconds), and \"end\" (in seconds). Dialogue: \"{line}\""
                );
                let spec = PromptSpec::text(self.studio.text_model(), prompt).with_schema(phoneme_schema());
                let phonemes: Vec<PhonemeTiming> = generation.generate(spec).await?;
                AnimationData {
                    kind: AnimationKind::Talking,
                    frames: vec![sheet],
                    duration: track_duration(&phonemes),
                    meta: Some(AnimationMeta {
                        phonemes: Some(phonemes),
                    }),
                }
            }
        };

        let project = self.studio.modify_scene(project_id, scene_id, |scene| {
            let layers = &mut character_mut(scene, character_id)?.animation_layers;
            match target {
                AnimationTarget::Idle => layers.idle = Some(layer),
                AnimationTarget::Walking => layers.walking = Some(layer),
                AnimationTarget::LipSync { dialogue_id } => {
                    layers.talking.insert(dialogue_id, layer);
                }
            }
            Ok(())
        })?;
        info!(scene = %scene_id, character = %character_id, "animation layer generated");
        Ok(project)
    }
}

fn character_mut<'a>(scene: &'a mut Scene, character_id: &str) -> Result<&'a mut SceneCharacter, StoreError> {
    let scene_id = scene.id.clone();
    scene
        .character_mut(character_id)
        .ok_or_else(|| StoreError::SceneNotFound(format!("{scene_id}/{character_id}")))
}
