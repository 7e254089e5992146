//! Manual scene editing: the scene list, cast, dialogue and staging.

use crate::{PanelError, Studio};
use project::{
    scenes, AnimationData, AnimationKind, AnimationStyle, AssetType, CameraAngle, CameraMovement,
    CharacterAnimation, CharacterMovement, CharacterPosition, DialogueEmotion, Project, Scene,
    SceneCharacter, SceneDialogue, StoreError,
};
use tracing::info;

/// Partial update for a character instance.
#[derive(Debug, Clone, Default)]
pub struct CharacterEdit {
    pub asset_id: Option<String>,
    pub position: Option<CharacterPosition>,
    pub animation: Option<CharacterAnimation>,
    pub movement: Option<CharacterMovement>,
    pub animation_style: Option<AnimationStyle>,
}

/// Partial update for a dialogue line. `audio_asset_id: Some(None)` clears
/// the voice clip.
#[derive(Debug, Clone, Default)]
pub struct DialogueEdit {
    pub character_id: Option<String>,
    pub line: Option<String>,
    pub emotion: Option<DialogueEmotion>,
    pub audio_asset_id: Option<Option<String>>,
}

fn character_mut<'a>(scene: &'a mut Scene, character_id: &str) -> Result<&'a mut SceneCharacter, StoreError> {
    scene
        .character_mut(character_id)
        .ok_or_else(|| StoreError::SceneNotFound(format!("character {character_id}")))
}

/// Applies `edit`. A character that starts moving gets a placeholder idle
/// layer spanning the scene, unless it already has one.
fn apply_character_edit(scene: &mut Scene, character_id: &str, edit: CharacterEdit) -> Result<(), StoreError> {
    let scene_duration = scene.duration;
    let character = character_mut(scene, character_id)?;
    if let Some(movement) = edit.movement {
        let starts_moving = character.movement == CharacterMovement::None && movement != CharacterMovement::None;
        if starts_moving && character.animation_layers.idle.is_none() {
            character.animation_layers.idle = Some(AnimationData {
                kind: AnimationKind::Idle,
                frames: Vec::new(),
                duration: scene_duration,
                meta: None,
            });
        }
        character.movement = movement;
    }
    if let Some(asset_id) = edit.asset_id {
        character.asset_id = asset_id;
    }
    if let Some(position) = edit.position {
        character.position = position;
    }
    if let Some(animation) = edit.animation {
        character.animation = animation;
    }
    if let Some(style) = edit.animation_style {
        character.animation_style = style;
    }
    Ok(())
}

panel!(
    /// Direct edits to scenes. Nothing here calls the generative service.
    SceneEditor
);

impl SceneEditor {
    pub fn add_scene(&self, project_id: &str) -> Result<Scene, PanelError> {
        let mut added = None;
        self.studio.store().modify(project_id, |project| {
            added = Some(scenes::add_scene(&mut project.scenes).clone());
            Ok(())
        })?;
        let scene = added.ok_or_else(|| PanelError::not_found(format!("project {project_id}")))?;
        info!(project = %project_id, scene = %scene.id, number = scene.number, "scene added");
        Ok(scene)
    }

    pub fn delete_scene(&self, project_id: &str, scene_id: &str) -> Result<Project, PanelError> {
        let project = self.studio.store().modify(project_id, |project| {
            scenes::delete_scene(&mut project.scenes, scene_id)
                .map(|_| ())
                .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))
        })?;
        info!(project = %project_id, scene = %scene_id, "scene deleted");
        Ok(project)
    }

    /// Moves a scene to position `to` (zero-based, clamped to the end).
    pub fn move_scene(&self, project_id: &str, scene_id: &str, to: usize) -> Result<Project, PanelError> {
        Ok(self.studio.store().modify(project_id, |project| {
            if scenes::move_scene(&mut project.scenes, scene_id, to) {
                Ok(())
            } else {
                Err(StoreError::SceneNotFound(scene_id.to_string()))
            }
        })?)
    }

    pub fn set_script(&self, project_id: &str, scene_id: &str, script: &str) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.script = script.to_string();
            Ok(())
        })
    }

    pub fn set_duration(&self, project_id: &str, scene_id: &str, seconds: f64) -> Result<Project, PanelError> {
        if !(seconds > 0.0) || !seconds.is_finite() {
            return Err(PanelError::precondition("Scene duration must be greater than zero."));
        }
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.duration = seconds;
            Ok(())
        })
    }

    pub fn set_camera(
        &self,
        project_id: &str,
        scene_id: &str,
        movement: CameraMovement,
        angle: CameraAngle,
    ) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.camera_movement = movement;
            scene.camera_angle = angle;
            Ok(())
        })
    }

    /// Backgrounds may be background, prop or video assets; `None` clears.
    pub fn set_background(&self, project_id: &str, scene_id: &str, asset_id: Option<&str>) -> Result<Project, PanelError> {
        Ok(self.studio.store().modify(project_id, |project| {
            if let Some(id) = asset_id {
                let usable = project.asset(id).is_some_and(|a| {
                    matches!(a.asset_type, AssetType::Background | AssetType::Prop | AssetType::Video)
                });
                if !usable {
                    return Err(StoreError::AssetNotFound(id.to_string()));
                }
            }
            let scene = project
                .scene_mut(scene_id)
                .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
            scene.background_asset_id = asset_id.map(str::to_string);
            Ok(())
        })?)
    }

    /// Places a character asset in the scene; the first character asset in
    /// the library when `asset_id` is `None`.
    pub fn add_character(
        &self,
        project_id: &str,
        scene_id: &str,
        asset_id: Option<&str>,
    ) -> Result<SceneCharacter, PanelError> {
        let project = self.studio.project(project_id)?;
        let asset = match asset_id {
            Some(id) => project
                .asset(id)
                .filter(|a| a.asset_type == AssetType::Character)
                .ok_or_else(|| PanelError::not_found(format!("character asset {id}")))?,
            None => project.assets_of_type(AssetType::Character).next().ok_or_else(|| {
                PanelError::precondition(
                    "No character assets found. Please upload a character in the 'Assets' tab first.",
                )
            })?,
        };
        let character = SceneCharacter::new(asset.id.clone());
        let added = character.clone();
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.characters.push(character);
            Ok(())
        })?;
        info!(scene = %scene_id, character = %added.id, asset = %added.asset_id, "character placed");
        Ok(added)
    }

    pub fn update_character(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
        edit: CharacterEdit,
    ) -> Result<Project, PanelError> {
        self.studio
            .modify_scene(project_id, scene_id, |scene| apply_character_edit(scene, character_id, edit))
    }

    pub fn set_movement(
        &self,
        project_id: &str,
        scene_id: &str,
        character_id: &str,
        movement: CharacterMovement,
    ) -> Result<Project, PanelError> {
        let edit = CharacterEdit {
            movement: Some(movement),
            ..CharacterEdit::default()
        };
        self.update_character(project_id, scene_id, character_id, edit)
    }

    /// Removes the instance together with every line it speaks.
    pub fn remove_character(&self, project_id: &str, scene_id: &str, character_id: &str) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            character_mut(scene, character_id)?;
            scene.characters.retain(|c| c.id != character_id);
            scene.dialogue.retain(|d| d.character_id != character_id);
            Ok(())
        })
    }

    /// New empty line spoken by the first character in the scene.
    pub fn add_dialogue(&self, project_id: &str, scene_id: &str) -> Result<SceneDialogue, PanelError> {
        let (_, scene) = self.studio.scene(project_id, scene_id)?;
        let speaker = scene
            .characters
            .first()
            .ok_or_else(|| PanelError::precondition("Add a character before adding dialogue."))?;
        let line = SceneDialogue::new(speaker.id.clone());
        let added = line.clone();
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.dialogue.push(line);
            Ok(())
        })?;
        Ok(added)
    }

    pub fn update_dialogue(
        &self,
        project_id: &str,
        scene_id: &str,
        dialogue_id: &str,
        edit: DialogueEdit,
    ) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            if let Some(speaker) = &edit.character_id {
                character_mut(scene, speaker)?;
            }
            let line = scene
                .dialogue
                .iter_mut()
                .find(|d| d.id == dialogue_id)
                .ok_or_else(|| StoreError::SceneNotFound(format!("dialogue {dialogue_id}")))?;
            if let Some(speaker) = edit.character_id {
                line.character_id = speaker;
            }
            if let Some(text) = edit.line {
                line.line = text;
            }
            if let Some(emotion) = edit.emotion {
                line.emotion = emotion;
            }
            if let Some(audio) = edit.audio_asset_id {
                line.audio_asset_id = audio;
            }
            Ok(())
        })
    }

    pub fn remove_dialogue(&self, project_id: &str, scene_id: &str, dialogue_id: &str) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            let before = scene.dialogue.len();
            scene.dialogue.retain(|d| d.id != dialogue_id);
            if scene.dialogue.len() == before {
                return Err(StoreError::SceneNotFound(format!("dialogue {dialogue_id}")));
            }
            Ok(())
        })
    }
}
