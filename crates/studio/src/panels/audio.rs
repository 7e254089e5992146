use crate::{PanelError, Studio};
use project::{new_id, Asset, AssetType, Project, SoundEffect, StoreError};
use tracing::info;

const DEFAULT_EFFECT_VOLUME: f64 = 0.8;

/// Partial update for one sound effect. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct SoundEffectEdit {
    pub asset_id: Option<String>,
    pub start_time: Option<f64>,
    pub volume: Option<f64>,
}

fn check_music(project: &Project, asset_id: Option<&str>) -> Result<(), PanelError> {
    let Some(asset_id) = asset_id else {
        return Ok(());
    };
    match project.asset(asset_id) {
        Some(a) if matches!(a.asset_type, AssetType::Music | AssetType::Audio) => Ok(()),
        Some(_) => Err(PanelError::precondition("Music must be an audio or music asset.")),
        None => Err(StoreError::AssetNotFound(asset_id.to_string()).into()),
    }
}

fn effect_asset<'a>(project: &'a Project, asset_id: &str) -> Result<&'a Asset, PanelError> {
    match project.asset(asset_id) {
        Some(a) if a.asset_type == AssetType::Effect => Ok(a),
        Some(_) => Err(PanelError::precondition("Sound effects must use an 'effect' type asset.")),
        None => Err(StoreError::AssetNotFound(asset_id.to_string()).into()),
    }
}

panel!(
    /// Background music and per-scene sound effects.
    AudioPanel
);

impl AudioPanel {
    /// Music under the whole timeline; `None` clears it.
    pub fn set_project_music(&self, project_id: &str, asset_id: Option<&str>) -> Result<Project, PanelError> {
        check_music(&self.studio.project(project_id)?, asset_id)?;
        let project = self.studio.store().modify(project_id, |project| {
            project.project_wide_music_asset_id = asset_id.map(str::to_string);
            Ok(())
        })?;
        info!(project = %project_id, music = ?asset_id, "project music set");
        Ok(project)
    }

    pub fn set_scene_music(
        &self,
        project_id: &str,
        scene_id: &str,
        asset_id: Option<&str>,
    ) -> Result<Project, PanelError> {
        check_music(&self.studio.project(project_id)?, asset_id)?;
        Ok(self.studio.store().modify(project_id, |project| {
            let scene = project
                .scene_mut(scene_id)
                .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
            scene.background_music_asset_id = asset_id.map(str::to_string);
            Ok(())
        })?)
    }

    /// Adds an effect at the start of the scene. Uses `asset_id` or the
    /// first effect asset in the library.
    pub fn add_sound_effect(
        &self,
        project_id: &str,
        scene_id: &str,
        asset_id: Option<&str>,
    ) -> Result<SoundEffect, PanelError> {
        let project = self.studio.project(project_id)?;
        let asset = match asset_id {
            Some(id) => effect_asset(&project, id)?,
            None => project.assets_of_type(AssetType::Effect).next().ok_or_else(|| {
                PanelError::precondition(
                    "No sound effect assets found. Upload an 'effect' type asset in the Assets tab first.",
                )
            })?,
        };
        let effect = SoundEffect {
            id: new_id("sfx"),
            asset_id: asset.id.clone(),
            start_time: 0.0,
            volume: DEFAULT_EFFECT_VOLUME,
        };
        let added = effect.clone();
        self.studio.modify_scene(project_id, scene_id, |scene| {
            scene.sound_effects.push(effect);
            Ok(())
        })?;
        info!(scene = %scene_id, effect = %added.id, "sound effect added");
        Ok(added)
    }

    /// Volume is clamped to `0..=1` and the start time to `>= 0`.
    pub fn update_sound_effect(
        &self,
        project_id: &str,
        scene_id: &str,
        effect_id: &str,
        edit: SoundEffectEdit,
    ) -> Result<Project, PanelError> {
        if let Some(asset_id) = &edit.asset_id {
            effect_asset(&self.studio.project(project_id)?, asset_id)?;
        }
        self.studio.modify_scene(project_id, scene_id, |scene| {
            let effect = scene
                .sound_effects
                .iter_mut()
                .find(|e| e.id == effect_id)
                .ok_or_else(|| StoreError::AssetNotFound(effect_id.to_string()))?;
            if let Some(asset_id) = edit.asset_id {
                effect.asset_id = asset_id;
            }
            if let Some(start) = edit.start_time.filter(|s| s.is_finite()) {
                effect.start_time = start.max(0.0);
            }
            if let Some(volume) = edit.volume.filter(|v| v.is_finite()) {
                effect.volume = volume.clamp(0.0, 1.0);
            }
            Ok(())
        })
    }

    pub fn remove_sound_effect(&self, project_id: &str, scene_id: &str, effect_id: &str) -> Result<Project, PanelError> {
        self.studio.modify_scene(project_id, scene_id, |scene| {
            let before = scene.sound_effects.len();
            scene.sound_effects.retain(|e| e.id != effect_id);
            if scene.sound_effects.len() == before {
                return Err(StoreError::AssetNotFound(effect_id.to_string()));
            }
            Ok(())
        })
    }
}
