//! Write-time consistency checks for a project and explicit asset removal.

use crate::model::{Asset, Project};
use crate::StoreError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityIssue {
    #[error("duplicate {collection} id `{id}`")]
    DuplicateId { collection: &'static str, id: String },
    #[error("scene `{scene_id}` is numbered {found}, expected {expected}")]
    SceneNumbering {
        scene_id: String,
        expected: u32,
        found: u32,
    },
    #[error("scene `{scene_id}` has non-positive duration {duration}")]
    NonPositiveDuration { scene_id: String, duration: f64 },
    #[error("sound effect `{effect_id}` in scene `{scene_id}` has volume {volume} outside 0..=1")]
    VolumeOutOfRange {
        scene_id: String,
        effect_id: String,
        volume: f64,
    },
    #[error("sound effect `{effect_id}` in scene `{scene_id}` starts before the scene")]
    NegativeStartTime { scene_id: String, effect_id: String },
    #[error("{field} of `{owner_id}` is not a finite number")]
    NonFiniteValue { owner_id: String, field: &'static str },
    #[error("{usage} points at missing asset `{asset_id}`")]
    DanglingAsset { usage: AssetUsage, asset_id: String },
    #[error("dialogue `{dialogue_id}` in scene `{scene_id}` refers to missing character `{character_id}`")]
    DanglingCharacter {
        scene_id: String,
        dialogue_id: String,
        character_id: String,
    },
}

/// One place a project refers to an asset by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetUsage {
    ProjectMusic,
    Background { scene_id: String },
    SceneMusic { scene_id: String },
    Character { scene_id: String, instance_id: String },
    SoundEffect { scene_id: String, effect_id: String },
    DialogueAudio { scene_id: String, dialogue_id: String },
}

impl std::fmt::Display for AssetUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetUsage::ProjectMusic => write!(f, "project music"),
            AssetUsage::Background { scene_id } => write!(f, "background of scene `{scene_id}`"),
            AssetUsage::SceneMusic { scene_id } => write!(f, "music of scene `{scene_id}`"),
            AssetUsage::Character {
                scene_id,
                instance_id,
            } => write!(f, "character `{instance_id}` in scene `{scene_id}`"),
            AssetUsage::SoundEffect {
                scene_id,
                effect_id,
            } => write!(f, "sound effect `{effect_id}` in scene `{scene_id}`"),
            AssetUsage::DialogueAudio {
                scene_id,
                dialogue_id,
            } => write!(f, "audio of dialogue `{dialogue_id}` in scene `{scene_id}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRemoval {
    /// Refuse while anything still uses the asset.
    Reject,
    /// Drop or null out every dependent, then remove.
    Detach,
}

fn duplicates<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
    issues: &mut Vec<IntegrityIssue>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            issues.push(IntegrityIssue::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
}

impl Project {
    /// Every `(usage, asset id)` reference held by the project.
    pub fn asset_references(&self) -> Vec<(AssetUsage, &str)> {
        let mut refs = Vec::new();
        if let Some(id) = &self.project_wide_music_asset_id {
            refs.push((AssetUsage::ProjectMusic, id.as_str()));
        }
        for scene in &self.scenes {
            let scene_id = || scene.id.clone();
            if let Some(id) = &scene.background_asset_id {
                refs.push((AssetUsage::Background { scene_id: scene_id() }, id.as_str()));
            }
            if let Some(id) = &scene.background_music_asset_id {
                refs.push((AssetUsage::SceneMusic { scene_id: scene_id() }, id.as_str()));
            }
            for character in &scene.characters {
                refs.push((
                    AssetUsage::Character {
                        scene_id: scene_id(),
                        instance_id: character.id.clone(),
                    },
                    character.asset_id.as_str(),
                ));
            }
            for effect in &scene.sound_effects {
                refs.push((
                    AssetUsage::SoundEffect {
                        scene_id: scene_id(),
                        effect_id: effect.id.clone(),
                    },
                    effect.asset_id.as_str(),
                ));
            }
            for line in &scene.dialogue {
                if let Some(id) = &line.audio_asset_id {
                    refs.push((
                        AssetUsage::DialogueAudio {
                            scene_id: scene_id(),
                            dialogue_id: line.id.clone(),
                        },
                        id.as_str(),
                    ));
                }
            }
        }
        refs
    }

    pub fn asset_usages(&self, asset_id: &str) -> Vec<AssetUsage> {
        self.asset_references()
            .into_iter()
            .filter(|(_, id)| *id == asset_id)
            .map(|(usage, _)| usage)
            .collect()
    }

    pub fn validate(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        duplicates("asset", self.assets.iter().map(|a| a.id.as_str()), &mut issues);
        duplicates("scene", self.scenes.iter().map(|s| s.id.as_str()), &mut issues);
        duplicates(
            "style profile",
            self.style_profiles.iter().map(|p| p.id.as_str()),
            &mut issues,
        );

        let asset_ids: HashSet<&str> = self.assets.iter().map(|a| a.id.as_str()).collect();
        for (usage, asset_id) in self.asset_references() {
            if !asset_ids.contains(asset_id) {
                issues.push(IntegrityIssue::DanglingAsset {
                    usage,
                    asset_id: asset_id.to_string(),
                });
            }
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            let expected = index as u32 + 1;
            if scene.number != expected {
                issues.push(IntegrityIssue::SceneNumbering {
                    scene_id: scene.id.clone(),
                    expected,
                    found: scene.number,
                });
            }
            if !scene.duration.is_finite() {
                issues.push(IntegrityIssue::NonFiniteValue {
                    owner_id: scene.id.clone(),
                    field: "duration",
                });
            } else if scene.duration <= 0.0 {
                issues.push(IntegrityIssue::NonPositiveDuration {
                    scene_id: scene.id.clone(),
                    duration: scene.duration,
                });
            }
            duplicates(
                "scene character",
                scene.characters.iter().map(|c| c.id.as_str()),
                &mut issues,
            );
            duplicates(
                "dialogue",
                scene.dialogue.iter().map(|d| d.id.as_str()),
                &mut issues,
            );
            duplicates(
                "sound effect",
                scene.sound_effects.iter().map(|e| e.id.as_str()),
                &mut issues,
            );
            for effect in &scene.sound_effects {
                for (field, value) in [("volume", effect.volume), ("start time", effect.start_time)] {
                    if !value.is_finite() {
                        issues.push(IntegrityIssue::NonFiniteValue {
                            owner_id: effect.id.clone(),
                            field,
                        });
                    }
                }
                if effect.volume.is_finite() && !(0.0..=1.0).contains(&effect.volume) {
                    issues.push(IntegrityIssue::VolumeOutOfRange {
                        scene_id: scene.id.clone(),
                        effect_id: effect.id.clone(),
                        volume: effect.volume,
                    });
                }
                if effect.start_time < 0.0 {
                    issues.push(IntegrityIssue::NegativeStartTime {
                        scene_id: scene.id.clone(),
                        effect_id: effect.id.clone(),
                    });
                }
            }
            for line in &scene.dialogue {
                if scene.character(&line.character_id).is_none() {
                    issues.push(IntegrityIssue::DanglingCharacter {
                        scene_id: scene.id.clone(),
                        dialogue_id: line.id.clone(),
                        character_id: line.character_id.clone(),
                    });
                }
            }
        }

        issues
    }

    pub fn is_consistent(&self) -> bool {
        self.validate().is_empty()
    }

    /// Removes an asset from the library. With [`AssetRemoval::Detach`] every
    /// dependent is dropped (character instances with their dialogue, sound
    /// effects) or nulled (backgrounds, music, dialogue audio).
    pub fn remove_asset(&mut self, asset_id: &str, policy: AssetRemoval) -> Result<Asset, StoreError> {
        let index = self
            .assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.to_string()))?;

        let usages = self.asset_usages(asset_id);
        if policy == AssetRemoval::Reject && !usages.is_empty() {
            return Err(StoreError::AssetInUse {
                asset_id: asset_id.to_string(),
                usages,
            });
        }

        let owned = Some(asset_id.to_string());
        if self.project_wide_music_asset_id == owned {
            self.project_wide_music_asset_id = None;
        }
        for scene in &mut self.scenes {
            if scene.background_asset_id == owned {
                scene.background_asset_id = None;
            }
            if scene.background_music_asset_id == owned {
                scene.background_music_asset_id = None;
            }
            scene.sound_effects.retain(|e| e.asset_id != asset_id);

            let removed: HashSet<String> = scene
                .characters
                .iter()
                .filter(|c| c.asset_id == asset_id)
                .map(|c| c.id.clone())
                .collect();
            scene.characters.retain(|c| !removed.contains(&c.id));
            scene.dialogue.retain(|d| !removed.contains(&d.character_id));
            for line in &mut scene.dialogue {
                if line.audio_asset_id == owned {
                    line.audio_asset_id = None;
                }
            }
        }

        Ok(self.assets.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetType, Scene, SceneCharacter, SceneDialogue, SoundEffect};
    use chrono::Utc;

    fn project() -> Project {
        let hero = Asset {
            id: "hero".into(),
            ..Asset::new("Hero", AssetType::Character, "u")
        };
        let forest = Asset {
            id: "forest".into(),
            ..Asset::new("Forest", AssetType::Background, "u")
        };
        let boom = Asset {
            id: "boom".into(),
            ..Asset::new("Boom", AssetType::Effect, "u")
        };

        let mut scene = Scene::new(1);
        scene.background_asset_id = Some("forest".into());
        let character = SceneCharacter::new("hero");
        let mut line = SceneDialogue::new(character.id.clone());
        line.line = "Hello".into();
        scene.characters.push(character);
        scene.dialogue.push(line);
        scene.sound_effects.push(SoundEffect {
            id: "sfx_1".into(),
            asset_id: "boom".into(),
            start_time: 0.0,
            volume: 0.8,
        });

        Project {
            id: "proj_1".into(),
            name: "Test".into(),
            description: String::new(),
            thumbnail_url: String::new(),
            last_modified: Utc::now(),
            data: Default::default(),
            script: String::new(),
            assets: vec![hero, forest, boom],
            style_profiles: Vec::new(),
            current_style_reference: None,
            scenes: vec![scene, Scene::new(2)],
            project_wide_music_asset_id: None,
        }
    }

    #[test]
    fn consistent_project_has_no_issues() {
        assert_eq!(project().validate(), Vec::new());
    }

    #[test]
    fn detects_numbering_duration_and_volume_problems() {
        let mut p = project();
        p.scenes[1].number = 7;
        p.scenes[1].duration = 0.0;
        p.scenes[0].sound_effects[0].volume = 1.5;
        let issues = p.validate();
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::SceneNumbering { expected: 2, found: 7, .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::NonPositiveDuration { .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::VolumeOutOfRange { .. })));
    }

    #[test]
    fn detects_dangling_references() {
        let mut p = project();
        p.scenes[1].background_asset_id = Some("missing".into());
        p.scenes[0].dialogue[0].character_id = "ghost".into();
        let issues = p.validate();
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            IntegrityIssue::DanglingAsset { asset_id, .. } if asset_id == "missing"
        ));
        assert!(matches!(&issues[1], IntegrityIssue::DanglingCharacter { .. }));
    }

    #[test]
    fn reject_policy_lists_dependents() {
        let mut p = project();
        let err = p.remove_asset("hero", AssetRemoval::Reject).unwrap_err();
        match err {
            StoreError::AssetInUse { usages, .. } => {
                assert_eq!(usages.len(), 1);
                assert!(matches!(usages[0], AssetUsage::Character { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(p.assets.len(), 3);
    }

    #[test]
    fn detach_policy_cleans_every_dependent() {
        let mut p = project();
        p.remove_asset("hero", AssetRemoval::Detach).unwrap();
        p.remove_asset("forest", AssetRemoval::Detach).unwrap();
        p.remove_asset("boom", AssetRemoval::Detach).unwrap();

        let scene = &p.scenes[0];
        assert!(scene.characters.is_empty());
        assert!(scene.dialogue.is_empty());
        assert!(scene.sound_effects.is_empty());
        assert!(scene.background_asset_id.is_none());
        assert!(p.assets.is_empty());
        assert!(p.is_consistent());
    }

    #[test]
    fn unused_asset_removes_under_reject() {
        let mut p = project();
        p.assets.push(Asset {
            id: "spare".into(),
            ..Asset::new("Spare", AssetType::Prop, "u")
        });
        let removed = p.remove_asset("spare", AssetRemoval::Reject).unwrap();
        assert_eq!(removed.name, "Spare");
        assert!(matches!(
            p.remove_asset("spare", AssetRemoval::Reject),
            Err(StoreError::AssetNotFound(_))
        ));
    }
}
