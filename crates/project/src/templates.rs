//! Built-in starter projects.

use crate::model::{
    AnimationLayers, AnimationStyle, Asset, AssetType, CameraAngle, CameraMovement,
    CharacterAnimation, CharacterMovement, CharacterPosition, DialogueEmotion, Scene,
    SceneCharacter, SceneDialogue, StyleProfile, TimelineData,
};
use serde::{Deserialize, Serialize};

/// Everything a project carries except its identity fields. Fields left at
/// `None` keep the new-project defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateData {
    pub data: Option<TimelineData>,
    pub script: Option<String>,
    pub assets: Option<Vec<Asset>>,
    pub style_profiles: Option<Vec<StyleProfile>>,
    pub current_style_reference: Option<StyleProfile>,
    pub scenes: Option<Vec<Scene>>,
    pub project_wide_music_asset_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub thumbnail_url: String,
    pub project_data: TemplateData,
}

impl ProjectTemplate {
    pub fn suggested_name(&self) -> String {
        format!("{} Copy", self.name)
    }
}

pub fn find_template(template_id: &str) -> Option<ProjectTemplate> {
    builtin_templates().into_iter().find(|t| t.id == template_id)
}

fn asset(id: &str, name: &str, asset_type: AssetType, seed: &str, size: &str, tags: &[&str]) -> Asset {
    Asset {
        id: id.to_string(),
        ..Asset::new(name, asset_type, format!("https://picsum.photos/seed/{seed}/{size}"))
            .with_tags(tags.iter().copied())
    }
}

fn character(
    id: &str,
    asset_id: &str,
    position: CharacterPosition,
    animation: CharacterAnimation,
    animation_style: AnimationStyle,
) -> SceneCharacter {
    SceneCharacter {
        id: id.to_string(),
        asset_id: asset_id.to_string(),
        position,
        animation,
        movement: CharacterMovement::None,
        animation_style,
        animation_layers: AnimationLayers::default(),
    }
}

fn line(id: &str, character_id: &str, text: &str, emotion: DialogueEmotion) -> SceneDialogue {
    SceneDialogue {
        id: id.to_string(),
        character_id: character_id.to_string(),
        line: text.to_string(),
        emotion,
        audio_asset_id: None,
    }
}

fn sci_fi_short() -> ProjectTemplate {
    let scene = Scene {
        id: "scene_1_template".into(),
        number: 1,
        script: "Unit 734 stands in the rain, looking at a map.".into(),
        duration: 10.0,
        camera_movement: CameraMovement::Dolly,
        camera_angle: CameraAngle::LowAngle,
        characters: vec![character(
            "sc_char_robot",
            "asset_robot_char",
            CharacterPosition::Center,
            CharacterAnimation::Idle,
            AnimationStyle::Realistic,
        )],
        background_asset_id: Some("asset_city_bg".into()),
        ..Scene::new(1)
    };

    ProjectTemplate {
        id: "template_scifi_short".into(),
        name: "Sci-Fi Short".into(),
        description: "A starting point for a futuristic story, featuring a robot character, a neon-lit city background, and a basic scene.".into(),
        thumbnail_url: "https://picsum.photos/seed/scifi/400/300".into(),
        project_data: TemplateData {
            script: Some(
                "SCENE 1\n\nINT. CYBERPUNK ALLEY - NIGHT\n\nUNIT 734, a sleek android, stands in the rain, neon signs reflecting off its chrome chassis. It looks down at a flickering holographic map in its palm.\n\nUNIT 734\n(V.O.)\nAnother dead end. The signal was clear, but the target is gone. They always are."
                    .into(),
            ),
            assets: Some(vec![
                asset(
                    "asset_robot_char",
                    "Unit 734",
                    AssetType::Character,
                    "robot",
                    "512/512",
                    &["robot", "android", "sci-fi", "character"],
                ),
                asset(
                    "asset_city_bg",
                    "Cyberpunk Alley",
                    AssetType::Background,
                    "cyberpunk",
                    "1920/1080",
                    &["city", "sci-fi", "neon", "background"],
                ),
            ]),
            scenes: Some(vec![scene]),
            data: Some(TimelineData {
                duration: 10.0,
                layers: Vec::new(),
            }),
            style_profiles: Some(Vec::new()),
            ..TemplateData::default()
        },
    }
}

fn fantasy_adventure_intro() -> ProjectTemplate {
    let scene = Scene {
        id: "scene_1_fantasy_template".into(),
        number: 1,
        script: "The knight confronts the sprite.".into(),
        duration: 8.0,
        camera_movement: CameraMovement::PanRight,
        camera_angle: CameraAngle::EyeLevel,
        characters: vec![
            character(
                "sc_char_knight",
                "asset_knight_char",
                CharacterPosition::Left,
                CharacterAnimation::Talking,
                AnimationStyle::SquashAndStretch,
            ),
            character(
                "sc_char_sprite",
                "asset_sprite_char",
                CharacterPosition::Right,
                CharacterAnimation::Talking,
                AnimationStyle::Bouncy,
            ),
        ],
        dialogue: vec![
            line(
                "dlg_1",
                "sc_char_sprite",
                "Took you long enough, slowpoke!",
                DialogueEmotion::Happy,
            ),
            line(
                "dlg_2",
                "sc_char_knight",
                "Your riddles are unnecessarily cryptic. Where is the Sunstone?",
                DialogueEmotion::Neutral,
            ),
        ],
        background_asset_id: Some("asset_forest_bg".into()),
        ..Scene::new(1)
    };

    ProjectTemplate {
        id: "template_fantasy_intro".into(),
        name: "Fantasy Adventure Intro".into(),
        description: "Begin a magical quest with a brave knight, a mysterious forest background, and an opening scene with dialogue.".into(),
        thumbnail_url: "https://picsum.photos/seed/fantasy/400/300".into(),
        project_data: TemplateData {
            script: Some(
                "SCENE 1\n\nEXT. ENCHANTED FOREST - DAY\n\nSIR Kaelan, a knight in shining armor, pushes aside a large fern, revealing a clearing. A mischievous Sprite hovers before him.\n\nSPRITE\nTook you long enough, slowpoke!\n\nSIR KAELAN\nYour riddles are unnecessarily cryptic. Where is the Sunstone?"
                    .into(),
            ),
            assets: Some(vec![
                asset(
                    "asset_knight_char",
                    "Sir Kaelan",
                    AssetType::Character,
                    "knight",
                    "512/512",
                    &["knight", "hero", "fantasy", "character"],
                ),
                asset(
                    "asset_sprite_char",
                    "Sprite",
                    AssetType::Character,
                    "sprite",
                    "512/512",
                    &["fairy", "sprite", "magical", "character"],
                ),
                asset(
                    "asset_forest_bg",
                    "Enchanted Forest",
                    AssetType::Background,
                    "forest",
                    "1920/1080",
                    &["forest", "fantasy", "nature", "background"],
                ),
            ]),
            scenes: Some(vec![scene]),
            data: Some(TimelineData {
                duration: 8.0,
                layers: Vec::new(),
            }),
            style_profiles: Some(Vec::new()),
            ..TemplateData::default()
        },
    }
}

pub fn builtin_templates() -> Vec<ProjectTemplate> {
    vec![sci_fi_short(), fantasy_adventure_intro()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewProject, ProjectStore};

    #[test]
    fn catalogue_has_two_starters() {
        let names: Vec<String> = builtin_templates().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Sci-Fi Short", "Fantasy Adventure Intro"]);
    }

    #[test]
    fn templates_create_consistent_projects() {
        let store = ProjectStore::in_memory();
        for template in builtin_templates() {
            let project = store
                .create(
                    NewProject::named(template.suggested_name()),
                    Some(template.project_data.clone()),
                )
                .unwrap();
            assert!(project.is_consistent(), "{} is inconsistent", template.name);
            assert_eq!(project.scenes.len(), 1);
        }
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn fantasy_template_keeps_dialogue_wiring() {
        let template = find_template("template_fantasy_intro").unwrap();
        let scene = &template.project_data.scenes.as_ref().unwrap()[0];
        assert_eq!(scene.dialogue[0].character_id, "sc_char_sprite");
        assert_eq!(template.suggested_name(), "Fantasy Adventure Intro Copy");
        assert_eq!(
            template.project_data.data.as_ref().map(|d| d.duration),
            Some(8.0)
        );
    }
}
