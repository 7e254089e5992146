use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generates a collection-unique id such as `scene_3f2a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Closed string enums shared with the persisted JSON: serde names, `as_str`,
/// `Display`, `FromStr` and the full value list all come from one table.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

string_enum!(AssetType, "asset type" {
    Character => "character",
    Background => "background",
    Prop => "prop",
    Audio => "audio",
    Music => "music",
    Effect => "effect",
    Video => "video",
    Storyboard => "storyboard",
});

string_enum!(CameraMovement, "camera movement" {
    None => "none",
    PanLeft => "pan-left",
    PanRight => "pan-right",
    ZoomIn => "zoom-in",
    ZoomOut => "zoom-out",
    Dolly => "dolly",
    Static => "static",
    Truck => "truck",
});

string_enum!(CameraAngle, "camera angle" {
    EyeLevel => "eye-level",
    HighAngle => "high-angle",
    LowAngle => "low-angle",
    BirdsEye => "birds-eye",
    WormsEye => "worms-eye",
});

string_enum!(CharacterPosition, "character position" {
    Left => "left",
    Center => "center",
    Right => "right",
    Upstage => "upstage",
    Downstage => "downstage",
    StageLeft => "stage-left",
    StageRight => "stage-right",
});

string_enum!(CharacterAnimation, "character animation" {
    Idle => "idle",
    Walking => "walking",
    Talking => "talking",
    Action => "action",
});

string_enum!(CharacterMovement, "character movement" {
    None => "none",
    EnterLeft => "enter-left",
    EnterRight => "enter-right",
    ExitLeft => "exit-left",
    ExitRight => "exit-right",
});

string_enum!(DialogueEmotion, "dialogue emotion" {
    Neutral => "neutral",
    Happy => "happy",
    Sad => "sad",
    Angry => "angry",
    Surprised => "surprised",
});

string_enum!(AnimationStyle, "animation style" {
    SquashAndStretch => "squash-and-stretch",
    Limited => "limited",
    Realistic => "realistic",
    Bouncy => "bouncy",
    Robotic => "robotic",
});

string_enum!(AnimationKind, "animation kind" {
    Idle => "idle",
    Walking => "walking",
    Talking => "talking",
});

string_enum!(ClipKind, "clip type" {
    Text => "text",
    Image => "image",
    Shape => "shape",
    Audio => "audio",
    Video => "video",
});

impl Default for CameraMovement {
    fn default() -> Self {
        CameraMovement::None
    }
}

impl Default for CameraAngle {
    fn default() -> Self {
        CameraAngle::EyeLevel
    }
}

impl Default for CharacterMovement {
    fn default() -> Self {
        CharacterMovement::None
    }
}

impl Default for DialogueEmotion {
    fn default() -> Self {
        DialogueEmotion::Neutral
    }
}

// Legacy layered clip timeline. Carried through storage untouched.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub start: f64,
    pub duration: f64,
    pub content: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    pub duration: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Default for TimelineData {
    fn default() -> Self {
        Self {
            duration: 30.0,
            layers: Vec::new(),
        }
    }
}

/// Image analysis attached to an uploaded asset. Every field is optional in
/// the service response, so each one defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiAssetMetadata {
    pub description: String,
    pub detected_objects: Vec<String>,
    pub scene_context: String,
    pub mood: String,
    pub dominant_colors: Vec<String>,
    pub composition: String,
    pub suggested_usage: String,
    pub art_style: String,
    pub color_palette_description: String,
    pub lighting: String,
    pub line_quality: String,
    pub artistic_tone: String,
    pub search_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<AiAssetMetadata>,
}

impl Asset {
    pub fn new(name: impl Into<String>, asset_type: AssetType, url: impl Into<String>) -> Self {
        Self {
            id: new_id("asset"),
            name: name.into(),
            asset_type,
            url: url.into(),
            tags: Vec::new(),
            duration: None,
            ai_metadata: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl StyleProfile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_id("style"),
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundEffect {
    pub id: String,
    pub asset_id: String,
    /// Seconds from the start of the owning scene.
    pub start_time: f64,
    /// Linear gain in `0.0..=1.0`.
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryboardPanel {
    pub id: String,
    pub panel_number: u32,
    pub timing: String,
    pub shot_type: String,
    pub camera_angle: CameraAngle,
    pub camera_movement: CameraMovement,
    pub visual_description: String,
    pub character_pose: String,
    pub key_visual_elements: String,
    pub lighting_and_mood: String,
    pub background_details: String,
    pub transition: String,
    pub directors_notes: String,
    pub dialogue_snippet: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDialogue {
    pub id: String,
    /// Instance id of a [`SceneCharacter`] in the same scene.
    pub character_id: String,
    pub line: String,
    pub emotion: DialogueEmotion,
    pub audio_asset_id: Option<String>,
}

impl SceneDialogue {
    pub fn new(character_id: impl Into<String>) -> Self {
        Self {
            id: new_id("sc_dlg"),
            character_id: character_id.into(),
            line: String::new(),
            emotion: DialogueEmotion::Neutral,
            audio_asset_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeTiming {
    pub phoneme: String,
    pub mouth_shape: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonemes: Option<Vec<PhonemeTiming>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// One sprite sheet URL, or one frame per mouth shape for talking layers.
    pub frames: Vec<String>,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AnimationMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationLayers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle: Option<AnimationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walking: Option<AnimationData>,
    /// Keyed by dialogue id.
    #[serde(default)]
    pub talking: BTreeMap<String, AnimationData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneCharacter {
    pub id: String,
    pub asset_id: String,
    pub position: CharacterPosition,
    pub animation: CharacterAnimation,
    pub movement: CharacterMovement,
    pub animation_style: AnimationStyle,
    #[serde(default)]
    pub animation_layers: AnimationLayers,
}

impl SceneCharacter {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            id: new_id("sc_char"),
            asset_id: asset_id.into(),
            position: CharacterPosition::Center,
            animation: CharacterAnimation::Idle,
            movement: CharacterMovement::None,
            animation_style: AnimationStyle::Realistic,
            animation_layers: AnimationLayers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub number: u32,
    pub script: String,
    pub duration: f64,
    pub camera_movement: CameraMovement,
    pub camera_angle: CameraAngle,
    #[serde(default)]
    pub characters: Vec<SceneCharacter>,
    #[serde(default)]
    pub dialogue: Vec<SceneDialogue>,
    pub background_asset_id: Option<String>,
    #[serde(default)]
    pub storyboard_panels: Vec<StoryboardPanel>,
    pub background_music_asset_id: Option<String>,
    #[serde(default)]
    pub sound_effects: Vec<SoundEffect>,
}

impl Scene {
    pub const DEFAULT_DURATION: f64 = 5.0;

    /// Empty five second scene, static camera at eye level.
    pub fn new(number: u32) -> Self {
        Self {
            id: new_id("scene"),
            number,
            script: String::new(),
            duration: Self::DEFAULT_DURATION,
            camera_movement: CameraMovement::None,
            camera_angle: CameraAngle::EyeLevel,
            characters: Vec::new(),
            dialogue: Vec::new(),
            background_asset_id: None,
            storyboard_panels: Vec::new(),
            background_music_asset_id: None,
            sound_effects: Vec::new(),
        }
    }

    pub fn character(&self, instance_id: &str) -> Option<&SceneCharacter> {
        self.characters.iter().find(|c| c.id == instance_id)
    }

    pub fn character_mut(&mut self, instance_id: &str) -> Option<&mut SceneCharacter> {
        self.characters.iter_mut().find(|c| c.id == instance_id)
    }

    pub fn dialogue_line(&self, dialogue_id: &str) -> Option<&SceneDialogue> {
        self.dialogue.iter().find(|d| d.id == dialogue_id)
    }
}

impl timeline::Segment for Scene {
    fn segment_id(&self) -> &str {
        &self.id
    }

    fn duration_secs(&self) -> timeline::Seconds {
        self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub thumbnail_url: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub data: TimelineData,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub style_profiles: Vec<StyleProfile>,
    #[serde(default)]
    pub current_style_reference: Option<StyleProfile>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub project_wide_music_asset_id: Option<String>,
}

impl Project {
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    pub fn scene_mut(&mut self, scene_id: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == scene_id)
    }

    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_use_kebab_case_wire_names() {
        assert_eq!(
            serde_json::to_value(CameraMovement::PanLeft).unwrap(),
            json!("pan-left")
        );
        assert_eq!(
            serde_json::to_value(AnimationStyle::SquashAndStretch).unwrap(),
            json!("squash-and-stretch")
        );
        assert_eq!("worms-eye".parse::<CameraAngle>(), Ok(CameraAngle::WormsEye));
        assert!("sideways".parse::<CameraAngle>().is_err());
        assert_eq!(AssetType::ALL.len(), 8);
    }

    #[test]
    fn scene_serializes_with_camel_case_and_nulls() {
        let scene = Scene::new(1);
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["duration"], json!(5.0));
        assert_eq!(value["cameraMovement"], json!("none"));
        assert_eq!(value["cameraAngle"], json!("eye-level"));
        assert_eq!(value["backgroundAssetId"], json!(null));
        assert!(value["storyboardPanels"].as_array().unwrap().is_empty());
    }

    #[test]
    fn asset_reads_stored_json() {
        let raw = json!({
            "id": "asset_1",
            "name": "Robot",
            "type": "character",
            "url": "https://example.com/robot.png",
            "tags": ["robot"],
            "aiMetadata": { "description": "a robot", "mood": "lonely" }
        });
        let asset: Asset = serde_json::from_value(raw).unwrap();
        assert_eq!(asset.asset_type, AssetType::Character);
        let meta = asset.ai_metadata.unwrap();
        assert_eq!(meta.mood, "lonely");
        assert!(meta.search_keywords.is_empty());
    }

    #[test]
    fn character_layers_default_to_empty_talking_map() {
        let raw = json!({
            "id": "sc_char_robot",
            "assetId": "asset_robot_char",
            "position": "center",
            "animation": "idle",
            "movement": "none",
            "animationStyle": "realistic",
            "animationLayers": { "talking": {} }
        });
        let character: SceneCharacter = serde_json::from_value(raw).unwrap();
        assert!(character.animation_layers.idle.is_none());
        assert!(character.animation_layers.talking.is_empty());
    }

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = new_id("proj");
        let b = new_id("proj");
        assert!(a.starts_with("proj_"));
        assert_ne!(a, b);
    }
}
