//! One module per studio tool.

macro_rules! panel {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            studio: $crate::Studio,
            state: $crate::PanelState,
        }

        impl $name {
            pub fn new(studio: $crate::Studio) -> Self {
                Self {
                    studio,
                    state: $crate::PanelState::new(),
                }
            }

            pub fn state(&self) -> &$crate::PanelState {
                &self.state
            }
        }
    };
}

pub mod animate;
pub mod animation_style;
pub mod assets;
pub mod audio;
pub mod character;
pub mod director;
pub mod drawing;
pub mod generate;
pub mod scene_editor;
pub mod script;
pub mod search;
pub mod sequence;
pub mod story;
pub mod storyboard;

pub use animate::AnimatePanel;
pub use animation_style::{AnimationStylePanel, AnimationTarget};
pub use assets::AssetsPanel;
pub use audio::{AudioPanel, SoundEffectEdit};
pub use character::{ArtStyle, CharacterDraft, CharacterPanel, CharacterSpec, ManualCharacter};
pub use director::{DirectorPanel, SceneAnalysis};
pub use drawing::DrawingPanel;
pub use generate::GeneratePanel;
pub use scene_editor::{CharacterEdit, DialogueEdit, SceneEditor};
pub use script::{script_stats, DraftStatus, ScriptDraft, ScriptStats};
pub use self::search::{SearchHit, SearchPanel};
pub use sequence::{GeneratedShot, RenderedShot, SequencePanel};
pub use story::{GeneratedScene, StoryPanel};
pub use storyboard::Storyboarder;
