//! Character designer: a neutral full-body sheet plus expression portraits,
//! saved to the library as a named character asset.

use crate::{PanelError, Studio};
use generation::PromptSpec;
use project::{AiAssetMetadata, Asset, AssetType};
use tracing::{debug, info};

pub const EXPRESSIONS: [&str; 6] = ["happy", "sad", "angry", "surprised", "worried", "excited"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtStyle {
    #[default]
    Cartoon,
    Anime,
    Realistic,
    PixelArt,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 4] = [
        ArtStyle::Cartoon,
        ArtStyle::Anime,
        ArtStyle::Realistic,
        ArtStyle::PixelArt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArtStyle::Cartoon => "Cartoon",
            ArtStyle::Anime => "Anime",
            ArtStyle::Realistic => "Realistic",
            ArtStyle::PixelArt => "Pixel Art",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Form-driven character description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualCharacter {
    pub body_type: String,
    pub skin_tone: String,
    pub hair_color: String,
    pub eye_color: String,
    pub clothing_primary: String,
    pub clothing_secondary: String,
    pub personality: String,
    pub special_features: String,
    /// Comma separated.
    pub tags: String,
}

impl Default for ManualCharacter {
    fn default() -> Self {
        Self {
            body_type: "Average".into(),
            skin_tone: "#E0AC69".into(),
            hair_color: "#4A3731".into(),
            eye_color: "#6A4F3B".into(),
            clothing_primary: "#3B82F6".into(),
            clothing_secondary: "#F3F4F6".into(),
            personality: String::new(),
            special_features: String::new(),
            tags: String::new(),
        }
    }
}

impl ManualCharacter {
    fn prompt(&self) -> String {
        let or = |value: &str, fallback: &'static str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        format!(
            "A character with an {} build. Skin tone is {}, hair color is {}, eye color is {}. \
They are wearing clothing that is primarily {} with {} accents. Personality: {}. Special features: {}.",
            self.body_type.to_lowercase(),
            self.skin_tone,
            self.hair_color,
            self.eye_color,
            self.clothing_primary,
            self.clothing_secondary,
            or(&self.personality, "Not specified"),
            or(&self.special_features, "None"),
        )
    }

    fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterSpec {
    Described { description: String, style: ArtStyle },
    /// Manual designs always render realistic.
    Manual(ManualCharacter),
}

impl CharacterSpec {
    pub fn described(description: impl Into<String>, style: ArtStyle) -> Self {
        CharacterSpec::Described {
            description: description.into(),
            style,
        }
    }

    pub fn art_style(&self) -> ArtStyle {
        match self {
            CharacterSpec::Described { style, .. } => *style,
            CharacterSpec::Manual(_) => ArtStyle::Realistic,
        }
    }

    fn full_prompt(&self) -> Result<String, PanelError> {
        let base = match self {
            CharacterSpec::Described { description, .. } => {
                if description.trim().is_empty() {
                    return Err(PanelError::precondition("Please provide a character description."));
                }
                description.clone()
            }
            CharacterSpec::Manual(form) => form.prompt(),
        };
        Ok(format!(
            "{base}. The art style should be a high-quality {}.",
            self.art_style().label().to_lowercase()
        ))
    }

    fn name_hint(&self) -> &str {
        match self {
            CharacterSpec::Described { description, .. } => description,
            CharacterSpec::Manual(form) => &form.personality,
        }
    }

    fn metadata_description(&self) -> String {
        match self {
            CharacterSpec::Described { description, .. } => description.clone(),
            CharacterSpec::Manual(form) => format!("A character with these traits: {}", form.personality),
        }
    }

    fn tags(&self) -> Vec<String> {
        match self {
            CharacterSpec::Described { .. } => Vec::new(),
            CharacterSpec::Manual(form) => form.tag_list(),
        }
    }
}

/// Generated images for one design, neutral sheet first.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDraft {
    pub spec: CharacterSpec,
    pub images: Vec<(String, String)>,
}

impl CharacterDraft {
    pub fn image(&self, expression: &str) -> Option<&str> {
        self.images
            .iter()
            .find(|(name, _)| name == expression)
            .map(|(_, url)| url.as_str())
    }

    pub fn neutral(&self) -> Option<&str> {
        self.image("neutral")
    }
}

/// Strips quotes the model likes to wrap names in.
fn clean_name(raw: &str) -> String {
    raw.replace(['"', '\''], "").trim().to_string()
}

panel!(CharacterPanel);

impl CharacterPanel {
    pub async fn generate(&self, spec: CharacterSpec) -> Result<CharacterDraft, PanelError> {
        self.state.run(self.render(spec)).await
    }

    async fn render(&self, spec: CharacterSpec) -> Result<CharacterDraft, PanelError> {
        let full = spec.full_prompt()?;
        let generation = self.studio.generation();
        let mut images = Vec::with_capacity(EXPRESSIONS.len() + 1);

        debug!("generating base character");
        let neutral = generation
            .generate_image(format!("Full body character sheet, neutral expression. {full}"))
            .await?;
        images.push(("neutral".to_string(), neutral));

        for expression in EXPRESSIONS {
            debug!(expression, "generating expression");
            let url = generation
                .generate_image(format!(
                    "A portrait of the same character, showing a {expression} expression. {full}"
                ))
                .await?;
            images.push((expression.to_string(), url));
        }
        Ok(CharacterDraft { spec, images })
    }

    /// Names the character and adds it to the library.
    pub async fn save(&self, project_id: &str, draft: &CharacterDraft) -> Result<Asset, PanelError> {
        self.state.run(self.store_character(project_id, draft)).await
    }

    async fn store_character(&self, project_id: &str, draft: &CharacterDraft) -> Result<Asset, PanelError> {
        let neutral = draft
            .neutral()
            .ok_or_else(|| PanelError::precondition("Generate the character before saving it."))?;
        self.studio.project(project_id)?;

        let prompt = format!(
            "Create a short, cool, descriptive name for a character described as: {}.",
            draft.spec.name_hint()
        );
        let raw = self
            .studio
            .generation()
            .generate_text(PromptSpec::text(self.studio.text_model(), prompt))
            .await?;
        let mut name = clean_name(&raw);
        if name.is_empty() {
            name = "New Character".to_string();
        }

        let mut asset = Asset::new(name.clone(), AssetType::Character, neutral).with_tags(draft.spec.tags());
        asset.id = project::new_id("asset_char");
        asset.ai_metadata = Some(AiAssetMetadata {
            description: draft.spec.metadata_description(),
            art_style: draft.spec.art_style().label().to_string(),
            detected_objects: vec!["person".into(), "character".into()],
            search_keywords: name.split(' ').map(String::from).collect(),
            ..AiAssetMetadata::default()
        });

        let saved = asset.clone();
        self.studio.store().modify(project_id, |project| {
            project.add_asset(asset);
            Ok(())
        })?;
        info!(project = %project_id, name = %saved.name, "character saved");
        Ok(saved)
    }
}
