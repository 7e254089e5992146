//! Asset library: import with automatic tagging, browse, remove.

use crate::{MediaFile, PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{AiAssetMetadata, Asset, AssetRemoval, AssetType, Project};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

const ANALYSIS_PROMPT: &str = r#"Analyze this image and provide detailed metadata. Format the output as a single JSON object with the following structure:
{ "name": "A short, suitable name for the asset", "aiMetadata": { "description": "A comprehensive description...", "detectedObjects": ["object1", "object2"], "sceneContext": "e.g., 'Outdoor, forest clearing'", "mood": "e.g., 'Peaceful'", "dominantColors": ["color1", "color2"], "composition": "e.g., 'Rule of thirds'", "suggestedUsage": "Suggestions for use", "artStyle": "Primary art style", "colorPaletteDescription": "Description of the colors", "lighting": "Description of lighting", "lineQuality": "e.g., 'Thin, consistent'", "artisticTone": "e.g., 'Whimsical'", "searchKeywords": ["keyword1", "keyword2"] }, "tags": ["tag1", "tag2"] }"#;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImageAnalysis {
    name: String,
    ai_metadata: Option<AiAssetMetadata>,
    tags: Vec<String>,
}

fn analysis_schema() -> Schema {
    let strings = || Schema::array(Schema::string());
    let text = [
        "description",
        "sceneContext",
        "mood",
        "composition",
        "suggestedUsage",
        "artStyle",
        "colorPaletteDescription",
        "lighting",
        "lineQuality",
        "artisticTone",
    ];
    let mut metadata: Vec<(&str, Schema)> = text.iter().map(|k| (*k, Schema::string())).collect();
    metadata.extend([
        ("detectedObjects", strings()),
        ("dominantColors", strings()),
        ("searchKeywords", strings()),
    ]);
    Schema::object([
        ("name", Schema::string()),
        ("aiMetadata", Schema::object(metadata)),
        ("tags", strings()),
    ])
}

/// Library type for a file that is not analyzed.
fn plain_type(file: &MediaFile) -> AssetType {
    if file.is_video() {
        AssetType::Video
    } else if file.is_audio() {
        AssetType::Audio
    } else {
        AssetType::Prop
    }
}

fn plain_asset(file: &MediaFile, asset_type: AssetType) -> Asset {
    Asset::new(file.name.clone(), asset_type, file.data_url()).with_tags([asset_type.as_str()])
}

panel!(AssetsPanel);

impl AssetsPanel {
    pub async fn import_path(&self, project_id: &str, path: &Path) -> Result<Asset, PanelError> {
        let file = MediaFile::read(path).await?;
        self.import(project_id, &file).await
    }

    /// Adds a file to the library. Images are described by the content
    /// model first; if that fails the image is kept as an untagged prop.
    pub async fn import(&self, project_id: &str, file: &MediaFile) -> Result<Asset, PanelError> {
        self.state.run(self.add_file(project_id, file)).await
    }

    async fn add_file(&self, project_id: &str, file: &MediaFile) -> Result<Asset, PanelError> {
        self.studio.project(project_id)?;
        let asset = if file.is_image() {
            match self.analyze(file).await {
                Ok(analysis) => {
                    let name = if analysis.name.trim().is_empty() {
                        file.name.clone()
                    } else {
                        analysis.name
                    };
                    let mut asset =
                        Asset::new(name, AssetType::Character, file.data_url()).with_tags(analysis.tags);
                    asset.ai_metadata = analysis.ai_metadata;
                    asset
                }
                Err(err) => {
                    warn!(file = %file.name, error = %err, "image analysis failed; importing untagged");
                    plain_asset(file, AssetType::Prop)
                }
            }
        } else {
            plain_asset(file, plain_type(file))
        };

        let saved = asset.clone();
        self.studio.store().modify(project_id, |project| {
            project.add_asset(asset);
            Ok(())
        })?;
        info!(project = %project_id, asset = %saved.id, kind = %saved.asset_type, "asset imported");
        Ok(saved)
    }

    async fn analyze(&self, file: &MediaFile) -> Result<ImageAnalysis, PanelError> {
        let spec = PromptSpec::text(self.studio.text_model(), ANALYSIS_PROMPT)
            .with_image(file.mime_type.clone(), file.data.clone())
            .with_schema(analysis_schema());
        Ok(self.studio.generation().generate(spec).await?)
    }

    pub fn list(&self, project_id: &str, asset_type: Option<AssetType>) -> Result<Vec<Asset>, PanelError> {
        let project = self.studio.project(project_id)?;
        Ok(project
            .assets
            .into_iter()
            .filter(|a| asset_type.map_or(true, |t| a.asset_type == t))
            .collect())
    }

    /// The browser's metadata filter.
    pub fn filter(
        &self,
        project_id: &str,
        term: &str,
        asset_type: Option<AssetType>,
        art_style: Option<&str>,
    ) -> Result<Vec<Asset>, PanelError> {
        let project = self.studio.project(project_id)?;
        Ok(search::filter_library(&project.assets, term, asset_type, art_style)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn remove(&self, project_id: &str, asset_id: &str, policy: AssetRemoval) -> Result<Project, PanelError> {
        let project = self.studio.store().modify(project_id, |project| {
            project.remove_asset(asset_id, policy).map(|_| ())
        })?;
        info!(project = %project_id, asset = %asset_id, ?policy, "asset removed");
        Ok(project)
    }
}
