//! Weighted keyword scoring of library assets against interpreted search
//! criteria, plus the plain metadata filter used by the asset browser.

use project::{Asset, AssetType};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_RESULTS: usize = 20;

pub const TYPE_WEIGHT: u32 = 30;
pub const NAME_WEIGHT: u32 = 20;
pub const KEYWORD_WEIGHT: u32 = 15;
pub const CONTEXT_WEIGHT: u32 = 25;
pub const MOOD_WEIGHT: u32 = 15;
pub const OBJECT_WEIGHT: u32 = 12;
pub const COLOR_WEIGHT: u32 = 8;
pub const TAG_WEIGHT: u32 = 10;

/// Structured reading of a free-text query. Every field may be missing from
/// the service response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub asset_types: Vec<String>,
    pub descriptors: Vec<String>,
    pub actions: Vec<String>,
    pub context: String,
    pub mood: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<'a> {
    pub asset: &'a Asset,
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Case-insensitive substring test.
fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn any_contains(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|h| contains(h, needle))
}

struct Tally {
    score: u32,
    reasons: Vec<String>,
}

impl Tally {
    fn add(&mut self, weight: u32, reason: String) {
        self.score += weight;
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }
}

/// Scores one asset. `None` when nothing matched.
pub fn score<'a>(asset: &'a Asset, criteria: &SearchCriteria) -> Option<SearchResult<'a>> {
    let mut tally = Tally {
        score: 0,
        reasons: Vec::new(),
    };
    let descriptors: Vec<&str> = criteria
        .descriptors
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect();

    if criteria
        .asset_types
        .iter()
        .any(|t| t.trim().eq_ignore_ascii_case(asset.asset_type.as_str()))
    {
        tally.add(TYPE_WEIGHT, format!("Type: {}", asset.asset_type));
    }

    for desc in &descriptors {
        if contains(&asset.name, desc) {
            tally.add(NAME_WEIGHT, format!("Name match: \"{desc}\""));
        }
    }

    // Everything below needs image analysis.
    if let Some(meta) = &asset.ai_metadata {
        for desc in &descriptors {
            if any_contains(&meta.search_keywords, desc) {
                tally.add(KEYWORD_WEIGHT, format!("AI Tag: \"{desc}\""));
            }
        }

        let context = criteria.context.trim();
        if !context.is_empty() && contains(&meta.scene_context, context) {
            tally.add(CONTEXT_WEIGHT, format!("Context: {context}"));
        }

        let mood = criteria.mood.trim();
        if !mood.is_empty() && contains(&meta.mood, mood) {
            tally.add(MOOD_WEIGHT, format!("Mood: {mood}"));
        }

        for desc in &descriptors {
            if any_contains(&meta.detected_objects, desc) {
                tally.add(OBJECT_WEIGHT, format!("Object: \"{desc}\""));
            }
        }

        for color in criteria.colors.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if any_contains(&meta.dominant_colors, color) || contains(&meta.description, color) {
                tally.add(COLOR_WEIGHT, format!("Color: {color}"));
            }
        }

        for desc in &descriptors {
            if any_contains(&asset.tags, desc) {
                tally.add(TAG_WEIGHT, format!("User Tag: \"{desc}\""));
            }
        }
    }

    (tally.score > 0).then(|| SearchResult {
        asset,
        score: tally.score,
        reasons: tally.reasons,
    })
}

/// Scores every asset, keeps the matches, orders them by descending score
/// (ties keep library order) and returns at most [`MAX_RESULTS`].
pub fn rank<'a>(assets: &'a [Asset], criteria: &SearchCriteria) -> Vec<SearchResult<'a>> {
    let mut results: Vec<SearchResult<'a>> =
        assets.iter().filter_map(|a| score(a, criteria)).collect();
    results.sort_by(|a, b| b.score.cmp(&a.score));
    let matched = results.len();
    results.truncate(MAX_RESULTS);
    debug!(candidates = assets.len(), matched, returned = results.len(), "assets ranked");
    results
}

/// Asset browser filter: free-text term over name, tags and analysis, an
/// optional type and an optional art style (`"any"` disables it).
pub fn filter_library<'a>(
    assets: &'a [Asset],
    term: &str,
    asset_type: Option<AssetType>,
    art_style: Option<&str>,
) -> Vec<&'a Asset> {
    let term = term.trim();
    let style = art_style
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("any"));

    assets
        .iter()
        .filter(|asset| {
            let matches_term = term.is_empty()
                || contains(&asset.name, term)
                || any_contains(&asset.tags, term)
                || asset.ai_metadata.as_ref().is_some_and(|meta| {
                    contains(&meta.description, term)
                        || any_contains(&meta.detected_objects, term)
                        || any_contains(&meta.search_keywords, term)
                        || contains(&meta.art_style, term)
                        || contains(&meta.scene_context, term)
                });
            let matches_type = asset_type.map_or(true, |t| asset.asset_type == t);
            let matches_style = style.map_or(true, |s| {
                asset
                    .ai_metadata
                    .as_ref()
                    .is_some_and(|meta| contains(&meta.art_style, s))
            });
            matches_term && matches_type && matches_style
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use project::AiAssetMetadata;

    fn criteria(types: &[&str], descriptors: &[&str]) -> SearchCriteria {
        SearchCriteria {
            asset_types: types.iter().map(|s| s.to_string()).collect(),
            descriptors: descriptors.iter().map(|s| s.to_string()).collect(),
            ..SearchCriteria::default()
        }
    }

    #[test]
    fn no_match_is_excluded() {
        let asset = Asset::new("Tree", AssetType::Prop, "u");
        assert!(score(&asset, &criteria(&["character"], &["robot"])).is_none());
    }

    #[test]
    fn type_plus_name_scores_fifty() {
        let asset = Asset::new("Robot Guard", AssetType::Character, "u");
        let result = score(&asset, &criteria(&["character"], &["robot"])).unwrap();
        assert_eq!(result.score, 50);
        assert_eq!(result.reasons, vec!["Type: character", "Name match: \"robot\""]);
    }

    #[test]
    fn tags_only_count_with_analysis() {
        let plain = Asset::new("Unit", AssetType::Prop, "u").with_tags(["robot"]);
        assert!(score(&plain, &criteria(&[], &["robot"])).is_none());

        let mut analyzed = plain.clone();
        analyzed.ai_metadata = Some(AiAssetMetadata::default());
        let result = score(&analyzed, &criteria(&[], &["robot"])).unwrap();
        assert_eq!(result.score, TAG_WEIGHT);
    }

    #[test]
    fn analysis_rules_add_up() {
        let mut asset = Asset::new("Alley", AssetType::Background, "u").with_tags(["Neon"]);
        asset.ai_metadata = Some(AiAssetMetadata {
            description: "A rainy alley lit in magenta".into(),
            detected_objects: vec!["Neon sign".into()],
            scene_context: "Cyberpunk city street".into(),
            mood: "Moody".into(),
            dominant_colors: vec!["teal".into()],
            search_keywords: vec!["neon-lights".into()],
            ..AiAssetMetadata::default()
        });
        let criteria = SearchCriteria {
            descriptors: vec!["neon".into()],
            context: "city".into(),
            mood: "moody".into(),
            colors: vec!["Teal".into(), "magenta".into(), "orange".into()],
            ..SearchCriteria::default()
        };
        let result = score(&asset, &criteria).unwrap();
        assert_eq!(
            result.score,
            KEYWORD_WEIGHT + CONTEXT_WEIGHT + MOOD_WEIGHT + OBJECT_WEIGHT + 2 * COLOR_WEIGHT + TAG_WEIGHT
        );
        assert_eq!(
            result.reasons,
            vec![
                "AI Tag: \"neon\"",
                "Context: city",
                "Mood: moody",
                "Object: \"neon\"",
                "Color: Teal",
                "Color: magenta",
                "User Tag: \"neon\"",
            ]
        );
    }

    #[test]
    fn repeated_descriptor_keeps_one_reason() {
        let asset = Asset::new("Robot", AssetType::Character, "u");
        let result = score(&asset, &criteria(&[], &["robot", "ROBOT", "robot"])).unwrap();
        assert_eq!(result.score, 60);
        assert_eq!(
            result.reasons,
            vec!["Name match: \"robot\"", "Name match: \"ROBOT\""]
        );
    }

    #[test]
    fn criteria_tolerate_missing_fields() {
        let parsed: SearchCriteria =
            serde_json::from_str(r#"{"descriptors":["knight"],"mood":"brave"}"#).unwrap();
        assert_eq!(parsed.descriptors, vec!["knight"]);
        assert!(parsed.asset_types.is_empty());
        assert!(parsed.colors.is_empty());
    }
}
