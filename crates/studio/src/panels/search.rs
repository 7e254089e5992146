use crate::{PanelError, Studio};
use generation::{PromptSpec, Schema};
use project::{Asset, AssetType};
use search::SearchCriteria;
use serde::Serialize;
use tracing::debug;

/// Owned copy of a [`search::SearchResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub asset: Asset,
    pub score: u32,
    pub reasons: Vec<String>,
}

fn criteria_prompt(query: &str) -> String {
    format!(
        "Analyze this search query and extract criteria. Return a JSON object with keys: assetTypes \
(array of: 'character', 'background', 'prop', 'audio', 'music', 'effect', 'video'), descriptors \
(array of nouns/adjectives), actions (array of verbs), context (e.g., 'forest'), mood (e.g., \
'dramatic'), colors (array of colors). Query: \"{query}\""
    )
}

fn criteria_schema() -> Schema {
    let types = AssetType::ALL
        .iter()
        .filter(|t| **t != AssetType::Storyboard)
        .map(|t| t.as_str());
    Schema::object([
        ("assetTypes", Schema::array(Schema::enumeration(types))),
        ("descriptors", Schema::array(Schema::string())),
        ("actions", Schema::array(Schema::string())),
        ("context", Schema::string()),
        ("mood", Schema::string()),
        ("colors", Schema::array(Schema::string())),
    ])
}

panel!(
    /// Natural-language library search.
    SearchPanel
);

impl SearchPanel {
    /// Lets the content model read `query` into criteria, then ranks the
    /// project's library against them.
    pub async fn search(&self, project_id: &str, query: &str) -> Result<Vec<SearchHit>, PanelError> {
        self.state.run(self.interpret_and_rank(project_id, query)).await
    }

    async fn interpret_and_rank(&self, project_id: &str, query: &str) -> Result<Vec<SearchHit>, PanelError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PanelError::precondition("Please enter a search query."));
        }
        self.studio.project(project_id)?;
        let criteria = self.interpret(query).await?;
        debug!(?criteria, "search query interpreted");
        self.rank(project_id, &criteria)
    }

    pub async fn interpret(&self, query: &str) -> Result<SearchCriteria, PanelError> {
        let spec = PromptSpec::text(self.studio.text_model(), criteria_prompt(query)).with_schema(criteria_schema());
        Ok(self.studio.generation().generate(spec).await?)
    }

    /// Ranks with criteria supplied by the caller.
    pub fn rank(&self, project_id: &str, criteria: &SearchCriteria) -> Result<Vec<SearchHit>, PanelError> {
        let project = self.studio.project(project_id)?;
        Ok(search::rank(&project.assets, criteria)
            .into_iter()
            .map(|r| SearchHit {
                asset: r.asset.clone(),
                score: r.score,
                reasons: r.reasons,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::studio;
    use project::AiAssetMetadata;
    use serde_json::json;

    #[tokio::test]
    async fn query_is_interpreted_then_ranked() {
        let (studio, backend, id) = studio();
        let mut fox = Asset::new("Fox", AssetType::Character, "u");
        fox.ai_metadata = Some(AiAssetMetadata {
            scene_context: "Deep forest".into(),
            ..AiAssetMetadata::default()
        });
        let rock = Asset::new("Rock", AssetType::Prop, "u");
        studio
            .store()
            .modify(&id, |p| {
                p.add_asset(fox);
                p.add_asset(rock);
                Ok(())
            })
            .unwrap();
        backend.push_json(json!({"assetTypes": ["character"], "context": "forest"}));

        let panel = SearchPanel::new(studio);
        let hits = panel.search(&id, "a character in the forest").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].asset.name, "Fox");
        assert_eq!(hits[0].score, search::TYPE_WEIGHT + search::CONTEXT_WEIGHT);

        let prompt = backend.content_requests()[0].prompt_text();
        assert!(prompt.ends_with("Query: \"a character in the forest\""));
    }

    #[tokio::test]
    async fn blank_query_is_not_sent() {
        let (studio, backend, id) = studio();
        let panel = SearchPanel::new(studio);
        assert!(matches!(panel.search(&id, "  ").await, Err(PanelError::Precondition(_))));
        assert!(backend.requests().is_empty());
    }
}
