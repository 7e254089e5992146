use crate::{PanelError, Studio};
use generation::{PromptSpec, Schema};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScene {
    pub scene_number: u32,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub dialogue: Vec<ScriptLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub character: String,
    pub line: String,
}

pub(crate) fn script_line_schema() -> Schema {
    Schema::object([("character", Schema::string()), ("line", Schema::string())])
}

pub fn story_schema() -> Schema {
    Schema::array(Schema::object([
        ("sceneNumber", Schema::integer()),
        ("setting", Schema::string()),
        ("characters", Schema::array(Schema::string())),
        ("action", Schema::string()),
        ("dialogue", Schema::array(script_line_schema())),
    ]))
}

panel!(
    /// Splits a free-form script into scenes.
    StoryPanel
);

impl StoryPanel {
    pub async fn breakdown(&self, script: &str) -> Result<Vec<GeneratedScene>, PanelError> {
        self.state.run(self.request_breakdown(script)).await
    }

    async fn request_breakdown(&self, script: &str) -> Result<Vec<GeneratedScene>, PanelError> {
        if script.trim().is_empty() {
            return Err(PanelError::precondition("Please enter a script to analyze."));
        }
        let prompt = format!(
            "Analyze the following script and break it down into scenes. Output a JSON array of scenes with keys: sceneNumber, setting, characters, action, and dialogue (an array of {{character, line}}).\n\nScript:\n{script}"
        );
        let spec = PromptSpec::text(self.studio.text_model(), prompt).with_schema(story_schema());
        let scenes: Vec<GeneratedScene> = self.studio.generation().generate(spec).await?;
        info!(scenes = scenes.len(), "script broken down");
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::studio;
    use serde_json::json;

    #[tokio::test]
    async fn parses_scene_breakdown() {
        let (studio, backend, _) = studio();
        backend.push_json(json!([
            {"sceneNumber": 1, "setting": "Lab", "characters": ["Zed"], "action": "Zed wakes",
             "dialogue": [{"character": "Zed", "line": "Where am I?"}]},
            {"sceneNumber": 2, "setting": "Street", "characters": [], "action": "Rain"}
        ]));
        let panel = StoryPanel::new(studio);
        let scenes = panel.breakdown("Zed wakes in a lab.").await.unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].dialogue[0].line, "Where am I?");
        assert!(scenes[1].dialogue.is_empty());

        let sent = &backend.content_requests()[0];
        assert!(sent.json_response);
        assert!(sent.prompt_text().ends_with("Script:\nZed wakes in a lab."));
    }

    #[tokio::test]
    async fn blank_script_is_refused_without_a_request() {
        let (studio, backend, _) = studio();
        let panel = StoryPanel::new(studio);
        assert!(matches!(
            panel.breakdown("  \n").await,
            Err(PanelError::Precondition(_))
        ));
        assert!(backend.requests().is_empty());
        assert!(panel.state().error().is_some());
    }
}
