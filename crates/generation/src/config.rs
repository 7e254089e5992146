use crate::GenerationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    /// Fast structured-output model.
    pub text_model: String,
    /// Slower model for long breakdowns (sequences, storyboards).
    pub pro_model: String,
    pub image_model: String,
    pub video_model: String,
    pub request_timeout_secs: u64,
    pub video_poll_interval_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: GEMINI_API_BASE.to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            pro_model: "gemini-2.5-pro".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            request_timeout_secs: 120,
            video_poll_interval_ms: 10_000,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GenerationConfig {
    /// Defaults overlaid with `GEMINI_API_KEY` (or `API_KEY`) and the
    /// `STUDIO_*` overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Some(key) = env_nonempty("GEMINI_API_KEY").or_else(|| env_nonempty("API_KEY")) {
            self.api_key = key;
        }
        let overrides = [
            ("STUDIO_API_BASE", &mut self.base_url),
            ("STUDIO_TEXT_MODEL", &mut self.text_model),
            ("STUDIO_PRO_MODEL", &mut self.pro_model),
            ("STUDIO_IMAGE_MODEL", &mut self.image_model),
            ("STUDIO_VIDEO_MODEL", &mut self.video_model),
        ];
        for (key, slot) in overrides {
            if let Some(value) = env_nonempty(key) {
                *slot = value;
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            GenerationError::configuration(format!("read {}: {err}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            GenerationError::configuration(format!("parse {}: {err}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), GenerationError> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|err| GenerationError::configuration(err.to_string()))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|err| GenerationError::configuration(err.to_string()))?;
        }
        fs::write(path, raw).map_err(|err| {
            GenerationError::configuration(format!("write {}: {err}", path.display()))
        })
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::configuration(
                "Gemini API key is required (set GEMINI_API_KEY).",
            ));
        }
        for (label, model) in [
            ("text", &self.text_model),
            ("pro", &self.pro_model),
            ("image", &self.image_model),
            ("video", &self.video_model),
        ] {
            if model.trim().is_empty() {
                return Err(GenerationError::configuration(format!(
                    "{label} model name is required."
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn video_poll_interval(&self) -> Duration {
        Duration::from_millis(self.video_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gemini() {
        let config = GenerationConfig::default();
        assert_eq!(config.base_url, GEMINI_API_BASE);
        assert_eq!(config.video_poll_interval(), Duration::from_secs(10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generation.json");
        let config = GenerationConfig {
            api_key: "k".into(),
            text_model: "gemini-test".into(),
            ..GenerationConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(GenerationConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generation.json");
        std::fs::write(&path, r#"{"apiKey_typo": 1, "api_key": "abc"}"#).unwrap();
        let config = GenerationConfig::load(&path).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.pro_model, "gemini-2.5-pro");
        assert!(config.validate().is_ok());
    }
}
