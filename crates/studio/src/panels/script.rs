//! Script editor buffer with debounced saves.

use crate::{PanelError, Studio};
use project::ProjectPatch;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStatus {
    Saved,
    Unsaved,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStats {
    pub words: usize,
    pub lines: usize,
}

pub fn script_stats(text: &str) -> ScriptStats {
    if text.is_empty() {
        return ScriptStats { words: 0, lines: 1 };
    }
    ScriptStats {
        words: text.split_whitespace().count(),
        lines: text.split('\n').count(),
    }
}

/// Local copy of a project's script. Edits only mark the buffer dirty;
/// a write happens once the buffer has been quiet for the debounce window,
/// so a burst of keystrokes costs one save.
pub struct ScriptDraft {
    studio: Studio,
    project_id: String,
    text: String,
    status: DraftStatus,
    last_edit: Option<Instant>,
    debounce: Duration,
}

impl ScriptDraft {
    pub fn open(studio: Studio, project_id: &str) -> Result<Self, PanelError> {
        let text = studio.project(project_id)?.script;
        Ok(Self {
            studio,
            project_id: project_id.to_string(),
            text,
            status: DraftStatus::Saved,
            last_edit: None,
            debounce: SAVE_DEBOUNCE,
        })
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn stats(&self) -> ScriptStats {
        script_stats(&self.text)
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text && self.status == DraftStatus::Saved {
            return;
        }
        self.text = text;
        self.status = DraftStatus::Unsaved;
        self.last_edit = Some(Instant::now());
    }

    /// When the pending edit becomes due, if any.
    pub fn due_at(&self) -> Option<Instant> {
        match self.status {
            DraftStatus::Unsaved => self.last_edit.map(|t| t + self.debounce),
            _ => None,
        }
    }

    /// Writes the buffer now if it is dirty. Returns whether a write happened.
    pub fn flush(&mut self) -> Result<bool, PanelError> {
        if self.status != DraftStatus::Unsaved {
            return Ok(false);
        }
        self.status = DraftStatus::Saving;
        let patch = ProjectPatch {
            script: Some(self.text.clone()),
            ..ProjectPatch::default()
        };
        match self.studio.store().update(&self.project_id, patch) {
            Ok(_) => {
                self.status = DraftStatus::Saved;
                self.last_edit = None;
                debug!(project = %self.project_id, bytes = self.text.len(), "script saved");
                Ok(true)
            }
            Err(err) => {
                self.status = DraftStatus::Unsaved;
                Err(err.into())
            }
        }
    }

    /// Saves if the debounce window has passed.
    pub fn flush_if_due(&mut self, now: Instant) -> Result<bool, PanelError> {
        match self.due_at() {
            Some(due) if now >= due => self.flush(),
            _ => Ok(false),
        }
    }

    /// Sleeps out the debounce window, then saves.
    pub async fn settle(&mut self) -> Result<bool, PanelError> {
        if let Some(due) = self.due_at() {
            tokio::time::sleep_until(due).await;
        }
        self.flush()
    }
}
