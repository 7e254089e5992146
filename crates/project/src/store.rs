use crate::integrity::{AssetUsage, IntegrityIssue};
use crate::model::{new_id, Asset, Project, Scene, StyleProfile, TimelineData};
use crate::scenes;
use crate::slot::{MemorySlot, ProjectSlot};
use crate::templates::TemplateData;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project `{0}` not found")]
    NotFound(String),
    #[error("scene `{0}` not found")]
    SceneNotFound(String),
    #[error("asset `{0}` not found")]
    AssetNotFound(String),
    #[error("style profile `{0}` not found")]
    StyleProfileNotFound(String),
    #[error("project name must not be empty")]
    EmptyName,
    #[error("asset `{asset_id}` is still used by {} reference(s)", .usages.len())]
    AssetInUse {
        asset_id: String,
        usages: Vec<AssetUsage>,
    },
    #[error("project `{id}` was modified at {actual}, expected {expected}")]
    Conflict {
        id: String,
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },
    #[error("project would become inconsistent: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Integrity(Vec<IntegrityIssue>),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

impl NewProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial project update. `Some` fields replace the stored value wholesale;
/// `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub data: Option<TimelineData>,
    pub script: Option<String>,
    pub assets: Option<Vec<Asset>>,
    pub style_profiles: Option<Vec<StyleProfile>>,
    pub current_style_reference: Option<Option<StyleProfile>>,
    pub scenes: Option<Vec<Scene>>,
    pub project_wide_music_asset_id: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, project: &mut Project) {
        if let Some(v) = self.name {
            project.name = v;
        }
        if let Some(v) = self.description {
            project.description = v;
        }
        if let Some(v) = self.thumbnail_url {
            project.thumbnail_url = v;
        }
        if let Some(v) = self.data {
            project.data = v;
        }
        if let Some(v) = self.script {
            project.script = v;
        }
        if let Some(v) = self.assets {
            project.assets = v;
        }
        if let Some(v) = self.style_profiles {
            project.style_profiles = v;
        }
        if let Some(v) = self.current_style_reference {
            project.current_style_reference = v;
        }
        if let Some(v) = self.scenes {
            project.scenes = v;
        }
        if let Some(v) = self.project_wide_music_asset_id {
            project.project_wide_music_asset_id = v;
        }
    }
}

/// Repository over the persisted project list.
///
/// Readers get an immutable `Arc` snapshot; every mutation builds a new list,
/// validates it, swaps it in and writes the whole list to the slot. Writes
/// are serialized by the lock, so two racing updates resolve last-write-wins
/// unless the caller goes through [`ProjectStore::update_if_unmodified`].
pub struct ProjectStore {
    slot: Box<dyn ProjectSlot>,
    projects: RwLock<Arc<Vec<Project>>>,
}

impl ProjectStore {
    pub fn open(slot: impl ProjectSlot + 'static) -> Self {
        let projects = load(&slot);
        info!(count = projects.len(), "project store opened");
        Self {
            slot: Box::new(slot),
            projects: RwLock::new(Arc::new(projects)),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(MemorySlot::new())
    }

    pub fn list(&self) -> Arc<Vec<Project>> {
        self.projects.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.projects.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn create(&self, details: NewProject, template: Option<TemplateData>) -> Result<Project, StoreError> {
        let name = details.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let template = template.unwrap_or_default();
        let project = Project {
            id: new_id("proj"),
            name,
            description: details
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            thumbnail_url: format!(
                "https://picsum.photos/seed/{}/400/300",
                Uuid::new_v4().simple()
            ),
            last_modified: Utc::now(),
            data: template.data.unwrap_or_default(),
            script: template.script.unwrap_or_default(),
            assets: template.assets.unwrap_or_default(),
            style_profiles: template.style_profiles.unwrap_or_default(),
            current_style_reference: template.current_style_reference,
            scenes: template.scenes.unwrap_or_default(),
            project_wide_music_asset_id: template.project_wide_music_asset_id,
        };
        check(&project)?;

        let mut guard = self.projects.write();
        let mut next = guard.to_vec();
        next.push(project.clone());
        self.commit(&mut guard, next);
        info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub fn update(&self, id: &str, patch: ProjectPatch) -> Result<Project, StoreError> {
        self.modify(id, |project| {
            patch.apply(project);
            Ok(())
        })
    }

    /// Optimistic variant of [`update`](Self::update): fails with
    /// [`StoreError::Conflict`] when the project changed since `expected` was read.
    pub fn update_if_unmodified(
        &self,
        id: &str,
        expected: DateTime<Utc>,
        patch: ProjectPatch,
    ) -> Result<Project, StoreError> {
        self.modify(id, |project| {
            if project.last_modified != expected {
                return Err(StoreError::Conflict {
                    id: project.id.clone(),
                    expected,
                    actual: project.last_modified,
                });
            }
            patch.apply(project);
            Ok(())
        })
    }

    pub fn update_scene(&self, project_id: &str, scene: Scene) -> Result<Project, StoreError> {
        self.modify(project_id, |project| {
            let scene_id = scene.id.clone();
            if scenes::replace_scene(&mut project.scenes, scene) {
                Ok(())
            } else {
                Err(StoreError::SceneNotFound(scene_id))
            }
        })
    }

    /// Read-modify-write under the store lock. The closure edits a copy; the
    /// copy is committed only if the closure succeeds and introduces no new
    /// integrity issue. Issues already present in the stored project are
    /// tolerated so loaded data with stale references stays editable.
    pub fn modify<F>(&self, id: &str, edit: F) -> Result<Project, StoreError>
    where
        F: FnOnce(&mut Project) -> Result<(), StoreError>,
    {
        let mut guard = self.projects.write();
        let index = guard
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let existing = guard[index].validate();
        let mut project = guard[index].clone();
        edit(&mut project)?;
        project.id = id.to_string();
        project.last_modified = Utc::now();
        check_against(&project, &existing)?;

        let mut next = guard.to_vec();
        next[index] = project.clone();
        self.commit(&mut guard, next);
        debug!(id, "project updated");
        Ok(project)
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut guard = self.projects.write();
        let mut next = guard.to_vec();
        let before = next.len();
        next.retain(|p| p.id != id);
        if next.len() == before {
            return false;
        }
        self.commit(&mut guard, next);
        info!(id, "project deleted");
        true
    }

    /// Replaces the in-memory list with whatever the slot currently holds.
    pub fn reload(&self) -> Arc<Vec<Project>> {
        let projects = Arc::new(load(self.slot.as_ref()));
        *self.projects.write() = projects.clone();
        projects
    }

    fn commit(&self, guard: &mut Arc<Vec<Project>>, next: Vec<Project>) {
        match serde_json::to_string(&next) {
            Ok(payload) => {
                if let Err(err) = self.slot.write(&payload) {
                    warn!(error = %err, "failed to persist projects; keeping in-memory state");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize projects"),
        }
        *guard = Arc::new(next);
    }
}

fn check(project: &Project) -> Result<(), StoreError> {
    check_against(project, &[])
}

fn check_against(project: &Project, tolerated: &[IntegrityIssue]) -> Result<(), StoreError> {
    let issues: Vec<_> = project
        .validate()
        .into_iter()
        .filter(|issue| !tolerated.contains(issue))
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Integrity(issues))
    }
}

fn load(slot: &dyn ProjectSlot) -> Vec<Project> {
    let raw = match slot.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "failed to read stored projects");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Project>>(&raw) {
        Ok(projects) => {
            for project in &projects {
                let issues = project.validate();
                if !issues.is_empty() {
                    warn!(id = %project.id, issues = issues.len(), "stored project is inconsistent");
                }
            }
            projects
        }
        Err(err) => {
            warn!(error = %err, "stored projects are malformed; starting empty");
            Vec::new()
        }
    }
}
