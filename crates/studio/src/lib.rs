//! Studio tool panels: each operation builds a prompt, calls the generative
//! service and applies the typed result through the project store.

mod error;
pub mod media;
pub mod panels;
pub mod preview;
mod state;

pub use error::PanelError;
pub use media::MediaFile;
pub use preview::PreviewHandle;
pub use state::{PanelGuard, PanelState, PanelStatus};

use generation::GenerationService;
use project::{Project, ProjectStore, Scene, StoreError};
use std::sync::Arc;

/// Shared handles every panel works against.
#[derive(Clone)]
pub struct Studio {
    store: Arc<ProjectStore>,
    generation: GenerationService,
}

impl Studio {
    pub fn new(store: Arc<ProjectStore>, generation: GenerationService) -> Self {
        Self { store, generation }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    pub fn project(&self, project_id: &str) -> Result<Project, PanelError> {
        self.store
            .get(project_id)
            .ok_or_else(|| PanelError::not_found(format!("project {project_id}")))
    }

    pub fn scene(&self, project_id: &str, scene_id: &str) -> Result<(Project, Scene), PanelError> {
        let project = self.project(project_id)?;
        let scene = project
            .scene(scene_id)
            .cloned()
            .ok_or_else(|| PanelError::not_found(format!("scene {scene_id}")))?;
        Ok((project, scene))
    }

    /// Edits one scene in place through [`ProjectStore::modify`].
    pub fn modify_scene<F>(&self, project_id: &str, scene_id: &str, edit: F) -> Result<Project, PanelError>
    where
        F: FnOnce(&mut Scene) -> Result<(), StoreError>,
    {
        let project = self.store.modify(project_id, |project| {
            let scene = project
                .scene_mut(scene_id)
                .ok_or_else(|| StoreError::SceneNotFound(scene_id.to_string()))?;
            edit(scene)
        })?;
        Ok(project)
    }

    pub(crate) fn text_model(&self) -> String {
        self.generation.config().text_model.clone()
    }

    pub(crate) fn pro_model(&self) -> String {
        self.generation.config().pro_model.clone()
    }
}

/// Name of the project's active style, or `fallback`.
pub(crate) fn style_name_or(project: &Project, fallback: &str) -> String {
    project
        .current_style_reference
        .as_ref()
        .map(|s| s.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use generation::{GenerationConfig, ScriptedBackend};
    use project::NewProject;

    pub fn studio() -> (Studio, Arc<ScriptedBackend>, String) {
        studio_with(GenerationConfig::default())
    }

    pub fn studio_with(config: GenerationConfig) -> (Studio, Arc<ScriptedBackend>, String) {
        let backend = Arc::new(ScriptedBackend::new());
        let store = Arc::new(ProjectStore::in_memory());
        let project = store.create(NewProject::named("Test"), None).unwrap();
        let service = GenerationService::new(backend.clone(), config);
        (Studio::new(store, service), backend, project.id)
    }
}
