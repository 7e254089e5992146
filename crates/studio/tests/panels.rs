use generation::{GenerationConfig, GenerationService, ScriptedBackend};
use project::{AssetType, NewProject, ProjectStore, SqliteSlot};
use serde_json::json;
use std::sync::Arc;
use studio::panels::{
    AssetsPanel, AudioPanel, DirectorPanel, SceneEditor, SearchPanel, SequencePanel, Storyboarder,
};
use studio::{PanelError, PanelStatus, Studio};

fn offline_studio(store: Arc<ProjectStore>) -> Studio {
    Studio::new(store, GenerationService::offline(GenerationConfig::default()))
}

#[tokio::test]
async fn offline_sequence_to_storyboard_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("studio.sqlite3");
    let store = Arc::new(ProjectStore::open(SqliteSlot::open_or_create(&db).unwrap()));
    let project = store.create(NewProject::named("Pilot"), None).unwrap();
    let studio = offline_studio(store);

    let sequence = SequencePanel::new(studio.clone());
    let shots = sequence.generate(&project.id, "INT. LAB - NIGHT").await.unwrap();
    assert!(!shots.is_empty());
    let committed = sequence.commit(&project.id, &shots).unwrap();
    assert_eq!(committed.scenes.len(), shots.len());
    assert!(committed.assets.iter().all(|a| a.asset_type == AssetType::Background));

    let scene_id = committed.scenes[0].id.clone();
    let storyboard = Storyboarder::new(studio.clone());
    let project_after = storyboard.generate(&project.id, &scene_id).await.unwrap();
    let panels = &project_after.scenes[0].storyboard_panels;
    assert!(!panels.is_empty());
    assert!(panels.iter().all(|p| p.image_url.starts_with("data:image/")));

    let analysis = DirectorPanel::new(studio).analyze(&project.id, &scene_id).await.unwrap();
    assert_eq!(analysis.overall_assessment.score, 1);

    let reopened = ProjectStore::open(SqliteSlot::open_or_create(&db).unwrap());
    assert_eq!(reopened.get(&project.id).unwrap(), project_after);
}

#[tokio::test]
async fn imported_files_feed_search_and_audio() {
    let dir = tempfile::tempdir().unwrap();
    let boom = dir.path().join("boom.wav");
    std::fs::write(&boom, b"RIFF").unwrap();

    let backend = Arc::new(ScriptedBackend::new());
    let store = Arc::new(ProjectStore::in_memory());
    let project = store.create(NewProject::named("Sfx"), None).unwrap();
    let studio = Studio::new(store, GenerationService::new(backend.clone(), GenerationConfig::default()));

    let assets = AssetsPanel::new(studio.clone());
    let imported = assets.import_path(&project.id, &boom).await.unwrap();
    assert_eq!(imported.name, "boom.wav");
    assert_eq!(imported.asset_type, AssetType::Audio);
    assert!(imported.url.starts_with("data:audio/wav;base64,"));

    backend.push_json(json!({"assetTypes": ["audio"], "descriptors": ["boom"]}));
    let hits = SearchPanel::new(studio.clone()).search(&project.id, "boom sounds").await.unwrap();
    assert_eq!(hits[0].asset.id, imported.id);
    assert_eq!(hits[0].reasons, vec!["Type: audio", "Name match: \"boom\""]);

    let scene = SceneEditor::new(studio.clone()).add_scene(&project.id).unwrap();
    let audio = AudioPanel::new(studio);
    assert!(matches!(
        audio.add_sound_effect(&project.id, &scene.id, None),
        Err(PanelError::Precondition(_))
    ));
}

#[tokio::test]
async fn failed_request_marks_panel_and_leaves_project() {
    let backend = Arc::new(ScriptedBackend::new());
    let store = Arc::new(ProjectStore::in_memory());
    let project = store.create(NewProject::named("Empty"), None).unwrap();
    let studio = Studio::new(store.clone(), GenerationService::new(backend, GenerationConfig::default()));

    let sequence = SequencePanel::new(studio);
    assert!(sequence.generate(&project.id, "A script").await.is_err());
    assert!(matches!(sequence.state().status(), PanelStatus::Failed(_)));
    assert_eq!(store.get(&project.id).unwrap(), project);
}
