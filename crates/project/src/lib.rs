//! Project data model and the repository that persists it.

pub mod integrity;
mod library;
pub mod model;
pub mod scenes;
pub mod slot;
mod store;
pub mod templates;

pub use integrity::{AssetRemoval, AssetUsage, IntegrityIssue};
pub use model::*;
pub use slot::{app_data_dir, default_db_path, MemorySlot, ProjectSlot, SqliteSlot, STORAGE_KEY};
pub use store::{NewProject, ProjectPatch, ProjectStore, StoreError};
pub use templates::{builtin_templates, find_template, ProjectTemplate, TemplateData};
