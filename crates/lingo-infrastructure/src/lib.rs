pub mod config_service;
pub mod dto;
pub mod migration;
pub mod paths;
pub mod schema;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::migration::{MigrationRunner, VersionRegistry, build_registry};
pub use crate::paths::LingoPaths;
pub use crate::schema::{SchemaError, SchemaValidator};
pub use crate::storage::{FileConfigStore, InMemoryConfigStore, StorageFormat};
