pub mod config;
pub mod error;
pub mod migration;

// Re-export common error type
pub use error::LingoError;

pub use config::{Config, ConfigStore, StoredConfig};
pub use migration::{AppliedStep, MigrationError, MigrationReport, Violation};
