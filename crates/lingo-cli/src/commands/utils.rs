use anyhow::{Context, Result, anyhow};
use lingo_core::config::{ConfigStore, StoredConfig};
use lingo_infrastructure::migration::{MigrationRunner, build_registry};
use lingo_infrastructure::{FileConfigStore, LingoPaths, SchemaValidator};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::OutputFormat;

/// Builds the runner with the built-in migration chain.
pub fn runner() -> Result<MigrationRunner> {
    let registry = build_registry().context("Migration chain is invalid")?;
    Ok(MigrationRunner::new(Arc::new(registry), SchemaValidator::new()?))
}

/// Returns `file`, or the user settings file when none is given.
pub fn resolve_path(file: Option<PathBuf>) -> Result<PathBuf> {
    match file {
        Some(path) => Ok(path),
        None => LingoPaths::settings_file().context("Failed to resolve the settings file"),
    }
}

/// Reads the settings document at `path`.
pub async fn load(path: &Path) -> Result<(FileConfigStore, StoredConfig)> {
    let store = FileConfigStore::new(path.to_path_buf());
    let stored = store
        .get()
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?
        .ok_or_else(|| anyhow!("No settings found at {}", path.display()))?;
    Ok((store, stored))
}

/// Renders a document for the terminal.
pub fn render(document: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Toml => {
            let value: toml::Value = serde_json::from_value(document.clone())
                .context("Document cannot be represented as TOML")?;
            Ok(toml::to_string_pretty(&value)?)
        }
    }
}
