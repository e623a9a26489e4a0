//! File-backed settings store.
//!
//! The whole document lives in one file. Writes go through a temporary file
//! and an atomic rename under an exclusive lock, so a reader sees either the
//! previous document or the new one. A failed write removes its temporary
//! file.

use async_trait::async_trait;
use lingo_core::config::{ConfigStore, StoredConfig};
use lingo_core::error::{LingoError, Result};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// On-disk encoding of the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageFormat {
    #[default]
    Json,
    Toml,
}

impl StorageFormat {
    /// Picks the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => StorageFormat::Toml,
            _ => StorageFormat::Json,
        }
    }

    fn decode(self, content: &str) -> Result<Value> {
        match self {
            StorageFormat::Json => Ok(serde_json::from_str(content)?),
            StorageFormat::Toml => {
                let toml_value: toml::Value = toml::from_str(content)?;
                Ok(serde_json::to_value(toml_value)?)
            }
        }
    }

    fn encode(self, document: &Value) -> Result<String> {
        match self {
            StorageFormat::Json => Ok(serde_json::to_string_pretty(document)?),
            StorageFormat::Toml => {
                // TOML has no null; a null entry is written as an absent key.
                let toml_value: toml::Value = serde_json::from_value(without_nulls(document))?;
                Ok(toml::to_string_pretty(&toml_value)?)
            }
        }
    }
}

fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_nulls).collect()),
        other => other.clone(),
    }
}

/// Synchronous access to the settings file.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    format: StorageFormat,
}

impl SettingsFile {
    pub fn new(path: PathBuf, format: StorageFormat) -> Self {
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StorageFormat {
        self.format
    }

    /// Reads the document. A missing or blank file yields `None`.
    pub fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        self.format.decode(&content).map(Some)
    }

    /// Replaces the document atomically.
    pub fn save(&self, document: &Value) -> Result<()> {
        let content = self.format.encode(document)?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| LingoError::storage(format!("not a file path: {}", self.path.display())))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let _lock = FileLock::acquire(&self.path)?;

        // Provider API keys live in this file. The temporary file is created
        // with mode 0600 on unix and deleted on drop unless persisted.
        let prefix = format!(".{}.", file_name.to_string_lossy());
        let mut tmp_file = TempFileBuilder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.as_file().sync_all()?;

        tmp_file.persist(&self.path).map_err(|e| {
            LingoError::storage(format!("failed to replace {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}

/// Exclusive lock held for the duration of a write.
///
/// The lock file itself is left in place; removing it would let a waiting
/// writer lock an unlinked inode.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| LingoError::storage(format!("failed to lock {}: {}", lock_path.display(), e)))?;

        Ok(FileLock { _file: file })
    }
}

/// [`ConfigStore`] over a single settings file.
///
/// Blocking file I/O runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    file: SettingsFile,
}

impl FileConfigStore {
    /// Creates a store, choosing the format from the file extension.
    pub fn new(path: PathBuf) -> Self {
        let format = StorageFormat::from_path(&path);
        Self::with_format(path, format)
    }

    pub fn with_format(path: PathBuf, format: StorageFormat) -> Self {
        Self {
            file: SettingsFile::new(path, format),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self) -> Result<Option<StoredConfig>> {
        let file = self.file.clone();
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| LingoError::internal(format!("settings read task failed: {}", e)))??;

        tracing::debug!("Loaded settings from {}", self.file.path().display());
        document.map(StoredConfig::from_document).transpose()
    }

    async fn set(&self, document: &Value) -> Result<()> {
        let file = self.file.clone();
        let document = document.clone();
        tokio::task::spawn_blocking(move || file.save(&document))
            .await
            .map_err(|e| LingoError::internal(format!("settings write task failed: {}", e)))??;

        tracing::debug!("Saved settings to {}", self.file.path().display());
        Ok(())
    }
}
