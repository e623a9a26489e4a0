//! Persistence seam for the settings document.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{LingoError, Result};

/// Top-level key holding the schema version in the persisted document.
pub const VERSION_KEY: &str = "version";

/// The raw document as read from a backend, before any migration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConfig {
    /// Whatever the backend returned; no shape is assumed.
    pub document: Value,
    /// Version tag read alongside the document. `None` means no version was recorded.
    pub version: Option<u32>,
}

impl StoredConfig {
    /// Wraps a persisted document, reading its version tag from the top-level
    /// `version` field.
    ///
    /// A missing tag yields `None`. A tag that is present but not a
    /// non-negative 32-bit integer is rejected rather than guessed at.
    pub fn from_document(document: Value) -> Result<Self> {
        let version = match document.get(VERSION_KEY) {
            None | Some(Value::Null) => None,
            Some(tag) => Some(
                tag.as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| {
                        LingoError::config(format!("invalid settings version tag: {}", tag))
                    })?,
            ),
        };
        Ok(Self { document, version })
    }
}

/// Key/value backend holding the single settings document.
///
/// Implementations must make `set` a single atomic write: readers observe
/// either the previous document or the new one, never a mix.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads the persisted document, or `None` on first install.
    async fn get(&self) -> Result<Option<StoredConfig>>;

    /// Replaces the persisted document.
    async fn set(&self, document: &Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_document_reads_version() {
        let stored = StoredConfig::from_document(json!({ "version": 7, "a": 1 })).unwrap();
        assert_eq!(stored.version, Some(7));
    }

    #[test]
    fn test_from_document_without_version() {
        let stored = StoredConfig::from_document(json!({ "a": 1 })).unwrap();
        assert_eq!(stored.version, None);
    }

    #[test]
    fn test_from_document_rejects_garbage_version() {
        assert!(StoredConfig::from_document(json!({ "version": "seven" })).is_err());
        assert!(StoredConfig::from_document(json!({ "version": -1 })).is_err());
        assert!(StoredConfig::from_document(json!({ "version": 1.5 })).is_err());
    }
}
