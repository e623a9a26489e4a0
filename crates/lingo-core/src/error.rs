//! Error types for the Lingo settings engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::migration::MigrationError;

/// A shared error type for the entire Lingo settings engine.
///
/// Cloneable so that a single failed startup migration can be handed to every
/// caller awaiting the memoized outcome.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LingoError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Persistence backend error (read/write/lock failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error (malformed version tag, invalid edits, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The one-shot settings migration aborted
    #[error("Settings migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LingoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a migration failure
    pub fn is_migration(&self) -> bool {
        matches!(self, Self::Migration(_))
    }

    /// Returns the migration failure, if this error is one.
    pub fn as_migration(&self) -> Option<&MigrationError> {
        match self {
            Self::Migration(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LingoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LingoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LingoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LingoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LingoError>`.
pub type Result<T> = std::result::Result<T, LingoError>;
