//! Outcome types of the startup settings migration.
//!
//! The migration engine itself lives in `lingo-infrastructure`; these types are
//! the vocabulary it shares with the rest of the application (failure handlers,
//! diagnostics, the CLI).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single structural mismatch between a document and a schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path to the offending field (`$` for the document root).
    pub path: String,
    /// What the schema requires at this path.
    pub expected: String,
    /// What the document actually holds.
    pub actual: String,
}

impl Violation {
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Why the one-shot migration run aborted.
///
/// Every variant is fatal for the run and leaves the stored document untouched.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationError {
    /// The registry has no step leaving `at_version`.
    #[error("no migration step registered from version {at_version}")]
    MissingMigrationStep { at_version: u32 },

    /// The stored document was written by a newer build.
    #[error(
        "stored settings version {stored_version} is newer than the latest supported version {latest_version}"
    )]
    FutureVersionDetected {
        stored_version: u32,
        latest_version: u32,
    },

    /// A step could not transform the document.
    #[error("migration step v{at_version} -> v{} failed: {cause}", .at_version + 1)]
    MigrationStepFailed { at_version: u32, cause: String },

    /// The fully migrated document does not satisfy the latest schema.
    #[error("migrated settings failed validation with {} violation(s)", .violations.len())]
    PostMigrationValidationFailed { violations: Vec<Violation> },
}

/// One applied migration step, recorded for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedStep {
    pub from_version: u32,
    pub to_version: u32,
    pub description: String,
}

/// Successful outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// The validated document at `version`.
    pub document: Value,
    /// The version the document now satisfies (always the registry's latest).
    pub version: u32,
    /// Steps applied, in order. Empty when the input was already current.
    pub applied: Vec<AppliedStep>,
}

impl MigrationReport {
    /// Returns true if at least one step was applied.
    pub fn migrated(&self) -> bool {
        !self.applied.is_empty()
    }
}
