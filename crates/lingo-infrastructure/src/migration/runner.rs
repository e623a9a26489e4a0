//! Drives a stored settings document through the migration chain.

use lingo_core::migration::{AppliedStep, MigrationError, MigrationReport};
use serde_json::Value;
use std::sync::Arc;

use super::registry::VersionRegistry;
use crate::schema::SchemaValidator;

/// Runs the registered steps in order and validates the result.
///
/// The runner never touches storage: it takes a document and returns either
/// the migrated document or an error, leaving the input untouched.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    registry: Arc<VersionRegistry>,
    validator: SchemaValidator,
}

impl MigrationRunner {
    pub fn new(registry: Arc<VersionRegistry>, validator: SchemaValidator) -> Self {
        Self {
            registry,
            validator,
        }
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn latest_version(&self) -> u32 {
        self.registry.latest_version()
    }

    /// Migrates `document`, stored at `stored_version`, to the latest version.
    ///
    /// A document without a version tag is treated as the oldest version the
    /// chain knows. A document already at the latest version is only
    /// validated.
    ///
    /// # Errors
    ///
    /// - `FutureVersionDetected` if the stored version is newer than the chain.
    /// - `MissingMigrationStep` if the chain has a hole between the stored
    ///   and the latest version. No step runs in that case.
    /// - `MigrationStepFailed` if a step rejects its input.
    /// - `PostMigrationValidationFailed` if the final document does not match
    ///   the latest layout.
    pub fn run(
        &self,
        document: &Value,
        stored_version: Option<u32>,
    ) -> Result<MigrationReport, MigrationError> {
        let latest_version = self.registry.latest_version();
        let from_version = stored_version.unwrap_or_else(|| self.registry.base_version());

        if from_version > latest_version {
            tracing::warn!(
                "Settings were written by a newer version (v{} > v{})",
                from_version,
                latest_version
            );
            return Err(MigrationError::FutureVersionDetected {
                stored_version: from_version,
                latest_version,
            });
        }

        let steps = self.registry.steps_from(from_version).inspect_err(|e| {
            tracing::error!("Cannot plan settings migration from v{}: {}", from_version, e);
        })?;

        if steps.is_empty() {
            tracing::debug!("Settings already at v{}, validating only", latest_version);
        } else {
            tracing::info!(
                "Starting settings migration from v{} to v{} ({} steps)",
                from_version,
                latest_version,
                steps.len()
            );
        }

        let mut current = document.clone();
        let mut applied = Vec::with_capacity(steps.len());
        let total = steps.len();

        for (index, step) in steps.iter().enumerate() {
            tracing::info!(
                "Migration step {}/{}: v{} -> v{} ({})",
                index + 1,
                total,
                step.from_version(),
                step.to_version(),
                step.description()
            );

            current = step.apply(&current).map_err(|e| {
                tracing::error!(
                    "Migration step v{} -> v{} failed: {}",
                    step.from_version(),
                    step.to_version(),
                    e
                );
                MigrationError::MigrationStepFailed {
                    at_version: step.from_version(),
                    cause: e.to_string(),
                }
            })?;

            applied.push(AppliedStep {
                from_version: step.from_version(),
                to_version: step.to_version(),
                description: step.description().to_string(),
            });
        }

        if let Err(violations) = self.validator.validate(&current, latest_version) {
            for violation in &violations {
                tracing::error!("Settings validation failed at {}", violation);
            }
            return Err(MigrationError::PostMigrationValidationFailed { violations });
        }

        if !applied.is_empty() {
            tracing::info!(
                "Settings migration completed: v{} -> v{}",
                from_version,
                latest_version
            );
        }

        Ok(MigrationReport {
            document: current,
            version: latest_version,
            applied,
        })
    }
}
