//! Settings migration framework.
//!
//! This module provides a small, version-indexed migration system for the
//! persisted settings document.
//!
//! # Architecture
//!
//! - [`MigrationStep`]: a pure upgrade from version `n` to `n + 1`
//! - [`TypedStep`]: adapts a typed `MigratesTo` impl between two settings
//!   records into a step over the raw document
//! - [`VersionRegistry`]: the checked, gap-free chain of steps
//! - [`MigrationRunner`]: applies the chain and validates the result
//!
//! # Adding a version
//!
//! 1. Add `ConfigV{n+1}` in `dto/config.rs` and implement
//!    `MigratesTo<ConfigV{n+1}> for ConfigV{n}`
//! 2. Extend `schema_for` with the same delta
//! 3. Register the step in [`build_registry`]

mod registry;
mod runner;
mod traits;

pub use registry::{RegistryError, VersionRegistry, VersionRegistryBuilder};
pub use runner::MigrationRunner;
pub use traits::{MigrationStep, StepError, TypedStep};

use lingo_core::config::{Config, VERSION_KEY};
use lingo_core::error::{LingoError, Result};
use serde_json::Value;
use std::sync::Arc;
use version_migrate::{FromDomain, IntoDomain};

use crate::dto::{
    ConfigV0, ConfigV1, ConfigV2, ConfigV3, ConfigV4, ConfigV5, ConfigV6, ConfigV7, ConfigV8,
    ConfigV9, ConfigV10, ConfigV11, ConfigV12, LatestConfig, SchemaVersion,
};

/// Builds the registry with every settings migration step.
pub fn build_registry() -> std::result::Result<VersionRegistry, RegistryError> {
    let mut builder = VersionRegistry::builder();
    builder
        .span(ConfigV0::SCHEMA_VERSION, LatestConfig::SCHEMA_VERSION)
        .register_all(migration_steps())?;
    builder.build()
}

/// Every settings migration step, in chain order.
pub(crate) fn migration_steps() -> [Arc<dyn MigrationStep>; 12] {
    [
        Arc::new(TypedStep::<ConfigV0, ConfigV1>::new(
            "add translate.requestQueueConfig",
        )),
        Arc::new(TypedStep::<ConfigV1, ConfigV2>::new("add selectionToolbar")),
        Arc::new(TypedStep::<ConfigV2, ConfigV3>::new(
            "add translate.page auto-translate rules",
        )),
        Arc::new(TypedStep::<ConfigV3, ConfigV4>::new(
            "rename provider siliconflow to siliconFlow",
        )),
        Arc::new(TypedStep::<ConfigV4, ConfigV5>::new("add tts")),
        Arc::new(TypedStep::<ConfigV5, ConfigV6>::new("add contextMenu")),
        Arc::new(TypedStep::<ConfigV6, ConfigV7>::new(
            "add contextMenu.translateSelection",
        )),
        Arc::new(TypedStep::<ConfigV7, ConfigV8>::new("add inputTranslation")),
        Arc::new(TypedStep::<ConfigV8, ConfigV9>::new(
            "add translate.batchQueueConfig",
        )),
        Arc::new(TypedStep::<ConfigV9, ConfigV10>::new(
            "add translate.translationNodeStyle",
        )),
        Arc::new(TypedStep::<ConfigV10, ConfigV11>::new(
            "replace tts.speed with tts.rate",
        )),
        Arc::new(TypedStep::<ConfigV11, ConfigV12>::new(
            "rename translate.promptsConfig.prompt to promptId",
        )),
    ]
}

/// Serializes a domain config as a latest-version document, version tag
/// included.
pub fn to_document(config: &Config) -> Result<Value> {
    let mut document = serde_json::to_value(ConfigV12::from_domain(config.clone()))?;
    match document.as_object_mut() {
        Some(fields) => {
            fields.insert(
                VERSION_KEY.to_string(),
                Value::from(LatestConfig::SCHEMA_VERSION),
            );
            Ok(document)
        }
        None => Err(LingoError::internal("settings did not serialize to an object")),
    }
}

/// Decodes a latest-version document into the domain config.
pub fn from_document(document: &Value) -> Result<Config> {
    let mut document = document.clone();
    if let Some(fields) = document.as_object_mut() {
        fields.remove(VERSION_KEY);
    }
    let latest: LatestConfig = serde_json::from_value(document)?;
    Ok(latest.into_domain())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LATEST_SCHEMA_VERSION, SchemaValidator};
    use lingo_core::migration::MigrationError;
    use serde_json::json;

    /// The v0 fixture migrated one step at a time, indexed by version.
    fn stepwise_documents() -> Vec<Value> {
        let mut documents = vec![
            serde_json::from_str(include_str!("../../tests/fixtures/settings_v0.json")).unwrap(),
        ];
        for step in migration_steps() {
            let next = step.apply(documents.last().unwrap()).unwrap();
            documents.push(next);
        }
        documents
    }

    #[test]
    fn test_removing_any_step_breaks_the_chain_at_that_version() {
        let documents = stepwise_documents();

        for missing in 0..LatestConfig::SCHEMA_VERSION {
            let steps: Vec<_> = migration_steps()
                .into_iter()
                .filter(|step| step.from_version() != missing)
                .collect();

            let mut builder = VersionRegistry::builder();
            builder
                .span(0, LatestConfig::SCHEMA_VERSION)
                .register_all(steps.clone())
                .unwrap();
            assert_eq!(
                builder.build().unwrap_err(),
                RegistryError::Gap { at_version: missing },
                "chain without step {} was accepted",
                missing
            );

            let mut builder = VersionRegistry::builder();
            builder
                .span(0, LatestConfig::SCHEMA_VERSION)
                .register_all(steps)
                .unwrap();
            let registry = Arc::new(builder.build_unchecked());
            let runner = MigrationRunner::new(registry, SchemaValidator::new().unwrap());

            for version in 0..=missing {
                assert_eq!(
                    runner
                        .run(&documents[version as usize], Some(version))
                        .unwrap_err(),
                    MigrationError::MissingMigrationStep { at_version: missing },
                    "v{} document without step {}",
                    version,
                    missing
                );
            }
            let after = missing + 1;
            assert!(runner.run(&documents[after as usize], Some(after)).is_ok());
        }
    }

    #[test]
    fn test_build_registry() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.base_version(), 0);
        assert_eq!(registry.latest_version(), LatestConfig::SCHEMA_VERSION);
        assert_eq!(registry.latest_version(), LATEST_SCHEMA_VERSION);
        assert_eq!(registry.path_from(9), vec![9, 10, 11, 12]);
    }

    #[test]
    fn test_document_round_trip() {
        let mut config = Config::default();
        config.side_content.width = 640;
        config.extra.insert("onboardingSeen".to_string(), json!(true));

        let document = to_document(&config).unwrap();
        assert_eq!(document["version"], json!(12));
        assert_eq!(document["onboardingSeen"], json!(true));
        assert_eq!(from_document(&document).unwrap(), config);
    }

    #[test]
    fn test_from_document_rejects_old_layout() {
        let document: Value =
            serde_json::from_str(include_str!("../../tests/fixtures/settings_v0.json")).unwrap();
        assert!(from_document(&document).is_err());
    }
}
