//! End-to-end properties of the settings migration chain.

use lingo_core::config::{ConfigStore, StoredConfig};
use lingo_core::migration::MigrationError;
use lingo_infrastructure::migration::{MigrationRunner, build_registry, from_document};
use lingo_infrastructure::{ConfigService, FileConfigStore, InMemoryConfigStore, SchemaValidator};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

fn runner() -> MigrationRunner {
    MigrationRunner::new(Arc::new(build_registry().unwrap()), SchemaValidator::new().unwrap())
}

fn load_fixture(content: &str) -> StoredConfig {
    StoredConfig::from_document(serde_json::from_str(content).unwrap()).unwrap()
}

fn settings_v0() -> StoredConfig {
    load_fixture(include_str!("fixtures/settings_v0.json"))
}

fn settings_v5() -> StoredConfig {
    load_fixture(include_str!("fixtures/settings_v5.json"))
}

/// Returns the v0 fixture migrated one step at a time, indexed by version.
fn stepwise_documents() -> Vec<Value> {
    let registry = build_registry().unwrap();
    let mut documents = vec![settings_v0().document];
    for step in registry.steps() {
        let next = step.apply(documents.last().unwrap()).unwrap();
        documents.push(next);
    }
    documents
}

#[test]
fn test_chain_equivalence_from_every_version() {
    let runner = runner();
    let documents = stepwise_documents();
    let latest = documents.last().unwrap();

    for (version, document) in documents.iter().enumerate() {
        let report = runner.run(document, Some(version as u32)).unwrap();
        assert_eq!(&report.document, latest, "diverged when starting at v{}", version);
        assert_eq!(report.applied.len(), 12 - version);
    }
}

#[test]
fn test_every_intermediate_document_is_valid_at_its_version() {
    let validator = SchemaValidator::new().unwrap();
    for (version, document) in stepwise_documents().iter().enumerate() {
        let result = validator.validate(document, version as u32);
        assert!(result.is_ok(), "v{} invalid: {:?}", version, result.err());
    }
}

#[test]
fn test_idempotence() {
    let runner = runner();
    let once = runner.run(&settings_v0().document, Some(0)).unwrap();
    let twice = runner.run(&once.document, Some(once.version)).unwrap();

    assert!(twice.applied.is_empty());
    assert_eq!(twice.document, once.document);
}

#[test]
fn test_determinism() {
    let stored = settings_v0();
    let first = runner().run(&stored.document, stored.version).unwrap();
    let second = runner().run(&stored.document, stored.version).unwrap();

    assert_eq!(
        serde_json::to_vec(&first.document).unwrap(),
        serde_json::to_vec(&second.document).unwrap()
    );
}

#[test]
fn test_context_menu_steps_compose() {
    let stored = settings_v5();
    let report = runner().run(&stored.document, stored.version).unwrap();

    // Introduced at v6, extended at v7.
    assert_eq!(
        report.document["contextMenu"],
        json!({ "enabled": true, "translateSelection": true })
    );

    let mut v6 = stepwise_documents()[6].clone();
    v6["contextMenu"]["enabled"] = json!(false);
    let report = runner().run(&v6, Some(6)).unwrap();
    assert_eq!(report.document["contextMenu"]["enabled"], json!(false));
    assert_eq!(report.document["contextMenu"]["translateSelection"], json!(true));
}

#[test]
fn test_input_translation_defaults() {
    let stored = settings_v5();
    let report = runner().run(&stored.document, stored.version).unwrap();
    assert_eq!(
        report.document["inputTranslation"],
        json!({
            "enabled": true,
            "direction": "normal",
            "timeThreshold": 300,
            "showToast": true
        })
    );
}

#[test]
fn test_v0_user_data_survives_full_migration() {
    let stored = settings_v0();
    let report = runner().run(&stored.document, stored.version).unwrap();
    let before = &stored.document;
    let after = &report.document;

    // Provider keys, with the single documented rename.
    assert_eq!(after["providersConfig"]["openai"], before["providersConfig"]["openai"]);
    assert_eq!(after["providersConfig"]["deepseek"], before["providersConfig"]["deepseek"]);
    assert_eq!(after["providersConfig"]["siliconFlow"], before["providersConfig"]["siliconflow"]);
    assert!(after["providersConfig"].get("siliconflow").is_none());

    // Model selections.
    assert_eq!(after["read"]["provider"], json!("siliconFlow"));
    assert_eq!(after["read"]["models"]["openai"], before["read"]["models"]["openai"]);
    assert_eq!(after["read"]["models"]["siliconFlow"], before["read"]["models"]["siliconflow"]);
    assert_eq!(after["translate"]["provider"], before["translate"]["provider"]);
    assert_eq!(
        after["translate"]["models"]["siliconFlow"],
        before["translate"]["models"]["siliconflow"]
    );

    // Custom prompts and the selected prompt.
    assert_eq!(
        after["translate"]["promptsConfig"]["patterns"],
        before["translate"]["promptsConfig"]["patterns"]
    );
    assert_eq!(
        after["translate"]["promptsConfig"]["promptId"],
        before["translate"]["promptsConfig"]["prompt"]
    );

    // Untouched sections and unknown data.
    assert_eq!(after["language"], before["language"]);
    assert_eq!(after["floatingButton"], before["floatingButton"]);
    assert_eq!(after["sideContent"], before["sideContent"]);
    assert_eq!(after["onboardingSeen"], json!(true));

    let config = from_document(after).unwrap();
    assert_eq!(
        config.provider("siliconFlow").and_then(|p| p.api_key()),
        before["providersConfig"]["siliconflow"]["apiKey"].as_str()
    );
}

#[test]
fn test_unknown_keys_named_like_later_sections_do_not_break_the_chain() {
    let mut document = settings_v0().document;
    document["inputTranslation"] = json!({ "enabled": false });
    document["contextMenu"] = json!("legacy");
    document["translate"]["batchQueueConfig"] = json!({ "maxItemsPerBatch": 2 });
    assert!(SchemaValidator::new().unwrap().validate(&document, 0).is_ok());

    let report = runner().run(&document, Some(0)).unwrap();
    assert_eq!(report.document["inputTranslation"]["direction"], json!("normal"));
    assert_eq!(report.document["inputTranslation"]["enabled"], json!(true));
    assert_eq!(
        report.document["contextMenu"],
        json!({ "enabled": true, "translateSelection": true })
    );
    assert_eq!(
        report.document["translate"]["batchQueueConfig"]["maxCharactersPerBatch"],
        json!(1000)
    );
}

#[test]
fn test_untouched_numbers_and_nulls_are_preserved() {
    let mut document = settings_v0().document;
    document["floatingButton"]["position"] = json!(1);
    document["providersConfig"]["openai"]["apiKey"] = Value::Null;
    document["providersConfig"]["deepseek"]
        .as_object_mut()
        .unwrap()
        .remove("apiKey");

    let report = runner().run(&document, Some(0)).unwrap();
    assert_eq!(report.document["floatingButton"], document["floatingButton"]);
    assert_eq!(
        serde_json::to_string(&report.document["floatingButton"]["position"]).unwrap(),
        "1"
    );
    assert_eq!(report.document["providersConfig"]["openai"], document["providersConfig"]["openai"]);
    assert_eq!(
        report.document["providersConfig"]["deepseek"],
        document["providersConfig"]["deepseek"]
    );
}

#[test]
fn test_integer_tts_speed_is_kept_until_replaced() {
    let mut document = settings_v5().document;
    document["tts"]["speed"] = json!(2);

    let registry = build_registry().unwrap();
    let v6 = registry.step(5).unwrap().apply(&document).unwrap();
    assert_eq!(serde_json::to_string(&v6["tts"]["speed"]).unwrap(), "2");

    let report = runner().run(&document, Some(5)).unwrap();
    assert_eq!(report.document["tts"]["rate"], json!(100));
}

#[test]
fn test_tts_speed_converted_to_rate() {
    let stored = settings_v5();
    let report = runner().run(&stored.document, stored.version).unwrap();
    assert_eq!(report.document["tts"]["rate"], json!(25));
    assert!(report.document["tts"].get("speed").is_none());
    assert_eq!(report.document["tts"]["voice"], json!("nova"));
}

#[tokio::test]
async fn test_future_version_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    let original = r#"{ "version": 9999, "language": { "sourceCode": "auto" } }"#;
    std::fs::write(&path, original).unwrap();

    let service = ConfigService::new(Arc::new(FileConfigStore::new(path.clone()))).unwrap();
    let err = service.get_migrated_config().await.unwrap_err();

    assert_eq!(
        err.as_migration(),
        Some(&MigrationError::FutureVersionDetected {
            stored_version: 9999,
            latest_version: 12,
        })
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn test_file_store_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    let store = Arc::new(FileConfigStore::new(path.clone()));
    store.set(&settings_v0().document).await.unwrap();

    let service = ConfigService::new(store.clone()).unwrap();
    let config = service.get_migrated_config().await.unwrap();
    assert_eq!(config.translate.prompts_config.prompt_id, "casual");

    let stored = store.get().await.unwrap().unwrap();
    assert_eq!(stored.version, Some(12));
    assert_eq!(from_document(&stored.document).unwrap(), *config);
}

#[tokio::test]
async fn test_step_failure_is_reported_and_nothing_written() {
    let mut document = settings_v0().document;
    document["sideContent"]["width"] = json!("wide");
    let store = Arc::new(InMemoryConfigStore::with_document(document.clone()));

    let service = ConfigService::new(store.clone()).unwrap();
    let err = service.get_migrated_config().await.unwrap_err();

    assert!(matches!(
        err.as_migration(),
        Some(MigrationError::MigrationStepFailed { at_version: 0, .. })
    ));
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.document().await, Some(document));
}
