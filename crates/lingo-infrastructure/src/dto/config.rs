//! Settings records V0..V12 and the migrations between them.

use lingo_core::config::{
    BatchQueueConfig, Config, ContextMenuConfig, FloatingButtonConfig, InputTranslationConfig,
    LanguageConfig, PageConfig, PromptsConfig, ProvidersConfig, ReadConfig, RequestQueueConfig,
    SelectionToolbarConfig, SideContentConfig, TranslateConfig, TranslationNodeStyle, TtsConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use super::SchemaVersion;
use super::sections::{
    ContextMenuV6, PromptsConfigV0, TranslateV0, TranslateV1, TranslateV3, TranslateV9,
    TranslateV10, TtsV5,
};

macro_rules! schema_version {
    ($($record:ty => $version:expr),+ $(,)?) => {
        $(
            impl SchemaVersion for $record {
                const SCHEMA_VERSION: u32 = $version;
            }
        )+
    };
}

// ============================================================================
// Settings records
// ============================================================================

/// Settings V0: the first shipped layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "0.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV0 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV0,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V1: request throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV1 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV1,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V2: selection toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV2 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV1,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V3: auto-translate rules on the page section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "3.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV3 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V4: same layout as V3 with the SiliconFlow provider id normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "4.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV4 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V5: text-to-speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "5.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV5 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V6: context menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "6.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV6 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    pub context_menu: ContextMenuV6,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V7: "translate selection" context-menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "7.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV7 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    pub context_menu: ContextMenuConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V8: input field translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "8.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV8 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV3,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    pub context_menu: ContextMenuConfig,
    pub input_translation: InputTranslationConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V9: request batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "9.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV9 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV9,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    pub context_menu: ContextMenuConfig,
    pub input_translation: InputTranslationConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V10: translation node styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "10.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV10 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV10,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsV5,
    pub context_menu: ContextMenuConfig,
    pub input_translation: InputTranslationConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V11: TTS speaking rate in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "11.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV11 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateV10,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsConfig,
    pub context_menu: ContextMenuConfig,
    pub input_translation: InputTranslationConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings V12 (current): selected prompt stored as `promptId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "12.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConfigV12 {
    pub language: LanguageConfig,
    pub providers_config: ProvidersConfig,
    pub read: ReadConfig,
    pub translate: TranslateConfig,
    pub floating_button: FloatingButtonConfig,
    pub side_content: SideContentConfig,
    pub selection_toolbar: SelectionToolbarConfig,
    pub tts: TtsConfig,
    pub context_menu: ContextMenuConfig,
    pub input_translation: InputTranslationConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Type alias for the latest settings version.
pub type LatestConfig = ConfigV12;

schema_version! {
    ConfigV0 => 0,
    ConfigV1 => 1,
    ConfigV2 => 2,
    ConfigV3 => 3,
    ConfigV4 => 4,
    ConfigV5 => 5,
    ConfigV6 => 6,
    ConfigV7 => 7,
    ConfigV8 => 8,
    ConfigV9 => 9,
    ConfigV10 => 10,
    ConfigV11 => 11,
    ConfigV12 => 12,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Removes unknown keys that a step now models itself. The stale copy is
/// dropped and the step's default takes its place.
fn drop_shadowed(extra: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if extra.remove(*key).is_some() {
            tracing::warn!("Dropping unknown key '{}' replaced by a new section", key);
        }
    }
}

/// Migration from ConfigV0 to ConfigV1.
/// Adds translate.requestQueueConfig with default throttling (capacity 60, rate 5).
impl MigratesTo<ConfigV1> for ConfigV0 {
    fn migrate(self) -> ConfigV1 {
        let mut t = self.translate;
        drop_shadowed(&mut t.extra, &["requestQueueConfig"]);
        ConfigV1 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: TranslateV1 {
                provider: t.provider,
                models: t.models,
                node: t.node,
                page: t.page,
                prompts_config: t.prompts_config,
                request_queue_config: RequestQueueConfig::default(),
                extra: t.extra,
            },
            floating_button: self.floating_button,
            side_content: self.side_content,
            extra: self.extra,
        }
    }
}

/// Migration from ConfigV1 to ConfigV2.
/// Adds selectionToolbar (enabled by default).
impl MigratesTo<ConfigV2> for ConfigV1 {
    fn migrate(self) -> ConfigV2 {
        let mut extra = self.extra;
        drop_shadowed(&mut extra, &["selectionToolbar"]);
        ConfigV2 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: SelectionToolbarConfig::default(),
            extra,
        }
    }
}

/// Migration from ConfigV2 to ConfigV3.
/// Adds empty translate.page.autoTranslatePatterns and autoTranslateLanguages.
impl MigratesTo<ConfigV3> for ConfigV2 {
    fn migrate(self) -> ConfigV3 {
        let t = self.translate;
        let mut page = t.page;
        drop_shadowed(&mut page.extra, &["autoTranslatePatterns", "autoTranslateLanguages"]);
        ConfigV3 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: TranslateV3 {
                provider: t.provider,
                models: t.models,
                node: t.node,
                page: PageConfig {
                    range: page.range,
                    auto_translate_patterns: Vec::new(),
                    auto_translate_languages: Vec::new(),
                    extra: page.extra,
                },
                prompts_config: t.prompts_config,
                request_queue_config: t.request_queue_config,
                extra: t.extra,
            },
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            extra: self.extra,
        }
    }
}

const LEGACY_SILICONFLOW_ID: &str = "siliconflow";
const SILICONFLOW_ID: &str = "siliconFlow";

/// Moves `siliconflow` to `siliconFlow` unless the new key is already taken,
/// in which case both entries are kept as they are.
fn rename_siliconflow_key<V>(map: &mut BTreeMap<String, V>) {
    if map.contains_key(SILICONFLOW_ID) {
        return;
    }
    if let Some(value) = map.remove(LEGACY_SILICONFLOW_ID) {
        map.insert(SILICONFLOW_ID.to_string(), value);
    }
}

fn rename_siliconflow_id(provider: String) -> String {
    if provider == LEGACY_SILICONFLOW_ID {
        SILICONFLOW_ID.to_string()
    } else {
        provider
    }
}

/// Migration from ConfigV3 to ConfigV4.
/// Renames provider id `siliconflow` to `siliconFlow` in providersConfig, in
/// both model maps, and in the selected read/translate providers.
impl MigratesTo<ConfigV4> for ConfigV3 {
    fn migrate(self) -> ConfigV4 {
        let mut providers_config = self.providers_config;
        rename_siliconflow_key(&mut providers_config);

        let mut read = self.read;
        rename_siliconflow_key(&mut read.models);
        read.provider = rename_siliconflow_id(read.provider);

        let mut translate = self.translate;
        rename_siliconflow_key(&mut translate.models);
        translate.provider = rename_siliconflow_id(translate.provider);

        ConfigV4 {
            language: self.language,
            providers_config,
            read,
            translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            extra: self.extra,
        }
    }
}

/// Migration from ConfigV4 to ConfigV5.
/// Adds tts (openai / gpt-4o-mini-tts / alloy at normal speed).
impl MigratesTo<ConfigV5> for ConfigV4 {
    fn migrate(self) -> ConfigV5 {
        let mut extra = self.extra;
        drop_shadowed(&mut extra, &["tts"]);
        ConfigV5 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: TtsV5 {
                provider: "openai".to_string(),
                model: "gpt-4o-mini-tts".to_string(),
                voice: "alloy".to_string(),
                speed: Number::from(1),
                extra: Map::new(),
            },
            extra,
        }
    }
}

/// Migration from ConfigV5 to ConfigV6.
/// Adds contextMenu with `enabled: true`.
impl MigratesTo<ConfigV6> for ConfigV5 {
    fn migrate(self) -> ConfigV6 {
        let mut extra = self.extra;
        drop_shadowed(&mut extra, &["contextMenu"]);
        ConfigV6 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: ContextMenuV6 {
                enabled: true,
                extra: Map::new(),
            },
            extra,
        }
    }
}

/// Migration from ConfigV6 to ConfigV7.
/// Adds contextMenu.translateSelection (true); contextMenu.enabled is kept.
impl MigratesTo<ConfigV7> for ConfigV6 {
    fn migrate(self) -> ConfigV7 {
        let mut context_menu = self.context_menu;
        drop_shadowed(&mut context_menu.extra, &["translateSelection"]);
        ConfigV7 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: ContextMenuConfig {
                enabled: context_menu.enabled,
                translate_selection: true,
                extra: context_menu.extra,
            },
            extra: self.extra,
        }
    }
}

/// Migration from ConfigV7 to ConfigV8.
/// Adds inputTranslation (enabled, normal direction, 300ms threshold, toast shown).
impl MigratesTo<ConfigV8> for ConfigV7 {
    fn migrate(self) -> ConfigV8 {
        let mut extra = self.extra;
        drop_shadowed(&mut extra, &["inputTranslation"]);
        ConfigV8 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: self.context_menu,
            input_translation: InputTranslationConfig::default(),
            extra,
        }
    }
}

/// Migration from ConfigV8 to ConfigV9.
/// Adds translate.batchQueueConfig (1000 characters / 4 items per batch).
impl MigratesTo<ConfigV9> for ConfigV8 {
    fn migrate(self) -> ConfigV9 {
        let mut t = self.translate;
        drop_shadowed(&mut t.extra, &["batchQueueConfig"]);
        ConfigV9 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: TranslateV9 {
                provider: t.provider,
                models: t.models,
                node: t.node,
                page: t.page,
                prompts_config: t.prompts_config,
                request_queue_config: t.request_queue_config,
                batch_queue_config: BatchQueueConfig::default(),
                extra: t.extra,
            },
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: self.context_menu,
            input_translation: self.input_translation,
            extra: self.extra,
        }
    }
}

/// Migration from ConfigV9 to ConfigV10.
/// Adds translate.translationNodeStyle ("default").
impl MigratesTo<ConfigV10> for ConfigV9 {
    fn migrate(self) -> ConfigV10 {
        let mut t = self.translate;
        drop_shadowed(&mut t.extra, &["translationNodeStyle"]);
        ConfigV10 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: TranslateV10 {
                provider: t.provider,
                models: t.models,
                node: t.node,
                page: t.page,
                prompts_config: t.prompts_config,
                request_queue_config: t.request_queue_config,
                batch_queue_config: t.batch_queue_config,
                translation_node_style: TranslationNodeStyle::Default,
                extra: t.extra,
            },
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: self.context_menu,
            input_translation: self.input_translation,
            extra: self.extra,
        }
    }
}

/// Converts a playback multiplier (1.0 = normal) to a percent adjustment.
fn speed_to_rate(speed: &Number) -> i64 {
    speed
        .as_f64()
        .map_or(0, |speed| ((speed - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i64)
}

/// Migration from ConfigV10 to ConfigV11.
/// Replaces tts.speed (multiplier) with tts.rate (percent, clamped to -100..=100).
impl MigratesTo<ConfigV11> for ConfigV10 {
    fn migrate(self) -> ConfigV11 {
        let mut tts = self.tts;
        drop_shadowed(&mut tts.extra, &["rate"]);
        ConfigV11 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: TtsConfig {
                provider: tts.provider,
                model: tts.model,
                voice: tts.voice,
                rate: speed_to_rate(&tts.speed),
                extra: tts.extra,
            },
            context_menu: self.context_menu,
            input_translation: self.input_translation,
            extra: self.extra,
        }
    }
}

/// Migration from ConfigV11 to ConfigV12.
/// Renames translate.promptsConfig.prompt to promptId. Custom patterns are untouched.
impl MigratesTo<ConfigV12> for ConfigV11 {
    fn migrate(self) -> ConfigV12 {
        let t = self.translate;
        let PromptsConfigV0 {
            prompt,
            patterns,
            extra: mut prompts_extra,
        } = t.prompts_config;
        drop_shadowed(&mut prompts_extra, &["promptId"]);
        ConfigV12 {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: TranslateConfig {
                provider: t.provider,
                models: t.models,
                node: t.node,
                page: t.page,
                prompts_config: PromptsConfig {
                    prompt_id: prompt,
                    patterns,
                    extra: prompts_extra,
                },
                request_queue_config: t.request_queue_config,
                batch_queue_config: t.batch_queue_config,
                translation_node_style: t.translation_node_style,
                extra: t.extra,
            },
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: self.context_menu,
            input_translation: self.input_translation,
            extra: self.extra,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Converts the latest record into the domain model.
impl IntoDomain<Config> for ConfigV12 {
    fn into_domain(self) -> Config {
        Config {
            language: self.language,
            providers_config: self.providers_config,
            read: self.read,
            translate: self.translate,
            floating_button: self.floating_button,
            side_content: self.side_content,
            selection_toolbar: self.selection_toolbar,
            tts: self.tts,
            context_menu: self.context_menu,
            input_translation: self.input_translation,
            extra: self.extra,
        }
    }
}

/// Converts the domain model into the latest record for persistence.
impl FromDomain<Config> for ConfigV12 {
    fn from_domain(config: Config) -> Self {
        ConfigV12 {
            language: config.language,
            providers_config: config.providers_config,
            read: config.read,
            translate: config.translate,
            floating_button: config.floating_button,
            side_content: config.side_content,
            selection_toolbar: config.selection_toolbar,
            tts: config.tts,
            context_menu: config.context_menu,
            input_translation: config.input_translation,
            extra: config.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::config::{InputTranslationDirection, ProviderConfig};
    use serde_json::json;

    fn v5() -> ConfigV5 {
        let v0: ConfigV0 =
            serde_json::from_value(fixture_v0()).expect("v0 fixture should decode");
        let v1: ConfigV1 = v0.migrate();
        let v2: ConfigV2 = v1.migrate();
        let v3: ConfigV3 = v2.migrate();
        let v4: ConfigV4 = v3.migrate();
        v4.migrate()
    }

    fn fixture_v0() -> Value {
        let mut value: Value =
            serde_json::from_str(include_str!("../../tests/fixtures/settings_v0.json")).unwrap();
        value.as_object_mut().unwrap().remove("version");
        value
    }

    #[test]
    fn test_schema_versions_are_consecutive() {
        assert_eq!(ConfigV0::SCHEMA_VERSION, 0);
        assert_eq!(ConfigV6::SCHEMA_VERSION + 1, ConfigV7::SCHEMA_VERSION);
        assert_eq!(LatestConfig::SCHEMA_VERSION, 12);
    }

    #[test]
    fn test_v0_to_v1_adds_request_queue() {
        let v0: ConfigV0 = serde_json::from_value(fixture_v0()).unwrap();
        let v1: ConfigV1 = v0.migrate();
        assert_eq!(v1.translate.request_queue_config.capacity, 60);
        assert_eq!(v1.translate.request_queue_config.rate, 5);
    }

    #[test]
    fn test_v3_to_v4_renames_siliconflow_everywhere() {
        let v0: ConfigV0 = serde_json::from_value(fixture_v0()).unwrap();
        let v1: ConfigV1 = v0.migrate();
        let v2: ConfigV2 = v1.migrate();
        let v3: ConfigV3 = v2.migrate();
        let legacy = v3.providers_config.get("siliconflow").cloned();
        assert!(legacy.is_some());

        let v4: ConfigV4 = v3.migrate();
        assert!(!v4.providers_config.contains_key("siliconflow"));
        assert_eq!(v4.providers_config.get("siliconFlow").cloned(), legacy);
        assert!(v4.read.models.contains_key("siliconFlow"));
        assert!(v4.translate.models.contains_key("siliconFlow"));
        assert_eq!(v4.read.provider, "siliconFlow");
    }

    #[test]
    fn test_siliconflow_rename_keeps_existing_target() {
        let mut providers = ProvidersConfig::new();
        providers.insert("siliconflow".to_string(), ProviderConfig::with_api_key("old"));
        providers.insert("siliconFlow".to_string(), ProviderConfig::with_api_key("new"));
        rename_siliconflow_key(&mut providers);
        assert_eq!(providers["siliconFlow"].api_key(), Some("new"));
        assert_eq!(providers["siliconflow"].api_key(), Some("old"));
    }

    #[test]
    fn test_v5_to_v6_adds_enabled_context_menu() {
        let v6: ConfigV6 = v5().migrate();
        assert!(v6.context_menu.enabled);
    }

    #[test]
    fn test_v6_to_v7_keeps_enabled_and_adds_translate_selection() {
        let mut v6: ConfigV6 = v5().migrate();
        v6.context_menu.enabled = false;
        let v7: ConfigV7 = v6.migrate();
        assert!(!v7.context_menu.enabled);
        assert!(v7.context_menu.translate_selection);
    }

    #[test]
    fn test_v7_to_v8_adds_input_translation_defaults() {
        let v6: ConfigV6 = v5().migrate();
        let v7: ConfigV7 = v6.migrate();
        let v8: ConfigV8 = v7.migrate();
        let input = v8.input_translation;
        assert!(input.enabled);
        assert_eq!(input.direction, InputTranslationDirection::Normal);
        assert_eq!(input.time_threshold, 300);
        assert!(input.show_toast);
    }

    fn number(value: f64) -> Number {
        Number::from_f64(value).unwrap()
    }

    #[test]
    fn test_speed_to_rate() {
        assert_eq!(speed_to_rate(&number(1.0)), 0);
        assert_eq!(speed_to_rate(&Number::from(1)), 0);
        assert_eq!(speed_to_rate(&Number::from(2)), 100);
        assert_eq!(speed_to_rate(&number(1.5)), 50);
        assert_eq!(speed_to_rate(&number(0.25)), -75);
        assert_eq!(speed_to_rate(&number(4.0)), 100);
    }

    #[test]
    fn test_stale_unknown_key_gives_way_to_new_section() {
        let mut v7: ConfigV7 = {
            let v6: ConfigV6 = v5().migrate();
            v6.migrate()
        };
        v7.extra
            .insert("inputTranslation".to_string(), json!({ "enabled": false }));
        v7.context_menu.extra.insert("keep".to_string(), json!(1));

        let v8: ConfigV8 = v7.migrate();
        assert!(!v8.extra.contains_key("inputTranslation"));
        assert_eq!(v8.input_translation, InputTranslationConfig::default());

        let value = serde_json::to_value(&v8).unwrap();
        assert_eq!(value["inputTranslation"]["direction"], json!("normal"));
        assert_eq!(value["contextMenu"]["keep"], json!(1));
    }

    #[test]
    fn test_stale_nested_keys_give_way_to_new_fields() {
        let mut v10: ConfigV10 = {
            let v6: ConfigV6 = v5().migrate();
            let v7: ConfigV7 = v6.migrate();
            let v8: ConfigV8 = v7.migrate();
            let v9: ConfigV9 = v8.migrate();
            v9.migrate()
        };
        v10.tts.extra.insert("rate".to_string(), json!("fast"));
        v10.translate
            .prompts_config
            .extra
            .insert("promptId".to_string(), json!(42));

        let v11: ConfigV11 = v10.migrate();
        let v12: ConfigV12 = v11.migrate();
        let value = serde_json::to_value(&v12).unwrap();
        assert!(value["tts"]["rate"].is_i64());
        assert!(value["translate"]["promptsConfig"]["promptId"].is_string());
    }

    #[test]
    fn test_v11_to_v12_renames_prompt_and_keeps_patterns() {
        let v5 = v5();
        let patterns = v5.translate.prompts_config.patterns.clone();
        let selected = v5.translate.prompts_config.prompt.clone();
        let v6: ConfigV6 = v5.migrate();
        let v7: ConfigV7 = v6.migrate();
        let v8: ConfigV8 = v7.migrate();
        let v9: ConfigV9 = v8.migrate();
        let v10: ConfigV10 = v9.migrate();
        let v11: ConfigV11 = v10.migrate();
        let v12: ConfigV12 = v11.migrate();
        assert_eq!(v12.translate.prompts_config.prompt_id, selected);
        assert_eq!(v12.translate.prompts_config.patterns, patterns);

        let value = serde_json::to_value(&v12).unwrap();
        assert!(value["translate"]["promptsConfig"].get("prompt").is_none());
        assert_eq!(value["translate"]["promptsConfig"]["promptId"], json!(selected));
    }

    #[test]
    fn test_latest_matches_domain_model() {
        let config = Config::default();
        let dto = ConfigV12::from_domain(config.clone());
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            serde_json::to_value(&config).unwrap()
        );
        assert_eq!(dto.into_domain(), config);
    }
}
