//! Settings domain model.
//!
//! `Config` is the shape of the settings document at the latest schema
//! version. Every section carries a flattened `extra` map so fields this build
//! does not model (written by the UI or by other releases) survive a
//! load/save cycle untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Learner level used when generating explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl LanguageLevel {
    pub const ALL: &'static [&'static str] = &["beginner", "intermediate", "advanced"];
}

/// Source/target language selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    /// ISO code or `"auto"` for detection.
    pub source_code: String,
    pub target_code: String,
    pub level: LanguageLevel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            source_code: "auto".to_string(),
            target_code: "eng".to_string(),
            level: LanguageLevel::default(),
            extra: Map::new(),
        }
    }
}

/// Credentials for a single LLM/translation provider.
///
/// `None` means the key is absent and `Some(None)` an explicit `null`; both
/// are written back the way they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(
        rename = "apiKey",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub api_key: Option<Option<String>>,
    #[serde(
        rename = "baseURL",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub base_url: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(Some(api_key.into())),
            ..Self::default()
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref()?.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_ref()?.as_deref()
    }
}

/// Deserializes a key that is present, keeping an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Provider credentials keyed by provider id.
pub type ProvidersConfig = BTreeMap<String, ProviderConfig>;

/// Per-provider model selections. Opaque to the settings engine.
pub type ModelSelections = BTreeMap<String, Value>;

/// "Read" (article explanation) feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadConfig {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            models: ModelSelections::new(),
            extra: Map::new(),
        }
    }
}

/// Hover-to-translate a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub enabled: bool,
    pub hotkey: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hotkey: "Control".to_string(),
            extra: Map::new(),
        }
    }
}

/// Which part of a page gets translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageRange {
    #[default]
    Main,
    All,
}

impl PageRange {
    pub const ALL: &'static [&'static str] = &["main", "all"];
}

/// Whole-page translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub range: PageRange,
    pub auto_translate_patterns: Vec<String>,
    pub auto_translate_languages: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user-defined translation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPattern {
    pub id: String,
    pub name: String,
    pub prompt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Prompt library plus the currently selected prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsConfig {
    pub prompt_id: String,
    pub patterns: Vec<PromptPattern>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const DEFAULT_PROMPT_ID: &str = "default";

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            prompt_id: DEFAULT_PROMPT_ID.to_string(),
            patterns: vec![PromptPattern {
                id: DEFAULT_PROMPT_ID.to_string(),
                name: "Default".to_string(),
                prompt: "Translate the following text into {{targetLang}}:\n{{input}}".to_string(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        }
    }
}

/// Throttling for outgoing translation requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQueueConfig {
    /// Token bucket size.
    pub capacity: u64,
    /// Requests per second.
    pub rate: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RequestQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 60,
            rate: 5,
            extra: Map::new(),
        }
    }
}

/// Batching of small text nodes into a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQueueConfig {
    pub max_characters_per_batch: u64,
    pub max_items_per_batch: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for BatchQueueConfig {
    fn default() -> Self {
        Self {
            max_characters_per_batch: 1000,
            max_items_per_batch: 4,
            extra: Map::new(),
        }
    }
}

/// Visual treatment of inserted translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TranslationNodeStyle {
    #[default]
    Default,
    Blur,
    Blockquote,
    Weakened,
    DashedLine,
    Border,
    TextColor,
    Background,
}

impl TranslationNodeStyle {
    pub const ALL: &'static [&'static str] = &[
        "default",
        "blur",
        "blockquote",
        "weakened",
        "dashedLine",
        "border",
        "textColor",
        "background",
    ];
}

/// Page and node translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateConfig {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfig,
    pub prompts_config: PromptsConfig,
    pub request_queue_config: RequestQueueConfig,
    pub batch_queue_config: BatchQueueConfig,
    pub translation_node_style: TranslationNodeStyle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            provider: "microsoft".to_string(),
            models: ModelSelections::new(),
            node: NodeConfig::default(),
            page: PageConfig::default(),
            prompts_config: PromptsConfig::default(),
            request_queue_config: RequestQueueConfig::default(),
            batch_queue_config: BatchQueueConfig::default(),
            translation_node_style: TranslationNodeStyle::default(),
            extra: Map::new(),
        }
    }
}

/// Floating action button on web pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingButtonConfig {
    pub enabled: bool,
    /// Vertical position as a fraction of the viewport height. Kept as the
    /// stored number so `1` is not rewritten as `1.0`.
    pub position: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const DEFAULT_FLOATING_BUTTON_POSITION: f64 = 0.66;

impl Default for FloatingButtonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: Number::from_f64(DEFAULT_FLOATING_BUTTON_POSITION)
                .unwrap_or_else(|| Number::from(0)),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideContentConfig {
    /// Panel width in pixels.
    pub width: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SideContentConfig {
    fn default() -> Self {
        Self {
            width: 400,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionToolbarConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SelectionToolbarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra: Map::new(),
        }
    }
}

/// Text-to-speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsConfig {
    pub provider: String,
    pub model: String,
    pub voice: String,
    /// Speaking-rate adjustment in percent, -100..=100.
    pub rate: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini-tts".to_string(),
            voice: "alloy".to_string(),
            rate: 0,
            extra: Map::new(),
        }
    }
}

/// Browser context-menu entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuConfig {
    pub enabled: bool,
    pub translate_selection: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ContextMenuConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            translate_selection: true,
            extra: Map::new(),
        }
    }
}

/// Which way text typed into input fields is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputTranslationDirection {
    /// Target language into the source language.
    #[default]
    Normal,
    /// Source language into the target language.
    Reverse,
}

impl InputTranslationDirection {
    pub const ALL: &'static [&'static str] = &["normal", "reverse"];
}

/// Translate text typed into input fields (triggered by a triple space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTranslationConfig {
    pub enabled: bool,
    pub direction: InputTranslationDirection,
    /// Max milliseconds between trigger key presses.
    pub time_threshold: u64,
    pub show_toast: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for InputTranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: InputTranslationDirection::default(),
            time_threshold: 300,
            show_toast: true,
            extra: Map::new(),
        }
    }
}

/// The settings document at the latest schema version.
///
/// The persisted form additionally carries a top-level `version` field, which
/// is owned by the migration engine rather than by this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
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

impl Config {
    /// Looks up the credentials for a provider.
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers_config.get(id)
    }
}
