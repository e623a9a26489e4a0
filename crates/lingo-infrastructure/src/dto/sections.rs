//! Section shapes that only existed in older schema versions.
//!
//! Sections whose shape never changed are shared with the domain model in
//! `lingo_core::config`.

use lingo_core::config::{
    BatchQueueConfig, ModelSelections, NodeConfig, PageConfig, PageRange, PromptPattern,
    RequestQueueConfig, TranslationNodeStyle,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// `translate.page` before auto-translate rules (v0..v2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfigV0 {
    pub range: PageRange,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate.promptsConfig` with the selected prompt stored under `prompt` (v0..v11).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsConfigV0 {
    pub prompt: String,
    pub patterns: Vec<PromptPattern>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate` at v0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateV0 {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfigV0,
    pub prompts_config: PromptsConfigV0,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate` at v1..v2: adds the request queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateV1 {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfigV0,
    pub prompts_config: PromptsConfigV0,
    pub request_queue_config: RequestQueueConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate` at v3..v8: page gains auto-translate rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateV3 {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfig,
    pub prompts_config: PromptsConfigV0,
    pub request_queue_config: RequestQueueConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate` at v9: adds the batch queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateV9 {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfig,
    pub prompts_config: PromptsConfigV0,
    pub request_queue_config: RequestQueueConfig,
    pub batch_queue_config: BatchQueueConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `translate` at v10..v11: adds the translation node style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateV10 {
    pub provider: String,
    #[serde(default)]
    pub models: ModelSelections,
    pub node: NodeConfig,
    pub page: PageConfig,
    pub prompts_config: PromptsConfigV0,
    pub request_queue_config: RequestQueueConfig,
    pub batch_queue_config: BatchQueueConfig,
    pub translation_node_style: TranslationNodeStyle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `tts` at v5..v10, with a playback speed multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsV5 {
    pub provider: String,
    pub model: String,
    pub voice: String,
    /// 0.25..=4.0, 1.0 is normal speed. Kept as the stored number.
    pub speed: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `contextMenu` at v6, before per-entry toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuV6 {
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
