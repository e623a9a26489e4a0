//! Versioned settings records.
//!
//! Each schema version of the persisted settings document has its own record
//! type, and each version bump is a `MigratesTo` implementation between two
//! consecutive records. The compiler therefore checks that every step
//! produces exactly what the next step consumes.
//!
//! ## Settings Version History
//! - **0**: language, providersConfig, read, translate, floatingButton, sideContent
//! - **1**: `translate.requestQueueConfig`
//! - **2**: `selectionToolbar`
//! - **3**: `translate.page.autoTranslatePatterns` / `autoTranslateLanguages`
//! - **4**: provider id `siliconflow` renamed to `siliconFlow`
//! - **5**: `tts`
//! - **6**: `contextMenu.enabled`
//! - **7**: `contextMenu.translateSelection`
//! - **8**: `inputTranslation`
//! - **9**: `translate.batchQueueConfig`
//! - **10**: `translate.translationNodeStyle`
//! - **11**: `tts.speed` multiplier replaced by `tts.rate` percentage
//! - **12**: `translate.promptsConfig.prompt` renamed to `promptId`

mod config;
mod sections;

pub use config::{
    ConfigV0, ConfigV1, ConfigV2, ConfigV3, ConfigV4, ConfigV5, ConfigV6, ConfigV7, ConfigV8,
    ConfigV9, ConfigV10, ConfigV11, ConfigV12, LatestConfig,
};
pub use sections::{
    ContextMenuV6, PageConfigV0, PromptsConfigV0, TranslateV0, TranslateV1, TranslateV3,
    TranslateV9, TranslateV10, TtsV5,
};

use version_migrate::Versioned;

/// Binds a settings record to the integer schema version persisted in the
/// document's top-level `version` field.
pub trait SchemaVersion: Versioned {
    const SCHEMA_VERSION: u32;
}
