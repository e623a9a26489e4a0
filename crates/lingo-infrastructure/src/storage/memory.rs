use async_trait::async_trait;
use lingo_core::config::{ConfigStore, StoredConfig};
use lingo_core::error::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-memory [`ConfigStore`], mainly for tests and dry runs.
///
/// Counts writes so callers can assert that nothing was persisted.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    document: Mutex<Option<Value>>,
    writes: AtomicUsize,
}

impl InMemoryConfigStore {
    /// Creates an empty store (first install).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `document`.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the current document.
    pub async fn document(&self) -> Option<Value> {
        self.document.lock().await.clone()
    }

    /// Returns how many times `set` has been called.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self) -> Result<Option<StoredConfig>> {
        let document = self.document.lock().await.clone();
        document.map(StoredConfig::from_document).transpose()
    }

    async fn set(&self, document: &Value) -> Result<()> {
        *self.document.lock().await = Some(document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
