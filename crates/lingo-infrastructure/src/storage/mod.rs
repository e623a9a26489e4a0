//! Settings store backends.

mod file_store;
mod memory;

pub use file_store::{FileConfigStore, SettingsFile, StorageFormat};
pub use memory::InMemoryConfigStore;
