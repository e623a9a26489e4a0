//! Settings document model and the persistence seam.

pub mod model;
pub mod store;

pub use model::*;
pub use store::{ConfigStore, StoredConfig, VERSION_KEY};
