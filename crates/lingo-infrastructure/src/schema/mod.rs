//! Structural validation of settings documents against per-version JSON
//! Schemas.

mod catalog;
mod validator;

pub use catalog::{LATEST_SCHEMA_VERSION, schema_for};
pub use validator::{SchemaError, SchemaValidator};
