//! Core traits for the migration framework.
//!
//! A [`MigrationStep`] upgrades the raw settings document by exactly one
//! schema version. Concrete steps are written as typed
//! `MigratesTo<ConfigV{n+1}> for ConfigV{n}` implementations and erased into
//! steps through [`TypedStep`].

use lingo_core::config::VERSION_KEY;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;
use version_migrate::MigratesTo;

use crate::dto::SchemaVersion;

/// Errors raised while applying a single step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The document is not a JSON object.
    #[error("expected a settings object, found {0}")]
    NotAnObject(&'static str),

    /// The document does not match the step's source schema.
    #[error("document does not match the v{version} layout: {source}")]
    Decode {
        version: u32,
        #[source]
        source: serde_json::Error,
    },

    /// The migrated record could not be turned back into a document.
    #[error("failed to encode the v{version} layout: {source}")]
    Encode {
        version: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// A pure upgrade of the settings document from one version to the next.
pub trait MigrationStep: Send + Sync + fmt::Debug {
    /// Returns the version this step starts from.
    fn from_version(&self) -> u32;

    /// Returns the version this step produces. Always `from_version() + 1`
    /// for a registrable step.
    fn to_version(&self) -> u32;

    /// Returns a human-readable description of the shape delta.
    ///
    /// Used for logging and diagnostics.
    fn description(&self) -> &str;

    /// Transforms `document` into a new document at `to_version()`.
    ///
    /// Must not depend on anything but its input.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not satisfy the source layout.
    fn apply(&self, document: &Value) -> Result<Value, StepError>;
}

/// Names the JSON type of a value for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Adapts a typed `MigratesTo<Dst> for Src` into a [`MigrationStep`].
///
/// The top-level `version` tag is stripped before decoding `Src` and set to
/// `Dst::SCHEMA_VERSION` on the result.
pub struct TypedStep<Src, Dst> {
    description: &'static str,
    _marker: PhantomData<fn(Src) -> Dst>,
}

impl<Src, Dst> TypedStep<Src, Dst> {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            _marker: PhantomData,
        }
    }
}

impl<Src, Dst> fmt::Debug for TypedStep<Src, Dst>
where
    Src: SchemaVersion,
    Dst: SchemaVersion,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedStep")
            .field("from", &Src::SCHEMA_VERSION)
            .field("to", &Dst::SCHEMA_VERSION)
            .field("description", &self.description)
            .finish()
    }
}

impl<Src, Dst> MigrationStep for TypedStep<Src, Dst>
where
    Src: SchemaVersion + MigratesTo<Dst> + DeserializeOwned,
    Dst: SchemaVersion + Serialize,
{
    fn from_version(&self) -> u32 {
        Src::SCHEMA_VERSION
    }

    fn to_version(&self) -> u32 {
        Dst::SCHEMA_VERSION
    }

    fn description(&self) -> &str {
        self.description
    }

    fn apply(&self, document: &Value) -> Result<Value, StepError> {
        let mut fields = match document {
            Value::Object(fields) => fields.clone(),
            other => return Err(StepError::NotAnObject(json_kind(other))),
        };
        fields.remove(VERSION_KEY);

        let source: Src =
            serde_json::from_value(Value::Object(fields)).map_err(|source| StepError::Decode {
                version: Src::SCHEMA_VERSION,
                source,
            })?;
        let migrated: Dst = source.migrate();

        let mut value = serde_json::to_value(&migrated).map_err(|source| StepError::Encode {
            version: Dst::SCHEMA_VERSION,
            source,
        })?;
        match value.as_object_mut() {
            Some(fields) => {
                fields.insert(VERSION_KEY.to_string(), Value::from(Dst::SCHEMA_VERSION));
            }
            None => return Err(StepError::NotAnObject(json_kind(&value))),
        }
        Ok(value)
    }
}
