use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use lingo_core::config::VERSION_KEY;
use lingo_core::migration::Violation;
use serde_json::Value;
use thiserror::Error;

use super::catalog::{LATEST_SCHEMA_VERSION, schema_for};

const ROOT_PATH: &str = "$";

/// A built-in schema failed to compile.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("schema v{version} does not compile: {message}")]
pub struct SchemaError {
    pub version: u32,
    pub message: String,
}

struct VersionSchema {
    source: Value,
    compiled: JSONSchema,
}

/// Checks settings documents against the JSON Schema of a given version.
///
/// Validation is total: any JSON value yields either the validated document
/// or the complete list of violations, never a panic.
#[derive(Clone)]
pub struct SchemaValidator {
    /// `schemas[v]` is the schema of version `v`.
    schemas: Arc<[VersionSchema]>,
}

impl SchemaValidator {
    /// Compiles the schema of every version up to the latest.
    pub fn new() -> Result<Self, SchemaError> {
        let schemas = (0..=LATEST_SCHEMA_VERSION)
            .filter_map(|version| schema_for(version).map(|source| (version, source)))
            .map(|(version, source)| -> Result<VersionSchema, SchemaError> {
                let compiled = JSONSchema::options()
                    .with_draft(Draft::Draft7)
                    .compile(&source)
                    .map_err(|e| SchemaError {
                        version,
                        message: e.to_string(),
                    })?;
                Ok(VersionSchema { source, compiled })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Self {
            schemas: schemas.into(),
        })
    }

    /// Returns the highest version this validator knows.
    pub fn latest_version(&self) -> u32 {
        self.schemas.len().saturating_sub(1) as u32
    }

    /// Validates `document` against the schema of `version`.
    ///
    /// Unknown keys are accepted. A top-level `version` field is optional,
    /// but when present it must equal `version`.
    pub fn validate<'a>(&self, document: &'a Value, version: u32) -> Result<&'a Value, Vec<Violation>> {
        let Some(schema) = self.schemas.get(version as usize) else {
            return Err(vec![Violation::new(
                ROOT_PATH,
                format!("a schema version in [0, {}]", self.latest_version()),
                format!("version {}", version),
            )]);
        };

        let mut violations = match schema.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| to_violation(&schema.source, document, &error))
                .collect(),
        };

        if let Some(tag) = document.get(VERSION_KEY) {
            if tag.as_u64() != Some(u64::from(version)) {
                violations.push(Violation::new(
                    VERSION_KEY,
                    format!("integer {}", version),
                    describe_value(tag),
                ));
            }
        }

        if violations.is_empty() {
            Ok(document)
        } else {
            Err(violations)
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("latest_version", &self.latest_version())
            .finish()
    }
}

fn to_violation(schema: &Value, document: &Value, error: &ValidationError<'_>) -> Violation {
    let instance_pointer = error.instance_path.to_string();
    let keyword_pointer = error.schema_path.to_string();
    // The failing keyword sits inside the schema of the offending value.
    let owner_pointer = keyword_pointer
        .rsplit_once('/')
        .map_or("", |(owner, _)| owner);

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property.as_str().map_or_else(|| property.to_string(), str::to_string);
            let expected = schema
                .pointer(owner_pointer)
                .and_then(|owner| owner.get("properties"))
                .and_then(|properties| properties.get(&name))
                .map_or_else(|| "a value".to_string(), describe_schema);
            let parent = dotted_path(document, &instance_pointer);
            Violation::new(join(&parent, &name), expected, "missing")
        }
        _ => {
            let expected = schema
                .pointer(owner_pointer)
                .map_or_else(|| error.to_string(), describe_schema);
            Violation::new(
                dotted_path(document, &instance_pointer),
                expected,
                describe_value(&error.instance),
            )
        }
    }
}

/// Converts a JSON pointer into the document into `a.b[0].c` form.
fn dotted_path(document: &Value, pointer: &str) -> String {
    let mut path = ROOT_PATH.to_string();
    let mut current = Some(document);

    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        match current {
            Some(Value::Array(items)) => {
                path.push_str(&format!("[{}]", token));
                current = token.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            other => {
                path = join(&path, &token);
                current = other.and_then(|value| value.get(token.as_str()));
            }
        }
    }
    path
}

fn join(path: &str, key: &str) -> String {
    if path == ROOT_PATH {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Describes a schema for `Violation::expected`.
fn describe_schema(schema: &Value) -> String {
    if let Some(options) = schema.get("enum").and_then(Value::as_array) {
        let options: Vec<String> = options
            .iter()
            .map(|option| option.as_str().map_or_else(|| option.to_string(), str::to_string))
            .collect();
        return format!("one of [{}]", options.join(", "));
    }

    let kind = match schema.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        _ => return "a valid value".to_string(),
    };

    match (schema.get("minimum"), schema.get("maximum")) {
        (Some(min), Some(max)) => format!("{} in [{}, {}]", kind, min, max),
        (Some(min), None) => format!("{} >= {}", kind, min),
        (None, Some(max)) => format!("{} <= {}", kind, max),
        (None, None) => kind,
    }
}

/// Describes a value for `Violation::actual`.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::ConfigV12;
    use lingo_core::config::Config;
    use serde_json::json;
    use version_migrate::FromDomain;

    fn validator() -> SchemaValidator {
        SchemaValidator::new().unwrap()
    }

    fn default_document() -> Value {
        serde_json::to_value(ConfigV12::from_domain(Config::default())).unwrap()
    }

    fn find<'v>(violations: &'v [Violation], path: &str) -> &'v Violation {
        violations
            .iter()
            .find(|v| v.path == path)
            .unwrap_or_else(|| panic!("no violation at {}: {:?}", path, violations))
    }

    #[test]
    fn test_every_built_in_schema_compiles() {
        assert_eq!(validator().latest_version(), LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn test_default_config_is_valid_at_latest() {
        let document = default_document();
        assert!(validator().validate(&document, 12).is_ok());
    }

    #[test]
    fn test_v0_fixture_is_valid_at_v0_only() {
        let validator = validator();
        let document: Value =
            serde_json::from_str(include_str!("../../tests/fixtures/settings_v0.json")).unwrap();
        assert!(validator.validate(&document, 0).is_ok());

        let violations = validator.validate(&document, 1).unwrap_err();
        let missing = find(&violations, "translate.requestQueueConfig");
        assert_eq!(missing.expected, "object");
        assert_eq!(missing.actual, "missing");
        assert_eq!(find(&violations, "version").expected, "integer 1");
    }

    #[test]
    fn test_reports_all_violations() {
        let mut document = default_document();
        document["tts"]["rate"] = json!(150);
        document["inputTranslation"]["direction"] = json!("sideways");
        document["sideContent"]["width"] = json!(0);
        document["translate"]["promptsConfig"]["patterns"] =
            json!([{ "id": "x", "name": "X", "prompt": 7 }]);

        let violations = validator().validate(&document, 12).unwrap_err();
        assert_eq!(violations.len(), 4, "{:?}", violations);

        let rate = find(&violations, "tts.rate");
        assert_eq!(rate.expected, "integer in [-100, 100]");
        assert_eq!(rate.actual, "number 150");

        let direction = find(&violations, "inputTranslation.direction");
        assert_eq!(direction.expected, "one of [normal, reverse]");
        assert_eq!(direction.actual, "string \"sideways\"");

        assert_eq!(find(&violations, "sideContent.width").expected, "integer >= 1");
        assert_eq!(
            find(&violations, "translate.promptsConfig.patterns[0].prompt").expected,
            "string"
        );
    }

    #[test]
    fn test_missing_nested_field_is_reported_with_its_schema() {
        let mut document = default_document();
        document["tts"].as_object_mut().unwrap().remove("rate");

        let violations = validator().validate(&document, 12).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "tts.rate");
        assert_eq!(violations[0].expected, "integer in [-100, 100]");
        assert_eq!(violations[0].actual, "missing");
    }

    #[test]
    fn test_provider_keys_are_indexed_by_name() {
        let mut document = default_document();
        document["providersConfig"]["openai"]["apiKey"] = json!(12);

        let violations = validator().validate(&document, 12).unwrap_err();
        assert_eq!(violations[0].path, "providersConfig.openai.apiKey");
        assert_eq!(violations[0].expected, "string or null");
    }

    #[test]
    fn test_unknown_version_is_a_violation() {
        let violations = validator().validate(&json!({}), 99).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$");
    }

    #[test]
    fn test_non_object_document() {
        let validator = validator();
        for document in [json!(null), json!(42), json!("settings"), json!([])] {
            let violations = validator.validate(&document, 0).unwrap_err();
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "$");
            assert_eq!(violations[0].expected, "object");
        }
    }

    #[test]
    fn test_version_tag_must_match() {
        let validator = validator();
        let mut document = default_document();
        document["version"] = json!(12);
        assert!(validator.validate(&document, 12).is_ok());

        document["version"] = json!("12");
        let violations = validator.validate(&document, 12).unwrap_err();
        assert_eq!(violations[0].path, "version");
    }

    #[test]
    fn test_unknown_keys_are_accepted() {
        let mut document = default_document();
        document["experimental"] = json!({ "anything": [1, 2] });
        document["tts"]["pitch"] = json!(3);
        assert!(validator().validate(&document, 12).is_ok());
    }

    #[test]
    fn test_dotted_path_distinguishes_indices_from_keys() {
        let document = json!({ "a": [{ "0": { "b": true } }] });
        assert_eq!(dotted_path(&document, ""), "$");
        assert_eq!(dotted_path(&document, "/a/0/0/b"), "a[0].0.b");
    }
}
