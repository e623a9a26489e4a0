//! Per-version JSON Schema of the settings document.
//!
//! Schemas are derived incrementally: version `n` starts from version `n - 1`
//! and applies the same delta as the `n - 1 -> n` migration step. Every
//! object accepts unknown keys.

use lingo_core::config::{
    InputTranslationDirection, LanguageLevel, PageRange, TranslationNodeStyle,
};
use serde_json::{Map, Value, json};

/// Highest schema version with a known layout.
pub const LATEST_SCHEMA_VERSION: u32 = 12;

/// Returns the Draft 7 schema of the settings document at `version`, or
/// `None` for versions this build does not know.
pub fn schema_for(version: u32) -> Option<Value> {
    if version > LATEST_SCHEMA_VERSION {
        return None;
    }

    let mut schema = base_schema();

    if version >= 1 {
        if let Some(translate) = section_mut(&mut schema, &["translate"]) {
            insert_required(
                translate,
                "requestQueueConfig",
                object([("capacity", positive_integer()), ("rate", positive_integer())]),
            );
        }
    }

    if version >= 2 {
        insert_required(
            &mut schema,
            "selectionToolbar",
            object([("enabled", json!({ "type": "boolean" }))]),
        );
    }

    if version >= 3 {
        if let Some(page) = section_mut(&mut schema, &["translate", "page"]) {
            insert_required(page, "autoTranslatePatterns", array_of(string()));
            insert_required(page, "autoTranslateLanguages", array_of(string()));
        }
    }

    // Version 4 only renames a provider id; the layout is unchanged.

    if version >= 5 {
        insert_required(
            &mut schema,
            "tts",
            object([
                ("provider", string()),
                ("model", string()),
                ("voice", string()),
                ("speed", json!({ "type": "number", "minimum": 0.25, "maximum": 4.0 })),
            ]),
        );
    }

    if version >= 6 {
        insert_required(
            &mut schema,
            "contextMenu",
            object([("enabled", json!({ "type": "boolean" }))]),
        );
    }

    if version >= 7 {
        if let Some(context_menu) = section_mut(&mut schema, &["contextMenu"]) {
            insert_required(context_menu, "translateSelection", json!({ "type": "boolean" }));
        }
    }

    if version >= 8 {
        insert_required(
            &mut schema,
            "inputTranslation",
            object([
                ("enabled", json!({ "type": "boolean" })),
                ("direction", one_of(InputTranslationDirection::ALL)),
                ("timeThreshold", positive_integer()),
                ("showToast", json!({ "type": "boolean" })),
            ]),
        );
    }

    if version >= 9 {
        if let Some(translate) = section_mut(&mut schema, &["translate"]) {
            insert_required(
                translate,
                "batchQueueConfig",
                object([
                    ("maxCharactersPerBatch", positive_integer()),
                    ("maxItemsPerBatch", positive_integer()),
                ]),
            );
        }
    }

    if version >= 10 {
        if let Some(translate) = section_mut(&mut schema, &["translate"]) {
            insert_required(translate, "translationNodeStyle", one_of(TranslationNodeStyle::ALL));
        }
    }

    if version >= 11 {
        if let Some(tts) = section_mut(&mut schema, &["tts"]) {
            remove_field(tts, "speed");
            insert_required(
                tts,
                "rate",
                json!({ "type": "integer", "minimum": -100, "maximum": 100 }),
            );
        }
    }

    if version >= 12 {
        if let Some(prompts) = section_mut(&mut schema, &["translate", "promptsConfig"]) {
            rename_field(prompts, "prompt", "promptId");
        }
    }

    Some(schema)
}

fn base_schema() -> Value {
    let language = object([
        ("sourceCode", string()),
        ("targetCode", string()),
        ("level", one_of(LanguageLevel::ALL)),
    ]);

    let provider = json!({
        "type": "object",
        "properties": {
            "apiKey": { "type": ["string", "null"] },
            "baseURL": { "type": ["string", "null"] },
        },
    });

    let mut read = object([("provider", string())]);
    insert_optional(&mut read, "models", json!({ "type": ["object", "null"] }));

    let pattern = object([("id", string()), ("name", string()), ("prompt", string())]);

    let mut translate = object([
        ("provider", string()),
        (
            "node",
            object([("enabled", json!({ "type": "boolean" })), ("hotkey", string())]),
        ),
        ("page", object([("range", one_of(PageRange::ALL))])),
        (
            "promptsConfig",
            object([("prompt", string()), ("patterns", array_of(pattern))]),
        ),
    ]);
    insert_optional(&mut translate, "models", json!({ "type": ["object", "null"] }));

    let mut root = object([
        ("language", language),
        (
            "providersConfig",
            json!({ "type": "object", "additionalProperties": provider }),
        ),
        ("read", read),
        ("translate", translate),
        (
            "floatingButton",
            object([
                ("enabled", json!({ "type": "boolean" })),
                ("position", json!({ "type": "number", "minimum": 0.0, "maximum": 1.0 })),
            ]),
        ),
        ("sideContent", object([("width", positive_integer())])),
    ]);
    if let Value::Object(map) = &mut root {
        map.insert("$schema".to_string(), json!("http://json-schema.org/draft-07/schema#"));
    }
    root
}

/// An object schema whose listed properties are all required.
fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    let properties: Map<String, Value> = fields
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({ "type": "object", "required": required, "properties": properties })
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn positive_integer() -> Value {
    json!({ "type": "integer", "minimum": 1 })
}

fn one_of(values: &[&str]) -> Value {
    json!({ "type": "string", "enum": values })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Finds the schema of a nested object section, e.g. `["translate", "page"]`.
fn section_mut<'a>(schema: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    let pointer: String = path.iter().map(|key| format!("/properties/{}", key)).collect();
    schema.pointer_mut(&pointer)
}

fn insert_optional(schema: &mut Value, name: &str, field: Value) {
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        properties.insert(name.to_string(), field);
    }
}

fn insert_required(schema: &mut Value, name: &str, field: Value) {
    insert_optional(schema, name, field);
    if let Some(Value::Array(required)) = schema.get_mut("required") {
        if !required.iter().any(|r| r == name) {
            required.push(Value::String(name.to_string()));
        }
    }
}

fn remove_field(schema: &mut Value, name: &str) {
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        properties.remove(name);
    }
    if let Some(Value::Array(required)) = schema.get_mut("required") {
        required.retain(|r| r != name);
    }
}

fn rename_field(schema: &mut Value, from: &str, to: &str) {
    let Some(field) = schema
        .get_mut("properties")
        .and_then(Value::as_object_mut)
        .and_then(|properties| properties.remove(from))
    else {
        return;
    };
    let was_required = schema
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|required| required.iter().any(|r| r == from));
    remove_field(schema, from);
    if was_required {
        insert_required(schema, to, field);
    } else {
        insert_optional(schema, to, field);
    }
}
