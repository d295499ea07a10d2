//! Response schemas for structured text generation.
//!
//! Each schema is derived from its response type, sent to the text-generation
//! backend as a JSON Schema and checked locally on the way back: a backend that
//! ignores the requested format must not leak malformed data into the pipeline.

use jsonschema::JSONSchema;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VpError};

/// A named JSON Schema for a structured response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

/// `{ persons: [{ name: string }] }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NamesResponse {
    pub persons: Vec<NameEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NameEntry {
    pub name: String,
}

/// `{ biography: string, status: string }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BiographyResponse {
    pub biography: String,
    pub status: String,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Schema named `name` derived from `T`, with nested types inlined.
    pub fn for_type<T: JsonSchema>(name: impl Into<String>) -> Self {
        let settings = SchemaSettings::draft07().with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        });
        let root = settings.into_generator().into_root_schema_for::<T>();
        Self::new(name, serde_json::to_value(root).unwrap_or_default())
    }

    /// Schema of the candidate-names response.
    pub fn names() -> Self {
        Self::for_type::<NamesResponse>("persons_names")
    }

    /// Schema of the biography/status response.
    pub fn biography() -> Self {
        Self::for_type::<BiographyResponse>("person_biography")
    }

    /// Checks `value` against the schema. All violations are reported, each
    /// prefixed with the offending path (`$.persons[1].name`).
    pub fn validate(&self, value: &Value) -> Result<()> {
        let compiled = JSONSchema::compile(&self.schema)
            .map_err(|e| VpError::schema(&self.name, format!("invalid schema: {e}")))?;

        let violations: Vec<String> = match compiled.validate(value) {
            Ok(()) => return Ok(()),
            Err(errors) => errors
                .map(|error| {
                    let path = json_path(&error.instance_path.to_string(), value);
                    format!("{path}: {error}")
                })
                .collect(),
        };

        Err(VpError::schema(&self.name, violations.join("; ")))
    }

    /// Validates `value` and deserializes it into `T`.
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| VpError::schema(&self.name, e.to_string()))
    }
}

/// Renders a JSON pointer (`/persons/1/name`) as `$.persons[1].name`, using
/// the instance to tell array indices from object keys.
fn json_path(pointer: &str, instance: &Value) -> String {
    let mut path = String::from("$");
    let mut node = Some(instance);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        let index = match node {
            Some(Value::Array(_)) => segment.parse::<usize>().ok(),
            _ => None,
        };

        match index {
            Some(index) => {
                path.push_str(&format!("[{index}]"));
                node = node.and_then(|n| n.get(index));
            }
            None => {
                path.push('.');
                path.push_str(&segment);
                node = node.and_then(|n| n.get(segment.as_str()));
            }
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_schemas_are_closed_and_complete() {
        let names = ResponseSchema::names().schema;
        assert_eq!(names["type"], "object");
        assert_eq!(names["additionalProperties"], false);
        assert_eq!(names["required"], json!(["persons"]));
        let entry = &names["properties"]["persons"]["items"];
        assert_eq!(entry["additionalProperties"], false);
        assert_eq!(entry["properties"]["name"]["type"], "string");
        assert!(names.get("$schema").is_none());

        let biography = ResponseSchema::biography().schema;
        assert_eq!(biography["additionalProperties"], false);
        assert_eq!(biography["required"], json!(["biography", "status"]));
    }

    #[test]
    fn test_json_path_rendering() {
        let value = json!({ "persons": [{ "name": "A" }, { "a/b": 1 }] });
        assert_eq!(json_path("", &value), "$");
        assert_eq!(json_path("/persons/1/name", &value), "$.persons[1].name");
        assert_eq!(json_path("/persons/1/a~1b", &value), "$.persons[1].a/b");
    }

    #[test]
    fn test_names_schema_accepts_conforming_response() {
        let value = json!({ "persons": [{ "name": "Jane Doe" }, { "name": "John Roe" }] });
        let parsed: NamesResponse = ResponseSchema::names().parse(value).unwrap();
        assert_eq!(parsed.persons.len(), 2);
        assert_eq!(parsed.persons[1].name, "John Roe");
    }

    #[test]
    fn test_names_schema_accepts_empty_list() {
        let parsed: NamesResponse = ResponseSchema::names().parse(json!({ "persons": [] })).unwrap();
        assert!(parsed.persons.is_empty());
    }

    #[test]
    fn test_names_schema_rejects_bad_shapes() {
        let schema = ResponseSchema::names();
        let bad = [
            json!({ "people": [] }),
            json!({ "persons": {} }),
            json!({ "persons": [{ "name": 3 }] }),
            json!({ "persons": [{ "name": "A", "age": 33 }] }),
            json!({ "persons": [], "note": "extra" }),
            json!({ "persons": [{}] }),
            json!(["Jane Doe"]),
        ];
        for value in bad {
            let err = schema.validate(&value).unwrap_err();
            assert!(err.is_schema(), "expected schema error for {value}");
        }
    }

    #[test]
    fn test_biography_schema() {
        let schema = ResponseSchema::biography();
        let ok: BiographyResponse = schema
            .parse(json!({ "biography": "Grew up in Lyon.", "status": "Founder" }))
            .unwrap();
        assert_eq!(ok.status, "Founder");

        assert!(schema.validate(&json!({ "biography": "x" })).is_err());
        assert!(
            schema
                .validate(&json!({ "biography": "x", "status": "y", "age": 35 }))
                .is_err()
        );
        assert!(schema.validate(&json!({ "biography": "x", "status": null })).is_err());
    }

    #[test]
    fn test_error_message_points_at_offending_path() {
        let err = ResponseSchema::names()
            .validate(&json!({ "persons": [{ "name": "A" }, { "name": false }] }))
            .unwrap_err();
        assert!(err.to_string().contains("$.persons[1].name"), "{err}");
    }
}
