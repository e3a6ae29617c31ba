//! Response schema checks
//!
//! Only the subset of JSON Schema the API contract needs: a `required`
//! list and per-property primitive `type`s. Type checks are taken from the
//! schema's `properties`, so a schema change is picked up without code edits.

use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Schema of the body returned by `POST /api/users`
pub fn user_schema() -> Value {
    json!({
        "definitions": {},
        "$schema": "userSchema",
        "$id": "userSchema",
        "title": "Root",
        "type": "object",
        "required": ["id", "name", "job", "createdAt"],
        "properties": {
            "id": { "$id": "#root/id", "title": "id", "type": "string", "default": "" },
            "name": { "$id": "#root/name", "title": "name", "type": "string", "default": "" },
            "job": { "$id": "#root/job", "title": "job", "type": "string", "default": "" },
            "createdAt": { "$id": "#root/createdAt", "title": "createdAt", "type": "string", "default": "" }
        }
    })
}

/// JSON type name as used by schema `type` keywords
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
        other => json_type(value) == other,
    }
}

/// Validate `body` against `schema`.
///
/// Every `required` field must be present. Every property declared with a
/// `type` that is present in the body must have that type.
pub fn validate(schema: &Value, body: &Value) -> Result<()> {
    let object = body.as_object().ok_or_else(|| Error::FieldType {
        field: "$".to_string(),
        expected: "object".to_string(),
        actual: json_type(body).to_string(),
    })?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                return Err(Error::MissingField(field.to_string()));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (field, spec) in properties {
            let Some(expected) = spec.get("type").and_then(Value::as_str) else {
                continue;
            };
            let Some(value) = object.get(field) else {
                continue;
            };
            if !type_matches(expected, value) {
                return Err(Error::FieldType {
                    field: field.clone(),
                    expected: expected.to_string(),
                    actual: json_type(value).to_string(),
                });
            }
        }
    }

    Ok(())
}
