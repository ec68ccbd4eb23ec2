//! Typed view over a tool's JSON input schema.
//!
//! Tools declare their input contract as plain JSON Schema. The kernel only
//! needs the top-level property list (declared order, type, required flag)
//! to build action signatures; full validation goes through `jsonschema`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array(Box<ParamType>),
    Enum(Vec<String>),
    Any,
}

impl ParamType {
    /// Derive a parameter type from a JSON Schema property.
    pub fn from_schema(prop: &Value) -> Self {
        if let Some(values) = prop.get("enum").and_then(Value::as_array) {
            let variants = values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            return ParamType::Enum(variants);
        }

        match schema_type(prop) {
            Some("string") => ParamType::String,
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Number,
            Some("boolean") => ParamType::Boolean,
            Some("object") => ParamType::Object,
            Some("array") => {
                let item = prop
                    .get("items")
                    .map(ParamType::from_schema)
                    .unwrap_or(ParamType::Any);
                ParamType::Array(Box::new(item))
            }
            _ => ParamType::Any,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ParamType::Array(_))
    }

    /// Enum values, looking through one level of array.
    pub fn enum_values(&self) -> Option<&[String]> {
        match self {
            ParamType::Enum(values) => Some(values),
            ParamType::Array(inner) => inner.enum_values(),
            _ => None,
        }
    }
}

/// `type` may be a string or a list such as `["string", "null"]`.
fn schema_type(prop: &Value) -> Option<&str> {
    match prop.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single top-level property of a tool's input schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
}

/// Parse the top-level properties of an object schema, in declared order.
///
/// Non-object schemas yield an empty list.
pub fn params_from_schema(schema: &Value) -> Vec<ParamDef> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, prop)| ParamDef {
            name: name.clone(),
            param_type: ParamType::from_schema(prop),
            required: required.contains(&name.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_keep_declared_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "body": {"type": "string"},
                "assignee": {"type": "string"},
            },
            "required": ["title"],
        });
        let names: Vec<String> = params_from_schema(&schema)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["title", "body", "assignee"]);
    }

    #[test]
    fn test_required_flag() {
        let schema = json!({
            "type": "object",
            "properties": {"title": {"type": "string"}, "body": {"type": "string"}},
            "required": ["title"],
        });
        let params = params_from_schema(&schema);
        assert!(params[0].required);
        assert!(!params[1].required);
    }

    #[test]
    fn test_param_types() {
        assert_eq!(
            ParamType::from_schema(&json!({"type": "array", "items": {"type": "string"}})),
            ParamType::Array(Box::new(ParamType::String))
        );
        assert_eq!(
            ParamType::from_schema(&json!({"type": "string", "enum": ["low", "high"]})),
            ParamType::Enum(vec!["low".into(), "high".into()])
        );
        assert_eq!(
            ParamType::from_schema(&json!({"type": ["integer", "null"]})),
            ParamType::Integer
        );
        assert_eq!(ParamType::from_schema(&json!({})), ParamType::Any);
    }

    #[test]
    fn test_enum_values_through_array() {
        let pt = ParamType::from_schema(&json!({
            "type": "array",
            "items": {"type": "string", "enum": ["a", "b"]},
        }));
        assert!(pt.is_array());
        assert_eq!(pt.enum_values(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn test_non_object_schema_has_no_params() {
        assert!(params_from_schema(&json!({"type": "string"})).is_empty());
    }
}
