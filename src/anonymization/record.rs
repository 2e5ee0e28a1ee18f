//! Generic record representation
//!
//! A [`Record`] is one decoded message payload: an ordered JSON object with
//! an envelope section (`metadata`) and a schema-specific `data` section.
//! Field access for redaction is always relative to `data`, so the envelope
//! cannot be reached through a [`FieldPath`].

use crate::domain::errors::{DecodeError, FieldError};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Name of the envelope section
pub const METADATA_SECTION: &str = "metadata";

/// Name of the schema-specific section
pub const DATA_SECTION: &str = "data";

/// JSON type name used in error messages
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

/// Dotted path to a field inside the `data` section
///
/// `"user_dn"` addresses `data.user_dn`; `"client.host"` addresses
/// `data.client.host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    parents: Vec<String>,
    leaf: String,
}

impl FieldPath {
    /// Build a path from a dotted literal
    ///
    /// Empty segments are kept as-is; use [`FromStr`] for validated input.
    pub fn from_static(path: &'static str) -> Self {
        let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
        let leaf = segments.pop().unwrap_or_default();
        Self {
            parents: segments,
            leaf,
        }
    }

    /// Segments leading to the leaf
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Final segment
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// Path including the `data.` prefix, as it appears in the wire record
    pub fn qualified(&self) -> String {
        format!("{DATA_SECTION}.{self}")
    }

    fn qualified_prefix(&self, depth: usize) -> String {
        let mut path = DATA_SECTION.to_string();
        for segment in &self.parents[..depth] {
            path.push('.');
            path.push_str(segment);
        }
        path
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix(&format!("{DATA_SECTION}."))
            .unwrap_or(trimmed);
        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(format!("Invalid field path '{s}': empty segment"));
            }
            segments.push(segment.to_string());
        }
        let leaf = segments
            .pop()
            .ok_or_else(|| format!("Invalid field path '{s}'"))?;
        Ok(Self {
            parents: segments,
            leaf,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.parents {
            write!(f, "{segment}.")?;
        }
        f.write_str(&self.leaf)
    }
}

/// One decoded message payload
///
/// Key order is preserved, and fields no rule touches round-trip
/// unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Borrow the underlying object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Envelope section, if present and an object
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.fields.get(METADATA_SECTION).and_then(Value::as_object)
    }

    /// Schema-specific section, if present and an object
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.fields.get(DATA_SECTION).and_then(Value::as_object)
    }

    /// Whether the `data` section is present and an object
    pub fn has_data(&self) -> bool {
        self.data().is_some()
    }

    /// Value at `path`
    pub fn get(&self, path: &FieldPath) -> Result<&Value, FieldError> {
        self.parent(path)?
            .get(path.leaf())
            .ok_or_else(|| FieldError::Missing(path.qualified()))
    }

    /// String value at `path`
    ///
    /// Any other JSON type, including `null`, is a type mismatch.
    pub fn get_str(&self, path: &FieldPath) -> Result<&str, FieldError> {
        match self.get(path)? {
            Value::String(s) => Ok(s),
            other => Err(FieldError::TypeMismatch {
                path: path.qualified(),
                expected: "string",
                found: json_type(other),
            }),
        }
    }

    /// Replace the string at `path`
    ///
    /// The field must already exist and hold a string; nothing is added.
    pub fn replace_str(&mut self, path: &FieldPath, value: String) -> Result<(), FieldError> {
        let parent = self.parent_mut(path)?;
        match parent.get_mut(path.leaf()) {
            Some(Value::String(current)) => {
                *current = value;
                Ok(())
            }
            Some(other) => Err(FieldError::TypeMismatch {
                path: path.qualified(),
                expected: "string",
                found: json_type(other),
            }),
            None => Err(FieldError::Missing(path.qualified())),
        }
    }

    /// Remove the field at `path`, returning its value
    pub fn remove(&mut self, path: &FieldPath) -> Result<Value, FieldError> {
        self.parent_mut(path)?
            .shift_remove(path.leaf())
            .ok_or_else(|| FieldError::Missing(path.qualified()))
    }

    fn parent(&self, path: &FieldPath) -> Result<&Map<String, Value>, FieldError> {
        let mut current = match self.fields.get(DATA_SECTION) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(FieldError::NotAnObject {
                    path: DATA_SECTION.to_string(),
                    found: json_type(other),
                })
            }
            None => return Err(FieldError::Missing(path.qualified())),
        };
        for (depth, segment) in path.parents().iter().enumerate() {
            current = match current.get(segment) {
                Some(Value::Object(map)) => map,
                Some(other) => {
                    return Err(FieldError::NotAnObject {
                        path: path.qualified_prefix(depth + 1),
                        found: json_type(other),
                    })
                }
                None => return Err(FieldError::Missing(path.qualified())),
            };
        }
        Ok(current)
    }

    fn parent_mut(&mut self, path: &FieldPath) -> Result<&mut Map<String, Value>, FieldError> {
        let mut current = match self.fields.get_mut(DATA_SECTION) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(FieldError::NotAnObject {
                    path: DATA_SECTION.to_string(),
                    found: json_type(other),
                })
            }
            None => return Err(FieldError::Missing(path.qualified())),
        };
        for (depth, segment) in path.parents().iter().enumerate() {
            current = match current.get_mut(segment) {
                Some(Value::Object(map)) => map,
                Some(other) => {
                    return Err(FieldError::NotAnObject {
                        path: path.qualified_prefix(depth + 1),
                        found: json_type(other),
                    })
                }
                None => return Err(FieldError::Missing(path.qualified())),
            };
        }
        Ok(current)
    }
}

impl TryFrom<Value> for Record {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DecodeError::NotAnObject(json_type(&other))),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_field_path_parse() {
        let path: FieldPath = "user_dn".parse().unwrap();
        assert!(path.parents().is_empty());
        assert_eq!(path.leaf(), "user_dn");
        assert_eq!(path.qualified(), "data.user_dn");

        let nested: FieldPath = "data.client.host".parse().unwrap();
        assert_eq!(nested.parents(), &["client".to_string()]);
        assert_eq!(nested.to_string(), "client.host");

        assert!("".parse::<FieldPath>().is_err());
        assert!("a..b".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_get_str() {
        let rec = record(json!({"data": {"user_dn": "CN=Alice", "read_bytes": 10}}));
        let user = FieldPath::from_static("user_dn");
        assert_eq!(rec.get_str(&user).unwrap(), "CN=Alice");

        let bytes = FieldPath::from_static("read_bytes");
        assert_eq!(
            rec.get_str(&bytes).unwrap_err(),
            FieldError::TypeMismatch {
                path: "data.read_bytes".to_string(),
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn test_missing_paths() {
        let rec = record(json!({"metadata": {"producer": "cmssw"}}));
        let path = FieldPath::from_static("user_dn");
        assert!(rec.get(&path).unwrap_err().is_missing());

        let rec = record(json!({"data": {"client": {}}}));
        let nested = FieldPath::from_static("client.host");
        assert!(rec.get(&nested).unwrap_err().is_missing());
        let deeper = FieldPath::from_static("server.host");
        assert!(rec.get(&deeper).unwrap_err().is_missing());
    }

    #[test]
    fn test_not_an_object() {
        let rec = record(json!({"data": {"client": "host-1"}}));
        let nested = FieldPath::from_static("client.host");
        assert_eq!(
            rec.get(&nested).unwrap_err(),
            FieldError::NotAnObject {
                path: "data.client".to_string(),
                found: "string",
            }
        );

        let rec = record(json!({"data": [1, 2]}));
        assert!(matches!(
            rec.get(&FieldPath::from_static("x")),
            Err(FieldError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_replace_str_only_existing_strings() {
        let mut rec = record(json!({"data": {"user_dn": "CN=Alice", "fallback": true}}));
        rec.replace_str(&FieldPath::from_static("user_dn"), "x".to_string())
            .unwrap();
        assert_eq!(rec.data().unwrap()["user_dn"], json!("x"));

        let err = rec
            .replace_str(&FieldPath::from_static("fallback"), "x".to_string())
            .unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { found: "boolean", .. }));

        let err = rec
            .replace_str(&FieldPath::from_static("absent"), "x".to_string())
            .unwrap_err();
        assert!(err.is_missing());
        assert!(!rec.data().unwrap().contains_key("absent"));
    }

    #[test]
    fn test_remove_keeps_order_of_remaining_fields() {
        let mut rec = record(json!({"data": {"a": 1, "b": 2, "c": 3}}));
        let removed = rec.remove(&FieldPath::from_static("b")).unwrap();
        assert_eq!(removed, json!(2));
        let keys: Vec<&String> = rec.data().unwrap().keys().collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn test_envelope_accessors() {
        let rec = record(json!({"metadata": {"producer": "cmssw"}, "data": {}}));
        assert_eq!(rec.metadata().unwrap()["producer"], json!("cmssw"));
        assert!(rec.has_data());
        assert!(!Record::default().has_data());
    }

    #[test]
    fn test_try_from_non_object() {
        assert!(matches!(
            Record::try_from(json!([1, 2])),
            Err(DecodeError::NotAnObject("array"))
        ));
        assert!(matches!(
            Record::try_from(json!("text")),
            Err(DecodeError::NotAnObject("string"))
        ));
    }
}
