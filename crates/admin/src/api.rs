//! The item API seam the admin pages talk to.
//!
//! One record at a time: fetch it with per-field edit-mode metadata, update
//! it with a changed-fields-only delta, or delete it. The server shapes
//! errors GraphQL-style: each carries a path, and the path's depth decides
//! whether it is a field-level validation failure (depth > 1) or a
//! request-level failure (depth == 1).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use sundry_core::FieldMode;

/// The kind of a field, which fixes its equality, validation, and
/// serialization rules. Fields carry framework-specific encodings, so
/// generic structural equality is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain text. Empty string and null are the same value.
    Text,
    /// Integer-valued (prices, quantities).
    Integer,
    /// Boolean. Null normalizes to false.
    Checkbox,
    /// Reference to another record, encoded as `{ "id": ... }` or null.
    Relationship,
    /// Opaque structured content compared structurally.
    Document,
}

impl FieldKind {
    /// Deserialize a server value into the edit-buffer encoding.
    #[must_use]
    pub fn deserialize(&self, server: &Value) -> Value {
        match self {
            Self::Text => match server {
                Value::Null => Value::String(String::new()),
                other => other.clone(),
            },
            Self::Checkbox => Value::Bool(server.as_bool().unwrap_or(false)),
            Self::Integer | Self::Relationship | Self::Document => server.clone(),
        }
    }

    /// Serialize a buffer value back into the wire encoding for an update.
    #[must_use]
    pub fn serialize(&self, buffer: &Value) -> Value {
        match self {
            Self::Text => match buffer {
                Value::String(s) if s.is_empty() => Value::Null,
                other => other.clone(),
            },
            Self::Integer | Self::Checkbox | Self::Relationship | Self::Document => {
                buffer.clone()
            }
        }
    }

    /// Field-specific equality between two buffer-encoded values.
    #[must_use]
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Text => as_text(a) == as_text(b),
            Self::Checkbox => a.as_bool().unwrap_or(false) == b.as_bool().unwrap_or(false),
            Self::Integer => a.as_i64() == b.as_i64(),
            Self::Relationship => relationship_id(a) == relationship_id(b),
            Self::Document => a == b,
        }
    }

    /// Validate a buffer value. `required` comes from the field metadata.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message describing the violation.
    pub fn validate(&self, value: &Value, required: bool) -> Result<(), String> {
        match self {
            Self::Text => {
                if required && as_text(value).is_empty() {
                    return Err("This field is required".to_string());
                }
                Ok(())
            }
            Self::Integer => match value {
                Value::Null => {
                    if required {
                        Err("This field is required".to_string())
                    } else {
                        Ok(())
                    }
                }
                v if v.as_i64().is_some() => Ok(()),
                _ => Err("Must be a whole number".to_string()),
            },
            Self::Checkbox | Self::Document => Ok(()),
            Self::Relationship => match value {
                Value::Null => {
                    if required {
                        Err("This field is required".to_string())
                    } else {
                        Ok(())
                    }
                }
                v if relationship_id(v).is_some() => Ok(()),
                _ => Err("Must reference a record".to_string()),
            },
        }
    }
}

fn as_text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

fn relationship_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("id").map(ToString::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Server-decided metadata for one field in one view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field identifier, unique within the record.
    pub path: String,
    /// Human label.
    pub label: String,
    pub kind: FieldKind,
    pub mode: FieldMode,
    /// Whether an empty value fails validation.
    #[serde(default)]
    pub required: bool,
}

/// One field with its server-encoded value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemField {
    pub meta: FieldMeta,
    pub value: Value,
}

/// A record as fetched from the server: id plus field metadata and values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: String,
    pub fields: Vec<ItemField>,
}

impl ItemSnapshot {
    /// Look up a field by path.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&ItemField> {
        self.fields.iter().find(|f| f.meta.path == path)
    }
}

/// One GraphQL-shaped error from an update call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    pub message: String,
    /// Path depth > 1 means a field-level error; the field id is `path[1]`.
    pub path: Vec<String>,
}

impl ApiErrorEntry {
    /// The field this error belongs to, when it is field-level.
    #[must_use]
    pub fn field_path(&self) -> Option<&str> {
        if self.path.len() > 1 {
            self.path.get(1).map(String::as_str)
        } else {
            None
        }
    }
}

/// Result of an update: the fresh snapshot (when the server returned one)
/// plus any errors, field-level and top-level mixed.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    pub snapshot: Option<ItemSnapshot>,
    pub errors: Vec<ApiErrorEntry>,
}

/// Transport-level API failure. Treated like a top-level error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Transport(String),
}

/// Narrow contract to the hosting framework's item CRUD.
#[async_trait]
pub trait ItemApi: Send + Sync {
    /// Fetch one record with field-mode metadata.
    async fn fetch_item(&self, list: &str, id: &str) -> Result<ItemSnapshot, ApiError>;

    /// Update one record with a changed-fields-only delta.
    async fn update_item(
        &self,
        list: &str,
        id: &str,
        delta: BTreeMap<String, Value>,
    ) -> Result<UpdateResult, ApiError>;

    /// Delete one record.
    async fn delete_item(&self, list: &str, id: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_null_equals_empty() {
        let kind = FieldKind::Text;
        assert!(kind.values_equal(&Value::Null, &json!("")));
        assert!(!kind.values_equal(&json!("a"), &json!("")));
    }

    #[test]
    fn test_checkbox_null_equals_false() {
        let kind = FieldKind::Checkbox;
        assert!(kind.values_equal(&Value::Null, &json!(false)));
        assert!(!kind.values_equal(&Value::Null, &json!(true)));
    }

    #[test]
    fn test_relationship_compares_by_id() {
        let kind = FieldKind::Relationship;
        assert!(kind.values_equal(&json!({"id": 1, "label": "a"}), &json!({"id": 1})));
        assert!(!kind.values_equal(&json!({"id": 1}), &json!({"id": 2})));
    }

    #[test]
    fn test_text_serialize_empty_as_null() {
        assert_eq!(FieldKind::Text.serialize(&json!("")), Value::Null);
        assert_eq!(FieldKind::Text.serialize(&json!("x")), json!("x"));
    }

    #[test]
    fn test_integer_validation() {
        assert!(FieldKind::Integer.validate(&json!(3), false).is_ok());
        assert!(FieldKind::Integer.validate(&json!("3"), false).is_err());
        assert!(FieldKind::Integer.validate(&Value::Null, true).is_err());
    }

    #[test]
    fn test_error_entry_field_path() {
        let field_level = ApiErrorEntry {
            message: "bad".into(),
            path: vec!["updateItem".into(), "price".into()],
        };
        assert_eq!(field_level.field_path(), Some("price"));

        let top_level = ApiErrorEntry {
            message: "nope".into(),
            path: vec!["updateItem".into()],
        };
        assert_eq!(top_level.field_path(), None);
    }
}
