use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identity of a record, used for selection and de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity from a raw field value. Strings and numbers qualify; anything
    /// else (including an empty string) does not.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How raw page items are turned into records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    /// Field holding the record identity
    pub identity_field: String,
    /// Wrapper field unwrapped before reading (e.g. `{"item": {...}}`)
    pub envelope_field: Option<String>,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            identity_field: "id".to_string(),
            envelope_field: Some("item".to_string()),
        }
    }
}

impl RecordSchema {
    pub fn with_identity_field(identity_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
            ..Self::default()
        }
    }

    /// Build a record from a raw item. Returns `None` when the item is not an
    /// object or lacks a usable identity.
    pub fn ingest(&self, raw: Value) -> Option<Record> {
        let value = match (&self.envelope_field, raw) {
            (Some(envelope), Value::Object(mut map)) => match map.remove(envelope) {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    map.insert(envelope.clone(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            },
            (_, other) => other,
        };
        let Value::Object(fields) = value else {
            return None;
        };
        let id = fields
            .get(&self.identity_field)
            .and_then(RecordId::from_value)?;
        Some(Record::new(id, fields))
    }
}

/// One schema-flexible item of the explored collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: RecordId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a dotted path such as `customer.first_name`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// String form of a raw value. `null` is empty, arrays join their elements
/// with `,`, objects render as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}
