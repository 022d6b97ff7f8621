//! Field resolution: logical field key + record -> normalized, comparable value.
//!
//! Resolution is driven by a registry keyed on field name rather than by the
//! runtime type of the raw value. Fields without an entry fall back to plain
//! string coercion. Resolvers are total: missing or malformed input yields
//! [`FieldValue::Empty`].

use crate::record::{value_to_text, Record};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Why a field is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Discrete filtering, option derivation and display
    Display,
    /// Smart (free-text) matching
    Search,
}

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Empty,
    Text(String),
    Count(usize),
    List(Vec<String>),
}

impl FieldValue {
    fn text(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Single string form; lists join their elements with `,`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Count(n) => n.to_string(),
            Self::List(items) => items.join(","),
        }
    }

    /// Case-insensitive substring match. A list matches when any element does.
    /// `needle` must already be lowercase.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|v| v.to_lowercase().contains(needle)),
            other => other.as_text().to_lowercase().contains(needle),
        }
    }
}

pub type ResolveFn = dyn Fn(&Record, Purpose) -> FieldValue + Send + Sync;

/// A resolver bound to one field key.
#[derive(Clone)]
pub struct Resolver(Arc<ResolveFn>);

impl Resolver {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record, Purpose) -> FieldValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, record: &Record, purpose: Purpose) -> FieldValue {
        (self.0)(record, purpose)
    }

    /// String coercion of the raw value at `key`.
    pub fn plain(key: &str) -> Self {
        let key = key.to_string();
        Self::new(move |record, _| plain_value(record, &key))
    }

    /// Concatenation of named subfields of the object at `key`, separated by a
    /// space, with missing parts omitted and the result trimmed.
    pub fn composite(key: &str, parts: &[&str]) -> Self {
        let key = key.to_string();
        let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        Self::new(move |record, _| {
            let Some(Value::Object(obj)) = record.get(&key) else {
                return FieldValue::Empty;
            };
            let joined = parts
                .iter()
                .filter_map(|p| obj.get(p))
                .map(|v| value_to_text(v).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            FieldValue::text(joined)
        })
    }

    /// Array-valued field: element count for display, every element's string
    /// form for search. Object elements are represented by the first present
    /// of `label_keys`, else their compact JSON.
    pub fn collection(key: &str, label_keys: &[&str]) -> Self {
        let key = key.to_string();
        let label_keys: Vec<String> = label_keys.iter().map(|k| k.to_string()).collect();
        Self::new(move |record, purpose| {
            let Some(Value::Array(items)) = record.get(&key) else {
                return FieldValue::Empty;
            };
            match purpose {
                Purpose::Display => FieldValue::Count(items.len()),
                Purpose::Search => FieldValue::List(
                    items
                        .iter()
                        .map(|item| element_label(item, &label_keys))
                        .collect(),
                ),
            }
        })
    }

    /// Timestamp field formatted as a date string with a chrono format.
    pub fn temporal(key: &str, date_format: &str) -> Self {
        let key = key.to_string();
        let date_format = date_format.to_string();
        Self::new(move |record, _| {
            record
                .get(&key)
                .and_then(Value::as_str)
                .and_then(|raw| format_date(raw, &date_format))
                .map(FieldValue::text)
                .unwrap_or(FieldValue::Empty)
        })
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

fn plain_value(record: &Record, key: &str) -> FieldValue {
    record
        .get(key)
        .map(|v| FieldValue::text(value_to_text(v)))
        .unwrap_or(FieldValue::Empty)
}

fn element_label(item: &Value, label_keys: &[String]) -> String {
    if let Value::Object(obj) = item {
        if let Some(label) = label_keys.iter().find_map(|k| obj.get(k)) {
            return value_to_text(label);
        }
    }
    value_to_text(item)
}

/// Whether `date_format` is a chrono format string every date can be rendered with.
pub fn is_valid_date_format(date_format: &str) -> bool {
    !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error))
}

/// Parse an RFC 3339 timestamp, a naive datetime or a plain date and format it
/// in its own offset. Returns `None` for unparseable input or a format chrono
/// rejects.
pub fn format_date(raw: &str, date_format: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let date = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.date_naive()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.date()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        dt.date()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };
    let mut out = String::new();
    write!(out, "{}", date.format(date_format)).ok()?;
    Some(out)
}

/// Registry mapping field keys to resolvers.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    resolvers: HashMap<String, Resolver>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the resolver for `key`.
    pub fn register(&mut self, key: &str, resolver: Resolver) -> &mut Self {
        self.resolvers.insert(key.to_string(), resolver);
        self
    }

    pub fn with(mut self, key: &str, resolver: Resolver) -> Self {
        self.register(key, resolver);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolvers.contains_key(key)
    }

    pub fn resolve(&self, key: &str, record: &Record, purpose: Purpose) -> FieldValue {
        match self.resolvers.get(key) {
            Some(resolver) => resolver.resolve(record, purpose),
            None => plain_value(record, key),
        }
    }
}
