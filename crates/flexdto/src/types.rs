//! Runtime value model
//!
//! Loosely-typed DTO input and cast output share one enum. Key-value aggregates,
//! structured objects and collections are kept apart because the casts treat
//! them differently.

use chrono::{DateTime, FixedOffset};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Layout used when a date is rendered as text
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Value Enum
// ============================================================================

/// Runtime value stored in (and read from) a DTO
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// Ordered sequence of values
    List(Vec<Value>),
    /// Key-value aggregate (insertion ordered)
    Map(Vec<(String, Value)>),
    /// Structured object with named fields
    Record(Record),
    /// Calendar date/time
    Date(DateTime<FixedOffset>),
    /// Ordered collection produced by the `collection` cast
    Collection(Collection),
}

impl Value {
    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Map(_) => "map",
            Self::Record(_) => "object",
            Self::Date(_) => "date",
            Self::Collection(_) => "collection",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, blank strings and empty aggregates count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(fields) => fields.is_empty(),
            Self::Collection(c) => c.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Look up a field of a map or record
    pub fn field(&self, key: &str) -> Option<&Value> {
        let fields = match self {
            Self::Map(fields) => fields.as_slice(),
            Self::Record(record) => record.fields(),
            _ => return None,
        };
        fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Borrowing conversion to JSON
    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => f.write_str("array"),
            Self::Record(record) => match record.display() {
                Some(text) => f.write_str(text),
                None => write!(f, "object({})", record.type_name()),
            },
            Self::Date(d) => write!(f, "{}", d.format(DATE_DISPLAY_FORMAT)),
            Self::Collection(c) => write!(f, "{}", c.to_json()),
        }
    }
}

// ============================================================================
// Record - structured objects
// ============================================================================

/// A structured object: named fields plus an optional string conversion
///
/// A record without a string conversion cannot be cast to `string`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
    display: Option<String>,
}

impl Record {
    /// Create an empty record of the given type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            display: None,
        }
    }

    /// Build a record whose fields are keyed by position, like a list turned object
    pub fn from_list(type_name: impl Into<String>, items: Vec<Value>) -> Self {
        let mut record = Self::new(type_name);
        record.fields = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        record
    }

    /// Add a field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Give the record a string conversion
    pub fn with_display(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Ordered collection of values, each with an optional key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    items: Vec<(Option<String>, Value)>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection of unkeyed values
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            items: values.into_iter().map(|v| (None, v)).collect(),
        }
    }

    /// Collection of keyed values
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            items: pairs.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push((None, value));
    }

    /// All values, keys dropped
    pub fn all(&self) -> Vec<Value> {
        self.items.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Value)> {
        self.items.iter().map(|(k, v)| (k.as_deref(), v))
    }

    /// Value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v)
    }

    /// Value by position
    pub fn nth(&self, index: usize) -> Option<&Value> {
        self.items.get(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any item carries a key
    pub fn is_keyed(&self) -> bool {
        self.items.iter().any(|(k, _)| k.is_some())
    }

    /// Plain list (unkeyed) or map (keyed, unkeyed items keyed by position)
    pub fn into_value(self) -> Value {
        if !self.is_keyed() {
            return Value::List(self.items.into_iter().map(|(_, v)| v).collect());
        }
        Value::Map(
            self.items
                .into_iter()
                .enumerate()
                .map(|(i, (k, v))| (k.unwrap_or_else(|| i.to_string()), v))
                .collect(),
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into_value().into()
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::Date(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Collection> for Value {
    fn from(c: Collection) -> Self {
        Value::Collection(c)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => {
                Value::Map(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
            Value::Record(record) => serde_json::Value::Object(
                record
                    .into_fields()
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect(),
            ),
            Value::Date(d) => serde_json::Value::String(d.to_rfc3339()),
            Value::Collection(c) => c.into_value().into(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(fields) => serialize_fields(fields, serializer),
            Value::Record(record) => serialize_fields(record.fields(), serializer),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            Value::Collection(c) => c.clone().into_value().serialize(serializer),
        }
    }
}

/// Serialize ordered key/value pairs as a map
pub(crate) fn serialize_fields<S: Serializer>(
    fields: &[(String, Value)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (key, value) in fields {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

// ============================================================================
// Tests
// ============================================================================
