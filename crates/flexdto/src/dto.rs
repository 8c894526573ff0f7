//! Data transfer object core
//!
//! A [`Dto`] pairs a shared [`DtoSchema`] with a backing store of raw values keyed
//! by canonical property name. Names are resolved once, during construction;
//! casts run on every read and never touch the store.
//!
//! # Example
//!
//! ```
//! use flexdto::{CastKind, Dto, DtoSchema, Value};
//!
//! let schema = DtoSchema::new("Movie")
//!     .properties(["title", "oscars", "released"])
//!     .cast("oscars", CastKind::Integer)
//!     .shared();
//!
//! let movie = Dto::new(
//!     schema,
//!     Value::Map(vec![("title".into(), "The Godfather".into()), ("oscars".into(), "3".into())]),
//! )
//! .unwrap();
//!
//! assert_eq!(movie.get("oscars", Value::Null).unwrap(), Value::Int(3));
//! assert_eq!(movie.call("getTitle").unwrap(), Value::from("The Godfather"));
//! assert_eq!(movie.property("released").unwrap(), Value::Null);
//! ```

use crate::casts::{self, CastKind};
use crate::config::DtoSchema;
use crate::errors::{DtoError, Result};
use crate::naming;
use crate::resolver::{PropertyResolver, Whitelist};
use crate::types::{Collection, Value};
use chrono::{DateTime, FixedOffset};
use serde::ser::{Error as _, Serialize, Serializer};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Construction Input
// ============================================================================

/// Raw input accepted by [`Dto::new`]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DtoInput {
    /// Nothing supplied; the DTO is neither populated nor validated
    #[default]
    Empty,
    /// Key/value pairs routed through name resolution
    Mapping(Vec<(String, Value)>),
    /// Arguments matched to the whitelist by position
    Positional(Vec<Value>),
}

impl DtoInput {
    /// Positional arguments
    pub fn args<I, V>(args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        DtoInput::Positional(args.into_iter().map(Into::into).collect())
    }
}

fn indexed(items: Vec<Value>) -> Vec<(String, Value)> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

impl From<Value> for DtoInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DtoInput::Empty,
            Value::Map(fields) => DtoInput::Mapping(fields),
            Value::List(items) => DtoInput::Mapping(indexed(items)),
            Value::Record(record) => DtoInput::Mapping(record.into_fields()),
            Value::Collection(collection) => match collection.into_value() {
                Value::Map(fields) => DtoInput::Mapping(fields),
                Value::List(items) => DtoInput::Mapping(indexed(items)),
                other => DtoInput::Positional(vec![other]),
            },
            other => DtoInput::Positional(vec![other]),
        }
    }
}

impl From<serde_json::Value> for DtoInput {
    fn from(value: serde_json::Value) -> Self {
        Value::from(value).into()
    }
}

impl<K, V> From<Vec<(K, V)>> for DtoInput
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        DtoInput::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ============================================================================
// DTO
// ============================================================================

/// Where a read lands in the backing store
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Stored(&'a str, &'a Value),
    Unset,
}

/// A populated, read-only data transfer object
#[derive(Debug, Clone)]
pub struct Dto {
    schema: Arc<DtoSchema>,
    data: Vec<(String, Value)>,
}

impl Dto {
    /// Populate a DTO and run its validation, if declared
    ///
    /// Construction is all-or-nothing: any resolution or validation error is
    /// returned instead of the instance.
    pub fn new(schema: Arc<DtoSchema>, input: impl Into<DtoInput>) -> Result<Self> {
        let mut dto = Dto {
            schema,
            data: Vec::new(),
        };

        match input.into() {
            DtoInput::Empty => return Ok(dto),
            DtoInput::Positional(args) if args.is_empty() => return Ok(dto),
            DtoInput::Mapping(pairs) => dto.populate(pairs)?,
            DtoInput::Positional(args) => dto.populate_positional(args),
        }

        debug!(
            "Populated {} with {} properties",
            dto.schema.name(),
            dto.data.len()
        );

        if let Some(validation) = dto.schema.declared_validation() {
            let errors = validation.run(&dto);
            if !errors.is_empty() {
                debug!(
                    "Validation of {} failed with {} errors",
                    dto.schema.name(),
                    errors.len()
                );
                return Err(DtoError::ValidationFailed(errors));
            }
        }

        Ok(dto)
    }

    /// DTO with nothing populated
    pub fn empty(schema: Arc<DtoSchema>) -> Self {
        Dto {
            schema,
            data: Vec::new(),
        }
    }

    /// Populate from positional arguments
    pub fn from_args<I, V>(schema: Arc<DtoSchema>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Dto::new(schema, DtoInput::args(args))
    }

    fn populate(&mut self, pairs: Vec<(String, Value)>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let resolver = PropertyResolver::new(schema.whitelist(), schema.flags());

        for (key, value) in pairs {
            if let Some(name) = resolver.resolve(&key)? {
                self.store(name, value);
            }
        }
        Ok(())
    }

    fn populate_positional(&mut self, args: Vec<Value>) {
        let schema = Arc::clone(&self.schema);
        match schema.whitelist() {
            Whitelist::Any => {
                for (name, value) in indexed(args) {
                    self.store(name, value);
                }
            }
            Whitelist::Only(names) => {
                for (name, value) in names.iter().zip(args) {
                    self.store(name.clone(), value);
                }
            }
        }
    }

    /// Overwrites keep the key's first position
    fn store(&mut self, name: String, value: Value) {
        match self.data.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.data.push((name, value)),
        }
    }

    pub fn schema(&self) -> &DtoSchema {
        &self.schema
    }

    /// Whether the canonical name was populated
    pub fn has(&self, name: &str) -> bool {
        self.data.iter().any(|(k, _)| k == name)
    }

    /// Cast value of a populated property, or `default`
    pub fn get(&self, name: &str, default: impl Into<Value>) -> Result<Value> {
        match self.raw(name) {
            Some(raw) => self.cast(name, raw),
            None => Ok(default.into()),
        }
    }

    /// Typed read; `None` when the value is null
    ///
    /// ```
    /// use flexdto::{Dto, DtoInput, DtoSchema};
    ///
    /// let schema = DtoSchema::new("Movie").properties(["title", "oscars"]).shared();
    /// let movie = Dto::new(schema, DtoInput::args(["The Godfather", "3"])).unwrap();
    ///
    /// assert_eq!(movie.get_as::<i64>("oscars").unwrap(), Some(3));
    /// assert_eq!(movie.get_as::<String>("title").unwrap().as_deref(), Some("The Godfather"));
    /// ```
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        let value = self.property(name)?;
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(name, value).map(Some)
    }

    /// Dynamic property read by exact, snake_case or camelCase spelling
    pub fn property(&self, name: &str) -> Result<Value> {
        self.read(name, self.locate(name))
    }

    /// Zero-argument method read: the property itself or its `getXxx` form
    pub fn call(&self, method: &str) -> Result<Value> {
        let direct = self.locate(method);
        if let Some(Slot::Stored(..)) = direct {
            return self.read(method, direct);
        }

        if let Some(rest) = method.strip_prefix("get").filter(|rest| !rest.is_empty()) {
            let getter = self.locate(&naming::camel(rest));
            if matches!(getter, Some(Slot::Stored(..))) || (direct.is_none() && getter.is_some()) {
                return self.read(method, getter);
            }
        }

        self.read(method, direct)
    }

    /// Raw backing store, in insertion order
    pub fn get_original(&self) -> &[(String, Value)] {
        &self.data
    }

    /// Supplied properties only, cast
    pub fn get_populated(&self) -> Result<Vec<(String, Value)>> {
        self.data
            .iter()
            .map(|(name, raw)| Ok((name.clone(), self.cast(name, raw)?)))
            .collect()
    }

    /// Every property, cast; unset whitelist entries are `Null`
    ///
    /// Whitelist declaration order, or insertion order for a wildcard.
    pub fn get_all(&self) -> Result<Vec<(String, Value)>> {
        match self.schema.whitelist() {
            Whitelist::Any => self.get_populated(),
            Whitelist::Only(names) => names
                .iter()
                .map(|name| {
                    let value = match self.raw(name) {
                        Some(raw) => self.cast(name, raw)?,
                        None => Value::Null,
                    };
                    Ok((name.clone(), value))
                })
                .collect(),
        }
    }

    /// Like [`Dto::get_all`], without null or empty values
    pub fn get_filled(&self) -> Result<Vec<(String, Value)>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect())
    }

    /// JSON object of [`Dto::get_all`]
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Object(
            self.get_all()?
                .into_iter()
                .map(|(name, value)| (name, value.to_json()))
                .collect(),
        ))
    }

    fn raw(&self, name: &str) -> Option<&Value> {
        self.data.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    fn cast(&self, name: &str, raw: &Value) -> Result<Value> {
        casts::cast(name, raw, self.schema.cast_for(name))
    }

    /// `None` means the name is not allowed
    fn locate(&self, name: &str) -> Option<Slot<'_>> {
        let stored = self
            .data
            .iter()
            .find(|(k, _)| k == name)
            .or_else(|| self.data.iter().find(|(k, _)| naming::equivalent(name, k)));
        if let Some((key, raw)) = stored {
            return Some(Slot::Stored(key, raw));
        }

        match self.schema.whitelist() {
            Whitelist::Any => Some(Slot::Unset),
            Whitelist::Only(names) => names
                .iter()
                .any(|n| naming::equivalent(name, n))
                .then_some(Slot::Unset),
        }
    }

    fn read(&self, name: &str, slot: Option<Slot<'_>>) -> Result<Value> {
        match slot {
            Some(Slot::Stored(key, raw)) => self.cast(key, raw),
            Some(Slot::Unset) => Ok(Value::Null),
            None => Err(DtoError::PropertyNotAllowed(name.to_string())),
        }
    }
}

impl Serialize for Dto {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self.get_all().map_err(S::Error::custom)?;
        crate::types::serialize_fields(&fields, serializer)
    }
}

// ============================================================================
// Typed Reads
// ============================================================================

/// Conversion of a cast property value into a Rust type
pub trait FromValue: Sized {
    fn from_value(property: &str, value: Value) -> Result<Self>;
}

fn coerce(property: &str, value: &Value, kind: CastKind) -> Result<Value> {
    casts::cast(property, value, Some(&kind))
}

impl FromValue for Value {
    fn from_value(_property: &str, value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(_property: &str, value: Value) -> Result<Self> {
        Ok(casts::to_bool(&value))
    }
}

impl FromValue for i64 {
    fn from_value(property: &str, value: Value) -> Result<Self> {
        coerce(property, &value, CastKind::Integer)?
            .as_i64()
            .ok_or_else(|| DtoError::cast_failed(property, "integer", &value))
    }
}

impl FromValue for f64 {
    fn from_value(property: &str, value: Value) -> Result<Self> {
        coerce(property, &value, CastKind::Float)?
            .as_f64()
            .ok_or_else(|| DtoError::cast_failed(property, "float", &value))
    }
}

impl FromValue for String {
    fn from_value(property: &str, value: Value) -> Result<Self> {
        match coerce(property, &value, CastKind::String)? {
            Value::String(s) => Ok(s),
            _ => Err(DtoError::cast_failed(property, "string", &value)),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(property: &str, value: Value) -> Result<Self> {
        match coerce(property, &value, CastKind::Date)? {
            Value::Date(date) => Ok(date),
            _ => Err(DtoError::cast_failed(property, "date", &value)),
        }
    }
}

impl FromValue for Collection {
    fn from_value(property: &str, value: Value) -> Result<Self> {
        match coerce(property, &value, CastKind::Collection)? {
            Value::Collection(collection) => Ok(collection),
            _ => Err(DtoError::cast_failed(property, "collection", &value)),
        }
    }
}

// ============================================================================
// Typed DTOs
// ============================================================================

/// A typed wrapper declaring its schema once
///
/// ```
/// use flexdto::{DataTransferObject, Dto, DtoSchema};
/// use std::sync::Arc;
///
/// struct Movie(Dto);
///
/// impl DataTransferObject for Movie {
///     fn schema() -> Arc<DtoSchema> {
///         DtoSchema::new("Movie").properties(["title"]).shared()
///     }
///
///     fn from_dto(dto: Dto) -> Self {
///         Movie(dto)
///     }
/// }
///
/// let movie = Movie::make(vec![("title", "Heat")]).unwrap();
/// assert!(movie.0.has("title"));
/// ```
pub trait DataTransferObject: Sized {
    fn schema() -> Arc<DtoSchema>;

    fn from_dto(dto: Dto) -> Self;

    fn make(input: impl Into<DtoInput>) -> Result<Self> {
        Dto::new(Self::schema(), input).map(Self::from_dto)
    }
}
