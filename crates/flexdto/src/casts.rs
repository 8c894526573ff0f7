//! Read-time value casting
//!
//! A property either has no cast (the raw value is returned as stored), one of
//! the built-in primitive casts, or a custom cast implementing [`CastsProperty`].
//! Casting is a pure function of the property name, the raw value and the cast
//! kind; it never touches the DTO's backing store.
//!
//! # Example
//!
//! ```
//! use flexdto::casts::{cast, CastKind};
//! use flexdto::Value;
//!
//! let value = cast("oscars", &Value::from("3"), Some(&CastKind::Integer)).unwrap();
//! assert_eq!(value, Value::Int(3));
//!
//! let flag = cast("released", &Value::from("0"), Some(&CastKind::Boolean)).unwrap();
//! assert_eq!(flag, Value::Bool(false));
//! ```

use crate::dates;
use crate::errors::{DtoError, Result};
use crate::types::{Collection, Value, DATE_DISPLAY_FORMAT};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Custom Cast Trait
// ============================================================================

/// A user-supplied cast
///
/// Any error returned from `cast`, and any panic inside it, is reported to the
/// caller as a cast failure of kind `type` for the property being read.
///
/// ```
/// use flexdto::casts::CastsProperty;
/// use flexdto::Value;
///
/// #[derive(Default)]
/// struct Uppercase;
///
/// impl CastsProperty for Uppercase {
///     fn cast(&self, value: &Value) -> anyhow::Result<Value> {
///         match value {
///             Value::String(s) => Ok(Value::String(s.to_uppercase())),
///             other => anyhow::bail!("cannot uppercase {}", other.type_name()),
///         }
///     }
/// }
/// ```
pub trait CastsProperty: Send + Sync {
    /// Transform a raw value
    fn cast(&self, value: &Value) -> anyhow::Result<Value>;

    /// Name used in debug output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared custom cast for dynamic dispatch
pub type BoxedCast = Arc<dyn CastsProperty>;

/// Function-based custom cast
pub struct FnCast<F>
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnCast<F>
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> CastsProperty for FnCast<F>
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync,
{
    fn cast(&self, value: &Value) -> anyhow::Result<Value> {
        (self.func)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Cast Kind
// ============================================================================

/// Declared cast of a property
#[derive(Clone)]
pub enum CastKind {
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Date,
    Collection,
    /// User-supplied cast
    Custom(BoxedCast),
}

impl CastKind {
    /// Instantiate a custom cast through its `Default` implementation
    pub fn custom<T: CastsProperty + Default + 'static>() -> Self {
        CastKind::Custom(Arc::new(T::default()))
    }

    /// Wrap an existing custom cast instance
    pub fn with(cast: impl CastsProperty + 'static) -> Self {
        CastKind::Custom(Arc::new(cast))
    }

    /// Name reported in error messages
    pub fn name(&self) -> &str {
        match self {
            CastKind::Boolean => "boolean",
            CastKind::Integer => "integer",
            CastKind::Float => "float",
            CastKind::String => "string",
            CastKind::Array => "array",
            CastKind::Date => "date",
            CastKind::Collection => "collection",
            CastKind::Custom(_) => "type",
        }
    }
}

impl fmt::Debug for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastKind::Custom(cast) => write!(f, "Custom({})", cast.name()),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for CastKind {
    type Err = DtoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "bool" | "boolean" => Ok(CastKind::Boolean),
            "int" | "integer" => Ok(CastKind::Integer),
            "float" | "double" => Ok(CastKind::Float),
            "string" => Ok(CastKind::String),
            "array" => Ok(CastKind::Array),
            "date" => Ok(CastKind::Date),
            "collection" => Ok(CastKind::Collection),
            other => Err(DtoError::InvalidSchema(format!("unknown cast `{}`", other))),
        }
    }
}

// ============================================================================
// Cast Registry
// ============================================================================

/// Custom casts addressable by name, for schemas loaded from configuration
#[derive(Default, Clone)]
pub struct CastRegistry {
    casts: HashMap<String, BoxedCast>,
}

impl CastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom cast under a name
    pub fn register(mut self, name: impl Into<String>, cast: impl CastsProperty + 'static) -> Self {
        self.casts.insert(name.into(), Arc::new(cast));
        self
    }

    /// Resolve a cast name: built-in kinds first, then registered casts
    pub fn resolve(&self, name: &str) -> Result<CastKind> {
        match name.parse::<CastKind>() {
            Ok(kind) => Ok(kind),
            Err(err) => self
                .casts
                .get(name.trim())
                .map(|cast| CastKind::Custom(Arc::clone(cast)))
                .ok_or(err),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }
}

// ============================================================================
// Cast Dispatch
// ============================================================================

/// Cast a raw property value to its declared kind
pub fn cast(property: &str, value: &Value, kind: Option<&CastKind>) -> Result<Value> {
    let Some(kind) = kind else {
        return Ok(value.clone());
    };

    match kind {
        CastKind::Boolean => Ok(Value::Bool(to_bool(value))),
        CastKind::Integer => to_integer(property, value),
        CastKind::Float => to_float(property, value),
        CastKind::String => to_string(property, value),
        CastKind::Array => to_array(property, value),
        CastKind::Date => to_date(property, value),
        CastKind::Collection => to_collection(property, value),
        CastKind::Custom(custom) => run_custom(custom.as_ref(), value).map_err(|reason| {
            debug!("Custom cast {} failed for {}: {}", custom.name(), property, reason);
            DtoError::CastFailed {
                property: property.to_string(),
                kind: "type".to_string(),
                value: value.clone(),
                reason: Some(reason),
            }
        }),
    }
}

/// Run a plugin, turning both errors and panics into a failure message
fn run_custom(custom: &dyn CastsProperty, value: &Value) -> std::result::Result<Value, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| custom.cast(value))) {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(payload) => Err(payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "custom cast panicked".to_string())),
    }
}

/// Permissive boolean coercion; unrecognized input is `false`
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        _ => false,
    }
}

fn to_integer(property: &str, value: &Value) -> Result<Value> {
    let failed = || DtoError::cast_failed(property, "integer", value);
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => integral(*f).map(Value::Int).ok_or_else(failed),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            text.parse::<f64>()
                .ok()
                .and_then(integral)
                .map(Value::Int)
                .ok_or_else(failed)
        }
        _ => Err(failed()),
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn to_float(property: &str, value: &Value) -> Result<Value> {
    let failed = || DtoError::cast_failed(property, "float", value);
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(failed),
        _ => Err(failed()),
    }
}

fn to_string(property: &str, value: &Value) -> Result<Value> {
    let text = match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.format(DATE_DISPLAY_FORMAT).to_string(),
        Value::Collection(c) => c.to_json().to_string(),
        Value::Record(record) => match record.display() {
            Some(text) => text.to_string(),
            None => return Err(DtoError::cast_failed(property, "string", value)),
        },
        Value::List(_) | Value::Map(_) => {
            return Err(DtoError::cast_failed(property, "string", value))
        }
    };
    Ok(Value::String(text))
}

fn to_array(property: &str, value: &Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::List(Vec::new())),
        Value::List(_) | Value::Map(_) => Ok(value.clone()),
        Value::Collection(c) => Ok(c.clone().into_value()),
        Value::Record(record) => Ok(fields_to_array(record.fields())),
        Value::Date(_) => Err(DtoError::cast_failed(property, "array", value)),
        scalar => Ok(Value::List(vec![scalar.clone()])),
    }
}

/// Fields keyed `"0".."n-1"` in order are a list in disguise
fn fields_to_array(fields: &[(String, Value)]) -> Value {
    let positional = fields
        .iter()
        .enumerate()
        .all(|(i, (key, _))| *key == i.to_string());

    if positional && !fields.is_empty() {
        Value::List(fields.iter().map(|(_, v)| v.clone()).collect())
    } else {
        Value::Map(fields.to_vec())
    }
}

fn to_date(property: &str, value: &Value) -> Result<Value> {
    let invalid = || DtoError::InvalidDateFormat {
        property: property.to_string(),
        value: value.to_string(),
    };
    match value {
        Value::Null => Ok(Value::Null),
        Value::Date(_) => Ok(value.clone()),
        Value::String(s) => dates::parse(s).map(Value::Date).ok_or_else(invalid),
        Value::Int(seconds) => dates::from_timestamp(*seconds)
            .map(Value::Date)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn to_collection(property: &str, value: &Value) -> Result<Value> {
    let collection = match value {
        Value::Null => Collection::new(),
        Value::Collection(c) => c.clone(),
        Value::List(items) => Collection::from_values(items.iter().cloned()),
        Value::Map(fields) => Collection::from_pairs(fields.iter().cloned()),
        Value::Record(record) => Collection::from_pairs(record.fields().iter().cloned()),
        Value::Date(_) => return Err(DtoError::cast_failed(property, "collection", value)),
        scalar => Collection::from_values(vec![scalar.clone()]),
    };
    Ok(Value::Collection(collection))
}

// ============================================================================
// Tests
// ============================================================================
