//! Error types for DTO construction and reads

use crate::types::Value;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for DTO operations
pub type Result<T> = std::result::Result<T, DtoError>;

/// Unified error type for every DTO failure
#[derive(Error, Debug, Clone)]
pub enum DtoError {
    /// A name outside the whitelist was written or read
    #[error("{0} is not an allowed property.")]
    PropertyNotAllowed(String),

    /// A value could not be coerced to its declared cast kind
    #[error("The provided {property} value of `{value}` could not be cast to {kind}.")]
    CastFailed {
        property: String,
        kind: String,
        value: Value,
        /// Message of the failing custom cast, if any
        reason: Option<String>,
    },

    /// A value could not be parsed as a date
    #[error("The provided {property} value of `{value}` is not a valid date format.")]
    InvalidDateFormat { property: String, value: String },

    /// The validator rejected the populated data
    #[error("{}", .0.summary())]
    ValidationFailed(ValidationErrors),

    /// A schema definition could not be loaded
    #[error("Invalid DTO schema: {0}")]
    InvalidSchema(String),
}

impl DtoError {
    pub(crate) fn cast_failed(property: &str, kind: &str, value: &Value) -> Self {
        DtoError::CastFailed {
            property: property.to_string(),
            kind: kind.to_string(),
            value: value.clone(),
            reason: None,
        }
    }

    /// Returns true for every cast failure, date format errors included
    pub fn is_cast_error(&self) -> bool {
        matches!(
            self,
            DtoError::CastFailed { .. } | DtoError::InvalidDateFormat { .. }
        )
    }

    /// Property the error is about
    pub fn property(&self) -> Option<&str> {
        match self {
            DtoError::PropertyNotAllowed(name) => Some(name),
            DtoError::CastFailed { property, .. } | DtoError::InvalidDateFormat { property, .. } => {
                Some(property)
            }
            DtoError::ValidationFailed(_) | DtoError::InvalidSchema(_) => None,
        }
    }

    /// Target cast kind of a cast failure
    pub fn cast_kind(&self) -> Option<&str> {
        match self {
            DtoError::CastFailed { kind, .. } => Some(kind),
            DtoError::InvalidDateFormat { .. } => Some("date"),
            _ => None,
        }
    }

    /// Offending raw value of a cast failure
    pub fn raw_value(&self) -> Option<Value> {
        match self {
            DtoError::CastFailed { value, .. } => Some(value.clone()),
            DtoError::InvalidDateFormat { value, .. } => Some(Value::String(value.clone())),
            _ => None,
        }
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            DtoError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DtoError {
    fn from(err: serde_json::Error) -> Self {
        DtoError::InvalidSchema(err.to_string())
    }
}
