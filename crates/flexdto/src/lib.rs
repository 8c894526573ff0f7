//! FlexDTO
//!
//! Flexible data transfer objects: a thin, declarative boundary between loosely
//! typed input (HTTP payloads, API responses, argument lists) and typed reads.
//!
//! A [`DtoSchema`] declares, once per DTO type:
//! - the whitelist of permitted properties (or `"*"` for any),
//! - the cast of each property (built-in kinds or a custom [`CastsProperty`]),
//! - case sensitivity and whether non-permitted names are ignored,
//! - optional construction-time [`Validation`].
//!
//! Input names are resolved against the whitelist during construction; values
//! are stored raw and cast on every read.
//!
//! # Example
//!
//! ```rust
//! use flexdto::{CastKind, Dto, DtoSchema, Value};
//!
//! let schema = DtoSchema::new("Person")
//!     .properties(["first_name", "age"])
//!     .cast("age", CastKind::Integer)
//!     .case_sensitive(false)
//!     .shared();
//!
//! let person = Dto::new(
//!     schema,
//!     serde_json::json!({"firstName": "Vito", "AGE": "53"}),
//! )
//! .unwrap();
//!
//! assert_eq!(person.get("first_name", Value::Null).unwrap(), Value::from("Vito"));
//! assert_eq!(person.call("getAge").unwrap(), Value::Int(53));
//! ```

// Public modules
pub mod casts;
pub mod config;
pub mod dates;
pub mod dto;
pub mod errors;
pub mod naming;
pub mod resolver;
pub mod rules;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use casts::{BoxedCast, CastKind, CastRegistry, CastsProperty, FnCast};
pub use config::{DtoConfig, DtoSchema, SchemaDefinition};
pub use dto::{DataTransferObject, Dto, DtoInput, FromValue};
pub use errors::{DtoError, Result};
pub use resolver::{PropertyResolver, Whitelist};
pub use rules::{Rule, RuleValidator};
pub use types::{Collection, Record, Value};
pub use validation::{AfterValidation, Validation, ValidationErrors, ValidationOutcome, Validator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
