//! Construction-time validation
//!
//! The DTO hands its populated (raw) data to a [`Validator`] together with the
//! declared rules and messages. After-validation hooks then see the populated
//! DTO and may add business-rule errors. Any error aborts construction.
//!
//! # Example
//!
//! ```
//! use flexdto::{Dto, DtoSchema, Validation, Value};
//!
//! let schema = DtoSchema::new("Movie")
//!     .properties(["title"])
//!     .validation(Validation::new().rule("title", "required"))
//!     .shared();
//!
//! let err = Dto::new(schema, Value::Map(vec![("title".into(), "".into())])).unwrap_err();
//! let errors = err.validation_errors().unwrap();
//! assert_eq!(errors.first(), Some("The title property is required."));
//! ```

use crate::dto::Dto;
use crate::rules::RuleValidator;
use crate::types::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Validation Errors
// ============================================================================

/// Error messages grouped by property, in the order properties first failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a property
    pub fn add(&mut self, property: impl Into<String>, message: impl Into<String>) {
        let property = property.into();
        let message = message.into();
        match self.errors.iter_mut().find(|(p, _)| *p == property) {
            Some((_, messages)) => messages.push(message),
            None => self.errors.push((property, vec![message])),
        }
    }

    /// Merge another collection into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for (property, messages) in other.errors {
            for message in messages {
                self.add(property.clone(), message);
            }
        }
    }

    /// Messages of one property
    pub fn get(&self, property: &str) -> &[String] {
        self.errors
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, property: &str) -> bool {
        !self.get(property).is_empty()
    }

    /// First message overall
    pub fn first(&self) -> Option<&str> {
        self.errors
            .first()
            .and_then(|(_, messages)| messages.first())
            .map(String::as_str)
    }

    /// Properties with at least one message
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(p, m)| (p.as_str(), m.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages
    pub fn len(&self) -> usize {
        self.errors.iter().map(|(_, m)| m.len()).sum()
    }

    /// One-line description: the first message and a count of the rest
    pub fn summary(&self) -> String {
        let Some(first) = self.first() else {
            return "The given data was invalid.".to_string();
        };
        match self.len() - 1 {
            0 => first.to_string(),
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(p, m)| (p.clone(), serde_json::json!(m)))
                .collect(),
        )
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (property, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{}: {}", property, message)?;
            }
        }
        Ok(())
    }
}

/// Result of running a validator
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub errors: ValidationErrors,
}

impl ValidationOutcome {
    pub fn new(errors: ValidationErrors) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// Validator Traits
// ============================================================================

/// Validates populated DTO data against rule expressions
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        data: &[(String, Value)],
        rules: &[(String, String)],
        messages: &[(String, String)],
    ) -> ValidationOutcome;
}

/// Hook run after the validator, with access to the populated DTO
pub trait AfterValidation: Send + Sync {
    fn after_validate(&self, dto: &Dto, errors: &mut ValidationErrors);
}

impl<F> AfterValidation for F
where
    F: Fn(&Dto, &mut ValidationErrors) + Send + Sync,
{
    fn after_validate(&self, dto: &Dto, errors: &mut ValidationErrors) {
        self(dto, errors)
    }
}

// ============================================================================
// Validation Declaration
// ============================================================================

/// Validation declared by a DTO type
#[derive(Clone)]
pub struct Validation {
    rules: Vec<(String, String)>,
    messages: Vec<(String, String)>,
    validator: Arc<dyn Validator>,
    after: Vec<Arc<dyn AfterValidation>>,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            messages: Vec::new(),
            validator: Arc::new(RuleValidator::new()),
            after: Vec::new(),
        }
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("rules", &self.rules)
            .field("messages", &self.messages)
            .field("after_hooks", &self.after.len())
            .finish()
    }
}

impl Validation {
    /// Validation with the built-in rule validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the rule expression of a property (e.g. `"required|max:255"`)
    pub fn rule(mut self, property: impl Into<String>, expression: impl Into<String>) -> Self {
        self.rules.push((property.into(), expression.into()));
        self
    }

    pub fn rules<I, K, V>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rules
            .extend(rules.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Custom message, keyed `"<property>.<rule>"` or `"<rule>"`
    pub fn message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.push((key.into(), text.into()));
        self
    }

    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replace the validator
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Add an after-validation hook
    pub fn after(mut self, hook: impl AfterValidation + 'static) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    /// Run the validator and every hook against a populated DTO
    pub fn run(&self, dto: &Dto) -> ValidationErrors {
        let outcome = self
            .validator
            .validate(dto.get_original(), &self.rules, &self.messages);
        let mut errors = outcome.errors;

        for hook in &self.after {
            hook.after_validate(dto, &mut errors);
        }
        errors
    }
}
