//! Per-type DTO configuration
//!
//! A [`DtoSchema`] is the immutable description of one DTO type: its whitelist,
//! cast declarations, behavior flags and optional validation. Schemas are built
//! once and shared behind an `Arc`.

use crate::casts::{CastKind, CastRegistry};
use crate::errors::Result;
use crate::resolver::Whitelist;
use crate::validation::Validation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Behavior Flags
// ============================================================================

/// Behavior flags of a DTO type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtoConfig {
    /// Whether incoming names must match the whitelist exactly
    #[serde(alias = "caseSensitive")]
    pub case_sensitive: bool,

    /// Silently drop names outside the whitelist instead of failing
    #[serde(alias = "ignoreNonPermittedProperties")]
    pub ignore_non_permitted_properties: bool,
}

impl Default for DtoConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            ignore_non_permitted_properties: false,
        }
    }
}

impl DtoConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set case sensitivity of incoming names
    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        self.case_sensitive = sensitive;
        self
    }

    /// Skip non-permitted names instead of failing
    pub fn ignore_non_permitted_properties(mut self, ignore: bool) -> Self {
        self.ignore_non_permitted_properties = ignore;
        self
    }
}

// ============================================================================
// DTO Schema
// ============================================================================

/// Immutable definition of a DTO type
#[derive(Debug, Clone, Default)]
pub struct DtoSchema {
    name: String,
    whitelist: Whitelist,
    casts: Vec<(String, CastKind)>,
    config: DtoConfig,
    validation: Option<Validation>,
}

impl DtoSchema {
    /// Create a schema accepting any property
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare the permitted properties, in order; `["*"]` accepts any
    pub fn properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Whitelist::of(names);
        self
    }

    /// Declare the cast of a property
    pub fn cast(mut self, property: impl Into<String>, kind: CastKind) -> Self {
        let property = property.into();
        self.casts.retain(|(p, _)| *p != property);
        self.casts.push((property, kind));
        self
    }

    /// Replace the behavior flags
    pub fn config(mut self, config: DtoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        self.config.case_sensitive = sensitive;
        self
    }

    pub fn ignore_non_permitted_properties(mut self, ignore: bool) -> Self {
        self.config.ignore_non_permitted_properties = ignore;
        self
    }

    /// Validate populated data during construction
    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Freeze the schema for sharing between instances
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn flags(&self) -> &DtoConfig {
        &self.config
    }

    pub fn declared_validation(&self) -> Option<&Validation> {
        self.validation.as_ref()
    }

    /// Declared cast of a stored property
    pub fn cast_for(&self, property: &str) -> Option<&CastKind> {
        self.casts
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, kind)| kind)
    }

    pub fn casts(&self) -> &[(String, CastKind)] {
        &self.casts
    }

    /// Build a schema from its serialized definition
    pub fn from_definition(definition: SchemaDefinition, registry: &CastRegistry) -> Result<Self> {
        let mut schema = DtoSchema::new(definition.name)
            .properties(definition.properties)
            .config(definition.config);

        for (property, cast_name) in &definition.casts {
            schema = schema.cast(property.clone(), registry.resolve(cast_name)?);
        }

        if !definition.rules.is_empty() {
            let validation = Validation::new()
                .rules(definition.rules)
                .messages(definition.messages);
            schema = schema.validation(validation);
        }

        Ok(schema)
    }

    /// Load a schema from JSON
    ///
    /// ```
    /// use flexdto::{CastRegistry, DtoSchema};
    ///
    /// let schema = DtoSchema::from_json(
    ///     r#"{"name": "Movie", "properties": ["title", "oscars"], "casts": {"oscars": "int"}}"#,
    ///     &CastRegistry::new(),
    /// ).unwrap();
    /// assert_eq!(schema.whitelist().names().len(), 2);
    /// ```
    pub fn from_json(text: &str, registry: &CastRegistry) -> Result<Self> {
        let definition: SchemaDefinition = serde_json::from_str(text)?;
        Self::from_definition(definition, registry)
    }
}

// ============================================================================
// Serialized Schema Definition
// ============================================================================

/// Serializable form of a [`DtoSchema`]
///
/// Casts are referenced by name: built-in kinds by their names, custom casts by
/// the name they were registered under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDefinition {
    pub name: String,

    /// Permitted properties; omitted means any
    #[serde(default = "wildcard")]
    pub properties: Vec<String>,

    pub casts: BTreeMap<String, String>,

    #[serde(flatten)]
    pub config: DtoConfig,

    /// Validation rule expressions per property
    pub rules: BTreeMap<String, String>,

    /// Custom validation messages
    pub messages: BTreeMap<String, String>,
}

fn wildcard() -> Vec<String> {
    vec![crate::resolver::WILDCARD.to_string()]
}
