//! Property name resolution
//!
//! Maps an incoming key onto the whitelist spelling that gets stored. The
//! whitelist always dictates the stored spelling, whatever convention the input
//! used.

use crate::config::DtoConfig;
use crate::errors::{DtoError, Result};
use crate::naming;
use tracing::trace;

/// Single-entry list that stands for "any property"
pub const WILDCARD: &str = "*";

// ============================================================================
// Whitelist
// ============================================================================

/// Permitted property names of a DTO type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Whitelist {
    /// Every name is accepted verbatim
    #[default]
    Any,
    /// Only the listed names, in declaration order
    Only(Vec<String>),
}

impl Whitelist {
    /// Build from a declared list; `["*"]` is the wildcard
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() == 1 && names[0] == WILDCARD {
            Whitelist::Any
        } else {
            Whitelist::Only(names)
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Whitelist::Any)
    }

    /// Declared names (empty for the wildcard)
    pub fn names(&self) -> &[String] {
        match self {
            Whitelist::Any => &[],
            Whitelist::Only(names) => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Whitelist::Any => true,
            Whitelist::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// First whitelist entry matching `candidate`, in declaration order
///
/// Case-sensitive matching is exact equality. Otherwise names match when equal
/// under naming-convention normalization (see [`naming::equivalent`]).
pub fn find_permitted<'a>(
    names: &'a [String],
    candidate: &str,
    case_sensitive: bool,
) -> Option<&'a str> {
    names
        .iter()
        .find(|allowed| {
            if case_sensitive {
                allowed.as_str() == candidate
            } else {
                naming::equivalent(candidate, allowed)
            }
        })
        .map(String::as_str)
}

/// Resolves incoming names against one DTO type's whitelist and flags
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver<'a> {
    whitelist: &'a Whitelist,
    config: &'a DtoConfig,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(whitelist: &'a Whitelist, config: &'a DtoConfig) -> Self {
        Self { whitelist, config }
    }

    /// Canonical stored name for `candidate`
    ///
    /// Returns `Ok(None)` when the name is not permitted and the DTO ignores
    /// non-permitted properties; fails with `PropertyNotAllowed` otherwise.
    pub fn resolve(&self, candidate: &str) -> Result<Option<String>> {
        let names = match self.whitelist {
            Whitelist::Any => return Ok(Some(candidate.to_string())),
            Whitelist::Only(names) => names,
        };

        match find_permitted(names, candidate, self.config.case_sensitive) {
            Some(canonical) => Ok(Some(canonical.to_string())),
            None if self.config.ignore_non_permitted_properties => {
                trace!("Ignoring non-permitted property: {}", candidate);
                Ok(None)
            }
            None => Err(DtoError::PropertyNotAllowed(candidate.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Whitelist {
        Whitelist::of(["first_name", "lastName", "full name", "age"])
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(Whitelist::of(["*"]).is_wildcard());
        assert!(!Whitelist::of(["*", "a"]).is_wildcard());
        assert!(Whitelist::default().is_wildcard());
    }

    #[test]
    fn test_wildcard_accepts_verbatim() {
        let whitelist = Whitelist::Any;
        let config = DtoConfig::default();
        let resolver = PropertyResolver::new(&whitelist, &config);
        assert_eq!(resolver.resolve("AnyThing").unwrap(), Some("AnyThing".to_string()));
    }

    #[test]
    fn test_case_sensitive_requires_exact_match() {
        let whitelist = names();
        let config = DtoConfig::default();
        let resolver = PropertyResolver::new(&whitelist, &config);
        assert_eq!(resolver.resolve("age").unwrap(), Some("age".to_string()));

        let err = resolver.resolve("firstName").unwrap_err();
        assert!(matches!(err, DtoError::PropertyNotAllowed(ref n) if n == "firstName"));
    }

    #[test]
    fn test_case_insensitive_returns_whitelist_spelling() {
        let whitelist = names();
        let config = DtoConfig::new().case_sensitive(false);
        let resolver = PropertyResolver::new(&whitelist, &config);
        assert_eq!(resolver.resolve("firstName").unwrap().as_deref(), Some("first_name"));
        assert_eq!(resolver.resolve("FIRST_NAME").unwrap().as_deref(), Some("first_name"));
        assert_eq!(resolver.resolve("last_name").unwrap().as_deref(), Some("lastName"));
        assert_eq!(resolver.resolve("full_name").unwrap().as_deref(), Some("full name"));
    }

    #[test]
    fn test_ignore_non_permitted() {
        let whitelist = names();
        let config = DtoConfig::new().ignore_non_permitted_properties(true);
        let resolver = PropertyResolver::new(&whitelist, &config);
        assert_eq!(resolver.resolve("middle_name").unwrap(), None);
    }

    #[test]
    fn test_first_match_wins() {
        let declared = vec!["user_id".to_string(), "userId".to_string()];
        assert_eq!(find_permitted(&declared, "userId", false), Some("user_id"));
        // Only the lower-cased forms line up here
        assert_eq!(find_permitted(&declared, "USERID", false), Some("userId"));
        assert_eq!(find_permitted(&declared, "userId", true), Some("userId"));
    }
}
