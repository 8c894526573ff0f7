//! Built-in rule-based validator
//!
//! Rule expressions are pipe-separated (`"required|string|max:255"`). Only
//! `required` applies to absent or empty properties; every other rule is
//! skipped for them, and for `null` when `nullable` is declared.
//!
//! Messages default to `The <attribute> property ...`, where the attribute is
//! the property name with underscores turned into spaces. Custom messages are
//! looked up as `"<property>.<rule>"`, then `"<rule>"`.

use crate::dates;
use crate::types::Value;
use crate::validation::{ValidationErrors, ValidationOutcome, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

// ============================================================================
// Pre-compiled Format Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// URL regex pattern (http/https)
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid url pattern"));

/// UUID regex pattern (any version)
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid uuid pattern")
});

// ============================================================================
// Rules
// ============================================================================

/// One parsed validation rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Nullable,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Date,
    Email,
    Url,
    Uuid,
    Min(f64),
    Max(f64),
    Between(f64, f64),
    In(Vec<String>),
    NotIn(Vec<String>),
    Regex(String),
    Same(String),
    Different(String),
    /// Unrecognized or malformed rule, kept for error reporting
    Unsupported(String),
}

impl Rule {
    /// Parse a single rule such as `max:255`
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (name, params) = match text.split_once(':') {
            Some((name, params)) => (name.trim(), Some(params)),
            None => (text, None),
        };

        let list = |p: &str| p.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>();
        let number = |p: &str| p.trim().parse::<f64>().ok();

        let parsed = match (name, params) {
            ("required", None) => Some(Rule::Required),
            ("nullable", None) => Some(Rule::Nullable),
            ("string", None) => Some(Rule::String),
            ("integer" | "int", None) => Some(Rule::Integer),
            ("numeric", None) => Some(Rule::Numeric),
            ("boolean" | "bool", None) => Some(Rule::Boolean),
            ("array", None) => Some(Rule::Array),
            ("date", None) => Some(Rule::Date),
            ("email", None) => Some(Rule::Email),
            ("url", None) => Some(Rule::Url),
            ("uuid", None) => Some(Rule::Uuid),
            ("min", Some(p)) => number(p).map(Rule::Min),
            ("max", Some(p)) => number(p).map(Rule::Max),
            ("between", Some(p)) => match p.split_once(',') {
                Some((lo, hi)) => number(lo).zip(number(hi)).map(|(lo, hi)| Rule::Between(lo, hi)),
                None => None,
            },
            ("in", Some(p)) => Some(Rule::In(list(p))),
            ("not_in", Some(p)) => Some(Rule::NotIn(list(p))),
            ("regex", Some(p)) => Some(Rule::Regex(p.to_string())),
            ("same", Some(p)) => Some(Rule::Same(p.trim().to_string())),
            ("different", Some(p)) => Some(Rule::Different(p.trim().to_string())),
            _ => None,
        };

        parsed.unwrap_or_else(|| Rule::Unsupported(text.to_string()))
    }

    /// Parse a pipe-separated expression
    ///
    /// A `regex:/.../` pattern may itself contain `|`; it runs up to its closing
    /// delimiter.
    pub fn parse_all(expression: &str) -> Vec<Rule> {
        let mut rules = Vec::new();
        let mut pending: Option<String> = None;

        for part in expression.split('|') {
            let current = match pending.take() {
                Some(mut open) => {
                    open.push('|');
                    open.push_str(part);
                    open
                }
                None => part.to_string(),
            };

            if is_open_pattern(&current) {
                pending = Some(current);
            } else if !current.trim().is_empty() {
                rules.push(Rule::parse(&current));
            }
        }

        if let Some(unterminated) = pending {
            rules.push(Rule::parse(&unterminated));
        }
        rules
    }

    /// Rule name used for message lookup
    pub fn name(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Nullable => "nullable",
            Rule::String => "string",
            Rule::Integer => "integer",
            Rule::Numeric => "numeric",
            Rule::Boolean => "boolean",
            Rule::Array => "array",
            Rule::Date => "date",
            Rule::Email => "email",
            Rule::Url => "url",
            Rule::Uuid => "uuid",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Between(..) => "between",
            Rule::In(_) => "in",
            Rule::NotIn(_) => "not_in",
            Rule::Regex(_) => "regex",
            Rule::Same(_) => "same",
            Rule::Different(_) => "different",
            Rule::Unsupported(_) => "unsupported",
        }
    }

    /// Implicit rules also run against absent and empty values
    fn is_implicit(&self) -> bool {
        matches!(self, Rule::Required)
    }
}

/// `regex:/...` whose closing delimiter has not been seen yet
fn is_open_pattern(part: &str) -> bool {
    match part.trim().strip_prefix("regex:") {
        Some(pattern) => {
            let pattern = pattern.trim();
            pattern.starts_with('/') && (pattern.len() < 2 || !pattern.ends_with('/'))
        }
        None => false,
    }
}

// ============================================================================
// Rule Validator
// ============================================================================

/// How a size rule measures a value
#[derive(Debug, Clone, Copy, PartialEq)]
enum SizeKind {
    Numeric,
    Characters,
    Items,
}

/// Default validator understanding the built-in rules
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for RuleValidator {
    fn validate(
        &self,
        data: &[(String, Value)],
        rules: &[(String, String)],
        messages: &[(String, String)],
    ) -> ValidationOutcome {
        let mut errors = ValidationErrors::new();

        for (property, expression) in rules {
            let parsed = Rule::parse_all(expression);
            let value = lookup(data, property);
            let nullable = parsed.contains(&Rule::Nullable);
            let numeric = parsed.iter().any(|r| matches!(r, Rule::Integer | Rule::Numeric));

            for rule in &parsed {
                let skip = match value {
                    None => true,
                    Some(v) if v.is_null() => nullable,
                    Some(Value::String(s)) => s.trim().is_empty(),
                    Some(_) => false,
                };
                if skip && !rule.is_implicit() {
                    continue;
                }

                if let Some(message) = check(rule, property, value, data, numeric) {
                    errors.add(property.clone(), render(rule, property, &message, messages));
                }
            }
        }

        ValidationOutcome::new(errors)
    }
}

fn lookup<'a>(data: &'a [(String, Value)], property: &str) -> Option<&'a Value> {
    data.iter().find(|(k, _)| k == property).map(|(_, v)| v)
}

/// Default message template when the rule fails, `None` when it passes
fn check(
    rule: &Rule,
    property: &str,
    value: Option<&Value>,
    data: &[(String, Value)],
    numeric: bool,
) -> Option<String> {
    let value = value.unwrap_or(&Value::Null);
    let passes = match rule {
        Rule::Required => !value.is_empty(),
        Rule::Nullable => true,
        Rule::String => matches!(value, Value::String(_)),
        Rule::Integer => is_integer(value),
        Rule::Numeric => numeric_value(value).is_some(),
        Rule::Boolean => is_boolean(value),
        Rule::Array => matches!(value, Value::List(_) | Value::Map(_) | Value::Collection(_)),
        Rule::Date => is_date(value),
        Rule::Email => value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s)),
        Rule::Url => value.as_str().is_some_and(|s| URL_REGEX.is_match(s)),
        Rule::Uuid => value.as_str().is_some_and(|s| UUID_REGEX.is_match(s)),
        Rule::Min(min) => size(value, numeric).is_some_and(|(n, _)| n >= *min),
        Rule::Max(max) => size(value, numeric).is_some_and(|(n, _)| n <= *max),
        Rule::Between(lo, hi) => size(value, numeric).is_some_and(|(n, _)| n >= *lo && n <= *hi),
        Rule::In(allowed) => allowed.iter().any(|a| *a == value.to_string()),
        Rule::NotIn(denied) => !denied.iter().any(|d| *d == value.to_string()),
        Rule::Regex(pattern) => match compile(pattern) {
            Some(re) => re.is_match(&value.to_string()),
            None => {
                warn!("Invalid regex rule on {}: {}", property, pattern);
                false
            }
        },
        Rule::Same(other) => lookup(data, other) == Some(value),
        Rule::Different(other) => lookup(data, other) != Some(value),
        Rule::Unsupported(text) => {
            warn!("Unsupported validation rule on {}: {}", property, text);
            false
        }
    };

    if passes {
        return None;
    }

    let kind = size(value, numeric).map(|(_, k)| k);
    let template = match rule {
        Rule::Required => "The :attribute property is required.",
        Rule::Nullable => "The :attribute property may be null.",
        Rule::String => "The :attribute property must be a string.",
        Rule::Integer => "The :attribute property must be an integer.",
        Rule::Numeric => "The :attribute property must be a number.",
        Rule::Boolean => "The :attribute property must be true or false.",
        Rule::Array => "The :attribute property must be an array.",
        Rule::Date => "The :attribute property is not a valid date.",
        Rule::Email => "The :attribute property must be a valid email address.",
        Rule::Url => "The :attribute property must be a valid URL.",
        Rule::Uuid => "The :attribute property must be a valid UUID.",
        Rule::Min(_) => match kind {
            Some(SizeKind::Numeric) => "The :attribute property must be at least :min.",
            Some(SizeKind::Items) => "The :attribute property must have at least :min items.",
            _ => "The :attribute property must be at least :min characters.",
        },
        Rule::Max(_) => match kind {
            Some(SizeKind::Numeric) => "The :attribute property must not be greater than :max.",
            Some(SizeKind::Items) => "The :attribute property must not have more than :max items.",
            _ => "The :attribute property must not be greater than :max characters.",
        },
        Rule::Between(..) => match kind {
            Some(SizeKind::Numeric) => "The :attribute property must be between :min and :max.",
            Some(SizeKind::Items) => "The :attribute property must have between :min and :max items.",
            _ => "The :attribute property must be between :min and :max characters.",
        },
        Rule::In(_) => "The selected :attribute is invalid.",
        Rule::NotIn(_) => "The selected :attribute is invalid.",
        Rule::Regex(_) => "The :attribute property format is invalid.",
        Rule::Same(_) => "The :attribute property must match :other.",
        Rule::Different(_) => "The :attribute property and :other must be different.",
        Rule::Unsupported(_) => "The :attribute property uses an unsupported validation rule [:rule].",
    };
    Some(template.to_string())
}

/// Pick the custom message if declared and fill in placeholders
fn render(rule: &Rule, property: &str, default: &str, messages: &[(String, String)]) -> String {
    let specific = format!("{}.{}", property, rule.name());
    let template = messages
        .iter()
        .find(|(k, _)| *k == specific)
        .or_else(|| messages.iter().find(|(k, _)| k == rule.name()))
        .map(|(_, text)| text.as_str())
        .unwrap_or(default);

    let mut text = template.replace(":attribute", &property.replace('_', " "));
    match rule {
        Rule::Min(min) => text = text.replace(":min", &format_number(*min)),
        Rule::Max(max) => text = text.replace(":max", &format_number(*max)),
        Rule::Between(lo, hi) => {
            text = text
                .replace(":min", &format_number(*lo))
                .replace(":max", &format_number(*hi));
        }
        Rule::In(values) | Rule::NotIn(values) => text = text.replace(":values", &values.join(", ")),
        Rule::Same(other) | Rule::Different(other) => {
            text = text.replace(":other", &other.replace('_', " "))
        }
        Rule::Unsupported(name) => text = text.replace(":rule", name),
        _ => {}
    }
    text
}

fn format_number(n: f64) -> String {
    Value::Float(n).to_string()
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Int(i) => *i == 0 || *i == 1,
        Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    }
}

fn is_date(value: &Value) -> bool {
    match value {
        Value::Date(_) => true,
        Value::String(s) => dates::parse(s).is_some(),
        _ => false,
    }
}

/// Measured size of a value for min/max/between
fn size(value: &Value, numeric: bool) -> Option<(f64, SizeKind)> {
    if numeric {
        if let Some(n) = numeric_value(value) {
            return Some((n, SizeKind::Numeric));
        }
    }
    match value {
        Value::Int(i) => Some((*i as f64, SizeKind::Numeric)),
        Value::Float(f) => Some((*f, SizeKind::Numeric)),
        Value::String(s) => Some((s.chars().count() as f64, SizeKind::Characters)),
        Value::List(items) => Some((items.len() as f64, SizeKind::Items)),
        Value::Map(fields) => Some((fields.len() as f64, SizeKind::Items)),
        Value::Collection(c) => Some((c.len() as f64, SizeKind::Items)),
        _ => None,
    }
}

/// Compile a regex rule, accepting `/pattern/` delimiters
fn compile(pattern: &str) -> Option<Regex> {
    let inner = pattern
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .unwrap_or(pattern);
    Regex::new(inner).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn rules(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_rules() {
        assert_eq!(
            Rule::parse_all("required|max:255|in:a, b"),
            vec![
                Rule::Required,
                Rule::Max(255.0),
                Rule::In(vec!["a".to_string(), "b".to_string()])
            ]
        );
        assert_eq!(Rule::parse("between:1,5"), Rule::Between(1.0, 5.0));
        assert_eq!(Rule::parse("max:lots"), Rule::Unsupported("max:lots".to_string()));
        assert_eq!(Rule::parse("shout"), Rule::Unsupported("shout".to_string()));
    }

    #[test]
    fn test_regex_alternation_stays_one_rule() {
        assert_eq!(
            Rule::parse_all("required|regex:/^(a|b)$/|max:1"),
            vec![
                Rule::Required,
                Rule::Regex("/^(a|b)$/".to_string()),
                Rule::Max(1.0)
            ]
        );

        let outcome = RuleValidator.validate(
            &data(&[("grade", Value::from("b")), ("other", Value::from("c"))]),
            &rules(&[("grade", "regex:/^(a|b)$/"), ("other", "regex:/^(a|b)$/")]),
            &[],
        );
        assert_eq!(outcome.errors.properties().collect::<Vec<_>>(), ["other"]);
    }

    #[test]
    fn test_required() {
        let outcome = RuleValidator.validate(
            &data(&[("title", Value::from(""))]),
            &rules(&[("title", "required")]),
            &[],
        );
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors.first(), Some("The title property is required."));

        let outcome = RuleValidator.validate(&[], &rules(&[("title", "required")]), &[]);
        assert!(outcome.errors.has("title"));
    }

    #[test]
    fn test_non_implicit_rules_skip_absent_values() {
        let outcome = RuleValidator.validate(
            &data(&[("title", Value::from(""))]),
            &rules(&[("title", "string|min:3"), ("year", "integer")]),
            &[],
        );
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_nullable() {
        let input = data(&[("year", Value::Null)]);
        assert!(RuleValidator
            .validate(&input, &rules(&[("year", "nullable|integer")]), &[])
            .is_valid());
        assert!(!RuleValidator
            .validate(&input, &rules(&[("year", "integer")]), &[])
            .is_valid());
    }

    #[test]
    fn test_size_rules_by_type() {
        let input = data(&[
            ("title", Value::from("ab")),
            ("oscars", Value::from("12")),
            ("actors", Value::from(vec!["a", "b", "c"])),
        ]);
        let outcome = RuleValidator.validate(
            &input,
            &rules(&[
                ("title", "min:3"),
                ("oscars", "integer|max:11"),
                ("actors", "max:2"),
            ]),
            &[],
        );
        assert_eq!(
            outcome.errors.get("title"),
            ["The title property must be at least 3 characters."]
        );
        assert_eq!(
            outcome.errors.get("oscars"),
            ["The oscars property must not be greater than 11."]
        );
        assert_eq!(
            outcome.errors.get("actors"),
            ["The actors property must not have more than 2 items."]
        );
    }

    #[test]
    fn test_formats() {
        let input = data(&[
            ("email", Value::from("user@example.com")),
            ("site", Value::from("ftp://example.com")),
            ("released_on", Value::from("1972-12-26")),
        ]);
        let outcome = RuleValidator.validate(
            &input,
            &rules(&[("email", "email"), ("site", "url"), ("released_on", "date")]),
            &[],
        );
        assert_eq!(outcome.errors.properties().collect::<Vec<_>>(), ["site"]);
    }

    #[test]
    fn test_custom_messages() {
        let input = data(&[("title", Value::Null), ("dvd_year", Value::from("soon"))]);
        let messages = rules(&[
            ("title.required", "A movie needs a :attribute."),
            ("integer", ":attribute is not a year."),
        ]);
        let outcome = RuleValidator.validate(
            &input,
            &rules(&[("title", "required"), ("dvd_year", "integer")]),
            &messages,
        );
        assert_eq!(outcome.errors.get("title"), ["A movie needs a title."]);
        assert_eq!(outcome.errors.get("dvd_year"), ["dvd year is not a year."]);
    }

    #[test]
    fn test_in_regex_same() {
        let input = data(&[
            ("rating", Value::from("R")),
            ("code", Value::from("AB-12")),
            ("password", Value::from("x")),
            ("password_confirmation", Value::from("y")),
        ]);
        let outcome = RuleValidator.validate(
            &input,
            &rules(&[
                ("rating", "in:G,PG,R"),
                ("code", r"regex:/^[A-Z]{2}-\d{2}$/"),
                ("password", "same:password_confirmation"),
            ]),
            &[],
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors.get("password"),
            ["The password property must match password confirmation."]
        );
    }

    #[test]
    fn test_unsupported_rule_is_reported() {
        let outcome = RuleValidator.validate(
            &data(&[("title", Value::from("x"))]),
            &rules(&[("title", "shout")]),
            &[],
        );
        assert_eq!(
            outcome.errors.first(),
            Some("The title property uses an unsupported validation rule [shout].")
        );
    }
}
