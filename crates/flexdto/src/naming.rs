//! Naming-convention normalization
//!
//! `firstName`, `first_name`, `FIRST_NAME` and `First Name` all describe the same
//! property. These helpers reduce names to comparable forms.

/// Convert a name to snake_case
///
/// Names made only of lowercase ASCII letters are returned unchanged. Otherwise
/// every whitespace-separated word is capitalized, whitespace is removed and an
/// underscore is placed before each uppercase letter that is not the first
/// character.
///
/// ```
/// use flexdto::naming::snake;
///
/// assert_eq!(snake("firstName"), "first_name");
/// assert_eq!(snake("full name"), "full_name");
/// assert_eq!(snake("age"), "age");
/// ```
pub fn snake(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase()) {
        return name.to_string();
    }

    let mut compact = String::with_capacity(name.len());
    let mut word_start = true;
    for c in name.chars() {
        if c.is_whitespace() {
            word_start = true;
            continue;
        }
        if word_start {
            compact.extend(c.to_uppercase());
        } else {
            compact.push(c);
        }
        word_start = false;
    }

    let mut out = String::with_capacity(compact.len() + 4);
    for (i, c) in compact.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Convert a name to StudlyCase (`first_name` -> `FirstName`)
pub fn studly(name: &str) -> String {
    name.split(|c| c == '-' || c == '_' || c == ' ')
        .map(upper_first)
        .collect()
}

/// Convert a name to camelCase (`first_name` -> `firstName`)
pub fn camel(name: &str) -> String {
    let studly = studly(name);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether two names refer to the same property under naming-convention rules
pub fn equivalent(a: &str, b: &str) -> bool {
    a == b || snake(a) == snake(b) || snake(&a.to_lowercase()) == snake(&b.to_lowercase())
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
