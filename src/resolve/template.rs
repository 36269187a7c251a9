// src/resolve/template.rs

//! Template syntax recognised inside string values.
//!
//! - `!P...`: escape prefix; the rest of the string is taken verbatim.
//! - `$NAME` / `${NAME}`: environment variable (`NAME` starts with a letter,
//!   then letters, digits or `_`).
//! - `{dotted.key.path}`: reference to another key of the same config.

use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::model::ConfigValue;

pub const NO_PARSE_PREFIX: &str = "!P";

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z][A-Za-z0-9_]*)\}|([A-Za-z][A-Za-z0-9_]*))")
        .expect("environment variable pattern is valid")
});

pub(crate) static SELF_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z0-9_.]+)\}").expect("self reference pattern is valid")
});

static SELF_REF_FULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{([A-Za-z0-9_.]+)\}$").expect("self reference pattern is valid")
});

/// Replace every `$NAME` / `${NAME}` in `value` with `lookup(NAME)`.
///
/// `lookup` returns `None` for undefined variables, which are replaced by an
/// empty string. The substitution is a single pass: text coming from the
/// environment is never scanned again.
pub fn substitute_env(value: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    ENV_VAR_RE
        .replace_all(value, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}

/// If `value` is exactly one `{path}` token, return `path`.
pub fn full_reference(value: &str) -> Option<&str> {
    SELF_REF_FULL_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Best-effort typing of a string: integer, then float, then
/// case-insensitive `true` / `false`, else the string itself.
///
/// Surrounding whitespace is ignored for numbers only. Integers that do not
/// fit in 64 bits are kept as strings.
pub fn convert_if_possible(value: &str) -> ConfigValue {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(i) => return ConfigValue::Int(i),
        // Out-of-range integers stay text rather than losing digits as floats.
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            return ConfigValue::Str(value.to_string());
        }
        Err(_) => {}
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return ConfigValue::Float(f);
    }
    if value.eq_ignore_ascii_case("true") {
        return ConfigValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return ConfigValue::Bool(false);
    }
    ConfigValue::Str(value.to_string())
}
