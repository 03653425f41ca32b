//! Payload validation against a model's JSON Schema.
//!
//! Only the structural subset that model definitions use is understood:
//! `type`, `properties`, `required`, `additionalProperties: false`, `enum`,
//! `minLength`/`maxLength`, `minimum`/`maximum`, `pattern`, `format`
//! (`email`, `uri`, `uuid`) and `items`. Unknown keywords are ignored.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// A machine-friendly validation code.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    Type,
    Required,
    AdditionalProperty,
    Enum,
    Len,
    Range,
    Pattern,
    Format,
    Schema,
}

/// A single validation failure at `path` (a JSON pointer, `""` for the root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// All failures found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.items.push(err);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.items.iter()
    }

    /// Whether any failure was reported at `path` with `code`.
    pub fn has(&self, path: &str, code: ValidationCode) -> bool {
        self.items.iter().any(|e| e.path == path && e.code == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Validate `data` against `schema`, collecting every failure.
pub fn validate(data: &Value, schema: &Value) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check(data, schema, "", &mut errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check(value: &Value, schema: &Value, path: &str, errors: &mut ValidationErrors) {
    let rules = match schema {
        Value::Object(rules) => rules,
        Value::Bool(true) => return,
        Value::Bool(false) => {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Schema,
                "no value is allowed here",
            ));
            return;
        }
        _ => return,
    };

    if let Some(expected) = rules.get("type") {
        if !type_matches(value, expected) {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Type,
                format!("expected type {}, got {}", describe_type(expected), kind(value)),
            ));
            return;
        }
    }

    if let Some(Value::Array(allowed)) = rules.get("enum") {
        if !allowed.contains(value) {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Enum,
                "value is not one of the allowed values",
            ));
        }
    }

    match value {
        Value::String(s) => check_string(s, rules, path, errors),
        Value::Number(n) => check_number(n.as_f64().unwrap_or(f64::NAN), rules, path, errors),
        Value::Object(map) => check_object(map, rules, path, errors),
        Value::Array(items) => {
            if let Some(item_schema) = rules.get("items") {
                for (i, item) in items.iter().enumerate() {
                    check(item, item_schema, &format!("{path}/{i}"), errors);
                }
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

fn check_string(s: &str, rules: &Map<String, Value>, path: &str, errors: &mut ValidationErrors) {
    let len = s.chars().count() as u64;
    if let Some(min) = rules.get("minLength").and_then(Value::as_u64) {
        if len < min {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Len,
                format!("must be at least {min} characters"),
            ));
        }
    }
    if let Some(max) = rules.get("maxLength").and_then(Value::as_u64) {
        if len > max {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Len,
                format!("must be at most {max} characters"),
            ));
        }
    }

    if let Some(pattern) = rules.get("pattern").and_then(Value::as_str) {
        match regex_is_match(pattern, s) {
            Some(true) => {}
            Some(false) => errors.push(ValidationError::new(
                path,
                ValidationCode::Pattern,
                format!("does not match pattern {pattern:?}"),
            )),
            None => errors.push(ValidationError::new(
                path,
                ValidationCode::Schema,
                format!("invalid pattern {pattern:?} in schema"),
            )),
        }
    }

    let format_ok = match rules.get("format").and_then(Value::as_str) {
        Some("email") => is_email(s),
        Some("uri") => is_url(s),
        Some("uuid") => is_uuid(s),
        _ => true,
    };
    if !format_ok {
        let format = rules.get("format").and_then(Value::as_str).unwrap_or_default();
        errors.push(ValidationError::new(
            path,
            ValidationCode::Format,
            format!("is not a valid {format}"),
        ));
    }
}

fn check_number(n: f64, rules: &Map<String, Value>, path: &str, errors: &mut ValidationErrors) {
    if let Some(min) = rules.get("minimum").and_then(Value::as_f64) {
        if n < min {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Range,
                format!("must be >= {min}"),
            ));
        }
    }
    if let Some(max) = rules.get("maximum").and_then(Value::as_f64) {
        if n > max {
            errors.push(ValidationError::new(
                path,
                ValidationCode::Range,
                format!("must be <= {max}"),
            ));
        }
    }
}

fn check_object(
    map: &Map<String, Value>,
    rules: &Map<String, Value>,
    path: &str,
    errors: &mut ValidationErrors,
) {
    if let Some(Value::Array(required)) = rules.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(name) {
                errors.push(ValidationError::new(
                    format!("{path}/{name}"),
                    ValidationCode::Required,
                    "is required",
                ));
            }
        }
    }

    let properties = rules.get("properties").and_then(Value::as_object);
    if let Some(properties) = properties {
        for (name, value) in map {
            if let Some(prop_schema) = properties.get(name) {
                check(value, prop_schema, &format!("{path}/{name}"), errors);
            }
        }
    }

    if rules.get("additionalProperties") == Some(&Value::Bool(false)) {
        for name in map.keys() {
            if !properties.is_some_and(|p| p.contains_key(name)) {
                errors.push(ValidationError::new(
                    format!("{path}/{name}"),
                    ValidationCode::AdditionalProperty,
                    "is not an allowed property",
                ));
            }
        }
    }
}

fn type_matches(value: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => type_name_matches(value, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| type_name_matches(value, name)),
        _ => true,
    }
}

fn type_name_matches(value: &Value, name: &str) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Best-effort email validation.
///
/// This is intentionally not fully RFC-compliant.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

pub fn is_uuid(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

/// Match `value` against a schema-supplied pattern, caching compiled regexes.
///
/// Returns `None` if the pattern does not compile.
fn regex_is_match(pattern: &str, value: &str) -> Option<bool> {
    static CACHE: OnceLock<Mutex<HashMap<String, regex::Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let regex = {
        let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        match cache.get(pattern) {
            Some(re) => re.clone(),
            None => {
                let re = regex::Regex::new(pattern).ok()?;
                cache.insert(pattern.to_string(), re.clone());
                re
            }
        }
    };

    Some(regex.is_match(value))
}
