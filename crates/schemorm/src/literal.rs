//! Scalar values and their SQL literal form.
//!
//! Every value that ends up in a compiled statement goes through [`RenderMode`]:
//!
//! - [`RenderMode::Verbatim`] wraps the value in single quotes exactly as it
//!   stringifies. Embedded quotes are **not** escaped, which is what the textual
//!   statement grammar of this crate is defined against.
//! - [`RenderMode::Hardened`] doubles embedded single quotes, rejects NUL and
//!   validates identifiers, writing them double-quoted. The [`Orm`](crate::Orm)
//!   always executes hardened text.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use serde_json::{Number, Value};
use std::fmt;

/// A scalar filter or data value: string, number or boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Convert a JSON value into a scalar.
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }

    /// Short name of a JSON value's kind, used in error messages.
    pub(crate) fn kind_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Render a scalar as a quoted SQL literal, verbatim.
///
/// `render(&"gayan".into())` → `'gayan'`. Quotes inside the value are copied as-is.
pub fn render(value: &Scalar) -> String {
    format!("'{value}'")
}

/// Render a scalar as a quoted SQL literal with embedded quotes doubled.
pub fn render_escaped(value: &Scalar) -> OrmResult<String> {
    let text = value.to_string();
    if text.contains('\0') {
        return Err(OrmError::malformed_data(
            "literal cannot contain NUL character",
        ));
    }
    Ok(format!("'{}'", text.replace('\'', "''")))
}

/// How literals and identifiers are written into statement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Compatibility text: literals quoted but not escaped, identifiers unchecked.
    #[default]
    Verbatim,
    /// Escaped literals and validated, double-quoted identifiers.
    Hardened,
}

impl RenderMode {
    /// Render a literal according to this mode.
    pub fn literal(self, value: &Scalar) -> OrmResult<String> {
        match self {
            RenderMode::Verbatim => Ok(render(value)),
            RenderMode::Hardened => render_escaped(value),
        }
    }

    /// Render a table or column name according to this mode.
    pub fn ident(self, name: &str) -> OrmResult<String> {
        match self {
            RenderMode::Verbatim => Ok(name.to_string()),
            RenderMode::Hardened => Ident::parse(name).map(|ident| ident.to_quoted_sql()),
        }
    }
}
