//! Typed filters, parsed once from caller-supplied JSON.
//!
//! A filter object such as
//!
//! ```json
//! {"status": "active", "age": {">": 18}, "or": [{"role": "admin"}, {"role": "owner"}]}
//! ```
//!
//! becomes a [`Filter`] holding one [`Term`] per key, in key order:
//!
//! - a scalar value is [`Term::Equals`]
//! - a one-entry `{"<" | ">": scalar}` mapping is [`Term::Compare`]
//! - the reserved `or` key holding a list of filter fragments is [`Term::Or`]
//!
//! Every other shape is rejected with [`OrmError::MalformedFilter`].

use crate::error::{OrmError, OrmResult};
use crate::literal::Scalar;
use serde_json::{Map, Value};

/// Reserved filter key introducing a disjunction.
pub const OR_KEY: &str = "or";

/// Reserved find-query key naming the projected columns.
pub const SELECT_COLUMNS_KEY: &str = "selectColumns";

/// Range comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
}

impl CompareOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }
}

/// The `{op: value}` half of a comparison term.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: CompareOp,
    pub value: Scalar,
}

impl Comparison {
    pub fn new(op: CompareOp, value: impl Into<Scalar>) -> Self {
        Self {
            op,
            value: value.into(),
        }
    }

    /// Parse a comparison mapping for `field`.
    ///
    /// The mapping must hold exactly one `<` or `>` key with a scalar value.
    pub fn from_json(field: &str, value: &Value) -> OrmResult<Self> {
        let Value::Object(map) = value else {
            return Err(OrmError::malformed_filter(format!(
                "comparison for '{field}' must be an object, got {}",
                Scalar::kind_of(value)
            )));
        };
        Self::from_map(field, map)
    }

    fn from_map(field: &str, map: &Map<String, Value>) -> OrmResult<Self> {
        let mut entries = map.iter();
        let (Some((key, raw)), None) = (entries.next(), entries.next()) else {
            return Err(OrmError::malformed_filter(format!(
                "compare object for '{field}' must have exactly one key, got {}",
                map.len()
            )));
        };
        let op = CompareOp::parse(key).ok_or_else(|| {
            OrmError::malformed_filter(format!(
                "unsupported operator '{key}' for '{field}', expected '<' or '>'"
            ))
        })?;
        let value = Scalar::from_json(raw).ok_or_else(|| {
            OrmError::malformed_filter(format!(
                "compare value for '{field}' cannot be {}",
                Scalar::kind_of(raw)
            ))
        })?;
        Ok(Self { op, value })
    }
}

/// One entry of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `field='value'`
    Equals { field: String, value: Scalar },
    /// `field op'value'`
    Compare { field: String, comparison: Comparison },
    /// `(fragment OR fragment ...)`
    Or(Vec<Filter>),
}

/// An ordered conjunction of [`Term`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<Term>,
}

impl Filter {
    /// An empty filter (matches everything; compiles to empty text).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Add `field='value'`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.terms.push(Term::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add `field <'value'`.
    pub fn lt(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.terms.push(Term::Compare {
            field: field.into(),
            comparison: Comparison::new(CompareOp::Lt, value),
        });
        self
    }

    /// Add `field >'value'`.
    pub fn gt(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.terms.push(Term::Compare {
            field: field.into(),
            comparison: Comparison::new(CompareOp::Gt, value),
        });
        self
    }

    /// Add a disjunction of fragments.
    pub fn or(mut self, fragments: Vec<Filter>) -> Self {
        self.terms.push(Term::Or(fragments));
        self
    }

    /// Parse a filter from JSON. `null` is treated as an absent (empty) filter.
    pub fn from_json(value: &Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Self::from_map(map),
            other => Err(OrmError::malformed_filter(format!(
                "filter must be an object, got {}",
                Scalar::kind_of(other)
            ))),
        }
    }

    /// Parse a filter from a JSON object, keeping key order.
    pub fn from_map(map: &Map<String, Value>) -> OrmResult<Self> {
        let mut terms = Vec::with_capacity(map.len());
        for (key, value) in map {
            terms.push(parse_term(key, value)?);
        }
        Ok(Self { terms })
    }

    /// Parse the list held by an `or` key.
    pub fn fragments_from_json(value: &Value) -> OrmResult<Vec<Filter>> {
        let Value::Array(items) = value else {
            return Err(OrmError::malformed_filter(format!(
                "'{OR_KEY}' must hold an array of filters, got {}",
                Scalar::kind_of(value)
            )));
        };
        if items.is_empty() {
            return Err(OrmError::malformed_filter(format!(
                "'{OR_KEY}' must hold at least one filter"
            )));
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let Value::Object(map) = item else {
                    return Err(OrmError::malformed_filter(format!(
                        "'{OR_KEY}' entry {i} must be an object, got {}",
                        Scalar::kind_of(item)
                    )));
                };
                if map.is_empty() {
                    return Err(OrmError::malformed_filter(format!(
                        "'{OR_KEY}' entry {i} is empty"
                    )));
                }
                Filter::from_map(map)
            })
            .collect()
    }
}

fn parse_term(key: &str, value: &Value) -> OrmResult<Term> {
    if key == OR_KEY {
        return Filter::fragments_from_json(value).map(Term::Or);
    }
    if let Some(scalar) = Scalar::from_json(value) {
        return Ok(Term::Equals {
            field: key.to_string(),
            value: scalar,
        });
    }
    match value {
        Value::Object(map) => Ok(Term::Compare {
            field: key.to_string(),
            comparison: Comparison::from_map(key, map)?,
        }),
        other => Err(OrmError::malformed_filter(format!(
            "value for '{key}' cannot be {}",
            Scalar::kind_of(other)
        ))),
    }
}

/// A filter plus an optional column projection, as accepted by `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub select_columns: Option<Vec<String>>,
    pub filter: Filter,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            select_columns: None,
            filter,
        }
    }

    /// Project only these columns, in order.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Split `selectColumns` off a find-options object; the rest is the filter.
    ///
    /// The input is left untouched.
    pub fn from_json(value: &Value) -> OrmResult<Self> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(OrmError::malformed_filter(format!(
                    "find options must be an object, got {}",
                    Scalar::kind_of(other)
                )));
            }
        };

        let select_columns = map
            .get(SELECT_COLUMNS_KEY)
            .filter(|v| !v.is_null())
            .map(parse_select_columns)
            .transpose()?;

        let mut terms = Vec::with_capacity(map.len());
        for (key, value) in map.iter().filter(|(k, _)| *k != SELECT_COLUMNS_KEY) {
            terms.push(parse_term(key, value)?);
        }

        Ok(Self {
            select_columns,
            filter: Filter { terms },
        })
    }
}

fn parse_select_columns(value: &Value) -> OrmResult<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(OrmError::malformed_filter(format!(
            "'{SELECT_COLUMNS_KEY}' must be an array of column names"
        )));
    };
    if items.is_empty() {
        return Err(OrmError::malformed_filter(format!(
            "'{SELECT_COLUMNS_KEY}' must name at least one column"
        )));
    }
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(OrmError::malformed_filter(format!(
                "'{SELECT_COLUMNS_KEY}' entries must be strings, got {}",
                Scalar::kind_of(other)
            ))),
        })
        .collect()
}
