//! Statement builder: SELECT / INSERT / UPDATE / DELETE text.
//!
//! ```ignore
//! use schemorm::{Data, Filter, FindQuery, StatementBuilder};
//!
//! let b = StatementBuilder::new();
//! b.build_select("user", &FindQuery::new(Filter::new().gt("age", 18)).select(["id", "name"]))?;
//! // SELECT id,name FROM user WHERE age >'18'
//!
//! b.build_insert("user", &Data::new().set("firstName", "gayan"))?;
//! // INSERT INTO user (firstName) VALUES ('gayan');
//! ```
//!
//! Safe defaults: an UPDATE needs something to SET, and UPDATE/DELETE need a
//! non-empty filter. A SELECT with an empty filter drops its `WHERE` clause.

use crate::error::{OrmError, OrmResult};
use crate::filter::{Filter, FindQuery};
use crate::literal::{RenderMode, Scalar};
use crate::predicate::PredicateCompiler;
use serde_json::{Map, Value};

/// A flat, ordered mapping of column → scalar used as an INSERT/UPDATE payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    columns: Vec<(String, Scalar)>,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. Setting an existing column replaces its value in place.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &(String, Scalar)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parse a payload object. Values must be strings, numbers or booleans.
    ///
    /// `null` is treated as an absent payload.
    pub fn from_json(value: &Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Self::from_map(map),
            other => Err(OrmError::malformed_data(format!(
                "data must be an object, got {}",
                Scalar::kind_of(other)
            ))),
        }
    }

    /// The payload as a JSON object, in column order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.columns
                .iter()
                .map(|(column, value)| (column.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn from_map(map: &Map<String, Value>) -> OrmResult<Self> {
        let columns = map
            .iter()
            .map(|(column, value)| {
                Scalar::from_json(value)
                    .map(|scalar| (column.clone(), scalar))
                    .ok_or_else(|| {
                        OrmError::malformed_data(format!(
                            "column '{column}' cannot hold {}",
                            Scalar::kind_of(value)
                        ))
                    })
            })
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(Self { columns })
    }
}

/// Builds complete statement text from a table name, data and filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    compiler: PredicateCompiler,
}

impl StatementBuilder {
    /// A builder producing verbatim (compatibility) text.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder escaping literals and validating identifiers.
    pub fn hardened() -> Self {
        Self::with_mode(RenderMode::Hardened)
    }

    pub fn with_mode(mode: RenderMode) -> Self {
        Self {
            compiler: PredicateCompiler::new(mode),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.compiler.mode()
    }

    pub fn compiler(&self) -> &PredicateCompiler {
        &self.compiler
    }

    /// `SELECT <cols|*> FROM <table> WHERE <predicate>`
    pub fn build_select(&self, table: &str, query: &FindQuery) -> OrmResult<String> {
        let mode = self.mode();
        let columns = match &query.select_columns {
            Some(columns) if columns.is_empty() => {
                return Err(OrmError::malformed_filter(
                    "selectColumns must name at least one column",
                ));
            }
            Some(columns) => columns
                .iter()
                .map(|c| mode.ident(c))
                .collect::<OrmResult<Vec<_>>>()?
                .join(","),
            None => "*".to_string(),
        };

        let mut sql = format!("SELECT {} FROM {}", columns, mode.ident(table)?);
        let predicate = self.compiler.compile_where(&query.filter)?;
        if !predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        Ok(sql)
    }

    /// `INSERT INTO <table> (<cols>) VALUES (<vals>);`
    pub fn build_insert(&self, table: &str, data: &Data) -> OrmResult<String> {
        if data.is_empty() {
            return Err(OrmError::EmptyInsert);
        }
        let mode = self.mode();
        let mut columns = Vec::with_capacity(data.len());
        let mut values = Vec::with_capacity(data.len());
        for (column, value) in data.columns() {
            columns.push(mode.ident(column)?);
            values.push(mode.literal(value)?);
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            mode.ident(table)?,
            columns.join(","),
            values.join(",")
        ))
    }

    /// `UPDATE <table> SET <col='v', ...> WHERE <predicate>;`
    pub fn build_update(&self, table: &str, data: Option<&Data>, filter: &Filter) -> OrmResult<String> {
        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => return Err(OrmError::EmptyUpdate),
        };
        let assignments = data
            .columns()
            .map(|(column, value)| self.compiler.compile_equality(column, value))
            .collect::<OrmResult<Vec<_>>>()?;
        let predicate = self.required_predicate("UPDATE", filter)?;
        Ok(format!(
            "UPDATE {} SET {} WHERE {};",
            self.mode().ident(table)?,
            assignments.join(", "),
            predicate
        ))
    }

    /// `DELETE FROM <table> WHERE <predicate>;`
    pub fn build_delete(&self, table: &str, filter: &Filter) -> OrmResult<String> {
        let predicate = self.required_predicate("DELETE", filter)?;
        Ok(format!(
            "DELETE FROM {} WHERE {};",
            self.mode().ident(table)?,
            predicate
        ))
    }

    fn required_predicate(&self, statement: &'static str, filter: &Filter) -> OrmResult<String> {
        if filter.is_empty() {
            return Err(OrmError::MissingFilter(statement));
        }
        self.compiler.compile_where(filter)
    }
}

#[cfg(test)]
mod tests;
