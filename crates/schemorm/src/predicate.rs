//! Predicate compiler: [`Filter`] → boolean SQL text.
//!
//! Terms render as
//!
//! - equality: `field='value'`
//! - comparison: `field op'value'` (no space between operator and literal)
//! - conjunction: `(t1 AND t2 ...)`
//! - disjunction: `(t1 OR t2 ...)`
//!
//! The top-level filter given to [`PredicateCompiler::compile_where`] is a conjunction
//! without the surrounding parentheses, so it reads naturally after `WHERE`.

use crate::error::{OrmError, OrmResult};
use crate::filter::{Comparison, Filter, Term};
use crate::literal::{RenderMode, Scalar};
use serde_json::Value;

/// Compiles filters into predicate text.
///
/// The compiler holds no state besides its [`RenderMode`]; it is `Copy` and can be
/// shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateCompiler {
    mode: RenderMode,
}

impl PredicateCompiler {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Compile the body of a `WHERE` clause. An empty filter yields an empty string.
    pub fn compile_where(&self, filter: &Filter) -> OrmResult<String> {
        Ok(self.compile_terms(filter.terms())?.join(" AND "))
    }

    /// Compile a filter as a parenthesized conjunction. An empty filter yields `()`.
    pub fn compile_conjunction(&self, filter: &Filter) -> OrmResult<String> {
        Ok(format!("({})", self.compile_terms(filter.terms())?.join(" AND ")))
    }

    /// Compile a parenthesized disjunction of fragments.
    ///
    /// Fragments with several terms become nested conjunctions; single-term
    /// fragments contribute the term itself.
    pub fn compile_disjunction(&self, fragments: &[Filter]) -> OrmResult<String> {
        if fragments.is_empty() {
            return Err(OrmError::malformed_filter("disjunction needs at least one filter"));
        }
        let mut parts = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            match fragment.terms() {
                [] => return Err(OrmError::malformed_filter("disjunction entry is empty")),
                [single] => parts.push(self.compile_term(single)?),
                _ => parts.push(self.compile_conjunction(fragment)?),
            }
        }
        Ok(format!("({})", parts.join(" OR ")))
    }

    /// Compile `field op'value'`.
    pub fn compile_comparison(&self, field: &str, comparison: &Comparison) -> OrmResult<String> {
        Ok(format!(
            "{} {}{}",
            self.mode.ident(field)?,
            comparison.op.as_str(),
            self.mode.literal(&comparison.value)?
        ))
    }

    /// Compile `field='value'`.
    pub fn compile_equality(&self, field: &str, value: &Scalar) -> OrmResult<String> {
        Ok(format!(
            "{}={}",
            self.mode.ident(field)?,
            self.mode.literal(value)?
        ))
    }

    /// Parse and compile a raw `WHERE` filter object.
    pub fn compile_where_json(&self, filter: &Value) -> OrmResult<String> {
        self.compile_where(&Filter::from_json(filter)?)
    }

    /// Parse and compile a raw `{op: value}` comparison object for `field`.
    pub fn compile_comparison_json(&self, field: &str, comparison: &Value) -> OrmResult<String> {
        self.compile_comparison(field, &Comparison::from_json(field, comparison)?)
    }

    fn compile_terms(&self, terms: &[Term]) -> OrmResult<Vec<String>> {
        terms.iter().map(|term| self.compile_term(term)).collect()
    }

    fn compile_term(&self, term: &Term) -> OrmResult<String> {
        match term {
            Term::Equals { field, value } => self.compile_equality(field, value),
            Term::Compare { field, comparison } => self.compile_comparison(field, comparison),
            Term::Or(fragments) => self.compile_disjunction(fragments),
        }
    }
}
