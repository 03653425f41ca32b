//! # schemorm
//!
//! A small JSON-Schema-driven ORM for Postgres.
//!
//! ## Features
//!
//! - **Schemas as models**: every `*.json` file in a directory is a model; its `title` names the table
//! - **Filter JSON**: equality, `<` / `>` comparisons and `or` disjunctions compile to a WHERE predicate
//! - **Validation first**: `create` checks the payload against the model schema before any SQL runs
//! - **Safe defaults**: DELETE requires a filter, UPDATE requires SET and a filter
//! - **Transaction-friendly**: any `GenericClient` (pool, connection, transaction) can back an `Orm`
//!
//! ## Filters
//!
//! ```ignore
//! use schemorm::{Filter, PredicateCompiler};
//! use serde_json::json;
//!
//! let filter = Filter::from_json(&json!({
//!     "or": [{"firstName": "gayan"}, {"age": {">": 30}}],
//!     "lastName": "witharana"
//! }))?;
//! let sql = PredicateCompiler::default().compile_where(&filter)?;
//! // (firstName='gayan' OR age >'30') AND lastName='witharana'
//! ```
//!
//! ## ORM
//!
//! ```ignore
//! use schemorm::{Orm, OrmConfig};
//! use serde_json::json;
//!
//! let orm = Orm::connect(OrmConfig::postgres("postgres://localhost/app").schema_dir("schemas"))?;
//! orm.create("person", &json!({"firstName": "gayan", "age": 31})).await?;
//! let rows = orm.find("person", &json!({"age": {">": 30}})).await?;
//! orm.end();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod literal;
pub mod orm;
pub mod predicate;
pub mod schema;
pub mod statement;
pub mod validate;

pub use client::GenericClient;
pub use config::{Adapter, DEFAULT_CONNECTION_LIMIT, Migrations, OrmConfig};
pub use error::{OrmError, OrmResult};
pub use filter::{CompareOp, Comparison, Filter, FindQuery, Term};
pub use ident::Ident;
pub use literal::{RenderMode, Scalar, render, render_escaped};
pub use orm::{ModelHandle, Orm};
pub use predicate::PredicateCompiler;
pub use schema::{ModelSchema, SchemaRegistry};
pub use statement::{Data, StatementBuilder};
pub use validate::{ValidationCode, ValidationError, ValidationErrors, validate};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_url};

// Re-export the driver so callers can name `Row` and `ToSql` without a direct dependency.
pub use tokio_postgres;
