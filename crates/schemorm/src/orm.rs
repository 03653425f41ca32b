//! The ORM facade: schema-checked create/find/update/delete over a [`GenericClient`].
//!
//! ```ignore
//! use schemorm::{Orm, OrmConfig};
//! use serde_json::json;
//!
//! let orm = Orm::connect(OrmConfig::from_file("schemorm.toml")?)?;
//!
//! orm.create("user", &json!({"firstName": "gayan", "email": "gayan@example.com"})).await?;
//!
//! let user = orm.model("user")?;
//! let rows = user
//!     .find(&json!({"selectColumns": ["id"], "or": [{"firstName": "gayan"}, {"age": {">": 30}}]}))
//!     .await?;
//! user.update(&json!({"lastName": "witharana"}), &json!({"firstName": "gayan"})).await?;
//! user.delete(&json!({"firstName": "gayan"})).await?;
//! ```
//!
//! Statements are always built in [`RenderMode::Hardened`](crate::RenderMode::Hardened)
//! and logged at debug level under the `schemorm.sql` target before dispatch.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::filter::{Filter, FindQuery};
use crate::schema::{ModelSchema, SchemaRegistry};
use crate::statement::{Data, StatementBuilder};
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[cfg(feature = "pool")]
use crate::config::{Migrations, OrmConfig};
#[cfg(feature = "pool")]
use crate::error::OrmError;

/// Schema-driven access to the models of one database.
#[derive(Debug)]
pub struct Orm<C> {
    client: C,
    schemas: SchemaRegistry,
    builder: StatementBuilder,
}

#[cfg(feature = "pool")]
impl Orm<deadpool_postgres::Pool> {
    /// Validate the configuration, load the schema directory and create the pool.
    ///
    /// Adapter and migration problems are reported here, never per call.
    pub fn connect(config: OrmConfig) -> OrmResult<Self> {
        let adapter = config.adapter()?;
        let migrations = config.migration_mode()?;
        let schema_dir = config
            .schema_dir
            .as_deref()
            .ok_or_else(|| OrmError::Config("schema_dir is not set".to_string()))?;

        let schemas = SchemaRegistry::load_dir(schema_dir)?;
        apply_migrations(migrations, &schemas);
        let pool = crate::pool::create_pool(&config)?;

        tracing::info!(
            target: "schemorm",
            ?adapter,
            models = schemas.len(),
            connection_limit = config.connection_limit,
            "orm ready"
        );
        Ok(Self::with_client(pool, schemas))
    }

    /// Close the pool; outstanding connections are dropped when returned.
    pub fn end(&self) {
        self.client.close();
        tracing::info!(target: "schemorm", "connection ends");
    }
}

#[cfg(feature = "pool")]
fn apply_migrations(mode: Migrations, schemas: &SchemaRegistry) {
    tracing::warn!(
        target: "schemorm",
        ?mode,
        models = schemas.len(),
        "table structure migrations are not managed; tables must already exist"
    );
}

impl<C: GenericClient> Orm<C> {
    /// Build an ORM over any client (a pool, a single connection or a transaction).
    pub fn with_client(client: C, schemas: SchemaRegistry) -> Self {
        Self {
            client,
            schemas,
            builder: StatementBuilder::hardened(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// A handle bound to one model.
    pub fn model(&self, name: &str) -> OrmResult<ModelHandle<'_, C>> {
        let schema = self.schemas.require(name)?;
        Ok(ModelHandle { orm: self, schema })
    }

    /// Validate `data` against the model schema, then insert it.
    ///
    /// Returns the number of inserted rows.
    pub async fn create(&self, model: &str, data: &Value) -> OrmResult<u64> {
        let schema = self.schemas.require(model)?;
        schema.validate(data)?;
        let data = Data::from_json(data)?;
        let sql = self.builder.build_insert(schema.title(), &data)?;
        self.dispatch_execute(model, "create", &sql).await
    }

    /// Validate a typed payload against the model schema, then insert it.
    pub async fn create_with(&self, model: &str, data: &Data) -> OrmResult<u64> {
        self.create(model, &data.to_json()).await
    }

    /// Find rows; `options` is a filter that may carry `selectColumns`.
    pub async fn find(&self, model: &str, options: &Value) -> OrmResult<Vec<Row>> {
        let query = FindQuery::from_json(options)?;
        self.find_with(model, &query).await
    }

    pub async fn find_with(&self, model: &str, query: &FindQuery) -> OrmResult<Vec<Row>> {
        let schema = self.schemas.require(model)?;
        let sql = self.builder.build_select(schema.title(), query)?;
        tracing::debug!(target: "schemorm.sql", model, op = "find", sql = %sql);
        self.client.query(&sql, &[]).await
    }

    /// Update rows matching `filter`. Returns the number of updated rows.
    pub async fn update(&self, model: &str, data: &Value, filter: &Value) -> OrmResult<u64> {
        let data = Data::from_json(data)?;
        let filter = Filter::from_json(filter)?;
        self.update_with(model, &data, &filter).await
    }

    pub async fn update_with(&self, model: &str, data: &Data, filter: &Filter) -> OrmResult<u64> {
        let schema = self.schemas.require(model)?;
        let sql = self.builder.build_update(schema.title(), Some(data), filter)?;
        self.dispatch_execute(model, "update", &sql).await
    }

    /// Delete rows matching `filter`. Returns the number of deleted rows.
    pub async fn delete(&self, model: &str, filter: &Value) -> OrmResult<u64> {
        let filter = Filter::from_json(filter)?;
        self.delete_with(model, &filter).await
    }

    pub async fn delete_with(&self, model: &str, filter: &Filter) -> OrmResult<u64> {
        let schema = self.schemas.require(model)?;
        let sql = self.builder.build_delete(schema.title(), filter)?;
        self.dispatch_execute(model, "delete", &sql).await
    }

    /// Run a custom query with `$n` placeholders.
    ///
    /// ```ignore
    /// orm.query("UPDATE \"user\" SET \"firstName\" = $1 WHERE \"lastName\" = $2", &[&"gayan", &"witharana"]).await?;
    /// ```
    pub async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        tracing::debug!(target: "schemorm.sql", op = "query", params = params.len(), sql = %sql);
        self.client.query(sql, params).await
    }

    async fn dispatch_execute(&self, model: &str, op: &'static str, sql: &str) -> OrmResult<u64> {
        tracing::debug!(target: "schemorm.sql", model, op, sql = %sql);
        self.client.execute(sql, &[]).await
    }
}

/// Operations bound to one model, obtained from [`Orm::model`].
#[derive(Debug)]
pub struct ModelHandle<'a, C> {
    orm: &'a Orm<C>,
    schema: &'a ModelSchema,
}

impl<C: GenericClient> ModelHandle<'_, C> {
    pub fn name(&self) -> &str {
        self.schema.title()
    }

    pub fn schema(&self) -> &ModelSchema {
        self.schema
    }

    pub async fn create(&self, data: &Value) -> OrmResult<u64> {
        self.orm.create(self.name(), data).await
    }

    pub async fn find(&self, options: &Value) -> OrmResult<Vec<Row>> {
        self.orm.find(self.name(), options).await
    }

    pub async fn update(&self, data: &Value, filter: &Value) -> OrmResult<u64> {
        self.orm.update(self.name(), data, filter).await
    }

    pub async fn delete(&self, filter: &Value) -> OrmResult<u64> {
        self.orm.delete(self.name(), filter).await
    }
}
