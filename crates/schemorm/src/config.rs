//! ORM configuration.
//!
//! Usually loaded from TOML; `${VAR}` references in string values are expanded
//! from the environment:
//!
//! ```toml
//! adapter = "postgres"
//! url = "${DATABASE_URL}"
//! schema_dir = "schemas"
//! connection_limit = 20   # optional, defaults to 10
//! migrations = "alter"    # optional: create | alter, defaults to create
//! ```
//!
//! Instead of `url`, the connection may be given as `host`, `port`, `user`,
//! `password` and `db`.

use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default maximum number of pooled connections.
pub const DEFAULT_CONNECTION_LIMIT: usize = 10;

/// Supported database adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Postgres,
}

impl Adapter {
    pub fn parse(name: &str) -> OrmResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Adapter::Postgres),
            _ => Err(OrmError::UnsupportedAdapter(format!(
                "'{name}' is not supported"
            ))),
        }
    }
}

/// What to do with table structure at startup.
///
/// Neither mode issues DDL; the mode is validated and logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Migrations {
    /// Drop and recreate tables from the schemas.
    #[default]
    Create,
    /// Diff tables against the schemas and alter them.
    Alter,
}

impl Migrations {
    pub fn parse(name: &str) -> OrmResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Migrations::Create),
            "alter" => Ok(Migrations::Alter),
            _ => Err(OrmError::UnsupportedMigration(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrmConfig {
    pub adapter: Option<String>,
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub db: Option<String>,
    pub schema_dir: Option<PathBuf>,
    #[serde(default = "default_connection_limit")]
    pub connection_limit: usize,
    pub migrations: Option<String>,
}

fn default_connection_limit() -> usize {
    DEFAULT_CONNECTION_LIMIT
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            adapter: None,
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            db: None,
            schema_dir: None,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
            migrations: None,
        }
    }
}

impl OrmConfig {
    /// A Postgres configuration for `url`.
    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            adapter: Some("postgres".to_string()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }

    pub fn connection_limit(mut self, limit: usize) -> Self {
        self.connection_limit = limit;
        self
    }

    pub fn migrations(mut self, mode: impl Into<String>) -> Self {
        self.migrations = Some(mode.into());
        self
    }

    /// Parse TOML text and expand `${VAR}` references.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let mut config: OrmConfig =
            toml::from_str(raw).map_err(|e| OrmError::Config(format!("invalid config: {e}")))?;
        config.expand_env()?;
        Ok(config)
    }

    /// Load a TOML file. A relative `schema_dir` is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&raw)
            .map_err(|e| OrmError::Config(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if let Some(dir) = config.schema_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(config)
    }

    /// The configured adapter; a missing or unknown adapter is fatal.
    pub fn adapter(&self) -> OrmResult<Adapter> {
        match self.adapter.as_deref() {
            Some(name) => Adapter::parse(name),
            None => Err(OrmError::UnsupportedAdapter("adapter not set".to_string())),
        }
    }

    /// The migration mode, defaulting to [`Migrations::Create`].
    pub fn migration_mode(&self) -> OrmResult<Migrations> {
        self.migrations
            .as_deref()
            .map_or(Ok(Migrations::default()), Migrations::parse)
    }

    /// Build the driver configuration from `url` or the individual fields.
    pub fn pg_config(&self) -> OrmResult<tokio_postgres::Config> {
        if let Some(url) = &self.url {
            return url
                .parse()
                .map_err(|e: tokio_postgres::Error| OrmError::Config(format!("invalid url: {e}")));
        }

        let mut pg = tokio_postgres::Config::new();
        pg.host(self.host.as_deref().unwrap_or("localhost"));
        if let Some(port) = self.port {
            pg.port(port);
        }
        match &self.user {
            Some(user) => {
                pg.user(user);
            }
            None => return Err(OrmError::Config("either 'url' or 'user' must be set".into())),
        }
        if let Some(password) = &self.password {
            pg.password(password);
        }
        if let Some(db) = &self.db {
            pg.dbname(db);
        }
        Ok(pg)
    }

    fn expand_env(&mut self) -> OrmResult<()> {
        for field in [
            &mut self.adapter,
            &mut self.url,
            &mut self.host,
            &mut self.user,
            &mut self.password,
            &mut self.db,
            &mut self.migrations,
        ] {
            if let Some(value) = field.as_mut() {
                *value = expand_env_vars(value)?;
            }
        }
        if let Some(dir) = self.schema_dir.as_mut() {
            let raw = dir.to_string_lossy().into_owned();
            *dir = PathBuf::from(expand_env_vars(&raw)?);
        }
        Ok(())
    }
}

/// Replace `${VAR}` with the value of environment variable `VAR`.
pub fn expand_env_vars(input: &str) -> OrmResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            OrmError::Config(format!("unterminated env var reference in {input:?}"))
        })?;
        let key = &after[..end];
        if key.is_empty() {
            return Err(OrmError::Config("invalid env var reference: ${}".to_string()));
        }
        let value = std::env::var(key)
            .map_err(|_| OrmError::Config(format!("missing env var for config expansion: {key}")))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
