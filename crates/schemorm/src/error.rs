//! Error types for schemorm

use crate::validate::ValidationErrors;
use thiserror::Error;

/// Result type alias for schemorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for filter compilation, statement building and database access.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A filter has a shape the predicate compiler cannot express
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    /// An insert/update payload is not a flat mapping of scalars
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// UPDATE called with nothing to SET
    #[error("update tables or values are not set")]
    EmptyUpdate,

    /// INSERT called with no columns
    #[error("insert requires at least one column")]
    EmptyInsert,

    /// UPDATE/DELETE without a WHERE predicate
    #[error("{0} requires a non-empty filter")]
    MissingFilter(&'static str),

    /// Identifier rejected in hardened mode
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The configured adapter is not available
    #[error("Unsupported adapter: {0}")]
    UnsupportedAdapter(String),

    /// The configured migration mode is not recognized
    #[error("Unsupported migration type: {0}")]
    UnsupportedMigration(String),

    /// No schema with this title was loaded
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Schema file could not be read or is not a usable model definition
    #[error("Schema error: {0}")]
    Schema(String),

    /// Data failed schema validation
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unique constraint violation (SQLSTATE 23505)
    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation (SQLSTATE 23503)
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation (SQLSTATE 23514)
    #[error("Check violation: {0}")]
    CheckViolation(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl OrmError {
    /// Create a malformed filter error
    pub fn malformed_filter(message: impl Into<String>) -> Self {
        Self::MalformedFilter(message.into())
    }

    /// Create a malformed data error
    pub fn malformed_data(message: impl Into<String>) -> Self {
        Self::MalformedData(message.into())
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Check if this is a malformed filter error
    pub fn is_malformed_filter(&self) -> bool {
        matches!(self, Self::MalformedFilter(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Parse a tokio_postgres error.
    ///
    /// Constraint violations keep the server message as `"{constraint}: {message}"`;
    /// a closed connection becomes [`OrmError::Connection`], anything else [`OrmError::Query`].
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{constraint}: {message}")),
                "23503" => return Self::ForeignKeyViolation(format!("{constraint}: {message}")),
                "23514" => return Self::CheckViolation(format!("{constraint}: {message}")),
                _ => {}
            }
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}

impl From<ValidationErrors> for OrmError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
