//! Error types for the ORM.

use docstore_sql_core::{BuildError, SqlValue};
use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// The statement could not be assembled.
    #[error("statement construction failed: {0}")]
    Build(#[from] BuildError),

    /// The query uses a shape the translator or builder does not handle.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A member access could not be resolved to a column or JSON path.
    #[error("unknown member `{member}` on table {table}")]
    UnknownMember {
        /// Table of the queried document.
        table: String,
        /// Dotted member path.
        member: String,
    },

    /// A parameter referenced by the statement has neither a value nor a
    /// default.
    #[error("parameter @{0} has no value and no default")]
    MissingParameterValue(String),

    /// No row matched a query that requires one.
    #[error("object not found")]
    NotFound,

    /// The executor failed.
    #[error("execution failed: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A column value could not be converted.
    #[error("cannot map column {column}: {message}")]
    Mapping {
        /// Column name.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// A JSON payload could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A scalar query returned a value of the wrong shape.
    #[error("unexpected scalar result: {0:?}")]
    UnexpectedScalar(SqlValue),
}

impl OrmError {
    /// Wraps any executor error.
    pub fn execution(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Execution(error.into())
    }
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
