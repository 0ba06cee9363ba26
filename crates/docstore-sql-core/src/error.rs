//! Error types for statement construction.

use thiserror::Error;

/// Errors raised while assembling a statement, before any SQL is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A join other than `CROSS JOIN` was created without an `ON` condition.
    #[error("join against {source_alias} has no ON condition")]
    MissingJoinCondition {
        /// Alias of the joined source.
        source_alias: String,
    },

    /// The number of parameter values differs from the declared parameters.
    #[error("expected {expected} parameter values but {actual} were supplied")]
    ParameterCountMismatch {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied values.
        actual: usize,
    },

    /// The number of parameter defaults differs from the declared parameters.
    #[error("expected {expected} parameter defaults but {actual} were supplied")]
    DefaultCountMismatch {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied defaults.
        actual: usize,
    },
}

/// Result type alias for statement construction.
pub type Result<T> = std::result::Result<T, BuildError>;
