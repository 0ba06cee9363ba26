//! The executor contract between query front ends and a database driver.
//!
//! Everything above this module is pure: builders and the translator turn
//! a query into a [`PreparedCommand`]. An implementation of
//! [`CommandExecutor`] sends the command to the server and hands back rows
//! or a scalar.
//!
//! The async methods default to running the blocking methods in place, so a
//! driver only has to implement the blocking trio to be usable from both
//! sides. Cancellation is by dropping the returned future or stream.

use std::time::Duration;

use docstore_sql_core::{CommandParameterValues, SqlValue};
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::error::Result;
use crate::row::Row;

/// What a command is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Any number of rows.
    SelectMany,
    /// At most one row.
    SelectSingle,
    /// One `bit`-like scalar.
    Exists,
    /// One integer scalar.
    Count,
    /// No result set.
    NonQuery,
}

/// A rendered statement ready for an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCommand {
    /// Statement text.
    pub sql: String,
    /// Values for every `@name` placeholder in `sql`.
    pub parameter_values: CommandParameterValues,
    /// Expected result shape.
    pub query_type: QueryType,
    /// Server-side timeout, if one is configured.
    pub command_timeout: Option<Duration>,
}

impl PreparedCommand {
    /// Creates a command without a timeout.
    #[must_use]
    pub fn new(
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
        query_type: QueryType,
    ) -> Self {
        Self {
            sql: sql.into(),
            parameter_values,
            query_type,
            command_timeout: None,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Rows produced by a blocking executor.
pub type RowIterator = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// Sends prepared commands to the database.
pub trait CommandExecutor: Send + Sync {
    /// Runs a command returning a single value.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`](crate::OrmError::Execution) if the
    /// driver fails.
    fn execute_scalar(&self, command: PreparedCommand) -> Result<SqlValue>;

    /// Runs a command returning no rows and reports the affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`](crate::OrmError::Execution) if the
    /// driver fails.
    fn execute_non_query(&self, command: PreparedCommand) -> Result<u64>;

    /// Runs a command and yields its rows.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`](crate::OrmError::Execution) if the
    /// command cannot be started. Errors while reading are yielded by the
    /// iterator.
    fn stream(&self, command: PreparedCommand) -> Result<RowIterator>;

    /// Async form of [`execute_scalar`](Self::execute_scalar).
    fn execute_scalar_async(&self, command: PreparedCommand) -> BoxFuture<'_, Result<SqlValue>> {
        future::ready(self.execute_scalar(command)).boxed()
    }

    /// Async form of [`execute_non_query`](Self::execute_non_query).
    fn execute_non_query_async(&self, command: PreparedCommand) -> BoxFuture<'_, Result<u64>> {
        future::ready(self.execute_non_query(command)).boxed()
    }

    /// Async form of [`stream`](Self::stream).
    fn stream_async(&self, command: PreparedCommand) -> BoxStream<'_, Result<Row>> {
        match self.stream(command) {
            Ok(rows) => stream::iter(rows).boxed(),
            Err(error) => stream::once(future::ready(Err(error))).boxed(),
        }
    }
}

/// Logs a command at the point it is handed to the executor.
pub(crate) fn log_command(command: &PreparedCommand) {
    debug!(
        sql = %command.sql,
        parameters = %command.parameter_values,
        query_type = ?command.query_type,
        timeout = ?command.command_timeout,
        "Executing SQL"
    );
}
