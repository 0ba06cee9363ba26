//! Operations that execute a query builder.

use docstore_sql_core::statements::{
    count_select, exists_statement, paged_select, paged_select_with_count,
    CROSS_JOIN_COUNT_COLUMN,
};
use docstore_sql_core::{CommandParameterValues, SqlValue};
use futures::TryStreamExt;
use tracing::debug;

use super::{CaseInsensitiveMap, QueryBuilder};
use crate::error::{OrmError, Result};
use crate::executor::{PreparedCommand, QueryType};
use crate::row::{FromRow, Row};

/// Reads a `COUNT(*)` result.
pub(crate) fn scalar_to_count(value: SqlValue) -> Result<i64> {
    match value {
        SqlValue::Int(count) => Ok(count),
        other => Err(OrmError::UnexpectedScalar(other)),
    }
}

/// Reads an existence check result: `1` is true, `0` is false.
pub(crate) fn scalar_to_bool(value: SqlValue) -> Result<bool> {
    match value {
        SqlValue::Int(1) | SqlValue::Bool(true) => Ok(true),
        SqlValue::Int(0) | SqlValue::Bool(false) => Ok(false),
        other => Err(OrmError::UnexpectedScalar(other)),
    }
}

impl<T: FromRow> QueryBuilder<T> {
    fn fetch(&self, command: PreparedCommand) -> Result<Vec<T>> {
        self.context.fetch(command)
    }

    async fn fetch_async(&self, command: PreparedCommand) -> Result<Vec<T>> {
        self.context.fetch_async(command).await
    }

    fn limited(mut self, top: u64) -> Self {
        self.select_mut().add_top(top);
        self
    }

    fn single_command(self) -> Result<(Self, PreparedCommand)> {
        let builder = self.limited(1);
        let command = builder.command(
            builder.current_statement(),
            CommandParameterValues::new(),
            QueryType::SelectSingle,
        )?;
        Ok((builder, command))
    }

    fn count_command(&self) -> Result<PreparedCommand> {
        let statement = count_select(&self.current_builder(), &self.context.generators);
        self.command(
            statement.into(),
            CommandParameterValues::new(),
            QueryType::Count,
        )
    }

    fn exists_command(&self) -> Result<PreparedCommand> {
        let bound = exists_statement(&self.current_builder());
        self.command(bound.statement, bound.parameter_values, QueryType::Exists)
    }

    fn paged_command(&self, skip: u64, take: u64) -> Result<PreparedCommand> {
        let bound = paged_select(
            &self.current_builder(),
            skip,
            Some(take),
            &self.context.generators,
        );
        self.command(bound.statement, bound.parameter_values, QueryType::SelectMany)
    }

    fn paged_with_count_command(&self, skip: u64, take: u64) -> Result<PreparedCommand> {
        let bound = paged_select_with_count(
            &self.current_builder(),
            skip,
            Some(take),
            &self.context.generators,
        );
        self.command(bound.statement, bound.parameter_values, QueryType::SelectMany)
    }

    /// Runs the query and maps every row.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn to_list(self) -> Result<Vec<T>> {
        let command = self.to_command()?;
        self.fetch(command)
    }

    /// Runs the query and yields records as rows arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing or execution cannot start.
    pub fn stream(self) -> Result<impl Iterator<Item = Result<T>> + Send> {
        let command = self.to_command()?;
        Ok(self
            .context
            .executor
            .stream(command)?
            .map(|row| row.and_then(T::from_row)))
    }

    /// Runs the query with `TOP n`.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn take(self, n: u64) -> Result<Vec<T>> {
        self.limited(n).to_list()
    }

    /// Runs the query with `TOP 1` and returns the row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn first_or_default(self) -> Result<Option<T>> {
        let (builder, command) = self.single_command()?;
        builder.context.fetch_first(command)
    }

    /// Counts the rows the query would return. Ordering is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails or the scalar is not an integer.
    pub fn count(&self) -> Result<i64> {
        let command = self.count_command()?;
        scalar_to_count(self.context.executor.execute_scalar(command)?)
    }

    /// Returns whether the query matches any row.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails or the scalar is neither `1`
    /// nor `0`.
    pub fn any(&self) -> Result<bool> {
        let command = self.exists_command()?;
        scalar_to_bool(self.context.executor.execute_scalar(command)?)
    }

    /// Returns rows `skip + 1 ..= skip + take` by row number.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn to_list_paged(self, skip: u64, take: u64) -> Result<Vec<T>> {
        let command = self.paged_command(skip, take)?;
        self.fetch(command)
    }

    /// Returns one page and the total number of matching rows.
    ///
    /// With `use_cte_based_list_with_count` set, page and total come back in
    /// one statement; an empty page falls back to a separate count.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn to_list_with_count(self, skip: u64, take: u64) -> Result<(Vec<T>, i64)> {
        if !self.context.configuration.use_cte_based_list_with_count {
            let total = self.count()?;
            let records = self.to_list_paged(skip, take)?;
            return Ok((records, total));
        }
        let command = self.paged_with_count_command(skip, take)?;
        let rows: Vec<Row> = self.context.executor.stream(command)?.collect::<Result<_>>()?;
        let Some(first) = rows.first() else {
            debug!(skip, take, "Page with count returned no rows, counting separately");
            return Ok((Vec::new(), self.count()?));
        };
        let total = first.get::<i64>(CROSS_JOIN_COUNT_COLUMN)?;
        let records = rows.into_iter().map(T::from_row).collect::<Result<_>>()?;
        Ok((records, total))
    }

    /// Runs the query and indexes the records by `key`, ignoring case.
    /// Later records replace earlier ones with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is missing, or if execution or row
    /// mapping fails.
    pub fn to_dictionary<F>(self, key: F) -> Result<CaseInsensitiveMap<T>>
    where
        F: Fn(&T) -> String,
    {
        let records = self.to_list()?;
        Ok(records
            .into_iter()
            .map(|record| (key(&record), record))
            .collect())
    }

    /// Async form of [`to_list`](Self::to_list).
    ///
    /// # Errors
    ///
    /// See [`to_list`](Self::to_list).
    pub async fn to_list_async(self) -> Result<Vec<T>> {
        let command = self.to_command()?;
        self.fetch_async(command).await
    }

    /// Async form of [`take`](Self::take).
    ///
    /// # Errors
    ///
    /// See [`take`](Self::take).
    pub async fn take_async(self, n: u64) -> Result<Vec<T>> {
        self.limited(n).to_list_async().await
    }

    /// Async form of [`first_or_default`](Self::first_or_default).
    ///
    /// # Errors
    ///
    /// See [`first_or_default`](Self::first_or_default).
    pub async fn first_or_default_async(self) -> Result<Option<T>> {
        let (builder, command) = self.single_command()?;
        let rows = builder.fetch_async(command).await?;
        Ok(rows.into_iter().next())
    }

    /// Async form of [`count`](Self::count).
    ///
    /// # Errors
    ///
    /// See [`count`](Self::count).
    pub async fn count_async(&self) -> Result<i64> {
        let command = self.count_command()?;
        scalar_to_count(self.context.executor.execute_scalar_async(command).await?)
    }

    /// Async form of [`any`](Self::any).
    ///
    /// # Errors
    ///
    /// See [`any`](Self::any).
    pub async fn any_async(&self) -> Result<bool> {
        let command = self.exists_command()?;
        scalar_to_bool(self.context.executor.execute_scalar_async(command).await?)
    }

    /// Async form of [`to_list_paged`](Self::to_list_paged).
    ///
    /// # Errors
    ///
    /// See [`to_list_paged`](Self::to_list_paged).
    pub async fn to_list_paged_async(self, skip: u64, take: u64) -> Result<Vec<T>> {
        let command = self.paged_command(skip, take)?;
        self.fetch_async(command).await
    }

    /// Async form of [`to_list_with_count`](Self::to_list_with_count).
    ///
    /// # Errors
    ///
    /// See [`to_list_with_count`](Self::to_list_with_count).
    pub async fn to_list_with_count_async(self, skip: u64, take: u64) -> Result<(Vec<T>, i64)> {
        if !self.context.configuration.use_cte_based_list_with_count {
            let total = self.count_async().await?;
            let records = self.to_list_paged_async(skip, take).await?;
            return Ok((records, total));
        }
        let command = self.paged_with_count_command(skip, take)?;
        let rows: Vec<Row> = self
            .context
            .executor
            .stream_async(command)
            .try_collect()
            .await?;
        let Some(first) = rows.first() else {
            debug!(skip, take, "Page with count returned no rows, counting separately");
            return Ok((Vec::new(), self.count_async().await?));
        };
        let total = first.get::<i64>(CROSS_JOIN_COUNT_COLUMN)?;
        let records = rows.into_iter().map(T::from_row).collect::<Result<_>>()?;
        Ok((records, total))
    }

    /// Async form of [`to_dictionary`](Self::to_dictionary).
    ///
    /// # Errors
    ///
    /// See [`to_dictionary`](Self::to_dictionary).
    pub async fn to_dictionary_async<F>(self, key: F) -> Result<CaseInsensitiveMap<T>>
    where
        F: Fn(&T) -> String,
    {
        let records = self.to_list_async().await?;
        Ok(records
            .into_iter()
            .map(|record| (key(&record), record))
            .collect())
    }
}
