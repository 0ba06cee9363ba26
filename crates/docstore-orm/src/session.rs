//! The entry point: a session binds an executor, a configuration and one
//! set of alias/parameter-name generators.

use std::sync::Arc;

use docstore_sql_core::ast::{TableSource, UnaryOperand};
use docstore_sql_core::{CommandParameterValues, QueryGenerators, ToSqlValue};
use futures::future;
use futures::TryStreamExt;

use crate::config::StoreConfiguration;
use crate::error::Result;
use crate::executor::{log_command, CommandExecutor, PreparedCommand, QueryType};
use crate::mapping::{Document, DocumentMap};
use crate::query_builder::{QueryBuilder, QuerySource, SourceMetadata};
use crate::queryable::Queryable;
use crate::row::FromRow;

/// State shared by every builder a session hands out.
pub(crate) struct SessionContext {
    pub(crate) executor: Arc<dyn CommandExecutor>,
    pub(crate) configuration: StoreConfiguration,
    pub(crate) generators: QueryGenerators,
}

impl SessionContext {
    /// Attaches the configured timeout to `command` and logs it.
    pub(crate) fn prepare(&self, command: PreparedCommand) -> PreparedCommand {
        let command = command.with_command_timeout(self.configuration.command_timeout_duration());
        log_command(&command);
        command
    }

    /// Schema for `map`, falling back to the configured default.
    pub(crate) fn schema_for(&self, map: &DocumentMap) -> String {
        map.schema()
            .unwrap_or(&self.configuration.default_schema)
            .to_string()
    }

    pub(crate) fn metadata_for(&self, map: &DocumentMap) -> SourceMetadata {
        SourceMetadata::for_document(map, &self.configuration)
    }

    /// Streams `command` and maps every row.
    pub(crate) fn fetch<T: FromRow>(&self, command: PreparedCommand) -> Result<Vec<T>> {
        self.executor
            .stream(command)?
            .map(|row| row.and_then(T::from_row))
            .collect()
    }

    /// Maps the first row of `command`, if any. Later rows are not read.
    pub(crate) fn fetch_first<T: FromRow>(&self, command: PreparedCommand) -> Result<Option<T>> {
        self.executor
            .stream(command)?
            .next()
            .transpose()?
            .map(T::from_row)
            .transpose()
    }

    pub(crate) async fn fetch_async<T: FromRow>(
        &self,
        command: PreparedCommand,
    ) -> Result<Vec<T>> {
        self.executor
            .stream_async(command)
            .and_then(|row| future::ready(T::from_row(row)))
            .try_collect()
            .await
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("configuration", &self.configuration)
            .field("generators", &self.generators)
            .finish_non_exhaustive()
    }
}

/// One unit of work against a document store.
///
/// Cloning a session is cheap and shares its generators, so aliases and
/// parameter names stay unique across every query built from it.
#[derive(Debug, Clone)]
pub struct RelationalSession {
    context: Arc<SessionContext>,
}

impl RelationalSession {
    /// Creates a session.
    pub fn new(executor: Arc<dyn CommandExecutor>, configuration: StoreConfiguration) -> Self {
        Self {
            context: Arc::new(SessionContext {
                executor,
                configuration,
                generators: QueryGenerators::new(),
            }),
        }
    }

    /// The configuration this session was built with.
    #[must_use]
    pub fn configuration(&self) -> &StoreConfiguration {
        &self.context.configuration
    }

    /// Starts a query over the table mapped to `T`.
    #[must_use]
    pub fn query<T: Document>(&self) -> QueryBuilder<T> {
        let map = T::document_map();
        let schema = self.context.schema_for(&map);
        self.table_query(&map, schema, map.table().to_string())
    }

    /// Starts a query for `T` over an explicit schema and table.
    #[must_use]
    pub fn query_in<T: Document>(
        &self,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> QueryBuilder<T> {
        let map = T::document_map();
        self.table_query(&map, schema.into(), table.into())
    }

    fn table_query<T>(&self, map: &DocumentMap, schema: String, table: String) -> QueryBuilder<T> {
        QueryBuilder::from_source(
            Arc::clone(&self.context),
            QuerySource::Table(TableSource::new(Some(schema), table)),
            self.context.metadata_for(map),
        )
    }

    /// Combines two queries with `UNION`.
    #[must_use]
    pub fn union<T>(&self, first: QueryBuilder<T>, second: QueryBuilder<T>) -> QueryBuilder<T> {
        first.union(second)
    }

    /// Starts an expression-tree query over `T`.
    #[must_use]
    pub fn queryable<T: Document>(&self) -> Queryable<T> {
        Queryable::new(Arc::clone(&self.context))
    }

    /// Runs raw SQL and maps every row.
    ///
    /// # Errors
    ///
    /// Returns an error if execution or row mapping fails.
    pub fn raw_query<T: FromRow>(
        &self,
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
    ) -> Result<Vec<T>> {
        let command = self.raw_command(sql, parameter_values, QueryType::SelectMany);
        self.context.fetch(command)
    }

    /// Async form of [`raw_query`](Self::raw_query).
    ///
    /// # Errors
    ///
    /// Returns an error if execution or row mapping fails.
    pub async fn raw_query_async<T: FromRow>(
        &self,
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
    ) -> Result<Vec<T>> {
        let command = self.raw_command(sql, parameter_values, QueryType::SelectMany);
        self.context.fetch_async(command).await
    }

    /// Runs raw SQL that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    pub fn execute_non_query(
        &self,
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
    ) -> Result<u64> {
        let command = self.raw_command(sql, parameter_values, QueryType::NonQuery);
        self.context.executor.execute_non_query(command)
    }

    /// Async form of [`execute_non_query`](Self::execute_non_query).
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    pub async fn execute_non_query_async(
        &self,
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
    ) -> Result<u64> {
        let command = self.raw_command(sql, parameter_values, QueryType::NonQuery);
        self.context.executor.execute_non_query_async(command).await
    }

    /// Loads the document with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if execution or row mapping fails.
    pub fn load<T: Document>(&self, id: impl ToSqlValue) -> Result<Option<T>> {
        self.by_id::<T>(id).first_or_default()
    }

    /// Async form of [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns an error if execution or row mapping fails.
    pub async fn load_async<T: Document>(&self, id: impl ToSqlValue) -> Result<Option<T>> {
        self.by_id::<T>(id).first_or_default_async().await
    }

    fn by_id<T: Document>(&self, id: impl ToSqlValue) -> QueryBuilder<T> {
        let map = T::document_map();
        self.query::<T>()
            .where_(map.id().column_name(), UnaryOperand::Equal, id)
    }

    fn raw_command(
        &self,
        sql: impl Into<String>,
        parameter_values: CommandParameterValues,
        query_type: QueryType,
    ) -> PreparedCommand {
        self.context
            .prepare(PreparedCommand::new(sql, parameter_values, query_type))
    }
}
