//! Expression-tree queries.
//!
//! A [`Queryable`] records query operators as a [`QueryExpr`] and only
//! translates them when a terminal operation runs. Translation and the
//! fluent [`QueryBuilder`](crate::QueryBuilder) share the statement shapes,
//! so equivalent queries produce the same SQL text:
//!
//! ```rust,ignore
//! let bobs = session
//!     .queryable::<Customer>()
//!     .filter(field("Name").eq("Bob"))
//!     .order_by(field("Age"))
//!     .take(10)
//!     .to_list()?;
//! ```

pub mod expression;
mod translator;

pub use expression::{field, value, values, BinaryOperator, Expr, Method, QueryExpr, QueryMethod};
pub use translator::QueryTranslator;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use docstore_sql_core::CommandParameterValues;

use crate::error::{OrmError, Result};
use crate::executor::PreparedCommand;
use crate::mapping::Document;
use crate::query_builder::{scalar_to_bool, scalar_to_count};
use crate::session::SessionContext;

/// A lazily translated query over documents of type `T`.
pub struct Queryable<T> {
    context: Arc<SessionContext>,
    expression: QueryExpr,
    record: PhantomData<fn() -> T>,
}

impl<T> Clone for Queryable<T> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            expression: self.expression.clone(),
            record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Queryable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queryable")
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

impl<T> Queryable<T> {
    pub(crate) const fn new(context: Arc<SessionContext>) -> Self {
        Self {
            context,
            expression: QueryExpr::Source,
            record: PhantomData,
        }
    }

    /// The operators recorded so far.
    #[must_use]
    pub const fn expression(&self) -> &QueryExpr {
        &self.expression
    }

    /// Applies any operator, including ones without a translation.
    #[must_use]
    pub fn apply(mut self, method: QueryMethod) -> Self {
        self.expression = self.expression.then(method);
        self
    }

    /// Keeps records matching `predicate`.
    #[must_use]
    pub fn filter(self, predicate: Expr) -> Self {
        self.apply(QueryMethod::Where(predicate))
    }

    /// Orders by `key`, replacing earlier ordering.
    #[must_use]
    pub fn order_by(self, key: Expr) -> Self {
        self.apply(QueryMethod::OrderBy(key))
    }

    /// Orders by `key` descending, replacing earlier ordering.
    #[must_use]
    pub fn order_by_descending(self, key: Expr) -> Self {
        self.apply(QueryMethod::OrderByDescending(key))
    }

    /// Adds a secondary ascending ordering.
    #[must_use]
    pub fn then_by(self, key: Expr) -> Self {
        self.apply(QueryMethod::ThenBy(key))
    }

    /// Adds a secondary descending ordering.
    #[must_use]
    pub fn then_by_descending(self, key: Expr) -> Self {
        self.apply(QueryMethod::ThenByDescending(key))
    }

    /// Skips `n` records.
    #[must_use]
    pub fn skip(self, n: u64) -> Self {
        self.apply(QueryMethod::Skip(n))
    }

    /// Keeps at most `n` records.
    #[must_use]
    pub fn take(self, n: u64) -> Self {
        self.apply(QueryMethod::Take(n))
    }

    /// Adds a raw SQL predicate; `values` must cover its placeholders.
    #[must_use]
    pub fn where_raw(self, sql: &str, values: CommandParameterValues) -> Self {
        self.apply(QueryMethod::RawWhere(sql.to_string(), values))
    }
}

impl<T: Document> Queryable<T> {
    fn command_for(&self, expression: &QueryExpr) -> Result<PreparedCommand> {
        let translator = QueryTranslator::new(
            T::document_map(),
            &self.context.configuration,
            &self.context.generators,
        );
        let command = translator.translate(expression)?;
        Ok(self.context.prepare(command))
    }

    fn terminal_command(&self, method: QueryMethod) -> Result<PreparedCommand> {
        self.command_for(&self.expression.clone().then(method))
    }

    /// The command a listing would run.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotSupported`] or [`OrmError::UnknownMember`] if
    /// the expression cannot be translated.
    pub fn translate(&self) -> Result<PreparedCommand> {
        self.command_for(&self.expression)
    }

    /// Runs the query and maps every row.
    ///
    /// # Errors
    ///
    /// Returns an error if translation, execution or row mapping fails.
    pub fn to_list(self) -> Result<Vec<T>> {
        let command = self.translate()?;
        self.context.fetch(command)
    }

    /// Returns the first record.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotFound`] if nothing matches, or an error if
    /// translation, execution or row mapping fails.
    pub fn first(self) -> Result<T> {
        let command = self.terminal_command(QueryMethod::First(None))?;
        self.context.fetch_first(command)?.ok_or(OrmError::NotFound)
    }

    /// Returns the first record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if translation, execution or row mapping fails.
    pub fn first_or_default(self) -> Result<Option<T>> {
        let command = self.terminal_command(QueryMethod::FirstOrDefault(None))?;
        self.context.fetch_first(command)
    }

    /// Returns whether any record matches.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or execution fails, or if the scalar
    /// is neither `1` nor `0`.
    pub fn any(&self) -> Result<bool> {
        let command = self.terminal_command(QueryMethod::Any(None))?;
        scalar_to_bool(self.context.executor.execute_scalar(command)?)
    }

    /// Counts matching records.
    ///
    /// # Errors
    ///
    /// Returns an error if translation or execution fails, or if the scalar
    /// is not an integer.
    pub fn count(&self) -> Result<i64> {
        let command = self.terminal_command(QueryMethod::Count(None))?;
        scalar_to_count(self.context.executor.execute_scalar(command)?)
    }

    /// Async form of [`to_list`](Self::to_list).
    ///
    /// # Errors
    ///
    /// See [`to_list`](Self::to_list).
    pub async fn to_list_async(self) -> Result<Vec<T>> {
        let command = self.translate()?;
        self.context.fetch_async(command).await
    }

    /// Async form of [`first`](Self::first).
    ///
    /// # Errors
    ///
    /// See [`first`](Self::first).
    pub async fn first_async(self) -> Result<T> {
        self.first_or_default_async()
            .await?
            .ok_or(OrmError::NotFound)
    }

    /// Async form of [`first_or_default`](Self::first_or_default).
    ///
    /// # Errors
    ///
    /// See [`first_or_default`](Self::first_or_default).
    pub async fn first_or_default_async(self) -> Result<Option<T>> {
        let command = self.terminal_command(QueryMethod::FirstOrDefault(None))?;
        let records = self.context.fetch_async(command).await?;
        Ok(records.into_iter().next())
    }

    /// Async form of [`any`](Self::any).
    ///
    /// # Errors
    ///
    /// See [`any`](Self::any).
    pub async fn any_async(&self) -> Result<bool> {
        let command = self.terminal_command(QueryMethod::Any(None))?;
        scalar_to_bool(self.context.executor.execute_scalar_async(command).await?)
    }

    /// Async form of [`count`](Self::count).
    ///
    /// # Errors
    ///
    /// See [`count`](Self::count).
    pub async fn count_async(&self) -> Result<i64> {
        let command = self.terminal_command(QueryMethod::Count(None))?;
        scalar_to_count(self.context.executor.execute_scalar_async(command).await?)
    }
}
