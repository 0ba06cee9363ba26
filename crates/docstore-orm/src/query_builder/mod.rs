//! Fluent query builders.
//!
//! A [`QueryBuilder`] starts from a [`QuerySource`] (a table, a join, a
//! subquery or a union). The source stays untouched until the first clause
//! is added; at that point a [`SelectBuilder`] is created for it with
//! [`select_builder_for`] and every later call edits that builder.
//!
//! Every chaining method takes the builder by value and hands back a new
//! one. A handle consumed by a terminal operation cannot be reused, and an
//! intermediate handle that was cloned keeps its own clauses:
//!
//! ```rust,ignore
//! let active = session.query::<Customer>().where_("IsActive", UnaryOperand::Equal, true);
//! let recent = active.clone().order_by_descending("Created");
//! let count = active.count()?;          // no ORDER BY here
//! let page = recent.to_list_paged(0, 20)?;
//! ```
//!
//! Values are always bound through parameters. Parameter names come from the
//! session's generator, so repeated filters on one field produce `name`,
//! `name_1`, `name_2`, ... in call order.

mod dictionary;
mod join;
mod parameterized;
mod placeholders;
mod source;
mod terminal;

pub use dictionary::CaseInsensitiveMap;
pub use join::PendingJoin;
pub use parameterized::{ParameterizedBetween, ParameterizedIn, ParameterizedWhere};
pub use source::{select_builder_for, QuerySource, SourceMetadata};
pub(crate) use placeholders::{ensure_bound, normalize_casing};
pub(crate) use terminal::{scalar_to_bool, scalar_to_count};

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use docstore_sql_core::ast::{
    ArrayOperand, CalculatedColumn, FieldReference, GenerateSql, OptionClause,
    OrderByDirection, OrderByField, PartitionBy, SelectColumn, Statement, UnaryOperand,
    WhereClause,
};
use docstore_sql_core::{
    CommandParameterValues, Parameter, ParameterDefaults, ParameterValues, Parameters,
    SelectBuilder, SqlValue, ToSqlValue,
};

use crate::error::Result;
use crate::executor::{PreparedCommand, QueryType};
use crate::session::SessionContext;

use source::union_of;

/// A chainable query over records of type `T`.
pub struct QueryBuilder<T> {
    context: Arc<SessionContext>,
    source: QuerySource,
    select: Option<SelectBuilder>,
    parameter_values: CommandParameterValues,
    parameter_defaults: CommandParameterValues,
    declared: Vec<Parameter>,
    metadata: SourceMetadata,
    record: PhantomData<fn() -> T>,
}

impl<T> Clone for QueryBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            source: self.source.clone(),
            select: self.select.clone(),
            parameter_values: self.parameter_values.clone(),
            parameter_defaults: self.parameter_defaults.clone(),
            declared: self.declared.clone(),
            metadata: self.metadata.clone(),
            record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for QueryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("source", &self.source)
            .field("select", &self.select)
            .field("parameter_values", &self.parameter_values)
            .field("parameter_defaults", &self.parameter_defaults)
            .finish_non_exhaustive()
    }
}

impl<T> QueryBuilder<T> {
    pub(crate) fn from_source(
        context: Arc<SessionContext>,
        source: QuerySource,
        metadata: SourceMetadata,
    ) -> Self {
        Self {
            context,
            source,
            select: None,
            parameter_values: CommandParameterValues::new(),
            parameter_defaults: CommandParameterValues::new(),
            declared: Vec::new(),
            metadata,
            record: PhantomData,
        }
    }

    /// The source rows are read from.
    #[must_use]
    pub const fn source(&self) -> &QuerySource {
        &self.source
    }

    /// Returns whether a clause was added since the source was set.
    #[must_use]
    pub const fn is_customized(&self) -> bool {
        self.select.is_some()
    }

    /// Values bound so far.
    #[must_use]
    pub const fn parameter_values(&self) -> &CommandParameterValues {
        &self.parameter_values
    }

    /// Parameters declared without a value, in declaration order.
    #[must_use]
    pub fn declared_parameters(&self) -> &[Parameter] {
        &self.declared
    }

    fn select_mut(&mut self) -> &mut SelectBuilder {
        let source = &self.source;
        let metadata = &self.metadata;
        self.select
            .get_or_insert_with(|| select_builder_for(source, metadata))
    }

    fn edit(mut self, change: impl FnOnce(&mut SelectBuilder)) -> Self {
        change(self.select_mut());
        self
    }

    fn with_source(mut self, source: QuerySource) -> Self {
        self.source = source;
        self.select = None;
        self
    }

    /// The builder terminal operations start from. An uncustomized
    /// subquery is inlined.
    pub(crate) fn current_builder(&self) -> SelectBuilder {
        match (&self.select, &self.source) {
            (Some(select), _) => select.clone(),
            (None, QuerySource::Subquery { inner, .. }) => inner.as_ref().clone(),
            (None, source) => select_builder_for(source, &self.metadata),
        }
    }

    /// The statement a plain listing runs. An uncustomized union renders
    /// bare.
    pub(crate) fn current_statement(&self) -> Statement {
        match (&self.select, &self.source) {
            (None, QuerySource::Union { first, rest, .. }) => union_of(first, rest).into(),
            _ => self.current_builder().generate_select().into(),
        }
    }

    fn bind_value(&mut self, base_name: &str, value: SqlValue) -> Parameter {
        let name = self.context.generators.parameter_name(base_name);
        self.parameter_values.insert(name.clone(), value);
        Parameter::new(name)
    }

    pub(crate) fn declare(&mut self, base_name: &str) -> Parameter {
        let parameter = Parameter::new(self.context.generators.parameter_name(base_name));
        self.declared.push(parameter.clone());
        parameter
    }

    fn add_where(self, clause: WhereClause) -> Self {
        self.edit(|select| select.add_where(clause))
    }

    /// Adds `<field> <operand> @p` with `value` bound to `@p`.
    #[must_use]
    pub fn where_(
        mut self,
        field: impl Into<FieldReference>,
        operand: UnaryOperand,
        value: impl ToSqlValue,
    ) -> Self {
        let field = field.into();
        let parameter = self.bind_value(field.parameter_base_name(), value.to_sql_value());
        self.add_where(WhereClause::unary(field, operand, parameter))
    }

    /// Adds `<field> BETWEEN @start AND @end`.
    #[must_use]
    pub fn where_between(
        mut self,
        field: impl Into<FieldReference>,
        start: impl ToSqlValue,
        end: impl ToSqlValue,
    ) -> Self {
        let field = field.into();
        let base = field.parameter_base_name().to_string();
        let start = self.bind_value(&format!("{base}_start"), start.to_sql_value());
        let end = self.bind_value(&format!("{base}_end"), end.to_sql_value());
        self.add_where(WhereClause::between(field, start, end))
    }

    /// Adds `<field> IN (...)` with one parameter per value. No values
    /// matches no rows.
    #[must_use]
    pub fn where_in<V: ToSqlValue>(
        self,
        field: impl Into<FieldReference>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.where_array(field.into(), ArrayOperand::In, values)
    }

    /// Adds `<field> NOT IN (...)`. No values matches every row.
    #[must_use]
    pub fn where_not_in<V: ToSqlValue>(
        self,
        field: impl Into<FieldReference>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.where_array(field.into(), ArrayOperand::NotIn, values)
    }

    fn where_array<V: ToSqlValue>(
        mut self,
        field: FieldReference,
        operand: ArrayOperand,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let base = field.parameter_base_name().to_string();
        let parameters = values
            .into_iter()
            .map(|value| self.bind_value(&base, value.to_sql_value()))
            .collect();
        self.add_where(WhereClause::array(field, operand, parameters))
    }

    /// Adds `<field> IS NULL`.
    #[must_use]
    pub fn where_null(self, field: impl Into<FieldReference>) -> Self {
        self.add_where(WhereClause::is_null(field))
    }

    /// Adds `<field> IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(self, field: impl Into<FieldReference>) -> Self {
        self.add_where(WhereClause::is_not_null(field))
    }

    /// Adds a raw predicate and the values it references.
    ///
    /// Placeholders whose name matches a registered parameter in another
    /// case are rewritten to the registered spelling.
    #[must_use]
    pub fn where_raw(mut self, sql: &str, values: CommandParameterValues) -> Self {
        self.parameter_values.extend(values);
        let sql = self.normalize_parameter_casing(sql);
        self.add_where(WhereClause::custom(sql))
    }

    fn registered_name(&self, name: &str) -> Option<&str> {
        self.parameter_values
            .key(name)
            .or_else(|| self.parameter_defaults.key(name))
            .or_else(|| {
                self.declared
                    .iter()
                    .map(Parameter::name)
                    .find(|declared| declared.eq_ignore_ascii_case(name))
            })
    }

    fn normalize_parameter_casing(&self, sql: &str) -> String {
        normalize_casing(sql, |name| self.registered_name(name))
    }

    /// Binds `value` to `@name`, replacing an earlier value.
    #[must_use]
    pub fn parameter(mut self, name: &str, value: impl ToSqlValue) -> Self {
        self.parameter_values.insert(name, value);
        self
    }

    /// Sets the value `@name` takes when no value is bound.
    #[must_use]
    pub fn parameter_default(mut self, name: &str, value: impl ToSqlValue) -> Self {
        self.parameter_defaults.insert(name, value);
        self
    }

    /// The value `@name` would be executed with.
    #[must_use]
    pub fn parameter_value(&self, name: &str) -> Option<&SqlValue> {
        self.parameter_values
            .get(name)
            .or_else(|| self.parameter_defaults.get(name))
    }

    /// Binds declared parameters positionally.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ParameterCountMismatch`](docstore_sql_core::BuildError)
    /// if the number of values differs from the number of declared
    /// parameters.
    pub fn with_parameters(mut self, values: ParameterValues) -> Result<Self> {
        let bound = Parameters::new(self.declared.clone()).bind(values)?;
        self.parameter_values.extend(bound);
        Ok(self)
    }

    /// Sets defaults for declared parameters positionally.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DefaultCountMismatch`](docstore_sql_core::BuildError)
    /// if the number of defaults differs from the number of declared
    /// parameters.
    pub fn with_parameter_defaults(mut self, defaults: ParameterDefaults) -> Result<Self> {
        let bound = Parameters::new(self.declared.clone()).bind_defaults(defaults)?;
        self.parameter_defaults.extend(bound);
        Ok(self)
    }

    /// Orders by `field` ascending, after any earlier ordering.
    #[must_use]
    pub fn order_by(self, field: impl Into<FieldReference>) -> Self {
        let field = OrderByField::ascending(field);
        self.edit(|select| select.add_order(field))
    }

    /// Orders by `field` descending, after any earlier ordering.
    #[must_use]
    pub fn order_by_descending(self, field: impl Into<FieldReference>) -> Self {
        let field = OrderByField::descending(field);
        self.edit(|select| select.add_order(field))
    }

    /// Orders by `alias.[column]`.
    #[must_use]
    pub fn order_by_table_column(
        self,
        table_alias: &str,
        column: &str,
        direction: OrderByDirection,
    ) -> Self {
        let field = OrderByField::new(FieldReference::table_column(table_alias, column), direction);
        self.edit(|select| select.add_order(field))
    }

    /// Groups by `field`.
    #[must_use]
    pub fn group_by(self, field: impl Into<FieldReference>) -> Self {
        let field = field.into();
        self.edit(|select| select.add_group_by(field))
    }

    /// Selects `field`, replacing the default column list.
    #[must_use]
    pub fn column(self, field: impl Into<FieldReference>) -> Self {
        let column = SelectColumn::Field(field.into());
        self.edit(|select| select.add_column(column))
    }

    /// Selects `field AS alias`.
    #[must_use]
    pub fn column_as(self, field: impl Into<FieldReference>, alias: &str) -> Self {
        let column = SelectColumn::Aliased {
            field: field.into(),
            alias: alias.to_string(),
        };
        self.edit(|select| select.add_column(column))
    }

    /// Selects `alias.[column]`.
    #[must_use]
    pub fn table_column(self, table_alias: &str, column: &str) -> Self {
        let column = SelectColumn::Field(FieldReference::table_column(table_alias, column));
        self.edit(|select| select.add_column(column))
    }

    /// Selects `expression AS alias`. The expression is embedded verbatim.
    #[must_use]
    pub fn calculated_column(self, expression: &str, alias: &str) -> Self {
        let column = SelectColumn::Calculated(CalculatedColumn::new(expression, alias));
        self.edit(|select| select.add_column(column))
    }

    /// Selects `*`.
    #[must_use]
    pub fn all_columns(self) -> Self {
        self.edit(|select| select.add_column(SelectColumn::All))
    }

    /// Adds `ROW_NUMBER() OVER (...) AS alias` over the current ordering.
    #[must_use]
    pub fn row_number_column(self, alias: &str, partition_by: Option<PartitionBy>) -> Self {
        self.edit(|select| select.add_row_number_column(alias, partition_by))
    }

    /// Removes duplicate rows.
    #[must_use]
    pub fn distinct(self) -> Self {
        self.edit(SelectBuilder::add_distinct)
    }

    /// Adds a query hint.
    #[must_use]
    pub fn option(self, option: OptionClause) -> Self {
        self.edit(|select| select.add_option(option))
    }

    /// Reads the same rows as another record type.
    #[must_use]
    pub fn as_type<U>(self) -> QueryBuilder<U> {
        QueryBuilder {
            context: self.context,
            source: self.source,
            select: self.select,
            parameter_values: self.parameter_values,
            parameter_defaults: self.parameter_defaults,
            declared: self.declared,
            metadata: self.metadata,
            record: PhantomData,
        }
    }

    /// Names the source `alias`. An uncustomized table is aliased in place;
    /// anything else becomes a derived table.
    #[must_use]
    pub fn alias(self, alias: &str) -> Self {
        let source = match (&self.select, &self.source) {
            (None, QuerySource::Table(table)) => {
                QuerySource::Table(table.clone().with_alias(alias))
            }
            (None, QuerySource::Subquery { inner, .. }) => QuerySource::Subquery {
                inner: inner.clone(),
                alias: alias.to_string(),
            },
            (None, QuerySource::Union { first, rest, .. }) => QuerySource::Union {
                first: first.clone(),
                rest: rest.clone(),
                alias: alias.to_string(),
            },
            _ => QuerySource::Subquery {
                inner: Box::new(self.current_builder()),
                alias: alias.to_string(),
            },
        };
        self.with_source(source)
    }

    /// Turns the query into a derived table so later clauses apply to its
    /// result. Rendering inlines the derived table until a clause is added.
    #[must_use]
    pub fn subquery(self) -> Self {
        if matches!(
            (&self.select, &self.source),
            (None, QuerySource::Subquery { .. } | QuerySource::Union { .. })
        ) {
            return self;
        }
        let alias = self.context.generators.alias();
        let inner = Box::new(self.current_builder());
        self.with_source(QuerySource::Subquery { inner, alias })
    }

    /// Gives the source an alias if it has none, for use as a join operand.
    pub(crate) fn aliased(self) -> Self {
        match (&self.select, &self.source) {
            (None, QuerySource::Table(table)) if table.alias().is_none() => {
                let alias = self.context.generators.alias();
                self.alias(&alias)
            }
            (None, QuerySource::Table(_) | QuerySource::Subquery { .. } | QuerySource::Union { .. }) => {
                self
            }
            _ => {
                let alias = self.context.generators.alias();
                self.alias(&alias)
            }
        }
    }

    /// Takes over the parameters of a query merged into this one.
    pub(crate) fn absorb_parameters<U>(&mut self, other: &QueryBuilder<U>) {
        self.parameter_values.extend(other.parameter_values.clone());
        self.parameter_defaults.extend(other.parameter_defaults.clone());
        self.declared.extend(other.declared.iter().cloned());
    }

    /// Combines this query and `other` with `UNION`.
    ///
    /// Chained unions extend one `UNION`. The union is rendered bare until a
    /// clause is added, which turns it into a derived table.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.absorb_parameters(&other);
        let member = other.current_builder();
        let source = match (&self.select, &self.source) {
            (None, QuerySource::Union { first, rest, alias }) => {
                let mut rest = rest.clone();
                rest.push(member);
                QuerySource::Union {
                    first: first.clone(),
                    rest,
                    alias: alias.clone(),
                }
            }
            _ => QuerySource::Union {
                first: Box::new(self.current_builder()),
                rest: vec![member],
                alias: self.context.generators.alias(),
            },
        };
        self.with_source(source)
    }

    /// Renders the statement a listing would run, without executing it.
    /// Rendering does not change the builder.
    #[must_use]
    pub fn debug_view_raw_query(&self) -> String {
        self.current_statement().generate_sql()
    }

    /// The command a listing would run.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::MissingParameterValue`](crate::OrmError::MissingParameterValue)
    /// if a placeholder has neither a value nor a default.
    pub fn to_command(&self) -> Result<PreparedCommand> {
        self.command(
            self.current_statement(),
            CommandParameterValues::new(),
            QueryType::SelectMany,
        )
    }

    pub(crate) fn command(
        &self,
        statement: Statement,
        statement_values: CommandParameterValues,
        query_type: QueryType,
    ) -> Result<PreparedCommand> {
        let sql = statement.generate_sql();
        let mut values = self.parameter_defaults.clone();
        values.extend(self.parameter_values.clone());
        values.extend(statement_values);
        ensure_bound(&sql, &values)?;
        Ok(self
            .context
            .prepare(PreparedCommand::new(sql, values, query_type)))
    }
}
