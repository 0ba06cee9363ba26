//! Complete statements: `SELECT`, `UNION`, `IF EXISTS`.

use super::column::SelectColumns;
use super::option::OptionClauses;
use super::order_by::{GroupBy, OrderBy};
use super::row_selection::RowSelection;
use super::source::SelectSource;
use super::where_clause::Where;
use super::{indent, parenthesize, GenerateSql};
use crate::parameters::Parameter;

/// `name AS (\n    <query>\n)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonTableExpression {
    name: String,
    query: Box<SelectQuery>,
}

impl CommonTableExpression {
    /// Names `query` as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<SelectQuery>) -> Self {
        Self {
            name: name.into(),
            query: Box::new(query.into()),
        }
    }

    /// The CTE name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GenerateSql for CommonTableExpression {
    fn generate_sql(&self) -> String {
        format!("{} AS {}", self.name, parenthesize(&self.query.generate_sql(), None))
    }
}

/// A `SELECT` statement.
///
/// Every clause except the column list and the source is optional and
/// renders as an empty string when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    common_table_expressions: Vec<CommonTableExpression>,
    row_selection: RowSelection,
    columns: SelectColumns,
    source: SelectSource,
    where_clause: Where,
    group_by: GroupBy,
    order_by: OrderBy,
    options: OptionClauses,
}

impl Select {
    /// Creates `SELECT <columns> FROM <source>`.
    #[must_use]
    pub fn new(columns: SelectColumns, source: SelectSource) -> Self {
        Self {
            common_table_expressions: Vec::new(),
            row_selection: RowSelection::AllRows,
            columns,
            source,
            where_clause: Where::default(),
            group_by: GroupBy::default(),
            order_by: OrderBy::default(),
            options: OptionClauses::default(),
        }
    }

    /// Declares CTEs ahead of the statement.
    #[must_use]
    pub fn with_common_table_expressions(mut self, ctes: Vec<CommonTableExpression>) -> Self {
        self.common_table_expressions = ctes;
        self
    }

    /// Sets the row selection.
    #[must_use]
    pub fn with_row_selection(mut self, row_selection: RowSelection) -> Self {
        self.row_selection = row_selection;
        self
    }

    /// Sets the `WHERE` clause.
    #[must_use]
    pub fn with_where(mut self, where_clause: Where) -> Self {
        self.where_clause = where_clause;
        self
    }

    /// Sets the `GROUP BY` clause.
    #[must_use]
    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Sets the `ORDER BY` clause.
    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Sets the query hints.
    #[must_use]
    pub fn with_options(mut self, options: OptionClauses) -> Self {
        self.options = options;
        self
    }

    /// The column list.
    #[must_use]
    pub const fn columns(&self) -> &SelectColumns {
        &self.columns
    }

    /// The source.
    #[must_use]
    pub const fn source(&self) -> &SelectSource {
        &self.source
    }

    /// The `WHERE` clause.
    #[must_use]
    pub const fn where_clause(&self) -> &Where {
        &self.where_clause
    }

    /// The `ORDER BY` clause.
    #[must_use]
    pub const fn order_by(&self) -> &OrderBy {
        &self.order_by
    }
}

impl GenerateSql for Select {
    fn generate_sql(&self) -> String {
        let mut sql = String::new();
        if !self.common_table_expressions.is_empty() {
            let ctes: Vec<String> = self
                .common_table_expressions
                .iter()
                .map(GenerateSql::generate_sql)
                .collect();
            sql.push_str("WITH ");
            sql.push_str(&ctes.join(",\n"));
            sql.push('\n');
        }
        sql.push_str("SELECT ");
        sql.push_str(&self.row_selection.generate_sql());
        sql.push_str(&self.columns.generate_sql());
        sql.push_str("\nFROM ");
        sql.push_str(&self.source.generate_sql());
        sql.push_str(&self.where_clause.generate_sql());
        sql.push_str(&self.group_by.generate_sql());
        sql.push_str(&self.order_by.generate_sql());
        sql.push_str(&self.options.generate_sql());
        sql
    }
}

/// `a\nUNION\nb`. Always holds at least one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    first: Box<Select>,
    rest: Vec<Select>,
    all: bool,
}

impl Union {
    /// Creates a `UNION` of `first` and `rest`.
    #[must_use]
    pub fn new(first: Select, rest: Vec<Select>) -> Self {
        Self {
            first: Box::new(first),
            rest,
            all: false,
        }
    }

    /// Creates a `UNION ALL` of `first` and `rest`.
    #[must_use]
    pub fn all(first: Select, rest: Vec<Select>) -> Self {
        Self {
            all: true,
            ..Self::new(first, rest)
        }
    }

    /// Appends a member.
    #[must_use]
    pub fn with_member(mut self, member: Select) -> Self {
        self.rest.push(member);
        self
    }

    /// Iterates the members in order.
    pub fn members(&self) -> impl Iterator<Item = &Select> {
        std::iter::once(self.first.as_ref()).chain(self.rest.iter())
    }
}

impl GenerateSql for Union {
    fn generate_sql(&self) -> String {
        let separator = if self.all { "\nUNION ALL\n" } else { "\nUNION\n" };
        self.members()
            .map(GenerateSql::generate_sql)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// A query usable as a subquery or CTE body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectQuery {
    /// A single select.
    Select(Select),
    /// A union of selects.
    Union(Union),
}

impl GenerateSql for SelectQuery {
    fn generate_sql(&self) -> String {
        match self {
            Self::Select(select) => select.generate_sql(),
            Self::Union(union) => union.generate_sql(),
        }
    }
}

impl From<Select> for SelectQuery {
    fn from(select: Select) -> Self {
        Self::Select(select)
    }
}

impl From<Union> for SelectQuery {
    fn from(union: Union) -> Self {
        Self::Union(union)
    }
}

/// `IF EXISTS(<select>)\n    SELECT @true\nELSE\n    SELECT @false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfExists {
    query: Box<SelectQuery>,
    when_true: Parameter,
    when_false: Parameter,
}

impl IfExists {
    /// Creates an existence check returning `@true` or `@false`.
    #[must_use]
    pub fn new(query: impl Into<SelectQuery>) -> Self {
        Self {
            query: Box::new(query.into()),
            when_true: Parameter::new("true"),
            when_false: Parameter::new("false"),
        }
    }

    /// The parameter selected when a row exists.
    #[must_use]
    pub const fn true_parameter(&self) -> &Parameter {
        &self.when_true
    }

    /// The parameter selected when no row exists.
    #[must_use]
    pub const fn false_parameter(&self) -> &Parameter {
        &self.when_false
    }
}

impl GenerateSql for IfExists {
    fn generate_sql(&self) -> String {
        format!(
            "IF EXISTS({})\n{}\nELSE\n{}",
            self.query.generate_sql(),
            indent(&format!("SELECT {}", self.when_true.generate_sql())),
            indent(&format!("SELECT {}", self.when_false.generate_sql()))
        )
    }
}

/// Any statement that can be handed to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A select.
    Select(Select),
    /// A union.
    Union(Union),
    /// An existence check.
    IfExists(IfExists),
}

impl GenerateSql for Statement {
    fn generate_sql(&self) -> String {
        match self {
            Self::Select(select) => select.generate_sql(),
            Self::Union(union) => union.generate_sql(),
            Self::IfExists(exists) => exists.generate_sql(),
        }
    }
}

impl From<Select> for Statement {
    fn from(select: Select) -> Self {
        Self::Select(select)
    }
}

impl From<Union> for Statement {
    fn from(union: Union) -> Self {
        Self::Union(union)
    }
}

impl From<IfExists> for Statement {
    fn from(exists: IfExists) -> Self {
        Self::IfExists(exists)
    }
}

impl From<SelectQuery> for Statement {
    fn from(query: SelectQuery) -> Self {
        match query {
            SelectQuery::Select(select) => Self::Select(select),
            SelectQuery::Union(union) => Self::Union(union),
        }
    }
}
