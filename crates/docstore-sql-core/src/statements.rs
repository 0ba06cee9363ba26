//! Statement shapes shared by every query front end: row-number paging,
//! counting, existence checks and the single round-trip page with total.

use crate::alias::QueryGenerators;
use crate::ast::{
    CalculatedColumn, CommonTableExpression, CteSelectSource, IfExists, Join, JoinedSource,
    OrderBy, OrderByField, Select, SelectColumn, SelectColumns, Statement, SubquerySource,
    UnaryOperand, Where, WhereClause,
};
use crate::parameters::{CommandParameterValues, Parameter, SqlValue};
use crate::select_builder::SelectBuilder;

/// Name of the row number column added for paging.
pub const ROW_NUMBER_COLUMN: &str = "RowNum";

/// Parameter holding the first row of a page (1-based, inclusive).
pub const MIN_ROW_PARAMETER: &str = "_minrow";

/// Parameter holding the last row of a page (inclusive).
pub const MAX_ROW_PARAMETER: &str = "_maxrow";

/// Column carrying the total row count in a page-with-count statement.
pub const CROSS_JOIN_COUNT_COLUMN: &str = "CrossJoinCount";

/// A statement together with the parameter values it introduces.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    /// The statement.
    pub statement: Statement,
    /// Values for parameters the statement shape itself added.
    pub parameter_values: CommandParameterValues,
}

fn to_row_value(n: u64) -> SqlValue {
    SqlValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `[RowNum] >= @_minrow` and, when `take` is set, `[RowNum] <= @_maxrow`.
fn row_bounds(skip: u64, take: Option<u64>) -> (Where, CommandParameterValues) {
    let mut clauses = vec![WhereClause::unary(
        ROW_NUMBER_COLUMN,
        UnaryOperand::GreaterThanOrEqual,
        Parameter::new(MIN_ROW_PARAMETER),
    )];
    let mut values = CommandParameterValues::new()
        .with(MIN_ROW_PARAMETER, to_row_value(skip.saturating_add(1)));
    if let Some(take) = take {
        clauses.push(WhereClause::unary(
            ROW_NUMBER_COLUMN,
            UnaryOperand::LessThanOrEqual,
            Parameter::new(MAX_ROW_PARAMETER),
        ));
        values.insert(MAX_ROW_PARAMETER, to_row_value(skip.saturating_add(take)));
    }
    (Where::new(clauses), values)
}

fn row_number_order() -> OrderBy {
    OrderBy::new(vec![OrderByField::ascending(ROW_NUMBER_COLUMN)])
}

/// Wraps `builder` in a row-number subquery and keeps rows
/// `skip + 1 ..= skip + take`.
///
/// ```text
/// SELECT *
/// FROM (
///     SELECT *, ROW_NUMBER() OVER (ORDER BY [Id]) AS RowNum
///     FROM [dbo].[Accounts]
/// ) ALIAS_GENERATED_1
/// WHERE ([RowNum] >= @_minrow)
/// AND ([RowNum] <= @_maxrow)
/// ORDER BY [RowNum]
/// ```
#[must_use]
pub fn paged_select(
    builder: &SelectBuilder,
    skip: u64,
    take: Option<u64>,
    generators: &QueryGenerators,
) -> BoundStatement {
    let mut inner = builder.clone();
    inner.add_row_number_column(ROW_NUMBER_COLUMN, None);
    inner.remove_order_by();
    let source = SubquerySource::new(
        inner.generate_select_without_default_order_by(),
        generators.alias(),
    );
    let (bounds, parameter_values) = row_bounds(skip, take);
    let select = Select::new(SelectColumns::all(), source.into())
        .with_where(bounds)
        .with_order_by(row_number_order());
    BoundStatement {
        statement: select.into(),
        parameter_values,
    }
}

/// `SELECT COUNT(*)` over the same rows as `builder`, without ordering.
///
/// Statements whose row set depends on `DISTINCT`, `TOP` or `GROUP BY` are
/// counted through a derived table.
#[must_use]
pub fn count_select(builder: &SelectBuilder, generators: &QueryGenerators) -> Select {
    let mut inner = builder.clone();
    inner.remove_order_by();
    if inner.reshapes_rows() {
        let source = SubquerySource::new(
            inner.generate_select_without_default_order_by(),
            generators.alias(),
        );
        return Select::new(SelectColumns::CountAll, source.into());
    }
    inner.set_count_columns();
    inner.generate_select_without_default_order_by()
}

/// `IF EXISTS(...) SELECT @true ELSE SELECT @false` with `true = 1` and
/// `false = 0` bound.
#[must_use]
pub fn exists_statement(builder: &SelectBuilder) -> BoundStatement {
    let mut inner = builder.clone();
    inner.remove_order_by();
    let exists = IfExists::new(inner.generate_select_without_default_order_by());
    let parameter_values = CommandParameterValues::new()
        .with(exists.true_parameter().name(), 1)
        .with(exists.false_parameter().name(), 0);
    BoundStatement {
        statement: exists.into(),
        parameter_values,
    }
}

/// One statement returning a page and, on every row, the total row count in
/// a `CrossJoinCount` column.
///
/// The row number is computed inside the CTE, against the source, so the
/// ordering may use columns the selection leaves out.
///
/// ```text
/// WITH ALIAS_GENERATED_1 AS (
///     SELECT *, ROW_NUMBER() OVER (ORDER BY [Id]) AS RowNum
///     FROM [dbo].[Accounts]
/// )
/// SELECT *
/// FROM ALIAS_GENERATED_1
/// CROSS JOIN (
///     SELECT COUNT(*) AS CrossJoinCount
///     FROM ALIAS_GENERATED_1
/// ) ALIAS_GENERATED_2
/// WHERE ([RowNum] >= @_minrow)
/// AND ([RowNum] <= @_maxrow)
/// ORDER BY [RowNum]
/// ```
#[must_use]
pub fn paged_select_with_count(
    builder: &SelectBuilder,
    skip: u64,
    take: Option<u64>,
    generators: &QueryGenerators,
) -> BoundStatement {
    let cte_name = generators.alias();

    let mut body = builder.clone();
    body.add_row_number_column(ROW_NUMBER_COLUMN, None);
    body.remove_order_by();
    let cte = CommonTableExpression::new(
        cte_name.clone(),
        body.generate_select_without_default_order_by(),
    );

    let total = Select::new(
        SelectColumns::Columns(vec![SelectColumn::Calculated(CalculatedColumn::new(
            "COUNT(*)",
            CROSS_JOIN_COUNT_COLUMN,
        ))]),
        CteSelectSource::new(cte_name.clone()).into(),
    );
    let source = JoinedSource::new(
        CteSelectSource::new(cte_name).into(),
        Join::cross(SubquerySource::new(total, generators.alias()).into()),
    );

    let (bounds, parameter_values) = row_bounds(skip, take);
    let select = Select::new(SelectColumns::all(), source.into())
        .with_common_table_expressions(vec![cte])
        .with_where(bounds)
        .with_order_by(row_number_order());
    BoundStatement {
        statement: select.into(),
        parameter_values,
    }
}
