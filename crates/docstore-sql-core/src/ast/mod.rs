//! Immutable SQL AST nodes.
//!
//! Every node renders itself with [`GenerateSql`]. Rendering is pure: calling
//! it twice on the same node yields byte-identical text. Nodes are never
//! mutated after construction; larger statements are built by wrapping
//! smaller nodes in new parents.

mod column;
mod option;
mod order_by;
mod row_selection;
mod select;
mod source;
mod where_clause;

pub use column::{
    CalculatedColumn, Column, FieldReference, JsonPath, RowNumberColumn, SelectColumn,
    SelectColumns, TableColumn,
};
pub use option::{OptionClause, OptionClauses};
pub use order_by::{GroupBy, OrderBy, OrderByDirection, OrderByField, Over, PartitionBy};
pub use row_selection::RowSelection;
pub use select::{CommonTableExpression, IfExists, Select, SelectQuery, Statement, Union};
pub use source::{
    CteSelectSource, Join, JoinClause, JoinType, JoinedSource, SelectSource, SubquerySource,
    TableSource,
};
pub use where_clause::{ArrayOperand, UnaryOperand, Where, WhereClause};

/// A node that renders to a SQL fragment.
pub trait GenerateSql {
    /// Renders the node. Must be pure and repeatable.
    fn generate_sql(&self) -> String;
}

/// Quotes an identifier with brackets, doubling any closing bracket.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Indents every line of `sql` by four spaces.
#[must_use]
pub fn indent(sql: &str) -> String {
    sql.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders `sql` as a parenthesized, indented block with an optional alias.
pub(crate) fn parenthesize(sql: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("(\n{}\n) {alias}", indent(sql)),
        None => format!("(\n{}\n)", indent(sql)),
    }
}
