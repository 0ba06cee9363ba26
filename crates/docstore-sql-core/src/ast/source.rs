//! `FROM` sources: tables, subqueries, CTE references and joins.

use super::column::FieldReference;
use super::select::SelectQuery;
use super::where_clause::UnaryOperand;
use super::{parenthesize, quote_identifier, GenerateSql};
use crate::error::{BuildError, Result};

/// `[schema].[Table] alias`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    schema: Option<String>,
    table: String,
    alias: Option<String>,
}

impl TableSource {
    /// Creates a table source.
    #[must_use]
    pub fn new(schema: Option<String>, table: impl Into<String>) -> Self {
        Self {
            schema,
            table: table.into(),
            alias: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The schema, if qualified.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl GenerateSql for TableSource {
    fn generate_sql(&self) -> String {
        let name = match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                quote_identifier(schema),
                quote_identifier(&self.table)
            ),
            None => quote_identifier(&self.table),
        };
        match &self.alias {
            Some(alias) => format!("{name} {alias}"),
            None => name,
        }
    }
}

/// A parenthesized select or union with an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubquerySource {
    query: Box<SelectQuery>,
    alias: String,
}

impl SubquerySource {
    /// Wraps `query` as a derived table named `alias`.
    #[must_use]
    pub fn new(query: impl Into<SelectQuery>, alias: impl Into<String>) -> Self {
        Self {
            query: Box::new(query.into()),
            alias: alias.into(),
        }
    }

    /// The wrapped query.
    #[must_use]
    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    /// The alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

impl GenerateSql for SubquerySource {
    fn generate_sql(&self) -> String {
        parenthesize(&self.query.generate_sql(), Some(&self.alias))
    }
}

/// A reference to a common table expression declared on the enclosing
/// statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteSelectSource {
    name: String,
    alias: Option<String>,
}

impl CteSelectSource {
    /// References the CTE called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The CTE name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GenerateSql for CteSelectSource {
    fn generate_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {alias}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT HASH JOIN`
    LeftHash,
    /// `INNER HASH JOIN`
    InnerHash,
    /// `FULL OUTER JOIN`
    FullOuter,
    /// `CROSS JOIN`
    Cross,
}

impl JoinType {
    /// Returns the SQL keywords.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftHash => "LEFT HASH JOIN",
            Self::InnerHash => "INNER HASH JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }

    /// Returns whether the join needs an `ON` condition.
    #[must_use]
    pub const fn requires_condition(self) -> bool {
        !matches!(self, Self::Cross)
    }
}

/// One `ON` condition: `left <op> right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    left: FieldReference,
    operand: UnaryOperand,
    right: FieldReference,
}

impl JoinClause {
    /// Creates a join condition.
    #[must_use]
    pub fn new(
        left: impl Into<FieldReference>,
        operand: UnaryOperand,
        right: impl Into<FieldReference>,
    ) -> Self {
        Self {
            left: left.into(),
            operand,
            right: right.into(),
        }
    }
}

impl GenerateSql for JoinClause {
    fn generate_sql(&self) -> String {
        format!(
            "{} {} {}",
            self.left.generate_sql(),
            self.operand.as_str(),
            self.right.generate_sql()
        )
    }
}

/// A joined source with its conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    join_type: JoinType,
    source: SelectSource,
    conditions: Vec<JoinClause>,
}

impl Join {
    /// Creates a join with a single condition.
    #[must_use]
    pub fn new(join_type: JoinType, source: SelectSource, condition: JoinClause) -> Self {
        Self {
            join_type,
            source,
            conditions: vec![condition],
        }
    }

    /// Creates a join with a list of conditions.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingJoinCondition`] if `conditions` is empty
    /// and the join type is not `CROSS JOIN`.
    pub fn with_conditions(
        join_type: JoinType,
        source: SelectSource,
        conditions: Vec<JoinClause>,
    ) -> Result<Self> {
        if conditions.is_empty() && join_type.requires_condition() {
            return Err(BuildError::MissingJoinCondition {
                source_alias: source.display_name().to_string(),
            });
        }
        Ok(Self {
            join_type,
            source,
            conditions,
        })
    }

    /// Creates a `CROSS JOIN`.
    #[must_use]
    pub const fn cross(source: SelectSource) -> Self {
        Self {
            join_type: JoinType::Cross,
            source,
            conditions: Vec::new(),
        }
    }

    /// The join kind.
    #[must_use]
    pub const fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// The joined source.
    #[must_use]
    pub const fn source(&self) -> &SelectSource {
        &self.source
    }
}

impl GenerateSql for Join {
    fn generate_sql(&self) -> String {
        let mut sql = format!("{} {}", self.join_type.as_str(), self.source.generate_sql());
        for (i, condition) in self.conditions.iter().enumerate() {
            sql.push_str(if i == 0 { "\nON " } else { "\nAND " });
            sql.push_str(&condition.generate_sql());
        }
        sql
    }
}

/// `left\n<JOIN> right\nON ...`, possibly chained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedSource {
    left: Box<SelectSource>,
    joins: Vec<Join>,
}

impl JoinedSource {
    /// Joins `join` onto `left`.
    #[must_use]
    pub fn new(left: SelectSource, join: Join) -> Self {
        Self {
            left: Box::new(left),
            joins: vec![join],
        }
    }

    /// Appends another join to the chain.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// The leftmost source.
    #[must_use]
    pub fn left(&self) -> &SelectSource {
        &self.left
    }

    /// The joins in order.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }
}

impl GenerateSql for JoinedSource {
    fn generate_sql(&self) -> String {
        let mut sql = self.left.generate_sql();
        for join in &self.joins {
            sql.push('\n');
            sql.push_str(&join.generate_sql());
        }
        sql
    }
}

/// Anything that can follow `FROM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectSource {
    /// A table.
    Table(TableSource),
    /// A derived table.
    Subquery(SubquerySource),
    /// A CTE reference.
    Cte(CteSelectSource),
    /// A join chain.
    Joined(JoinedSource),
}

impl SelectSource {
    /// The alias columns of this source are qualified with, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table(table) => table.alias(),
            Self::Subquery(subquery) => Some(subquery.alias()),
            Self::Cte(cte) => cte.alias.as_deref().or(Some(cte.name())),
            Self::Joined(joined) => joined.left().alias(),
        }
    }

    /// A human readable name for error messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Table(table) => table.alias().unwrap_or_else(|| table.table()),
            Self::Subquery(subquery) => subquery.alias(),
            Self::Cte(cte) => cte.alias.as_deref().unwrap_or(&cte.name),
            Self::Joined(joined) => joined.left().display_name(),
        }
    }
}

impl GenerateSql for SelectSource {
    fn generate_sql(&self) -> String {
        match self {
            Self::Table(table) => table.generate_sql(),
            Self::Subquery(subquery) => subquery.generate_sql(),
            Self::Cte(cte) => cte.generate_sql(),
            Self::Joined(joined) => joined.generate_sql(),
        }
    }
}

impl From<TableSource> for SelectSource {
    fn from(source: TableSource) -> Self {
        Self::Table(source)
    }
}

impl From<SubquerySource> for SelectSource {
    fn from(source: SubquerySource) -> Self {
        Self::Subquery(source)
    }
}

impl From<CteSelectSource> for SelectSource {
    fn from(source: CteSelectSource) -> Self {
        Self::Cte(source)
    }
}

impl From<JoinedSource> for SelectSource {
    fn from(source: JoinedSource) -> Self {
        Self::Joined(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Select, SelectColumns};

    fn orders() -> SelectSource {
        TableSource::new(Some("dbo".into()), "Orders")
            .with_alias("o")
            .into()
    }

    fn customers() -> SelectSource {
        TableSource::new(Some("dbo".into()), "Customers")
            .with_alias("c")
            .into()
    }

    #[test]
    fn test_table_source() {
        assert_eq!(
            TableSource::new(Some("dbo".into()), "Orders").generate_sql(),
            "[dbo].[Orders]"
        );
        assert_eq!(orders().generate_sql(), "[dbo].[Orders] o");
        assert_eq!(TableSource::new(None, "Orders").generate_sql(), "[Orders]");
    }

    #[test]
    fn test_subquery_source_is_indented() {
        let inner = Select::new(
            SelectColumns::all(),
            TableSource::new(Some("dbo".into()), "Orders").into(),
        );
        let source = SubquerySource::new(inner, "A");
        assert_eq!(
            source.generate_sql(),
            "(\n    SELECT *\n    FROM [dbo].[Orders]\n) A"
        );
    }

    #[test]
    fn test_inner_join_rendering() {
        let join = Join::with_conditions(
            JoinType::Inner,
            customers(),
            vec![
                JoinClause::new(
                    FieldReference::table_column("o", "CustomerId"),
                    UnaryOperand::Equal,
                    FieldReference::table_column("c", "Id"),
                ),
                JoinClause::new(
                    FieldReference::table_column("o", "Region"),
                    UnaryOperand::Equal,
                    FieldReference::table_column("c", "Region"),
                ),
            ],
        )
        .unwrap();
        let joined = JoinedSource::new(orders(), join);
        assert_eq!(
            joined.generate_sql(),
            "[dbo].[Orders] o\nINNER JOIN [dbo].[Customers] c\nON o.[CustomerId] = c.[Id]\nAND o.[Region] = c.[Region]"
        );
    }

    #[test]
    fn test_join_without_condition_fails() {
        let err = Join::with_conditions(JoinType::Inner, customers(), vec![]).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingJoinCondition {
                source_alias: String::from("c")
            }
        );
    }

    #[test]
    fn test_cross_join_needs_no_condition() {
        assert!(Join::with_conditions(JoinType::Cross, customers(), vec![]).is_ok());
        let joined = JoinedSource::new(orders(), Join::cross(customers()));
        assert_eq!(
            joined.generate_sql(),
            "[dbo].[Orders] o\nCROSS JOIN [dbo].[Customers] c"
        );
    }

    #[test]
    fn test_join_type_keywords() {
        assert_eq!(JoinType::LeftHash.as_str(), "LEFT HASH JOIN");
        assert_eq!(JoinType::InnerHash.as_str(), "INNER HASH JOIN");
        assert_eq!(JoinType::FullOuter.as_str(), "FULL OUTER JOIN");
    }

    #[test]
    fn test_cte_reference() {
        let source = CteSelectSource::new("ALIAS_GENERATED_1");
        assert_eq!(source.generate_sql(), "ALIAS_GENERATED_1");
        assert_eq!(
            source.with_alias("x").generate_sql(),
            "ALIAS_GENERATED_1 x"
        );
    }
}
