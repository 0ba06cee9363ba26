use docstore_sql_core::ast::{
    FieldReference, Join, JoinClause, JoinType, JoinedSource, SelectSource, UnaryOperand,
};

use super::{QueryBuilder, QuerySource};
use crate::error::Result;

/// What the pending join attaches to.
#[derive(Debug, Clone)]
enum JoinBase {
    /// Extends an existing, uncustomized join.
    Extend(JoinedSource),
    /// Starts a new join from a single source.
    Start(SelectSource),
}

/// A join waiting for its `ON` condition.
///
/// Nothing can be executed from a pending join; it has to be completed with
/// [`on`](Self::on), [`on_columns`](Self::on_columns) or
/// [`on_all`](Self::on_all) first.
#[derive(Debug, Clone)]
#[must_use = "a join does nothing until its condition is given"]
pub struct PendingJoin<T> {
    builder: QueryBuilder<T>,
    base: JoinBase,
    join_type: JoinType,
    right: SelectSource,
    left_alias: String,
    right_alias: String,
}

impl<T> PendingJoin<T> {
    /// Alias of the leftmost source.
    #[must_use]
    pub fn left_alias(&self) -> &str {
        &self.left_alias
    }

    /// Alias of the source being joined.
    #[must_use]
    pub fn right_alias(&self) -> &str {
        &self.right_alias
    }

    /// Completes the join with `left <operand> right`.
    pub fn on(
        self,
        left: impl Into<FieldReference>,
        operand: UnaryOperand,
        right: impl Into<FieldReference>,
    ) -> QueryBuilder<T> {
        let join = Join::new(self.join_type, self.right.clone(), JoinClause::new(left, operand, right));
        self.complete(join)
    }

    /// Completes the join with `left_alias.[left] = right_alias.[right]`.
    pub fn on_columns(self, left_column: &str, right_column: &str) -> QueryBuilder<T> {
        let left = FieldReference::table_column(&self.left_alias, left_column);
        let right = FieldReference::table_column(&self.right_alias, right_column);
        self.on(left, UnaryOperand::Equal, right)
    }

    /// Completes the join with every condition in `conditions`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingJoinCondition`](docstore_sql_core::BuildError)
    /// if `conditions` is empty.
    pub fn on_all(self, conditions: Vec<JoinClause>) -> Result<QueryBuilder<T>> {
        let join = Join::with_conditions(self.join_type, self.right.clone(), conditions)?;
        Ok(self.complete(join))
    }

    fn complete(self, join: Join) -> QueryBuilder<T> {
        let source = match self.base {
            JoinBase::Extend(joined) => joined.join(join),
            JoinBase::Start(left) => JoinedSource::new(left, join),
        };
        self.builder.with_source(QuerySource::Join {
            source,
            left_alias: self.left_alias,
        })
    }
}

impl<T> QueryBuilder<T> {
    /// Starts an `INNER JOIN` with `other`.
    pub fn inner_join<U>(self, other: QueryBuilder<U>) -> PendingJoin<T> {
        self.pending_join(JoinType::Inner, other)
    }

    /// Starts a `LEFT JOIN` with `other`.
    pub fn left_join<U>(self, other: QueryBuilder<U>) -> PendingJoin<T> {
        self.pending_join(JoinType::Left, other)
    }

    /// Starts a `LEFT HASH JOIN` with `other`.
    pub fn left_hash_join<U>(self, other: QueryBuilder<U>) -> PendingJoin<T> {
        self.pending_join(JoinType::LeftHash, other)
    }

    /// Starts an `INNER HASH JOIN` with `other`.
    pub fn inner_hash_join<U>(self, other: QueryBuilder<U>) -> PendingJoin<T> {
        self.pending_join(JoinType::InnerHash, other)
    }

    /// Starts a `FULL OUTER JOIN` with `other`.
    pub fn full_outer_join<U>(self, other: QueryBuilder<U>) -> PendingJoin<T> {
        self.pending_join(JoinType::FullOuter, other)
    }

    /// Adds a `CROSS JOIN` with `other`. No condition is needed.
    #[must_use]
    pub fn cross_join<U>(self, other: QueryBuilder<U>) -> Self {
        let pending = self.pending_join(JoinType::Cross, other);
        let join = Join::cross(pending.right.clone());
        pending.complete(join)
    }

    fn pending_join<U>(self, join_type: JoinType, other: QueryBuilder<U>) -> PendingJoin<T> {
        let (mut builder, base, left_alias) = self.join_base();
        let other = other.aliased();
        builder.absorb_parameters(&other);
        let right_alias = other.source.alias().unwrap_or_default().to_string();
        PendingJoin {
            builder,
            base,
            join_type,
            right: other.source.as_select_source(),
            left_alias,
            right_alias,
        }
    }

    fn join_base(self) -> (Self, JoinBase, String) {
        if let (None, QuerySource::Join { source, left_alias }) = (&self.select, &self.source) {
            let base = JoinBase::Extend(source.clone());
            let left_alias = left_alias.clone();
            return (self, base, left_alias);
        }
        let builder = self.aliased();
        let left_alias = builder.source.alias().unwrap_or_default().to_string();
        let base = JoinBase::Start(builder.source.as_select_source());
        (builder, base, left_alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;
    use crate::testing::{customer_session, Customer, Order};
    use docstore_sql_core::BuildError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inner_join_generates_aliases_and_qualified_defaults() {
        let (session, _) = customer_session();
        let join = session
            .query::<Customer>()
            .inner_join(session.query::<Order>());
        assert_eq!(join.left_alias(), "ALIAS_GENERATED_1");
        assert_eq!(join.right_alias(), "ALIAS_GENERATED_2");
        let query = join.on_columns("Id", "CustomerId");
        assert_eq!(
            query.debug_view_raw_query(),
            "SELECT ALIAS_GENERATED_1.[Id], ALIAS_GENERATED_1.[Name], ALIAS_GENERATED_1.[Age], ALIAS_GENERATED_1.[City], ALIAS_GENERATED_1.[IsActive], ALIAS_GENERATED_1.[JSON]\nFROM [dbo].[Customers] ALIAS_GENERATED_1\nINNER JOIN [dbo].[Orders] ALIAS_GENERATED_2\nON ALIAS_GENERATED_1.[Id] = ALIAS_GENERATED_2.[CustomerId]\nORDER BY ALIAS_GENERATED_1.[Id]"
        );
    }

    #[test]
    fn test_explicit_aliases_are_kept() {
        let (session, _) = customer_session();
        let sql = session
            .query::<Customer>()
            .alias("c")
            .left_hash_join(session.query::<Order>().alias("o"))
            .on(
                FieldReference::table_column("c", "Id"),
                UnaryOperand::Equal,
                FieldReference::table_column("o", "CustomerId"),
            )
            .column(FieldReference::table_column("o", "Total"))
            .debug_view_raw_query();
        assert_eq!(
            sql,
            "SELECT o.[Total]\nFROM [dbo].[Customers] c\nLEFT HASH JOIN [dbo].[Orders] o\nON c.[Id] = o.[CustomerId]\nORDER BY c.[Id]"
        );
    }

    #[test]
    fn test_customized_right_side_becomes_derived_table() {
        let (session, _) = customer_session();
        let orders = session
            .query::<Order>()
            .where_("Total", UnaryOperand::GreaterThan, 100);
        let query = session
            .query::<Customer>()
            .alias("c")
            .inner_join(orders)
            .on_columns("Id", "CustomerId");
        let sql = query.debug_view_raw_query();
        assert!(sql.contains(
            "INNER JOIN (\n    SELECT *\n    FROM [dbo].[Orders]\n    WHERE ([Total] > @total)\n) ALIAS_GENERATED_1\nON c.[Id] = ALIAS_GENERATED_1.[CustomerId]"
        ));
        assert!(query.to_command().is_ok());
    }

    #[test]
    fn test_chained_joins_extend_one_source() {
        let (session, _) = customer_session();
        let sql = session
            .query::<Customer>()
            .alias("c")
            .inner_join(session.query::<Order>().alias("o"))
            .on_columns("Id", "CustomerId")
            .full_outer_join(session.query::<Order>().alias("o2"))
            .on_columns("Id", "CustomerId")
            .cross_join(session.query::<Order>().alias("o3"))
            .debug_view_raw_query();
        assert!(sql.contains(
            "FROM [dbo].[Customers] c\nINNER JOIN [dbo].[Orders] o\nON c.[Id] = o.[CustomerId]\nFULL OUTER JOIN [dbo].[Orders] o2\nON c.[Id] = o2.[CustomerId]\nCROSS JOIN [dbo].[Orders] o3\n"
        ));
    }

    #[test]
    fn test_join_without_condition_fails() {
        let (session, _) = customer_session();
        let result = session
            .query::<Customer>()
            .inner_hash_join(session.query::<Order>())
            .on_all(Vec::new());
        assert!(matches!(
            result,
            Err(OrmError::Build(BuildError::MissingJoinCondition { .. }))
        ));
    }
}
