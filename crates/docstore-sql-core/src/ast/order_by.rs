//! Ordering, grouping and window clauses.

use super::column::FieldReference;
use super::GenerateSql;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderByDirection {
    /// Ascending (the engine default, rendered without a keyword).
    #[default]
    Ascending,
    /// `DESC`
    Descending,
}

/// One ordering term: `[Name]` or `[Name] DESC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    field: FieldReference,
    direction: OrderByDirection,
}

impl OrderByField {
    /// Creates an ordering term.
    #[must_use]
    pub fn new(field: impl Into<FieldReference>, direction: OrderByDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Creates an ascending term.
    #[must_use]
    pub fn ascending(field: impl Into<FieldReference>) -> Self {
        Self::new(field, OrderByDirection::Ascending)
    }

    /// Creates a descending term.
    #[must_use]
    pub fn descending(field: impl Into<FieldReference>) -> Self {
        Self::new(field, OrderByDirection::Descending)
    }

    /// The ordered field.
    #[must_use]
    pub const fn field(&self) -> &FieldReference {
        &self.field
    }

    /// The direction.
    #[must_use]
    pub const fn direction(&self) -> OrderByDirection {
        self.direction
    }
}

impl GenerateSql for OrderByField {
    fn generate_sql(&self) -> String {
        match self.direction {
            OrderByDirection::Ascending => self.field.generate_sql(),
            OrderByDirection::Descending => format!("{} DESC", self.field.generate_sql()),
        }
    }
}

/// `\nORDER BY a, b DESC`; empty when there are no terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    fields: Vec<OrderByField>,
}

impl OrderBy {
    /// Creates an ordering.
    #[must_use]
    pub const fn new(fields: Vec<OrderByField>) -> Self {
        Self { fields }
    }

    /// The terms.
    #[must_use]
    pub fn fields(&self) -> &[OrderByField] {
        &self.fields
    }

    /// Returns whether there are no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `ORDER BY a, b` without the leading newline, for window clauses.
    fn inline_sql(&self) -> String {
        let terms: Vec<String> = self.fields.iter().map(GenerateSql::generate_sql).collect();
        format!("ORDER BY {}", terms.join(", "))
    }
}

impl GenerateSql for OrderBy {
    fn generate_sql(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }
        format!("\n{}", self.inline_sql())
    }
}

/// `\nGROUP BY [A], [B]`; empty when there are no fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBy {
    fields: Vec<FieldReference>,
}

impl GroupBy {
    /// Creates a grouping.
    #[must_use]
    pub const fn new(fields: Vec<FieldReference>) -> Self {
        Self { fields }
    }

    /// Returns whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl GenerateSql for GroupBy {
    fn generate_sql(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }
        let fields: Vec<String> = self.fields.iter().map(GenerateSql::generate_sql).collect();
        format!("\nGROUP BY {}", fields.join(", "))
    }
}

/// `PARTITION BY [A], [B]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionBy {
    fields: Vec<FieldReference>,
}

impl PartitionBy {
    /// Creates a partition.
    #[must_use]
    pub const fn new(fields: Vec<FieldReference>) -> Self {
        Self { fields }
    }
}

impl GenerateSql for PartitionBy {
    fn generate_sql(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(GenerateSql::generate_sql).collect();
        format!("PARTITION BY {}", fields.join(", "))
    }
}

/// `OVER (PARTITION BY ... ORDER BY ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Over {
    partition_by: Option<PartitionBy>,
    order_by: OrderBy,
}

impl Over {
    /// Creates a window ordered by `order_by`.
    #[must_use]
    pub const fn new(order_by: OrderBy) -> Self {
        Self {
            partition_by: None,
            order_by,
        }
    }

    /// Adds a partition.
    #[must_use]
    pub fn with_partition_by(mut self, partition_by: PartitionBy) -> Self {
        self.partition_by = Some(partition_by);
        self
    }
}

impl GenerateSql for Over {
    fn generate_sql(&self) -> String {
        // ROW_NUMBER() requires an ORDER BY inside the window.
        let order = if self.order_by.is_empty() {
            String::from("ORDER BY (SELECT NULL)")
        } else {
            self.order_by.inline_sql()
        };
        match &self.partition_by {
            Some(partition) => format!("OVER ({} {order})", partition.generate_sql()),
            None => format!("OVER ({order})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_rendering() {
        let order = OrderBy::new(vec![
            OrderByField::ascending("Name"),
            OrderByField::descending(FieldReference::table_column("o", "Created")),
        ]);
        assert_eq!(order.generate_sql(), "\nORDER BY [Name], o.[Created] DESC");
        assert_eq!(OrderBy::default().generate_sql(), "");
    }

    #[test]
    fn test_group_by_rendering() {
        let group = GroupBy::new(vec!["A".into(), "B".into()]);
        assert_eq!(group.generate_sql(), "\nGROUP BY [A], [B]");
    }

    #[test]
    fn test_over_with_partition() {
        let over = Over::new(OrderBy::new(vec![OrderByField::descending("Total")]))
            .with_partition_by(PartitionBy::new(vec!["CustomerId".into()]));
        assert_eq!(
            over.generate_sql(),
            "OVER (PARTITION BY [CustomerId] ORDER BY [Total] DESC)"
        );
    }

    #[test]
    fn test_over_without_order() {
        assert_eq!(
            Over::new(OrderBy::default()).generate_sql(),
            "OVER (ORDER BY (SELECT NULL))"
        );
    }
}
