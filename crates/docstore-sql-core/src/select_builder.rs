//! Mutable assembly of [`Select`] statements from accumulated clauses.
//!
//! A [`SelectBuilder`] collects clauses and renders a fresh, immutable
//! [`Select`] on demand. Rendering never touches the builder, so the same
//! builder can be rendered any number of times. Branching is done with
//! `Clone`: every field is an owned value, so a clone shares nothing with
//! its origin.

use crate::ast::{
    FieldReference, GroupBy, OptionClause, OptionClauses, OrderBy, OrderByField, Over,
    PartitionBy, RowNumberColumn, RowSelection, Select, SelectColumn, SelectColumns,
    SelectSource, Where, WhereClause,
};

/// Accumulates the clauses of one `SELECT`.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    from: SelectSource,
    default_columns: SelectColumns,
    default_order: Option<OrderByField>,
    where_clauses: Vec<WhereClause>,
    group_by: Vec<FieldReference>,
    order_by: Vec<OrderByField>,
    columns: Option<SelectColumns>,
    top: Option<u64>,
    distinct: bool,
    options: Vec<OptionClause>,
    customized: bool,
}

impl SelectBuilder {
    /// Creates a builder over `from`.
    ///
    /// `default_columns` is used while no explicit column is added;
    /// `default_order` orders the result while no explicit order is added.
    #[must_use]
    pub fn new(
        from: SelectSource,
        default_columns: SelectColumns,
        default_order: Option<OrderByField>,
    ) -> Self {
        Self {
            from,
            default_columns,
            default_order,
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            columns: None,
            top: None,
            distinct: false,
            options: Vec::new(),
            customized: false,
        }
    }

    /// The source.
    #[must_use]
    pub const fn from(&self) -> &SelectSource {
        &self.from
    }

    /// The default ordering term, if any.
    #[must_use]
    pub const fn default_order(&self) -> Option<&OrderByField> {
        self.default_order.as_ref()
    }

    /// The `TOP` limit, if any.
    #[must_use]
    pub const fn top(&self) -> Option<u64> {
        self.top
    }

    /// Returns whether any clause was added since construction.
    #[must_use]
    pub const fn has_customizations(&self) -> bool {
        self.customized
    }

    /// Returns whether `DISTINCT`, `TOP` or `GROUP BY` change which rows
    /// come back, as opposed to only filtering them.
    #[must_use]
    pub fn reshapes_rows(&self) -> bool {
        self.distinct || self.top.is_some() || !self.group_by.is_empty()
    }

    /// Adds a predicate.
    pub fn add_where(&mut self, clause: WhereClause) {
        self.where_clauses.push(clause);
        self.customized = true;
    }

    /// Adds an ordering term after the existing ones.
    pub fn add_order(&mut self, field: OrderByField) {
        self.order_by.push(field);
        self.customized = true;
    }

    /// Adds a grouping field.
    pub fn add_group_by(&mut self, field: impl Into<FieldReference>) {
        self.group_by.push(field.into());
        self.customized = true;
    }

    /// Adds a column to the explicit selection, replacing a `COUNT(*)`.
    pub fn add_column(&mut self, column: SelectColumn) {
        match &mut self.columns {
            Some(SelectColumns::Columns(columns)) => columns.push(column),
            _ => self.columns = Some(SelectColumns::Columns(vec![column])),
        }
        self.customized = true;
    }

    /// Replaces the explicit selection.
    pub fn set_columns(&mut self, columns: SelectColumns) {
        self.columns = Some(columns);
        self.customized = true;
    }

    /// Selects `COUNT(*)`. Ordering is suppressed while this is set.
    pub fn set_count_columns(&mut self) {
        self.set_columns(SelectColumns::CountAll);
    }

    /// Appends `ROW_NUMBER() OVER (<current ordering>) AS alias` to the
    /// selection. Starts from the default columns if none were selected.
    pub fn add_row_number_column(&mut self, alias: &str, partition_by: Option<PartitionBy>) {
        let mut over = Over::new(self.effective_order());
        if let Some(partition_by) = partition_by {
            over = over.with_partition_by(partition_by);
        }
        let mut columns = match self.columns.take() {
            Some(SelectColumns::Columns(columns)) => columns,
            _ => self.default_columns.columns().to_vec(),
        };
        if columns.is_empty() {
            columns.push(SelectColumn::All);
        }
        columns.push(SelectColumn::RowNumber(RowNumberColumn::new(over, alias)));
        self.columns = Some(SelectColumns::Columns(columns));
        self.customized = true;
    }

    /// Adds a query hint.
    pub fn add_option(&mut self, option: OptionClause) {
        self.options.push(option);
        self.customized = true;
    }

    /// Limits the result to `n` rows.
    pub fn add_top(&mut self, n: u64) {
        self.top = Some(n);
        self.customized = true;
    }

    /// Removes duplicate rows.
    pub fn add_distinct(&mut self) {
        self.distinct = true;
        self.customized = true;
    }

    /// Drops explicit ordering. The default ordering still applies to
    /// [`generate_select`](Self::generate_select).
    pub fn remove_order_by(&mut self) {
        self.order_by.clear();
    }

    /// The ordering [`generate_select`](Self::generate_select) would use:
    /// explicit terms, or the default term when there are none.
    #[must_use]
    pub fn effective_order(&self) -> OrderBy {
        if !self.order_by.is_empty() {
            return OrderBy::new(self.order_by.clone());
        }
        match &self.default_order {
            Some(field) if self.group_by.is_empty() => OrderBy::new(vec![field.clone()]),
            _ => OrderBy::default(),
        }
    }

    /// The selection [`generate_select`](Self::generate_select) would use.
    #[must_use]
    pub fn effective_columns(&self) -> SelectColumns {
        self.columns
            .clone()
            .unwrap_or_else(|| self.default_columns.clone())
    }

    /// Renders the statement, injecting the default ordering when no
    /// explicit order was added.
    #[must_use]
    pub fn generate_select(&self) -> Select {
        self.build(self.effective_order())
    }

    /// Renders the statement with explicit ordering only. Used when the
    /// statement is nested inside another one.
    #[must_use]
    pub fn generate_select_without_default_order_by(&self) -> Select {
        self.build(OrderBy::new(self.order_by.clone()))
    }

    fn row_selection(&self) -> RowSelection {
        match (self.distinct, self.top) {
            (false, None) => RowSelection::AllRows,
            (true, None) => RowSelection::Distinct,
            (false, Some(n)) => RowSelection::Top(n),
            (true, Some(n)) => {
                RowSelection::Composite(vec![RowSelection::Distinct, RowSelection::Top(n)])
            }
        }
    }

    fn build(&self, order_by: OrderBy) -> Select {
        let columns = self.effective_columns();
        let order_by = if columns.is_aggregate() {
            OrderBy::default()
        } else {
            order_by
        };
        Select::new(columns, self.from.clone())
            .with_row_selection(self.row_selection())
            .with_where(Where::new(self.where_clauses.clone()))
            .with_group_by(GroupBy::new(self.group_by.clone()))
            .with_order_by(order_by)
            .with_options(OptionClauses::new(self.options.clone()))
    }
}
