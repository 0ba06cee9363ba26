//! The sources a query builder can start from.

use docstore_sql_core::ast::{
    FieldReference, JoinedSource, OrderByField, Select, SelectColumn, SelectColumns,
    SelectSource, SubquerySource, TableSource, Union,
};
use docstore_sql_core::SelectBuilder;

use crate::config::StoreConfiguration;
use crate::mapping::DocumentMap;

/// Id column and persisted columns of the record type being queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    id_column: String,
    columns: Vec<String>,
}

impl SourceMetadata {
    /// `columns` lists persisted columns with JSON payload columns last.
    #[must_use]
    pub fn new(id_column: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            id_column: id_column.into(),
            columns,
        }
    }

    /// Metadata of a mapped document under `configuration`'s payload
    /// column names.
    #[must_use]
    pub fn for_document(map: &DocumentMap, configuration: &StoreConfiguration) -> Self {
        Self::new(
            map.id().column_name(),
            map.column_names_json_last(
                &configuration.json_column_name,
                &configuration.compressed_json_column_name,
            ),
        )
    }

    /// The id column.
    #[must_use]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// The persisted columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Where rows come from, before any clause has been added.
#[derive(Debug, Clone)]
pub enum QuerySource {
    /// A table, optionally aliased.
    Table(TableSource),
    /// Joined sources. Columns and ordering are qualified with `left_alias`.
    Join {
        /// The joined sources.
        source: JoinedSource,
        /// Alias of the leftmost source.
        left_alias: String,
    },
    /// Another query used as a derived table.
    Subquery {
        /// The inner query.
        inner: Box<SelectBuilder>,
        /// Alias of the derived table.
        alias: String,
    },
    /// A `UNION` of queries used as a derived table.
    Union {
        /// First member.
        first: Box<SelectBuilder>,
        /// Remaining members in order.
        rest: Vec<SelectBuilder>,
        /// Alias of the derived table.
        alias: String,
    },
}

impl QuerySource {
    /// The alias rows of this source are qualified with, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table(table) => table.alias(),
            Self::Join { left_alias, .. } => Some(left_alias),
            Self::Subquery { alias, .. } | Self::Union { alias, .. } => Some(alias),
        }
    }

    /// The `FROM` item this source renders as.
    #[must_use]
    pub fn as_select_source(&self) -> SelectSource {
        match self {
            Self::Table(table) => table.clone().into(),
            Self::Join { source, .. } => source.clone().into(),
            Self::Subquery { inner, alias } => {
                SubquerySource::new(nested_select(inner), alias.clone()).into()
            }
            Self::Union { first, rest, alias } => {
                SubquerySource::new(union_of(first, rest), alias.clone()).into()
            }
        }
    }
}

/// Renders a builder for use inside another statement. Ordering survives
/// only when `TOP` depends on it.
pub(crate) fn nested_select(builder: &SelectBuilder) -> Select {
    if builder.top().is_some() {
        builder.generate_select()
    } else {
        builder.generate_select_without_default_order_by()
    }
}

pub(crate) fn union_of(first: &SelectBuilder, rest: &[SelectBuilder]) -> Union {
    Union::new(
        first.generate_select_without_default_order_by(),
        rest.iter()
            .map(SelectBuilder::generate_select_without_default_order_by)
            .collect(),
    )
}

/// Creates the select builder a source starts with.
///
/// Tables select `*`. Joins select the record's columns qualified with the
/// left alias, or `alias.*` when the record has no mapped columns. Every
/// source orders by the id column by default.
#[must_use]
pub fn select_builder_for(source: &QuerySource, metadata: &SourceMetadata) -> SelectBuilder {
    match source {
        QuerySource::Join { left_alias, .. } => {
            let columns = if metadata.columns().is_empty() {
                vec![SelectColumn::AllFrom(left_alias.clone())]
            } else {
                metadata
                    .columns()
                    .iter()
                    .map(|column| {
                        SelectColumn::Field(FieldReference::table_column(left_alias, column))
                    })
                    .collect()
            };
            SelectBuilder::new(
                source.as_select_source(),
                SelectColumns::Columns(columns),
                Some(OrderByField::ascending(FieldReference::table_column(
                    left_alias,
                    metadata.id_column(),
                ))),
            )
        }
        QuerySource::Table(_) | QuerySource::Subquery { .. } | QuerySource::Union { .. } => {
            SelectBuilder::new(
                source.as_select_source(),
                SelectColumns::all(),
                Some(OrderByField::ascending(metadata.id_column())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_sql_core::ast::{GenerateSql, Join, JoinClause, JoinType, UnaryOperand};
    use pretty_assertions::assert_eq;

    fn metadata() -> SourceMetadata {
        SourceMetadata::new("Id", vec!["Id".into(), "Name".into(), "JSON".into()])
    }

    fn table(name: &str) -> TableSource {
        TableSource::new(Some("dbo".into()), name)
    }

    #[test]
    fn test_table_source_defaults() {
        let builder = select_builder_for(&QuerySource::Table(table("Customers")), &metadata());
        assert_eq!(
            builder.generate_select().generate_sql(),
            "SELECT *\nFROM [dbo].[Customers]\nORDER BY [Id]"
        );
    }

    #[test]
    fn test_join_source_qualifies_columns_and_order() {
        let joined = JoinedSource::new(
            table("Customers").with_alias("c").into(),
            Join::new(
                JoinType::Inner,
                table("Orders").with_alias("o").into(),
                JoinClause::new(
                    FieldReference::table_column("c", "Id"),
                    UnaryOperand::Equal,
                    FieldReference::table_column("o", "CustomerId"),
                ),
            ),
        );
        let source = QuerySource::Join {
            source: joined,
            left_alias: String::from("c"),
        };
        assert_eq!(source.alias(), Some("c"));
        assert_eq!(
            select_builder_for(&source, &metadata())
                .generate_select()
                .generate_sql(),
            "SELECT c.[Id], c.[Name], c.[JSON]\nFROM [dbo].[Customers] c\nINNER JOIN [dbo].[Orders] o\nON c.[Id] = o.[CustomerId]\nORDER BY c.[Id]"
        );
    }

    #[test]
    fn test_subquery_source_renders_derived_table() {
        let inner = select_builder_for(&QuerySource::Table(table("Customers")), &metadata());
        let source = QuerySource::Subquery {
            inner: Box::new(inner),
            alias: String::from("ALIAS_GENERATED_1"),
        };
        assert_eq!(
            source.as_select_source().generate_sql(),
            "(\n    SELECT *\n    FROM [dbo].[Customers]\n) ALIAS_GENERATED_1"
        );
    }

    #[test]
    fn test_nested_select_keeps_order_for_top() {
        let mut inner = select_builder_for(&QuerySource::Table(table("Customers")), &metadata());
        inner.add_top(5);
        assert!(nested_select(&inner).generate_sql().ends_with("ORDER BY [Id]"));
    }
}
