#![allow(dead_code)]

use docstore_sql_core::ast::{
    FieldReference, GenerateSql, OrderByField, SelectColumn, SelectColumns, TableSource,
};
use docstore_sql_core::SelectBuilder;

/// A builder over `[dbo].[table]` selecting `*`, ordered by `[Id]` by default.
pub fn table(table: &str) -> SelectBuilder {
    SelectBuilder::new(
        TableSource::new(Some(String::from("dbo")), table).into(),
        SelectColumns::all(),
        Some(OrderByField::ascending("Id")),
    )
}

/// A builder over `[dbo].[table] alias` selecting the given columns
/// qualified by `alias`, ordered by `alias.[Id]` by default.
pub fn aliased_table(table: &str, alias: &str, columns: &[&str]) -> SelectBuilder {
    SelectBuilder::new(
        TableSource::new(Some(String::from("dbo")), table)
            .with_alias(alias)
            .into(),
        SelectColumns::Columns(
            columns
                .iter()
                .map(|c| SelectColumn::Field(FieldReference::table_column(alias, *c)))
                .collect(),
        ),
        Some(OrderByField::ascending(FieldReference::table_column(alias, "Id"))),
    )
}

/// Renders the default select of `builder`.
pub fn sql(builder: &SelectBuilder) -> String {
    builder.generate_select().generate_sql()
}

/// Every `@name` placeholder in `sql`, in order of appearance.
pub fn placeholders(sql: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = sql.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if !name.is_empty() {
            names.push(name);
        }
    }
    names
}
