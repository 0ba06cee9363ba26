//! Column references and select lists.

use super::order_by::Over;
use super::{quote_identifier, GenerateSql};

/// A bare column: `[Name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
}

impl Column {
    /// Creates a column reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The unquoted column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GenerateSql for Column {
    fn generate_sql(&self) -> String {
        quote_identifier(&self.name)
    }
}

/// A column qualified by a table alias: `ALIAS.[Name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    table_alias: String,
    column: Column,
}

impl TableColumn {
    /// Creates a qualified column reference.
    #[must_use]
    pub fn new(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table_alias: table_alias.into(),
            column: Column::new(name),
        }
    }

    /// The qualifying alias.
    #[must_use]
    pub fn table_alias(&self) -> &str {
        &self.table_alias
    }

    /// The column.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.column
    }
}

impl GenerateSql for TableColumn {
    fn generate_sql(&self) -> String {
        format!("{}.{}", self.table_alias, self.column.generate_sql())
    }
}

/// A scalar read from a JSON payload column:
/// `JSON_VALUE([JSON], '$.Address.City')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    json_column: String,
    path: Vec<String>,
}

impl JsonPath {
    /// Creates a JSON path reference into `json_column`.
    #[must_use]
    pub fn new(json_column: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            json_column: json_column.into(),
            path,
        }
    }

    /// The JSON column name.
    #[must_use]
    pub fn json_column(&self) -> &str {
        &self.json_column
    }

    /// The property path segments.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The path expression, e.g. `$.Address.City`.
    #[must_use]
    pub fn path_expression(&self) -> String {
        let mut expression = String::from("$");
        for segment in &self.path {
            expression.push('.');
            expression.push_str(&segment.replace('\'', "''"));
        }
        expression
    }
}

impl GenerateSql for JsonPath {
    fn generate_sql(&self) -> String {
        format!(
            "JSON_VALUE({}, '{}')",
            quote_identifier(&self.json_column),
            self.path_expression()
        )
    }
}

/// Anything a clause can refer to as a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldReference {
    /// `[Name]`
    Column(Column),
    /// `ALIAS.[Name]`
    Table(TableColumn),
    /// `JSON_VALUE([JSON], '$.Path')`
    Json(JsonPath),
    /// Verbatim SQL.
    Raw(String),
}

impl FieldReference {
    /// Creates a bare column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(Column::new(name))
    }

    /// Creates an alias-qualified column reference.
    #[must_use]
    pub fn table_column(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Table(TableColumn::new(table_alias, name))
    }

    /// The name used to derive parameter names for this field.
    #[must_use]
    pub fn parameter_base_name(&self) -> &str {
        match self {
            Self::Column(column) => column.name(),
            Self::Table(table_column) => table_column.column().name(),
            Self::Json(path) => path.path().last().map_or("value", String::as_str),
            Self::Raw(sql) => sql,
        }
    }
}

impl GenerateSql for FieldReference {
    fn generate_sql(&self) -> String {
        match self {
            Self::Column(column) => column.generate_sql(),
            Self::Table(table_column) => table_column.generate_sql(),
            Self::Json(path) => path.generate_sql(),
            Self::Raw(sql) => sql.clone(),
        }
    }
}

impl From<&str> for FieldReference {
    fn from(name: &str) -> Self {
        Self::column(name)
    }
}

impl From<String> for FieldReference {
    fn from(name: String) -> Self {
        Self::column(name)
    }
}

impl From<Column> for FieldReference {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<TableColumn> for FieldReference {
    fn from(column: TableColumn) -> Self {
        Self::Table(column)
    }
}

impl From<JsonPath> for FieldReference {
    fn from(path: JsonPath) -> Self {
        Self::Json(path)
    }
}

/// A computed expression with an alias: `<expression> AS Alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatedColumn {
    expression: String,
    alias: String,
}

impl CalculatedColumn {
    /// Creates a calculated column from raw SQL.
    #[must_use]
    pub fn new(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: alias.into(),
        }
    }
}

impl GenerateSql for CalculatedColumn {
    fn generate_sql(&self) -> String {
        format!("{} AS {}", self.expression, self.alias)
    }
}

/// `ROW_NUMBER() OVER (...) AS Alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNumberColumn {
    over: Over,
    alias: String,
}

impl RowNumberColumn {
    /// Creates a row number column.
    #[must_use]
    pub fn new(over: Over, alias: impl Into<String>) -> Self {
        Self {
            over,
            alias: alias.into(),
        }
    }
}

impl GenerateSql for RowNumberColumn {
    fn generate_sql(&self) -> String {
        format!("ROW_NUMBER() {} AS {}", self.over.generate_sql(), self.alias)
    }
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectColumn {
    /// `*`
    All,
    /// `ALIAS.*`
    AllFrom(String),
    /// A plain field.
    Field(FieldReference),
    /// `<field> AS Alias`
    Aliased {
        /// The selected field.
        field: FieldReference,
        /// The output name.
        alias: String,
    },
    /// A computed expression.
    Calculated(CalculatedColumn),
    /// A row number window.
    RowNumber(RowNumberColumn),
}

impl GenerateSql for SelectColumn {
    fn generate_sql(&self) -> String {
        match self {
            Self::All => String::from("*"),
            Self::AllFrom(alias) => format!("{alias}.*"),
            Self::Field(field) => field.generate_sql(),
            Self::Aliased { field, alias } => format!("{} AS {alias}", field.generate_sql()),
            Self::Calculated(column) => column.generate_sql(),
            Self::RowNumber(column) => column.generate_sql(),
        }
    }
}

/// The select list of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectColumns {
    /// Explicit columns, joined with `, `.
    Columns(Vec<SelectColumn>),
    /// `COUNT(*)`. A pure aggregate: ordering it is meaningless.
    CountAll,
}

impl SelectColumns {
    /// `*`
    #[must_use]
    pub fn all() -> Self {
        Self::Columns(vec![SelectColumn::All])
    }

    /// Returns whether this selection is a scalar aggregate.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::CountAll)
    }

    /// Returns the explicit column list, or an empty slice for aggregates.
    #[must_use]
    pub fn columns(&self) -> &[SelectColumn] {
        match self {
            Self::Columns(columns) => columns,
            Self::CountAll => &[],
        }
    }
}

impl GenerateSql for SelectColumns {
    fn generate_sql(&self) -> String {
        match self {
            Self::Columns(columns) if columns.is_empty() => String::from("*"),
            Self::Columns(columns) => columns
                .iter()
                .map(GenerateSql::generate_sql)
                .collect::<Vec<_>>()
                .join(", "),
            Self::CountAll => String::from("COUNT(*)"),
        }
    }
}
