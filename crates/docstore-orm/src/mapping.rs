//! Document to table mapping metadata.
//!
//! A [`DocumentMap`] tells the query builders which table a document lives
//! in, which columns it has and whether a JSON payload is stored next to the
//! physical columns. Maps are plain values; how they are produced is up to
//! the [`Document`] implementation.

use docstore_sql_core::ValueKind;

use crate::row::FromRow;

/// How a document stores its JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JsonStorageFormat {
    /// Physical columns only.
    #[default]
    NoJson,
    /// Text payload in the JSON column.
    TextOnly,
    /// Compressed payload in the blob column.
    CompressedOnly,
    /// Both columns, text preferred on read.
    MixedPreferText,
    /// Both columns, compressed preferred on read.
    MixedPreferCompressed,
}

impl JsonStorageFormat {
    /// Returns whether the table has a text JSON column.
    #[must_use]
    pub const fn has_json_column(self) -> bool {
        matches!(
            self,
            Self::TextOnly | Self::MixedPreferText | Self::MixedPreferCompressed
        )
    }

    /// Returns whether the table has a compressed JSON column.
    #[must_use]
    pub const fn has_compressed_json_column(self) -> bool {
        matches!(
            self,
            Self::CompressedOnly | Self::MixedPreferText | Self::MixedPreferCompressed
        )
    }
}

/// One mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    column_name: String,
    property_name: String,
    kind: ValueKind,
}

impl ColumnMapping {
    /// Maps `property_name` to `column_name`.
    #[must_use]
    pub fn new(
        column_name: impl Into<String>,
        property_name: impl Into<String>,
        kind: ValueKind,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            property_name: property_name.into(),
            kind,
        }
    }

    /// Maps a property to a column of the same name.
    #[must_use]
    pub fn named(name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, kind)
    }

    /// The column name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// The document property name.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The value kind stored in the column.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// Table, columns and payload layout of one document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMap {
    table: String,
    schema: Option<String>,
    id: ColumnMapping,
    columns: Vec<ColumnMapping>,
    json_storage: JsonStorageFormat,
}

impl DocumentMap {
    /// Creates a map for `table` keyed by `id`.
    #[must_use]
    pub fn new(table: impl Into<String>, id: ColumnMapping) -> Self {
        Self {
            table: table.into(),
            schema: None,
            id,
            columns: Vec::new(),
            json_storage: JsonStorageFormat::NoJson,
        }
    }

    /// Sets the schema. Without one, the session default applies.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a mapped column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnMapping) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the payload layout.
    #[must_use]
    pub const fn with_json_storage(mut self, format: JsonStorageFormat) -> Self {
        self.json_storage = format;
        self
    }

    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The schema, if the map names one.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The id column.
    #[must_use]
    pub const fn id(&self) -> &ColumnMapping {
        &self.id
    }

    /// The payload layout.
    #[must_use]
    pub const fn json_storage(&self) -> JsonStorageFormat {
        self.json_storage
    }

    /// Returns whether a text JSON column exists.
    #[must_use]
    pub const fn has_json_column(&self) -> bool {
        self.json_storage.has_json_column()
    }

    /// Returns whether a compressed JSON column exists.
    #[must_use]
    pub const fn has_compressed_json_column(&self) -> bool {
        self.json_storage.has_compressed_json_column()
    }

    /// The id column followed by the other mapped columns.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnMapping> {
        std::iter::once(&self.id).chain(self.columns.iter())
    }

    /// Persisted column names in declared order with the payload columns
    /// moved to the end, the text JSON column last.
    #[must_use]
    pub fn column_names_json_last(&self, json_column: &str, compressed_column: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .columns()
            .map(ColumnMapping::column_name)
            .filter(|name| {
                !name.eq_ignore_ascii_case(json_column)
                    && !name.eq_ignore_ascii_case(compressed_column)
            })
            .map(String::from)
            .collect();
        if self.has_compressed_json_column() {
            names.push(compressed_column.to_string());
        }
        if self.has_json_column() {
            names.push(json_column.to_string());
        }
        names
    }

    /// Finds the column mapped to `property`.
    #[must_use]
    pub fn resolve_property(&self, property: &str) -> Option<&ColumnMapping> {
        self.columns()
            .find(|column| column.property_name() == property)
    }
}

/// A type stored as rows of one table.
pub trait Document: FromRow + Send + 'static {
    /// The mapping metadata for this type.
    fn document_map() -> DocumentMap;
}
