//! SQL values and parameter handling.
//!
//! Values never reach the generated SQL text: they travel next to it in a
//! [`CommandParameterValues`](super::CommandParameterValues) map keyed by the
//! `@name` placeholders the AST renders.

use chrono::{DateTime, Utc};

/// A SQL value that can be bound to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value (`bit`).
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Point in time, bound as `datetimeoffset`.
    DateTime(DateTime<Utc>),
    /// Structured JSON, bound as `nvarchar(max)` text.
    Json(serde_json::Value),
    /// Table-valued parameter.
    Table(TableValuedParameter),
}

/// The coarse type of a [`SqlValue`], used to match values against mapped
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// NULL.
    Null,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Text.
    Text,
    /// Binary.
    Blob,
    /// Date and time.
    DateTime,
    /// JSON document.
    Json,
    /// Table-valued parameter.
    Table,
}

impl ValueKind {
    /// Returns whether a value of kind `other` can be compared against a
    /// column of this kind.
    #[must_use]
    pub const fn accepts(self, other: Self) -> bool {
        matches!(
            (self, other),
            (_, Self::Null)
                | (Self::Bool, Self::Bool)
                | (Self::Int | Self::Float, Self::Int | Self::Float)
                | (Self::Text, Self::Text)
                | (Self::Blob, Self::Blob)
                | (Self::DateTime, Self::DateTime)
                | (Self::Json, Self::Json)
                | (Self::Table, Self::Table)
        )
    }
}

/// Rows for a table-valued parameter together with the user-defined table
/// type name the engine expects.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValuedParameter {
    /// The user-defined table type, e.g. `dbo.IdList`.
    pub type_name: String,
    /// Row values in column order.
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableValuedParameter {
    /// Creates a table-valued parameter with no rows.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.rows.push(values);
        self
    }
}

impl SqlValue {
    /// Returns the coarse type of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Blob(_) => ValueKind::Blob,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Json(_) => ValueKind::Json,
            Self::Table(_) => ValueKind::Table,
        }
    }

    /// Returns whether this is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: only used for diagnostics. Statements always bind values
    /// as parameters.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("N'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("0x{hex}")
            }
            Self::DateTime(dt) => format!("'{}'", dt.to_rfc3339()),
            Self::Json(v) => {
                let escaped = v.to_string().replace('\'', "''");
                format!("N'{escaped}'")
            }
            Self::Table(tvp) => format!("<{} rows of {}>", tvp.rows.len(), tvp.type_name),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

/// Implements [`ToSqlValue`] from a `type => |value| conversion` table.
macro_rules! to_sql_value {
    ($($ty:ty => |$value:ident| $conversion:expr),+ $(,)?) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    let $value = self;
                    $conversion
                }
            }
        )+
    };
}

to_sql_value! {
    SqlValue => |value| value,
    bool => |flag| SqlValue::Bool(flag),
    i64 => |n| SqlValue::Int(n),
    i32 => |n| SqlValue::Int(i64::from(n)),
    i16 => |n| SqlValue::Int(i64::from(n)),
    i8 => |n| SqlValue::Int(i64::from(n)),
    u32 => |n| SqlValue::Int(i64::from(n)),
    u16 => |n| SqlValue::Int(i64::from(n)),
    u8 => |n| SqlValue::Int(i64::from(n)),
    f64 => |x| SqlValue::Float(x),
    f32 => |x| SqlValue::Float(f64::from(x)),
    String => |text| SqlValue::Text(text),
    &str => |text| SqlValue::Text(text.to_owned()),
    &String => |text| SqlValue::Text(text.clone()),
    Vec<u8> => |bytes| SqlValue::Blob(bytes),
    &[u8] => |bytes| SqlValue::Blob(bytes.to_vec()),
    DateTime<Utc> => |at| SqlValue::DateTime(at),
    serde_json::Value => |json| SqlValue::Json(json),
    TableValuedParameter => |rows| SqlValue::Table(rows),
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_bool_uses_bit_literals() {
        assert_eq!(SqlValue::Bool(true).to_sql_inline(), "1");
        assert_eq!(SqlValue::Bool(false).to_sql_inline(), "0");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "N'O''Brien'"
        );
    }

    #[test]
    fn test_sql_value_inline_blob() {
        assert_eq!(
            SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]).to_sql_inline(),
            "0x48454C4C4F"
        );
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!((-3_i8).to_sql_value(), SqlValue::Int(-3));
        assert_eq!(
            serde_json::json!({"a": 1}).to_sql_value(),
            SqlValue::Json(serde_json::json!({"a": 1}))
        );
        assert_eq!(b"ok"[..].to_sql_value(), SqlValue::Blob(vec![b'o', b'k']));
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_value_kind_compatibility() {
        assert!(ValueKind::Int.accepts(ValueKind::Float));
        assert!(ValueKind::Text.accepts(ValueKind::Null));
        assert!(!ValueKind::Text.accepts(ValueKind::Int));
        assert!(!ValueKind::Bool.accepts(ValueKind::Text));
    }

    #[test]
    fn test_table_valued_parameter_rows() {
        let tvp = TableValuedParameter::new("dbo.IdList")
            .row(vec![SqlValue::Int(1)])
            .row(vec![SqlValue::Int(2)]);
        let value = tvp.to_sql_value();
        assert_eq!(value.kind(), ValueKind::Table);
        assert_eq!(value.to_sql_inline(), "<2 rows of dbo.IdList>");
    }
}
