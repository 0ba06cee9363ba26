//! Result rows and conversions out of them.

use chrono::{DateTime, Utc};
use docstore_sql_core::{SqlValue, ToSqlValue};
use serde::de::DeserializeOwned;

use crate::error::{OrmError, Result};

/// One result row: ordered column names with their values.
///
/// Column lookup ignores ASCII case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Builder-style column append.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.push(column, value);
        self
    }

    /// Appends a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl ToSqlValue) {
        self.columns.push((column.into(), value.to_sql_value()));
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The raw value of `column`.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Converts the value of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Mapping`] if the column is missing or the value
    /// does not convert.
    pub fn get<T: FromSqlValue>(&self, column: &str) -> Result<T> {
        let value = self.value(column).ok_or_else(|| OrmError::Mapping {
            column: column.to_string(),
            message: String::from("no such column"),
        })?;
        T::from_sql_value(value).map_err(|message| OrmError::Mapping {
            column: column.to_string(),
            message,
        })
    }

    /// Deserializes a JSON payload column.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Mapping`] if the column is missing or not JSON
    /// text, and [`OrmError::Json`] if deserialization fails.
    pub fn get_json<T: DeserializeOwned>(&self, column: &str) -> Result<T> {
        match self.value(column) {
            Some(SqlValue::Json(value)) => Ok(serde_json::from_value(value.clone())?),
            Some(SqlValue::Text(text)) => Ok(serde_json::from_str(text)?),
            Some(other) => Err(OrmError::Mapping {
                column: column.to_string(),
                message: format!("expected JSON text, got {:?}", other.kind()),
            }),
            None => Err(OrmError::Mapping {
                column: column.to_string(),
                message: String::from("no such column"),
            }),
        }
    }

    /// The first column's value, as returned for scalar projections.
    #[must_use]
    pub fn first_value(&self) -> Option<&SqlValue> {
        self.columns.first().map(|(_, value)| value)
    }
}

/// Conversion from a column value.
pub trait FromSqlValue: Sized {
    /// Converts `value`, describing the mismatch on failure.
    ///
    /// # Errors
    ///
    /// Returns a message when the value has an incompatible type.
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String>;
}

fn mismatch(expected: &str, value: &SqlValue) -> String {
    format!("expected {expected}, got {:?}", value.kind())
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            other => Err(mismatch("bit", other)),
        }
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Int(n) => Ok(*n),
            SqlValue::Bool(b) => Ok(Self::from(*b)),
            SqlValue::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("expected integer text, got {text:?}")),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        let wide = i64::from_sql_value(value)?;
        Self::try_from(wide).map_err(|_| format!("{wide} does not fit in i32"))
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        let wide = i64::from_sql_value(value)?;
        Self::try_from(wide).map_err(|_| format!("{wide} is negative"))
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Ok(*n as Self),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Text(text) => Ok(text.clone()),
            SqlValue::Json(json) => Ok(json.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Blob(bytes) => Ok(bytes.clone()),
            other => Err(mismatch("binary", other)),
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::DateTime(at) => Ok(*at),
            SqlValue::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|e| e.to_string()),
            other => Err(mismatch("datetimeoffset", other)),
        }
    }
}

impl FromSqlValue for serde_json::Value {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Json(json) => Ok(json.clone()),
            SqlValue::Text(text) => serde_json::from_str(text).map_err(|e| e.to_string()),
            other => Err(mismatch("JSON", other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> std::result::Result<Self, String> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// Builds a value from a whole row.
pub trait FromRow: Sized {
    /// Converts `row`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or malformed.
    fn from_row(row: Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: Row) -> Result<Self> {
        Ok(row)
    }
}

// Scalar projections read the first column.
macro_rules! impl_from_row_for_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: Row) -> Result<Self> {
                    let value = row.first_value().ok_or_else(|| OrmError::Mapping {
                        column: String::from("<first>"),
                        message: String::from("row has no columns"),
                    })?;
                    <$ty as FromSqlValue>::from_sql_value(value).map_err(|message| {
                        OrmError::Mapping {
                            column: row
                                .iter()
                                .next()
                                .map_or_else(String::new, |(name, _)| name.to_string()),
                            message,
                        }
                    })
                }
            }
        )*
    };
}

impl_from_row_for_scalar!(bool, i64, i32, u64, f64, String, Vec<u8>, DateTime<Utc>, serde_json::Value);
