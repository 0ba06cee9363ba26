//! Parameters, parameter values and table-valued parameters.

mod value;

use std::fmt;

pub use value::{SqlValue, TableValuedParameter, ToSqlValue, ValueKind};

use crate::ast::GenerateSql;
use crate::error::{BuildError, Result};

/// The engine type a parameter is declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterDataType {
    /// `nvarchar(n)`; `None` means `nvarchar(max)`.
    NVarChar(Option<u32>),
    /// `int`.
    Int,
    /// `bigint`.
    BigInt,
    /// `bit`.
    Bit,
    /// `datetimeoffset`.
    DateTimeOffset,
    /// `decimal(precision, scale)`.
    Decimal(u8, u8),
    /// `uniqueidentifier`.
    UniqueIdentifier,
    /// A user-defined table type.
    Table(String),
}

impl fmt::Display for ParameterDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NVarChar(Some(len)) => write!(f, "nvarchar({len})"),
            Self::NVarChar(None) => f.write_str("nvarchar(max)"),
            Self::Int => f.write_str("int"),
            Self::BigInt => f.write_str("bigint"),
            Self::Bit => f.write_str("bit"),
            Self::DateTimeOffset => f.write_str("datetimeoffset"),
            Self::Decimal(p, s) => write!(f, "decimal({p}, {s})"),
            Self::UniqueIdentifier => f.write_str("uniqueidentifier"),
            Self::Table(name) => f.write_str(name),
        }
    }
}

/// A named statement parameter. Renders as `@name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    data_type: Option<ParameterDataType>,
}

impl Parameter {
    /// Creates an untyped parameter. A leading `@` is stripped.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.trim_start_matches('@').to_string(),
            data_type: None,
        }
    }

    /// Creates a parameter with a declared engine type.
    #[must_use]
    pub fn typed(name: impl Into<String>, data_type: ParameterDataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::new(name)
        }
    }

    /// The parameter name without the `@` prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared engine type, if any.
    #[must_use]
    pub const fn data_type(&self) -> Option<&ParameterDataType> {
        self.data_type.as_ref()
    }
}

impl GenerateSql for Parameter {
    fn generate_sql(&self) -> String {
        format!("@{}", self.name)
    }
}

fn normalize_key(name: &str) -> &str {
    name.trim_start_matches('@')
}

/// An ordered parameter-name to value map with case-insensitive keys.
///
/// Insertion order is preserved; writing an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandParameterValues {
    entries: Vec<(String, SqlValue)>,
}

impl CommandParameterValues {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = normalize_key(name);
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToSqlValue) {
        let name: String = name.into();
        let value = value.to_sql_value();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self
                .entries
                .push((normalize_key(&name).to_string(), value)),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value bound to `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    /// Returns the stored spelling of `name`, ignoring case.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].0.as_str())
    }

    /// Returns whether `name` has a value, ignoring case.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Copies every entry of `other` into this map, replacing existing keys.
    pub fn extend(&mut self, other: Self) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Display for CommandParameterValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!("@{name}={}", value.to_sql_inline()))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl<K: Into<String>, V: ToSqlValue> FromIterator<(K, V)> for CommandParameterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// An ordered list of declared parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<Parameter>);

/// Positional values for a [`Parameters`] list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues(Vec<SqlValue>);

/// Positional defaults for a [`Parameters`] list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDefaults(Vec<SqlValue>);

impl Parameters {
    /// Creates a parameter list.
    #[must_use]
    pub const fn new(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no parameter is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the declared parameters.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    /// Pairs each declared parameter with its positional value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ParameterCountMismatch`] if the counts differ.
    pub fn bind(&self, values: ParameterValues) -> Result<CommandParameterValues> {
        if values.0.len() != self.0.len() {
            return Err(BuildError::ParameterCountMismatch {
                expected: self.0.len(),
                actual: values.0.len(),
            });
        }
        Ok(self.pair(values.0))
    }

    /// Pairs each declared parameter with its positional default.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DefaultCountMismatch`] if the counts differ.
    pub fn bind_defaults(&self, defaults: ParameterDefaults) -> Result<CommandParameterValues> {
        if defaults.0.len() != self.0.len() {
            return Err(BuildError::DefaultCountMismatch {
                expected: self.0.len(),
                actual: defaults.0.len(),
            });
        }
        Ok(self.pair(defaults.0))
    }

    fn pair(&self, values: Vec<SqlValue>) -> CommandParameterValues {
        self.0
            .iter()
            .zip(values)
            .map(|(parameter, value)| (parameter.name().to_string(), value))
            .collect()
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }
}

impl ParameterValues {
    /// Creates positional values.
    #[must_use]
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        Self(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ParameterDefaults {
    /// Creates positional defaults.
    #[must_use]
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        Self(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_renders_with_at_prefix() {
        assert_eq!(Parameter::new("name").generate_sql(), "@name");
        assert_eq!(Parameter::new("@name").name(), "name");
    }

    #[test]
    fn test_parameter_values_are_case_insensitive() {
        let mut values = CommandParameterValues::new();
        values.insert("Name", "Alice");
        values.insert("@NAME", "Bob");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("name"), Some(&SqlValue::Text("Bob".into())));
        assert_eq!(values.key("nAmE"), Some("Name"));
    }

    #[test]
    fn test_parameter_values_keep_insertion_order() {
        let values = CommandParameterValues::new()
            .with("b", 2)
            .with("a", 1)
            .with("B", 3);
        let names: Vec<&str> = values.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(values.get("b"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn test_bind_counts_must_match() {
        let parameters = Parameters::new(vec![Parameter::new("a"), Parameter::new("b")]);
        let err = parameters.bind(ParameterValues::new([1])).unwrap_err();
        assert_eq!(
            err,
            BuildError::ParameterCountMismatch {
                expected: 2,
                actual: 1
            }
        );

        let bound = parameters.bind(ParameterValues::new([1, 2])).unwrap();
        assert_eq!(bound.get("b"), Some(&SqlValue::Int(2)));
    }

    #[test]
    fn test_bind_defaults_counts_must_match() {
        let parameters = Parameters::new(vec![Parameter::new("a")]);
        assert!(matches!(
            parameters.bind_defaults(ParameterDefaults::new(Vec::<i64>::new())),
            Err(BuildError::DefaultCountMismatch {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(ParameterDataType::NVarChar(None).to_string(), "nvarchar(max)");
        assert_eq!(ParameterDataType::Decimal(18, 2).to_string(), "decimal(18, 2)");
    }
}
