//! Filter predicates and the `WHERE` clause.

use super::column::{FieldReference, JsonPath};
use super::{quote_identifier, GenerateSql};
use crate::parameters::Parameter;

/// Comparison operator of a single-parameter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperand {
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl UnaryOperand {
    /// Returns the SQL operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }

    /// Returns the operator matching the logical negation of this one.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::LessThan => Self::GreaterThanOrEqual,
            Self::LessThanOrEqual => Self::GreaterThan,
            Self::GreaterThan => Self::LessThanOrEqual,
            Self::GreaterThanOrEqual => Self::LessThan,
            Self::Like => Self::NotLike,
            Self::NotLike => Self::Like,
        }
    }
}

/// Set-membership operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayOperand {
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
}

impl ArrayOperand {
    /// Returns the SQL operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    /// Returns the opposite operator.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::In => Self::NotIn,
            Self::NotIn => Self::In,
        }
    }

    /// The literal rendered when the value list is empty.
    const fn empty_literal(self) -> &'static str {
        match self {
            Self::In => "0 = 1",
            Self::NotIn => "1 = 1",
        }
    }
}

/// A single predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereClause {
    /// `<field> <op> @p`
    Unary {
        /// Compared field.
        field: FieldReference,
        /// Comparison operator.
        operand: UnaryOperand,
        /// Bound parameter.
        parameter: Parameter,
    },
    /// `<field> BETWEEN @start AND @end`
    Between {
        /// Compared field.
        field: FieldReference,
        /// Lower bound parameter.
        start: Parameter,
        /// Upper bound parameter.
        end: Parameter,
    },
    /// `<field> IN (@p1, @p2)`; an empty list renders a constant literal.
    Array {
        /// Compared field.
        field: FieldReference,
        /// Membership operator.
        operand: ArrayOperand,
        /// One parameter per element.
        parameters: Vec<Parameter>,
    },
    /// `<field> IS NULL`
    IsNull(FieldReference),
    /// `<field> IS NOT NULL`
    IsNotNull(FieldReference),
    /// `@p IN (SELECT [value] FROM OPENJSON([JSON], '$.Path'))`
    JsonArrayContains {
        /// Searched value.
        parameter: Parameter,
        /// Array location inside the JSON payload.
        path: JsonPath,
        /// Renders `NOT IN` when set.
        negated: bool,
    },
    /// Children parenthesized and joined with `\nAND `.
    And(Vec<WhereClause>),
    /// Children parenthesized and joined with ` OR `.
    Or(Vec<WhereClause>),
    /// Raw SQL, embedded verbatim.
    Custom(String),
}

impl WhereClause {
    /// Creates a single-parameter comparison.
    #[must_use]
    pub fn unary(
        field: impl Into<FieldReference>,
        operand: UnaryOperand,
        parameter: Parameter,
    ) -> Self {
        Self::Unary {
            field: field.into(),
            operand,
            parameter,
        }
    }

    /// Creates a `BETWEEN` predicate.
    #[must_use]
    pub fn between(field: impl Into<FieldReference>, start: Parameter, end: Parameter) -> Self {
        Self::Between {
            field: field.into(),
            start,
            end,
        }
    }

    /// Creates an `IN` / `NOT IN` predicate.
    #[must_use]
    pub fn array(
        field: impl Into<FieldReference>,
        operand: ArrayOperand,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self::Array {
            field: field.into(),
            operand,
            parameters,
        }
    }

    /// Creates an `IS NULL` predicate.
    #[must_use]
    pub fn is_null(field: impl Into<FieldReference>) -> Self {
        Self::IsNull(field.into())
    }

    /// Creates an `IS NOT NULL` predicate.
    #[must_use]
    pub fn is_not_null(field: impl Into<FieldReference>) -> Self {
        Self::IsNotNull(field.into())
    }

    /// Creates a raw predicate.
    #[must_use]
    pub fn custom(sql: impl Into<String>) -> Self {
        Self::Custom(sql.into())
    }

    /// Every parameter this predicate references, in render order.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Parameter> {
        match self {
            Self::Unary { parameter, .. } | Self::JsonArrayContains { parameter, .. } => {
                vec![parameter]
            }
            Self::Between { start, end, .. } => vec![start, end],
            Self::Array { parameters, .. } => parameters.iter().collect(),
            Self::And(children) | Self::Or(children) => {
                children.iter().flat_map(Self::parameters).collect()
            }
            Self::IsNull(_) | Self::IsNotNull(_) | Self::Custom(_) => Vec::new(),
        }
    }
}

fn join_children(children: &[WhereClause], separator: &str) -> String {
    children
        .iter()
        .map(|child| format!("({})", child.generate_sql()))
        .collect::<Vec<_>>()
        .join(separator)
}

impl GenerateSql for WhereClause {
    fn generate_sql(&self) -> String {
        match self {
            Self::Unary {
                field,
                operand,
                parameter,
            } => format!(
                "{} {} {}",
                field.generate_sql(),
                operand.as_str(),
                parameter.generate_sql()
            ),
            Self::Between { field, start, end } => format!(
                "{} BETWEEN {} AND {}",
                field.generate_sql(),
                start.generate_sql(),
                end.generate_sql()
            ),
            Self::Array {
                operand,
                parameters,
                ..
            } if parameters.is_empty() => operand.empty_literal().to_string(),
            Self::Array {
                field,
                operand,
                parameters,
            } => {
                let list: Vec<String> = parameters.iter().map(GenerateSql::generate_sql).collect();
                format!(
                    "{} {} ({})",
                    field.generate_sql(),
                    operand.as_str(),
                    list.join(", ")
                )
            }
            Self::IsNull(field) => format!("{} IS NULL", field.generate_sql()),
            Self::IsNotNull(field) => format!("{} IS NOT NULL", field.generate_sql()),
            Self::JsonArrayContains {
                parameter,
                path,
                negated,
            } => format!(
                "{} {} (SELECT [value] FROM OPENJSON({}, '{}'))",
                parameter.generate_sql(),
                if *negated { "NOT IN" } else { "IN" },
                quote_identifier(path.json_column()),
                path.path_expression()
            ),
            Self::And(children) if children.is_empty() => String::from("1 = 1"),
            Self::Or(children) if children.is_empty() => String::from("0 = 1"),
            Self::And(children) => join_children(children, "\nAND "),
            Self::Or(children) => join_children(children, " OR "),
            Self::Custom(sql) => sql.clone(),
        }
    }
}

/// The `WHERE` clause of a statement: every predicate must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Where {
    clauses: Vec<WhereClause>,
}

impl Where {
    /// Creates a `WHERE` clause from its predicates.
    #[must_use]
    pub const fn new(clauses: Vec<WhereClause>) -> Self {
        Self { clauses }
    }

    /// The predicates.
    #[must_use]
    pub fn clauses(&self) -> &[WhereClause] {
        &self.clauses
    }

    /// Returns whether there is nothing to filter on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl GenerateSql for Where {
    fn generate_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        format!("\nWHERE {}", join_children(&self.clauses, "\nAND "))
    }
}
