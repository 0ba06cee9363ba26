//! Expression trees over a record and the query operators applied to them.
//!
//! Predicates are written with a small builder DSL:
//!
//! ```rust
//! use docstore_orm::queryable::{field, value, values};
//!
//! let adults_in_oslo = field("Age")
//!     .ge(18)
//!     .and(field("Address.City").eq("Oslo"))
//!     .and(!field("IsDeleted"));
//! let vip = values([1_i64, 2, 3]).contains(field("Id"));
//! let named = field("Name").starts_with("A").or(value(true));
//! # let _ = (adults_in_oslo, vip, named);
//! ```

use std::ops::Not;

use docstore_sql_core::{CommandParameterValues, SqlValue, ToSqlValue};

/// Operators of a binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `&&`
    AndAlso,
    /// `||`
    OrElse,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOperator {
    /// Returns whether this is a comparison.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    /// The operator with its operands swapped: `a < b` is `b > a`.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::LessThanOrEqual => Self::GreaterThanOrEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanOrEqual => Self::LessThanOrEqual,
            other => other,
        }
    }
}

/// Methods that can be called in an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// Substring test on a text member.
    StringContains,
    /// Prefix test on a text member.
    StartsWith,
    /// Suffix test on a text member.
    EndsWith,
    /// Membership test on a collection.
    Contains,
    /// Anything else, by name.
    Other(String),
}

/// An expression over the queried record.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The record itself.
    Parameter,
    /// `target.name`
    Member {
        /// The expression the member is read from.
        target: Box<Expr>,
        /// Member name.
        name: String,
    },
    /// A constant value.
    Constant(SqlValue),
    /// A constant collection.
    Collection(Vec<SqlValue>),
    /// `left <op> right`
    Binary {
        /// The operator.
        op: BinaryOperator,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `!operand`
    Not(Box<Expr>),
    /// `target.method(arguments)`
    Call {
        /// The called method.
        method: Method,
        /// The receiver.
        target: Box<Expr>,
        /// The arguments.
        arguments: Vec<Expr>,
    },
}

/// A dotted member path on the record: `field("Address.City")`.
#[must_use]
pub fn field(path: &str) -> Expr {
    path.split('.').fold(Expr::Parameter, |target, name| Expr::Member {
        target: Box::new(target),
        name: name.to_string(),
    })
}

/// A constant.
#[must_use]
pub fn value(value: impl ToSqlValue) -> Expr {
    Expr::Constant(value.to_sql_value())
}

/// A constant collection.
#[must_use]
pub fn values<V: ToSqlValue>(items: impl IntoIterator<Item = V>) -> Expr {
    Expr::Collection(items.into_iter().map(ToSqlValue::to_sql_value).collect())
}

impl<V: ToSqlValue> From<V> for Expr {
    fn from(value: V) -> Self {
        Self::Constant(value.to_sql_value())
    }
}

impl Expr {
    /// The `null` constant.
    #[must_use]
    pub const fn null() -> Self {
        Self::Constant(SqlValue::Null)
    }

    fn binary(self, op: BinaryOperator, other: impl Into<Self>) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    fn call(self, method: Method, argument: impl Into<Self>) -> Self {
        Self::Call {
            method,
            target: Box::new(self),
            arguments: vec![argument.into()],
        }
    }

    /// `self == other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::Equal, other)
    }

    /// `self != other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::NotEqual, other)
    }

    /// `self < other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn lt(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::LessThan, other)
    }

    /// `self <= other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn le(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::LessThanOrEqual, other)
    }

    /// `self > other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn gt(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::GreaterThan, other)
    }

    /// `self >= other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn ge(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::GreaterThanOrEqual, other)
    }

    /// `self && other`
    #[must_use]
    pub fn and(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::AndAlso, other)
    }

    /// `self || other`
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::OrElse, other)
    }

    /// `self + other`
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: impl Into<Self>) -> Self {
        self.binary(BinaryOperator::Add, other)
    }

    /// Substring test.
    #[must_use]
    pub fn contains_text(self, text: &str) -> Self {
        self.call(Method::StringContains, text)
    }

    /// Prefix test.
    #[must_use]
    pub fn starts_with(self, text: &str) -> Self {
        self.call(Method::StartsWith, text)
    }

    /// Suffix test.
    #[must_use]
    pub fn ends_with(self, text: &str) -> Self {
        self.call(Method::EndsWith, text)
    }

    /// Membership test: `values([..]).contains(field("Id"))` or
    /// `field("Tags").contains("red")`.
    #[must_use]
    pub fn contains(self, item: impl Into<Self>) -> Self {
        self.call(Method::Contains, item)
    }

    /// Calls a method the translator does not know.
    #[must_use]
    pub fn call_method(self, name: &str, arguments: Vec<Self>) -> Self {
        Self::Call {
            method: Method::Other(name.to_string()),
            target: Box::new(self),
            arguments,
        }
    }

    /// The member path if this is `record.a.b...`.
    #[must_use]
    pub fn member_path(&self) -> Option<Vec<String>> {
        match self {
            Self::Member { target, name } => {
                let mut path = match target.as_ref() {
                    Self::Parameter => Vec::new(),
                    other => other.member_path()?,
                };
                path.push(name.clone());
                Some(path)
            }
            _ => None,
        }
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// A query operator applied to the source.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMethod {
    /// Keep records matching the predicate.
    Where(Expr),
    /// Order by a member, replacing earlier ordering.
    OrderBy(Expr),
    /// Order by a member descending, replacing earlier ordering.
    OrderByDescending(Expr),
    /// Add a secondary ascending ordering.
    ThenBy(Expr),
    /// Add a secondary descending ordering.
    ThenByDescending(Expr),
    /// Keep at most n records.
    Take(u64),
    /// Skip n records.
    Skip(u64),
    /// The first record, which must exist.
    First(Option<Expr>),
    /// The first record, if any.
    FirstOrDefault(Option<Expr>),
    /// Whether any record matches.
    Any(Option<Expr>),
    /// How many records match.
    Count(Option<Expr>),
    /// A raw SQL predicate with its values.
    RawWhere(String, CommandParameterValues),
    /// An operator with no SQL translation, by name.
    Unsupported(String),
}

/// A chain of query operators over the record source.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// The table of the record type.
    Source,
    /// `source.method`
    Call {
        /// The query the operator applies to.
        source: Box<QueryExpr>,
        /// The operator.
        method: QueryMethod,
    },
}

impl QueryExpr {
    /// Applies `method` to this query.
    #[must_use]
    pub fn then(self, method: QueryMethod) -> Self {
        Self::Call {
            source: Box::new(self),
            method,
        }
    }

    /// The operators from innermost to outermost.
    #[must_use]
    pub fn methods(&self) -> Vec<&QueryMethod> {
        let mut methods = Vec::new();
        let mut current = self;
        while let Self::Call { source, method } = current {
            methods.push(method);
            current = source;
        }
        methods.reverse();
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builds_member_chain() {
        assert_eq!(
            field("Address.City").member_path(),
            Some(vec![String::from("Address"), String::from("City")])
        );
        assert_eq!(value(1).member_path(), None);
    }

    #[test]
    fn test_not_operator_wraps() {
        assert_eq!(!field("IsActive"), Expr::Not(Box::new(field("IsActive"))));
    }

    #[test]
    fn test_constants_convert_into_expressions() {
        assert_eq!(
            field("Age").gt(5),
            Expr::Binary {
                op: BinaryOperator::GreaterThan,
                left: Box::new(field("Age")),
                right: Box::new(Expr::Constant(SqlValue::Int(5))),
            }
        );
    }

    #[test]
    fn test_methods_are_listed_innermost_first() {
        let query = QueryExpr::Source
            .then(QueryMethod::Where(field("IsActive")))
            .then(QueryMethod::Take(5));
        assert_eq!(
            query.methods(),
            vec![&QueryMethod::Where(field("IsActive")), &QueryMethod::Take(5)]
        );
    }

    #[test]
    fn test_flipped_operators() {
        assert_eq!(BinaryOperator::LessThan.flipped(), BinaryOperator::GreaterThan);
        assert_eq!(BinaryOperator::Equal.flipped(), BinaryOperator::Equal);
    }
}
