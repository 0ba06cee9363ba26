//! Predicates whose values are supplied in a second step.
//!
//! `where_parameterized*` returns a small handle that either takes the value
//! right away or declares the parameter for positional binding later with
//! [`QueryBuilder::with_parameters`].

use docstore_sql_core::ast::{ArrayOperand, FieldReference, UnaryOperand, WhereClause};
use docstore_sql_core::{BuildError, Parameter, ParameterValues, Parameters, ToSqlValue};

use super::QueryBuilder;
use crate::error::Result;

/// A comparison waiting for its value.
#[derive(Debug)]
#[must_use = "the predicate is only added once a value is supplied"]
pub struct ParameterizedWhere<T> {
    builder: QueryBuilder<T>,
    field: FieldReference,
    operand: UnaryOperand,
}

impl<T> ParameterizedWhere<T> {
    /// Binds `value` and adds the predicate.
    pub fn parameter(self, value: impl ToSqlValue) -> QueryBuilder<T> {
        self.builder.where_(self.field, self.operand, value)
    }

    /// Adds the predicate with a declared, unbound parameter.
    pub fn deferred(self) -> QueryBuilder<T> {
        let mut builder = self.builder;
        let parameter = builder.declare(self.field.parameter_base_name());
        builder.add_where(WhereClause::unary(self.field, self.operand, parameter))
    }
}

/// A `BETWEEN` waiting for its bounds.
#[derive(Debug)]
#[must_use = "the predicate is only added once bounds are supplied"]
pub struct ParameterizedBetween<T> {
    builder: QueryBuilder<T>,
    field: FieldReference,
}

impl<T> ParameterizedBetween<T> {
    /// Binds both bounds and adds the predicate.
    pub fn parameters(self, start: impl ToSqlValue, end: impl ToSqlValue) -> QueryBuilder<T> {
        self.builder.where_between(self.field, start, end)
    }

    /// Adds the predicate with two declared, unbound parameters.
    pub fn deferred(self) -> QueryBuilder<T> {
        let mut builder = self.builder;
        let base = self.field.parameter_base_name().to_string();
        let start = builder.declare(&format!("{base}_start"));
        let end = builder.declare(&format!("{base}_end"));
        builder.add_where(WhereClause::between(self.field, start, end))
    }
}

/// An `IN` / `NOT IN` with a fixed number of values.
#[derive(Debug)]
#[must_use = "the predicate is only added once values are supplied"]
pub struct ParameterizedIn<T> {
    builder: QueryBuilder<T>,
    field: FieldReference,
    operand: ArrayOperand,
    count: usize,
}

impl<T> ParameterizedIn<T> {
    /// Binds exactly `count` values and adds the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ParameterCountMismatch`](docstore_sql_core::BuildError)
    /// if the number of values differs from the declared count.
    pub fn parameters(self, values: ParameterValues) -> Result<QueryBuilder<T>> {
        // Names are only drawn from the session once the count is known to match.
        if values.len() != self.count {
            return Err(BuildError::ParameterCountMismatch {
                expected: self.count,
                actual: values.len(),
            }
            .into());
        }
        let mut builder = self.builder;
        let base = self.field.parameter_base_name().to_string();
        let names: Vec<_> = (0..self.count)
            .map(|_| Parameter::new(builder.context.generators.parameter_name(&base)))
            .collect();
        let bound = Parameters::new(names.clone()).bind(values)?;
        builder.parameter_values.extend(bound);
        Ok(builder.add_where(WhereClause::array(self.field, self.operand, names)))
    }

    /// Adds the predicate with `count` declared, unbound parameters.
    pub fn deferred(self) -> QueryBuilder<T> {
        let mut builder = self.builder;
        let base = self.field.parameter_base_name().to_string();
        let names = (0..self.count).map(|_| builder.declare(&base)).collect();
        builder.add_where(WhereClause::array(self.field, self.operand, names))
    }
}

impl<T> QueryBuilder<T> {
    /// Starts `<field> <operand> @p`; the value follows.
    pub fn where_parameterized(
        self,
        field: impl Into<FieldReference>,
        operand: UnaryOperand,
    ) -> ParameterizedWhere<T> {
        ParameterizedWhere {
            builder: self,
            field: field.into(),
            operand,
        }
    }

    /// Starts `<field> BETWEEN @start AND @end`; the bounds follow.
    pub fn where_parameterized_between(
        self,
        field: impl Into<FieldReference>,
    ) -> ParameterizedBetween<T> {
        ParameterizedBetween {
            builder: self,
            field: field.into(),
        }
    }

    /// Starts `<field> IN (...)` with `count` values; the values follow.
    pub fn where_parameterized_in(
        self,
        field: impl Into<FieldReference>,
        count: usize,
    ) -> ParameterizedIn<T> {
        ParameterizedIn {
            builder: self,
            field: field.into(),
            operand: ArrayOperand::In,
            count,
        }
    }

    /// Starts `<field> NOT IN (...)` with `count` values.
    pub fn where_parameterized_not_in(
        self,
        field: impl Into<FieldReference>,
        count: usize,
    ) -> ParameterizedIn<T> {
        ParameterizedIn {
            builder: self,
            field: field.into(),
            operand: ArrayOperand::NotIn,
            count,
        }
    }
}
