//! # docstore-sql-core
//!
//! An immutable SQL AST and select builder for SQL Server document stores.
//!
//! This crate provides:
//! - AST nodes that render bracket-quoted, parameterized T-SQL
//! - A [`SelectBuilder`] that accumulates clauses and renders fresh nodes
//! - Shared statement shapes for `ROW_NUMBER()` paging, counting and
//!   existence checks
//! - Per-query alias and parameter name generators
//!
//! No I/O happens here: the output is SQL text plus the parameter values it
//! references.
//!
//! ## Building a statement
//!
//! ```rust
//! use docstore_sql_core::ast::{
//!     GenerateSql, OrderByField, SelectColumns, TableSource, UnaryOperand, WhereClause,
//! };
//! use docstore_sql_core::{Parameter, SelectBuilder};
//!
//! let mut builder = SelectBuilder::new(
//!     TableSource::new(Some("dbo".into()), "Orders").into(),
//!     SelectColumns::all(),
//!     Some(OrderByField::ascending("Id")),
//! );
//! builder.add_where(WhereClause::unary(
//!     "Total",
//!     UnaryOperand::GreaterThan,
//!     Parameter::new("total"),
//! ));
//! builder.add_top(100);
//!
//! assert_eq!(
//!     builder.generate_select().generate_sql(),
//!     "SELECT TOP 100 *\nFROM [dbo].[Orders]\nWHERE ([Total] > @total)\nORDER BY [Id]"
//! );
//! ```
//!
//! ## Values never enter the SQL text
//!
//! Every value is bound through a `@name` placeholder and travels next to the
//! statement in a [`CommandParameterValues`] map:
//!
//! ```rust
//! use docstore_sql_core::{CommandParameterValues, SqlValue};
//!
//! let values = CommandParameterValues::new().with("name", "'; DROP TABLE users; --");
//! assert_eq!(
//!     values.get("@NAME"),
//!     Some(&SqlValue::Text(String::from("'; DROP TABLE users; --")))
//! );
//! ```

pub mod alias;
pub mod ast;
pub mod error;
pub mod parameters;
pub mod select_builder;
pub mod statements;

pub use alias::{QueryGenerators, TableAliasGenerator, UniqueParameterNameGenerator};
pub use ast::{GenerateSql, Statement};
pub use error::{BuildError, Result};
pub use parameters::{
    CommandParameterValues, Parameter, ParameterDataType, ParameterDefaults, ParameterValues,
    Parameters, SqlValue, TableValuedParameter, ToSqlValue, ValueKind,
};
pub use select_builder::SelectBuilder;
pub use statements::BoundStatement;
