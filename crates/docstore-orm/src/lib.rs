//! # docstore-orm
//!
//! Query front ends for a document store kept in SQL Server tables.
//!
//! This crate provides:
//! - [`Document`] and [`DocumentMap`] to describe how a type maps to a table
//! - [`RelationalSession`] as the entry point for one unit of work
//! - [`QueryBuilder`] for fluent, parameterized queries over tables, joins,
//!   subqueries and unions
//! - [`Queryable`] for expression-tree queries translated to the same SQL
//! - [`CommandExecutor`], the contract a database driver implements
//!
//! ## Quick Start
//!
//! ```ignore
//! use docstore_orm::{RelationalSession, StoreConfiguration};
//! use docstore_orm::queryable::field;
//! use docstore_sql_core::ast::UnaryOperand;
//!
//! fn example(executor: Arc<dyn CommandExecutor>) -> docstore_orm::Result<()> {
//!     let session = RelationalSession::new(executor, StoreConfiguration::from_env());
//!
//!     // Fluent
//!     let active = session
//!         .query::<Customer>()
//!         .where_("IsActive", UnaryOperand::Equal, true)
//!         .order_by_descending("Created")
//!         .to_list_paged(0, 20)?;
//!
//!     // Expression tree
//!     let bob = session
//!         .queryable::<Customer>()
//!         .filter(field("Name").eq("Bob"))
//!         .first_or_default()?;
//!
//!     // Counting and existence
//!     let total = session.query::<Customer>().count()?;
//!     let any_in_oslo = session
//!         .queryable::<Customer>()
//!         .filter(field("Address.City").eq("Oslo"))
//!         .any()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Joins
//!
//! ```ignore
//! let rows = session
//!     .query::<Customer>()
//!     .alias("c")
//!     .inner_join(session.query::<Order>().alias("o"))
//!     .on_columns("Id", "CustomerId")
//!     .where_(FieldReference::table_column("o", "Total"), UnaryOperand::GreaterThan, 100)
//!     .to_list()?;
//! ```
//!
//! Nothing here talks to a database. Builders and the translator produce a
//! [`PreparedCommand`]; the executor runs it.

pub mod config;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod query_builder;
pub mod queryable;
pub mod row;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::StoreConfiguration;
pub use error::{OrmError, Result};
pub use executor::{CommandExecutor, PreparedCommand, QueryType, RowIterator};
pub use mapping::{ColumnMapping, Document, DocumentMap, JsonStorageFormat};
pub use query_builder::{CaseInsensitiveMap, PendingJoin, QueryBuilder};
pub use queryable::{Queryable, QueryTranslator};
pub use row::{FromRow, FromSqlValue, Row};
pub use session::RelationalSession;

// Re-export commonly used types from docstore-sql-core
pub use docstore_sql_core::{CommandParameterValues, ParameterValues, SqlValue, ToSqlValue};
