//! Fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use docstore_sql_core::{SqlValue, ValueKind};

use crate::config::StoreConfiguration;
use crate::error::Result;
use crate::executor::{CommandExecutor, PreparedCommand, RowIterator};
use crate::mapping::{ColumnMapping, Document, DocumentMap, JsonStorageFormat};
use crate::row::{FromRow, Row};
use crate::session::RelationalSession;

/// Records every command and answers from queued results.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<PreparedCommand>>,
    rows: Mutex<VecDeque<Vec<Row>>>,
    scalars: Mutex<VecDeque<SqlValue>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_rows(&self, rows: Vec<Row>) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rows);
    }

    pub fn push_scalar(&self, value: SqlValue) {
        self.scalars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(value);
    }

    pub fn commands(&self) -> Vec<PreparedCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_command(&self) -> PreparedCommand {
        self.commands().pop().expect("a command was executed")
    }

    fn record(&self, command: PreparedCommand) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute_scalar(&self, command: PreparedCommand) -> Result<SqlValue> {
        self.record(command);
        Ok(self
            .scalars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(SqlValue::Int(0)))
    }

    fn execute_non_query(&self, command: PreparedCommand) -> Result<u64> {
        self.record(command);
        Ok(1)
    }

    fn stream(&self, command: PreparedCommand) -> Result<RowIterator> {
        self.record(command);
        let rows = self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

impl FromRow for Customer {
    fn from_row(row: Row) -> Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
        })
    }
}

impl Document for Customer {
    fn document_map() -> DocumentMap {
        DocumentMap::new("Customers", ColumnMapping::named("Id", ValueKind::Int))
            .with_column(ColumnMapping::named("Name", ValueKind::Text))
            .with_column(ColumnMapping::named("JSON", ValueKind::Text))
            .with_column(ColumnMapping::named("Age", ValueKind::Int))
            .with_column(ColumnMapping::named("City", ValueKind::Text))
            .with_column(ColumnMapping::named("IsActive", ValueKind::Bool))
            .with_json_storage(JsonStorageFormat::TextOnly)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
}

impl FromRow for Order {
    fn from_row(row: Row) -> Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            customer_id: row.get("CustomerId")?,
        })
    }
}

impl Document for Order {
    fn document_map() -> DocumentMap {
        DocumentMap::new("Orders", ColumnMapping::named("Id", ValueKind::Int))
            .with_column(ColumnMapping::named("CustomerId", ValueKind::Int))
            .with_column(ColumnMapping::named("Total", ValueKind::Float))
    }
}

pub fn customer_row(id: i64, name: &str) -> Row {
    Row::new()
        .with("Id", id)
        .with("Name", name)
        .with("Age", 40_i64)
        .with("City", "Oslo")
        .with("IsActive", true)
        .with("JSON", "{}")
}

pub fn customer_session() -> (RelationalSession, Arc<RecordingExecutor>) {
    let executor = RecordingExecutor::new();
    let session = RelationalSession::new(executor.clone(), StoreConfiguration::new());
    (session, executor)
}
