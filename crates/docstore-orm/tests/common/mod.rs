#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once, PoisonError};

use docstore_orm::{
    ColumnMapping, CommandExecutor, Document, DocumentMap, FromRow, JsonStorageFormat,
    PreparedCommand, RelationalSession, Result, Row, RowIterator, StoreConfiguration,
};
use docstore_sql_core::{SqlValue, ValueKind};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static TRACING: Once = Once::new();

/// Routes `debug!` output to the test harness.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .without_time()
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Records commands and replays queued result sets and scalars.
#[derive(Debug, Default)]
pub struct Recorder {
    commands: Mutex<Vec<PreparedCommand>>,
    result_sets: Mutex<VecDeque<Vec<Row>>>,
    scalars: Mutex<VecDeque<SqlValue>>,
}

impl Recorder {
    pub fn result_set(&self, rows: Vec<Row>) -> &Self {
        self.result_sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rows);
        self
    }

    pub fn scalar(&self, value: SqlValue) -> &Self {
        self.scalars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(value);
        self
    }

    pub fn commands(&self) -> Vec<PreparedCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.commands().into_iter().map(|command| command.sql).collect()
    }

    fn record(&self, command: PreparedCommand) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

impl CommandExecutor for Recorder {
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
        Ok(0)
    }

    fn stream(&self, command: PreparedCommand) -> Result<RowIterator> {
        self.record(command);
        let rows = self
            .result_sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: f64,
}

impl FromRow for Account {
    fn from_row(row: Row) -> Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
            balance: row.get("Balance")?,
        })
    }
}

impl Document for Account {
    fn document_map() -> DocumentMap {
        DocumentMap::new("Accounts", ColumnMapping::named("Id", ValueKind::Int))
            .with_column(ColumnMapping::named("Name", ValueKind::Text))
            .with_column(ColumnMapping::named("Balance", ValueKind::Float))
            .with_column(ColumnMapping::named("Region", ValueKind::Text))
            .with_column(ColumnMapping::named("IsClosed", ValueKind::Bool))
            .with_json_storage(JsonStorageFormat::TextOnly)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i64,
    pub account_id: i64,
}

impl FromRow for Invoice {
    fn from_row(row: Row) -> Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            account_id: row.get("AccountId")?,
        })
    }
}

impl Document for Invoice {
    fn document_map() -> DocumentMap {
        DocumentMap::new("Invoices", ColumnMapping::named("Id", ValueKind::Int))
            .with_column(ColumnMapping::named("AccountId", ValueKind::Int))
            .with_column(ColumnMapping::named("Amount", ValueKind::Float))
            .with_schema("billing")
    }
}

pub fn account(id: i64, name: &str, balance: f64) -> Row {
    Row::new()
        .with("Id", id)
        .with("Name", name)
        .with("Balance", balance)
        .with("Region", "EU")
        .with("IsClosed", false)
        .with("JSON", "{}")
}

pub fn session() -> (RelationalSession, Arc<Recorder>) {
    session_with(StoreConfiguration::new())
}

pub fn session_with(configuration: StoreConfiguration) -> (RelationalSession, Arc<Recorder>) {
    init_tracing();
    let recorder = Arc::new(Recorder::default());
    let session = RelationalSession::new(recorder.clone(), configuration);
    (session, recorder)
}
