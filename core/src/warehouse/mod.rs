//! Warehouse client.
//!
//! RULE: only this module talks to the database.
//! The fetch loop hands it catalog SQL and gets back `ResultTable`s.
//!
//! The dataset is attached to a private in-memory connection under the
//! `analytics` schema, so catalog queries never depend on where the file
//! lives.

use crate::{
    config::WarehouseCredentials,
    error::InsightsResult,
    table::{ResultTable, Value},
    types::DATASET_SCHEMA,
};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

mod fixture;

pub use fixture::{AccountRecord, ClientRecord, ProfileRecord, TransactionRecord, DATASET_TABLES};

pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Read-only handle for a dashboard run. Fails if the dataset file is
    /// missing; nothing is created.
    pub fn connect(creds: &WarehouseCredentials) -> InsightsResult<Self> {
        log::info!(
            "connecting to warehouse for project '{}' at {}",
            creds.project_id,
            creds.warehouse_path.display()
        );
        Self::attach(&file_uri(&creds.warehouse_path, "ro"))
    }

    /// Read-write handle, creating the dataset file if needed.
    pub fn create(path: &Path) -> InsightsResult<Self> {
        Self::attach(&file_uri(path, "rwc"))
    }

    /// Isolated in-memory warehouse (used in tests).
    pub fn in_memory() -> InsightsResult<Self> {
        Self::attach(":memory:")
    }

    fn attach(target: &str) -> InsightsResult<Self> {
        let conn = Connection::open_in_memory_with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {DATASET_SCHEMA}"),
            params![target],
        )?;
        Ok(Self { conn })
    }

    /// Apply the dataset schema.
    pub fn migrate(&self) -> InsightsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_warehouse.sql"))?;
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    /// Run one parameterless query to completion and materialize it.
    /// Blocks until the last row is read.
    pub fn run_query(&self, label: &str, sql: &str) -> InsightsResult<ResultTable> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut table = ResultTable::new(label, columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from_sql(row.get_ref(i)?));
            }
            table.rows.push(values);
        }
        log::debug!("query '{label}' returned {} rows", table.len());
        Ok(table)
    }
}

/// SQLite URI for a dataset file. `?` and `#` would otherwise start the
/// query string or fragment.
fn file_uri(path: &Path, mode: &str) -> String {
    let raw = path.to_string_lossy();
    let escaped = raw
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    format!("file:{escaped}?mode={mode}")
}
