//! Report row store.
//!
//! The production row source is a remote service; the core only ever talks
//! to it through the [`ReportStore`] trait, which models the read queries
//! the pipeline needs. The bundled SQLite [`Database`] implements the same
//! trait for integration tests and local deployments.

mod reports;
mod schema;

pub use schema::SCHEMA;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::{MedicineRecord, ReportFilter};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("row source error: {0}")]
    Source(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only view of the report rows the pipeline consumes.
pub trait ReportStore {
    /// Raw reaction description of every report matching the filter.
    fn reaction_texts(&self, filter: &ReportFilter) -> StoreResult<Vec<String>>;

    /// Medicine id reference of every report row, unmapped ids included.
    fn report_medicine_ids(&self) -> StoreResult<Vec<i64>>;

    /// Every row of the medicine master table.
    fn medicine_records(&self) -> StoreResult<Vec<MedicineRecord>>;
}

/// SQLite-backed report store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Raw connection, for advanced queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        assert!(Database::open_in_memory().is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"adr_reports".to_string()));
        assert!(tables.contains(&"medicines".to_string()));
    }
}
