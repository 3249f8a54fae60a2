//! DuckDB-backed campus store
//!
//! [`Store`] owns one connection. Schema rebuild, reference resolution and
//! transactional loads live in the submodules.

pub mod error;
pub mod loader;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod stats;

use std::path::{Path, PathBuf};

use duckdb::Connection;

pub use error::{LoadError, ResolveError, StoreError};
pub use loader::{Loader, UnresolvedPolicy};
pub use record::TableRecord;
pub use resolver::{IndexedResolver, QueryResolver, ResolveReference};
pub use schema::{TableDef, TableName};
pub use stats::LoadStats;

/// Campus database handle
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Get the database path (if not in-memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Drop and recreate every table and id sequence
    ///
    /// Destructive: all loaded rows are lost and id sequences restart at 1.
    pub fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = schema::rebuild_sql()?;
        tracing::debug!("Rebuilding schema:\n{}", ddl);
        self.conn.execute_batch(&ddl)?;
        tracing::info!("Created {} tables", TableName::ALL.len());
        Ok(())
    }

    /// Check if a table exists
    pub fn table_exists(&self, table: TableName) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?1",
            [table.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the row count of a table
    pub fn table_count(&self, table: TableName) -> Result<i64, StoreError> {
        if !self.table_exists(table)? {
            return Err(StoreError::MissingTable(table));
        }
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Null every enrollment grade equal to `placeholder`; returns rows changed
    ///
    /// The one write after load: source exports use a placeholder string for
    /// "no grade yet".
    pub fn clear_placeholder_grades(&self, placeholder: &str) -> Result<usize, StoreError> {
        if !self.table_exists(TableName::Enrollment)? {
            return Err(StoreError::MissingTable(TableName::Enrollment));
        }
        let changed = self.conn.execute(
            "UPDATE enrollment SET grade = NULL WHERE grade = ?1",
            [placeholder],
        )?;
        tracing::info!("Cleared {} placeholder grades ('{}')", changed, placeholder);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_schema_is_repeatable() {
        let store = Store::memory().unwrap();
        store.create_schema().unwrap();
        store
            .connection()
            .execute("INSERT INTO major (name) VALUES ('Biology')", [])
            .unwrap();
        assert_eq!(store.table_count(TableName::Major).unwrap(), 1);

        store.create_schema().unwrap();
        for table in TableName::ALL {
            assert_eq!(store.table_count(table).unwrap(), 0);
        }

        // Sequences restart after a rebuild
        store
            .connection()
            .execute("INSERT INTO major (name) VALUES ('Music')", [])
            .unwrap();
        let id: i64 = store
            .connection()
            .query_row("SELECT id FROM major", [], |row| row.get(0))
            .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_missing_table() {
        let store = Store::memory().unwrap();
        assert!(!store.table_exists(TableName::Major).unwrap());
        assert!(matches!(
            store.table_count(TableName::Major),
            Err(StoreError::MissingTable(TableName::Major))
        ));
        assert!(store.clear_placeholder_grades("null").is_err());
    }

    #[test]
    fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.duckdb");
        {
            let store = Store::open(&path).unwrap();
            store.create_schema().unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
        }
        let reopened = Store::open(&path).unwrap();
        assert!(reopened.table_exists(TableName::Enrollment).unwrap());
    }
}
