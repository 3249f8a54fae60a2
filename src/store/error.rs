//! Error types for store operations

use thiserror::Error;

use super::schema::TableName;

/// Errors from the database or schema layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Foreign keys among the declared tables form a cycle
    #[error("Schema has a foreign-key cycle through table '{0}'")]
    SchemaCycle(TableName),

    /// Table missing from the store
    #[error("Table '{0}' does not exist. Run the schema stage first.")]
    MissingTable(TableName),
}

/// Typed failure to turn a natural key into a surrogate id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No row carries the value
    #[error("No {table} row with {column} = '{value}'")]
    NotFound {
        table: TableName,
        column: String,
        value: String,
    },

    /// More than one row carries the value
    #[error("{count} {table} rows with {column} = '{value}'")]
    Ambiguous {
        table: TableName,
        column: String,
        value: String,
        count: usize,
    },

    /// Column is not a declared natural key of the table
    #[error("'{column}' is not a natural key of {table}")]
    UnknownColumn { table: TableName, column: String },

    /// 1-based position outside the table
    #[error("Position {position} out of range for {table} ({rows} rows)")]
    PositionOutOfRange {
        table: TableName,
        position: i64,
        rows: usize,
    },

    /// Lookup query failed
    #[error("Lookup in {table} failed: {message}")]
    Lookup { table: TableName, message: String },
}

/// Errors that stop a table load
#[derive(Error, Debug)]
pub enum LoadError {
    /// A referenced table has not been loaded yet
    #[error("Cannot load {table}: depends on {missing}, which has not been loaded")]
    DependencyNotLoaded { table: TableName, missing: TableName },

    /// A reference failed under the abort policy; nothing was committed
    #[error("Load of {table} aborted at record {record}: {source}")]
    Unresolved {
        table: TableName,
        record: usize,
        #[source]
        source: ResolveError,
    },

    /// The store rejected a row or the commit; nothing was committed
    #[error("Load of {table} rolled back at record {record}: {message}")]
    RolledBack {
        table: TableName,
        record: usize,
        message: String,
    },

    /// Store error wrapper
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StoreError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            StoreError::MissingTable(table) => format!(
                "Table '{table}' does not exist.\n\nHint: The schema stage must run before any load."
            ),
            StoreError::Database(msg) if msg.contains("lock") => format!(
                "Database error: {msg}\n\nHint: Another process may have the store file open."
            ),
            _ => self.to_string(),
        }
    }
}

impl LoadError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            LoadError::DependencyNotLoaded { table, missing } => format!(
                "Cannot load {table} before {missing}.\n\nHint: Load {missing} first, or check why its stage failed."
            ),
            LoadError::Unresolved { table, record, source } => format!(
                "Load of {table} aborted at record {record}: {source}\n\n\
                Hint: Fix the source row or set load.on_unresolved = \"skip\"."
            ),
            LoadError::RolledBack { table, record, message } => format!(
                "Load of {table} rolled back at record {record}: {message}\n\n\
                Hint: Duplicate natural keys in the source violate the table's UNIQUE constraint."
            ),
            LoadError::Store(e) => e.user_message(),
        }
    }
}

impl From<duckdb::Error> for StoreError {
    fn from(err: duckdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<duckdb::Error> for LoadError {
    fn from(err: duckdb::Error) -> Self {
        LoadError::Store(err.into())
    }
}
