//! Natural-key to surrogate-id resolution
//!
//! Two implementations share the [`ResolveReference`] trait:
//! [`QueryResolver`] runs one parameterized lookup per call against a live
//! connection, and [`IndexedResolver`] reads the referenced tables once and
//! answers from memory. The loader uses the indexed form.
//!
//! Column names are only ever taken from the static table definitions;
//! values are always bound parameters.

use std::collections::HashMap;

use duckdb::Connection;

use super::error::{ResolveError, StoreError};
use super::schema::{TableDef, TableName};

/// Resolve references to rows of already-loaded tables
pub trait ResolveReference {
    /// Id of the single row whose natural-key `column` equals `value`
    fn resolve(&self, table: TableName, column: &str, value: &str) -> Result<i64, ResolveError>;

    /// Id of the row at 1-based `position` in id order
    fn resolve_position(&self, table: TableName, position: i64) -> Result<i64, ResolveError>;
}

fn checked_column(table: TableName, column: &str) -> Result<&'static TableDef, ResolveError> {
    let def = table.definition();
    if def.is_lookup_column(column) {
        Ok(def)
    } else {
        Err(ResolveError::UnknownColumn {
            table,
            column: column.to_string(),
        })
    }
}

fn single_match(
    table: TableName,
    column: &str,
    value: &str,
    ids: &[i64],
) -> Result<i64, ResolveError> {
    match ids {
        [id] => Ok(*id),
        [] => Err(ResolveError::NotFound {
            table,
            column: column.to_string(),
            value: value.to_string(),
        }),
        many => Err(ResolveError::Ambiguous {
            table,
            column: column.to_string(),
            value: value.to_string(),
            count: many.len(),
        }),
    }
}

fn position_index(table: TableName, position: i64, rows: usize) -> Result<usize, ResolveError> {
    usize::try_from(position)
        .ok()
        .filter(|&p| p >= 1 && p <= rows)
        .map(|p| p - 1)
        .ok_or(ResolveError::PositionOutOfRange {
            table,
            position,
            rows,
        })
}

/// Resolver issuing one query per lookup
pub struct QueryResolver<'a> {
    conn: &'a Connection,
}

impl<'a> QueryResolver<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn lookup_error(table: TableName, err: duckdb::Error) -> ResolveError {
        ResolveError::Lookup {
            table,
            message: err.to_string(),
        }
    }

    fn ids(&self, sql: &str, param: &str) -> Result<Vec<i64>, duckdb::Error> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([param], |row| row.get::<_, i64>(0))?;
        rows.collect()
    }
}

impl ResolveReference for QueryResolver<'_> {
    fn resolve(&self, table: TableName, column: &str, value: &str) -> Result<i64, ResolveError> {
        checked_column(table, column)?;
        let sql = format!("SELECT id FROM {} WHERE {} = ?1 ORDER BY id", table, column);
        let ids = self
            .ids(&sql, value)
            .map_err(|e| Self::lookup_error(table, e))?;
        single_match(table, column, value, &ids)
    }

    fn resolve_position(&self, table: TableName, position: i64) -> Result<i64, ResolveError> {
        let rows: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| Self::lookup_error(table, e))?;
        position_index(table, position, rows as usize)?;

        let sql = format!(
            "SELECT id FROM (SELECT id, row_number() OVER (ORDER BY id) AS pos FROM {}) WHERE pos = ?1",
            table
        );
        self.conn
            .query_row(&sql, [position], |row| row.get(0))
            .map_err(|e| Self::lookup_error(table, e))
    }
}

#[derive(Debug, Default)]
struct TableIndex {
    /// Ids in ascending order; position `n` is `ids[n - 1]`
    ids: Vec<i64>,
    /// Natural-key column -> value -> matching ids
    keys: HashMap<&'static str, HashMap<String, Vec<i64>>>,
}

/// Resolver answering from an in-memory snapshot of the referenced tables
#[derive(Debug, Default)]
pub struct IndexedResolver {
    tables: HashMap<TableName, TableIndex>,
}

impl IndexedResolver {
    /// Index the natural keys and id order of each table in `tables`
    pub fn build(conn: &Connection, tables: &[TableName]) -> Result<Self, StoreError> {
        let mut resolver = Self::default();
        for &table in tables {
            resolver.tables.insert(table, Self::index_table(conn, table)?);
        }
        Ok(resolver)
    }

    fn index_table(conn: &Connection, table: TableName) -> Result<TableIndex, StoreError> {
        let def = table.definition();
        let mut index = TableIndex::default();

        let mut stmt = conn.prepare(&format!("SELECT id FROM {} ORDER BY id", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        for row in rows {
            index.ids.push(row?);
        }

        for &column in def.natural_key {
            let mut values: HashMap<String, Vec<i64>> = HashMap::new();
            let mut stmt = conn.prepare(&format!(
                "SELECT id, CAST({} AS VARCHAR) FROM {} ORDER BY id",
                column, table
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })?;
            for row in rows {
                if let (id, Some(value)) = row? {
                    values.entry(value).or_default().push(id);
                }
            }
            index.keys.insert(column, values);
        }

        tracing::debug!("Indexed {} rows of {}", index.ids.len(), table);
        Ok(index)
    }

    fn table(&self, table: TableName) -> Result<&TableIndex, ResolveError> {
        self.tables.get(&table).ok_or_else(|| ResolveError::Lookup {
            table,
            message: "table was not indexed".to_string(),
        })
    }

    /// Number of rows indexed for `table`
    pub fn row_count(&self, table: TableName) -> usize {
        self.tables.get(&table).map_or(0, |t| t.ids.len())
    }
}

impl ResolveReference for IndexedResolver {
    fn resolve(&self, table: TableName, column: &str, value: &str) -> Result<i64, ResolveError> {
        checked_column(table, column)?;
        let index = self.table(table)?;
        let ids = index
            .keys
            .get(column)
            .and_then(|values| values.get(value))
            .map(Vec::as_slice)
            .unwrap_or_default();
        single_match(table, column, value, ids)
    }

    fn resolve_position(&self, table: TableName, position: i64) -> Result<i64, ResolveError> {
        let index = self.table(table)?;
        let offset = position_index(table, position, index.ids.len())?;
        Ok(index.ids[offset])
    }
}
