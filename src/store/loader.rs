//! Transactional table loads in dependency order
//!
//! A [`Loader`] remembers which tables it has loaded and refuses to load a
//! table before the tables it references. Each table loads inside one
//! transaction: references are resolved per record against an
//! [`IndexedResolver`] snapshot of the referenced tables, rows go through one
//! prepared insert, and the transaction commits once at the end.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::Store;
use super::error::LoadError;
use super::record::TableRecord;
use super::resolver::IndexedResolver;
use super::schema::TableName;
use super::stats::LoadStats;

/// What to do with a record whose reference does not resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Skip and report the record; commit the rest of the table
    #[default]
    Skip,
    /// Roll back the whole table
    Abort,
}

impl fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedPolicy::Skip => write!(f, "skip"),
            UnresolvedPolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for UnresolvedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(UnresolvedPolicy::Skip),
            "abort" => Ok(UnresolvedPolicy::Abort),
            _ => Err(format!("Invalid unresolved-reference policy: {}", s)),
        }
    }
}

/// Loads record collections into their tables
#[derive(Debug, Default, Clone)]
pub struct Loader {
    loaded: BTreeSet<TableName>,
    policy: UnresolvedPolicy,
}

impl Loader {
    pub fn new(policy: UnresolvedPolicy) -> Self {
        Self {
            loaded: BTreeSet::new(),
            policy,
        }
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn is_loaded(&self, table: TableName) -> bool {
        self.loaded.contains(&table)
    }

    /// First referenced table that has not been loaded yet
    pub fn missing_dependency(&self, table: TableName) -> Option<TableName> {
        table
            .dependencies()
            .into_iter()
            .find(|dependency| !self.loaded.contains(dependency))
    }

    /// Insert `records` into their table
    ///
    /// Under [`UnresolvedPolicy::Skip`] an unresolved record is counted in the
    /// returned stats and the remaining rows still commit. Any store error, or
    /// an unresolved record under [`UnresolvedPolicy::Abort`], rolls the whole
    /// table back.
    pub fn load<R: TableRecord>(
        &mut self,
        store: &mut Store,
        records: &[R],
    ) -> Result<LoadStats, LoadError> {
        let table = R::TABLE;
        if let Some(missing) = self.missing_dependency(table) {
            return Err(LoadError::DependencyNotLoaded { table, missing });
        }

        let start = Instant::now();
        let mut stats = LoadStats::new(table);
        let resolver = IndexedResolver::build(store.connection(), &table.dependencies())?;
        let insert_sql = table.definition().insert_sql();

        let tx = store.connection_mut().transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for (index, record) in records.iter().enumerate() {
                let record_no = index + 1;
                let values = match record.bind(&resolver) {
                    Ok(values) => values,
                    Err(source) if self.policy == UnresolvedPolicy::Abort => {
                        tracing::error!(
                            "{}: record {} ({}) unresolved, rolling back",
                            table,
                            record_no,
                            record.label()
                        );
                        return Err(LoadError::Unresolved {
                            table,
                            record: record_no,
                            source,
                        });
                    }
                    Err(source) => {
                        let reason = format!("record {} ({}): {}", record_no, record.label(), source);
                        tracing::warn!("{}: skipping {}", table, reason);
                        stats.add_skip(reason);
                        continue;
                    }
                };

                stmt.execute(duckdb::params_from_iter(values.iter()))
                    .map_err(|e| LoadError::RolledBack {
                        table,
                        record: record_no,
                        message: e.to_string(),
                    })?;
                stats.rows_inserted += 1;
            }
        }
        tx.commit().map_err(|e| LoadError::RolledBack {
            table,
            record: records.len(),
            message: e.to_string(),
        })?;

        self.loaded.insert(table);
        stats.duration = start.elapsed();
        tracing::info!(
            "Loaded {} rows into {} ({} skipped) in {}",
            stats.rows_inserted,
            table,
            stats.rows_skipped,
            stats.duration_string()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Major, Student};

    #[test]
    fn test_policy_parse() {
        assert_eq!("skip".parse::<UnresolvedPolicy>().unwrap(), UnresolvedPolicy::Skip);
        assert_eq!("abort".parse::<UnresolvedPolicy>().unwrap(), UnresolvedPolicy::Abort);
        assert!("ignore".parse::<UnresolvedPolicy>().is_err());
        assert_eq!(UnresolvedPolicy::default(), UnresolvedPolicy::Skip);
    }

    #[test]
    fn test_refuses_out_of_order_load() {
        let mut store = Store::memory().unwrap();
        store.create_schema().unwrap();
        let mut loader = Loader::default();

        let students = vec![Student::new("Ada Lovelace", Some(2024), None)];
        let err = loader.load(&mut store, &students).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DependencyNotLoaded {
                table: TableName::Student,
                missing: TableName::Major
            }
        ));
        assert_eq!(store.table_count(TableName::Student).unwrap(), 0);
    }

    #[test]
    fn test_majors_get_ids_in_input_order() {
        let mut store = Store::memory().unwrap();
        store.create_schema().unwrap();
        let mut loader = Loader::default();

        let majors = vec![Major::new("Biology"), Major::new("Computer Science")];
        let stats = loader.load(&mut store, &majors).unwrap();

        assert_eq!(stats.rows_inserted, 2);
        assert!(loader.is_loaded(TableName::Major));
        let ids: Vec<(i64, String)> = store
            .connection()
            .prepare("SELECT id, name FROM major ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            ids,
            vec![(1, "Biology".to_string()), (2, "Computer Science".to_string())]
        );
    }

    #[test]
    fn test_duplicate_natural_key_rolls_back_table() {
        let mut store = Store::memory().unwrap();
        store.create_schema().unwrap();
        let mut loader = Loader::default();

        let majors = vec![Major::new("Biology"), Major::new("Music"), Major::new("Biology")];
        let err = loader.load(&mut store, &majors).unwrap_err();

        assert!(matches!(err, LoadError::RolledBack { table: TableName::Major, .. }));
        assert!(!loader.is_loaded(TableName::Major));
        assert_eq!(store.table_count(TableName::Major).unwrap(), 0);
    }

    #[test]
    fn test_abort_policy_rolls_back() {
        let mut store = Store::memory().unwrap();
        store.create_schema().unwrap();
        let mut loader = Loader::new(UnresolvedPolicy::Abort);

        loader.load(&mut store, &[Major::new("Biology")]).unwrap();
        let students = vec![
            Student::new("Ada Lovelace", Some(2024), Some("Biology".to_string())),
            Student::new("Alan Turing", Some(2025), Some("Music".to_string())),
        ];
        let err = loader.load(&mut store, &students).unwrap_err();

        assert!(matches!(err, LoadError::Unresolved { record: 2, .. }));
        assert_eq!(store.table_count(TableName::Student).unwrap(), 0);
    }
}
