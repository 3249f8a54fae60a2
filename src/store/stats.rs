//! Per-table load statistics

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::schema::TableName;

/// Most skip reasons kept per table
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Statistics from loading one table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    pub table: TableName,
    /// Rows committed
    pub rows_inserted: usize,
    /// Records skipped because a reference did not resolve
    pub rows_skipped: usize,
    /// Skip reasons (limited to the first 100)
    pub errors: Vec<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl LoadStats {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            rows_inserted: 0,
            rows_skipped: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a skipped row
    pub fn add_skip(&mut self, error: String) {
        self.rows_skipped += 1;
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(error);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rows_skipped == 0
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let millis = self.duration.as_millis();
        if millis < 1000 {
            format!("{}ms", millis)
        } else {
            let secs = self.duration.as_secs();
            if secs < 60 {
                format!("{}s", secs)
            } else {
                format!("{}m {}s", secs / 60, secs % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_skip_caps_recorded_errors() {
        let mut stats = LoadStats::new(TableName::Enrollment);
        for i in 0..150 {
            stats.add_skip(format!("record {}", i));
        }
        assert_eq!(stats.rows_skipped, 150);
        assert_eq!(stats.errors.len(), MAX_RECORDED_ERRORS);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_duration_string() {
        let mut stats = LoadStats::new(TableName::Major);
        stats.duration = Duration::from_millis(250);
        assert_eq!(stats.duration_string(), "250ms");
        stats.duration = Duration::from_secs(75);
        assert_eq!(stats.duration_string(), "1m 15s");
    }
}
