//! Run and stage reports

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::Stage;
use crate::store::LoadStats;

/// Outcome of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage finished; rows may still have been skipped
    Completed,
    /// Stage stopped with an error; nothing it loaded was committed
    Failed,
    /// Stage did not run
    Skipped,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Completed => write!(f, "completed"),
            StageStatus::Failed => write!(f, "failed"),
            StageStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(StageStatus::Completed),
            "failed" => Ok(StageStatus::Failed),
            "skipped" => Ok(StageStatus::Skipped),
            _ => Err(format!("Invalid stage status: {}", s)),
        }
    }
}

/// Record of one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    /// Records produced by the parser
    pub records_parsed: usize,
    /// Source rows the parser skipped
    pub parse_errors: Vec<String>,
    pub rows_inserted: usize,
    /// Records the loader skipped because a reference did not resolve
    pub rows_skipped: usize,
    pub load_errors: Vec<String>,
    /// Rows changed by a corrective write
    pub rows_updated: usize,
    /// Why the stage failed or was skipped
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            records_parsed: 0,
            parse_errors: Vec::new(),
            rows_inserted: 0,
            rows_skipped: 0,
            load_errors: Vec::new(),
            rows_updated: 0,
            message: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Fold in the loader's statistics
    pub fn record_load(&mut self, stats: LoadStats) {
        self.rows_inserted = stats.rows_inserted;
        self.rows_skipped = stats.rows_skipped;
        self.load_errors = stats.errors;
    }

    pub fn complete(mut self) -> Self {
        self.status = StageStatus::Completed;
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn fail(mut self, error: &str) -> Self {
        self.status = StageStatus::Failed;
        self.message = Some(error.to_string());
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn skip(mut self, reason: &str) -> Self {
        self.status = StageStatus::Skipped;
        self.message = Some(reason.to_string());
        self.completed_at = Some(Utc::now());
        self
    }

    /// Parser and loader skips combined
    pub fn rows_rejected(&self) -> usize {
        self.parse_errors.len() + self.rows_skipped
    }

    /// Duration in milliseconds (if finished)
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

/// Record of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique run identifier
    pub id: String,
    /// SHA-256 of the configuration the run used
    pub config_hash: String,
    pub database: PathBuf,
    pub stages: Vec<StageReport>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(database: PathBuf, config_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config_hash,
            database,
            stages: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn push(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.stages
            .iter()
            .rev()
            .find(|r| r.stage == stage)
            .map(|r| r.status)
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().rev().find(|r| r.stage == stage)
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Failed)
            .map(|r| r.stage)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(|r| r.status == StageStatus::Failed)
    }

    pub fn total_inserted(&self) -> usize {
        self.stages.iter().map(|r| r.rows_inserted).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.stages.iter().map(StageReport::rows_rejected).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableName;

    #[test]
    fn test_stage_status_round_trip() {
        for status in [StageStatus::Completed, StageStatus::Failed, StageStatus::Skipped] {
            assert_eq!(status.to_string().parse::<StageStatus>().unwrap(), status);
        }
        assert!("pending".parse::<StageStatus>().is_err());
    }

    #[test]
    fn test_stage_report_transitions() {
        let mut stats = LoadStats::new(TableName::Enrollment);
        stats.rows_inserted = 4;
        stats.add_skip("record 2 (#9 / CS150): no course".to_string());

        let mut report = StageReport::new(Stage::Enrollments);
        report.record_load(stats);
        report.parse_errors.push("Line 7: expected 3 fields, found 2".to_string());
        let report = report.complete();

        assert_eq!(report.status, StageStatus::Completed);
        assert_eq!(report.rows_inserted, 4);
        assert_eq!(report.rows_rejected(), 2);
        assert!(report.duration_ms().is_some());

        let failed = StageReport::new(Stage::Majors).fail("boom");
        assert_eq!(failed.status, StageStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_run_report_failures() {
        let mut run = RunReport::new(PathBuf::from("campus.duckdb"), "abc123".to_string());
        run.push(StageReport::new(Stage::Schema).complete());
        run.push(StageReport::new(Stage::Majors).fail("missing file"));
        run.push(StageReport::new(Stage::Students).skip("majors failed"));
        run.finish();

        assert!(run.has_failures());
        assert_eq!(run.failed_stages(), vec![Stage::Majors]);
        assert_eq!(run.status_of(Stage::Students), Some(StageStatus::Skipped));
        assert_eq!(run.status_of(Stage::Courses), None);
        assert!(uuid::Uuid::parse_str(&run.id).is_ok());
    }
}
