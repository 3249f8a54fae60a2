//! Full load pipeline
//!
//! Runs every stage in order against one store file:
//!
//! 1. **schema**: drop and recreate all tables
//! 2. **majors**, **departments**, **locations**, **semesters**: independent tables
//! 3. **students**: resolves each student's major
//! 4. **faculty**, **courses**: independent tables
//! 5. **sections**, **enrollments**: resolve students and course section codes
//! 6. **grades**: null out the configured placeholder grade (optional)
//! 7. **teams**, then **addresses** and **players**: league tables, resolving
//!    each row's team by name (only when league sources are configured)
//!
//! A failed stage is logged and recorded; later stages that do not depend on
//! it still run, and stages whose prerequisites did not complete are skipped.
//!
//! ```rust,ignore
//! use campus_etl::config::PipelineConfig;
//! use campus_etl::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default())?;
//! let report = pipeline.run();
//! let listings = pipeline.listings()?;
//! ```

mod error;
mod report;
mod stage;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, error, info, info_span, warn};

pub use error::{PipelineError, PipelineResult};
pub use report::{RunReport, StageReport, StageStatus};
pub use stage::Stage;

use crate::config::PipelineConfig;
use crate::import::delimited::{ADDRESS_FIELDS, PLAYER_FIELDS};
use crate::import::{
    CourseTableImporter, DelimitedImporter, ImportResult, JsonArrayImporter, LayoutImporter,
    LineListImporter, ParagraphImporter, SourceLocation, read_source,
};
use crate::models::{Location, Major};
use crate::query::{Snapshot, StudentRow};
use crate::store::{Loader, Store, TableRecord};

/// The two listings printed after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listings {
    /// Students graduating in the report year
    pub seniors: Vec<String>,
    /// Students in the report section
    pub section_students: Vec<String>,
}

/// Sequences the load stages against one store file
pub struct Pipeline {
    config: PipelineConfig,
    loader: Loader,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated first
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let loader = Loader::new(config.load.on_unresolved);
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and report the outcome of each
    pub fn run(&mut self) -> RunReport {
        let mut run = RunReport::new(self.config.database.clone(), hash_config(&self.config));
        let _span = info_span!("pipeline_run", run_id = %run.id).entered();
        info!(
            run_id = %run.id,
            database = %self.config.database.display(),
            policy = %self.loader.policy(),
            "Starting pipeline"
        );

        for stage in Stage::all() {
            if let Some(reason) = self.should_skip_stage(stage, &run) {
                debug!(stage = stage.name(), reason = %reason, "Skipping stage");
                run.push(StageReport::new(stage).skip(&reason));
                continue;
            }

            let _stage_span = info_span!("pipeline_stage", stage = stage.name()).entered();
            info!(stage = stage.name(), "{}", stage.description());

            let mut report = StageReport::new(stage);
            let report = match self.run_stage(stage, &mut report) {
                Ok(()) => {
                    let report = report.complete();
                    info!(
                        stage = stage.name(),
                        inserted = report.rows_inserted,
                        rejected = report.rows_rejected(),
                        duration_ms = report.duration_ms().unwrap_or_default(),
                        "Stage completed"
                    );
                    report
                }
                Err(e) => {
                    error!(stage = stage.name(), error = %e, "Stage failed");
                    report.fail(&e.to_string())
                }
            };
            run.push(report);
        }

        run.finish();
        info!(
            run_id = %run.id,
            inserted = run.total_inserted(),
            rejected = run.total_rejected(),
            failed = run.failed_stages().len(),
            "Pipeline finished"
        );
        run
    }

    /// Build the senior and section listings from the loaded store
    pub fn listings(&self) -> PipelineResult<Listings> {
        let store = Store::open(&self.config.database)?;
        let snapshot = Snapshot::load(&store)?;
        let report = &self.config.report;

        let names = |rows: Vec<&StudentRow>| {
            rows.into_iter().map(|row| row.name.clone()).collect::<Vec<_>>()
        };
        Ok(Listings {
            seniors: names(snapshot.students_graduating_in(report.grad_year)),
            section_students: names(snapshot.students_in_offering(&report.section_code)),
        })
    }

    fn should_skip_stage(&self, stage: Stage, run: &RunReport) -> Option<String> {
        if let Some(blocked) = stage
            .prerequisites()
            .iter()
            .find(|p| run.status_of(**p) != Some(StageStatus::Completed))
        {
            return Some(format!("prerequisite stage '{}' did not complete", blocked));
        }
        if stage == Stage::Grades && self.config.load.grade_placeholder.is_none() {
            return Some("no grade placeholder configured".to_string());
        }
        if is_league_stage(stage) && self.league_source(stage).is_none() {
            return Some(format!("no {} source configured", stage));
        }
        None
    }

    fn run_stage(&mut self, stage: Stage, report: &mut StageReport) -> PipelineResult<()> {
        let sources = self.config.sources.clone();
        match stage {
            Stage::Schema => {
                let store = self.open_store()?;
                store.create_schema()?;
                self.loader = Loader::new(self.config.load.on_unresolved);
            }
            Stage::Majors => {
                let path = self.local_source(stage, &sources.majors)?;
                let majors = LineListImporter::new()
                    .parse_file(&path)?
                    .map(Major::new);
                self.load_records(report, majors)?;
            }
            Stage::Departments => {
                let path = self.local_source(stage, &sources.departments)?;
                let departments = ParagraphImporter::new().parse_file(&path)?;
                self.load_records(report, departments)?;
            }
            Stage::Locations => {
                let path = self.local_source(stage, &sources.buildings)?;
                let buildings = LineListImporter::new().parse_file(&path)?;
                let locations = ImportResult {
                    records: Location::expand_buildings(
                        &buildings.records,
                        self.config.load.rooms_per_building,
                    ),
                    errors: buildings.errors,
                };
                self.load_records(report, locations)?;
            }
            Stage::Semesters => {
                let semesters = ImportResult {
                    records: self.config.load.semesters.clone(),
                    errors: Vec::new(),
                };
                self.load_records(report, semesters)?;
            }
            Stage::Students => {
                let path = self.local_source(stage, &sources.students)?;
                let students = DelimitedImporter::comma(3).parse_students(&read_source(&path)?);
                self.load_records(report, students)?;
            }
            Stage::Faculty => {
                let path = self.local_source(stage, &sources.faculty)?;
                let importer = LayoutImporter::new();
                let faculty = if is_pdf(&path) {
                    importer.parse_pdf(&path)?
                } else {
                    importer.parse_file(&path)?
                };
                self.load_records(report, faculty)?;
            }
            Stage::Courses => {
                let location = self.config.source(&sources.courses);
                let courses = CourseTableImporter::new()
                    .load(&location, self.config.fetch_timeout())?;
                self.load_records(report, courses)?;
            }
            Stage::Sections => {
                let path = self.local_source(stage, &sources.sections)?;
                let entries =
                    DelimitedImporter::comma(3).parse_section_entries(&read_source(&path)?);
                self.load_records(report, entries)?;
            }
            Stage::Enrollments => {
                let path = self.local_source(stage, &sources.enrollments)?;
                let enrollments =
                    DelimitedImporter::comma(3).parse_enrollments(&read_source(&path)?);
                self.load_records(report, enrollments)?;
            }
            Stage::Grades => {
                if let Some(placeholder) = &self.config.load.grade_placeholder {
                    let store = self.open_store()?;
                    report.rows_updated = store.clear_placeholder_grades(placeholder)?;
                }
            }
            Stage::Teams | Stage::Addresses | Stage::Players => {
                self.run_league_stage(stage, report)?;
            }
        }
        Ok(())
    }

    fn run_league_stage(&mut self, stage: Stage, report: &mut StageReport) -> PipelineResult<()> {
        let Some(source) = self.league_source(stage).map(str::to_string) else {
            return Ok(());
        };
        let path = self.local_source(stage, &source)?;
        match stage {
            Stage::Teams => {
                let teams = JsonArrayImporter::new().parse_teams_file(&path)?;
                self.load_records(report, teams)
            }
            Stage::Addresses => {
                let addresses =
                    DelimitedImporter::tab(ADDRESS_FIELDS).parse_addresses(&read_source(&path)?);
                self.load_records(report, addresses)
            }
            Stage::Players => {
                let players = DelimitedImporter::comma(PLAYER_FIELDS)
                    .with_header(true)
                    .parse_players(&read_source(&path)?);
                self.load_records(report, players)
            }
            _ => Ok(()),
        }
    }

    fn league_source(&self, stage: Stage) -> Option<&str> {
        let sources = &self.config.sources;
        match stage {
            Stage::Teams => sources.teams.as_deref(),
            Stage::Addresses => sources.addresses.as_deref(),
            Stage::Players => sources.players.as_deref(),
            _ => None,
        }
    }

    /// Load parsed records, folding parse errors and load stats into the report
    fn load_records<R: TableRecord>(
        &mut self,
        report: &mut StageReport,
        imported: ImportResult<R>,
    ) -> PipelineResult<()> {
        let table = R::TABLE;
        report.records_parsed = imported.records.len();
        report.parse_errors = imported.errors.iter().map(ToString::to_string).collect();
        if !imported.errors.is_empty() {
            warn!(
                table = %table,
                skipped = imported.errors.len(),
                "Source rows skipped by the parser"
            );
        }

        let mut store = self.open_store()?;
        let stats = self.loader.load(&mut store, &imported.records)?;
        report.record_load(stats);
        Ok(())
    }

    fn open_store(&self) -> PipelineResult<Store> {
        Ok(Store::open(&self.config.database)?)
    }

    fn local_source(&self, stage: Stage, source: &str) -> PipelineResult<PathBuf> {
        match self.config.source(source) {
            SourceLocation::Local(path) => Ok(path),
            SourceLocation::Remote(url) => Err(PipelineError::RemoteSource { stage, url }),
        }
    }
}

/// Run the whole pipeline with the given configuration
pub fn run_pipeline(config: PipelineConfig) -> PipelineResult<RunReport> {
    let mut pipeline = Pipeline::new(config)?;
    Ok(pipeline.run())
}

fn is_league_stage(stage: Stage) -> bool {
    matches!(stage, Stage::Teams | Stage::Addresses | Stage::Players)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Hash the config for run provenance
fn hash_config(config: &PipelineConfig) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(config) {
        Ok(bytes) => hasher.update(&bytes),
        Err(_) => hasher.update(config.database.display().to_string().as_bytes()),
    }
    format!("{:x}", hasher.finalize())
}
