//! Course schedule importer for the registrar's published HTML table
//!
//! The schedule page is a grid of `<td>` cells whose row boundaries do not
//! line up with course boundaries, so cells are walked in document order
//! (table, row, cell) and fed through [`CourseTableWalker`], a named-state
//! machine that knows which cell of a course record comes next. The walker
//! state carries across rows and tables.

use std::path::Path;
use std::time::Duration;

use scraper::{Html, Selector};

use super::{ImportError, ImportResult, SourceLocation, normalize_whitespace, read_source};
use crate::models::Course;

/// Leading header cells before the first course record
pub const PREAMBLE_CELLS: usize = 6;
/// Enrollment count cell between credits and days
pub const ENROLLMENT_CELLS: usize = 1;
/// Detail cells (seats, waitlist, notes) between end time and location
pub const DETAIL_CELLS: usize = 6;

/// Position of the walker within the cell stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Header cells still to skip
    Preamble(usize),
    AwaitingSection,
    AwaitingTitle,
    AwaitingInstructor,
    AwaitingCredits,
    /// Enrollment cells still to skip
    SkippingEnrollment(usize),
    AwaitingDays,
    AwaitingStart,
    AwaitingEnd,
    /// Detail cells still to skip
    SkippingDetails(usize),
    AwaitingLocation,
    /// A course was emitted; the next cell is padding
    RecordComplete,
}

impl CellState {
    fn skip(remaining: usize, then: CellState, more: fn(usize) -> CellState) -> CellState {
        if remaining <= 1 { then } else { more(remaining - 1) }
    }
}

/// Cell-by-cell course record builder
#[derive(Debug, Clone)]
pub struct CourseTableWalker {
    state: CellState,
    current: Course,
}

impl Default for CourseTableWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseTableWalker {
    pub fn new() -> Self {
        Self::with_preamble(PREAMBLE_CELLS)
    }

    /// Start with `cells` header cells to skip
    pub fn with_preamble(cells: usize) -> Self {
        let state = if cells == 0 {
            CellState::AwaitingSection
        } else {
            CellState::Preamble(cells)
        };
        Self {
            state,
            current: Course::default(),
        }
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    /// Feed the text of the next cell; returns a course when its last cell arrives
    pub fn feed(&mut self, cell: &str) -> Option<Course> {
        let text = normalize_whitespace(cell);
        let optional = |text: String| if text.is_empty() { None } else { Some(text) };

        let (next, emitted) = match self.state {
            CellState::Preamble(n) => (
                CellState::skip(n, CellState::AwaitingSection, CellState::Preamble),
                None,
            ),
            CellState::AwaitingSection => {
                self.current.section = text;
                (CellState::AwaitingTitle, None)
            }
            CellState::AwaitingTitle => {
                self.current.title = text;
                (CellState::AwaitingInstructor, None)
            }
            CellState::AwaitingInstructor => {
                self.current.instructor = text;
                (CellState::AwaitingCredits, None)
            }
            CellState::AwaitingCredits => {
                self.current.credits = text;
                (CellState::SkippingEnrollment(ENROLLMENT_CELLS), None)
            }
            CellState::SkippingEnrollment(n) => (
                CellState::skip(n, CellState::AwaitingDays, CellState::SkippingEnrollment),
                None,
            ),
            CellState::AwaitingDays => {
                self.current.days = optional(text);
                (CellState::AwaitingStart, None)
            }
            CellState::AwaitingStart => {
                self.current.start_time = optional(text);
                (CellState::AwaitingEnd, None)
            }
            CellState::AwaitingEnd => {
                self.current.end_time = optional(text);
                (CellState::SkippingDetails(DETAIL_CELLS), None)
            }
            CellState::SkippingDetails(n) => (
                CellState::skip(n, CellState::AwaitingLocation, CellState::SkippingDetails),
                None,
            ),
            CellState::AwaitingLocation => {
                self.current.location = text;
                let course = std::mem::take(&mut self.current);
                (CellState::RecordComplete, Some(course))
            }
            CellState::RecordComplete => (CellState::AwaitingSection, None),
        };

        self.state = next;
        emitted
    }
}

/// Course schedule importer
#[derive(Debug, Clone)]
pub struct CourseTableImporter {
    preamble: usize,
}

impl Default for CourseTableImporter {
    fn default() -> Self {
        Self {
            preamble: PREAMBLE_CELLS,
        }
    }
}

impl CourseTableImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preamble(mut self, cells: usize) -> Self {
        self.preamble = cells;
        self
    }

    /// Parse a schedule page
    ///
    /// A record whose section cell is empty cannot be keyed and is reported.
    /// A partial record at the end of the document is discarded.
    pub fn parse_html(&self, html: &str) -> Result<ImportResult<Course>, ImportError> {
        let document = Html::parse_document(html);
        let table_sel = selector("table")?;
        let row_sel = selector("tr")?;
        let cell_sel = selector("td")?;

        let mut walker = CourseTableWalker::with_preamble(self.preamble);
        let mut result = ImportResult::new();
        let mut record_no = 0;

        for table in document.select(&table_sel) {
            for row in table.select(&row_sel) {
                for cell in row.select(&cell_sel) {
                    let text: String = cell.text().collect();
                    let Some(course) = walker.feed(&text) else {
                        continue;
                    };
                    record_no += 1;
                    if course.section.is_empty() {
                        result.skip(ImportError::InvalidRecord {
                            record: record_no,
                            message: format!("course '{}' has no section code", course.title),
                        });
                    } else {
                        result.records.push(course);
                    }
                }
            }
        }

        if walker.state() != CellState::AwaitingSection && walker.state() != CellState::RecordComplete {
            tracing::debug!("Discarding partial course record in state {:?}", walker.state());
        }
        tracing::debug!("Course table produced {} records", result.records.len());
        Ok(result)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ImportResult<Course>, ImportError> {
        self.parse_html(&read_source(path)?)
    }

    /// Fetch a schedule page over HTTP and parse it
    #[cfg(feature = "web-fetch")]
    pub fn fetch(&self, url: &str, timeout: Duration) -> Result<ImportResult<Course>, ImportError> {
        tracing::debug!("Fetching {} (timeout {:?})", url, timeout);
        let fetch_error = |e: reqwest::Error| ImportError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(fetch_error)?;
        let body = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_error)?;

        self.parse_html(&body)
    }

    #[cfg(not(feature = "web-fetch"))]
    pub fn fetch(&self, url: &str, _timeout: Duration) -> Result<ImportResult<Course>, ImportError> {
        Err(ImportError::Fetch {
            url: url.to_string(),
            message: "HTTP fetching not enabled (build with the `web-fetch` feature)".to_string(),
        })
    }

    /// Parse a schedule from a local file or a URL
    pub fn load(
        &self,
        source: &SourceLocation,
        timeout: Duration,
    ) -> Result<ImportResult<Course>, ImportError> {
        match source {
            SourceLocation::Local(path) => self.parse_file(path),
            SourceLocation::Remote(url) => self.fetch(url, timeout),
        }
    }
}

fn selector(css: &str) -> Result<Selector, ImportError> {
    Selector::parse(css).map_err(|e| ImportError::ParseError(format!("selector '{}': {}", css, e)))
}
