//! Output formatting for CLI

use crate::pipeline::{Listings, RunReport, StageStatus};

/// Per-stage error lines shown before truncating
const MAX_ERRORS_SHOWN: usize = 5;

/// Format a titled name list, one name per line
pub fn format_listing(title: &str, names: &[String]) -> String {
    let mut output = format!("\n{}:\n", title);
    for name in names {
        output.push_str(name);
        output.push('\n');
    }
    output
}

/// Format both report listings
pub fn format_listings(listings: &Listings) -> String {
    let mut output = format_listing("Senior List", &listings.seniors);
    output.push_str(&format_listing("Students Section List", &listings.section_students));
    output
}

/// Format the run summary: one line per stage, then skipped rows
pub fn format_run_summary(report: &RunReport) -> String {
    let mut output = format!("\nRun {} ({})\n", report.id, report.database.display());

    for stage in &report.stages {
        let marker = match stage.status {
            StageStatus::Completed if stage.rows_rejected() > 0 => "⚠️ ",
            StageStatus::Completed => "✅",
            StageStatus::Failed => "❌",
            StageStatus::Skipped => "⏭️ ",
        };
        output.push_str(&format!("{} {:<12} {}", marker, stage.stage.name(), stage.status));

        match stage.status {
            StageStatus::Completed => {
                output.push_str(&format!(", {} inserted", stage.rows_inserted));
                if stage.rows_updated > 0 {
                    output.push_str(&format!(", {} updated", stage.rows_updated));
                }
                if stage.rows_rejected() > 0 {
                    output.push_str(&format!(", {} rejected", stage.rows_rejected()));
                }
            }
            _ => {
                if let Some(message) = &stage.message {
                    output.push_str(&format!(": {}", message));
                }
            }
        }
        output.push('\n');

        let errors: Vec<&String> = stage.parse_errors.iter().chain(&stage.load_errors).collect();
        for error in errors.iter().take(MAX_ERRORS_SHOWN) {
            output.push_str(&format!("     - {}\n", error));
        }
        if errors.len() > MAX_ERRORS_SHOWN {
            output.push_str(&format!(
                "     ... and {} more\n",
                errors.len() - MAX_ERRORS_SHOWN
            ));
        }
    }

    output.push_str(&format!(
        "\n{} rows inserted, {} rejected, {} stage(s) failed\n",
        report.total_inserted(),
        report.total_rejected(),
        report.failed_stages().len()
    ));
    output
}
