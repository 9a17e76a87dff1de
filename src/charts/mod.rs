//! Diagnostic charts rendered to PNG.
//!
//! Chart failures are logged and never abort a run.

pub mod histogram;
pub mod status;

pub use histogram::plot_distributions;
pub use status::{StatusCounts, plot_status};

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::{error, info};

use crate::records::{APPROVED, FINAL_EXAM, GradeField, GradeRecord, RETAINED, StatusField};

pub(crate) const FONT: &str = "sans-serif";

pub const SUCCESS: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
pub const WARNING: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
pub const CRITICAL: RGBColor = RGBColor(0xd6, 0x27, 0x28);
pub const NEUTRAL: RGBColor = RGBColor(0x7f, 0x7f, 0x7f);
pub const SKY_BLUE: RGBColor = RGBColor(0x87, 0xce, 0xeb);
pub const SALMON: RGBColor = RGBColor(0xfa, 0x80, 0x72);

pub const PARTIAL_STATUS_FILE: &str = "1_partial_status.png";
pub const GRADES_HIST_FILE: &str = "2_grades_hist.png";
pub const FINAL_STATUS_FILE: &str = "3_final_status.png";
pub const RECOVERY_HIST_FILE: &str = "4_recovery_hist.png";

/// Bar colour for an outcome label.
pub fn status_colour(status: &str) -> RGBColor {
    match status {
        APPROVED => SUCCESS,
        FINAL_EXAM => WARNING,
        RETAINED => CRITICAL,
        _ => NEUTRAL,
    }
}

/// Subjects in order of first appearance.
pub(crate) fn distinct_subjects(records: &[GradeRecord]) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for r in records {
        if !subjects.contains(&r.subject) {
            subjects.push(r.subject.clone());
        }
    }
    subjects
}

fn log_outcome(path: &Path, result: anyhow::Result<()>, written: &mut Vec<PathBuf>) {
    match result {
        Ok(()) => {
            info!(path = %path.display(), "Chart exported");
            written.push(path.to_path_buf());
        }
        Err(e) => error!(path = %path.display(), error = %e, "Chart rendering failed"),
    }
}

/// Renders the four diagnostic charts into `dir`.
///
/// The recovery histogram is skipped when no record went to the final exam.
/// Returns the files actually written.
#[tracing::instrument(skip(records, dir), fields(dir = %dir.display(), records = records.len()))]
pub fn render_all(records: &[GradeRecord], dir: &Path) -> Vec<PathBuf> {
    let mut written = Vec::new();

    let path = dir.join(PARTIAL_STATUS_FILE);
    let result = plot_status(records, StatusField::Partial, "Partial Status Diagnostic", &path);
    log_outcome(&path, result, &mut written);

    let path = dir.join(GRADES_HIST_FILE);
    let result = plot_distributions(
        records,
        GradeField::FinalAvg,
        "Final Grade Distribution",
        &path,
        SKY_BLUE,
    );
    log_outcome(&path, result, &mut written);

    let path = dir.join(FINAL_STATUS_FILE);
    let result = plot_status(records, StatusField::Final, "Final Outcome Status", &path);
    log_outcome(&path, result, &mut written);

    let recovery: Vec<GradeRecord> = records.iter().filter(|r| r.in_recovery()).cloned().collect();
    if recovery.is_empty() {
        info!("No recovery exam records, skipping recovery histogram");
    } else {
        let path = dir.join(RECOVERY_HIST_FILE);
        let result = plot_distributions(
            &recovery,
            GradeField::FinalExam,
            "Recovery Exam Performance",
            &path,
            SALMON,
        );
        log_outcome(&path, result, &mut written);
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colours() {
        assert_eq!(status_colour(APPROVED), SUCCESS);
        assert_eq!(status_colour(FINAL_EXAM), WARNING);
        assert_eq!(status_colour(RETAINED), CRITICAL);
        assert_eq!(status_colour("Transferido"), NEUTRAL);
    }

    #[test]
    fn test_distinct_subjects_keep_order() {
        let records = vec![
            GradeRecord::new("Ana", "Logic"),
            GradeRecord::new("Ana", "Informatics"),
            GradeRecord::new("Bruno", "Logic"),
        ];
        assert_eq!(distinct_subjects(&records), vec!["Logic", "Informatics"]);
    }
}
