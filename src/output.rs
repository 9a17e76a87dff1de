//! Output formatting and persistence for the ranking.
//!
//! Supports the CSV export, the console summary and JSON logging.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use tracing::{debug, info};

use crate::ranking::{Ranking, RunSummary, StudentRanking};

const BANNER_WIDTH: usize = 80;

/// Formats an optional float; whole numbers keep one decimal.
pub fn format_float(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.fract() == 0.0 => format!("{v:.1}"),
        Some(v) => v.to_string(),
    }
}

/// Column headers of the ranking export, in order.
pub fn headers(ranking: &Ranking) -> Vec<String> {
    let mut headers: Vec<String> = ["Aluno", "Pont", "Media", "Desv_Pad", "Cont_REP", "Cont_APR"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    for subject in &ranking.subjects {
        headers.push(format!("Fin_{}", subject.code));
        headers.push(format!("Res_{}", subject.code));
    }

    headers.push("Perfil".to_string());
    headers
}

fn row(student: &StudentRanking) -> Vec<String> {
    let mut row = vec![
        student.name.clone(),
        student.score.to_string(),
        format_float(student.mean),
        format_float(student.std_dev),
        student.fail_count.to_string(),
        student.pass_count.to_string(),
    ];

    for subject in &student.subjects {
        row.push(format_float(subject.grade()));
        row.push(subject.result().unwrap_or_default().to_string());
    }

    row.push(student.profile.label().to_string());
    row
}

/// Writes the ranking to a CSV file, replacing any previous export.
pub fn write_ranking(path: &Path, ranking: &Ranking) -> Result<()> {
    debug!(path = %path.display(), students = ranking.len(), "Writing ranking CSV");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

    writer.write_record(headers(ranking))?;
    for student in &ranking.students {
        writer.write_record(row(student))?;
    }
    writer.flush()?;

    Ok(())
}

/// Prints the run banner and the top of the ranking.
pub fn print_summary<W: Write>(out: &mut W, summary: &RunSummary) -> Result<()> {
    let rule = "=".repeat(BANNER_WIDTH);
    let privacy = if summary.anonymized {
        "ENABLED (Anonymized)"
    } else {
        "DISABLED (Real Names)"
    };

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "PIPELINE EXECUTION SUMMARY")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Privacy Mode: {privacy}")?;
    writeln!(out, "Total Students Processed: {}", summary.total_students)?;
    writeln!(out, "{}", "-".repeat(BANNER_WIDTH))?;

    let name_width = summary
        .top
        .iter()
        .map(|s| s.name.chars().count())
        .chain(std::iter::once("Aluno".len()))
        .max()
        .unwrap_or(0);

    writeln!(out, "{:>name_width$} {:>5} {:>6}  Perfil", "Aluno", "Pont", "Media")?;
    for student in &summary.top {
        writeln!(
            out,
            "{:>name_width$} {:>5} {:>6}  {}",
            student.name,
            student.score,
            format_float(student.mean),
            student.profile
        )?;
    }
    writeln!(out, "{rule}")?;

    Ok(())
}

/// Logs the run summary as pretty-printed JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubjectConfig;
    use crate::ranking::{Profile, SubjectResult};
    use crate::records::{APPROVED, RETAINED};
    use std::fs;
    use tempfile::TempDir;

    fn student(name: &str, score: i64) -> StudentRanking {
        StudentRanking {
            name: name.to_string(),
            subjects: vec![
                SubjectResult::new(Some(7.0), Some(APPROVED)),
                SubjectResult::new(Some(2.5), Some(RETAINED)),
                SubjectResult::default(),
            ],
            mean: Some(4.75),
            std_dev: Some(3.18),
            fail_count: 1,
            pass_count: 1,
            score,
            profile: Profile::Critical,
        }
    }

    fn ranking(n: usize) -> Ranking {
        Ranking {
            subjects: SubjectConfig::default().subjects,
            students: (0..n).map(|i| student(&format!("S{i}"), -2)).collect(),
        }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(None), "");
        assert_eq!(format_float(Some(7.0)), "7.0");
        assert_eq!(format_float(Some(9.63)), "9.63");
        assert_eq!(format_float(Some(-0.5)), "-0.5");
    }

    #[test]
    fn test_headers_follow_subject_order() {
        assert_eq!(
            headers(&ranking(0)),
            vec![
                "Aluno", "Pont", "Media", "Desv_Pad", "Cont_REP", "Cont_APR", "Fin_Inf", "Res_Inf",
                "Fin_Log", "Res_Log", "Fin_Man", "Res_Man", "Perfil"
            ]
        );
    }

    #[test]
    fn test_write_ranking_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("final_ranking.csv");

        write_ranking(&path, &ranking(3)).unwrap();
        write_ranking(&path, &ranking(2)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Aluno,Pont,Media"));
    }

    #[test]
    fn test_write_ranking_row_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("final_ranking.csv");
        write_ranking(&path, &ranking(1)).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();

        assert_eq!(&record[0], "S0");
        assert_eq!(&record[1], "-2");
        assert_eq!(&record[2], "4.75");
        assert_eq!(&record[6], "7.0");
        assert_eq!(&record[7], APPROVED);
        assert_eq!(&record[10], "");
        assert_eq!(&record[11], "");
        assert_eq!(&record[12], Profile::Critical.label());
    }

    #[test]
    fn test_print_summary_limits_rows() {
        let summary = RunSummary::new("data/sample_data.xlsx", true, &ranking(15));
        let mut out = Vec::new();
        print_summary(&mut out, &summary).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Privacy Mode: ENABLED (Anonymized)"));
        assert!(text.contains("Total Students Processed: 15"));
        assert!(text.contains("S9 "));
        assert!(!text.contains("S10 "));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let summary = RunSummary::new("demo", false, &ranking(2));
        print_json(&summary).unwrap();
    }
}
