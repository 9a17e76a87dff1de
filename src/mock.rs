//! Synthetic class used by the `demo` and `generate-sample` commands.
//!
//! Thirty students over the three default subjects, with the first five
//! chosen to land in distinct profiles. [`write_workbook`] lays records out
//! in the grade sheet template read by [`crate::loader`].

use std::path::Path;

use rust_xlsxwriter::{Workbook as XlsxWorkbook, XlsxError};
use tracing::info;

use crate::config::{Subject, SubjectConfig};
use crate::error::{PipelineError, Result};
use crate::loader::{
    COL_FINAL_AVG, COL_FINAL_EXAM, COL_FINAL_RESULT, COL_FOURTH_TERM, COL_NAME,
    COL_PARTIAL_RESULT, COL_SEMESTER_AVG, COL_THIRD_TERM,
};
use crate::ranking::utility::round2;
use crate::records::{APPROVED, FINAL_EXAM, GradeRecord, RETAINED};

pub const BANNER: &str = "Diário de Classe";
pub const FOOTER: &str = "Total";

const HEADER: [&str; 8] = [
    COL_NAME,
    COL_THIRD_TERM,
    COL_FOURTH_TERM,
    COL_SEMESTER_AVG,
    COL_FINAL_EXAM,
    COL_FINAL_AVG,
    COL_PARTIAL_RESULT,
    COL_FINAL_RESULT,
];

pub const STUDENTS: [&str; 30] = [
    "Maria Silva",
    "José Oliveira",
    "Ana Santos",
    "João Souza",
    "Antônio Ferreira",
    "Francisca Pereira",
    "Carlos Rodrigues",
    "Paulo Almeida",
    "Lucas Nascimento",
    "Maria Oliveira",
    "Gabriel Alves",
    "Juliana Lima",
    "Letícia Carvalho",
    "Beatriz Gomes",
    "Marcos Rocha",
    "Fernanda Costa",
    "Patrícia Ribeiro",
    "Amanda Martins",
    "Rafael Barbosa",
    "Bruno Freitas",
    "Sérgio Melo",
    "Ricardo Cardoso",
    "Daniela Teixeira",
    "Vanessa Cavalcanti",
    "Thiago Barros",
    "Aline Guimarães",
    "Renato Machado",
    "Camila Castro",
    "Felipe Vieira",
    "Rodrigo Cunha",
];

/// Semester averages per subject for the student at `index`.
fn semester_grades(index: usize) -> [f64; 3] {
    match index {
        0 => [2.0, 2.5, 2.0],
        1 => [9.5, 9.8, 9.6],
        2 => [10.0, 4.0, 7.0],
        3 => [4.8, 4.7, 4.9],
        4 => [6.5, 6.0, 6.2],
        i if i % 3 == 0 => [7.0, 7.5, 7.2],
        i if i % 3 == 1 => [5.5, 8.0, 6.0],
        _ => [4.0, 5.0, 5.5],
    }
}

/// Applies the grading template to one semester average.
///
/// Averages in `[3, 6)` go to the recovery exam and score two points more
/// there; below 3 the exam is recorded as zero and the student is retained.
pub fn grade_record(name: &str, subject: &str, semester_avg: f64) -> GradeRecord {
    let needs_recovery = (3.0..6.0).contains(&semester_avg);
    let final_exam = if needs_recovery {
        Some(semester_avg + 2.0)
    } else if semester_avg < 3.0 {
        Some(0.0)
    } else {
        None
    };

    let final_avg = match final_exam {
        Some(exam) if exam > 0.0 => (semester_avg + exam) / 2.0,
        _ => semester_avg,
    };

    let partial = if needs_recovery {
        FINAL_EXAM
    } else if semester_avg < 3.0 {
        RETAINED
    } else {
        APPROVED
    };
    let fin = if final_avg >= 5.0 { APPROVED } else { RETAINED };

    GradeRecord {
        name: name.to_string(),
        subject: subject.to_string(),
        third_term: Some(semester_avg),
        fourth_term: Some(semester_avg),
        semester_avg: Some(semester_avg),
        final_exam,
        final_avg: Some(round2(final_avg)),
        partial_result: Some(partial.to_string()),
        final_result: Some(fin.to_string()),
    }
}

/// Builds the synthetic class for the first three `subjects`, sheet by sheet.
pub fn sample_class(subjects: &[Subject]) -> Vec<GradeRecord> {
    subjects
        .iter()
        .take(3)
        .enumerate()
        .flat_map(|(s_idx, subject)| {
            STUDENTS.iter().enumerate().map(move |(i, name)| {
                grade_record(name, &subject.name, semester_grades(i)[s_idx])
            })
        })
        .collect()
}

fn xlsx_error(e: XlsxError) -> PipelineError {
    PipelineError::Workbook(e.to_string())
}

/// Writes `records` to an `.xlsx` file, one sheet per configured subject.
///
/// A banner sits in A1 when the layout leaves room above the header, and
/// each sheet ends with the configured number of footer rows.
pub fn write_workbook(path: &Path, records: &[GradeRecord], config: &SubjectConfig) -> Result<()> {
    let header_row = config.header_row as u32;
    let mut workbook = XlsxWorkbook::new();

    for subject in &config.subjects {
        let sheet = workbook.add_worksheet();
        sheet.set_name(subject.sheet.as_str()).map_err(xlsx_error)?;

        if header_row > 0 {
            sheet.write_string(0, 0, BANNER).map_err(xlsx_error)?;
        }
        for (col, title) in HEADER.iter().enumerate() {
            sheet
                .write_string(header_row, col as u16, *title)
                .map_err(xlsx_error)?;
        }

        let mut row = header_row + 1;
        for r in records.iter().filter(|r| r.subject == subject.name) {
            sheet.write_string(row, 0, r.name.as_str()).map_err(xlsx_error)?;

            let grades = [
                r.third_term,
                r.fourth_term,
                r.semester_avg,
                r.final_exam,
                r.final_avg,
            ];
            for (offset, grade) in grades.into_iter().enumerate() {
                if let Some(grade) = grade {
                    sheet
                        .write_number(row, 1 + offset as u16, grade)
                        .map_err(xlsx_error)?;
                }
            }

            for (offset, outcome) in [&r.partial_result, &r.final_result].into_iter().enumerate() {
                if let Some(outcome) = outcome {
                    sheet
                        .write_string(row, 6 + offset as u16, outcome.as_str())
                        .map_err(xlsx_error)?;
                }
            }
            row += 1;
        }

        for _ in 0..config.footer_rows {
            sheet.write_string(row, 0, FOOTER).map_err(xlsx_error)?;
            row += 1;
        }
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    workbook.save(path).map_err(xlsx_error)?;

    info!(path = %path.display(), sheets = config.subjects.len(), records = records.len(), "Sample workbook written");
    Ok(())
}
