//! Workbook decoding and per-subject record extraction.
//!
//! The grade sheets follow a fixed template: a few banner rows, a header row
//! with the column names below, one row per student and a footer row.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook_from_rs};
use tracing::{debug, info, warn};

use crate::config::{SheetLayout, Subject};
use crate::error::{PipelineError, Result};
use crate::records::GradeRecord;

pub const COL_NAME: &str = "Nome";
pub const COL_THIRD_TERM: &str = "3º B";
pub const COL_FOURTH_TERM: &str = "4º B";
pub const COL_SEMESTER_AVG: &str = "Média Semestral";
pub const COL_FINAL_EXAM: &str = "Exame Final";
pub const COL_FINAL_AVG: &str = "Média Final";
pub const COL_PARTIAL_RESULT: &str = "Res. Parcial";
pub const COL_FINAL_RESULT: &str = "Res. Final";

/// A single spreadsheet cell, detached from the decoder's types.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Numeric coercion: numbers pass, numeric text is parsed, the rest is absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Trimmed text content, absent for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Error(_) => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// A worksheet as a grid anchored at cell A1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }
}

/// An in-memory `.xlsx` workbook.
pub struct Workbook {
    inner: Xlsx<Cursor<Vec<u8>>>,
}

impl Workbook {
    /// Decodes an `.xlsx` workbook from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let inner: Xlsx<Cursor<Vec<u8>>> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e: XlsxError| PipelineError::Workbook(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    /// Reads one worksheet into a [`RawSheet`].
    pub fn sheet(&mut self, name: &str) -> Result<RawSheet> {
        if !self.sheet_names().iter().any(|s| s == name) {
            return Err(PipelineError::MissingSheet(name.to_string()));
        }

        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e: XlsxError| PipelineError::Workbook(e.to_string()))?;

        // The decoded range starts at the first used cell; pad back to A1 so
        // the header offset counts from the top of the sheet.
        let (row0, col0) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row0];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col0];
            cells.extend(row.iter().map(Cell::from));
            rows.push(cells);
        }

        debug!(sheet = name, rows = rows.len(), "Worksheet decoded");
        Ok(RawSheet::new(name, rows))
    }
}

struct Columns {
    name: usize,
    third_term: Option<usize>,
    fourth_term: Option<usize>,
    semester_avg: Option<usize>,
    final_exam: Option<usize>,
    final_avg: Option<usize>,
    partial_result: Option<usize>,
    final_result: Option<usize>,
}

impl Columns {
    fn locate(sheet: &RawSheet, header: &[Cell]) -> Result<Self> {
        let find = |col: &str| {
            header
                .iter()
                .position(|c| c.as_text().as_deref() == Some(col))
        };

        let name = find(COL_NAME).ok_or_else(|| PipelineError::MissingColumn {
            sheet: sheet.name.clone(),
            column: COL_NAME.to_string(),
        })?;

        let columns = Columns {
            name,
            third_term: find(COL_THIRD_TERM),
            fourth_term: find(COL_FOURTH_TERM),
            semester_avg: find(COL_SEMESTER_AVG),
            final_exam: find(COL_FINAL_EXAM),
            final_avg: find(COL_FINAL_AVG),
            partial_result: find(COL_PARTIAL_RESULT),
            final_result: find(COL_FINAL_RESULT),
        };

        for (col, idx) in [
            (COL_FINAL_AVG, columns.final_avg),
            (COL_PARTIAL_RESULT, columns.partial_result),
            (COL_FINAL_RESULT, columns.final_result),
        ] {
            if idx.is_none() {
                warn!(sheet = %sheet.name, column = col, "Column missing, values treated as absent");
            }
        }

        Ok(columns)
    }
}

fn cell(row: &[Cell], idx: Option<usize>) -> Option<&Cell> {
    idx.and_then(|i| row.get(i))
}

/// Extracts the student rows of one subject sheet.
///
/// Rows without a student name are dropped.
pub fn records_from_sheet(
    sheet: &RawSheet,
    subject: &str,
    layout: SheetLayout,
) -> Result<Vec<GradeRecord>> {
    let header = sheet
        .rows
        .get(layout.header_row)
        .ok_or_else(|| PipelineError::MissingColumn {
            sheet: sheet.name.clone(),
            column: COL_NAME.to_string(),
        })?;
    let columns = Columns::locate(sheet, header)?;

    let end = sheet.rows.len().saturating_sub(layout.footer_rows);
    let start = layout.header_row + 1;
    if start >= end {
        return Ok(Vec::new());
    }

    let number = |row: &[Cell], idx| cell(row, idx).and_then(Cell::as_number);
    let text = |row: &[Cell], idx| cell(row, idx).and_then(Cell::as_text);

    let records = sheet.rows[start..end]
        .iter()
        .filter_map(|row| {
            let row = row.as_slice();
            let name = text(row, Some(columns.name))?;
            Some(GradeRecord {
                name,
                subject: subject.to_string(),
                third_term: number(row, columns.third_term),
                fourth_term: number(row, columns.fourth_term),
                semester_avg: number(row, columns.semester_avg),
                final_exam: number(row, columns.final_exam),
                final_avg: number(row, columns.final_avg),
                partial_result: text(row, columns.partial_result),
                final_result: text(row, columns.final_result),
            })
        })
        .collect();

    Ok(records)
}

/// Reads every configured subject sheet and concatenates their records.
#[tracing::instrument(skip_all, fields(subjects = subjects.len()))]
pub fn load_subjects(
    workbook: &mut Workbook,
    subjects: &[Subject],
    layout: SheetLayout,
) -> Result<Vec<GradeRecord>> {
    let mut all = Vec::new();

    for subject in subjects {
        let sheet = workbook.sheet(&subject.sheet)?;
        let records = records_from_sheet(&sheet, &subject.name, layout)?;
        info!(sheet = %subject.sheet, subject = %subject.name, students = records.len(), "Subject sheet loaded");
        all.extend(records);
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{APPROVED, FINAL_EXAM, RETAINED};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn header() -> Vec<Cell> {
        [
            COL_NAME,
            COL_THIRD_TERM,
            COL_FOURTH_TERM,
            COL_SEMESTER_AVG,
            COL_FINAL_EXAM,
            COL_FINAL_AVG,
            COL_PARTIAL_RESULT,
            COL_FINAL_RESULT,
        ]
        .iter()
        .map(|s| text(s))
        .collect()
    }

    fn template(data: Vec<Vec<Cell>>) -> RawSheet {
        let mut rows = vec![vec![text("Escola Estadual")]];
        rows.extend(std::iter::repeat_with(Vec::new).take(6));
        rows.push(header());
        rows.extend(data);
        rows.push(vec![text("Total")]);
        RawSheet::new("Lógica(B)", rows)
    }

    fn student(name: &str, avg: f64, partial: &str, fin: &str) -> Vec<Cell> {
        vec![
            text(name),
            Cell::Number(avg),
            Cell::Number(avg),
            Cell::Number(avg),
            Cell::Empty,
            Cell::Number(avg),
            text(partial),
            text(fin),
        ]
    }

    #[test]
    fn test_cell_numeric_coercion() {
        assert_eq!(Cell::Number(7.5).as_number(), Some(7.5));
        assert_eq!(text(" 6.25 ").as_number(), Some(6.25));
        assert_eq!(text("abs").as_number(), None);
        assert_eq!(text("NaN").as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(text("  Ana  ").as_text().as_deref(), Some("Ana"));
        assert_eq!(text("   ").as_text(), None);
        assert_eq!(Cell::Empty.as_text(), None);
    }

    #[test]
    fn test_records_skip_banner_and_footer() {
        let sheet = template(vec![
            student("Ana", 8.0, APPROVED, APPROVED),
            student("Bruno", 4.0, FINAL_EXAM, RETAINED),
        ]);

        let records = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Ana");
        assert_eq!(records[0].subject, "Logic");
        assert_eq!(records[0].final_avg, Some(8.0));
        assert_eq!(records[0].final_exam, None);
        assert_eq!(records[1].partial_result.as_deref(), Some(FINAL_EXAM));
        assert_eq!(records[1].final_result.as_deref(), Some(RETAINED));
    }

    #[test]
    fn test_records_drop_rows_without_name() {
        let mut blank = student("", 5.0, APPROVED, APPROVED);
        blank[0] = Cell::Empty;
        let sheet = template(vec![student("Ana", 8.0, APPROVED, APPROVED), blank]);

        let records = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_records_coerce_text_grades() {
        let mut row = student("Ana", 0.0, APPROVED, APPROVED);
        row[5] = text("7.5");
        row[3] = text("-");
        let sheet = template(vec![row]);

        let records = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap();
        assert_eq!(records[0].final_avg, Some(7.5));
        assert_eq!(records[0].semester_avg, None);
    }

    #[test]
    fn test_records_missing_name_column() {
        let mut sheet = template(vec![student("Ana", 8.0, APPROVED, APPROVED)]);
        sheet.rows[7][0] = text("Aluno");

        let err = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[test]
    fn test_records_sheet_too_short() {
        let sheet = RawSheet::new("Empty", vec![vec![text("only banner")]]);
        let err = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[test]
    fn test_records_header_only_sheet_is_empty() {
        let sheet = template(vec![]);
        let records = records_from_sheet(&sheet, "Logic", SheetLayout::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_custom_layout() {
        let sheet = RawSheet::new(
            "Flat",
            vec![header(), student("Ana", 9.0, APPROVED, APPROVED)],
        );
        let layout = SheetLayout {
            header_row: 0,
            footer_rows: 0,
        };
        let records = records_from_sheet(&sheet, "Logic", layout).unwrap();
        assert_eq!(records.len(), 1);
    }

    fn fixture() -> Workbook {
        let bytes = include_bytes!("../tests/fixtures/sample_data.xlsx");
        Workbook::from_bytes(bytes.to_vec()).expect("Failed to decode fixture")
    }

    #[test]
    fn test_workbook_sheet_names() {
        let workbook = fixture();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Informática(B)", "Lógica(B)", "Manutenção(B)", "Notas"]
        );
    }

    #[test]
    fn test_workbook_sheet_anchored_at_a1() {
        let mut workbook = fixture();

        // data starts at B8 with nothing above it
        let sheet = workbook.sheet("Lógica(B)").unwrap();
        assert!(sheet.rows[..7].iter().all(|r| r.iter().all(|c| *c == Cell::Empty)));
        assert_eq!(sheet.rows[7][0], Cell::Empty);
        assert_eq!(sheet.rows[7][1], text(COL_NAME));

        let sheet = workbook.sheet("Informática(B)").unwrap();
        assert_eq!(sheet.rows[7][0], text(COL_NAME));
    }

    #[test]
    fn test_workbook_missing_sheet() {
        let mut workbook = fixture();
        let err = workbook.sheet("Física(B)").unwrap_err();
        assert!(matches!(err, PipelineError::MissingSheet(name) if name == "Física(B)"));
    }

    #[test]
    fn test_load_subjects_across_sheets() {
        let mut workbook = fixture();
        let subjects = crate::config::SubjectConfig::default().subjects;
        let records = load_subjects(&mut workbook, &subjects, SheetLayout::default()).unwrap();

        assert_eq!(records.len(), 11);
        assert!(records.iter().all(|r| r.name != "Total"));
        assert_eq!(records.iter().filter(|r| r.subject == "Logic").count(), 4);
        assert_eq!(records.iter().filter(|r| r.subject == "Maintenance").count(), 3);

        let ana_logic = records
            .iter()
            .find(|r| r.name == "Ana" && r.subject == "Logic")
            .unwrap();
        assert_eq!(ana_logic.final_avg, Some(8.5));
        assert_eq!(ana_logic.semester_avg, Some(8.5));

        let bruno_inf = records
            .iter()
            .find(|r| r.name == "Bruno" && r.subject == "Informatics")
            .unwrap();
        assert_eq!(bruno_inf.final_exam, Some(0.0));
        assert_eq!(bruno_inf.final_result.as_deref(), Some(RETAINED));
    }

    #[test]
    fn test_invalid_workbook_bytes() {
        let result = Workbook::from_bytes(vec![0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::Workbook(_))));
    }
}
