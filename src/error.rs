//! Error type shared by the pipeline stages.

use thiserror::Error;

/// Failures that abort a pipeline run.
///
/// [`PipelineError::Connection`] is kept apart from the rest so the CLI can
/// tell a remote fetch problem from a bad spreadsheet.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access the remote spreadsheet: {0}")]
    Connection(String),

    #[error("no data source found: set GOOGLE_SHEET_URL or create {0}")]
    NoDataSource(String),

    #[error("worksheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("column '{column}' not found in worksheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    #[error("duplicate entry for student '{name}' in subject '{subject}'")]
    DuplicateEntry { name: String, subject: String },

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
