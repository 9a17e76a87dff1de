//! Runtime settings and the subject sheet layout.
//!
//! [`Settings`] comes from the environment (a `.env` file is loaded by the
//! binary before this runs). [`SubjectConfig`] describes which worksheets
//! hold which subject and where the header sits, and can be overridden with
//! a JSON file:
//!
//! ```json
//! {
//!   "subjects": [
//!     { "sheet": "Informática(B)", "name": "Informatics", "code": "Inf" },
//!     { "sheet": "Lógica(B)", "name": "Logic", "code": "Log" }
//!   ],
//!   "header_row": 7,
//!   "footer_rows": 1
//! }
//! ```

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_DIR: &str = "results";
pub const DEFAULT_SAMPLE_DATA: &str = "data/sample_data.xlsx";

/// A worksheet and the subject it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Worksheet name in the workbook.
    pub sheet: String,
    /// Subject name used in records and charts.
    pub name: String,
    /// Short code used for the `Fin_`/`Res_` export columns.
    pub code: String,
}

impl Subject {
    pub fn new(sheet: &str, name: &str, code: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            name: name.to_string(),
            code: code.to_string(),
        }
    }
}

/// Row offsets of the grade sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Zero-based row holding the column headers.
    pub header_row: usize,
    /// Trailing rows dropped after the data.
    pub footer_rows: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: 7,
            footer_rows: 1,
        }
    }
}

fn default_header_row() -> usize {
    SheetLayout::default().header_row
}

fn default_footer_rows() -> usize {
    SheetLayout::default().footer_rows
}

/// Ordered subject list plus sheet layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub subjects: Vec<Subject>,
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default = "default_footer_rows")]
    pub footer_rows: usize,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        let layout = SheetLayout::default();
        Self {
            subjects: vec![
                Subject::new("Informática(B)", "Informatics", "Inf"),
                Subject::new("Lógica(B)", "Logic", "Log"),
                Subject::new("Manutenção(B)", "Maintenance", "Man"),
            ],
            header_row: layout.header_row,
            footer_rows: layout.footer_rows,
        }
    }
}

impl SubjectConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SubjectConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            header_row: self.header_row,
            footer_rows: self.footer_rows,
        }
    }
}

/// Where the workbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    Local(PathBuf),
}

impl DataSource {
    /// Treats anything starting with `http` as a URL, otherwise a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            DataSource::Remote(source.to_string())
        } else {
            DataSource::Local(PathBuf::from(source))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sheet_url: Option<String>,
    pub anonymize: bool,
    pub results_dir: PathBuf,
    pub sample_data: PathBuf,
    pub subjects_config: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sheet_url: None,
            anonymize: false,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            sample_data: PathBuf::from(DEFAULT_SAMPLE_DATA),
            subjects_config: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        Self {
            sheet_url: lookup("GOOGLE_SHEET_URL").filter(|u| !u.trim().is_empty()),
            anonymize: lookup("ANONYMIZE_DATA")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            results_dir: lookup("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            sample_data: lookup("SAMPLE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sample_data),
            subjects_config: lookup("SUBJECTS_CONFIG").map(PathBuf::from),
        }
    }

    /// Picks the remote sheet when configured, else the local sample file.
    pub fn data_source(&self) -> Result<DataSource> {
        if let Some(url) = &self.sheet_url {
            return Ok(DataSource::parse(url));
        }
        if self.sample_data.exists() {
            return Ok(DataSource::Local(self.sample_data.clone()));
        }
        Err(PipelineError::NoDataSource(
            self.sample_data.display().to_string(),
        ))
    }

    /// The configured subject list, or the default three subjects.
    pub fn subject_config(&self) -> Result<SubjectConfig> {
        match &self.subjects_config {
            Some(path) => SubjectConfig::load(path),
            None => Ok(SubjectConfig::default()),
        }
    }
}
