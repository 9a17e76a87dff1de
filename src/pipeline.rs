//! End-to-end run: records in, charts plus ranking export out.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::anonymize::anonymize;
use crate::charts::render_all;
use crate::config::SubjectConfig;
use crate::loader::{Workbook, load_subjects};
use crate::output::write_ranking;
use crate::ranking::{Ranking, RunSummary, generate_ranking};
use crate::records::GradeRecord;

pub const RANKING_FILE: &str = "final_ranking.csv";

/// Inputs that shape one run besides the records themselves.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub results_dir: PathBuf,
    pub anonymize: bool,
    pub subjects: SubjectConfig,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub ranking: Ranking,
    pub summary: RunSummary,
    pub charts: Vec<PathBuf>,
    pub export: PathBuf,
}

/// Decodes workbook bytes and reads every configured subject sheet.
pub fn records_from_workbook(bytes: Vec<u8>, config: &SubjectConfig) -> Result<Vec<GradeRecord>> {
    let mut workbook = Workbook::from_bytes(bytes)?;
    info!("Consolidating subject sheets and cleaning raw data");
    Ok(load_subjects(&mut workbook, &config.subjects, config.layout())?)
}

/// Runs the privacy toggle, charts, ranking and export over loaded records.
#[tracing::instrument(skip(records, options), fields(records = records.len(), anonymize = options.anonymize))]
pub fn run(records: Vec<GradeRecord>, source: &str, options: &RunOptions) -> Result<RunReport> {
    std::fs::create_dir_all(&options.results_dir)?;

    let records = if options.anonymize {
        info!("Privacy mode ON, anonymizing student names");
        let (records, anonymizer) = anonymize(&records);
        if anonymizer.is_empty() {
            warn!("No student names found to anonymize");
        } else {
            info!(students = anonymizer.len(), "Student names replaced");
        }
        records
    } else {
        info!("Privacy mode OFF, using real student names");
        records
    };

    info!("Generating visual diagnostic reports");
    let charts = render_all(&records, &options.results_dir);

    info!("Calculating final performance ranking and qualitative profiles");
    let ranking = generate_ranking(&records, &options.subjects.subjects)?;
    if ranking.is_empty() {
        warn!("No student matched a configured subject, exporting an empty ranking");
    }

    let export = export_path(&options.results_dir);
    write_ranking(&export, &ranking)?;
    info!(path = %export.display(), students = ranking.len(), "Ranking exported");

    let summary = RunSummary::new(source, options.anonymize, &ranking);

    Ok(RunReport {
        ranking,
        summary,
        charts,
        export,
    })
}

pub fn export_path(results_dir: &Path) -> PathBuf {
    results_dir.join(RANKING_FILE)
}
