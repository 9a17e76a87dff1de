//! CLI entry point for the grade rater.
//!
//! Provides subcommands for ranking a grade workbook, running the pipeline
//! over a built-in synthetic class, writing that class out as a workbook,
//! and inspecting a workbook's sheets.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use grade_rater::{
    config::{DataSource, Settings, SubjectConfig},
    error::PipelineError,
    fetch::acquire,
    loader::Workbook,
    mock::{sample_class, write_workbook},
    output::{print_json, print_summary},
    pipeline::{RunOptions, RunReport, records_from_workbook, run},
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_rater")]
#[command(about = "Rank students and profile their performance from a grade workbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank students from a workbook file or URL
    Run {
        /// Path or URL of the workbook (defaults to GOOGLE_SHEET_URL, then the sample file)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Directory for charts and the ranking CSV
        #[arg(short, long)]
        results_dir: Option<PathBuf>,

        /// Replace student names with generated IDs
        #[arg(short, long, default_value_t = false)]
        anonymize: bool,

        /// JSON file describing subject sheets
        #[arg(short, long)]
        subjects: Option<PathBuf>,

        /// Also log the run summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the pipeline over a built-in synthetic class
    Demo {
        /// Directory for charts and the ranking CSV
        #[arg(short, long)]
        results_dir: Option<PathBuf>,

        /// Replace student names with generated IDs
        #[arg(short, long, default_value_t = false)]
        anonymize: bool,
    },
    /// Write the synthetic class to a workbook laid out like the grade sheets
    GenerateSample {
        /// Output workbook (defaults to SAMPLE_DATA_PATH, then data/sample_data.xlsx)
        #[arg(value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON file describing subject sheets
        #[arg(short, long)]
        subjects: Option<PathBuf>,
    },
    /// List the worksheets of a workbook and the configured subjects they match
    ListSheets {
        /// Path or URL of the workbook
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// JSON file describing subject sheets
        #[arg(short, long)]
        subjects: Option<PathBuf>,
    },
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"))
        .to_path_buf();
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_rater.log"))
        .to_os_string();

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;
    let cli = Cli::parse();
    let settings = Settings::from_env();

    let outcome = match cli.command {
        Commands::Run {
            source,
            results_dir,
            anonymize,
            subjects,
            json,
        } => {
            let settings = override_settings(settings, results_dir, anonymize, subjects);
            run_workbook(&settings, source, json).await
        }
        Commands::Demo {
            results_dir,
            anonymize,
        } => {
            let settings = override_settings(settings, results_dir, anonymize, None);
            run_demo(&settings)
        }
        Commands::GenerateSample { output, subjects } => {
            let settings = override_settings(settings, None, false, subjects);
            generate_sample(&settings, output)
        }
        Commands::ListSheets { source, subjects } => {
            let settings = override_settings(settings, None, false, subjects);
            list_sheets(&settings, source).await
        }
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(PipelineError::Connection(_)) => {
                    error!(error = %e, "Failed to fetch remote data")
                }
                _ => error!(error = %e, "Critical pipeline failure"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Applies command-line flags on top of the environment settings.
fn override_settings(
    mut settings: Settings,
    results_dir: Option<PathBuf>,
    anonymize: bool,
    subjects: Option<PathBuf>,
) -> Settings {
    if let Some(dir) = results_dir {
        settings.results_dir = dir;
    }
    if anonymize {
        settings.anonymize = true;
    }
    if subjects.is_some() {
        settings.subjects_config = subjects;
    }
    settings
}

fn resolve_source(settings: &Settings, source: Option<String>) -> Result<DataSource> {
    let source = match source {
        Some(s) => DataSource::parse(&s),
        None => settings.data_source()?,
    };
    match &source {
        DataSource::Remote(_) => info!(source = %source, "Data source: remote spreadsheet"),
        DataSource::Local(_) => info!(source = %source, "Data source: local workbook"),
    }
    Ok(source)
}

fn options(settings: &Settings, subjects: SubjectConfig) -> RunOptions {
    RunOptions {
        results_dir: settings.results_dir.clone(),
        anonymize: settings.anonymize,
        subjects,
    }
}

fn finish(report: &RunReport, json: bool) -> Result<()> {
    print_summary(&mut std::io::stdout().lock(), &report.summary)?;
    if json {
        print_json(&report.summary)?;
    }
    info!(
        charts = report.charts.len(),
        export = %report.export.display(),
        "Pipeline executed successfully"
    );
    Ok(())
}

#[tracing::instrument(skip(settings))]
async fn run_workbook(settings: &Settings, source: Option<String>, json: bool) -> Result<()> {
    info!("Initializing academic performance analysis pipeline");
    let subjects = settings.subject_config()?;
    let source = resolve_source(settings, source)?;

    let bytes = acquire(&source).await?;
    let records = records_from_workbook(bytes, &subjects)?;

    let report = run(records, &source.to_string(), &options(settings, subjects))?;
    finish(&report, json)
}

#[tracing::instrument(skip(settings))]
fn run_demo(settings: &Settings) -> Result<()> {
    let subjects = SubjectConfig::default();
    let records = sample_class(&subjects.subjects);
    info!(records = records.len(), "Synthetic class generated");

    let report = run(records, "demo", &options(settings, subjects))?;
    finish(&report, false)
}

#[tracing::instrument(skip(settings))]
fn generate_sample(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    let subjects = settings.subject_config()?;
    let output = output.unwrap_or_else(|| settings.sample_data.clone());

    let records = sample_class(&subjects.subjects);
    write_workbook(&output, &records, &subjects)?;
    Ok(())
}

#[tracing::instrument(skip(settings))]
async fn list_sheets(settings: &Settings, source: Option<String>) -> Result<()> {
    let subjects = settings.subject_config()?;
    let source = resolve_source(settings, source)?;
    let workbook = Workbook::from_bytes(acquire(&source).await?)?;
    let sheets = workbook.sheet_names();

    info!(total = sheets.len(), "Workbook sheets listed");
    for sheet in &sheets {
        let subject = subjects.subjects.iter().find(|s| &s.sheet == sheet);
        info!(
            sheet = %sheet,
            subject = subject.map(|s| s.name.as_str()).unwrap_or("-"),
            "Sheet"
        );
    }

    let missing: Vec<_> = subjects
        .subjects
        .iter()
        .filter(|s| !sheets.contains(&s.sheet))
        .collect();
    for subject in &missing {
        warn!(sheet = %subject.sheet, subject = %subject.name, "Configured sheet not found");
    }

    info!(
        configured = subjects.subjects.len(),
        missing = missing.len(),
        "Sheet check summary"
    );
    Ok(())
}
