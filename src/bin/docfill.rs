//! docfill - generate one Word document per spreadsheet row.
//!
//! ```text
//! docfill --data data.xlsx --template template.docx --images images/ \
//!         --output out/ --archive result.zip
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use docfill::archive::zip_directory;
use docfill::fill::{BatchConfig, BatchReport, BatchRunner, ImageSource, RowOutcome, RuleSet};

/// How image files are laid out under `--images`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// All documents share the images directly inside the folder.
    Flat,
    /// Each document uses the subfolder named after its base name.
    PerDocument,
}

/// Batch-generate Word documents from a template and spreadsheet rows.
#[derive(Debug, Parser)]
#[command(name = "docfill", version, about)]
struct Cli {
    /// Spreadsheet (.xlsx); row 1 is a header, column A names each document.
    #[arg(long, value_name = "XLSX")]
    data: PathBuf,

    /// Template document (.docx).
    #[arg(long, value_name = "DOCX")]
    template: PathBuf,

    /// Folder holding the images.
    #[arg(long, value_name = "DIR")]
    images: PathBuf,

    #[arg(long, value_enum, default_value_t = Layout::PerDocument)]
    layout: Layout,

    /// YAML image rules; the built-in rules are used when omitted.
    #[arg(long, value_name = "YAML")]
    rules: Option<PathBuf>,

    /// Folder for the generated documents. Without it the documents are
    /// staged in a temporary folder and only `--archive` is kept.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Also pack the generated documents into this ZIP file.
    #[arg(long, value_name = "ZIP")]
    archive: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to INFO
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<BatchReport> {
    let rules = match &cli.rules {
        Some(path) => RuleSet::from_yaml_file(path)?,
        None => RuleSet::default(),
    };

    let images = match cli.layout {
        Layout::Flat => ImageSource::Flat(cli.images.clone()),
        Layout::PerDocument => ImageSource::PerDocument(cli.images.clone()),
    };

    // Removed when dropped, on success and on error alike.
    let staging;
    let output = match (&cli.output, &cli.archive) {
        (Some(dir), _) => dir.clone(),
        (None, Some(_)) => {
            staging = tempfile::TempDir::new().context("failed to create staging folder")?;
            staging.path().join("output")
        },
        (None, None) => bail!("either --output or --archive is required"),
    };

    let config = BatchConfig::new(&cli.data, &cli.template, images, &output).with_rules(rules);
    let report = BatchRunner::new(config).run()?;

    if let Some(archive) = &cli.archive {
        let count = zip_directory(&output, archive)
            .with_context(|| format!("failed to write {}", archive.display()))?;
        println!("Packed {} documents into {}", count, archive.display());
    }

    Ok(report)
}

fn print_summary(report: &BatchReport) {
    for outcome in report.outcomes() {
        if let RowOutcome::Failed { base_name, error } = outcome {
            println!("  failed: {}.docx: {}", base_name, error);
        }
    }
    println!(
        "Done: {} saved, {} skipped, {} failed",
        report.saved_count(),
        report.skipped_count(),
        report.failed_count()
    );
}
