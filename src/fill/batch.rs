//! Batch generation: every data row of a spreadsheet against one template.

use crate::common::error::{Error, Result};
use crate::fill::image_set::ImageSource;
use crate::fill::row::{DocumentRow, RowOutcome, RowProcessor};
use crate::fill::rules::RuleSet;
use crate::ooxml::docx::Package;
use crate::ooxml::xlsx::Workbook;
use std::path::{Path, PathBuf};

/// Inputs and settings of one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Spreadsheet whose active sheet holds one document per row
    pub spreadsheet: PathBuf,
    /// Template document, re-read for every row
    pub template: PathBuf,
    pub images: ImageSource,
    /// Folder receiving `<base name>.docx` files; created if missing
    pub output: PathBuf,
    pub rules: RuleSet,
}

impl BatchConfig {
    /// A configuration using the default rule set.
    pub fn new(
        spreadsheet: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
        images: ImageSource,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            spreadsheet: spreadsheet.into(),
            template: template.into(),
            images,
            output: output.into(),
            rules: RuleSet::default(),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }
}

/// Outcomes of a batch run, one per data row in sheet order.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    #[inline]
    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    /// Paths of the documents written.
    pub fn saved(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RowOutcome::Saved { path, .. } => Some(path.as_path()),
            _ => None,
        })
    }

    /// Base names and errors of the rows that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RowOutcome::Failed { base_name, error } => Some((base_name.as_str(), error)),
            _ => None,
        })
    }

    pub fn saved_count(&self) -> usize {
        self.saved().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, RowOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Runs a [`BatchConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use docfill::fill::{BatchConfig, BatchRunner, ImageSource};
///
/// let config = BatchConfig::new(
///     "data.xlsx",
///     "template.docx",
///     ImageSource::PerDocument("images".into()),
///     "output",
/// );
/// let report = BatchRunner::new(config).run()?;
/// println!("{} documents written", report.saved_count());
/// # Ok::<(), docfill::common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every data row (row 2 onwards) of the spreadsheet.
    ///
    /// Fails only when the spreadsheet or template cannot be read or the
    /// output folder cannot be created; row errors are part of the report.
    pub fn run(&self) -> Result<BatchReport> {
        let config = &self.config;

        let workbook = Workbook::open(&config.spreadsheet)
            .map_err(|e| Error::for_input(&config.spreadsheet, e))?;
        let sheet = workbook
            .active_worksheet()
            .map_err(|e| Error::for_input(&config.spreadsheet, e))?;

        Package::open(&config.template).map_err(|e| Error::for_input(&config.template, e))?;

        if !config.output.is_dir() {
            std::fs::create_dir_all(&config.output)
                .map_err(|e| Error::at_path(&config.output, e))?;
            tracing::info!(output = %config.output.display(), "Created output folder");
        }

        tracing::info!(
            sheet = sheet.name(),
            rows = sheet.row_count().saturating_sub(1),
            "Starting batch"
        );

        let processor = RowProcessor::new(
            &config.template,
            &config.rules,
            &config.images,
            &config.output,
        );

        let mut report = BatchReport::default();
        for (index, cells) in sheet.rows().iter().enumerate().skip(1) {
            let row = DocumentRow::from_cells(index as u32 + 1, cells);
            report.outcomes.push(processor.process(&row));
        }

        tracing::info!(
            saved = report.saved_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Batch finished"
        );
        Ok(report)
    }
}
