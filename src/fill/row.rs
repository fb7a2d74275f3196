//! One spreadsheet row in, one document out.

use crate::common::error::{Error, Result};
use crate::fill::image_set::ImageSource;
use crate::fill::images::{ImagePhase, ImagePhaseSkip, apply_image_rules};
use crate::fill::rules::RuleSet;
use crate::fill::text::{SubstitutionMap, substitute_document};
use crate::ooxml::docx::Package;
use crate::ooxml::xlsx::CellValue;
use std::path::{Path, PathBuf};

/// One data row of the spreadsheet as text.
///
/// Column 0 is the output base name; the following columns are consumed
/// two at a time as (old text, new text).
///
/// Built from cells, a base name or old text that is zero or `FALSE`
/// counts as empty. New texts keep such values (`0`, `FALSE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    number: u32,
    cells: Vec<Option<String>>,
}

impl DocumentRow {
    /// `number` is the 1-based sheet row the cells come from.
    pub fn new(number: u32, cells: Vec<Option<String>>) -> Self {
        Self { number, cells }
    }

    pub fn from_cells(number: u32, cells: &[CellValue]) -> Self {
        let cells = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let is_new_text = i > 0 && i % 2 == 0;
                if !is_new_text && is_blank(cell) {
                    None
                } else {
                    cell.to_text()
                }
            })
            .collect();
        Self::new(number, cells)
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Output base name, `None` when the first cell is empty.
    pub fn base_name(&self) -> Option<&str> {
        self.cells
            .first()
            .and_then(|c| c.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Text substitutions of the row.
    ///
    /// A pair whose old text is empty is ignored; a missing new text
    /// becomes the empty string.
    pub fn substitutions(&self) -> SubstitutionMap {
        let mut map = SubstitutionMap::new();
        for i in (1..self.cells.len()).step_by(2) {
            let Some(old) = self.cells[i].as_deref() else {
                continue;
            };
            let new = self.cells.get(i + 1).and_then(|c| c.as_deref()).unwrap_or("");
            map.insert(old, new);
        }
        map
    }
}

/// The result of processing one row.
#[derive(Debug)]
pub enum RowOutcome {
    /// The document was written to `path`.
    Saved {
        base_name: String,
        path: PathBuf,
        image_phase: ImagePhase,
    },
    /// The row has no base name; nothing was written.
    Skipped { row: u32 },
    /// Processing stopped on an error; the batch went on.
    Failed { base_name: String, error: Error },
}

impl RowOutcome {
    pub fn base_name(&self) -> Option<&str> {
        match self {
            RowOutcome::Saved { base_name, .. } | RowOutcome::Failed { base_name, .. } => {
                Some(base_name)
            },
            RowOutcome::Skipped { .. } => None,
        }
    }
}

/// Fills the template for one row at a time.
#[derive(Debug, Clone, Copy)]
pub struct RowProcessor<'a> {
    template: &'a Path,
    rules: &'a RuleSet,
    images: &'a ImageSource,
    output: &'a Path,
}

impl<'a> RowProcessor<'a> {
    pub fn new(
        template: &'a Path,
        rules: &'a RuleSet,
        images: &'a ImageSource,
        output: &'a Path,
    ) -> Self {
        Self {
            template,
            rules,
            images,
            output,
        }
    }

    /// Produce `<output>/<base name>.docx` for `row`.
    ///
    /// Text substitution runs before the image rules. Errors are reported
    /// in the outcome, never returned.
    pub fn process(&self, row: &DocumentRow) -> RowOutcome {
        let Some(base_name) = row.base_name() else {
            tracing::info!(row = row.number(), "Skipping row without base name");
            return RowOutcome::Skipped { row: row.number() };
        };

        tracing::info!(base_name, row = row.number(), "Processing document");
        match self.fill(row, base_name) {
            Ok((path, image_phase)) => {
                tracing::info!(base_name, path = %path.display(), "Saved document");
                RowOutcome::Saved {
                    base_name: base_name.to_string(),
                    path,
                    image_phase,
                }
            },
            Err(error) => {
                tracing::error!(base_name, error = %error, "Failed to process document");
                RowOutcome::Failed {
                    base_name: base_name.to_string(),
                    error,
                }
            },
        }
    }

    fn fill(&self, row: &DocumentRow, base_name: &str) -> Result<(PathBuf, ImagePhase)> {
        check_base_name(base_name)?;

        let mut pkg = Package::open(self.template)?;

        let substitutions = row.substitutions();
        let changed = substitute_document(pkg.document_mut(), &substitutions);
        tracing::debug!(base_name, changed, "Text substitution done");

        let images = self.images.resolve(base_name)?;
        let image_phase = apply_image_rules(&mut pkg, self.rules, images.as_ref())?;
        match &image_phase {
            ImagePhase::Skipped(ImagePhaseSkip::FolderMissing) => tracing::warn!(
                base_name,
                folder = %self.images.folder_for(base_name).display(),
                "Image folder not found, skipping image replacement"
            ),
            ImagePhase::Skipped(ImagePhaseSkip::NotEnoughImages { required, found }) => {
                tracing::warn!(
                    base_name,
                    required,
                    found,
                    "Not enough images, skipping image replacement"
                )
            },
            ImagePhase::Applied { .. } => {},
        }

        let path = self.output.join(format!("{}.docx", base_name));
        let bytes = pkg.to_bytes()?;
        std::fs::write(&path, bytes).map_err(|e| Error::at_path(&path, e))?;
        Ok((path, image_phase))
    }
}

/// Empty cells, empty strings, zero and `FALSE`.
fn is_blank(cell: &CellValue) -> bool {
    match cell {
        CellValue::Int(i) => *i == 0,
        CellValue::Float(v) => *v == 0.0,
        CellValue::Bool(b) => !b,
        other => other.is_empty(),
    }
}

/// A base name must name a file directly inside the output folder.
fn check_base_name(base_name: &str) -> Result<()> {
    let invalid = base_name == "."
        || base_name == ".."
        || base_name.contains(['/', '\\'])
        || base_name.contains('\0');
    if invalid {
        return Err(Error::InvalidFormat(format!(
            "base name '{}' is not a valid file name",
            base_name
        )));
    }
    Ok(())
}
