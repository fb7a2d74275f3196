//! docfill - batch-generate Word documents from a template
//!
//! A `.docx` template carries literal placeholders such as `{{NAME}}` or
//! `{{IMAGE_1}}`. Each data row of a spreadsheet produces one document: the
//! row's (old, new) text pairs are substituted into every paragraph and
//! table cell, then image placeholders are replaced by pictures taken from
//! a folder, either inline or as a borderless side-by-side table.
//!
//! # Features
//!
//! - **Lossless template editing**: parts and XML the engine does not touch
//!   are written back unchanged
//! - **Spreadsheet input**: the active sheet of an `.xlsx` workbook
//! - **Configurable image rules**: built-in defaults or a YAML rule file
//! - **Per-row failure isolation**: one bad row never stops the batch
//!
//! # Example - Generating documents
//!
//! ```no_run
//! use docfill::fill::{BatchConfig, BatchRunner, ImageSource, RuleSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::new(
//!     "data.xlsx",
//!     "template.docx",
//!     ImageSource::PerDocument("images".into()),
//!     "output",
//! )
//! .with_rules(RuleSet::from_yaml_file("rules.yaml")?);
//!
//! let report = BatchRunner::new(config).run()?;
//! for (base_name, error) in report.failures() {
//!     eprintln!("{}: {}", base_name, error);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Editing a single document
//!
//! ```no_run
//! use docfill::common::Length;
//! use docfill::fill::{SubstitutionMap, replace_single_image, substitute_document};
//! use docfill::ooxml::docx::Package;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("template.docx")?;
//!
//! let map: SubstitutionMap = [("{{NAME}}", "Alice")].into_iter().collect();
//! substitute_document(pkg.document_mut(), &map);
//! replace_single_image(&mut pkg, "{{IMAGE_1}}", Path::new("photo.png"), Length::from_inches(4.5))?;
//!
//! pkg.save("alice.docx")?;
//! # Ok(())
//! # }
//! ```

/// ZIP packaging of generated documents
pub mod archive;

/// Common types and utilities shared by the format and engine modules
pub mod common;

/// Placeholder substitution engine and batch runner
pub mod fill;

/// OOXML (Office Open XML) packages: .docx templates and .xlsx data
pub mod ooxml;

// Re-export commonly used types for convenience
pub use common::{Error, Length, Result};
pub use fill::{BatchConfig, BatchReport, BatchRunner, ImageSource, RuleSet};
