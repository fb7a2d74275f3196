//! Template filling.
//!
//! Generating one document is a fixed two-phase pipeline:
//!
//! 1. **Text**: every (old, new) pair of the row is applied to each body
//!    paragraph and table cell ([`text`]).
//! 2. **Images**: the [`RuleSet`] is applied in order, placing pictures
//!    from the row's [`ImageSet`] ([`images`]). The phase runs only when
//!    the set holds every image the rules reference.
//!
//! [`RowProcessor`] runs both phases for one spreadsheet row and saves the
//! result; [`BatchRunner`] does so for every data row, re-reading the
//! template each time so rows never share state.

pub mod batch;
pub mod image_set;
pub mod images;
pub mod row;
pub mod rules;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use batch::{BatchConfig, BatchReport, BatchRunner};
pub use image_set::{IMAGE_EXTENSIONS, ImageSet, ImageSource};
pub use images::{
    ImagePhase, ImagePhaseSkip, apply_image_rules, replace_paired_images, replace_single_image,
};
pub use row::{DocumentRow, RowOutcome, RowProcessor};
pub use rules::{ReplacementRule, RuleSet};
pub use text::{SubstitutionMap, TextContainer, substitute, substitute_document};
