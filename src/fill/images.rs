//! Image placeholders: inline pictures and side-by-side picture tables.

use crate::common::error::{Error, Result};
use crate::common::unit::Length;
use crate::fill::image_set::ImageSet;
use crate::fill::rules::{ReplacementRule, RuleSet};
use crate::ooxml::docx::{Package, Picture, TableMut, new_table};
use std::path::Path;

/// What happened to the image phase of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePhase {
    /// Rules were applied; `missing` lists placeholders not found.
    Applied { missing: Vec<String> },
    /// No image rule was applied.
    Skipped(ImagePhaseSkip),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePhaseSkip {
    /// The document's image folder does not exist.
    FolderMissing,
    /// Fewer images than the rule set references.
    NotEnoughImages { required: usize, found: usize },
}

/// Replace the first paragraph containing `placeholder` with one picture.
///
/// The paragraph keeps its properties; its content becomes a single
/// picture run `width` wide. Later paragraphs with the same placeholder are
/// left alone. Returns whether the placeholder was found.
pub fn replace_single_image(
    pkg: &mut Package,
    placeholder: &str,
    image: &Path,
    width: Length,
) -> Result<bool> {
    let Some(at) = pkg.document().find_paragraph(placeholder) else {
        return Ok(false);
    };

    let run = pkg.new_picture_run(&Picture::open(image)?, width)?;
    if let Some(mut paragraph) = pkg.document_mut().paragraph_at_mut(at) {
        paragraph.clear();
        paragraph.append(run);
    }
    Ok(true)
}

/// Replace the first paragraph containing `placeholder` with a borderless
/// 1x2 table showing `left` and `right`, each `width` wide.
///
/// The table takes the paragraph's place in the body and the paragraph is
/// removed. Returns whether the placeholder was found.
pub fn replace_paired_images(
    pkg: &mut Package,
    placeholder: &str,
    left: &Path,
    right: &Path,
    width: Length,
) -> Result<bool> {
    let Some(at) = pkg.document().find_paragraph(placeholder) else {
        return Ok(false);
    };

    let runs = [
        pkg.new_picture_run(&Picture::open(left)?, width)?,
        pkg.new_picture_run(&Picture::open(right)?, width)?,
    ];

    let col_width = pkg.document().text_block_width_twips() / 2;
    let mut table = new_table(1, 2, col_width);
    {
        let mut view = TableMut::new(&mut table);
        view.remove_borders();
        for (col, run) in runs.into_iter().enumerate() {
            let Some(mut cell) = view.cell_mut(0, col) else {
                continue;
            };
            if let Some(mut paragraph) = cell.first_paragraph_mut() {
                paragraph.set_spacing_zero();
                paragraph.append(run);
            }
        }
    }

    let doc = pkg.document_mut();
    doc.insert_before(at, table)?;
    doc.remove(at.next())?;
    Ok(true)
}

/// Run every rule of `rules` against `pkg` in order.
///
/// Nothing is applied unless `images` holds at least
/// [`RuleSet::required_image_count`] images. A placeholder missing from
/// the document skips only its own rule.
pub fn apply_image_rules(
    pkg: &mut Package,
    rules: &RuleSet,
    images: Option<&ImageSet>,
) -> Result<ImagePhase> {
    let Some(images) = images else {
        return Ok(ImagePhase::Skipped(ImagePhaseSkip::FolderMissing));
    };

    let required = rules.required_image_count();
    if images.len() < required {
        return Ok(ImagePhase::Skipped(ImagePhaseSkip::NotEnoughImages {
            required,
            found: images.len(),
        }));
    }

    let mut missing = Vec::new();
    for rule in rules {
        tracing::debug!(placeholder = rule.placeholder(), "Applying image rule");
        if !apply_rule(pkg, rule, images)? {
            tracing::warn!(placeholder = rule.placeholder(), "Placeholder not found in document");
            missing.push(rule.placeholder().to_string());
        }
    }
    Ok(ImagePhase::Applied { missing })
}

fn apply_rule(pkg: &mut Package, rule: &ReplacementRule, images: &ImageSet) -> Result<bool> {
    // Indices are below `images.len()` once the count check has passed.
    let image = |index: usize| {
        images.get(index).ok_or_else(|| {
            Error::Other(format!("no image at index {}", index))
        })
    };

    match rule {
        ReplacementRule::SingleImage {
            placeholder,
            image_index,
            width,
        } => replace_single_image(pkg, placeholder, image(*image_index)?, *width),
        ReplacementRule::PairedImages {
            placeholder,
            image_indices: (left, right),
            width,
        } => replace_paired_images(pkg, placeholder, image(*left)?, image(*right)?, *width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::fixtures::{docx, paragraphs, write_pngs};
    use crate::ooxml::docx::Paragraph;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn package(texts: &[&str]) -> Package {
        Package::from_bytes(&docx(&paragraphs(texts))).unwrap()
    }

    fn images(count: usize) -> (TempDir, ImageSet) {
        let dir = TempDir::new().unwrap();
        write_pngs(dir.path(), count);
        let set = ImageSet::from_dir(dir.path()).unwrap();
        (dir, set)
    }

    fn element_xml(paragraph: Paragraph<'_>) -> String {
        let mut out = String::new();
        paragraph.element().write_to(&mut out);
        out
    }

    #[test]
    fn test_single_image_replaces_first_match_only() {
        let (_dir, set) = images(1);
        let mut pkg = package(&["intro", "{{IMAGE_1}}", "again {{IMAGE_1}}"]);

        let found =
            replace_single_image(&mut pkg, "{{IMAGE_1}}", set.get(0).unwrap(), Length::from_inches(4.5))
                .unwrap();
        assert!(found);

        let doc = pkg.document();
        let counts: Vec<usize> = doc.paragraphs().map(|p| p.picture_count()).collect();
        assert_eq!(counts, vec![0, 1, 0]);
        assert_eq!(doc.text(), "intro\n\nagain {{IMAGE_1}}");
    }

    #[test]
    fn test_single_image_not_found() {
        let (_dir, set) = images(1);
        let mut pkg = package(&["nothing here"]);
        let found =
            replace_single_image(&mut pkg, "{{IMAGE_1}}", set.get(0).unwrap(), Length::from_inches(1.0))
                .unwrap();
        assert!(!found);
        assert!(
            !pkg.opc_package()
                .partnames()
                .any(|p| p.as_str().starts_with("/word/media/"))
        );
    }

    #[test]
    fn test_paired_images_become_borderless_table() {
        let (_dir, set) = images(3);
        let mut pkg = package(&["before", "{{IMAGES_2_3}}", "after"]);
        let paragraphs_before = pkg.document().paragraph_count();
        let tables_before = pkg.document().table_count();

        let found = replace_paired_images(
            &mut pkg,
            "{{IMAGES_2_3}}",
            set.get(1).unwrap(),
            set.get(2).unwrap(),
            Length::from_inches(2.5),
        )
        .unwrap();
        assert!(found);

        let doc = pkg.document();
        assert_eq!(doc.paragraph_count(), paragraphs_before - 1);
        assert_eq!(doc.table_count(), tables_before + 1);
        assert_eq!(doc.text(), "before\n\n\nafter");

        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.cells().all(|cell| cell.is_borderless()));

        let left = element_xml(table.cell(0, 0).unwrap().paragraphs().next().unwrap());
        let right = element_xml(table.cell(0, 1).unwrap().paragraphs().next().unwrap());
        assert!(left.contains(r#"<w:spacing w:before="0" w:after="0"/>"#));
        assert!(left.contains(r#"descr="2.png""#));
        assert!(right.contains(r#"descr="3.png""#));
        assert!(left.contains(r#"<wp:extent cx="2286000" cy="1143000"/>"#));

        let before = doc.find_paragraph("before").unwrap();
        assert!(doc.table_at(before.next()).is_some());
    }

    #[test]
    fn test_gating_skips_whole_phase() {
        let (_dir, set) = images(3);
        let texts = ["{{IMAGE_1}}", "{{IMAGES_2_3}}", "{{IMAGE_4}}"];
        let mut pkg = package(&texts);

        let phase = apply_image_rules(&mut pkg, &RuleSet::default(), Some(&set)).unwrap();
        assert_eq!(
            phase,
            ImagePhase::Skipped(ImagePhaseSkip::NotEnoughImages {
                required: 4,
                found: 3
            })
        );
        assert_eq!(pkg.document().text(), texts.join("\n"));
        assert_eq!(pkg.document().table_count(), 0);
    }

    #[test]
    fn test_missing_folder() {
        let mut pkg = package(&["{{IMAGE_1}}"]);
        let phase = apply_image_rules(&mut pkg, &RuleSet::default(), None).unwrap();
        assert_eq!(phase, ImagePhase::Skipped(ImagePhaseSkip::FolderMissing));
    }

    #[test]
    fn test_missing_placeholder_skips_only_its_rule() {
        let (_dir, set) = images(4);
        let mut pkg = package(&["{{IMAGE_1}}", "{{IMAGES_2_3}}", "no fourth"]);

        let phase = apply_image_rules(&mut pkg, &RuleSet::default(), Some(&set)).unwrap();
        assert_eq!(
            phase,
            ImagePhase::Applied {
                missing: vec!["{{IMAGE_4}}".to_string()]
            }
        );
        let doc = pkg.document();
        assert_eq!(doc.paragraphs().next().unwrap().picture_count(), 1);
        assert_eq!(doc.table_count(), 1);
        assert_eq!(doc.paragraph_count(), 2);
    }
}
