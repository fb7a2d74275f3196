//! Image replacement rules.
//!
//! A [`RuleSet`] lists, in application order, every image placeholder of a
//! template and how it is filled. Rule sets are plain values handed to the
//! batch runner; [`RuleSet::default`] is the classic three-placeholder
//! report layout.

use crate::common::error::{Error, Result};
use crate::common::unit::Length;
use serde::Deserialize;
use smallvec::{SmallVec, smallvec};
use std::path::Path;

/// How one image placeholder is filled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ReplacementRule {
    /// Replace the placeholder paragraph's content with one picture.
    #[serde(rename = "single")]
    SingleImage {
        placeholder: String,
        #[serde(alias = "imageIndex")]
        image_index: usize,
        width: Length,
    },
    /// Replace the placeholder paragraph with a borderless 1x2 table holding
    /// two pictures side by side.
    #[serde(rename = "double")]
    PairedImages {
        placeholder: String,
        #[serde(alias = "imageIndices")]
        image_indices: (usize, usize),
        width: Length,
    },
}

impl ReplacementRule {
    pub fn single(placeholder: impl Into<String>, image_index: usize, width: Length) -> Self {
        ReplacementRule::SingleImage {
            placeholder: placeholder.into(),
            image_index,
            width,
        }
    }

    pub fn paired(
        placeholder: impl Into<String>,
        image_indices: (usize, usize),
        width: Length,
    ) -> Self {
        ReplacementRule::PairedImages {
            placeholder: placeholder.into(),
            image_indices,
            width,
        }
    }

    #[inline]
    pub fn placeholder(&self) -> &str {
        match self {
            ReplacementRule::SingleImage { placeholder, .. }
            | ReplacementRule::PairedImages { placeholder, .. } => placeholder,
        }
    }

    /// Rendered width of each picture.
    #[inline]
    pub fn width(&self) -> Length {
        match self {
            ReplacementRule::SingleImage { width, .. }
            | ReplacementRule::PairedImages { width, .. } => *width,
        }
    }

    /// 0-based image indices consumed by the rule, in placement order.
    pub fn image_indices(&self) -> SmallVec<[usize; 2]> {
        match self {
            ReplacementRule::SingleImage { image_index, .. } => smallvec![*image_index],
            ReplacementRule::PairedImages {
                image_indices: (left, right),
                ..
            } => smallvec![*left, *right],
        }
    }

    fn validate(&self) -> Result<()> {
        if self.placeholder().is_empty() {
            return Err(Error::Config("rule placeholder must not be empty".to_string()));
        }
        if self.width().emus() <= 0 {
            return Err(Error::Config(format!(
                "rule '{}': width must be positive, got {}",
                self.placeholder(),
                self.width()
            )));
        }
        Ok(())
    }
}

/// Ordered image replacement rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<ReplacementRule>,
}

impl RuleSet {
    /// Build a rule set, rejecting empty placeholders and non-positive widths.
    pub fn new(rules: Vec<ReplacementRule>) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// Parse a YAML list of rules.
    ///
    /// ```
    /// use docfill::fill::RuleSet;
    ///
    /// let rules = RuleSet::from_yaml_str(r#"
    /// - type: single
    ///   placeholder: "{{LOGO}}"
    ///   image_index: 0
    ///   width: 3cm
    /// - type: double
    ///   placeholder: "{{BEFORE_AFTER}}"
    ///   image_indices: [1, 2]
    ///   width: 2.5in
    /// "#)?;
    /// assert_eq!(rules.required_image_count(), 3);
    /// # Ok::<(), docfill::common::Error>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let rules: Vec<ReplacementRule> =
            serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        Self::new(rules)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::at_path(path, e))?;
        Self::from_yaml_str(&yaml)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Number of images a document needs for the image phase to run:
    /// the largest referenced index plus one, 0 for an empty set.
    pub fn required_image_count(&self) -> usize {
        self.rules
            .iter()
            .flat_map(|rule| rule.image_indices())
            .max()
            .map_or(0, |max| max + 1)
    }

    #[inline]
    pub fn rules(&self) -> &[ReplacementRule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplacementRule> {
        self.rules.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                ReplacementRule::single("{{IMAGE_1}}", 0, Length::from_inches(4.5)),
                ReplacementRule::paired("{{IMAGES_2_3}}", (1, 2), Length::from_inches(2.5)),
                ReplacementRule::single("{{IMAGE_4}}", 3, Length::from_inches(4.0)),
            ],
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a ReplacementRule;
    type IntoIter = std::slice::Iter<'a, ReplacementRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rules() {
        let rules = RuleSet::default();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.required_image_count(), 4);

        let placeholders: Vec<&str> = rules.iter().map(|r| r.placeholder()).collect();
        assert_eq!(placeholders, vec!["{{IMAGE_1}}", "{{IMAGES_2_3}}", "{{IMAGE_4}}"]);
        assert_eq!(rules.rules()[1].image_indices().as_slice(), &[1, 2]);
        assert_eq!(rules.rules()[0].width().emus(), 4_114_800);
    }

    #[test]
    fn test_yaml_rules() {
        let rules = RuleSet::from_yaml_str(
            r#"
- type: double
  placeholder: "{{PAIR}}"
  imageIndices: [0, 5]
  width: 6cm
- {type: single, placeholder: "{{ONE}}", image_index: 2, width: 914400}
"#,
        )
        .unwrap();

        assert_eq!(
            rules.rules(),
            &[
                ReplacementRule::paired("{{PAIR}}", (0, 5), Length::from_cm(6.0)),
                ReplacementRule::single("{{ONE}}", 2, Length::from_inches(1.0)),
            ]
        );
        assert_eq!(rules.required_image_count(), 6);
    }

    #[test]
    fn test_yaml_validation() {
        let unknown = "- {type: triple, placeholder: X, image_index: 0, width: 1in}";
        assert!(matches!(RuleSet::from_yaml_str(unknown), Err(Error::Config(_))));

        let empty = "- {type: single, placeholder: '', image_index: 0, width: 1in}";
        assert!(matches!(RuleSet::from_yaml_str(empty), Err(Error::Config(_))));

        let zero = "- {type: single, placeholder: X, image_index: 0, width: 0in}";
        assert!(matches!(RuleSet::from_yaml_str(zero), Err(Error::Config(_))));

        let bad_width = "- {type: single, placeholder: X, image_index: 0, width: wide}";
        assert!(RuleSet::from_yaml_str(bad_width).is_err());
    }

    #[test]
    fn test_empty_rule_set() {
        let rules = RuleSet::new(Vec::new()).unwrap();
        assert!(rules.is_empty());
        assert_eq!(rules.required_image_count(), 0);
    }
}
