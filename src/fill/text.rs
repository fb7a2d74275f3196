//! Literal placeholder substitution over text containers.
//!
//! A container is anything with whole-string text that can be read and
//! rewritten: body paragraphs and table cells. Rewriting collapses the
//! container into a single run, so run-level formatting beyond the first
//! run's is lost on every container that changes.

use crate::ooxml::docx::{CellMut, Document, ParagraphMut};

/// Ordered old-text to new-text pairs.
///
/// Keys are matched by substring containment, in insertion order; a later
/// pair sees the text produced by earlier ones. Inserting an existing key
/// updates its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    pairs: Vec<(String, String)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair; empty keys are ignored.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        let old = old.into();
        if old.is_empty() {
            return;
        }
        let new = new.into();
        match self.pairs.iter_mut().find(|(key, _)| *key == old) {
            Some(pair) => pair.1 = new,
            None => self.pairs.push((old, new)),
        }
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == old)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every pair to `text`; `None` when no key occurs.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut current: Option<String> = None;
        for (old, new) in self.iter() {
            let source = current.as_deref().unwrap_or(text);
            if source.contains(old) {
                current = Some(source.replace(old, new));
            }
        }
        current
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (old, new) in iter {
            map.insert(old, new);
        }
        map
    }
}

/// Whole-string text access on a document node.
pub trait TextContainer {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
}

impl TextContainer for ParagraphMut<'_> {
    fn text(&self) -> String {
        ParagraphMut::text(self)
    }

    fn set_text(&mut self, text: &str) {
        ParagraphMut::set_text(self, text)
    }
}

impl TextContainer for CellMut<'_> {
    fn text(&self) -> String {
        CellMut::text(self)
    }

    fn set_text(&mut self, text: &str) {
        CellMut::set_text(self, text)
    }
}

impl TextContainer for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Apply `map` to one container, rewriting it only if some key occurs.
pub fn substitute<C: TextContainer + ?Sized>(container: &mut C, map: &SubstitutionMap) -> bool {
    match map.apply(&container.text()) {
        Some(replaced) => {
            container.set_text(&replaced);
            true
        },
        None => false,
    }
}

/// Apply `map` to every body paragraph and every table cell.
///
/// Returns the number of containers rewritten. Keys that never occur are
/// not an error.
pub fn substitute_document(doc: &mut Document, map: &SubstitutionMap) -> usize {
    if map.is_empty() {
        return 0;
    }

    let mut changed = 0;
    for mut paragraph in doc.paragraphs_mut() {
        if substitute(&mut paragraph, map) {
            changed += 1;
        }
    }
    for mut table in doc.tables_mut() {
        for mut cell in table.cells_mut() {
            if substitute(&mut cell, map) {
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const DOCUMENT: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Name: {{NAME}}, Date: {{DATE}}</w:t></w:r></w:p><w:p><w:r><w:t>untouched</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{NAME}}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>n/a</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:sectPr/></w:body></w:document>"#;

    fn map(pairs: &[(&str, &str)]) -> SubstitutionMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_document_substitution() {
        let mut doc = Document::parse(DOCUMENT.as_bytes()).unwrap();
        let changed = substitute_document(
            &mut doc,
            &map(&[("{{NAME}}", "Alice"), ("{{DATE}}", "2024-01-01"), ("{{MISSING}}", "x")]),
        );

        assert_eq!(changed, 2);
        assert_eq!(
            doc.text(),
            "Name: Alice, Date: 2024-01-01\nuntouched\nAlice\nn/a"
        );
    }

    #[test]
    fn test_later_pairs_see_earlier_results() {
        let m = map(&[("{{A}}", "{{B}}"), ("{{B}}", "done")]);
        assert_eq!(m.apply("{{A}} {{B}}").as_deref(), Some("done done"));
        assert_eq!(m.apply("plain"), None);
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let mut m = map(&[("a", "1"), ("b", "2")]);
        m.insert("a", "3");
        m.insert("", "ignored");
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(m.get("a"), Some("3"));
    }

    #[test]
    fn test_replaces_all_occurrences() {
        let mut text = String::from("x {{N}} y {{N}}");
        assert!(substitute(&mut text, &map(&[("{{N}}", "1")])));
        assert_eq!(text, "x 1 y 1");
        assert!(!substitute(&mut text, &map(&[("{{N}}", "1")])));
    }

    proptest! {
        #[test]
        fn substitution_is_idempotent(
            text in prop::collection::vec(
                prop_oneof!["[a-zA-Z ]{0,6}", "\\{\\{[A-Z]{1,3}\\}\\}"],
                0..8,
            )
            .prop_map(|parts| parts.concat()),
            pairs in prop::collection::vec(("\\{\\{[A-Z]{1,3}\\}\\}", "[a-z ]{0,6}"), 1..4),
        ) {
            let m: SubstitutionMap = pairs.into_iter().collect();
            let mut once = text.clone();
            substitute(&mut once, &m);
            let mut twice = once.clone();
            prop_assert!(!substitute(&mut twice, &m));
            prop_assert_eq!(once, twice);
        }
    }
}
