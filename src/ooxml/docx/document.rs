//! Document - the body of a Word document as a mutable tree.

use crate::common::unit::emu_to_twip_i64;
use crate::ooxml::docx::paragraph::{Paragraph, ParagraphMut};
use crate::ooxml::docx::table::{Table, TableMut};
use crate::ooxml::docx::tree::{Element, Node, XmlTree};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;

/// Text block width used when the section does not define page geometry (6.5in).
pub const DEFAULT_TEXT_WIDTH_TWIPS: i64 = 9360;

/// Namespaces new content relies on, declared on the root when missing.
const REQUIRED_NAMESPACES: [(&str, &str); 3] = [
    ("xmlns:w", namespace::WML_MAIN),
    ("xmlns:r", namespace::OFC_RELATIONSHIPS),
    ("xmlns:wp", namespace::DML_WORDPROCESSING_DRAWING),
];

/// Position of a block-level item (paragraph, table, ...) among the body's children.
///
/// Inserting or removing blocks shifts the positions that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRef(usize);

impl BlockRef {
    /// The position right after this one.
    #[inline]
    pub fn next(self) -> BlockRef {
        BlockRef(self.0 + 1)
    }
}

/// The main document part (`word/document.xml`).
///
/// Only body-level blocks are exposed: paragraphs and tables that are direct
/// children of `w:body`. Paragraphs nested in tables are reached through the
/// table cells.
///
/// # Examples
///
/// ```rust
/// use docfill::ooxml::docx::Document;
///
/// let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello {{NAME}}</w:t></w:r></w:p></w:body></w:document>"#;
/// let mut doc = Document::parse(xml)?;
///
/// for mut para in doc.paragraphs_mut() {
///     let text = para.text().replace("{{NAME}}", "Alice");
///     para.set_text(&text);
/// }
/// assert_eq!(doc.paragraphs().next().unwrap().text(), "Hello Alice");
/// # Ok::<(), docfill::ooxml::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    tree: XmlTree,
    next_drawing_id: u32,
}

impl Document {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut tree = XmlTree::parse(xml)?;

        let root = tree.root_mut();
        if !root.is("document") {
            return Err(OoxmlError::InvalidFormat(format!(
                "expected a w:document root, found <{}>",
                root.name()
            )));
        }
        if root.child("body").is_none() {
            return Err(OoxmlError::InvalidFormat(
                "document has no w:body".to_string(),
            ));
        }

        for (prefix, uri) in REQUIRED_NAMESPACES {
            match root.attr_qualified(prefix) {
                None => root.set_attr(prefix, uri),
                Some(bound) if bound != uri => {
                    return Err(OoxmlError::InvalidFormat(format!(
                        "prefix {} is bound to {}",
                        prefix, bound
                    )));
                },
                Some(_) => {},
            }
        }

        let mut max_id = 0u32;
        root.walk(&mut |e| {
            if e.is("docPr") {
                if let Some(id) = e.attr("id").and_then(|id| id.parse::<u32>().ok()) {
                    max_id = max_id.max(id);
                }
            }
        });

        Ok(Self {
            tree,
            next_drawing_id: max_id + 1,
        })
    }

    fn body(&self) -> &Element {
        self.tree
            .root()
            .child("body")
            .unwrap_or_else(|| unreachable!("presence of w:body is checked on parse"))
    }

    fn body_mut(&mut self) -> &mut Element {
        self.tree
            .root_mut()
            .child_mut("body")
            .unwrap_or_else(|| unreachable!("presence of w:body is checked on parse"))
    }

    /// Body-level paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = Paragraph<'_>> {
        self.body()
            .elements()
            .filter(|e| e.is("p"))
            .map(Paragraph::new)
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = ParagraphMut<'_>> {
        self.body_mut()
            .elements_mut()
            .filter(|e| e.is("p"))
            .map(ParagraphMut::new)
    }

    /// Body-level tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = Table<'_>> {
        self.body()
            .elements()
            .filter(|e| e.is("tbl"))
            .map(Table::new)
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = TableMut<'_>> {
        self.body_mut()
            .elements_mut()
            .filter(|e| e.is("tbl"))
            .map(TableMut::new)
    }

    #[inline]
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    #[inline]
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Concatenated text of all body-level paragraphs and table cells, one
    /// block per line.
    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        for e in self.body().elements() {
            if e.is("p") {
                lines.push(Paragraph::new(e).text());
            } else if e.is("tbl") {
                lines.extend(Table::new(e).cells().map(|cell| cell.text()));
            }
        }
        lines.join("\n")
    }

    /// First body-level paragraph whose text contains `needle`.
    pub fn find_paragraph(&self, needle: &str) -> Option<BlockRef> {
        self.body()
            .children
            .iter()
            .position(|node| {
                matches!(node, Node::Element(e) if e.is("p") && Paragraph::new(e).text().contains(needle))
            })
            .map(BlockRef)
    }

    pub fn paragraph_at_mut(&mut self, at: BlockRef) -> Option<ParagraphMut<'_>> {
        match self.body_mut().children.get_mut(at.0) {
            Some(Node::Element(e)) if e.is("p") => Some(ParagraphMut::new(e)),
            _ => None,
        }
    }

    pub fn table_at(&self, at: BlockRef) -> Option<Table<'_>> {
        match self.body().children.get(at.0) {
            Some(Node::Element(e)) if e.is("tbl") => Some(Table::new(e)),
            _ => None,
        }
    }

    /// Insert a block immediately before `anchor`.
    ///
    /// Returns the position of the inserted block; the anchor moves to
    /// `anchor.next()`.
    pub fn insert_before(&mut self, anchor: BlockRef, block: Element) -> Result<BlockRef> {
        let body = self.body_mut();
        if anchor.0 >= body.children.len() {
            return Err(OoxmlError::Other(format!(
                "block position {} is out of range",
                anchor.0
            )));
        }
        body.children.insert(anchor.0, Node::Element(block));
        Ok(anchor)
    }

    /// Remove the block at `at` from the body.
    pub fn remove(&mut self, at: BlockRef) -> Result<Element> {
        let body = self.body_mut();
        let removable =
            matches!(body.children.get(at.0), Some(Node::Element(e)) if !e.is("sectPr"));
        if !removable {
            return Err(OoxmlError::Other(format!(
                "no removable block at position {}",
                at.0
            )));
        }
        match body.children.remove(at.0) {
            Node::Element(e) => Ok(e),
            _ => unreachable!("checked to be an element"),
        }
    }

    /// Width available to body content: page width minus left and right
    /// margins of the final section, in twips.
    pub fn text_block_width_twips(&self) -> i64 {
        let Some(sect_pr) = self.body().child("sectPr") else {
            return DEFAULT_TEXT_WIDTH_TWIPS;
        };

        let twips = |e: Option<&Element>, attr: &str| {
            e.and_then(|e| e.attr(attr))
                .and_then(|value| parse_twips(&value))
        };
        let page_width = twips(sect_pr.child("pgSz"), "w");
        let margins = sect_pr.child("pgMar");
        let left = twips(margins, "left").unwrap_or(0);
        let right = twips(margins, "right").unwrap_or(0);

        match page_width {
            Some(width) if width - left - right > 0 => width - left - right,
            _ => DEFAULT_TEXT_WIDTH_TWIPS,
        }
    }

    /// Allocate an id for a new drawing, unique within the document.
    pub fn next_drawing_id(&mut self) -> u32 {
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;
        id
    }

    pub fn to_xml(&self) -> String {
        self.tree.to_xml()
    }
}

/// Parse a twips measure; universal measures such as "1in" are accepted too.
fn parse_twips(value: &str) -> Option<i64> {
    if let Ok(twips) = value.parse::<i64>() {
        return Some(twips);
    }
    value
        .parse::<crate::common::Length>()
        .ok()
        .map(|length| emu_to_twip_i64(length.emus()))
}
