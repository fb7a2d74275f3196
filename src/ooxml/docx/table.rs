//! Tables: cell text access, construction and border removal.

use crate::ooxml::docx::paragraph::{Paragraph, ParagraphMut, paragraph_text, set_paragraph_text};
use crate::ooxml::docx::tree::{Element, Node};

/// Border edges written into `w:tcBorders`.
const CELL_BORDER_EDGES: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];

/// Read-only view of a `w:tbl` element.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    el: &'a Element,
}

impl<'a> Table<'a> {
    pub(crate) fn new(el: &'a Element) -> Self {
        Self { el }
    }

    pub fn row_count(&self) -> usize {
        self.el.elements().filter(|e| e.is("tr")).count()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'a>> + 'a {
        self.el
            .elements()
            .filter(|e| e.is("tr"))
            .flat_map(|tr| tr.elements().filter(|e| e.is("tc")))
            .map(|tc| Cell { el: tc })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell<'a>> {
        self.el
            .elements()
            .filter(|e| e.is("tr"))
            .nth(row)
            .and_then(|tr| tr.elements().filter(|e| e.is("tc")).nth(col))
            .map(|tc| Cell { el: tc })
    }
}

/// Read-only view of a `w:tc` element.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    el: &'a Element,
}

impl<'a> Cell<'a> {
    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        cell_text(self.el)
    }

    /// Whether every edge of the cell is explicitly set to no border.
    pub fn is_borderless(&self) -> bool {
        let Some(borders) = self.el.child("tcPr").and_then(|pr| pr.child("tcBorders")) else {
            return false;
        };
        CELL_BORDER_EDGES.iter().all(|edge| {
            borders
                .child(edge)
                .and_then(|b| b.attr("val"))
                .is_some_and(|val| val == "nil" || val == "none")
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.el.elements().filter(|e| e.is("p")).count()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = Paragraph<'a>> + 'a {
        self.el
            .elements()
            .filter(|e| e.is("p"))
            .map(Paragraph::new)
    }
}

/// Mutable view of a `w:tbl` element.
#[derive(Debug)]
pub struct TableMut<'a> {
    el: &'a mut Element,
}

impl<'a> TableMut<'a> {
    pub(crate) fn new(el: &'a mut Element) -> Self {
        Self { el }
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = CellMut<'_>> + '_ {
        self.el
            .elements_mut()
            .filter(|e| e.is("tr"))
            .flat_map(|tr| tr.elements_mut().filter(|e| e.is("tc")))
            .map(|tc| CellMut { el: tc })
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<CellMut<'_>> {
        self.el
            .elements_mut()
            .filter(|e| e.is("tr"))
            .nth(row)
            .and_then(|tr| tr.elements_mut().filter(|e| e.is("tc")).nth(col))
            .map(|tc| CellMut { el: tc })
    }

    /// Set every edge of every cell to `nil`, replacing existing cell borders.
    pub fn remove_borders(&mut self) {
        for mut cell in self.cells_mut() {
            cell.set_borders_nil();
        }
    }
}

/// Mutable view of a `w:tc` element.
#[derive(Debug)]
pub struct CellMut<'a> {
    el: &'a mut Element,
}

impl<'a> CellMut<'a> {
    pub fn text(&self) -> String {
        cell_text(self.el)
    }

    /// Replace the cell content with a single paragraph holding `text`.
    ///
    /// Cell properties, the first paragraph's properties and its first run's
    /// character properties survive.
    pub fn set_text(&mut self, text: &str) {
        let mut paragraph = self
            .el
            .elements()
            .find(|e| e.is("p"))
            .cloned()
            .unwrap_or_else(|| Element::new("w:p"));
        set_paragraph_text(&mut paragraph, text);

        self.el
            .children
            .retain(|node| matches!(node, Node::Element(e) if e.is("tcPr")));
        self.el.children.push(Node::Element(paragraph));
    }

    pub fn first_paragraph_mut(&mut self) -> Option<ParagraphMut<'_>> {
        self.el
            .elements_mut()
            .find(|e| e.is("p"))
            .map(ParagraphMut::new)
    }

    fn set_borders_nil(&mut self) {
        let mut borders = Element::new("w:tcBorders");
        for edge in CELL_BORDER_EDGES {
            borders = borders.with_child(Element::new(format!("w:{}", edge)).with_attr("w:val", "nil"));
        }

        if self.el.child("tcPr").is_none() {
            self.el.children.insert(0, Node::Element(Element::new("w:tcPr")));
        }
        if let Some(tc_pr) = self.el.child_mut("tcPr") {
            tc_pr
                .children
                .retain(|node| !matches!(node, Node::Element(e) if e.is("tcBorders")));
            tc_pr.children.push(Node::Element(borders));
        }
    }
}

fn cell_text(tc: &Element) -> String {
    tc.elements()
        .filter(|e| e.is("p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A new `rows` x `cols` table with evenly split fixed column widths (twips).
///
/// Every cell holds one empty paragraph.
pub fn new_table(rows: usize, cols: usize, col_width_twips: i64) -> Element {
    let width = col_width_twips.to_string();

    let tbl_pr = Element::new("w:tblPr")
        .with_child(
            Element::new("w:tblW")
                .with_attr("w:type", "auto")
                .with_attr("w:w", "0"),
        )
        .with_child(
            Element::new("w:tblLook")
                .with_attr("w:val", "04A0")
                .with_attr("w:firstRow", "1")
                .with_attr("w:lastRow", "0")
                .with_attr("w:firstColumn", "1")
                .with_attr("w:lastColumn", "0")
                .with_attr("w:noHBand", "0")
                .with_attr("w:noVBand", "1"),
        );

    let mut grid = Element::new("w:tblGrid");
    for _ in 0..cols {
        grid = grid.with_child(Element::new("w:gridCol").with_attr("w:w", &width));
    }

    let mut table = Element::new("w:tbl").with_child(tbl_pr).with_child(grid);
    for _ in 0..rows {
        let mut tr = Element::new("w:tr");
        for _ in 0..cols {
            let tc = Element::new("w:tc")
                .with_child(
                    Element::new("w:tcPr").with_child(
                        Element::new("w:tcW")
                            .with_attr("w:type", "dxa")
                            .with_attr("w:w", &width),
                    ),
                )
                .with_child(Element::new("w:p"));
            tr = tr.with_child(tc);
        }
        table = table.with_child(tr);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_table_shape() {
        let el = new_table(1, 2, 4680);
        let table = Table::new(&el);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cells().count(), 2);
        assert!(table.cell(0, 1).is_some());
        assert!(table.cell(0, 2).is_none());
        assert_eq!(
            el.child("tblGrid").unwrap().elements().map(|c| c.attr("w")).collect::<Vec<_>>(),
            vec![Some("4680".to_string()), Some("4680".to_string())]
        );
    }

    #[test]
    fn test_remove_borders() {
        let mut el = new_table(1, 2, 4680);
        assert!(!Table::new(&el).cell(0, 0).unwrap().is_borderless());

        TableMut::new(&mut el).remove_borders();
        TableMut::new(&mut el).remove_borders();

        let table = Table::new(&el);
        assert!(table.cells().all(|cell| cell.is_borderless()));
        let tc_pr = el
            .child("tr")
            .and_then(|tr| tr.child("tc"))
            .and_then(|tc| tc.child("tcPr"))
            .unwrap();
        assert_eq!(tc_pr.elements().filter(|e| e.is("tcBorders")).count(), 1);
    }

    #[test]
    fn test_cell_text_round_trip() {
        let mut el = Element::parse_fragment(
            r#"<w:tbl><w:tr><w:tc><w:tcPr><w:tcW w:w="100" w:type="dxa"/></w:tcPr><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t>Total: {{SUM}}</w:t></w:r></w:p><w:p><w:r><w:t>second</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        )
        .unwrap();

        let mut table = TableMut::new(&mut el);
        let mut cell = table.cell_mut(0, 0).unwrap();
        assert_eq!(cell.text(), "Total: {{SUM}}\nsecond");

        let replaced = cell.text().replace("{{SUM}}", "42");
        cell.set_text(&replaced);
        assert_eq!(cell.text(), "Total: 42\nsecond");

        let cell = Table::new(&el).cell(0, 0).unwrap();
        assert_eq!(cell.paragraph_count(), 1);
        let tc = el.child("tr").and_then(|tr| tr.child("tc")).unwrap();
        assert!(tc.child("tcPr").is_some());
        assert!(tc.child("p").and_then(|p| p.child("pPr")).is_some());
    }
}
