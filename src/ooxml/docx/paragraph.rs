//! Paragraph text access and rewriting.
//!
//! Paragraph text is what a reader sees: the `w:t` content of its runs
//! (including runs inside hyperlinks), with tabs and line breaks mapped to
//! `\t` and `\n`. Setting the text collapses the paragraph into a single run.

use crate::ooxml::docx::tree::{Element, Node};

/// Read-only view of a `w:p` element.
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    el: &'a Element,
}

impl<'a> Paragraph<'a> {
    pub(crate) fn new(el: &'a Element) -> Self {
        Self { el }
    }

    pub fn text(&self) -> String {
        paragraph_text(self.el)
    }

    /// Number of picture runs (`w:drawing`) in the paragraph.
    pub fn picture_count(&self) -> usize {
        runs(self.el).filter(|run| run.child("drawing").is_some()).count()
    }

    #[inline]
    pub fn element(&self) -> &'a Element {
        self.el
    }
}

/// Mutable view of a `w:p` element.
#[derive(Debug)]
pub struct ParagraphMut<'a> {
    el: &'a mut Element,
}

impl<'a> ParagraphMut<'a> {
    pub(crate) fn new(el: &'a mut Element) -> Self {
        Self { el }
    }

    pub fn text(&self) -> String {
        paragraph_text(self.el)
    }

    /// Replace the paragraph content with `text`.
    ///
    /// Paragraph properties and the first run's character properties are
    /// kept; all other runs and inline content are dropped.
    pub fn set_text(&mut self, text: &str) {
        set_paragraph_text(self.el, text);
    }

    /// Remove all content except the paragraph properties.
    pub fn clear(&mut self) {
        clear_paragraph(self.el);
    }

    /// Append a run (or any other inline element) at the end of the paragraph.
    pub fn append(&mut self, inline: Element) {
        self.el.children.push(Node::Element(inline));
    }

    /// Zero the space before and after the paragraph.
    pub fn set_spacing_zero(&mut self) {
        let ppr = ensure_ppr(self.el);
        if ppr.child("spacing").is_none() {
            ppr.children.push(Node::Element(Element::new("w:spacing")));
        }
        if let Some(spacing) = ppr.child_mut("spacing") {
            spacing.set_attr("w:before", "0");
            spacing.set_attr("w:after", "0");
        }
    }
}

/// Runs of a paragraph in reading order, looking inside hyperlinks.
fn runs<'a>(p: &'a Element) -> impl Iterator<Item = &'a Element> + 'a {
    p.elements().flat_map(|child| {
        let nested: Box<dyn Iterator<Item = &'a Element> + 'a> = if child.is("r") {
            Box::new(std::iter::once(child))
        } else if child.is("hyperlink") {
            Box::new(child.elements().filter(|e| e.is("r")))
        } else {
            Box::new(std::iter::empty())
        };
        nested
    })
}

pub(crate) fn run_text(run: &Element, out: &mut String) {
    for child in run.elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "tab" | "ptab" => out.push('\t'),
            "cr" => out.push('\n'),
            "br" => match child.attr("type").as_deref() {
                None | Some("textWrapping") => out.push('\n'),
                _ => {},
            },
            "noBreakHyphen" => out.push('-'),
            _ => {},
        }
    }
}

pub(crate) fn paragraph_text(p: &Element) -> String {
    let mut text = String::new();
    for run in runs(p) {
        run_text(run, &mut text);
    }
    text
}

pub(crate) fn clear_paragraph(p: &mut Element) {
    p.children
        .retain(|node| matches!(node, Node::Element(e) if e.is("pPr")));
}

pub(crate) fn set_paragraph_text(p: &mut Element, text: &str) {
    let rpr = runs(p)
        .next()
        .and_then(|run| run.child("rPr"))
        .cloned();

    clear_paragraph(p);

    let mut run = Element::new("w:r");
    if let Some(rpr) = rpr {
        run = run.with_child(rpr);
    }
    append_run_text(&mut run, text);
    p.children.push(Node::Element(run));
}

/// Append `text` to a run as `w:t` segments, `w:tab` and `w:br` elements.
fn append_run_text(run: &mut Element, text: &str) {
    let mut segment = String::new();
    for c in text.chars() {
        match c {
            '\t' => {
                flush_segment(&mut segment, run);
                run.children.push(Node::Element(Element::new("w:tab")));
            },
            '\n' | '\r' => {
                flush_segment(&mut segment, run);
                run.children.push(Node::Element(Element::new("w:br")));
            },
            _ => segment.push(c),
        }
    }
    flush_segment(&mut segment, run);
}

fn flush_segment(segment: &mut String, run: &mut Element) {
    if !segment.is_empty() {
        let mut t = Element::new("w:t").with_attr("xml:space", "preserve");
        t.push_text(segment);
        run.children.push(Node::Element(t));
        segment.clear();
    }
}

fn ensure_ppr(p: &mut Element) -> &mut Element {
    let index = match p
        .children
        .iter()
        .position(|node| matches!(node, Node::Element(e) if e.is("pPr")))
    {
        Some(index) => index,
        None => {
            p.children.insert(0, Node::Element(Element::new("w:pPr")));
            0
        },
    };

    match &mut p.children[index] {
        Node::Element(ppr) => ppr,
        _ => unreachable!("index points at the pPr element"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(xml: &str) -> Element {
        Element::parse_fragment(xml).unwrap()
    }

    fn to_xml(el: &Element) -> String {
        let mut out = String::new();
        el.write_to(&mut out);
        out
    }

    #[test]
    fn test_text_spans_runs_and_hyperlinks() {
        let p = paragraph(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Name: {{NA</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>ME}}</w:t><w:tab/></w:r><w:hyperlink r:id="rId4"><w:r><w:t>link</w:t><w:br/><w:br w:type="page"/></w:r></w:hyperlink></w:p>"#,
        );
        assert_eq!(Paragraph::new(&p).text(), "Name: {{NAME}}\tlink\n");
    }

    #[test]
    fn test_set_text_keeps_properties() {
        let mut p = paragraph(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t>old</w:t></w:r><w:r><w:t>er</w:t></w:r></w:p>"#,
        );
        ParagraphMut::new(&mut p).set_text("a\tb\nc & d");

        assert_eq!(
            to_xml(&p),
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/><w:t xml:space="preserve">c &amp; d</w:t></w:r></w:p>"#
        );
        assert_eq!(paragraph_text(&p), "a\tb\nc & d");
    }

    #[test]
    fn test_clear_and_spacing() {
        let mut p = paragraph(r#"<w:p><w:r><w:t>{{IMAGE_1}}</w:t></w:r></w:p>"#);
        let mut view = ParagraphMut::new(&mut p);
        view.clear();
        assert_eq!(view.text(), "");

        view.set_spacing_zero();
        view.set_spacing_zero();
        assert_eq!(
            to_xml(&p),
            r#"<w:p><w:pPr><w:spacing w:before="0" w:after="0"/></w:pPr></w:p>"#
        );
    }
}
