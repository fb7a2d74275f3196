//! Lossless XML element tree for document parts.
//!
//! Parts are rewritten in place, so the tree keeps everything it does not
//! understand: attribute values and text are stored exactly as they appear in
//! the source (still escaped), and comments, processing instructions, CDATA
//! and the XML declaration are kept as raw markup.
//!
//! Element names are stored qualified (`w:p`); lookups go by local name so a
//! document that binds WordprocessingML to another prefix still matches.

use crate::common::xml::{escape_xml, unescape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped as in the source.
    Text(String),
    /// Markup kept verbatim (comments, PIs, CDATA, declarations).
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    /// (qualified name, escaped value)
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Strip the namespace prefix from a qualified name.
#[inline]
pub fn local_name(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter; `value` is unescaped text.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    #[inline]
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by local name, unescaped.
    pub fn attr(&self, local: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(name, _)| local_name(name) == local && !name.starts_with("xmlns"))
            .map(|(_, value)| unescape_xml(value))
    }

    /// Attribute value by exact qualified name, unescaped.
    pub fn attr_qualified(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| unescape_xml(value))
    }

    /// Set an attribute by qualified name; `value` is unescaped text.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = escape_xml(value);
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = escaped,
            None => self.attrs.push((name.to_string(), escaped)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Visit this element and every descendant element, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.elements() {
            child.walk(visit);
        }
    }

    /// Concatenated, unescaped character data of the direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(raw) = node {
                out.push_str(&unescape_xml(raw));
            }
        }
        out
    }

    pub fn push_text(&mut self, text: &str) {
        self.children.push(Node::Text(escape_xml(text)));
    }

    /// Parse a standalone fragment such as a run built from a template string.
    pub fn parse_fragment(xml: &str) -> Result<Element> {
        let nodes = parse_nodes(xml.as_bytes())?;
        nodes
            .into_iter()
            .find_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .ok_or_else(|| OoxmlError::Xml("Fragment has no element".to_string()))
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    pub fn write_to(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_to(out),
            Node::Text(raw) | Node::Raw(raw) => out.push_str(raw),
        }
    }
}

/// A parsed XML part: top-level nodes, exactly one of which is the root element.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
}

impl XmlTree {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let nodes = parse_nodes(xml)?;
        if !nodes.iter().any(|n| matches!(n, Node::Element(_))) {
            return Err(OoxmlError::Xml("Document has no root element".to_string()));
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> &Element {
        self.nodes
            .iter()
            .find_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("XmlTree always holds a root element"))
    }

    pub fn root_mut(&mut self) -> &mut Element {
        self.nodes
            .iter_mut()
            .find_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("XmlTree always holds a root element"))
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

fn parse_nodes(xml: &[u8]) -> Result<Vec<Node>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut top: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| OoxmlError::Xml(format!("at byte {}: {}", reader.error_position(), e)))?;
        let end = reader.buffer_position() as usize;
        let raw = std::str::from_utf8(&xml[start..end])?;

        let node = match event {
            Event::Start(ref e) => {
                stack.push(start_element(e)?);
                continue;
            },
            Event::End(_) => match stack.pop() {
                Some(element) => Node::Element(element),
                None => return Err(OoxmlError::Xml("Unbalanced end tag".to_string())),
            },
            Event::Empty(ref e) => Node::Element(start_element(e)?),
            Event::Text(_) | Event::GeneralRef(_) => {
                let siblings = match stack.last_mut() {
                    Some(parent) => &mut parent.children,
                    None => &mut top,
                };
                match siblings.last_mut() {
                    Some(Node::Text(text)) => text.push_str(raw),
                    _ => siblings.push(Node::Text(raw.to_string())),
                }
                continue;
            },
            Event::Eof => break,
            _ => Node::Raw(raw.to_string()),
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => top.push(node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(OoxmlError::Xml(format!("Unclosed element <{}>", open.name)));
    }

    Ok(top)
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(std::str::from_utf8(e.name().as_ref())?);
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        // Values are written back in double quotes; a single-quoted source
        // value may hold a bare `"`.
        let value = std::str::from_utf8(&attr.value)?.replace('"', "&quot;");
        element
            .attrs
            .push((std::str::from_utf8(attr.key.as_ref())?.to_string(), value));
    }
    Ok(element)
}
