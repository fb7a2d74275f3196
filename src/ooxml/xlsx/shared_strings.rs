//! Shared strings table for Excel files.
//!
//! Cells of type `s` hold an index into this table. Rich-text entries are
//! flattened into the concatenation of their runs; phonetic hints
//! (`rPh`) are not part of the cell text and are skipped.

use crate::common::xml::unescape_xml;
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Shared strings table.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the content of `xl/sharedStrings.xml`.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();

        let mut strings = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => current = Some(String::new()),
                    b"rPh" => phonetic_depth += 1,
                    b"t" if phonetic_depth == 0 => in_text = true,
                    _ => {},
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(String::new());
                    }
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        let raw = current.take().unwrap_or_default();
                        strings.push(unescape_xml(&raw));
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {},
                },
                Event::Text(e) if in_text => {
                    if let Some(s) = current.as_mut() {
                        s.push_str(std::str::from_utf8(&e)?);
                    }
                },
                Event::GeneralRef(e) if in_text => {
                    if let Some(s) = current.as_mut() {
                        s.push('&');
                        s.push_str(std::str::from_utf8(&e)?);
                        s.push(';');
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by its index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
