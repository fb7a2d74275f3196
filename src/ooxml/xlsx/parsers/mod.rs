//! XML parsing modules for Excel files.
//!
//! This module contains specialized parsers for the XML parts of an Excel
//! workbook (.xlsx) that the reader needs. Small parts are scanned with
//! `memchr` for the few start tags involved; worksheets go through
//! `quick-xml` events.

pub mod styles_parser;
pub mod workbook_parser;
pub mod worksheet_parser;

/// The section of `content` from `open` up to (not including) `close`.
///
/// A missing close tag extends the section to the end of `content`.
pub(crate) fn section<'a>(content: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let bytes = content.as_bytes();
    let start = memchr::memmem::find(bytes, open.as_bytes())?;
    let end = memchr::memmem::find(&bytes[start..], close.as_bytes())
        .map(|end| start + end)
        .unwrap_or(bytes.len());
    Some(&content[start..end])
}

/// Every start tag named `name` (prefix-free) inside `section`.
///
/// `<sheet` does not match `<sheets>`: the name must be followed by
/// whitespace, `/` or `>`.
pub(crate) fn start_tags<'a>(section: &'a str, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let bytes = section.as_bytes();
    let finder = memchr::memmem::Finder::new(name.as_bytes());
    let mut pos = 0;

    std::iter::from_fn(move || {
        while let Some(found) = finder.find(&bytes[pos..]) {
            let at = pos + found;
            let after = at + name.len();
            pos = after;
            let opens_tag = at > 0 && bytes[at - 1] == b'<';
            let ends_name = bytes
                .get(after)
                .is_some_and(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>');
            if opens_tag && ends_name {
                let tag = element_tag(&section[at - 1..]);
                pos = at - 1 + tag.len();
                return Some(tag);
            }
        }
        None
    })
}

/// The start tag beginning at `s`, up to and including its closing `>`.
fn element_tag(s: &str) -> &str {
    match memchr::memchr(b'>', s.as_bytes()) {
        Some(end) => &s[..=end],
        None => s,
    }
}

/// Raw (still escaped) value of attribute `name` inside a start tag.
pub(crate) fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let bytes = tag.as_bytes();
    let mut pos = 0;
    while let Some(found) = memchr::memmem::find(&bytes[pos..], name.as_bytes()) {
        let at = pos + found;
        let after = at + name.len();
        let preceded_by_space = at > 0 && bytes[at - 1].is_ascii_whitespace();
        if preceded_by_space && bytes.get(after) == Some(&b'=') {
            let quote = *bytes.get(after + 1)?;
            if quote == b'"' || quote == b'\'' {
                let value_start = after + 2;
                let len = memchr::memchr(quote, &bytes[value_start..])?;
                return Some(&tag[value_start..value_start + len]);
            }
        }
        pos = after;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tags_skip_longer_names() {
        let xml = r#"<sheets><sheet name="a"/><sheetView/><sheet name='b'></sheet></sheets>"#;
        let names: Vec<&str> = start_tags(xml, "sheet")
            .filter_map(|tag| attr_value(tag, "name"))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_attr_value_needs_whole_name() {
        let tag = r#"<xf xfId="3" numFmtId="14">"#;
        assert_eq!(attr_value(tag, "numFmtId"), Some("14"));
        assert_eq!(attr_value(tag, "Id"), None);
        assert_eq!(section("<a><b/></a>", "<b", "</b>"), Some("<b/></a>"));
    }
}
