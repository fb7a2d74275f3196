//! Parser for Excel styles.xml files.
//!
//! Reads the custom number formats (`numFmts`) and the number format id of
//! every cell style (`cellXfs`). Fonts, fills and borders are skipped.

use std::collections::HashMap;

use crate::common::xml::unescape_xml;
use crate::ooxml::xlsx::parsers::{attr_value, section, start_tags};
use crate::ooxml::xlsx::styles::CellFormats;

/// Parse styles.xml content into the number formats of its cell styles.
///
/// An `xf` without `numFmtId` uses format 0 (General); a `numFmt` missing
/// its id or code is ignored.
pub fn parse_styles_xml(content: &str) -> CellFormats {
    let mut custom = HashMap::new();
    if let Some(num_fmts) = section(content, "<numFmts", "</numFmts>") {
        for tag in start_tags(num_fmts, "numFmt") {
            let id = attr_value(tag, "numFmtId").and_then(parse_id);
            let code = attr_value(tag, "formatCode");
            if let (Some(id), Some(code)) = (id, code) {
                custom.insert(id, unescape_xml(code));
            }
        }
    }

    let mut xf_formats = Vec::new();
    if let Some(cell_xfs) = section(content, "<cellXfs", "</cellXfs>") {
        for tag in start_tags(cell_xfs, "xf") {
            xf_formats.push(attr_value(tag, "numFmtId").and_then(parse_id).unwrap_or(0));
        }
    }

    CellFormats::new(xf_formats, custom)
}

fn parse_id(value: &str) -> Option<u32> {
    atoi_simd::parse::<u32>(value.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy&quot;年&quot;m&quot;月&quot;d&quot;日&quot;"/><numFmt numFmtId="165" formatCode="&quot;USD&quot; #,##0.00"/></numFmts><fonts count="1"><font><sz val="11"/></font></fonts><cellStyleXfs count="1"><xf numFmtId="14" fontId="0"/></cellStyleXfs><cellXfs count="5"><xf numFmtId="0" fontId="0" xfId="0"/><xf numFmtId="14" fontId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="164" fontId="0" xfId="0" applyNumberFormat="1"><alignment horizontal="left"/></xf><xf numFmtId="165" fontId="0" xfId="0"/><xf fontId="0"/></cellXfs></styleSheet>"#;

    #[test]
    fn test_parse_cell_formats() {
        let formats = parse_styles_xml(STYLES);
        assert_eq!(formats.len(), 5);
        assert_eq!(formats.format_code(2), Some("yyyy\"年\"m\"月\"d\"日\""));

        let dates: Vec<bool> = (0..5).map(|s| formats.is_date_style(s)).collect();
        assert_eq!(dates, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_missing_sections() {
        let formats = parse_styles_xml("<styleSheet/>");
        assert!(formats.is_empty());
        assert!(!formats.is_date_style(0));
    }
}
