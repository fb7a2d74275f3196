//! Parser for Excel workbook.xml files.
//!
//! Extracts the sheet list (in workbook order), the active tab and the
//! date system. `memchr` scans for the few tags involved instead of
//! building a tree.

use crate::common::xml::unescape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::DateSystem;
use crate::ooxml::xlsx::parsers::{attr_value, section, start_tags};
use crate::ooxml::xlsx::workbook::WorksheetInfo;

const INITIAL_SHEETS_CAPACITY: usize = 16;

/// Parse workbook.xml content into its sheets and the active sheet index.
///
/// The index is clamped to the sheet list; it is 0 when `bookViews` does
/// not name an active tab.
pub fn parse_workbook_xml(content: &str) -> Result<(Vec<WorksheetInfo>, usize)> {
    let mut sheets = Vec::with_capacity(INITIAL_SHEETS_CAPACITY);

    if let Some(section) = section(content, "<sheets", "</sheets>") {
        for tag in start_tags(section, "sheet") {
            sheets.push(parse_sheet_tag(tag)?);
        }
    }

    let active_tab = start_tags(content, "workbookView")
        .next()
        .and_then(|tag| attr_value(tag, "activeTab"))
        .and_then(|value| atoi_simd::parse::<usize>(value.as_bytes()).ok())
        .unwrap_or(0);

    let active_tab = active_tab.min(sheets.len().saturating_sub(1));
    Ok((sheets, active_tab))
}

/// The date system declared by `<workbookPr date1904="..."/>`.
pub fn parse_date_system(content: &str) -> DateSystem {
    let date1904 = start_tags(content, "workbookPr")
        .next()
        .and_then(|tag| attr_value(tag, "date1904"));
    match date1904 {
        Some("1" | "true") => DateSystem::V1904,
        _ => DateSystem::V1900,
    }
}

/// Parse one `<sheet .../>` tag.
pub fn parse_sheet_tag(tag: &str) -> Result<WorksheetInfo> {
    let missing = |attr: &str| OoxmlError::InvalidFormat(format!("sheet without {}: {}", attr, tag));

    let name = attr_value(tag, "name").ok_or_else(|| missing("name"))?;
    let relationship_id = attr_value(tag, "r:id").ok_or_else(|| missing("r:id"))?;
    let sheet_id = attr_value(tag, "sheetId")
        .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
        .ok_or_else(|| missing("sheetId"))?;

    Ok(WorksheetInfo {
        name: unescape_xml(name),
        relationship_id: relationship_id.to_string(),
        sheet_id,
    })
}
