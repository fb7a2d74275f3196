//! Parser for Excel worksheet XML files.
//!
//! Produces dense rows: row `r` (1-based) lands at index `r - 1` and holds
//! one value per column up to its last present cell. Cells or rows that
//! carry no `r` attribute follow their predecessor. Row and column numbers
//! beyond the worksheet limits are rejected.
//!
//! Numbers whose cell style has a date format become `Date` or `Time`
//! values.

use crate::common::xml::unescape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::{CellValue, DateSystem, MAX_COLUMNS, MAX_ROWS, reference_to_coords};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::ooxml::xlsx::styles::CellFormats;
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Workbook-level data needed to interpret cell values.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub strings: &'a SharedStrings,
    pub formats: &'a CellFormats,
    pub dates: DateSystem,
}

/// Cell under construction while its children are read.
#[derive(Debug, Default)]
struct PendingCell {
    column: u32,
    cell_type: Option<String>,
    style: Option<usize>,
    value: Option<String>,
    inline: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

/// Parse worksheet XML into dense rows of cell values.
pub fn parse_worksheet_xml(xml: &[u8], context: CellContext<'_>) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut row_num = 0u32;
    let mut last_col = 0u32;
    let mut cell: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_num = row_number(&e, row_num)?;
                    last_col = 0;
                    ensure_row(&mut rows, row_num);
                },
                b"c" => {
                    let pending = start_cell(&e, last_col)?;
                    last_col = pending.column;
                    cell = Some(pending);
                },
                b"v" if cell.is_some() => target = TextTarget::Value,
                b"rPh" => phonetic_depth += 1,
                b"t" if cell.is_some() && phonetic_depth == 0 => target = TextTarget::Inline,
                _ => {},
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_num = row_number(&e, row_num)?;
                    last_col = 0;
                    ensure_row(&mut rows, row_num);
                },
                b"c" => {
                    let pending = start_cell(&e, last_col)?;
                    last_col = pending.column;
                    store_cell(&mut rows, row_num, pending, context)?;
                },
                _ => {},
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(pending) = cell.take() {
                        store_cell(&mut rows, row_num, pending, context)?;
                    }
                    target = TextTarget::None;
                },
                b"v" | b"t" => target = TextTarget::None,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                _ => {},
            },
            Event::Text(e) if target != TextTarget::None => {
                push_raw(&mut cell, target, std::str::from_utf8(&e)?);
            },
            Event::GeneralRef(e) if target != TextTarget::None => {
                let entity = format!("&{};", std::str::from_utf8(&e)?);
                push_raw(&mut cell, target, &entity);
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(rows)
}

fn row_number(e: &BytesStart<'_>, previous: u32) -> Result<u32> {
    let row = match attribute(e, b"r")? {
        Some(r) => atoi_simd::parse::<u32>(r.as_bytes())
            .map_err(|_| OoxmlError::InvalidFormat(format!("invalid row number: {}", r)))?,
        None => previous + 1,
    };
    if row == 0 || row > MAX_ROWS {
        return Err(OoxmlError::InvalidFormat(format!("row number out of range: {}", row)));
    }
    Ok(row)
}

fn start_cell(e: &BytesStart<'_>, last_col: u32) -> Result<PendingCell> {
    let column = match attribute(e, b"r")? {
        Some(reference) => reference_to_coords(&reference)?.0,
        None if last_col < MAX_COLUMNS => last_col + 1,
        None => {
            return Err(OoxmlError::InvalidFormat(format!(
                "column out of range: {}",
                last_col + 1
            )));
        },
    };
    let style = match attribute(e, b"s")? {
        Some(s) => Some(atoi_simd::parse::<usize>(s.as_bytes()).map_err(|_| {
            OoxmlError::InvalidFormat(format!("invalid style index: {}", s))
        })?),
        None => None,
    };
    Ok(PendingCell {
        column,
        cell_type: attribute(e, b"t")?,
        style,
        ..PendingCell::default()
    })
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(unescape_xml(std::str::from_utf8(&attr.value)?)));
        }
    }
    Ok(None)
}

fn ensure_row(rows: &mut Vec<Vec<CellValue>>, row_num: u32) {
    let needed = row_num as usize;
    if rows.len() < needed {
        rows.resize_with(needed, Vec::new);
    }
}

fn push_raw(cell: &mut Option<PendingCell>, target: TextTarget, raw: &str) {
    let Some(cell) = cell.as_mut() else {
        return;
    };
    let slot = match target {
        TextTarget::Value => &mut cell.value,
        TextTarget::Inline => &mut cell.inline,
        TextTarget::None => return,
    };
    slot.get_or_insert_with(String::new).push_str(raw);
}

fn store_cell(
    rows: &mut Vec<Vec<CellValue>>,
    row_num: u32,
    cell: PendingCell,
    context: CellContext<'_>,
) -> Result<()> {
    if row_num == 0 {
        return Err(OoxmlError::InvalidFormat("cell outside of a row".to_string()));
    }

    let is_date = cell
        .style
        .is_some_and(|style| context.formats.is_date_style(style));
    let value = resolve(cell.cell_type.as_deref(), cell.value, cell.inline, context.strings)?;
    let value = match value.as_f64() {
        Some(serial) if is_date => context.dates.to_cell_value(serial).unwrap_or(value),
        _ => value,
    };
    if value == CellValue::Empty {
        return Ok(());
    }

    ensure_row(rows, row_num);
    let row = &mut rows[row_num as usize - 1];
    let index = cell.column as usize - 1;
    if row.len() <= index {
        row.resize(index + 1, CellValue::Empty);
    }
    row[index] = value;
    Ok(())
}

fn resolve(
    cell_type: Option<&str>,
    value: Option<String>,
    inline: Option<String>,
    strings: &SharedStrings,
) -> Result<CellValue> {
    let value = value.map(|raw| unescape_xml(&raw));

    let resolved = match (cell_type, value) {
        (Some("inlineStr"), _) => match inline {
            Some(raw) => CellValue::String(unescape_xml(&raw)),
            None => CellValue::Empty,
        },
        (_, None) => CellValue::Empty,
        (Some("s"), Some(v)) => {
            let index = atoi_simd::parse::<usize>(v.trim().as_bytes()).map_err(|_| {
                OoxmlError::InvalidFormat(format!("invalid shared string index: {}", v))
            })?;
            let s = strings.get(index).ok_or_else(|| {
                OoxmlError::InvalidFormat(format!("shared string {} out of range", index))
            })?;
            CellValue::String(s.to_string())
        },
        (Some("str"), Some(v)) => CellValue::String(v),
        (Some("b"), Some(v)) => CellValue::Bool(v.trim() == "1" || v.trim() == "true"),
        (Some("e"), Some(v)) => CellValue::Error(v),
        (Some("d"), Some(v)) => parse_iso_date(v.trim()).unwrap_or(CellValue::String(v)),
        (_, Some(v)) if v.trim().is_empty() => CellValue::Empty,
        (_, Some(v)) => CellValue::from_number(&v),
    };
    Ok(resolved)
}

/// Value of an ISO 8601 date cell (`t="d"`).
fn parse_iso_date(value: &str) -> Option<CellValue> {
    let value = value.trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(CellValue::Date(dt));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(CellValue::Date)
}
