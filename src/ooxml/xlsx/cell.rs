//! Cell values and cell references for Excel worksheets.

use crate::ooxml::error::{OoxmlError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::fmt;

/// Last row number of a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Last column number of a worksheet (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The value stored in one worksheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Boolean value
    Bool(bool),
    /// Integral numeric value
    Int(i64),
    /// Non-integral numeric value
    Float(f64),
    /// String value (shared, inline or formula result)
    String(String),
    /// Error value such as `#N/A`
    Error(String),
    /// Date-formatted number
    Date(NaiveDateTime),
    /// Date-formatted number below one day
    Time(NaiveTime),
}

impl CellValue {
    /// Whether the cell holds nothing, or only an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The cell as row text, `None` for empty cells.
    ///
    /// Integers render without decimals, floats in their shortest
    /// round-trip form and booleans as `TRUE`/`FALSE`. Dates render as
    /// `2024-01-01 00:00:00` and times as `13:30:00`, with microseconds
    /// appended only when present.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }

    /// Numeric value of `Int` and `Float` cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret the raw `<v>` content of a cell without a type attribute.
    pub(crate) fn from_number(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(int) = atoi_simd::parse::<i64>(raw.as_bytes()) {
            return CellValue::Int(int);
        }
        match raw.parse::<f64>() {
            Ok(float) => CellValue::Float(float),
            Err(_) => CellValue::String(raw.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(s) | CellValue::Error(s) => f.write_str(s),
            CellValue::Date(dt) if dt.nanosecond() == 0 => {
                write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
            },
            CellValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f")),
            CellValue::Time(t) if t.nanosecond() == 0 => write!(f, "{}", t.format("%H:%M:%S")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.6f")),
        }
    }
}

/// Epoch of a workbook's date serial numbers.
///
/// In the 1900 system serial 1 is 1900-01-01 and Excel counts a
/// nonexistent 1900-02-29 (serial 60), so serials below 60 are shifted by
/// one day. The 1904 system counts from 1904-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    #[default]
    V1900,
    V1904,
}

impl DateSystem {
    fn epoch(self) -> Option<NaiveDateTime> {
        let date = match self {
            DateSystem::V1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
            DateSystem::V1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        };
        date?.and_hms_opt(0, 0, 0)
    }

    /// Convert a serial number into a `Date` or `Time` cell value.
    ///
    /// The time of day is rounded to the millisecond. Serials in `[0, 1)`
    /// are times; negative or out-of-range serials give `None`.
    pub fn to_cell_value(self, serial: f64) -> Option<CellValue> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }

        let days = serial.trunc();
        let millis = ((serial - days) * MILLIS_PER_DAY).round() as i64;

        if days == 0.0 && (millis as f64) < MILLIS_PER_DAY {
            let time = NaiveTime::from_num_seconds_from_midnight_opt(
                (millis / 1000) as u32,
                (millis % 1000) as u32 * 1_000_000,
            )?;
            return Some(CellValue::Time(time));
        }

        let mut days = days as i64;
        if self == DateSystem::V1900 && serial < 60.0 {
            days += 1;
        }
        let date = self
            .epoch()?
            .checked_add_signed(TimeDelta::try_days(days)?)?
            .checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
        Some(CellValue::Date(date))
    }
}

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// Convert an Excel reference (e.g. `"B3"`) to 1-based `(column, row)`.
pub fn reference_to_coords(reference: &str) -> Result<(u32, u32)> {
    let bytes = reference.as_bytes();
    let split = bytes
        .iter()
        .position(|b| b.is_ascii_digit())
        .filter(|&pos| pos > 0)
        .ok_or_else(|| OoxmlError::InvalidFormat(format!("invalid cell reference: {}", reference)))?;

    let mut col = 0u32;
    for &byte in &bytes[..split] {
        if !byte.is_ascii_alphabetic() {
            return Err(OoxmlError::InvalidFormat(format!(
                "invalid column in reference: {}",
                reference
            )));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add((byte.to_ascii_uppercase() - b'A' + 1) as u32))
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("column out of range: {}", reference)))?;
    }

    if col > MAX_COLUMNS {
        return Err(OoxmlError::InvalidFormat(format!("column out of range: {}", reference)));
    }

    let row = atoi_simd::parse::<u32>(&bytes[split..])
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("invalid row number in reference: {}", reference))
        })?;

    Ok((col, row))
}
