//! Number formats of cell styles.
//!
//! Only what is needed to tell a date from a plain number: each `cellXfs`
//! entry's number format id, and the custom format codes of `numFmts`.

use std::collections::HashMap;

/// Number format ids of the workbook's cell styles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormats {
    /// `numFmtId` of each `cellXfs/xf`, indexed by a cell's `s` attribute
    xf_formats: Vec<u32>,
    /// Custom format codes by id
    custom: HashMap<u32, String>,
}

impl CellFormats {
    pub fn new(xf_formats: Vec<u32>, custom: HashMap<u32, String>) -> Self {
        Self { xf_formats, custom }
    }

    /// Format code of cell style `style`.
    ///
    /// Custom codes take precedence over built-in ones with the same id.
    pub fn format_code(&self, style: usize) -> Option<&str> {
        let id = *self.xf_formats.get(style)?;
        self.custom
            .get(&id)
            .map(String::as_str)
            .or_else(|| builtin_format_code(id))
    }

    /// Whether numbers in cell style `style` display as dates or times.
    pub fn is_date_style(&self, style: usize) -> bool {
        self.format_code(style).is_some_and(is_date_format)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xf_formats.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xf_formats.is_empty()
    }
}

/// Check if a format code displays a date or time of day.
///
/// Only the first section (up to `;`) counts. Quoted and escaped text is
/// ignored, and elapsed-time codes such as `[h]:mm` are durations, not
/// dates.
pub fn is_date_format(code: &str) -> bool {
    let mut escaped = false;
    let mut quoted = false;
    let mut brackets = 0u8;
    let mut prev = ' ';
    let mut elapsed = false;
    let mut am_pm = false;

    for c in code.chars() {
        if escaped {
            escaped = false;
        } else if c == '_' || c == '\\' {
            escaped = true;
        } else if quoted {
            quoted = c != '"';
        } else {
            match c {
                '"' => quoted = true,
                ';' => return false,
                '[' => brackets += 1,
                ']' if brackets == 1 && elapsed => return false,
                ']' => brackets = brackets.saturating_sub(1),
                _ if brackets > 0 => {
                    if !(elapsed && c.eq_ignore_ascii_case(&prev)) {
                        elapsed = prev == '[' && matches!(c.to_ascii_lowercase(), 'h' | 'm' | 's');
                    }
                },
                'a' | 'A' if !am_pm => am_pm = true,
                'p' | 'P' | 'm' | 'M' | '/' if am_pm => return true,
                'd' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S' if !am_pm => return true,
                _ => {},
            }
        }
        prev = c;
    }
    false
}

/// Format code of a built-in number format id, `None` for ids without one.
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}
