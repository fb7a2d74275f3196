//! Worksheet content loaded into memory.

use crate::ooxml::xlsx::cell::CellValue;

/// A worksheet's cells as dense rows.
///
/// Row `n` (1-based, as in Excel) is `rows()[n - 1]`. A row holds one value
/// per column up to its last non-empty cell.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Worksheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows up to the last row present in the sheet.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Row by 1-based number.
    pub fn row(&self, row: u32) -> Option<&[CellValue]> {
        (row as usize)
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
    }

    /// Cell by 1-based row and column; cells outside the data are empty.
    pub fn cell(&self, row: u32, column: u32) -> &CellValue {
        self.row(row)
            .and_then(|cells| (column as usize).checked_sub(1).and_then(|c| cells.get(c)))
            .unwrap_or(&EMPTY)
    }
}
