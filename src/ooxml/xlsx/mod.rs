//! Excel (.xlsx) spreadsheet reading.
//!
//! Only what a data source needs: the sheet list, the active sheet and its
//! cell values. Of the styles only number formats are read, to tell dates
//! from plain numbers. Formulas and charts are not interpreted; a formula
//! cell yields its cached result.
//!
//! # Example
//!
//! ```rust,no_run
//! use docfill::ooxml::xlsx::Workbook;
//!
//! let workbook = Workbook::open("data.xlsx")?;
//! let sheet = workbook.active_worksheet()?;
//! println!("{} has {} rows", sheet.name(), sheet.row_count());
//! # Ok::<(), docfill::ooxml::OoxmlError>(())
//! ```

pub mod cell;
pub mod parsers;
pub mod shared_strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

pub use cell::{
    CellValue, DateSystem, MAX_COLUMNS, MAX_ROWS, column_to_letters, reference_to_coords,
};
pub use shared_strings::SharedStrings;
pub use styles::CellFormats;
pub use workbook::{Workbook, WorksheetInfo};
pub use worksheet::Worksheet;
