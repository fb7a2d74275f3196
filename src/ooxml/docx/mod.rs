//! Word (.docx) document support.
//!
//! This module reads a Word package, exposes its body for rewriting and
//! writes it back.
//!
//! # Architecture
//!
//! The module is organized around these key types:
//! - `Package`: The overall .docx file package, owner of media and relationships
//! - `Document`: The main document body as a lossless element tree
//! - `Paragraph` / `ParagraphMut`: Views over a `w:p` element
//! - `Table` / `TableMut`, `Cell` / `CellMut`: Views over tables and their cells
//! - `Picture`: Image bytes ready to be embedded inline
//!
//! # Example
//!
//! ```rust,no_run
//! use docfill::ooxml::docx::Package;
//!
//! let mut package = Package::open("template.docx")?;
//! let doc = package.document_mut();
//!
//! for mut para in doc.paragraphs_mut() {
//!     let text = para.text();
//!     if text.contains("{{DATE}}") {
//!         para.set_text(&text.replace("{{DATE}}", "2024-01-01"));
//!     }
//! }
//! for mut table in doc.tables_mut() {
//!     for cell in table.cells_mut() {
//!         println!("Cell: {}", cell.text());
//!     }
//! }
//! package.save("filled.docx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod document;
pub mod format;
pub mod image;
pub mod package;
pub mod paragraph;
pub mod table;
pub mod tree;

pub use document::{BlockRef, Document};
pub use format::ImageFormat;
pub use image::Picture;
pub use package::Package;
pub use paragraph::{Paragraph, ParagraphMut};
pub use table::{Cell, CellMut, Table, TableMut, new_table};
pub use tree::Element;
