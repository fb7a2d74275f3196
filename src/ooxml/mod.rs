//! Office Open XML (OOXML) format implementation.
//!
//! Just enough of the Office Open XML formats to fill Word templates from
//! Excel data:
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships)
//! 2. **Error types** (`error`): Format-level errors shared by the readers
//! 3. **Format-Specific Modules**:
//!    - `docx`: Word documents, read and rewritten
//!    - `xlsx`: Excel workbooks, read only
//!
//! # Example: Working with Word Documents
//!
//! ```rust,no_run
//! use docfill::ooxml::docx::Package;
//!
//! let pkg = Package::open("document.docx")?;
//! let doc = pkg.document();
//! println!("Document contains {} paragraphs", doc.paragraph_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;
pub mod xlsx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
