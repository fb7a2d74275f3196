//! Unified error types for docfill.
//!
//! This module provides a unified error type that encompasses errors from the
//! package, document, spreadsheet and configuration layers, presenting a
//! consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
