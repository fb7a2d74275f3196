//! Common types and utilities shared by the OOXML layer and the fill engine.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use unit::{Length, LengthUnit};
