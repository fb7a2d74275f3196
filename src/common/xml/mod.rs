//! XML helpers shared by the package and document layers.

pub mod escape;

pub use escape::{escape_xml, unescape_xml};
