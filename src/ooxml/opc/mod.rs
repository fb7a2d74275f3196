//! Open Packaging Conventions (OPC) implementation.
//!
//! The subset of OPC needed to read an Office package, rewrite some of its
//! parts and write it back:
//!
//! - Part names and relative references ([`PackURI`])
//! - Relationships (`.rels` parts)
//! - Content type discovery (`[Content_Types].xml`)
//! - ZIP-based physical packaging

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

pub use content_types::ContentTypeMap;
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
