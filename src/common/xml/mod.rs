//! XML text helpers shared by the XML-based formats.

mod escape;

pub use escape::{escape_xml, resolve_entity};
