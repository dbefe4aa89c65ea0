//! Common types and utilities shared across formats.
//!
//! Format detection works for every supported format; codepage handling is
//! only needed by RTF and XML helpers only by the property-list codec.

pub mod detection;
#[cfg(feature = "rtf")]
pub mod encoding;
#[cfg(feature = "plist")]
pub mod xml;

// Re-exports for convenience
pub use detection::{FileFormat, detect_file_format, detect_file_format_from_bytes};
