//! Cartouche - Rich Text Format and Apple property-list codecs
//!
//! This library reads and writes two document formats found side by side in
//! macOS applications: RTF (and `.rtfd` packages) and XML property lists.
//!
//! # Features
//!
//! - **RTF import**: a streaming interpreter producing attributed text
//!   (plain text, named formatting tags, embedded pictures)
//! - **RTF export**: serialize attributed text back to RTF
//! - **Plist**: parse, write and query Apple XML property lists
//! - **Format detection**: recognize RTF, RTFD packages and plists
//!
//! # Example - Reading an RTF document
//!
//! ```no_run
//! use cartouche::rtf::{RtfDocument, TextTag};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = RtfDocument::open("notes.rtfd")?;
//! println!("Document text: {}", doc.text());
//!
//! for run in doc.runs() {
//!     if run.has_tag(&TextTag::Bold) {
//!         println!("Bold: {:?}", run.text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a property list
//!
//! ```no_run
//! use cartouche::plist::Plist;
//! use cartouche::plist_lookup;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plist = Plist::from_file("Info.plist")?;
//! if let Some(name) = plist_lookup!(plist, "CFBundleName").and_then(Plist::as_string) {
//!     println!("Bundle: {name}");
//! }
//! # Ok(())
//! # }
//! ```

/// Shared utilities: format detection, codepages and XML text helpers
pub mod common;

/// RTF import and export
///
/// The importer interprets RTF into a [`rtf::TextBuffer`]; the writer turns
/// a buffer back into RTF.
#[cfg(feature = "rtf")]
pub mod rtf;

/// Apple XML property lists
#[cfg(feature = "plist")]
pub mod plist;

// Re-export commonly used types for convenience
pub use common::{FileFormat, detect_file_format, detect_file_format_from_bytes};
#[cfg(feature = "plist")]
pub use plist::{PathSegment, Plist, PlistError, PlistResult};
#[cfg(feature = "rtf")]
pub use rtf::{RtfDocument, RtfError, RtfImporter, RtfResult, TextBuffer, export_rtf};
