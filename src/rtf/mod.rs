//! RTF (Rich Text Format) import and export.
//!
//! The importer is a streaming interpreter. Text is read once, front to
//! back; every `{` saves the formatting of the active destination and every
//! `}` restores it. Control words either change that formatting, produce
//! text, or open a new destination (font table, color table, stylesheet,
//! field, picture, footnote) that collects its own content until its group
//! closes. The result is an attributed [`TextBuffer`]: plain text plus named
//! [`TextTag`] spans and embedded pictures.
//!
//! # Architecture
//!
//! - **Lexer**: a forward cursor yielding control words, symbols, hex escapes and text
//! - **Parser**: the destination stack, with one state stack per destination
//! - **Destinations**: one control-word table per destination kind
//! - **Model**: the [`TextModel`] sink and its in-memory [`TextBuffer`]
//! - **Writer**: serializes a buffer back to RTF
//!
//! # Example
//!
//! ```rust,no_run
//! use cartouche::rtf::{RtfDocument, export_rtf};
//!
//! let rtf_text = r#"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard Hello World!\par}"#;
//! let doc = RtfDocument::parse(rtf_text)?;
//! assert_eq!(doc.text(), "Hello World!\n");
//! let again = export_rtf(doc.buffer());
//! # Ok::<(), cartouche::rtf::RtfError>(())
//! ```

mod attributes;
mod charset;
mod context;
mod control;
mod dest;
mod destination;
mod document;
mod error;
mod field;
mod langcode;
mod lexer;
mod model;
mod parser;
mod picture;
mod stylesheet;
mod tags;
mod types;
mod writer;

// Re-exports
pub use attributes::Attributes;
pub use document::{RtfDocument, RtfImporter};
pub use error::{Diagnostic, DiagnosticKind, RtfError, RtfErrorKind, RtfResult};
pub use field::{Field, FieldType, NumberFormat, Switch};
pub use langcode::language_code;
pub use lexer::{Lexer, Skipped, Token};
pub use model::{OBJECT_REPLACEMENT, Run, TextBuffer, TextModel};
pub use picture::{
    BuiltinCodec, ImageCodec, ImageError, ImageLoader, ImageType, Picture, detect_image_type,
    pixels_to_twips, twips_to_pixels,
};
pub use stylesheet::{StyleRecord, StyleTable};
pub use tags::{TAG_PREFIX, TagStyle, TextTag, UnknownTag};
pub use types::{
    Alignment, Color, ColorRef, ColorTable, Direction, Font, FontFamily, FontRef, FontTable,
    StyleKind, UnderlineStyle,
};
pub use writer::{RtfWriter, WriterOptions, export_rtf};
