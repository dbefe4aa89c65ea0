//! Concrete destinations.
//!
//! Each module implements one [`DestinationKind`](super::destination::DestinationKind)
//! with its own control-word table. The document destination sits at the
//! bottom of the stack and opens all the others.

pub mod colortbl;
pub mod document;
pub mod field;
pub mod fonttbl;
pub mod footnote;
pub mod ignore;
pub mod picture;
pub mod stylesheet;

pub use document::DocumentDest;
pub use ignore::IgnoreDest;
