//! Error types for RTF parsing.
//!
//! Fatal conditions abort the parse and surface as [`RtfError`]. Recoverable
//! conditions are logged through `tracing` and collected as [`Diagnostic`]
//! values on the imported document.

use std::fmt;
use thiserror::Error;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// Fatal RTF parsing errors.
#[derive(Debug, Error)]
pub enum RtfError {
    /// Input does not start with `{\rtf`
    #[error("input is not an RTF document")]
    NotRtf,
    /// Brace depth never returned to zero
    #[error("file ended unexpectedly")]
    UnexpectedEnd,
    /// Non-whitespace content after the final closing brace
    #[error("unexpected content after the end of the document at byte {0}")]
    TrailingContent(usize),
    /// `\` at end of input or followed by a character that starts nothing
    #[error("backslash encountered without control word")]
    BackslashWithoutWord,
    /// A control word that requires a numeric parameter had none
    #[error("control word \\{0} requires a parameter")]
    MissingParameter(String),
    /// `\'` not followed by two hexadecimal digits
    #[error("\\' escape must be followed by two hexadecimal digits")]
    BadHexEscape,
    /// `\rtf` declared a version other than 1
    #[error("unsupported RTF version {0}")]
    BadVersion(i32),
    /// Formatting referenced a color index that was never declared
    #[error("color {0} is not defined in the color table")]
    UndefinedColor(i32),
    /// No transcoder exists for the resolved codepage or any fallback
    #[error("no converter available for codepage {0}")]
    UnsupportedCharset(u32),
    /// Invalid argument to a picture-type control word
    #[error("invalid picture type: {0}")]
    BadPictureType(String),
    /// Negative font size
    #[error("invalid font size {0}")]
    BadFontSize(i32),
    /// Reading the input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable classification of an [`RtfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtfErrorKind {
    /// The input is structurally not an RTF document
    Malformed,
    MissingParameter,
    BadHexEscape,
    BadVersion,
    UndefinedColor,
    UnsupportedCharset,
    BadPictureType,
    BadFontSize,
    Io,
}

impl RtfError {
    /// Classify the error.
    pub fn kind(&self) -> RtfErrorKind {
        match self {
            RtfError::NotRtf
            | RtfError::UnexpectedEnd
            | RtfError::TrailingContent(_)
            | RtfError::BackslashWithoutWord => RtfErrorKind::Malformed,
            RtfError::MissingParameter(_) => RtfErrorKind::MissingParameter,
            RtfError::BadHexEscape => RtfErrorKind::BadHexEscape,
            RtfError::BadVersion(_) => RtfErrorKind::BadVersion,
            RtfError::UndefinedColor(_) => RtfErrorKind::UndefinedColor,
            RtfError::UnsupportedCharset(_) => RtfErrorKind::UnsupportedCharset,
            RtfError::BadPictureType(_) => RtfErrorKind::BadPictureType,
            RtfError::BadFontSize(_) => RtfErrorKind::BadFontSize,
            RtfError::Io(_) => RtfErrorKind::Io,
        }
    }
}

/// Category of a recoverable problem met while importing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UndefinedFont,
    UndefinedStyle,
    InvalidCharacter,
    ImageDecode,
    IncludePicture,
}

/// A recoverable problem recorded during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
