//! Error types for property-list reading and writing.

use thiserror::Error;

/// Result type for plist operations.
pub type PlistResult<T> = Result<T, PlistError>;

/// Errors raised while reading or writing a property list.
#[derive(Debug, Error)]
pub enum PlistError {
    /// The XML itself is malformed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Reading or writing the underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Well-formed XML that does not describe a property list
    #[error("invalid plist structure: {0}")]
    InvalidStructure(String),
    /// A leaf element whose text cannot be converted
    #[error("invalid <{element}> value {value:?}")]
    InvalidValue {
        element: &'static str,
        value: String,
    },
    /// An element name that has no meaning in a property list
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),
}

impl PlistError {
    pub(crate) fn invalid_value(element: &'static str, value: impl Into<String>) -> Self {
        PlistError::InvalidValue {
            element,
            value: value.into(),
        }
    }
}
