//! Apple XML property lists.
//!
//! A property list is a tree of dictionaries, arrays and typed leaves stored
//! as XML under a `<plist version="1.0">` root. [`Plist`] is that tree; it can
//! be read from a string, reader or file and written back in the layout
//! Apple's tools use, so reading and writing a file leaves it unchanged.
//!
//! # Example
//!
//! ```rust
//! use cartouche::plist::Plist;
//! use cartouche::plist_lookup;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <plist version="1.0">
//! <dict>
//!     <key>CFBundleDocumentTypes</key>
//!     <array>
//!         <dict>
//!             <key>CFBundleTypeName</key>
//!             <string>Rich Text</string>
//!         </dict>
//!     </array>
//! </dict>
//! </plist>"#;
//!
//! let plist = Plist::from_str(xml)?;
//! let name = plist_lookup!(plist, "CFBundleDocumentTypes", 0, "CFBundleTypeName");
//! assert_eq!(name.and_then(Plist::as_string), Some("Rich Text"));
//! # Ok::<(), cartouche::plist::PlistError>(())
//! ```

mod error;
mod parser;
mod value;
mod writer;

pub use error::{PlistError, PlistResult};
pub use value::{PathSegment, Plist};

use parser::PlistReader;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Look up a node by a sequence of dictionary keys and array indices.
///
/// Expands to [`Plist::lookup`] and yields `Option<&Plist>`.
///
/// ```rust
/// use cartouche::plist::Plist;
/// use cartouche::plist_lookup;
///
/// let plist = Plist::Array(vec![Plist::from("zero"), Plist::from("one")]);
/// assert_eq!(plist_lookup!(plist, 1), Some(&Plist::from("one")));
/// assert_eq!(plist_lookup!(plist, "key"), None);
/// ```
#[macro_export]
macro_rules! plist_lookup {
    ($node:expr $(, $segment:expr)* $(,)?) => {
        $node.lookup(&[$($crate::plist::PathSegment::from($segment)),*])
    };
}

impl Plist {
    /// Parse a property list held in memory.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &str) -> PlistResult<Self> {
        PlistReader::new(Reader::from_str(xml)).read_document()
    }

    /// Parse a property list from any reader.
    pub fn from_reader<R: Read>(reader: R) -> PlistResult<Self> {
        PlistReader::new(Reader::from_reader(BufReader::new(reader))).read_document()
    }

    /// Parse a property-list file.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cartouche::plist::Plist;
    ///
    /// let info = Plist::from_file("Info.plist")?;
    /// # Ok::<(), cartouche::plist::PlistError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlistResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading property list");
        Self::from_reader(File::open(path)?)
    }

    /// Serialize to XML text.
    pub fn to_xml_string(&self) -> String {
        writer::write_document(self)
    }

    /// Serialize into a writer.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> PlistResult<()> {
        writer.write_all(self.to_xml_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize to a file, replacing any previous content.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> PlistResult<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "writing property list");
        self.to_writer(BufWriter::new(File::create(path)?))
    }
}

impl FromStr for Plist {
    type Err = PlistError;

    fn from_str(xml: &str) -> PlistResult<Self> {
        Plist::from_str(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_round_trip_text_is_stable() {
        let mut dict = BTreeMap::new();
        dict.insert("Zeta".to_string(), Plist::Real(2.5));
        dict.insert("Alpha".to_string(), Plist::from("  spaced\tout  "));
        dict.insert("Blob".to_string(), Plist::Data(vec![0, 1, 2, 254, 255]));
        dict.insert("Empty".to_string(), Plist::Array(Vec::new()));
        let plist = Plist::Dictionary(dict);

        let xml = plist.to_xml_string();
        let again = Plist::from_str(&xml).unwrap();
        assert_eq!(again, plist);
        assert_eq!(again.to_xml_string(), xml);
    }

    #[test]
    fn test_parse_via_from_str_trait() {
        let plist: Plist = "<plist version=\"1.0\"><true/></plist>".parse().unwrap();
        assert_eq!(plist, Plist::Boolean(true));
    }

    #[test]
    fn test_from_reader() {
        let xml = b"<plist version=\"1.0\"><integer>0x10</integer></plist>";
        assert_eq!(Plist::from_reader(&xml[..]).unwrap(), Plist::Integer(16));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Info.plist");
        let plist = Plist::Array(vec![Plist::from("a"), Plist::from(-3)]);
        plist.to_file(&path).unwrap();
        assert_eq!(Plist::from_file(&path).unwrap(), plist);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Plist::from_file(dir.path().join("absent.plist")),
            Err(PlistError::Io(_))
        ));
    }
}
