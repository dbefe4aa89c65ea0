//! File format detection.
//!
//! RTF has a simple text-based signature (`{\rtf` at the start of the file).
//! XML property lists are recognized by a `<plist` root or a plist DOCTYPE
//! within the first kilobyte. RTFD packages are directories named `*.rtfd`
//! that contain a `TXT.rtf` entry.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// RTF files start with `{\rtf` followed optionally by a version number.
const RTF_SIGNATURE: &[u8] = b"{\\rtf";

/// How far into a file to look for the plist root element.
const PLIST_PROBE_LEN: usize = 1024;

/// Name of the RTF body inside an RTFD package.
pub const RTFD_TEXT_ENTRY: &str = "TXT.rtf";

/// Supported file formats that can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Rich Text Format Document (.rtf)
    Rtf,
    /// Rich Text Format package directory (.rtfd)
    Rtfd,
    /// Apple XML property list (.plist)
    Plist,
}

impl FileFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Rtf => "rtf",
            FileFormat::Rtfd => "rtfd",
            FileFormat::Plist => "plist",
        }
    }
}

/// Detect file format from a path.
///
/// Directories are only recognized as RTFD packages. Regular files are
/// opened and only the leading bytes are inspected.
///
/// # Examples
///
/// ```rust,no_run
/// use cartouche::common::detection::detect_file_format;
///
/// if let Some(format) = detect_file_format("notes.rtfd") {
///     println!("Detected format: {:?}", format);
/// }
/// ```
pub fn detect_file_format<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let path = path.as_ref();
    if path.is_dir() {
        return detect_rtfd_package(path);
    }

    let file = File::open(path).ok()?;
    let mut head = Vec::with_capacity(PLIST_PROBE_LEN);
    file.take(PLIST_PROBE_LEN as u64).read_to_end(&mut head).ok()?;
    detect_file_format_from_bytes(&head)
}

/// Detect file format from a byte slice.
///
/// # Examples
///
/// ```
/// use cartouche::common::detection::{FileFormat, detect_file_format_from_bytes};
///
/// assert_eq!(detect_file_format_from_bytes(b"{\\rtf1\\ansi Hello}"), Some(FileFormat::Rtf));
/// assert_eq!(detect_file_format_from_bytes(b"Plain text file"), None);
/// ```
pub fn detect_file_format_from_bytes(bytes: &[u8]) -> Option<FileFormat> {
    if bytes.starts_with(RTF_SIGNATURE) {
        return Some(FileFormat::Rtf);
    }
    if is_xml_plist(bytes) {
        return Some(FileFormat::Plist);
    }
    None
}

/// Recognize an RTFD package directory.
#[inline]
fn detect_rtfd_package(path: &Path) -> Option<FileFormat> {
    let named_rtfd = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("rtfd"));
    (named_rtfd && path.join(RTFD_TEXT_ENTRY).is_file()).then_some(FileFormat::Rtfd)
}

fn is_xml_plist(bytes: &[u8]) -> bool {
    let probe = &bytes[..bytes.len().min(PLIST_PROBE_LEN)];
    let probe = probe.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(probe);
    let start = probe
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(probe.len());
    let probe = &probe[start..];
    if !probe.starts_with(b"<") {
        return false;
    }
    probe.windows(6).any(|w| w == b"<plist") || probe.windows(15).any(|w| w == b"<!DOCTYPE plist")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_plist_bytes() {
        let xml = b"\xEF\xBB\xBF  <?xml version=\"1.0\"?>\n<plist version=\"1.0\"><dict/></plist>";
        assert_eq!(detect_file_format_from_bytes(xml), Some(FileFormat::Plist));
        assert_eq!(detect_file_format_from_bytes(b"<html></html>"), None);
    }

    #[test]
    fn test_detect_rtfd_directory() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("Note.rtfd");
        std::fs::create_dir(&package).unwrap();
        assert_eq!(detect_file_format(&package), None);

        std::fs::write(package.join(RTFD_TEXT_ENTRY), "{\\rtf1 x}").unwrap();
        assert_eq!(detect_file_format(&package), Some(FileFormat::Rtfd));
        assert_eq!(detect_file_format(package.join(RTFD_TEXT_ENTRY)), Some(FileFormat::Rtf));
    }
}
