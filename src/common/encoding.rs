//! Character encoding utilities for legacy codepage-based text.
//!
//! RTF documents carry 8-bit text as `\'HH` escapes whose meaning depends on
//! the codepage in effect (document default, `\ansicpg`, or the charset of
//! the current font). This module maps Windows codepage identifiers and RTF
//! font charsets onto `encoding_rs` encodings, and provides the small hex
//! helpers shared by the picture reader and the RTF writer.

use encoding_rs::Encoding;

/// Codepage used when a document declares nothing (`\ansi`).
pub const DEFAULT_CODEPAGE: u32 = 1252;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// This function provides a mapping from Windows codepage identifiers to
/// the corresponding `encoding_rs` encodings. It supports the codepages that
/// RTF producers emit in `\ansicpg` and imply through `\fcharset`.
///
/// # Arguments
/// * `codepage` - Windows codepage number (e.g., 936 for Simplified Chinese, 1252 for Western European)
///
/// # Returns
/// Returns `Some(&'static Encoding)` if the codepage is supported, `None` otherwise.
///
/// # Examples
/// ```
/// use cartouche::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// assert!(codepage_to_encoding(42).is_none());
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages (437 and 850 have no encoding_rs counterpart, see `Charset::Oem`)
        866 => Some(encoding_rs::IBM866),

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),   // Thai
        1250 => Some(encoding_rs::WINDOWS_1250), // Central European
        1251 => Some(encoding_rs::WINDOWS_1251), // Cyrillic
        1252 => Some(encoding_rs::WINDOWS_1252), // Western European (most common, default ANSI)
        1253 => Some(encoding_rs::WINDOWS_1253), // Greek
        1254 => Some(encoding_rs::WINDOWS_1254), // Turkish
        1255 => Some(encoding_rs::WINDOWS_1255), // Hebrew
        1256 => Some(encoding_rs::WINDOWS_1256), // Arabic
        1257 => Some(encoding_rs::WINDOWS_1257), // Baltic
        1258 => Some(encoding_rs::WINDOWS_1258), // Vietnamese

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS), // Japanese Shift-JIS
        936 => Some(encoding_rs::GBK),       // Simplified Chinese (GB2312/GBK)
        949 => Some(encoding_rs::EUC_KR),    // Korean
        950 => Some(encoding_rs::BIG5),      // Traditional Chinese (Big5)
        20932 => Some(encoding_rs::EUC_JP),  // Japanese EUC-JP
        20936 => Some(encoding_rs::GBK),     // GB2312
        54936 => Some(encoding_rs::GB18030), // Chinese GB18030 (superset of GBK)

        // ISO 8859 series (Latin and others)
        28591 => Some(encoding_rs::WINDOWS_1252), // ISO-8859-1 approximation
        28592 => Some(encoding_rs::ISO_8859_2),   // Latin 2 (Central European)
        28593 => Some(encoding_rs::ISO_8859_3),   // Latin 3 (South European)
        28594 => Some(encoding_rs::ISO_8859_4),   // Latin 4 (North European)
        28595 => Some(encoding_rs::ISO_8859_5),   // Cyrillic
        28596 => Some(encoding_rs::ISO_8859_6),   // Arabic
        28597 => Some(encoding_rs::ISO_8859_7),   // Greek
        28598 => Some(encoding_rs::ISO_8859_8),   // Hebrew
        28603 => Some(encoding_rs::ISO_8859_13),  // Baltic
        28605 => Some(encoding_rs::ISO_8859_15),  // Latin 9 (Western European with Euro)

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R), // KOI8-R (Russian)
        21866 => Some(encoding_rs::KOI8_U), // KOI8-U (Ukrainian)

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH), // Macintosh Roman
        10001 => Some(encoding_rs::SHIFT_JIS), // Mac Japanese
        10007 => Some(encoding_rs::X_MAC_CYRILLIC),

        // Unicode
        65001 => Some(encoding_rs::UTF_8),

        // Unsupported codepage
        _ => None,
    }
}

/// A byte-to-text conversion for one codepage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Charset {
    /// Decoded by `encoding_rs`
    Encoding(&'static Encoding),
    /// DOS OEM codepage: ASCII in the lower half, a fixed table above
    Oem {
        name: &'static str,
        high: &'static [char; 128],
    },
}

impl Charset {
    /// Name of the codepage, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Encoding(encoding) => encoding.name(),
            Charset::Oem { name, .. } => name,
        }
    }
}

/// Resolve a Windows codepage to its byte-to-text conversion.
///
/// # Examples
/// ```
/// use cartouche::common::encoding::{Charset, codepage_to_charset};
///
/// assert_eq!(codepage_to_charset(437).map(|c| c.name()), Some("IBM437"));
/// assert_eq!(
///     codepage_to_charset(1252),
///     Some(Charset::Encoding(encoding_rs::WINDOWS_1252))
/// );
/// ```
pub fn codepage_to_charset(codepage: u32) -> Option<Charset> {
    match codepage {
        437 => Some(Charset::Oem {
            name: "IBM437",
            high: &CP437_HIGH,
        }),
        850 => Some(Charset::Oem {
            name: "IBM850",
            high: &CP850_HIGH,
        }),
        _ => codepage_to_encoding(codepage).map(Charset::Encoding),
    }
}

/// Upper half (0x80-0xFF) of IBM PC codepage 437.
static CP437_HIGH: [char; 128] = [
    '\u{00C7}', '\u{00FC}', '\u{00E9}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E5}', '\u{00E7}',
    '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00EF}', '\u{00EE}', '\u{00EC}', '\u{00C4}', '\u{00C5}',
    '\u{00C9}', '\u{00E6}', '\u{00C6}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00FB}', '\u{00F9}',
    '\u{00FF}', '\u{00D6}', '\u{00DC}', '\u{00A2}', '\u{00A3}', '\u{00A5}', '\u{20A7}', '\u{0192}',
    '\u{00E1}', '\u{00ED}', '\u{00F3}', '\u{00FA}', '\u{00F1}', '\u{00D1}', '\u{00AA}', '\u{00BA}',
    '\u{00BF}', '\u{2310}', '\u{00AC}', '\u{00BD}', '\u{00BC}', '\u{00A1}', '\u{00AB}', '\u{00BB}',
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{255C}', '\u{255B}', '\u{2510}',
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{255E}', '\u{255F}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{2567}',
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256B}',
    '\u{256A}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{258C}', '\u{2590}', '\u{2580}',
    '\u{03B1}', '\u{00DF}', '\u{0393}', '\u{03C0}', '\u{03A3}', '\u{03C3}', '\u{00B5}', '\u{03C4}',
    '\u{03A6}', '\u{0398}', '\u{03A9}', '\u{03B4}', '\u{221E}', '\u{03C6}', '\u{03B5}', '\u{2229}',
    '\u{2261}', '\u{00B1}', '\u{2265}', '\u{2264}', '\u{2320}', '\u{2321}', '\u{00F7}', '\u{2248}',
    '\u{00B0}', '\u{2219}', '\u{00B7}', '\u{221A}', '\u{207F}', '\u{00B2}', '\u{25A0}', '\u{00A0}',
];

/// Upper half (0x80-0xFF) of DOS Latin-1 codepage 850.
static CP850_HIGH: [char; 128] = [
    '\u{00C7}', '\u{00FC}', '\u{00E9}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E5}', '\u{00E7}',
    '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00EF}', '\u{00EE}', '\u{00EC}', '\u{00C4}', '\u{00C5}',
    '\u{00C9}', '\u{00E6}', '\u{00C6}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00FB}', '\u{00F9}',
    '\u{00FF}', '\u{00D6}', '\u{00DC}', '\u{00F8}', '\u{00A3}', '\u{00D8}', '\u{00D7}', '\u{0192}',
    '\u{00E1}', '\u{00ED}', '\u{00F3}', '\u{00FA}', '\u{00F1}', '\u{00D1}', '\u{00AA}', '\u{00BA}',
    '\u{00BF}', '\u{00AE}', '\u{00AC}', '\u{00BD}', '\u{00BC}', '\u{00A1}', '\u{00AB}', '\u{00BB}',
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{00C1}', '\u{00C2}', '\u{00C0}',
    '\u{00A9}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{00A2}', '\u{00A5}', '\u{2510}',
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{00E3}', '\u{00C3}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{00A4}',
    '\u{00F0}', '\u{00D0}', '\u{00CA}', '\u{00CB}', '\u{00C8}', '\u{0131}', '\u{00CD}', '\u{00CE}',
    '\u{00CF}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{00A6}', '\u{00CC}', '\u{2580}',
    '\u{00D3}', '\u{00DF}', '\u{00D4}', '\u{00D2}', '\u{00F5}', '\u{00D5}', '\u{00B5}', '\u{00FE}',
    '\u{00DE}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{00FD}', '\u{00DD}', '\u{00AF}', '\u{00B4}',
    '\u{00AD}', '\u{00B1}', '\u{2017}', '\u{00BE}', '\u{00B6}', '\u{00A7}', '\u{00F7}', '\u{00B8}',
    '\u{00B0}', '\u{00A8}', '\u{00B7}', '\u{00B9}', '\u{00B3}', '\u{00B2}', '\u{25A0}', '\u{00A0}',
];

/// Map an RTF font charset (`\fcharsetN`) to a Windows codepage.
///
/// Returns `None` for charsets that have no byte encoding of their own
/// (`1` = default, `2` = symbol) so the caller falls back to the document
/// codepage.
#[inline]
pub fn charset_to_codepage(charset: i32) -> Option<u32> {
    let codepage = match charset {
        0 => 1252,   // ANSI
        77 => 10000, // Mac Roman
        78 => 10001, // Mac Shift-JIS
        128 => 932,  // Shift-JIS
        129 => 949,  // Hangul
        130 => 1361, // Johab
        134 => 936,  // GB2312
        136 => 950,  // Big5
        161 => 1253, // Greek
        162 => 1254, // Turkish
        163 => 1258, // Vietnamese
        177 => 1255, // Hebrew
        178 => 1256, // Arabic
        186 => 1257, // Baltic
        204 => 1251, // Russian
        222 => 874,  // Thai
        238 => 1250, // Eastern European
        254 => 437,  // PC 437
        255 => 850,  // OEM
        _ => return None,
    };
    Some(codepage)
}

/// Convert a hex digit to its nibble value (0-15).
#[inline(always)]
pub fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Append the lowercase hex representation of `bytes` to `out`.
#[inline]
pub fn encode_hex_into(bytes: &[u8], out: &mut String) {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    out.reserve(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
}
