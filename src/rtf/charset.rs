//! Streaming transcoding of `\'HH` escapes.
//!
//! Multi-byte codepages (Shift-JIS, GBK, Big5, ...) spread one character over
//! several consecutive hex escapes, so bytes are fed one at a time into a
//! persistent `encoding_rs` decoder that buffers incomplete sequences. The
//! decoder is finalized when something other than a hex escape arrives.
//! DOS OEM codepages are single-byte and map through a fixed table.

use super::error::{RtfError, RtfResult};
use crate::common::encoding::{Charset, codepage_to_charset};
use encoding_rs::{Decoder, DecoderResult, Encoding};

/// Pick the conversion for the first candidate codepage that has one.
///
/// Candidates are given in priority order; absent candidates are skipped.
/// Fails only when no candidate resolves, reporting the highest-priority
/// codepage that was asked for.
pub fn resolve_charset<I>(candidates: I) -> RtfResult<Charset>
where
    I: IntoIterator<Item = Option<u32>>,
{
    let mut first = None;
    for codepage in candidates.into_iter().flatten() {
        first.get_or_insert(codepage);
        if let Some(charset) = codepage_to_charset(codepage) {
            return Ok(charset);
        }
    }
    Err(RtfError::UnsupportedCharset(first.unwrap_or(0)))
}

/// Incremental byte-to-text converter.
#[derive(Default)]
pub struct Transcoder {
    decoder: Option<Decoder>,
}

impl Transcoder {
    /// Create an idle transcoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether bytes have been fed since the last [`Transcoder::finish`].
    #[inline]
    pub fn is_active(&self) -> bool {
        self.decoder.is_some()
    }

    /// Encoding of the sequence in progress.
    #[inline]
    pub fn encoding(&self) -> Option<&'static Encoding> {
        self.decoder.as_ref().map(Decoder::encoding)
    }

    /// Feed one raw byte decoded with `charset`, appending any completed
    /// characters to `out`.
    ///
    /// Switching encodings finalizes the sequence in progress first.
    /// Returns the number of malformed sequences that were dropped.
    pub fn push(&mut self, charset: Charset, byte: u8, out: &mut String) -> usize {
        let encoding = match charset {
            Charset::Encoding(encoding) => encoding,
            Charset::Oem { high, .. } => {
                let dropped = self.finish(out);
                out.push(match byte {
                    0x00..=0x7f => char::from(byte),
                    _ => high[usize::from(byte - 0x80)],
                });
                return dropped;
            },
        };
        let mut dropped = 0;
        if self
            .decoder
            .as_ref()
            .is_some_and(|decoder| decoder.encoding() != encoding)
        {
            dropped += self.finish(out);
        }
        let decoder = self
            .decoder
            .get_or_insert_with(|| encoding.new_decoder_without_bom_handling());
        dropped + decode(decoder, &[byte], false, out)
    }

    /// Flush any incomplete sequence. Returns the number of malformed
    /// sequences that were dropped.
    pub fn finish(&mut self, out: &mut String) -> usize {
        match self.decoder.take() {
            Some(mut decoder) => decode(&mut decoder, &[], true, out),
            None => 0,
        }
    }
}

/// Run the decoder over `src`, skipping malformed input.
fn decode(decoder: &mut Decoder, mut src: &[u8], last: bool, out: &mut String) -> usize {
    let mut dropped = 0;
    loop {
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(src.len())
            .unwrap_or(16)
            .max(4);
        out.reserve(needed);
        let (result, read) = decoder.decode_to_string_without_replacement(src, out, last);
        src = &src[read..];
        match result {
            DecoderResult::InputEmpty => return dropped,
            DecoderResult::OutputFull => {},
            DecoderResult::Malformed(_, _) => dropped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_codepage() {
        let mut t = Transcoder::new();
        let mut out = String::new();
        assert_eq!(t.push(Charset::Encoding(encoding_rs::WINDOWS_1252), 0xe9, &mut out), 0);
        assert_eq!(t.push(Charset::Encoding(encoding_rs::WINDOWS_1252), 0x80, &mut out), 0);
        t.finish(&mut out);
        assert_eq!(out, "é€");
    }

    #[test]
    fn test_oem_codepage_interrupts_multi_byte_sequence() {
        let mut t = Transcoder::new();
        let mut out = String::new();
        t.push(Charset::Encoding(encoding_rs::SHIFT_JIS), 0x93, &mut out);
        let oem = codepage_to_charset(850).unwrap();
        assert_eq!(t.push(oem, 0x82, &mut out), 1);
        assert_eq!(t.push(oem, b'a', &mut out), 0);
        assert!(!t.is_active());
        assert_eq!(out, "\u{e9}a");
    }

    #[test]
    fn test_multi_byte_sequence_spans_pushes() {
        // "日" in Shift-JIS is 0x93 0xFA
        let mut t = Transcoder::new();
        let mut out = String::new();
        t.push(Charset::Encoding(encoding_rs::SHIFT_JIS), 0x93, &mut out);
        assert!(out.is_empty());
        t.push(Charset::Encoding(encoding_rs::SHIFT_JIS), 0xfa, &mut out);
        assert_eq!(t.finish(&mut out), 0);
        assert_eq!(out, "日");
    }

    #[test]
    fn test_incomplete_sequence_dropped_on_finish() {
        let mut t = Transcoder::new();
        let mut out = String::new();
        t.push(Charset::Encoding(encoding_rs::SHIFT_JIS), 0x93, &mut out);
        assert_eq!(t.finish(&mut out), 1);
        assert!(out.is_empty());
        assert!(!t.is_active());
    }

    #[test]
    fn test_resolve_fallback_chain() {
        let charset = resolve_charset([Some(1361), None, Some(1251)]).unwrap();
        assert_eq!(charset, Charset::Encoding(encoding_rs::WINDOWS_1251));
        assert_eq!(resolve_charset([Some(437)]).unwrap().name(), "IBM437");
        assert!(matches!(
            resolve_charset([Some(1361), Some(42)]),
            Err(RtfError::UnsupportedCharset(1361))
        ));
    }
}
