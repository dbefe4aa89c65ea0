//! Per-parse shared state.
//!
//! One [`ParserContext`] lives for the duration of a single import. It holds
//! everything destinations share: the pending text collected since the last
//! flush point, the streaming transcoder, the font, color and style tables,
//! document-wide defaults, and the output buffer with its insertion mark.
//! Destinations receive it as `&mut` on every call; nothing in it outlives
//! the parse except the buffer handed back on success.

use super::charset::Transcoder;
use super::error::{Diagnostic, DiagnosticKind};
use super::model::{TextBuffer, TextModel};
use super::picture::{ImageCodec, Picture};
use super::stylesheet::StyleTable;
use super::tags::TextTag;
use super::types::{ColorTable, FontTable};
use crate::common::encoding::{Charset, DEFAULT_CODEPAGE};
use std::path::Path;
use tracing::warn;

/// Where a document-like destination sends its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// At the body insertion mark, advancing it
    Body,
    /// At the end of the buffer, after the body mark
    Footnote,
    /// Into the destination itself, handed to the parent on close
    Capture,
}

/// A piece of formatted output captured for later placement.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text { text: String, tags: Vec<TextTag> },
    Image(Picture),
}

/// Shared state of one parse.
pub struct ParserContext<'a> {
    /// Text collected since the last flush point
    pending: String,
    transcoder: Transcoder,
    /// Fonts declared by `\fonttbl`
    pub fonts: FontTable,
    /// Colors declared by `\colortbl`
    pub colors: ColorTable,
    /// Styles declared by `\stylesheet`
    pub styles: StyleTable,
    /// Codepage set by `\ansicpg`
    pub codepage: Option<u32>,
    /// Codepage implied by `\ansi`, `\mac`, `\pc` or `\pca`
    pub default_codepage: u32,
    /// Font set by `\deff`
    pub default_font: Option<i32>,
    /// Language set by `\deflang`
    pub default_language: Option<i32>,
    /// Number of footnotes closed so far
    pub footnote_count: u32,
    buffer: TextBuffer,
    /// Body insertion mark; footnotes live after it
    insert_at: usize,
    codec: &'a dyn ImageCodec,
    base_dir: Option<&'a Path>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParserContext<'a> {
    pub fn new(codec: &'a dyn ImageCodec, base_dir: Option<&'a Path>) -> Self {
        Self {
            pending: String::new(),
            transcoder: Transcoder::new(),
            fonts: FontTable::new(),
            colors: ColorTable::new(),
            styles: StyleTable::new(),
            codepage: None,
            default_codepage: DEFAULT_CODEPAGE,
            default_font: None,
            default_language: None,
            footnote_count: 0,
            buffer: TextBuffer::new(),
            insert_at: 0,
            codec,
            base_dir,
            diagnostics: Vec::new(),
        }
    }

    /// Append literal text to the pending buffer.
    pub fn push_text(&mut self, text: &str) {
        self.finish_bytes();
        self.pending.push_str(text);
    }

    /// Append one raw byte from a `\'HH` escape, decoded with `charset`.
    pub fn push_byte(&mut self, charset: Charset, byte: u8) {
        let dropped = self.transcoder.push(charset, byte, &mut self.pending);
        self.report_malformed(dropped, charset.name());
    }

    /// Finalize any multi-byte sequence in progress.
    pub fn finish_bytes(&mut self) {
        if let Some(encoding) = self.transcoder.encoding() {
            let dropped = self.transcoder.finish(&mut self.pending);
            self.report_malformed(dropped, encoding.name());
        }
    }

    /// Take the pending text, finalizing the transcoder first.
    pub fn take_pending(&mut self) -> String {
        self.finish_bytes();
        std::mem::take(&mut self.pending)
    }

    /// Pending text collected so far.
    #[inline]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop the pending text.
    pub fn discard_pending(&mut self) {
        self.finish_bytes();
        self.pending.clear();
    }

    /// Put text back in front of the pending buffer.
    pub fn restore_pending(&mut self, text: &str) {
        self.pending.insert_str(0, text);
    }

    /// Insert formatted text at the given placement. `Capture` is handled by
    /// the destination itself and is ignored here.
    pub fn emit_text(&mut self, placement: Placement, text: &str, tags: &[TextTag]) {
        if text.is_empty() {
            return;
        }
        let Some(at) = self.position(placement) else {
            return;
        };
        let len = text.chars().count();
        self.buffer.insert_text(at, text);
        for tag in tags {
            self.buffer.apply_tag(tag, at..at + len);
        }
        if placement == Placement::Body {
            self.insert_at += len;
        }
    }

    /// Insert an image at the given placement.
    pub fn emit_image(&mut self, placement: Placement, picture: Picture) {
        let Some(at) = self.position(placement) else {
            return;
        };
        self.buffer.insert_image(at, picture);
        if placement == Placement::Body {
            self.insert_at += 1;
        }
    }

    /// Insert a captured fragment at the given placement.
    pub fn emit_fragment(&mut self, placement: Placement, fragment: Fragment) {
        match fragment {
            Fragment::Text { text, tags } => self.emit_text(placement, &text, &tags),
            Fragment::Image(picture) => self.emit_image(placement, picture),
        }
    }

    fn position(&self, placement: Placement) -> Option<usize> {
        match placement {
            Placement::Body => Some(self.insert_at),
            Placement::Footnote => Some(self.buffer.char_len()),
            Placement::Capture => None,
        }
    }

    /// The output buffer, for defining tags.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Image codec for pictures.
    #[inline]
    pub fn codec(&self) -> &'a dyn ImageCodec {
        self.codec
    }

    /// Directory relative picture paths resolve against.
    #[inline]
    pub fn base_dir(&self) -> Option<&'a Path> {
        self.base_dir
    }

    /// Log and record a recoverable problem.
    pub fn warn(&mut self, kind: DiagnosticKind, message: String) {
        warn!(?kind, "{message}");
        self.diagnostics.push(Diagnostic { kind, message });
    }

    fn report_malformed(&mut self, dropped: usize, codepage: &str) {
        if dropped > 0 {
            self.warn(
                DiagnosticKind::InvalidCharacter,
                format!("dropped {dropped} invalid {codepage} sequence(s)"),
            );
        }
    }

    /// Hand over the output at the end of a successful parse.
    pub fn into_output(self) -> (TextBuffer, Vec<Diagnostic>) {
        (self.buffer, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;

    #[test]
    fn test_footnotes_stay_behind_body() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.emit_text(Placement::Body, "Body", &[TextTag::Bold]);
        ctx.emit_text(Placement::Footnote, "\nNote", &[TextTag::Italic]);
        ctx.emit_text(Placement::Body, " more", &[]);

        let (buffer, _) = ctx.into_output();
        assert_eq!(buffer.text(), "Body more\nNote");
        assert_eq!(buffer.tag_ranges(&TextTag::Bold), &[0..4]);
        assert_eq!(buffer.tag_ranges(&TextTag::Italic), &[9..14]);
    }

    #[test]
    fn test_pending_mixes_text_and_bytes() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.push_text("caf");
        ctx.push_byte(Charset::Encoding(encoding_rs::WINDOWS_1252), 0xe9);
        ctx.push_text("!");
        assert_eq!(ctx.take_pending(), "café!");
        assert_eq!(ctx.pending(), "");
    }

    #[test]
    fn test_malformed_bytes_are_diagnosed() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.push_byte(Charset::Encoding(encoding_rs::SHIFT_JIS), 0x93);
        ctx.push_text("x");
        let (_, diagnostics) = ctx.into_output();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidCharacter);
    }
}
