//! RTF document import.

use super::context::ParserContext;
use super::error::{Diagnostic, RtfResult};
use super::model::{Run, TextBuffer, TextModel};
use super::parser::Parser;
use super::picture::{BuiltinCodec, ImageCodec};
use crate::common::detection::RTFD_TEXT_ENTRY;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configurable RTF importer.
///
/// # Examples
///
/// ```rust,no_run
/// use cartouche::rtf::RtfImporter;
///
/// let importer = RtfImporter::new().base_dir("/tmp/pictures");
/// let doc = importer.import(r"{\rtf1\ansi Hello {\b World}\par}")?;
/// assert_eq!(doc.text(), "Hello World\n");
/// # Ok::<(), cartouche::rtf::RtfError>(())
/// ```
pub struct RtfImporter {
    codec: Box<dyn ImageCodec>,
    base_dir: Option<PathBuf>,
}

impl Default for RtfImporter {
    fn default() -> Self {
        Self {
            codec: Box::new(BuiltinCodec),
            base_dir: None,
        }
    }
}

impl RtfImporter {
    /// Create an importer with the built-in image codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another codec for embedded and included pictures.
    pub fn codec(mut self, codec: Box<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Directory that relative INCLUDEPICTURE paths resolve against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Import an RTF document held in memory.
    pub fn import(&self, input: &str) -> RtfResult<RtfDocument> {
        self.import_with_base(input, self.base_dir.as_deref())
    }

    /// Import RTF bytes. Non-ASCII bytes outside escapes carry no meaning in
    /// RTF, so invalid UTF-8 is replaced rather than rejected.
    pub fn import_bytes(&self, bytes: &[u8]) -> RtfResult<RtfDocument> {
        self.import(&String::from_utf8_lossy(bytes))
    }

    /// Import a document and replay it into `model` at its end.
    ///
    /// The model is only touched once the whole document parsed.
    pub fn import_into(&self, input: &str, model: &mut dyn TextModel) -> RtfResult<()> {
        let doc = self.import(input)?;
        doc.import_into(model);
        Ok(())
    }

    /// Import an `.rtf` file or an `.rtfd` package directory.
    ///
    /// For packages the directory itself becomes the base directory; for
    /// plain files the configured base directory is used, falling back to the
    /// file's parent directory.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> RtfResult<RtfDocument> {
        let path = path.as_ref();
        let (file, base) = if path.is_dir() {
            debug!(package = %path.display(), "opening RTFD package");
            (path.join(RTFD_TEXT_ENTRY), Some(path))
        } else {
            (path.to_path_buf(), self.base_dir.as_deref().or_else(|| path.parent()))
        };
        let bytes = fs::read(&file)?;
        self.import_with_base(&String::from_utf8_lossy(&bytes), base)
    }

    fn import_with_base(&self, input: &str, base_dir: Option<&Path>) -> RtfResult<RtfDocument> {
        let ctx = ParserContext::new(self.codec.as_ref(), base_dir);
        let mut parser = Parser::new(input, ctx);
        parser.run()?;
        let (buffer, diagnostics) = parser.into_output();
        debug!(
            characters = buffer.char_len(),
            diagnostics = diagnostics.len(),
            "imported RTF document"
        );
        Ok(RtfDocument { buffer, diagnostics })
    }
}

/// RTF Document.
///
/// This is the main entry point for parsing RTF documents. It holds the
/// imported attributed text and the recoverable problems met on the way.
#[derive(Debug, Clone)]
pub struct RtfDocument {
    buffer: TextBuffer,
    diagnostics: Vec<Diagnostic>,
}

impl RtfDocument {
    /// Parse an RTF document from a string.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cartouche::rtf::RtfDocument;
    ///
    /// let rtf = r#"{\rtf1\ansi Hello World!\par}"#;
    /// let doc = RtfDocument::parse(rtf)?;
    /// let text = doc.text();
    /// # Ok::<(), cartouche::rtf::RtfError>(())
    /// ```
    pub fn parse(input: &str) -> RtfResult<Self> {
        RtfImporter::default().import(input)
    }

    /// Parse an RTF document from bytes.
    pub fn from_bytes(bytes: &[u8]) -> RtfResult<Self> {
        RtfImporter::default().import_bytes(bytes)
    }

    /// Parse an RTF document from a file or `.rtfd` package.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cartouche::rtf::RtfDocument;
    ///
    /// let doc = RtfDocument::open("document.rtf")?;
    /// let text = doc.text();
    /// # Ok::<(), cartouche::rtf::RtfError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> RtfResult<Self> {
        RtfImporter::default().open(path)
    }

    /// The imported content.
    #[inline]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Get all text content, images shown as U+FFFC.
    #[inline]
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Get all runs in the document.
    ///
    /// A run is a contiguous stretch of text with the same formatting, or a
    /// single image.
    pub fn runs(&self) -> Vec<Run<'_>> {
        self.buffer.runs()
    }

    /// Get the text of every paragraph.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.buffer.paragraphs()
    }

    /// Recoverable problems met while importing.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the imported content.
    pub fn into_buffer(self) -> TextBuffer {
        self.buffer
    }

    /// Replay the document into another text model, after its current end.
    pub fn import_into(&self, model: &mut dyn TextModel) {
        let at = model.char_len();
        self.buffer.replay_into(model, at);
    }
}
