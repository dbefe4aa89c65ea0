//! RTF document writer/serializer.
//!
//! This module writes the content of a [`TextBuffer`] back out as RTF. The
//! font, color and style tables are rebuilt from the buffer's tag
//! definitions; every run becomes a brace group that carries the control
//! words for its tags, so no formatting leaks from one run to the next.

use super::model::{Run, TextBuffer};
use super::picture::{ImageType, Picture};
use super::tags::{TagStyle, TextTag};
use super::types::{Alignment, Direction, StyleKind};
use crate::common::encoding::encode_hex_into;
use std::io::{self, Write};
use tracing::debug;

/// Hex digits per line of picture data.
const PICTURE_LINE: usize = 128;

/// RTF writer options
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// ANSI code page number (default 1252 for Western European)
    pub code_page: u32,
    /// Default tab width (in twips)
    pub default_tab_width: i32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            code_page: 1252,
            default_tab_width: 720, // 0.5 inch
        }
    }
}

/// RTF document writer
pub struct RtfWriter<W: Write> {
    /// Output writer
    writer: W,
    /// Writer options
    options: WriterOptions,
}

impl<W: Write> RtfWriter<W> {
    /// Create a new RTF writer
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, WriterOptions::default())
    }

    /// Create a new RTF writer with options
    pub fn with_options(writer: W, options: WriterOptions) -> Self {
        Self { writer, options }
    }

    /// Write a complete RTF document
    pub fn write_buffer(&mut self, buffer: &TextBuffer) -> io::Result<()> {
        self.write_document_header()?;
        self.write_font_table(buffer)?;
        self.write_color_table(buffer)?;
        self.write_stylesheet(buffer)?;

        for run in buffer.runs() {
            match run {
                Run::Text { text, tags } => self.write_text_run(buffer, text, &tags)?,
                Run::Image(picture) => self.write_picture(picture)?,
            }
        }

        self.write_str("}")?;
        self.writer.flush()
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write document header
    fn write_document_header(&mut self) -> io::Result<()> {
        self.write_str("{")?;
        self.write_control_word("rtf", Some(1))?;
        self.write_control_word("ansi", None)?;
        self.write_control_word("ansicpg", Some(self.options.code_page as i32))?;
        self.write_control_word("deftab", Some(self.options.default_tab_width))?;
        // Every non-ASCII character is written as \uN with one fallback
        self.write_control_word("uc", Some(1))?;
        self.write_str("\n")
    }

    /// Write font table
    fn write_font_table(&mut self, buffer: &TextBuffer) -> io::Result<()> {
        let fonts: Vec<_> = buffer
            .definitions()
            .filter_map(|(tag, style)| match (tag, style) {
                (TextTag::Font(index), TagStyle::Font { name, family, charset }) => {
                    Some((*index, name, *family, *charset))
                },
                _ => None,
            })
            .collect();
        if fonts.is_empty() {
            return Ok(());
        }

        self.write_str("{")?;
        self.write_control_word("fonttbl", None)?;
        for (index, name, family, charset) in fonts {
            self.write_str("{")?;
            self.write_control_word("f", Some(index))?;
            self.write_control_word(family.control_word(), None)?;
            if let Some(charset) = charset {
                self.write_control_word("fcharset", Some(charset))?;
            }
            self.write_str(" ")?;
            self.write_text(name)?;
            self.write_str(";}")?;
        }
        self.write_str("}\n")
    }

    /// Write color table
    ///
    /// Indexes referenced by a run but never defined are filled with black
    /// so that the output stays readable.
    fn write_color_table(&mut self, buffer: &TextBuffer) -> io::Result<()> {
        let color_index = |tag: &TextTag| match tag {
            TextTag::Foreground(i) | TextTag::Background(i) => Some(*i),
            _ => None,
        };
        let highest = buffer
            .definitions()
            .map(|(tag, _)| tag)
            .chain(buffer.tags())
            .filter_map(color_index)
            .max();
        let Some(highest) = highest.filter(|&i| i >= 0) else {
            return Ok(());
        };

        self.write_str("{")?;
        self.write_control_word("colortbl", None)?;
        for index in 0..=highest {
            let color = [TextTag::Foreground(index), TextTag::Background(index)]
                .iter()
                .find_map(|tag| match buffer.definition(tag) {
                    Some(TagStyle::Color(color)) => Some(*color),
                    _ => None,
                });
            // Index 0 without components is the automatic color
            match color {
                Some(color) if index > 0 || color != Default::default() => {
                    self.write_control_word("red", Some(i32::from(color.red)))?;
                    self.write_control_word("green", Some(i32::from(color.green)))?;
                    self.write_control_word("blue", Some(i32::from(color.blue)))?;
                },
                _ => {},
            }
            self.write_str(";")?;
        }
        self.write_str("}\n")
    }

    /// Write the stylesheet
    fn write_stylesheet(&mut self, buffer: &TextBuffer) -> io::Result<()> {
        let styles: Vec<_> = buffer
            .definitions()
            .filter_map(|(tag, style)| match (tag, style) {
                (TextTag::Style(index), TagStyle::Style { name, kind, tags }) => {
                    Some((*index, name, *kind, tags))
                },
                _ => None,
            })
            .collect();
        if styles.is_empty() {
            return Ok(());
        }

        self.write_str("{")?;
        self.write_control_word("stylesheet", None)?;
        for (index, name, kind, tags) in styles {
            self.write_str("{")?;
            self.write_control_word(kind.control_word(), Some(index))?;
            for tag in tags {
                self.write_tag(buffer, tag)?;
            }
            self.write_str(" ")?;
            self.write_text(name)?;
            self.write_str(";}")?;
        }
        self.write_str("}\n")
    }

    /// Write one run as a group carrying its formatting
    fn write_text_run(&mut self, buffer: &TextBuffer, text: &str, tags: &[TextTag]) -> io::Result<()> {
        self.write_str("{")?;
        for tag in tags {
            self.write_tag(buffer, tag)?;
        }
        if !tags.is_empty() {
            self.write_str(" ")?;
        }
        self.write_text(text)?;
        self.write_str("}")
    }

    /// Write the control words that recreate a tag
    fn write_tag(&mut self, buffer: &TextBuffer, tag: &TextTag) -> io::Result<()> {
        match tag {
            TextTag::Bold => self.write_control_word("b", None),
            TextTag::Italic => self.write_control_word("i", None),
            TextTag::Underline(style) => self.write_control_word(style.control_word(), None),
            TextTag::Strikethrough => self.write_control_word("strike", None),
            TextTag::SmallCaps => self.write_control_word("scaps", None),
            TextTag::Superscript => self.write_control_word("super", None),
            TextTag::Subscript => self.write_control_word("sub", None),
            TextTag::Invisible => self.write_control_word("v", None),
            TextTag::Foreground(i) => self.write_control_word("cf", Some(*i)),
            TextTag::Background(i) => self.write_control_word("cb", Some(*i)),
            TextTag::Font(i) => self.write_control_word("f", Some(*i)),
            TextTag::FontSize(half_points) => self.write_control_word("fs", Some(*half_points)),
            TextTag::Rise(half_points) if *half_points < 0 => {
                self.write_control_word("dn", Some(half_points.saturating_neg()))
            },
            TextTag::Rise(half_points) => self.write_control_word("up", Some(*half_points)),
            TextTag::Scale(percent) => self.write_control_word("charscalex", Some(*percent)),
            TextTag::Language(id) => self.write_control_word("lang", Some(*id)),
            TextTag::CharDirection(direction) => self.write_control_word(
                match direction {
                    Direction::LeftToRight => "ltrch",
                    Direction::RightToLeft => "rtlch",
                },
                None,
            ),
            TextTag::Justify(alignment) => self.write_control_word(
                match alignment {
                    Alignment::Left => "ql",
                    Alignment::Right => "qr",
                    Alignment::Center => "qc",
                    Alignment::Justify => "qj",
                },
                None,
            ),
            TextTag::ParDirection(direction) => self.write_control_word(
                match direction {
                    Direction::LeftToRight => "ltrpar",
                    Direction::RightToLeft => "rtlpar",
                },
                None,
            ),
            TextTag::SpaceBefore(tw) => self.write_control_word("sb", Some(*tw)),
            TextTag::SpaceAfter(tw) => self.write_control_word("sa", Some(*tw)),
            TextTag::LeftMargin(tw) => self.write_control_word("li", Some(*tw)),
            TextTag::RightMargin(tw) => self.write_control_word("ri", Some(*tw)),
            TextTag::Indent(tw) => self.write_control_word("fi", Some(*tw)),
            TextTag::Leading(tw) => self.write_control_word("sl", Some(*tw)),
            TextTag::Tabs(stops) => {
                for stop in stops {
                    self.write_control_word("tx", Some(*stop))?;
                }
                Ok(())
            },
            TextTag::Style(index) => {
                let kind = match buffer.definition(tag) {
                    Some(TagStyle::Style { kind, .. }) => *kind,
                    _ => StyleKind::Paragraph,
                };
                self.write_control_word(kind.control_word(), Some(*index))
            },
        }
    }

    /// Write an embedded picture as a `\pict` group
    fn write_picture(&mut self, picture: &Picture) -> io::Result<()> {
        let (kind, param) = match picture.image_type {
            ImageType::Png => ("pngblip", None),
            ImageType::Jpeg => ("jpegblip", None),
            ImageType::Emf => ("emfblip", None),
            ImageType::Pict => ("macpict", None),
            ImageType::Wmf => ("wmetafile", Some(8)),
            ImageType::Dib => ("dibitmap", Some(0)),
            ImageType::Pmm => ("pmmetafile", Some(0)),
            ImageType::Unknown => {
                debug!(bytes = picture.data.len(), "skipping picture of unknown type");
                return Ok(());
            },
        };

        self.write_str("{")?;
        self.write_control_word("pict", None)?;
        self.write_control_word(kind, param)?;
        if let Some(width) = picture.width {
            self.write_control_word("picw", Some(width as i32))?;
        }
        if let Some(height) = picture.height {
            self.write_control_word("pich", Some(height as i32))?;
        }
        if let Some(twips) = picture.width_twips() {
            self.write_control_word("picwgoal", Some(twips))?;
        }
        if let Some(twips) = picture.height_twips() {
            self.write_control_word("pichgoal", Some(twips))?;
        }
        self.write_str("\n")?;

        let mut hex = String::with_capacity(picture.data.len() * 2);
        encode_hex_into(&picture.data, &mut hex);
        // Hex digits are ASCII, so byte offsets are character boundaries
        for start in (0..hex.len()).step_by(PICTURE_LINE) {
            let end = (start + PICTURE_LINE).min(hex.len());
            self.write_str(&hex[start..end])?;
            self.write_str("\n")?;
        }
        self.write_str("}")
    }

    /// Write a control word
    fn write_control_word(&mut self, word: &str, param: Option<i32>) -> io::Result<()> {
        self.write_str("\\")?;
        self.write_str(word)?;
        if let Some(p) = param {
            let mut digits = itoa::Buffer::new();
            self.write_str(digits.format(p))?;
        }
        Ok(())
    }

    /// Write a control word that stands for text, delimited by a space
    fn write_symbol_word(&mut self, word: &str, param: Option<i32>) -> io::Result<()> {
        self.write_control_word(word, param)?;
        self.write_str(" ")
    }

    /// Write plain text (with proper escaping)
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in text.chars() {
            match ch {
                '\\' => self.write_str("\\\\")?,
                '{' => self.write_str("\\{")?,
                '}' => self.write_str("\\}")?,
                '\n' => self.write_symbol_word("par", None)?,
                '\t' => self.write_symbol_word("tab", None)?,
                '\u{2028}' => self.write_symbol_word("line", None)?,
                ' '..='~' => {
                    let mut byte = [0u8; 1];
                    self.write_str(ch.encode_utf8(&mut byte))?;
                },
                c => {
                    // Signed 16-bit code units, each followed by a '?' fallback
                    for unit in c.encode_utf16(&mut units) {
                        self.write_control_word("u", Some(i32::from(*unit as i16)))?;
                        self.write_str("?")?;
                    }
                },
            }
        }
        Ok(())
    }

    /// Write a string
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.writer.write_all(s.as_bytes())
    }

    /// Flush the writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Serialize a buffer to an RTF string with default options.
pub fn export_rtf(buffer: &TextBuffer) -> String {
    let mut output = Vec::new();
    let written = RtfWriter::new(&mut output).write_buffer(buffer);
    debug_assert!(written.is_ok(), "writing to memory cannot fail");
    // The writer only produces ASCII
    String::from_utf8_lossy(&output).into_owned()
}
