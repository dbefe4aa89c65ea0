//! Attributed text model.
//!
//! The importer talks to its output through the [`TextModel`] trait: insert
//! text at a position, apply a tag over a range, insert an image, define the
//! style behind a table-backed tag. [`TextBuffer`] is the in-memory
//! implementation used by default and read by the writer.
//!
//! Positions count Unicode scalar values. An image occupies one position,
//! holding U+FFFC (OBJECT REPLACEMENT CHARACTER) in the text.

use super::picture::Picture;
use super::tags::{TagStyle, TextTag};
use std::collections::BTreeMap;
use std::ops::Range;

/// Placeholder character standing for an embedded image.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Sink for imported rich text.
pub trait TextModel {
    /// Length of the content in characters.
    fn char_len(&self) -> usize;

    /// Insert `text` so that it starts at character position `at`.
    fn insert_text(&mut self, at: usize, text: &str);

    /// Apply `tag` over the character range.
    fn apply_tag(&mut self, tag: &TextTag, range: Range<usize>);

    /// Insert an image at character position `at`.
    fn insert_image(&mut self, at: usize, picture: Picture);

    /// Register the definition behind a font, color or style tag.
    fn define_tag(&mut self, tag: &TextTag, style: TagStyle);

    /// Whether a definition was registered for `tag`.
    fn is_tag_defined(&self, tag: &TextTag) -> bool;
}

/// A maximal stretch of content with uniform formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Run<'a> {
    /// Text and the tags covering all of it, sorted
    Text { text: &'a str, tags: Vec<TextTag> },
    /// An embedded image
    Image(&'a Picture),
}

impl Run<'_> {
    /// Text of the run, `None` for images.
    pub fn text(&self) -> Option<&str> {
        match self {
            Run::Text { text, .. } => Some(text),
            Run::Image(_) => None,
        }
    }

    /// Whether the run carries `tag`.
    pub fn has_tag(&self, tag: &TextTag) -> bool {
        match self {
            Run::Text { tags, .. } => tags.contains(tag),
            Run::Image(_) => false,
        }
    }
}

/// In-memory attributed text.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    char_len: usize,
    /// Disjoint, sorted, non-adjacent ranges per tag
    spans: BTreeMap<TextTag, Vec<Range<usize>>>,
    /// Images sorted by position
    images: Vec<(usize, Picture)>,
    definitions: BTreeMap<TextTag, TagStyle>,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The plain text, images shown as U+FFFC.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Ranges covered by `tag`.
    pub fn tag_ranges(&self, tag: &TextTag) -> &[Range<usize>] {
        self.spans.get(tag).map_or(&[], Vec::as_slice)
    }

    /// All tags applied anywhere in the buffer.
    pub fn tags(&self) -> impl Iterator<Item = &TextTag> {
        self.spans.keys()
    }

    /// Definition registered for `tag`.
    pub fn definition(&self, tag: &TextTag) -> Option<&TagStyle> {
        self.definitions.get(tag)
    }

    /// All tag definitions, in tag order.
    pub fn definitions(&self) -> impl Iterator<Item = (&TextTag, &TagStyle)> {
        self.definitions.iter()
    }

    /// Images with their positions.
    pub fn images(&self) -> impl Iterator<Item = (usize, &Picture)> {
        self.images.iter().map(|(pos, picture)| (*pos, picture))
    }

    /// Tags covering the character at `pos`, sorted.
    pub fn tags_at(&self, pos: usize) -> Vec<TextTag> {
        self.spans
            .iter()
            .filter(|(_, ranges)| covers(ranges, pos))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Paragraphs of the plain text. A trailing newline ends the last
    /// paragraph rather than starting an empty one.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.text.split_terminator('\n').collect()
    }

    /// Split the content into runs of uniform formatting.
    pub fn runs(&self) -> Vec<Run<'_>> {
        let mut cuts = vec![0, self.char_len];
        for ranges in self.spans.values() {
            for range in ranges {
                cuts.push(range.start);
                cuts.push(range.end);
            }
        }
        for (pos, _) in &self.images {
            cuts.push(*pos);
            cuts.push(pos + 1);
        }
        cuts.sort_unstable();
        cuts.dedup();

        let offsets = self.byte_offsets(&cuts);
        let mut image_iter = self.images.iter().peekable();
        let mut runs: Vec<Run<'_>> = Vec::new();
        // Byte offset where the last text run starts
        let mut text_start = 0;

        for (window, bytes) in cuts.windows(2).zip(offsets.windows(2)) {
            let (start, end) = (window[0], window[1]);
            if start == end {
                continue;
            }
            if let Some((_, picture)) = image_iter.next_if(|(pos, _)| *pos == start) {
                runs.push(Run::Image(picture));
                continue;
            }
            let text = &self.text[bytes[0]..bytes[1]];
            let tags = self.tags_at(start);
            match runs.last_mut() {
                Some(Run::Text {
                    text: prev,
                    tags: prev_tags,
                }) if *prev_tags == tags => {
                    *prev = &self.text[text_start..bytes[1]];
                },
                _ => {
                    text_start = bytes[0];
                    runs.push(Run::Text { text, tags });
                },
            }
        }
        runs
    }

    /// Copy the whole content into another model, starting at `at`.
    ///
    /// Definitions already present in the target are kept.
    pub fn replay_into(&self, model: &mut dyn TextModel, at: usize) {
        for (tag, style) in &self.definitions {
            if !model.is_tag_defined(tag) {
                model.define_tag(tag, style.clone());
            }
        }

        let mut pos = at;
        for run in self.runs() {
            match run {
                Run::Text { text, .. } => {
                    model.insert_text(pos, text);
                    pos += text.chars().count();
                },
                Run::Image(picture) => {
                    model.insert_image(pos, picture.clone());
                    pos += 1;
                },
            }
        }

        for (tag, ranges) in &self.spans {
            for range in ranges {
                model.apply_tag(tag, range.start + at..range.end + at);
            }
        }
    }

    /// Byte offsets of the given sorted character positions.
    fn byte_offsets(&self, positions: &[usize]) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(positions.len());
        let mut wanted = positions.iter().peekable();
        for (index, (byte, _)) in self.text.char_indices().enumerate() {
            while wanted.next_if(|&&p| p == index).is_some() {
                offsets.push(byte);
            }
            if wanted.peek().is_none() {
                break;
            }
        }
        while wanted.next().is_some() {
            offsets.push(self.text.len());
        }
        offsets
    }

    /// Byte offset of character position `at` (clamped to the end).
    fn byte_offset(&self, at: usize) -> usize {
        if at >= self.char_len {
            return self.text.len();
        }
        self.text
            .char_indices()
            .nth(at)
            .map_or(self.text.len(), |(b, _)| b)
    }

    /// Move everything at or after `at` right by `len` positions.
    fn shift(&mut self, at: usize, len: usize) {
        if at >= self.char_len {
            return;
        }
        for ranges in self.spans.values_mut() {
            for range in ranges.iter_mut() {
                if at <= range.start {
                    range.start += len;
                    range.end += len;
                } else if at < range.end {
                    range.end += len;
                }
            }
        }
        for (pos, _) in &mut self.images {
            if *pos >= at {
                *pos += len;
            }
        }
    }
}

/// Whether the sorted ranges cover `pos`.
fn covers(ranges: &[Range<usize>], pos: usize) -> bool {
    let i = ranges.partition_point(|r| r.end <= pos);
    ranges.get(i).is_some_and(|r| r.start <= pos)
}

/// Merge `new` into sorted disjoint ranges, coalescing overlaps and neighbors.
fn merge_range(ranges: &mut Vec<Range<usize>>, new: Range<usize>) {
    let first = ranges.partition_point(|r| r.end < new.start);
    let last = ranges.partition_point(|r| r.start <= new.end);
    if first == last {
        ranges.insert(first, new);
        return;
    }
    let start = new.start.min(ranges[first].start);
    let end = new.end.max(ranges[last - 1].end);
    ranges.splice(first..last, std::iter::once(start..end));
}

impl TextModel for TextBuffer {
    #[inline]
    fn char_len(&self) -> usize {
        self.char_len
    }

    fn insert_text(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let len = text.chars().count();
        let at = at.min(self.char_len);
        self.shift(at, len);
        let offset = self.byte_offset(at);
        self.text.insert_str(offset, text);
        self.char_len += len;
    }

    fn apply_tag(&mut self, tag: &TextTag, range: Range<usize>) {
        let range = range.start..range.end.min(self.char_len);
        if range.is_empty() {
            return;
        }
        match self.spans.get_mut(tag) {
            Some(ranges) => merge_range(ranges, range),
            None => {
                self.spans.insert(tag.clone(), vec![range]);
            },
        }
    }

    fn insert_image(&mut self, at: usize, picture: Picture) {
        let at = at.min(self.char_len);
        self.shift(at, 1);
        let offset = self.byte_offset(at);
        self.text.insert(offset, OBJECT_REPLACEMENT);
        self.char_len += 1;
        let index = self.images.partition_point(|(pos, _)| *pos < at);
        self.images.insert(index, (at, picture));
    }

    fn define_tag(&mut self, tag: &TextTag, style: TagStyle) {
        self.definitions.insert(tag.clone(), style);
    }

    fn is_tag_defined(&self, tag: &TextTag) -> bool {
        self.definitions.contains_key(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::ImageType;
    use crate::rtf::types::Color;

    #[test]
    fn test_insert_and_tag() {
        let mut buf = TextBuffer::new();
        buf.insert_text(0, "plainbold");
        buf.apply_tag(&TextTag::Bold, 5..9);
        buf.insert_text(9, "plain");

        let runs = buf.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), Some("plain"));
        assert!(runs[1].has_tag(&TextTag::Bold));
        assert_eq!(runs[2].text(), Some("plain"));
        assert!(!runs[2].has_tag(&TextTag::Bold));
    }

    #[test]
    fn test_span_moves_with_insertions() {
        let mut buf = TextBuffer::new();
        buf.insert_text(0, "abcdef");
        buf.apply_tag(&TextTag::Italic, 2..4);

        // Before the span: shifts
        buf.insert_text(0, "xy");
        assert_eq!(buf.tag_ranges(&TextTag::Italic), &[4..6]);
        // At the start: shifts
        buf.insert_text(4, "z");
        assert_eq!(buf.tag_ranges(&TextTag::Italic), &[5..7]);
        // Strictly inside: grows
        buf.insert_text(6, "éé");
        assert_eq!(buf.tag_ranges(&TextTag::Italic), &[5..9]);
        // At the end: unchanged
        buf.insert_text(9, "q");
        assert_eq!(buf.tag_ranges(&TextTag::Italic), &[5..9]);
        assert_eq!(buf.text(), "xyabzcéédqef");
    }

    #[test]
    fn test_adjacent_ranges_merge() {
        let mut buf = TextBuffer::new();
        buf.insert_text(0, "0123456789");
        buf.apply_tag(&TextTag::Bold, 0..2);
        buf.apply_tag(&TextTag::Bold, 5..7);
        buf.apply_tag(&TextTag::Bold, 2..3);
        assert_eq!(buf.tag_ranges(&TextTag::Bold), &[0..3, 5..7]);
        buf.apply_tag(&TextTag::Bold, 3..5);
        assert_eq!(buf.tag_ranges(&TextTag::Bold), &[0..7]);
        buf.apply_tag(&TextTag::Bold, 8..20);
        assert_eq!(buf.tag_ranges(&TextTag::Bold), &[0..7, 8..10]);
    }

    #[test]
    fn test_images_take_one_position() {
        let mut buf = TextBuffer::new();
        buf.insert_text(0, "ab");
        buf.insert_image(1, Picture::new(ImageType::Png, vec![1, 2, 3]));
        assert_eq!(buf.char_len(), 3);
        assert_eq!(buf.text(), "a\u{FFFC}b");

        let runs = buf.runs();
        assert_eq!(runs.len(), 3);
        assert!(matches!(runs[1], Run::Image(p) if p.data == [1, 2, 3]));

        buf.insert_text(0, "z");
        assert_eq!(buf.images().next().map(|(pos, _)| pos), Some(2));
    }

    #[test]
    fn test_paragraphs() {
        let mut buf = TextBuffer::new();
        buf.insert_text(0, "Hello\nWorld\n");
        assert_eq!(buf.paragraphs(), vec!["Hello", "World"]);
        assert!(TextBuffer::new().paragraphs().is_empty());
    }

    #[test]
    fn test_replay_into_offsets_everything() {
        let mut src = TextBuffer::new();
        src.insert_text(0, "hi there");
        src.apply_tag(&TextTag::Foreground(1), 3..8);
        src.define_tag(&TextTag::Foreground(1), TagStyle::Color(Color::new(255, 0, 0)));

        let mut dst = TextBuffer::new();
        dst.insert_text(0, ">> ");
        src.replay_into(&mut dst, 3);
        assert_eq!(dst.text(), ">> hi there");
        assert_eq!(dst.tag_ranges(&TextTag::Foreground(1)), &[6..11]);
        assert!(dst.is_tag_defined(&TextTag::Foreground(1)));
    }
}
