//! The `\stylesheet` destination.
//!
//! Each entry is a style index word (`\s`, `\cs`, `\ds` or `\ts`), any
//! formatting words, and a name ending in `;`.

use crate::rtf::attributes::Attributes;
use crate::rtf::context::ParserContext;
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::RtfResult;
use crate::rtf::model::TextModel;
use crate::rtf::stylesheet::StyleRecord;
use crate::rtf::tags::{TagStyle, TextTag};
use crate::rtf::types::StyleKind;
use phf::phf_map;

#[derive(Debug, Default)]
pub struct StylesheetDest;

/// The style being read.
#[derive(Debug, Clone, Default)]
pub struct StyleEntry {
    /// `\s0` is implied when an entry names no index
    index: i32,
    kind: StyleKind,
    attributes: Attributes,
}

impl StylesheetDest {
    pub fn boxed() -> Box<dyn Destination> {
        Frame::boxed(StylesheetDest, StyleEntry::default())
    }

    fn commit(ctx: &mut ParserContext<'_>, entry: &mut StyleEntry) {
        let name = ctx.take_pending().trim().to_string();
        let entry = std::mem::take(entry);
        let tags = entry.attributes.tags(ctx);
        ctx.buffer_mut().define_tag(
            &TextTag::Style(entry.index),
            TagStyle::Style {
                name: name.clone(),
                kind: entry.kind,
                tags,
            },
        );
        ctx.styles.insert(StyleRecord {
            index: entry.index,
            kind: entry.kind,
            name,
            attributes: entry.attributes,
        });
    }
}

impl DestinationKind for StylesheetDest {
    type State = StyleEntry;

    const NAME: &'static str = "stylesheet";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&STYLE_WORDS, name)
    }

    fn attributes(entry: &mut StyleEntry) -> Option<&mut Attributes> {
        Some(&mut entry.attributes)
    }

    fn text(&mut self, ctx: &mut ParserContext<'_>, entry: &mut StyleEntry, text: &str) -> RtfResult<()> {
        let mut parts = text.split(';');
        if let Some(first) = parts.next() {
            ctx.push_text(first);
        }
        for part in parts {
            Self::commit(ctx, entry);
            ctx.push_text(part);
        }
        Ok(())
    }

    // The name is still being collected
    fn flush(&mut self, _: &mut ParserContext<'_>, _: &mut StyleEntry) -> RtfResult<()> {
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, _: StyleEntry) -> RtfResult<Outcome> {
        ctx.discard_pending();
        Ok(Outcome::Nothing)
    }
}

type Word = ControlWord<StylesheetDest>;

static STYLE_WORDS: ControlTable<StylesheetDest> = phf_map! {
    "s" => Word::required(paragraph_style),
    "cs" => Word::required(character_style),
    "ds" => Word::required(section_style),
    "ts" => Word::required(table_style),
};

fn set_style(entry: &mut StyleEntry, kind: StyleKind, index: i32) -> RtfResult<()> {
    entry.index = index;
    entry.kind = kind;
    Ok(())
}

fn paragraph_style(_: &mut StylesheetDest, _: &mut ParserContext<'_>, entry: &mut StyleEntry, index: i32) -> RtfResult<()> {
    set_style(entry, StyleKind::Paragraph, index)
}

fn character_style(_: &mut StylesheetDest, _: &mut ParserContext<'_>, entry: &mut StyleEntry, index: i32) -> RtfResult<()> {
    set_style(entry, StyleKind::Character, index)
}

fn section_style(_: &mut StylesheetDest, _: &mut ParserContext<'_>, entry: &mut StyleEntry, index: i32) -> RtfResult<()> {
    set_style(entry, StyleKind::Section, index)
}

fn table_style(_: &mut StylesheetDest, _: &mut ParserContext<'_>, entry: &mut StyleEntry, index: i32) -> RtfResult<()> {
    set_style(entry, StyleKind::Table, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;

    #[test]
    fn test_grouped_entries() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut frame = Frame::new(StylesheetDest, StyleEntry::default());

        frame.push_state();
        frame.text(&mut ctx, "Normal;").unwrap();
        frame.pop_state();

        frame.push_state();
        frame.control(&mut ctx, "cs", Some(10)).unwrap();
        frame.control(&mut ctx, "b", None).unwrap();
        frame.text(&mut ctx, "Strong;").unwrap();
        frame.pop_state();
        Box::new(frame).finish(&mut ctx).unwrap();

        assert_eq!(ctx.styles.get(0).unwrap().name, "Normal");
        let strong = ctx.styles.get(10).unwrap();
        assert!(strong.is_character_style());
        assert!(strong.attributes.bold);

        let (buffer, _) = ctx.into_output();
        assert_eq!(
            buffer.definition(&TextTag::Style(10)),
            Some(&TagStyle::Style {
                name: "Strong".into(),
                kind: StyleKind::Character,
                tags: vec![TextTag::Bold],
            })
        );
    }
}
