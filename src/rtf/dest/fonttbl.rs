//! The `\fonttbl` destination.
//!
//! Entries may be flat (`\f0\fswiss Arial;\f1 Times;`) or grouped
//! (`{\f0 Arial;}`). The name runs up to the `;`, or to the brace that ends
//! the entry when the `;` is missing; its bytes are decoded with the entry's
//! own charset.

use crate::common::encoding::charset_to_codepage;
use crate::rtf::context::ParserContext;
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::RtfResult;
use crate::rtf::model::TextModel;
use crate::rtf::tags::{TagStyle, TextTag};
use crate::rtf::types::{Font, FontFamily};
use phf::phf_map;
use tracing::debug;

#[derive(Debug, Default)]
pub struct FontTableDest;

/// The entry being read.
#[derive(Debug, Clone, Default)]
pub struct FontEntry {
    index: Option<i32>,
    family: FontFamily,
    charset: Option<i32>,
    codepage: Option<u32>,
}

impl FontTableDest {
    pub fn boxed() -> Box<dyn Destination> {
        Frame::boxed(FontTableDest, FontEntry::default())
    }

    fn commit(ctx: &mut ParserContext<'_>, entry: &mut FontEntry) {
        let name = ctx.take_pending();
        Self::commit_name(ctx, entry, &name);
    }

    fn commit_name(ctx: &mut ParserContext<'_>, entry: &mut FontEntry, name: &str) {
        let name = name.trim().to_string();
        let entry = std::mem::take(entry);
        let Some(index) = entry.index else {
            debug!(%name, "font entry without an index");
            return;
        };
        ctx.buffer_mut().define_tag(
            &TextTag::Font(index),
            TagStyle::Font {
                name: name.clone(),
                family: entry.family,
                charset: entry.charset,
            },
        );
        ctx.fonts.insert(
            index,
            Font {
                name,
                family: entry.family,
                charset: entry.charset,
                codepage: entry.codepage,
            },
        );
    }
}

impl DestinationKind for FontTableDest {
    type State = FontEntry;

    const NAME: &'static str = "fonttbl";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&FONT_WORDS, name)
    }

    fn codepage(&self, _: &ParserContext<'_>, entry: &FontEntry) -> Option<u32> {
        entry.codepage
    }

    fn text(&mut self, ctx: &mut ParserContext<'_>, entry: &mut FontEntry, text: &str) -> RtfResult<()> {
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

    /// Runs at every brace. A name still pending there belongs to an entry
    /// that ended without `;`.
    fn flush(&mut self, ctx: &mut ParserContext<'_>, entry: &mut FontEntry) -> RtfResult<()> {
        let name = ctx.take_pending();
        if !name.trim().is_empty() {
            Self::commit_name(ctx, entry, &name);
        }
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, _: FontEntry) -> RtfResult<Outcome> {
        ctx.discard_pending();
        Ok(Outcome::Nothing)
    }
}

type Word = ControlWord<FontTableDest>;

static FONT_WORDS: ControlTable<FontTableDest> = phf_map! {
    "f" => Word::required(index),
    "fnil" => Word::flag(family_nil),
    "froman" => Word::flag(family_roman),
    "fswiss" => Word::flag(family_swiss),
    "fmodern" => Word::flag(family_modern),
    "fscript" => Word::flag(family_script),
    "fdecor" => Word::flag(family_decor),
    "ftech" => Word::flag(family_tech),
    "fbidi" => Word::flag(family_bidi),
    "fcharset" => Word::required(charset),
    "cpg" => Word::required(codepage),
};

fn index(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, index: i32) -> RtfResult<()> {
    entry.index = Some(index);
    Ok(())
}

fn set_family(entry: &mut FontEntry, family: FontFamily) -> RtfResult<()> {
    entry.family = family;
    Ok(())
}

fn family_nil(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Nil)
}

fn family_roman(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Roman)
}

fn family_swiss(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Swiss)
}

fn family_modern(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Modern)
}

fn family_script(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Script)
}

fn family_decor(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Decor)
}

fn family_tech(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Tech)
}

fn family_bidi(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, _: i32) -> RtfResult<()> {
    set_family(entry, FontFamily::Bidi)
}

fn charset(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, charset: i32) -> RtfResult<()> {
    entry.charset = Some(charset);
    if entry.codepage.is_none() {
        entry.codepage = charset_to_codepage(charset);
    }
    Ok(())
}

fn codepage(_: &mut FontTableDest, _: &mut ParserContext<'_>, entry: &mut FontEntry, codepage: i32) -> RtfResult<()> {
    entry.codepage = u32::try_from(codepage).ok();
    Ok(())
}
