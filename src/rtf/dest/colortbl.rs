//! The `\colortbl` destination.
//!
//! Entries are `\redN\greenN\blueN;`; an entry without components is the
//! automatic color, taken as black. When the table closes, one foreground
//! and one background tag is defined per color.

use crate::rtf::context::ParserContext;
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::RtfResult;
use crate::rtf::model::TextModel;
use crate::rtf::tags::{TagStyle, TextTag};
use crate::rtf::types::Color;
use phf::phf_map;

#[derive(Debug, Default)]
pub struct ColorTableDest;

/// Components of the entry being read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorEntry {
    red: u8,
    green: u8,
    blue: u8,
}

impl ColorTableDest {
    pub fn boxed() -> Box<dyn Destination> {
        Frame::boxed(ColorTableDest, ColorEntry::default())
    }
}

impl DestinationKind for ColorTableDest {
    type State = ColorEntry;

    const NAME: &'static str = "colortbl";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&COLOR_WORDS, name)
    }

    fn text(&mut self, ctx: &mut ParserContext<'_>, entry: &mut ColorEntry, text: &str) -> RtfResult<()> {
        for _ in text.matches(';') {
            ctx.colors.add(Color::new(entry.red, entry.green, entry.blue));
            *entry = ColorEntry::default();
        }
        Ok(())
    }

    fn byte(&mut self, _: &mut ParserContext<'_>, _: &mut ColorEntry, _: u8) -> RtfResult<()> {
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, _: ColorEntry) -> RtfResult<Outcome> {
        ctx.discard_pending();
        let colors = ctx.colors.colors().to_vec();
        let buffer = ctx.buffer_mut();
        for (index, color) in (0..).zip(colors) {
            buffer.define_tag(&TextTag::Foreground(index), TagStyle::Color(color));
            buffer.define_tag(&TextTag::Background(index), TagStyle::Color(color));
        }
        Ok(Outcome::Nothing)
    }
}

type Word = ControlWord<ColorTableDest>;

static COLOR_WORDS: ControlTable<ColorTableDest> = phf_map! {
    "red" => Word::required(red).flush(),
    "green" => Word::required(green).flush(),
    "blue" => Word::required(blue).flush(),
};

fn component(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn red(_: &mut ColorTableDest, _: &mut ParserContext<'_>, entry: &mut ColorEntry, value: i32) -> RtfResult<()> {
    entry.red = component(value);
    Ok(())
}

fn green(_: &mut ColorTableDest, _: &mut ParserContext<'_>, entry: &mut ColorEntry, value: i32) -> RtfResult<()> {
    entry.green = component(value);
    Ok(())
}

fn blue(_: &mut ColorTableDest, _: &mut ParserContext<'_>, entry: &mut ColorEntry, value: i32) -> RtfResult<()> {
    entry.blue = component(value);
    Ok(())
}
