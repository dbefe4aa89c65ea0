//! The document body and every destination that reads like it.
//!
//! Footnotes and field results are document destinations too; they differ
//! only in where their output goes.

use super::colortbl::ColorTableDest;
use super::field::FieldDest;
use super::fonttbl::FontTableDest;
use super::footnote;
use super::ignore::IgnoreDest;
use super::picture::PictureDest;
use super::stylesheet::StylesheetDest;
use crate::rtf::attributes::Attributes;
use crate::rtf::context::{Fragment, ParserContext, Placement};
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::{RtfError, RtfResult};
use crate::rtf::langcode::language_code;
use crate::rtf::model::TextModel;
use crate::rtf::tags::{TagStyle, TextTag};
use phf::phf_map;

/// Document-like destination.
#[derive(Debug)]
pub struct DocumentDest {
    placement: Placement,
    /// Output held back when the placement is [`Placement::Capture`]
    captured: Vec<Fragment>,
}

impl DocumentDest {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            captured: Vec::new(),
        }
    }

    /// The document destination at the bottom of the stack.
    pub fn root() -> Box<dyn Destination> {
        Frame::boxed(Self::new(Placement::Body), Attributes::default())
    }

    /// Send formatted text to this destination's placement.
    pub fn emit(&mut self, ctx: &mut ParserContext<'_>, text: String, tags: Vec<TextTag>) {
        if text.is_empty() {
            return;
        }
        define_languages(ctx, &tags);
        match self.placement {
            Placement::Capture => match self.captured.last_mut() {
                Some(Fragment::Text { text: last, tags: last_tags }) if *last_tags == tags => {
                    last.push_str(&text);
                },
                _ => self.captured.push(Fragment::Text { text, tags }),
            },
            placement => ctx.emit_text(placement, &text, &tags),
        }
    }

    fn emit_fragment(&mut self, ctx: &mut ParserContext<'_>, fragment: Fragment) {
        match fragment {
            Fragment::Text { text, tags } => self.emit(ctx, text, tags),
            Fragment::Image(picture) if self.placement == Placement::Capture => {
                self.captured.push(Fragment::Image(picture));
            },
            Fragment::Image(picture) => ctx.emit_image(self.placement, picture),
        }
    }
}

/// Language tags are defined with their ISO code the first time they are used.
fn define_languages(ctx: &mut ParserContext<'_>, tags: &[TextTag]) {
    for tag in tags {
        if let TextTag::Language(id) = *tag
            && !ctx.buffer_mut().is_tag_defined(tag)
            && let Some(code) = language_code(id)
        {
            ctx.buffer_mut().define_tag(tag, TagStyle::Language(code));
        }
    }
}

impl DestinationKind for DocumentDest {
    type State = Attributes;

    const NAME: &'static str = "document";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&DOCUMENT_WORDS, name)
    }

    fn attributes(state: &mut Attributes) -> Option<&mut Attributes> {
        Some(state)
    }

    /// Bytes follow the charset of the font in use.
    fn codepage(&self, ctx: &ParserContext<'_>, state: &Attributes) -> Option<u32> {
        let font = state.font.or(ctx.default_font)?;
        ctx.fonts.get(font)?.codepage
    }

    fn flush(&mut self, ctx: &mut ParserContext<'_>, state: &mut Attributes) -> RtfResult<()> {
        let text = ctx.take_pending();
        if !text.is_empty() {
            let tags = state.tags(ctx);
            self.emit(ctx, text, tags);
        }
        Ok(())
    }

    fn receive(
        &mut self,
        ctx: &mut ParserContext<'_>,
        _state: &mut Attributes,
        outcome: Outcome,
    ) -> RtfResult<()> {
        match outcome {
            Outcome::Fragments(fragments) => {
                for fragment in fragments {
                    self.emit_fragment(ctx, fragment);
                }
            },
            Outcome::Picture(picture) => self.emit_fragment(ctx, Fragment::Image(picture)),
            Outcome::Nothing | Outcome::Instruction(_) => {},
        }
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, _state: Attributes) -> RtfResult<Outcome> {
        match self.placement {
            Placement::Capture => Ok(Outcome::Fragments(self.captured)),
            Placement::Footnote => {
                ctx.footnote_count += 1;
                Ok(Outcome::Nothing)
            },
            Placement::Body => Ok(Outcome::Nothing),
        }
    }
}

type Word = ControlWord<DocumentDest>;

static DOCUMENT_WORDS: ControlTable<DocumentDest> = phf_map! {
    "rtf" => Word::value(1, version),
    "ansi" => Word::flag(ansi),
    "mac" => Word::flag(mac),
    "pc" => Word::flag(pc),
    "pca" => Word::flag(pca),
    "ansicpg" => Word::required(ansi_codepage),
    "deff" => Word::required(default_font),
    "deflang" => Word::required(default_language),

    "par" => Word::special("\n"),
    "sect" => Word::special("\n"),
    "page" => Word::special("\n"),
    "row" => Word::special("\n"),
    "line" => Word::special("\u{2028}"),
    "tab" => Word::special("\t"),
    "cell" => Word::special("\t"),
    "emdash" => Word::special("\u{2014}"),
    "endash" => Word::special("\u{2013}"),
    "emspace" => Word::special("\u{2003}"),
    "enspace" => Word::special("\u{2002}"),
    "qmspace" => Word::special("\u{2005}"),
    "bullet" => Word::special("\u{2022}"),
    "lquote" => Word::special("\u{2018}"),
    "rquote" => Word::special("\u{2019}"),
    "ldblquote" => Word::special("\u{201C}"),
    "rdblquote" => Word::special("\u{201D}"),
    "zwj" => Word::special("\u{200D}"),
    "zwnj" => Word::special("\u{200C}"),
    "zwbo" => Word::special("\u{200B}"),
    "zwnbo" => Word::special("\u{FEFF}"),
    "ltrmark" => Word::special("\u{200E}"),
    "rtlmark" => Word::special("\u{200F}"),

    "chftn" => Word::flag(footnote::number).flush(),
    "shppict" => Word::flag(nothing),

    "fonttbl" => Word::destination(font_table),
    "colortbl" => Word::destination(color_table),
    "stylesheet" => Word::destination(stylesheet),
    "field" => Word::destination(field),
    "pict" => Word::destination(picture),
    "footnote" => Word::destination_after(footnote::separate, footnote::open),

    "info" => Word::destination(ignore),
    "header" => Word::destination(ignore),
    "headerl" => Word::destination(ignore),
    "headerr" => Word::destination(ignore),
    "headerf" => Word::destination(ignore),
    "footer" => Word::destination(ignore),
    "footerl" => Word::destination(ignore),
    "footerr" => Word::destination(ignore),
    "footerf" => Word::destination(ignore),
    "ftnsep" => Word::destination(ignore),
    "ftnsepc" => Word::destination(ignore),
    "ftncn" => Word::destination(ignore),
    "aftnsep" => Word::destination(ignore),
    "aftnsepc" => Word::destination(ignore),
    "aftncn" => Word::destination(ignore),
    "nonshppict" => Word::destination(ignore),
    "xe" => Word::destination(ignore),
    "tc" => Word::destination(ignore),
};

fn version(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &mut Attributes, version: i32) -> RtfResult<()> {
    if version != 1 {
        return Err(RtfError::BadVersion(version));
    }
    Ok(())
}

fn ansi(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    ctx.default_codepage = 1252;
    Ok(())
}

fn mac(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    ctx.default_codepage = 10000;
    Ok(())
}

fn pc(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    ctx.default_codepage = 437;
    Ok(())
}

fn pca(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    ctx.default_codepage = 850;
    Ok(())
}

fn ansi_codepage(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, codepage: i32) -> RtfResult<()> {
    ctx.codepage = u32::try_from(codepage).ok();
    Ok(())
}

fn default_font(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, font: i32) -> RtfResult<()> {
    ctx.default_font = Some(font);
    Ok(())
}

fn default_language(_: &mut DocumentDest, ctx: &mut ParserContext<'_>, _: &mut Attributes, language: i32) -> RtfResult<()> {
    ctx.default_language = Some(language);
    Ok(())
}

fn nothing(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    Ok(())
}

fn font_table(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(FontTableDest::boxed())
}

fn color_table(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(ColorTableDest::boxed())
}

fn stylesheet(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(StylesheetDest::boxed())
}

fn field(_: &mut DocumentDest, _: &mut ParserContext<'_>, state: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(FieldDest::boxed(state.clone()))
}

fn picture(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(PictureDest::boxed())
}

fn ignore(_: &mut DocumentDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(IgnoreDest::boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;

    #[test]
    fn test_capture_merges_equal_formatting() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut dest = DocumentDest::new(Placement::Capture);
        dest.emit(&mut ctx, "ab".into(), vec![TextTag::Bold]);
        dest.emit(&mut ctx, "cd".into(), vec![TextTag::Bold]);
        dest.emit(&mut ctx, "ef".into(), vec![]);

        let Outcome::Fragments(fragments) = dest.finish(&mut ctx, Attributes::default()).unwrap() else {
            panic!("capture must return fragments");
        };
        assert_eq!(
            fragments,
            vec![
                Fragment::Text { text: "abcd".into(), tags: vec![TextTag::Bold] },
                Fragment::Text { text: "ef".into(), tags: vec![] },
            ]
        );
    }

    #[test]
    fn test_language_tags_are_defined() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut dest = DocumentDest::new(Placement::Body);
        dest.emit(&mut ctx, "hello".into(), vec![TextTag::Language(1033)]);
        let (buffer, _) = ctx.into_output();
        assert_eq!(
            buffer.definition(&TextTag::Language(1033)),
            Some(&TagStyle::Language("en-US"))
        );
    }

    #[test]
    fn test_version_must_be_one() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut dest = DocumentDest::new(Placement::Body);
        let mut state = Attributes::default();
        assert!(version(&mut dest, &mut ctx, &mut state, 1).is_ok());
        assert!(matches!(
            version(&mut dest, &mut ctx, &mut state, 2),
            Err(RtfError::BadVersion(2))
        ));
    }
}
