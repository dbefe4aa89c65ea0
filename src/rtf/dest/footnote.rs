//! Footnotes.
//!
//! A footnote is a document destination whose output goes to the end of the
//! text. The body insertion mark stays in front of the footnote region, so
//! body text read after a footnote still lands before it.

use super::document::DocumentDest;
use crate::rtf::attributes::Attributes;
use crate::rtf::context::{ParserContext, Placement};
use crate::rtf::destination::{Destination, Frame};
use crate::rtf::error::RtfResult;
use crate::rtf::tags::TextTag;

/// Start every footnote on a line of its own.
pub fn separate(
    _: &mut DocumentDest,
    ctx: &mut ParserContext<'_>,
    _: &mut Attributes,
    _: i32,
) -> RtfResult<()> {
    ctx.emit_text(Placement::Footnote, "\n", &[]);
    Ok(())
}

/// Open a footnote that inherits the surrounding formatting.
pub fn open(
    _: &mut DocumentDest,
    _: &mut ParserContext<'_>,
    state: &Attributes,
) -> RtfResult<Box<dyn Destination>> {
    Ok(Frame::boxed(DocumentDest::new(Placement::Footnote), state.clone()))
}

/// `\chftn`: the number of the footnote being read, as superscript.
pub fn number(
    dest: &mut DocumentDest,
    ctx: &mut ParserContext<'_>,
    state: &mut Attributes,
    _: i32,
) -> RtfResult<()> {
    let number = (ctx.footnote_count + 1).to_string();
    let mut tags = state.tags(ctx);
    if !state.superscript {
        tags.retain(|tag| *tag != TextTag::Subscript);
        tags.push(TextTag::Superscript);
    }
    dest.emit(ctx, number, tags);
    Ok(())
}
