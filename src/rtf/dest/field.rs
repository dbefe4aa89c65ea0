//! The `\field` destination and its `\fldinst` child.
//!
//! A field holds an instruction and a pre-rendered result. The result is
//! read like body text but held back; once the field closes, the
//! instruction decides whether the result, a loaded picture or a page
//! number is placed.

use super::document::DocumentDest;
use crate::rtf::attributes::Attributes;
use crate::rtf::context::{Fragment, ParserContext, Placement};
use crate::rtf::control::{self, ControlTable, ControlWord};
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::{DiagnosticKind, RtfResult};
use crate::rtf::field::{Field, FieldType};
use crate::rtf::picture::Picture;
use phf::phf_map;
use std::path::Path;
use tracing::debug;

/// Fields are rendered on a single virtual page.
const PAGE_NUMBER: u32 = 1;

#[derive(Debug, Default)]
pub struct FieldDest {
    instruction: String,
    result: Vec<Fragment>,
}

impl FieldDest {
    /// A field inheriting the surrounding formatting.
    pub fn boxed(state: Attributes) -> Box<dyn Destination> {
        Frame::boxed(FieldDest::default(), state)
    }
}

impl DestinationKind for FieldDest {
    type State = Attributes;

    const NAME: &'static str = "field";

    fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
        control::lookup(&FIELD_WORDS, name)
    }

    fn attributes(state: &mut Attributes) -> Option<&mut Attributes> {
        Some(state)
    }

    fn receive(
        &mut self,
        _: &mut ParserContext<'_>,
        _: &mut Attributes,
        outcome: Outcome,
    ) -> RtfResult<()> {
        match outcome {
            Outcome::Instruction(text) => self.instruction.push_str(&text),
            Outcome::Fragments(fragments) => self.result.extend(fragments),
            Outcome::Picture(picture) => self.result.push(Fragment::Image(picture)),
            Outcome::Nothing => {},
        }
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, state: Attributes) -> RtfResult<Outcome> {
        ctx.discard_pending();
        let Some(field) = Field::parse_instruction(&self.instruction) else {
            return Ok(Outcome::Fragments(self.result));
        };
        debug!(keyword = %field.keyword, "closing field");

        match field.field_type {
            FieldType::IncludePicture => {
                let picture = field.argument.as_deref().and_then(|path| include_picture(ctx, path));
                Ok(Outcome::Fragments(picture.map(Fragment::Image).into_iter().collect()))
            },
            FieldType::Page => Ok(Outcome::Fragments(vec![Fragment::Text {
                text: field.format_number(PAGE_NUMBER),
                tags: state.tags(ctx),
            }])),
            // HYPERLINK included: only the result text is kept, no link object
            _ => Ok(Outcome::Fragments(self.result)),
        }
    }
}

/// Load the picture an INCLUDEPICTURE field names, relative paths against
/// the import base directory.
fn include_picture(ctx: &mut ParserContext<'_>, path: &str) -> Option<Picture> {
    let path = Path::new(path);
    let resolved = match ctx.base_dir() {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    match ctx.codec().load_file(&resolved) {
        Ok(picture) => Some(picture),
        Err(e) => {
            ctx.warn(
                DiagnosticKind::IncludePicture,
                format!("could not include picture {}: {e}", resolved.display()),
            );
            None
        },
    }
}

type Word = ControlWord<FieldDest>;

static FIELD_WORDS: ControlTable<FieldDest> = phf_map! {
    "fldinst" => Word::destination(instruction),
    "fldrslt" => Word::destination(result),
    "fldlock" => Word::flag(nothing),
    "flddirty" => Word::flag(nothing),
    "fldedit" => Word::flag(nothing),
    "fldpriv" => Word::flag(nothing),
};

fn instruction(_: &mut FieldDest, _: &mut ParserContext<'_>, _: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(Frame::boxed(InstructionDest::default(), ()))
}

/// The result reads like the body and inherits the field's formatting.
fn result(_: &mut FieldDest, _: &mut ParserContext<'_>, state: &Attributes) -> RtfResult<Box<dyn Destination>> {
    Ok(Frame::boxed(DocumentDest::new(Placement::Capture), state.clone()))
}

fn nothing(_: &mut FieldDest, _: &mut ParserContext<'_>, _: &mut Attributes, _: i32) -> RtfResult<()> {
    Ok(())
}

/// The `\fldinst` destination: collects the instruction text.
#[derive(Debug, Default)]
pub struct InstructionDest {
    text: String,
}

impl DestinationKind for InstructionDest {
    type State = ();

    const NAME: &'static str = "fldinst";

    fn flush(&mut self, ctx: &mut ParserContext<'_>, _: &mut ()) -> RtfResult<()> {
        self.text.push_str(&ctx.take_pending());
        Ok(())
    }

    fn finish(mut self, ctx: &mut ParserContext<'_>, _: ()) -> RtfResult<Outcome> {
        self.text.push_str(&ctx.take_pending());
        Ok(Outcome::Instruction(self.text))
    }
}
