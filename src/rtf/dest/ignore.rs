//! Destination whose whole content is discarded.
//!
//! Used for `\*` destinations nobody recognizes and for known destinations
//! that carry nothing we render (`\info`, headers, footers).

use crate::rtf::context::ParserContext;
use crate::rtf::destination::{Destination, DestinationKind, Frame, Outcome};
use crate::rtf::error::RtfResult;

#[derive(Debug, Default)]
pub struct IgnoreDest;

impl IgnoreDest {
    pub fn boxed() -> Box<dyn Destination> {
        Frame::boxed(IgnoreDest, ())
    }
}

impl DestinationKind for IgnoreDest {
    type State = ();

    const NAME: &'static str = "ignore";

    fn ignores_content(&self) -> bool {
        true
    }

    fn text(&mut self, _: &mut ParserContext<'_>, _: &mut (), _: &str) -> RtfResult<()> {
        Ok(())
    }

    // No transcoding: the codepage might not even be supported.
    fn byte(&mut self, _: &mut ParserContext<'_>, _: &mut (), _: u8) -> RtfResult<()> {
        Ok(())
    }

    fn finish(self, _: &mut ParserContext<'_>, _: ()) -> RtfResult<Outcome> {
        Ok(Outcome::Nothing)
    }
}
