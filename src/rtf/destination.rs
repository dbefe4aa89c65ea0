//! Destinations and their state stacks.
//!
//! A destination is the semantic context the parser is reading: the body,
//! the font table, a picture, a field instruction. Each concrete kind
//! implements [`DestinationKind`]; [`Frame`] wraps a kind together with its
//! stack of brace-scoped states and exposes it to the parser through the
//! object-safe [`Destination`] trait.

use super::attributes::{Attributes, FORMATTING};
use super::charset::resolve_charset;
use super::context::{Fragment, ParserContext};
use super::control::{self, ControlWord, WordKind};
use super::error::RtfResult;
use super::picture::Picture;

/// What a closed destination hands to its parent.
#[derive(Debug)]
pub enum Outcome {
    Nothing,
    /// Field instruction text
    Instruction(String),
    /// Formatted output held back for the parent to place
    Fragments(Vec<Fragment>),
    Picture(Picture),
}

/// Result of dispatching a control word.
pub enum Dispatch {
    /// The word was handled
    Done,
    /// The word opened a child destination
    Push(Box<dyn Destination>),
    /// No table knows the word
    Unknown,
}

/// A destination on the parser's stack.
pub trait Destination {
    fn name(&self) -> &'static str;

    /// Duplicate the current state on `{`.
    fn push_state(&mut self);

    /// Restore the enclosing state on `}`. The base state is never removed.
    fn pop_state(&mut self);

    /// Number of states on the stack, the current one included.
    fn state_depth(&self) -> usize;

    /// Whether everything inside the destination is discarded.
    fn ignores_content(&self) -> bool;

    /// Deliver pending text according to the destination's semantics.
    fn flush(&mut self, ctx: &mut ParserContext<'_>) -> RtfResult<()>;

    fn text(&mut self, ctx: &mut ParserContext<'_>, text: &str) -> RtfResult<()>;

    /// Handle one byte of a `\'HH` escape.
    fn byte(&mut self, ctx: &mut ParserContext<'_>, byte: u8) -> RtfResult<()>;

    fn control(
        &mut self,
        ctx: &mut ParserContext<'_>,
        name: &str,
        param: Option<i32>,
    ) -> RtfResult<Dispatch>;

    /// Accept the outcome of a child destination that just closed.
    fn receive(&mut self, ctx: &mut ParserContext<'_>, outcome: Outcome) -> RtfResult<()>;

    /// Close the destination.
    fn finish(self: Box<Self>, ctx: &mut ParserContext<'_>) -> RtfResult<Outcome>;
}

/// A concrete kind of destination.
///
/// The kind holds data that lives as long as the destination; its `State`
/// is scoped by braces and cloned on every `{`.
pub trait DestinationKind: Sized + 'static {
    type State: Clone;

    const NAME: &'static str;

    /// The kind's own control word, if it has one by that name.
    fn lookup(_name: &str) -> Option<&'static ControlWord<Self>> {
        None
    }

    /// The formatting attributes inside the state, for kinds that accept
    /// character and paragraph formatting words.
    fn attributes(_state: &mut Self::State) -> Option<&mut Attributes> {
        None
    }

    fn ignores_content(&self) -> bool {
        false
    }

    /// Codepage that takes precedence over the document's.
    fn codepage(&self, _ctx: &ParserContext<'_>, _state: &Self::State) -> Option<u32> {
        None
    }

    /// Codepage used when the document declares none.
    fn default_codepage(&self) -> Option<u32> {
        None
    }

    fn text(
        &mut self,
        ctx: &mut ParserContext<'_>,
        _state: &mut Self::State,
        text: &str,
    ) -> RtfResult<()> {
        ctx.push_text(text);
        Ok(())
    }

    fn byte(&mut self, ctx: &mut ParserContext<'_>, state: &mut Self::State, byte: u8) -> RtfResult<()> {
        let charset = resolve_charset([
            self.codepage(ctx, state),
            ctx.codepage,
            self.default_codepage(),
            Some(ctx.default_codepage),
        ])?;
        ctx.push_byte(charset, byte);
        Ok(())
    }

    fn flush(&mut self, ctx: &mut ParserContext<'_>, _state: &mut Self::State) -> RtfResult<()> {
        ctx.discard_pending();
        Ok(())
    }

    fn receive(
        &mut self,
        _ctx: &mut ParserContext<'_>,
        _state: &mut Self::State,
        _outcome: Outcome,
    ) -> RtfResult<()> {
        Ok(())
    }

    fn finish(self, ctx: &mut ParserContext<'_>, state: Self::State) -> RtfResult<Outcome>;
}

/// A destination kind with its state stack.
pub struct Frame<K: DestinationKind> {
    kind: K,
    current: K::State,
    saved: Vec<K::State>,
}

impl<K: DestinationKind> Frame<K> {
    pub fn new(kind: K, state: K::State) -> Self {
        Self {
            kind,
            current: state,
            saved: Vec::new(),
        }
    }

    /// Box a new frame for the parser's stack.
    pub fn boxed(kind: K, state: K::State) -> Box<dyn Destination> {
        Box::new(Self::new(kind, state))
    }

    fn run(
        &mut self,
        ctx: &mut ParserContext<'_>,
        word: &'static ControlWord<K>,
        name: &str,
        param: Option<i32>,
    ) -> RtfResult<Dispatch> {
        match word.kind {
            WordKind::Action(policy, action) => {
                let value = policy.resolve(name, param)?;
                if word.flush {
                    self.kind.flush(ctx, &mut self.current)?;
                }
                action(&mut self.kind, ctx, &mut self.current, value)?;
                Ok(Dispatch::Done)
            },
            WordKind::Special(text) => {
                if word.flush {
                    self.kind.flush(ctx, &mut self.current)?;
                }
                self.kind.text(ctx, &mut self.current, text)?;
                Ok(Dispatch::Done)
            },
            WordKind::Destination { before, factory } => {
                self.kind.flush(ctx, &mut self.current)?;
                if let Some(before) = before {
                    before(&mut self.kind, ctx, &mut self.current, 0)?;
                }
                let child = factory(&mut self.kind, ctx, &self.current)?;
                Ok(Dispatch::Push(child))
            },
        }
    }
}

impl<K: DestinationKind> Destination for Frame<K> {
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn push_state(&mut self) {
        self.saved.push(self.current.clone());
    }

    fn pop_state(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    fn state_depth(&self) -> usize {
        self.saved.len() + 1
    }

    fn ignores_content(&self) -> bool {
        self.kind.ignores_content()
    }

    fn flush(&mut self, ctx: &mut ParserContext<'_>) -> RtfResult<()> {
        self.kind.flush(ctx, &mut self.current)
    }

    fn text(&mut self, ctx: &mut ParserContext<'_>, text: &str) -> RtfResult<()> {
        self.kind.text(ctx, &mut self.current, text)
    }

    fn byte(&mut self, ctx: &mut ParserContext<'_>, byte: u8) -> RtfResult<()> {
        self.kind.byte(ctx, &mut self.current, byte)
    }

    fn control(
        &mut self,
        ctx: &mut ParserContext<'_>,
        name: &str,
        param: Option<i32>,
    ) -> RtfResult<Dispatch> {
        if let Some(word) = K::lookup(name) {
            return self.run(ctx, word, name, param);
        }
        if K::attributes(&mut self.current).is_some()
            && let Some(word) = control::lookup(&FORMATTING, name)
        {
            let value = word.param.resolve(name, param)?;
            self.kind.flush(ctx, &mut self.current)?;
            if let Some(attributes) = K::attributes(&mut self.current) {
                (word.action)(attributes, ctx, value)?;
            }
            return Ok(Dispatch::Done);
        }
        Ok(Dispatch::Unknown)
    }

    fn receive(&mut self, ctx: &mut ParserContext<'_>, outcome: Outcome) -> RtfResult<()> {
        self.kind.receive(ctx, &mut self.current, outcome)
    }

    fn finish(self: Box<Self>, ctx: &mut ParserContext<'_>) -> RtfResult<Outcome> {
        let Frame { kind, current, .. } = *self;
        kind.finish(ctx, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;

    /// Counts `\x` words; its state is the running count.
    struct Counter;

    static COUNTER_WORDS: control::ControlTable<Counter> = phf::phf_map! {
        "x" => ControlWord::value(1, add),
    };

    fn add(_: &mut Counter, _: &mut ParserContext<'_>, count: &mut i32, step: i32) -> RtfResult<()> {
        *count += step;
        Ok(())
    }

    impl DestinationKind for Counter {
        type State = i32;
        const NAME: &'static str = "counter";

        fn lookup(name: &str) -> Option<&'static ControlWord<Self>> {
            control::lookup(&COUNTER_WORDS, name)
        }

        fn finish(self, _ctx: &mut ParserContext<'_>, state: i32) -> RtfResult<Outcome> {
            Ok(Outcome::Instruction(state.to_string()))
        }
    }

    #[test]
    fn test_states_are_scoped() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut frame = Frame::new(Counter, 0);

        frame.control(&mut ctx, "x", None).unwrap();
        frame.push_state();
        frame.control(&mut ctx, "X", Some(10)).unwrap();
        assert_eq!(frame.state_depth(), 2);
        assert_eq!(frame.current, 11);
        frame.pop_state();
        frame.pop_state();
        assert_eq!(frame.state_depth(), 1);
        assert_eq!(frame.current, 1);

        assert!(matches!(
            frame.control(&mut ctx, "b", None).unwrap(),
            Dispatch::Unknown
        ));
        let outcome = Box::new(frame).finish(&mut ctx).unwrap();
        assert!(matches!(outcome, Outcome::Instruction(ref s) if s == "1"));
    }
}
