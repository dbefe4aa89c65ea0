//! The destination-stack interpreter.
//!
//! The parser pulls tokens from the [`Lexer`] and routes them to the active
//! destination. Braces push and pop that destination's state; a control word
//! may open a child destination, which is closed again once the brace depth
//! drops below the level it was opened at. The document destination sits at
//! the bottom and is never closed.

use super::context::ParserContext;
use super::dest::{DocumentDest, IgnoreDest};
use super::destination::{Destination, Dispatch};
use super::error::{Diagnostic, DiagnosticKind, RtfError, RtfResult};
use super::lexer::{Lexer, Skipped, Token};
use super::model::TextBuffer;
use tracing::{debug, trace};

/// A destination opened by a control word.
struct Entry {
    /// Brace depth at which the destination was opened
    level: usize,
    dest: Box<dyn Destination>,
}

/// RTF Parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    ctx: ParserContext<'a>,
    /// The document destination
    root: Box<dyn Destination>,
    /// Destinations opened on top of the document, innermost last
    children: Vec<Entry>,
    /// Current brace depth
    depth: usize,
    /// `\uc` fallback length, scoped per group
    skip_counts: Vec<usize>,
    /// First half of a UTF-16 pair written as two `\u` words
    high_surrogate: Option<u16>,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(input: &'a str, ctx: ParserContext<'a>) -> Self {
        Self {
            lexer: Lexer::new(input),
            ctx,
            root: DocumentDest::root(),
            children: Vec::new(),
            depth: 0,
            skip_counts: vec![1],
            high_surrogate: None,
        }
    }

    /// Interpret the whole input.
    pub fn run(&mut self) -> RtfResult<()> {
        if !self.lexer.rest().starts_with("{\\rtf") {
            return Err(RtfError::NotRtf);
        }

        while let Some(token) = self.lexer.next_token()? {
            let high_surrogate = self.high_surrogate.take();
            match token {
                Token::GroupOpen => self.open_group()?,
                Token::GroupClose => {
                    if self.close_group()? {
                        return self.check_trailing();
                    }
                },
                Token::Text(text) => {
                    let (dest, ctx) = self.active();
                    dest.text(ctx, text)?;
                },
                Token::Control { name, param, .. } if name.eq_ignore_ascii_case("u") => {
                    self.unicode(param, high_surrogate)?;
                },
                Token::Control {
                    name,
                    param,
                    ignorable,
                } => self.control(name, param, ignorable)?,
                Token::Symbol(symbol) => self.symbol(symbol)?,
                Token::Hex(byte) => {
                    let (dest, ctx) = self.active();
                    dest.byte(ctx, byte)?;
                },
            }
        }

        Err(RtfError::UnexpectedEnd)
    }

    /// Number of destinations on the stack, the document included.
    pub fn destination_depth(&self) -> usize {
        self.children.len() + 1
    }

    /// Number of states on the active destination's stack.
    pub fn state_depth(&self) -> usize {
        match self.children.last() {
            Some(entry) => entry.dest.state_depth(),
            None => self.root.state_depth(),
        }
    }

    /// Hand over the output of a successful run.
    pub fn into_output(self) -> (TextBuffer, Vec<Diagnostic>) {
        self.ctx.into_output()
    }

    /// The active destination together with the context it works on.
    fn active(&mut self) -> (&mut (dyn Destination + 'static), &mut ParserContext<'a>) {
        let dest = match self.children.last_mut() {
            Some(entry) => entry.dest.as_mut(),
            None => self.root.as_mut(),
        };
        (dest, &mut self.ctx)
    }

    fn open_group(&mut self) -> RtfResult<()> {
        let (dest, ctx) = self.active();
        dest.flush(ctx)?;
        dest.push_state();

        self.depth += 1;
        let skip = self.skip_counts.last().copied().unwrap_or(1);
        self.skip_counts.push(skip);
        Ok(())
    }

    /// Close a group. Returns `true` once the outermost group has closed.
    fn close_group(&mut self) -> RtfResult<bool> {
        let (dest, ctx) = self.active();
        dest.flush(ctx)?;
        dest.pop_state();

        self.depth = self.depth.saturating_sub(1);
        if self.skip_counts.len() > 1 {
            self.skip_counts.pop();
        }

        // The brace that closes a destination also closes a scope of its parent
        while self.children.last().is_some_and(|entry| self.depth < entry.level) {
            let Some(entry) = self.children.pop() else {
                break;
            };
            debug!(destination = entry.dest.name(), depth = self.depth, "closing destination");
            let outcome = entry.dest.finish(&mut self.ctx)?;
            let (parent, ctx) = self.active();
            parent.receive(ctx, outcome)?;
            parent.flush(ctx)?;
            parent.pop_state();
        }

        Ok(self.depth == 0)
    }

    /// Only whitespace may follow the final brace.
    fn check_trailing(&self) -> RtfResult<()> {
        match self
            .lexer
            .rest()
            .find(|c: char| !c.is_whitespace() && c != '\0')
        {
            Some(offset) => Err(RtfError::TrailingContent(self.lexer.position() + offset)),
            None => Ok(()),
        }
    }

    fn control(&mut self, name: &str, param: Option<i32>, ignorable: bool) -> RtfResult<()> {
        if name.eq_ignore_ascii_case("uc") {
            let count = param.unwrap_or(1).max(0) as usize;
            if let Some(top) = self.skip_counts.last_mut() {
                *top = count;
            }
            return Ok(());
        }
        if name.eq_ignore_ascii_case("bin") {
            if let Some(len) = param.filter(|&len| len > 0) {
                self.lexer.skip_bytes(len as usize);
            }
            return Ok(());
        }

        let (dest, ctx) = self.active();
        match dest.control(ctx, name, param)? {
            Dispatch::Done => {},
            Dispatch::Push(child) => {
                debug!(destination = child.name(), depth = self.depth, "opening destination");
                self.children.push(Entry {
                    level: self.depth,
                    dest: child,
                });
            },
            Dispatch::Unknown if ignorable => {
                debug!(word = name, depth = self.depth, "skipping unknown destination");
                self.children.push(Entry {
                    level: self.depth,
                    dest: IgnoreDest::boxed(),
                });
            },
            Dispatch::Unknown => trace!(word = name, "ignoring unknown control word"),
        }
        Ok(())
    }

    /// `\uN`: one UTF-16 code unit, followed by `\uc` fallback units to skip.
    fn unicode(&mut self, param: Option<i32>, high_surrogate: Option<u16>) -> RtfResult<()> {
        let Some(value) = param else {
            return Err(RtfError::MissingParameter("u".to_string()));
        };
        // Values above 32767 are written as negative numbers
        let unit = value.rem_euclid(0x10000) as u16;

        let ch = match (high_surrogate, unit) {
            (Some(high), 0xDC00..=0xDFFF) => char::decode_utf16([high, unit]).next().and_then(Result::ok),
            (_, 0xD800..=0xDBFF) => {
                self.high_surrogate = Some(unit);
                None
            },
            (_, 0xDC00..=0xDFFF) => {
                self.ctx.warn(
                    DiagnosticKind::InvalidCharacter,
                    format!("unpaired surrogate \\u{value}"),
                );
                None
            },
            (_, unit) => char::from_u32(u32::from(unit)),
        };

        let (dest, ctx) = self.active();
        if let Some(ch) = ch
            && !dest.ignores_content()
        {
            dest.text(ctx, ch.encode_utf8(&mut [0; 4]))?;
        }

        let skip = self.skip_counts.last().copied().unwrap_or(1);
        for _ in 0..skip {
            if self.lexer.skip_unit()? != Skipped::Unit {
                break;
            }
        }
        Ok(())
    }

    fn symbol(&mut self, symbol: char) -> RtfResult<()> {
        let text = match symbol {
            '\\' => "\\",
            '{' => "{",
            '}' => "}",
            '~' => "\u{A0}",
            '-' => "\u{AD}",
            '_' => "\u{2011}",
            // Escaped newline
            '\n' => return self.control("par", None, false),
            _ => {
                trace!(%symbol, "ignoring control symbol");
                return Ok(());
            },
        };
        let (dest, ctx) = self.active();
        dest.text(ctx, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;
    use crate::rtf::tags::TextTag;

    fn parse(input: &str) -> RtfResult<TextBuffer> {
        let mut parser = Parser::new(input, ParserContext::new(&BuiltinCodec, None));
        parser.run()?;
        assert_eq!(parser.destination_depth(), 1);
        assert_eq!(parser.state_depth(), 1);
        Ok(parser.into_output().0)
    }

    #[test]
    fn test_stacks_balance_after_nested_destinations() {
        let input = r"{\rtf1{\fonttbl{\f0 Arial;}{\f1 Times;}}{\colortbl;\red255\green0\blue0;}{\b{\i x}{\field{\*\fldinst PAGE}{\fldrslt 9}}}}";
        let buffer = parse(input).unwrap();
        assert_eq!(buffer.text(), "x1");
    }

    #[test]
    fn test_parent_scope_restored_after_destination() {
        let buffer = parse(r"{\rtf1\b{\fonttbl\f0 Arial;}bold\b0 plain}").unwrap();
        assert_eq!(buffer.text(), "boldplain");
        assert_eq!(buffer.tag_ranges(&TextTag::Bold), &[0..4]);
    }

    #[test]
    fn test_unicode_fallback_is_skipped() {
        let buffer = parse(r"{\rtf1 a\u233?b\uc2\u20013\'80\'80c{\uc0\u8364 }d}").unwrap();
        assert_eq!(buffer.text(), "a\u{e9}b\u{4e2d}c\u{20ac}d");
    }

    #[test]
    fn test_negative_unicode_and_surrogates() {
        let buffer = parse(r"{\rtf1\u-3913?\u55357?\u56832?}").unwrap();
        assert_eq!(buffer.text(), "\u{F0B7}\u{1F600}");
    }

    #[test]
    fn test_unpaired_surrogate_is_dropped() {
        let mut parser = Parser::new(r"{\rtf1 a\u56832?b}", ParserContext::new(&BuiltinCodec, None));
        parser.run().unwrap();
        let (buffer, diagnostics) = parser.into_output();
        assert_eq!(buffer.text(), "ab");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidCharacter);
    }

    #[test]
    fn test_fallback_stops_at_brace() {
        let buffer = parse(r"{\rtf1\uc3\u233{x}}").unwrap();
        assert_eq!(buffer.text(), "éx");
    }

    #[test]
    fn test_binary_payload_is_skipped() {
        let buffer = parse("{\\rtf1 a{\\*\\blob\\bin4 }{}\\}b}").unwrap();
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_control_symbols() {
        let buffer = parse("{\\rtf1 a\\~b\\-c\\_d\\\\\\{\\}\\\ne}").unwrap();
        assert_eq!(buffer.text(), "a\u{A0}b\u{AD}c\u{2011}d\\{}\ne");
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(parse(""), Err(RtfError::NotRtf)));
        assert!(matches!(parse("hello"), Err(RtfError::NotRtf)));
        assert!(matches!(parse(r"{\rtf1 open"), Err(RtfError::UnexpectedEnd)));
        assert!(matches!(parse(r"{\rtf1{\b x}"), Err(RtfError::UnexpectedEnd)));
        assert!(matches!(
            parse("{\\rtf1 x}  y"),
            Err(RtfError::TrailingContent(11))
        ));
        assert!(matches!(parse(r"{\rtf1 \'zz}"), Err(RtfError::BadHexEscape)));
        assert!(matches!(parse(r"{\rtf1 \u}"), Err(RtfError::MissingParameter(_))));
        assert!(parse("{\\rtf1 x}\r\n\0").is_ok());
    }

    #[test]
    fn test_hex_bytes_in_ignored_destination_need_no_codepage() {
        let buffer = parse(r"{\rtf1\ansicpg99999{\*\unknown \'c3\'a9}ok}").unwrap();
        assert_eq!(buffer.text(), "ok");
        assert!(matches!(
            parse(r"{\rtf1\ansicpg99999\ansi x\'e9}"),
            Ok(ref b) if b.text() == "xé"
        ));
    }
}
