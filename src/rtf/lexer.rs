//! RTF lexer/tokenizer.
//!
//! The lexer is a single forward cursor over the input text. It produces
//! tokens lazily so the interpreter can interleave raw skips (`\bin`
//! payloads, `\uc` fallback characters) with normal tokenization.

use super::error::{RtfError, RtfResult};
use crate::common::encoding::hex_nibble as hex_value;
use tracing::trace;

/// A lexical unit of RTF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opening brace
    GroupOpen,
    /// Closing brace
    GroupClose,
    /// A run of literal ASCII text (never contains CR or LF)
    Text(&'a str),
    /// Control word with optional numeric parameter
    Control {
        name: &'a str,
        param: Option<i32>,
        /// Preceded by the `\*` ignorable-destination marker
        ignorable: bool,
    },
    /// Control symbol: `\` followed by one non-letter (`\n` for an escaped newline)
    Symbol(char),
    /// `\'HH` hex escape
    Hex(u8),
}

/// Result of [`Lexer::skip_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    /// One unit was consumed
    Unit,
    /// A brace is next; nothing was consumed
    Brace,
    /// End of input
    End,
}

/// RTF lexer over a borrowed input string.
pub struct Lexer<'a> {
    /// Source input
    input: &'a str,
    /// Current position in bytes
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset into the input.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unread remainder of the input.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> RtfResult<Option<Token<'a>>> {
        loop {
            let Some(b) = self.peek_byte() else {
                return Ok(None);
            };
            match b {
                b'{' => {
                    self.pos += 1;
                    return Ok(Some(Token::GroupOpen));
                },
                b'}' => {
                    self.pos += 1;
                    return Ok(Some(Token::GroupClose));
                },
                b'\\' => return self.parse_control().map(Some),
                b'\r' | b'\n' => self.pos += 1,
                b if b >= 0x80 => self.skip_non_ascii(),
                _ => return Ok(Some(Token::Text(self.parse_text()))),
            }
        }
    }

    /// Consume exactly one logical unit: one text character, one control
    /// word with its parameter, one control symbol or one hex escape.
    ///
    /// Braces are reported and left in place. Raw newlines and stray
    /// non-ASCII characters are not units and are passed over.
    pub fn skip_unit(&mut self) -> RtfResult<Skipped> {
        loop {
            let Some(b) = self.peek_byte() else {
                return Ok(Skipped::End);
            };
            match b {
                b'{' | b'}' => return Ok(Skipped::Brace),
                b'\\' => {
                    self.parse_control()?;
                    return Ok(Skipped::Unit);
                },
                b'\r' | b'\n' => self.pos += 1,
                b if b >= 0x80 => self.skip_non_ascii(),
                _ => {
                    self.pos += 1;
                    return Ok(Skipped::Unit);
                },
            }
        }
    }

    /// Skip `len` bytes of raw payload (after `\binN`), rounded up to the
    /// next character boundary.
    pub fn skip_bytes(&mut self, len: usize) {
        let mut target = self.pos.saturating_add(len).min(self.input.len());
        while !self.input.is_char_boundary(target) {
            target += 1;
        }
        self.pos = target;
    }

    /// Parse a control word, control symbol or hex escape.
    fn parse_control(&mut self) -> RtfResult<Token<'a>> {
        self.pos += 1; // Skip '\'

        let Some(ch) = self.peek_byte() else {
            return Err(RtfError::BackslashWithoutWord);
        };

        if ch.is_ascii_alphabetic() {
            return Ok(self.parse_word(false));
        }

        match ch {
            b'\'' => {
                self.pos += 1;
                self.parse_hex()
            },
            b'*' => {
                self.pos += 1;
                self.parse_ignorable()
            },
            b'\r' | b'\n' => {
                self.pos += 1;
                Ok(Token::Symbol('\n'))
            },
            c if c.is_ascii_punctuation() => {
                self.pos += 1;
                Ok(Token::Symbol(c as char))
            },
            _ => Err(RtfError::BackslashWithoutWord),
        }
    }

    /// After `\*`: the marker applies to an immediately following control word.
    fn parse_ignorable(&mut self) -> RtfResult<Token<'a>> {
        while matches!(self.peek_byte(), Some(b'\r' | b'\n')) {
            self.pos += 1;
        }
        let bytes = self.input.as_bytes();
        if self.peek_byte() == Some(b'\\')
            && bytes.get(self.pos + 1).is_some_and(u8::is_ascii_alphabetic)
        {
            self.pos += 1;
            return Ok(self.parse_word(true));
        }
        Ok(Token::Symbol('*'))
    }

    /// Parse a control word; the cursor is on its first letter.
    fn parse_word(&mut self, ignorable: bool) -> Token<'a> {
        let start = self.pos;
        while self.peek_byte().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name = &self.input[start..self.pos];
        let param = self.parse_parameter();

        // Skip the optional space delimiter
        if self.peek_byte() == Some(b' ') {
            self.pos += 1;
        }

        Token::Control {
            name,
            param,
            ignorable,
        }
    }

    /// Parse numeric parameter after control word. Out-of-range values saturate.
    fn parse_parameter(&mut self) -> Option<i32> {
        let bytes = self.input.as_bytes();
        let negative = self.peek_byte() == Some(b'-');
        let digits_start = self.pos + usize::from(negative);
        if !bytes.get(digits_start).is_some_and(u8::is_ascii_digit) {
            return None;
        }

        self.pos = digits_start;
        let mut value: i64 = 0;
        while let Some(d) = self.peek_byte().filter(u8::is_ascii_digit) {
            value = (value * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX) + 1);
            self.pos += 1;
        }
        if negative {
            value = -value;
        }
        Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Parse hexadecimal character escape (\'); the cursor is after the quote.
    fn parse_hex(&mut self) -> RtfResult<Token<'a>> {
        let bytes = self.input.as_bytes();
        let hi = bytes.get(self.pos).and_then(|&b| hex_value(b));
        let lo = bytes.get(self.pos + 1).and_then(|&b| hex_value(b));
        match (hi, lo) {
            (Some(hi), Some(lo)) => {
                self.pos += 2;
                Ok(Token::Hex(hi << 4 | lo))
            },
            _ => Err(RtfError::BadHexEscape),
        }
    }

    /// Parse plain text until a special, newline or non-ASCII character.
    fn parse_text(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if matches!(b, b'\\' | b'{' | b'}' | b'\r' | b'\n') || b >= 0x80 {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Skip one non-ASCII character found outside of any escape.
    #[inline]
    fn skip_non_ascii(&mut self) {
        let ch = self.input[self.pos..].chars().next().unwrap_or('\u{FFFD}');
        trace!(position = self.pos, character = %ch.escape_unicode(), "ignoring non-ASCII character");
        self.pos += ch.len_utf8();
    }

    #[inline]
    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> RtfResult<Vec<Token<'_>>> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn word(name: &str, param: Option<i32>) -> Token<'_> {
        Token::Control {
            name,
            param,
            ignorable: false,
        }
    }

    #[test]
    fn test_simple_tokenization() {
        let tokens = tokenize(r"{\rtf1\ansi Hello}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::GroupOpen,
                word("rtf", Some(1)),
                word("ansi", None),
                Token::Text("Hello"),
                Token::GroupClose,
            ]
        );
    }

    #[test]
    fn test_parameters_and_delimiters() {
        let tokens = tokenize(r"\li-720  x\fs24x\b0").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("li", Some(-720)),
                Token::Text(" x"),
                word("fs", Some(24)),
                Token::Text("x"),
                word("b", Some(0)),
            ]
        );
        // A dash without digits is not a parameter
        assert_eq!(tokens_of(r"\ul-"), vec![word("ul", None), Token::Text("-")]);
    }

    fn tokens_of(input: &str) -> Vec<Token<'_>> {
        tokenize(input).unwrap()
    }

    #[test]
    fn test_parameter_saturates() {
        assert_eq!(tokens_of(r"\u99999999999"), vec![word("u", Some(i32::MAX))]);
        assert_eq!(tokens_of(r"\u-99999999999"), vec![word("u", Some(i32::MIN))]);
    }

    #[test]
    fn test_symbols_and_hex() {
        let tokens = tokens_of("\\{\\}\\\\\\~\\'e9\\'C4\\\n");
        assert_eq!(
            tokens,
            vec![
                Token::Symbol('{'),
                Token::Symbol('}'),
                Token::Symbol('\\'),
                Token::Symbol('~'),
                Token::Hex(0xe9),
                Token::Hex(0xc4),
                Token::Symbol('\n'),
            ]
        );
    }

    #[test]
    fn test_ignorable_marker() {
        let tokens = tokens_of(r"{\*\generator Foo;}");
        assert_eq!(
            tokens[1],
            Token::Control {
                name: "generator",
                param: None,
                ignorable: true,
            }
        );
    }

    #[test]
    fn test_newlines_and_non_ascii_ignored() {
        assert_eq!(tokens_of("ab\r\ncd"), vec![Token::Text("ab"), Token::Text("cd")]);
        assert_eq!(tokens_of("a\u{e9}b"), vec![Token::Text("a"), Token::Text("b")]);
    }

    #[test]
    fn test_bad_escapes() {
        assert!(matches!(tokenize("abc\\"), Err(RtfError::BackslashWithoutWord)));
        assert!(matches!(tokenize("\\ x"), Err(RtfError::BackslashWithoutWord)));
        assert!(matches!(tokenize("\\'zz"), Err(RtfError::BadHexEscape)));
        assert!(matches!(tokenize("\\'a"), Err(RtfError::BadHexEscape)));
    }

    #[test]
    fn test_skip_unit() {
        let mut lexer = Lexer::new("ab\\'e9\\par x}");
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Unit);
        assert_eq!(lexer.rest(), "b\\'e9\\par x}");
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Unit);
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Unit);
        assert_eq!(lexer.rest(), "\\par x}");
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Unit);
        assert_eq!(lexer.rest(), "x}");
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Unit);
        assert_eq!(lexer.skip_unit().unwrap(), Skipped::Brace);
        assert_eq!(lexer.rest(), "}");
    }

    #[test]
    fn test_skip_bytes() {
        let mut lexer = Lexer::new("\u{e9}abc");
        lexer.skip_bytes(1);
        assert_eq!(lexer.rest(), "abc");
        lexer.skip_bytes(100);
        assert_eq!(lexer.rest(), "");
    }
}
