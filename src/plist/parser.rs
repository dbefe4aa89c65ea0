//! XML property-list reader.
//!
//! A recursive descent over quick-xml's pull events. Text is never trimmed
//! by the reader, so `<string>` content keeps its whitespace; whitespace
//! between structural elements is skipped here instead.

use super::error::{PlistError, PlistResult};
use super::value::Plist;
use crate::common::xml::resolve_entity;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::trace;

/// Format of `<date>` leaves.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A pull event reduced to what the plist grammar cares about.
#[derive(Debug)]
enum Item {
    Start(String),
    Empty(String),
    End(String),
    Text(String),
    Eof,
}

pub(crate) struct PlistReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> PlistReader<R> {
    pub(crate) fn new(reader: Reader<R>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Read the whole document: a `<plist>` root holding exactly one value.
    pub(crate) fn read_document(mut self) -> PlistResult<Plist> {
        match self.next_structural()? {
            Item::Start(name) if name == "plist" => {},
            Item::Empty(name) if name == "plist" => {
                return Err(PlistError::InvalidStructure(
                    "<plist> element is empty".to_string(),
                ));
            },
            Item::Start(name) | Item::Empty(name) => {
                return Err(PlistError::UnexpectedElement(name));
            },
            _ => {
                return Err(PlistError::InvalidStructure(
                    "document has no <plist> root element".to_string(),
                ));
            },
        }

        let value = match self.next_structural()? {
            Item::Start(name) => self.read_value(name, false)?,
            Item::Empty(name) => self.read_value(name, true)?,
            _ => {
                return Err(PlistError::InvalidStructure(
                    "<plist> element holds no value".to_string(),
                ));
            },
        };

        match self.next_structural()? {
            Item::End(name) if name == "plist" => {},
            _ => {
                return Err(PlistError::InvalidStructure(
                    "<plist> element must hold exactly one value".to_string(),
                ));
            },
        }

        match self.next_structural()? {
            Item::Eof => Ok(value),
            _ => Err(PlistError::InvalidStructure(
                "content after the </plist> end tag".to_string(),
            )),
        }
    }

    fn read_value(&mut self, name: String, empty: bool) -> PlistResult<Plist> {
        trace!(element = %name, "plist value");
        match name.as_str() {
            "dict" if empty => Ok(Plist::Dictionary(BTreeMap::new())),
            "dict" => self.read_dict(),
            "array" if empty => Ok(Plist::Array(Vec::new())),
            "array" => self.read_array(),
            "true" | "false" => {
                if !empty && !self.read_text("boolean")?.trim().is_empty() {
                    return Err(PlistError::invalid_value("boolean", name));
                }
                Ok(Plist::Boolean(name == "true"))
            },
            "string" => Ok(Plist::String(self.leaf_text("string", empty)?)),
            "integer" => {
                let text = self.leaf_text("integer", empty)?;
                parse_integer(text.trim())
                    .map(Plist::Integer)
                    .ok_or_else(|| PlistError::invalid_value("integer", text))
            },
            "real" => {
                let text = self.leaf_text("real", empty)?;
                text.trim()
                    .parse::<f64>()
                    .map(Plist::Real)
                    .map_err(|_| PlistError::invalid_value("real", text))
            },
            "date" => {
                let text = self.leaf_text("date", empty)?;
                parse_date(text.trim())
                    .map(Plist::Date)
                    .ok_or_else(|| PlistError::invalid_value("date", text))
            },
            "data" => {
                let text = self.leaf_text("data", empty)?;
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                STANDARD
                    .decode(compact.as_bytes())
                    .map(Plist::Data)
                    .map_err(|_| PlistError::invalid_value("data", text))
            },
            _ => Err(PlistError::UnexpectedElement(name)),
        }
    }

    fn read_dict(&mut self) -> PlistResult<Plist> {
        let mut dict = BTreeMap::new();
        loop {
            let key = match self.next_structural()? {
                Item::End(name) if name == "dict" => return Ok(Plist::Dictionary(dict)),
                Item::Start(name) if name == "key" => self.read_text("key")?,
                Item::Empty(name) if name == "key" => String::new(),
                Item::Start(name) | Item::Empty(name) => {
                    return Err(PlistError::InvalidStructure(format!(
                        "dictionary value <{name}> is not preceded by a <key>"
                    )));
                },
                _ => return Err(unterminated("dict")),
            };
            let value = match self.next_structural()? {
                Item::Start(name) => self.read_value(name, false)?,
                Item::Empty(name) => self.read_value(name, true)?,
                _ => {
                    return Err(PlistError::InvalidStructure(format!(
                        "key {key:?} has no value"
                    )));
                },
            };
            dict.insert(key, value);
        }
    }

    fn read_array(&mut self) -> PlistResult<Plist> {
        let mut items = Vec::new();
        loop {
            match self.next_structural()? {
                Item::End(name) if name == "array" => return Ok(Plist::Array(items)),
                Item::Start(name) => items.push(self.read_value(name, false)?),
                Item::Empty(name) => items.push(self.read_value(name, true)?),
                _ => return Err(unterminated("array")),
            }
        }
    }

    fn leaf_text(&mut self, element: &'static str, empty: bool) -> PlistResult<String> {
        if empty {
            Ok(String::new())
        } else {
            self.read_text(element)
        }
    }

    /// Collect text up to the end tag of the current leaf.
    fn read_text(&mut self, element: &'static str) -> PlistResult<String> {
        let mut text = String::new();
        loop {
            match self.next_item()? {
                Item::Text(chunk) => text.push_str(&chunk),
                Item::End(_) => return Ok(text),
                Item::Start(name) | Item::Empty(name) => {
                    return Err(PlistError::UnexpectedElement(name));
                },
                Item::Eof => return Err(unterminated(element)),
            }
        }
    }

    /// Next item that is not whitespace-only text.
    fn next_structural(&mut self) -> PlistResult<Item> {
        loop {
            match self.next_item()? {
                Item::Text(text) if text.trim().is_empty() => continue,
                Item::Text(text) => {
                    return Err(PlistError::InvalidStructure(format!(
                        "unexpected text {text:?} between elements"
                    )));
                },
                item => return Ok(item),
            }
        }
    }

    fn next_item(&mut self) -> PlistResult<Item> {
        loop {
            self.buf.clear();
            let item = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => Item::Start(utf8(e.name().as_ref())?.to_string()),
                Event::Empty(e) => Item::Empty(utf8(e.name().as_ref())?.to_string()),
                Event::End(e) => Item::End(utf8(e.name().as_ref())?.to_string()),
                Event::Text(e) => Item::Text(utf8(&e)?.to_string()),
                Event::CData(e) => Item::Text(utf8(&e)?.to_string()),
                Event::GeneralRef(e) => {
                    let name = utf8(&e)?;
                    let ch = resolve_entity(name).ok_or_else(|| {
                        PlistError::InvalidStructure(format!("unknown entity &{name};"))
                    })?;
                    Item::Text(ch.to_string())
                },
                Event::Eof => Item::Eof,
                // Declarations, doctype, comments and processing instructions
                _ => continue,
            };
            return Ok(item);
        }
    }
}

fn utf8(bytes: &[u8]) -> PlistResult<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| PlistError::InvalidStructure(format!("invalid UTF-8: {e}")))
}

fn unterminated(element: &str) -> PlistError {
    PlistError::InvalidStructure(format!("document ended inside <{element}>"))
}

/// Decimal, or hexadecimal with a `0x` prefix. Hex values are read as 64-bit
/// unsigned and stored bit-for-bit.
fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        let value = u64::from_str_radix(hex, 16).ok()? as i64;
        return Some(if negative { value.wrapping_neg() } else { value });
    }
    text.parse::<i64>().ok()
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(text, DATE_FORMAT).ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
