//! Control-word dispatch tables.
//!
//! Every destination kind owns a compile-time `phf` table from control-word
//! name to [`ControlWord`]. An entry fixes how the word's parameter is read,
//! whether pending text is flushed before it runs, and what it does: mutate
//! the destination's state, insert a fixed string, or open a child
//! destination.

use super::attributes::Attributes;
use super::context::ParserContext;
use super::destination::{Destination, DestinationKind};
use super::error::{RtfError, RtfResult};
use std::borrow::Cow;

/// How a control word's numeric parameter is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// The word takes no parameter; any given one is ignored
    None,
    /// A missing parameter defaults to the given value
    Optional(i32),
    /// A missing parameter is a fatal error
    Required,
}

impl Param {
    /// Resolve the parameter actually passed to the action.
    pub fn resolve(self, name: &str, given: Option<i32>) -> RtfResult<i32> {
        match (self, given) {
            (Param::None, _) => Ok(0),
            (Param::Optional(default), given) => Ok(given.unwrap_or(default)),
            (Param::Required, Some(value)) => Ok(value),
            (Param::Required, None) => Err(RtfError::MissingParameter(name.to_string())),
        }
    }
}

/// State mutator run for a control word.
pub type Action<K> = fn(
    &mut K,
    &mut ParserContext<'_>,
    &mut <K as DestinationKind>::State,
    i32,
) -> RtfResult<()>;

/// Builds the child destination a control word opens.
pub type Factory<K> = fn(
    &mut K,
    &mut ParserContext<'_>,
    &<K as DestinationKind>::State,
) -> RtfResult<Box<dyn Destination>>;

/// What a control word does.
pub enum WordKind<K: DestinationKind> {
    /// Run an action with the resolved parameter
    Action(Param, Action<K>),
    /// Insert fixed text, as if it had been typed
    Special(&'static str),
    /// Open a child destination, after an optional action on the parent
    Destination {
        before: Option<Action<K>>,
        factory: Factory<K>,
    },
}

/// One entry of a control-word table.
pub struct ControlWord<K: DestinationKind> {
    pub kind: WordKind<K>,
    /// Flush pending text with the pre-mutation state before running
    pub flush: bool,
}

impl<K: DestinationKind> ControlWord<K> {
    /// A word without a parameter.
    pub const fn flag(action: Action<K>) -> Self {
        Self {
            kind: WordKind::Action(Param::None, action),
            flush: false,
        }
    }

    /// A word whose parameter defaults to `default`.
    pub const fn value(default: i32, action: Action<K>) -> Self {
        Self {
            kind: WordKind::Action(Param::Optional(default), action),
            flush: false,
        }
    }

    /// A word that must carry a parameter.
    pub const fn required(action: Action<K>) -> Self {
        Self {
            kind: WordKind::Action(Param::Required, action),
            flush: false,
        }
    }

    /// A word standing for fixed text.
    pub const fn special(text: &'static str) -> Self {
        Self {
            kind: WordKind::Special(text),
            flush: false,
        }
    }

    /// A word opening a child destination.
    pub const fn destination(factory: Factory<K>) -> Self {
        Self {
            kind: WordKind::Destination {
                before: None,
                factory,
            },
            flush: true,
        }
    }

    /// A word running `before` on the parent, then opening a child destination.
    pub const fn destination_after(before: Action<K>, factory: Factory<K>) -> Self {
        Self {
            kind: WordKind::Destination {
                before: Some(before),
                factory,
            },
            flush: true,
        }
    }

    /// Flush pending text before this word runs.
    pub const fn flush(mut self) -> Self {
        self.flush = true;
        self
    }
}

/// A destination's control-word table.
pub type ControlTable<K> = phf::Map<&'static str, ControlWord<K>>;

/// Character and paragraph formatting word, shared by every destination
/// whose state carries [`Attributes`]. Formatting words always flush.
pub struct FormatWord {
    pub param: Param,
    pub action: fn(&mut Attributes, &mut ParserContext<'_>, i32) -> RtfResult<()>,
}

/// Case-insensitive table lookup.
pub fn lookup<'t, V>(table: &'t phf::Map<&'static str, V>, name: &str) -> Option<&'t V> {
    let key: Cow<'_, str> = if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    };
    table.get(key.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phf::phf_map;

    static WORDS: phf::Map<&'static str, u8> = phf_map! {
        "par" => 1,
        "fonttbl" => 2,
    };

    #[test]
    fn test_param_policies() {
        assert_eq!(Param::None.resolve("plain", Some(5)).unwrap(), 0);
        assert_eq!(Param::Optional(24).resolve("fs", None).unwrap(), 24);
        assert_eq!(Param::Optional(24).resolve("fs", Some(30)).unwrap(), 30);
        assert_eq!(Param::Required.resolve("f", Some(-1)).unwrap(), -1);

        let err = Param::Required.resolve("deff", None).unwrap_err();
        assert!(matches!(err, RtfError::MissingParameter(ref w) if w == "deff"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(lookup(&WORDS, "par"), Some(&1));
        assert_eq!(lookup(&WORDS, "PAR"), Some(&1));
        assert_eq!(lookup(&WORDS, "FontTbl"), Some(&2));
        assert_eq!(lookup(&WORDS, "zzzqq"), None);
    }
}
