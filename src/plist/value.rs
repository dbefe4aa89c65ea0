//! The property-list value tree.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A property-list node.
///
/// Dictionaries keep their keys sorted, which is also the order the writer
/// emits them in.
#[derive(Debug, Clone, PartialEq)]
pub enum Plist {
    Dictionary(BTreeMap<String, Plist>),
    Array(Vec<Plist>),
    String(String),
    Integer(i64),
    Real(f64),
    Date(DateTime<Utc>),
    Data(Vec<u8>),
    Boolean(bool),
}

/// One step of a lookup path: a dictionary key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl<'a> From<&'a String> for PathSegment<'a> {
    fn from(key: &'a String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl Plist {
    /// Element name this node is written as.
    pub fn element_name(&self) -> &'static str {
        match self {
            Plist::Dictionary(_) => "dict",
            Plist::Array(_) => "array",
            Plist::String(_) => "string",
            Plist::Integer(_) => "integer",
            Plist::Real(_) => "real",
            Plist::Date(_) => "date",
            Plist::Data(_) => "data",
            Plist::Boolean(true) => "true",
            Plist::Boolean(false) => "false",
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, Plist>> {
        match self {
            Plist::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut BTreeMap<String, Plist>> {
        match self {
            Plist::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Plist]> {
        match self {
            Plist::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Plist>> {
        match self {
            Plist::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Plist::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Plist::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Plist::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Plist::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Plist::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Plist::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Follow a path of dictionary keys and array indices.
    ///
    /// Returns a borrow of the node the path ends at, or `None` when a key is
    /// absent, an index is out of range, or a segment does not fit the kind
    /// of node it is applied to. An empty path returns `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cartouche::plist::{PathSegment, Plist};
    ///
    /// let plist: Plist = "<plist version=\"1.0\"><dict><key>a</key>\
    ///     <array><integer>7</integer></array></dict></plist>".parse()?;
    /// let seven = plist.lookup(&[PathSegment::Key("a"), PathSegment::Index(0)]);
    /// assert_eq!(seven, Some(&Plist::Integer(7)));
    /// assert_eq!(plist.lookup(&[PathSegment::Index(0)]), None);
    /// # Ok::<(), cartouche::plist::PlistError>(())
    /// ```
    pub fn lookup(&self, path: &[PathSegment<'_>]) -> Option<&Plist> {
        path.iter().try_fold(self, |node, segment| node.child(segment))
    }

    /// Mutable variant of [`Plist::lookup`].
    pub fn lookup_mut(&mut self, path: &[PathSegment<'_>]) -> Option<&mut Plist> {
        path.iter()
            .try_fold(self, |node, segment| node.child_mut(segment))
    }

    fn child(&self, segment: &PathSegment<'_>) -> Option<&Plist> {
        match (self, segment) {
            (Plist::Dictionary(dict), PathSegment::Key(key)) => dict.get(*key),
            (Plist::Array(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    fn child_mut(&mut self, segment: &PathSegment<'_>) -> Option<&mut Plist> {
        match (self, segment) {
            (Plist::Dictionary(dict), PathSegment::Key(key)) => dict.get_mut(*key),
            (Plist::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        }
    }
}

impl From<&str> for Plist {
    fn from(s: &str) -> Self {
        Plist::String(s.to_string())
    }
}

impl From<String> for Plist {
    fn from(s: String) -> Self {
        Plist::String(s)
    }
}

impl From<i64> for Plist {
    fn from(n: i64) -> Self {
        Plist::Integer(n)
    }
}

impl From<f64> for Plist {
    fn from(r: f64) -> Self {
        Plist::Real(r)
    }
}

impl From<bool> for Plist {
    fn from(b: bool) -> Self {
        Plist::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Plist {
    fn from(date: DateTime<Utc>) -> Self {
        Plist::Date(date)
    }
}

impl From<Vec<u8>> for Plist {
    fn from(bytes: Vec<u8>) -> Self {
        Plist::Data(bytes)
    }
}

impl From<Vec<Plist>> for Plist {
    fn from(items: Vec<Plist>) -> Self {
        Plist::Array(items)
    }
}

impl From<BTreeMap<String, Plist>> for Plist {
    fn from(dict: BTreeMap<String, Plist>) -> Self {
        Plist::Dictionary(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plist {
        let mut inner = BTreeMap::new();
        inner.insert("name".to_string(), Plist::from("inner"));
        let mut root = BTreeMap::new();
        root.insert(
            "list".to_string(),
            Plist::Array(vec![Plist::from(1), Plist::Dictionary(inner)]),
        );
        root.insert("flag".to_string(), Plist::from(true));
        Plist::Dictionary(root)
    }

    #[test]
    fn test_lookup_nested() {
        let plist = sample();
        let path = [
            PathSegment::from("list"),
            PathSegment::from(1),
            PathSegment::from("name"),
        ];
        assert_eq!(
            plist.lookup(&path).and_then(Plist::as_string),
            Some("inner")
        );
        assert_eq!(plist.lookup(&[]), Some(&plist));
    }

    #[test]
    fn test_lookup_missing_or_mistyped() {
        let plist = sample();
        assert_eq!(plist.lookup(&[PathSegment::Key("nope")]), None);
        assert_eq!(plist.lookup(&[PathSegment::Key("list"), PathSegment::Index(2)]), None);
        assert_eq!(plist.lookup(&[PathSegment::Key("flag"), PathSegment::Key("x")]), None);
        assert_eq!(plist.lookup(&[PathSegment::Index(0)]), None);
    }

    #[test]
    fn test_lookup_mut_aliases_tree() {
        let mut plist = sample();
        if let Some(node) = plist.lookup_mut(&[PathSegment::Key("list"), PathSegment::Index(0)]) {
            *node = Plist::from(42);
        }
        assert_eq!(
            plist
                .lookup(&[PathSegment::Key("list"), PathSegment::Index(0)])
                .and_then(Plist::as_integer),
            Some(42)
        );
    }

    #[test]
    fn test_macro_lookup() {
        let plist = sample();
        let key = String::from("name");
        assert_eq!(
            crate::plist_lookup!(plist, "list", 1, &key).and_then(Plist::as_string),
            Some("inner")
        );
        assert_eq!(crate::plist_lookup!(plist, "flag").and_then(Plist::as_boolean), Some(true));
        assert!(crate::plist_lookup!(plist, "list", 5).is_none());
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        let plist = Plist::from(1.5);
        assert_eq!(plist.as_real(), Some(1.5));
        assert_eq!(plist.as_integer(), None);
        assert_eq!(plist.element_name(), "real");
        assert_eq!(Plist::from(false).element_name(), "false");
    }
}
