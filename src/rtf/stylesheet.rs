//! RTF stylesheet support.
//!
//! Styles are declared once in the `\stylesheet` destination and referenced
//! from the body with `\s`, `\cs`, `\ds` or `\ts`.

use super::attributes::Attributes;
use super::types::StyleKind;
use std::collections::BTreeMap;

/// RTF style definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    /// Style index
    pub index: i32,
    /// Style type
    pub kind: StyleKind,
    /// Style name
    pub name: String,
    /// Formatting the style carries
    pub attributes: Attributes,
}

impl StyleRecord {
    /// Check if this is a paragraph style
    #[inline]
    pub fn is_paragraph_style(&self) -> bool {
        self.kind == StyleKind::Paragraph
    }

    /// Check if this is a character style
    #[inline]
    pub fn is_character_style(&self) -> bool {
        self.kind == StyleKind::Character
    }
}

/// Stylesheet containing all style definitions.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: BTreeMap<i32, StyleRecord>,
}

impl StyleTable {
    /// Create a new stylesheet
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style, replacing any earlier one with the same index.
    #[inline]
    pub fn insert(&mut self, style: StyleRecord) {
        self.styles.insert(style.index, style);
    }

    /// Get a style by index
    #[inline]
    pub fn get(&self, index: i32) -> Option<&StyleRecord> {
        self.styles.get(&index)
    }

    #[inline]
    pub fn contains(&self, index: i32) -> bool {
        self.styles.contains_key(&index)
    }

    /// Get a style by name
    pub fn get_by_name(&self, name: &str) -> Option<&StyleRecord> {
        self.styles.values().find(|s| s.name == name)
    }

    /// Iterate styles in index order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleRecord> {
        self.styles.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
