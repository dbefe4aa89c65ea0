//! RTF document type definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Font reference (index into font table).
pub type FontRef = i32;

/// Color reference (index into color table).
pub type ColorRef = i32;

/// RTF color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red component (0-255)
    pub red: u8,
    /// Green component (0-255)
    pub green: u8,
    /// Blue component (0-255)
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Black color.
    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// White color.
    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }
}

/// Formats as `#rrggbb`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or(())?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(());
        }
        let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ());
        Ok(Self::new(component(0)?, component(2)?, component(4)?))
    }
}

/// Color table containing document colors.
///
/// Index 0 always resolves: when the document does not declare it, it is
/// the automatic color, black.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: Vec<Color>,
}

impl ColorTable {
    /// Create a new color table.
    #[inline]
    pub fn new() -> Self {
        Self { colors: Vec::new() }
    }

    /// Add a color to the table and return its index.
    #[inline]
    pub fn add(&mut self, color: Color) -> ColorRef {
        let index = self.colors.len() as ColorRef;
        self.colors.push(color);
        index
    }

    /// Get color by index.
    #[inline]
    pub fn get(&self, color_ref: ColorRef) -> Option<Color> {
        match usize::try_from(color_ref) {
            Ok(i) if i < self.colors.len() => Some(self.colors[i]),
            Ok(0) => Some(Color::black()),
            _ => None,
        }
    }

    /// Whether `color_ref` may be referenced by formatting.
    #[inline]
    pub fn contains(&self, color_ref: ColorRef) -> bool {
        self.get(color_ref).is_some()
    }

    /// Get all declared colors.
    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

/// Font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    /// Unknown or default family
    #[default]
    Nil,
    /// Roman (serif) fonts
    Roman,
    /// Swiss (sans-serif) fonts
    Swiss,
    /// Modern (monospace) fonts
    Modern,
    /// Script fonts
    Script,
    /// Decorative fonts
    Decor,
    /// Technical/symbol fonts
    Tech,
    /// Bidirectional fonts
    Bidi,
}

impl FontFamily {
    /// Control word selecting this family in a font table entry.
    pub fn control_word(self) -> &'static str {
        match self {
            FontFamily::Nil => "fnil",
            FontFamily::Roman => "froman",
            FontFamily::Swiss => "fswiss",
            FontFamily::Modern => "fmodern",
            FontFamily::Script => "fscript",
            FontFamily::Decor => "fdecor",
            FontFamily::Tech => "ftech",
            FontFamily::Bidi => "fbidi",
        }
    }

    /// Generic family name understood by text renderers.
    pub fn generic_name(self) -> Option<&'static str> {
        match self {
            FontFamily::Roman => Some("serif"),
            FontFamily::Swiss => Some("sans-serif"),
            FontFamily::Modern => Some("monospace"),
            FontFamily::Script => Some("cursive"),
            FontFamily::Decor => Some("fantasy"),
            FontFamily::Nil | FontFamily::Tech | FontFamily::Bidi => None,
        }
    }
}

/// Font definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Font {
    /// Font name
    pub name: String,
    /// Font family
    pub family: FontFamily,
    /// Character set (`\fcharset`), if declared
    pub charset: Option<i32>,
    /// Codepage implied by the character set
    pub codepage: Option<u32>,
}

/// Font table, keyed by the index the document declares.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: BTreeMap<FontRef, Font>,
}

impl FontTable {
    /// Create a new font table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a font at a specific index.
    #[inline]
    pub fn insert(&mut self, index: FontRef, font: Font) {
        self.fonts.insert(index, font);
    }

    /// Get font by index.
    #[inline]
    pub fn get(&self, font_ref: FontRef) -> Option<&Font> {
        self.fonts.get(&font_ref)
    }

    /// Iterate fonts in index order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (FontRef, &Font)> {
        self.fonts.iter().map(|(&i, f)| (i, f))
    }

    /// Number of declared fonts.
    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Alignment {
    /// Left-aligned
    Left,
    /// Centered
    Center,
    /// Right-aligned
    Right,
    /// Justified
    Justify,
}

/// Text or paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// Underline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnderlineStyle {
    /// Single underline
    Single,
    /// Double underline
    Double,
    /// Dotted underline
    Dotted,
    /// Thick underline
    Thick,
    /// Words only
    Word,
    /// Wave underline
    Wave,
}

impl UnderlineStyle {
    /// Control word producing this underline.
    pub fn control_word(self) -> &'static str {
        match self {
            UnderlineStyle::Single => "ul",
            UnderlineStyle::Double => "uldb",
            UnderlineStyle::Dotted => "uld",
            UnderlineStyle::Thick => "ulth",
            UnderlineStyle::Word => "ulw",
            UnderlineStyle::Wave => "ulwave",
        }
    }
}

/// Kind of a stylesheet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleKind {
    /// Paragraph style (`\s`)
    #[default]
    Paragraph,
    /// Character style (`\cs`)
    Character,
    /// Section style (`\ds`)
    Section,
    /// Table style (`\ts`)
    Table,
}

impl StyleKind {
    /// Control word that declares and references this kind of style.
    pub fn control_word(self) -> &'static str {
        match self {
            StyleKind::Paragraph => "s",
            StyleKind::Character => "cs",
            StyleKind::Section => "ds",
            StyleKind::Table => "ts",
        }
    }
}

macro_rules! keyword_enum_text {
    ($ty:ty { $($variant:path => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($variant => $text),+
                })
            }
        }

        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

keyword_enum_text!(Alignment {
    Alignment::Left => "left",
    Alignment::Center => "center",
    Alignment::Right => "right",
    Alignment::Justify => "fill",
});

keyword_enum_text!(Direction {
    Direction::LeftToRight => "ltr",
    Direction::RightToLeft => "rtl",
});

keyword_enum_text!(UnderlineStyle {
    UnderlineStyle::Single => "single",
    UnderlineStyle::Double => "double",
    UnderlineStyle::Dotted => "dotted",
    UnderlineStyle::Thick => "thick",
    UnderlineStyle::Word => "word",
    UnderlineStyle::Wave => "wave",
});
