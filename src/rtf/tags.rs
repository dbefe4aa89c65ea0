//! Named formatting tags.
//!
//! Every non-default formatting attribute of a text range becomes one
//! [`TextTag`]. Tags carry their parameters, so two ranges formatted alike
//! carry equal tags. Each tag has a stable textual name such as
//! `rtf-font-size=12.5` or `rtf-tabs=720,1440` that parses back with
//! [`str::parse`].

use super::types::{Alignment, Color, ColorRef, Direction, FontFamily, FontRef, StyleKind, UnderlineStyle};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every tag name.
pub const TAG_PREFIX: &str = "rtf-";

/// A formatting operation applied to a range of text.
///
/// Sizes and offsets keep RTF units: half-points for `FontSize` and `Rise`,
/// twips for paragraph spacing and margins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextTag {
    Bold,
    Italic,
    Underline(UnderlineStyle),
    Strikethrough,
    SmallCaps,
    Superscript,
    Subscript,
    Invisible,
    Foreground(ColorRef),
    Background(ColorRef),
    Font(FontRef),
    FontSize(i32),
    Rise(i32),
    Scale(i32),
    Language(i32),
    CharDirection(Direction),
    Justify(Alignment),
    ParDirection(Direction),
    SpaceBefore(i32),
    SpaceAfter(i32),
    LeftMargin(i32),
    RightMargin(i32),
    Indent(i32),
    Leading(i32),
    Tabs(Vec<i32>),
    Style(i32),
}

impl TextTag {
    /// Whether the tag describes paragraph rather than character formatting.
    pub fn is_paragraph(&self) -> bool {
        matches!(
            self,
            TextTag::Justify(_)
                | TextTag::ParDirection(_)
                | TextTag::SpaceBefore(_)
                | TextTag::SpaceAfter(_)
                | TextTag::LeftMargin(_)
                | TextTag::RightMargin(_)
                | TextTag::Indent(_)
                | TextTag::Leading(_)
                | TextTag::Tabs(_)
        )
    }
}

/// Write half-points as points, dropping a trailing `.0`.
fn write_half_points(f: &mut fmt::Formatter<'_>, half_points: i32) -> fmt::Result {
    let whole = half_points / 2;
    if half_points % 2 == 0 {
        write!(f, "{whole}")
    } else if half_points < 0 && whole == 0 {
        f.write_str("-0.5")
    } else {
        write!(f, "{whole}.5")
    }
}

fn parse_half_points(s: &str) -> Option<i32> {
    let (whole, half) = match s.split_once('.') {
        Some((whole, "5")) => (whole, true),
        Some((whole, "0")) | Some((whole, "")) => (whole, false),
        Some(_) => return None,
        None => (s, false),
    };
    let negative = whole.starts_with('-');
    let points: i32 = whole.parse().ok()?;
    let mut half_points = points.checked_mul(2)?;
    if half {
        half_points += if negative { -1 } else { 1 };
    }
    Some(half_points)
}

impl fmt::Display for TextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TAG_PREFIX)?;
        match self {
            TextTag::Bold => f.write_str("bold"),
            TextTag::Italic => f.write_str("italic"),
            TextTag::Underline(style) => write!(f, "underline={style}"),
            TextTag::Strikethrough => f.write_str("strikethrough"),
            TextTag::SmallCaps => f.write_str("small-caps"),
            TextTag::Superscript => f.write_str("superscript"),
            TextTag::Subscript => f.write_str("subscript"),
            TextTag::Invisible => f.write_str("invisible"),
            TextTag::Foreground(i) => write!(f, "foreground={i}"),
            TextTag::Background(i) => write!(f, "background={i}"),
            TextTag::Font(i) => write!(f, "font={i}"),
            TextTag::FontSize(hp) => {
                f.write_str("font-size=")?;
                write_half_points(f, *hp)
            },
            TextTag::Rise(hp) => {
                f.write_str("rise=")?;
                write_half_points(f, *hp)
            },
            TextTag::Scale(p) => write!(f, "scale={p}"),
            TextTag::Language(id) => write!(f, "language={id}"),
            TextTag::CharDirection(d) => write!(f, "direction={d}"),
            TextTag::Justify(a) => write!(f, "justification={a}"),
            TextTag::ParDirection(d) => write!(f, "paragraph-direction={d}"),
            TextTag::SpaceBefore(tw) => write!(f, "space-before={tw}"),
            TextTag::SpaceAfter(tw) => write!(f, "space-after={tw}"),
            TextTag::LeftMargin(tw) => write!(f, "left-margin={tw}"),
            TextTag::RightMargin(tw) => write!(f, "right-margin={tw}"),
            TextTag::Indent(tw) => write!(f, "indent={tw}"),
            TextTag::Leading(tw) => write!(f, "leading={tw}"),
            TextTag::Tabs(stops) => {
                f.write_str("tabs=")?;
                for (i, stop) in stops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{stop}")?;
                }
                Ok(())
            },
            TextTag::Style(i) => write!(f, "style={i}"),
        }
    }
}

/// Error returned when a tag name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag name {:?}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for TextTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownTag(s.to_string());
        let body = s.strip_prefix(TAG_PREFIX).ok_or_else(unknown)?;
        let (key, value) = match body.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (body, None),
        };

        let int = || value.and_then(|v| v.parse::<i32>().ok()).ok_or_else(unknown);
        let half_points = || value.and_then(parse_half_points).ok_or_else(unknown);
        let keyword = || value.ok_or_else(unknown);

        let tag = match (key, value) {
            ("bold", None) => TextTag::Bold,
            ("italic", None) => TextTag::Italic,
            ("strikethrough", None) => TextTag::Strikethrough,
            ("small-caps", None) => TextTag::SmallCaps,
            ("superscript", None) => TextTag::Superscript,
            ("subscript", None) => TextTag::Subscript,
            ("invisible", None) => TextTag::Invisible,
            ("underline", Some(_)) => {
                TextTag::Underline(keyword()?.parse().map_err(|_| unknown())?)
            },
            ("foreground", Some(_)) => TextTag::Foreground(int()?),
            ("background", Some(_)) => TextTag::Background(int()?),
            ("font", Some(_)) => TextTag::Font(int()?),
            ("font-size", Some(_)) => TextTag::FontSize(half_points()?),
            ("rise", Some(_)) => TextTag::Rise(half_points()?),
            ("scale", Some(_)) => TextTag::Scale(int()?),
            ("language", Some(_)) => TextTag::Language(int()?),
            ("direction", Some(_)) => {
                TextTag::CharDirection(keyword()?.parse().map_err(|_| unknown())?)
            },
            ("justification", Some(_)) => {
                TextTag::Justify(keyword()?.parse().map_err(|_| unknown())?)
            },
            ("paragraph-direction", Some(_)) => {
                TextTag::ParDirection(keyword()?.parse().map_err(|_| unknown())?)
            },
            ("space-before", Some(_)) => TextTag::SpaceBefore(int()?),
            ("space-after", Some(_)) => TextTag::SpaceAfter(int()?),
            ("left-margin", Some(_)) => TextTag::LeftMargin(int()?),
            ("right-margin", Some(_)) => TextTag::RightMargin(int()?),
            ("indent", Some(_)) => TextTag::Indent(int()?),
            ("leading", Some(_)) => TextTag::Leading(int()?),
            ("tabs", Some("")) => TextTag::Tabs(Vec::new()),
            ("tabs", Some(list)) => TextTag::Tabs(
                list.split(',')
                    .map(|stop| stop.parse::<i32>().map_err(|_| unknown()))
                    .collect::<Result<_, _>>()?,
            ),
            ("style", Some(_)) => TextTag::Style(int()?),
            _ => return Err(unknown()),
        };
        Ok(tag)
    }
}

/// The visual definition registered for a tag that refers to a table entry.
///
/// Font, color and style tags only mean something together with the table
/// entry they point at; the definition carries that entry so a text model
/// can render the tag and a writer can rebuild the tables.
#[derive(Debug, Clone, PartialEq)]
pub enum TagStyle {
    /// Definition of a `Font(i)` tag
    Font {
        name: String,
        family: FontFamily,
        charset: Option<i32>,
    },
    /// Definition of a `Foreground(i)` or `Background(i)` tag
    Color(Color),
    /// Definition of a `Style(i)` tag: the formatting the style implies
    Style {
        name: String,
        kind: StyleKind,
        tags: Vec<TextTag>,
    },
    /// Definition of a `Language(id)` tag: the ISO language code
    Language(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(TextTag::FontSize(25).to_string(), "rtf-font-size=12.5");
        assert_eq!(TextTag::FontSize(24).to_string(), "rtf-font-size=12");
        assert_eq!(TextTag::Rise(-1).to_string(), "rtf-rise=-0.5");
        assert_eq!(TextTag::Rise(-3).to_string(), "rtf-rise=-1.5");
        assert_eq!(TextTag::Foreground(2).to_string(), "rtf-foreground=2");
        assert_eq!(TextTag::Tabs(vec![720, 1440]).to_string(), "rtf-tabs=720,1440");
        assert_eq!(
            TextTag::Underline(UnderlineStyle::Double).to_string(),
            "rtf-underline=double"
        );
    }

    #[test]
    fn test_parse_names() {
        let tags = [
            TextTag::Bold,
            TextTag::SmallCaps,
            TextTag::FontSize(25),
            TextTag::FontSize(-7),
            TextTag::Rise(-1),
            TextTag::Rise(6),
            TextTag::Justify(Alignment::Center),
            TextTag::ParDirection(Direction::RightToLeft),
            TextTag::Tabs(vec![]),
            TextTag::Tabs(vec![360, 720]),
            TextTag::Language(1033),
            TextTag::Style(3),
        ];
        for tag in tags {
            assert_eq!(tag.to_string().parse::<TextTag>(), Ok(tag));
        }
    }

    #[test]
    fn test_parse_rejects() {
        assert!("bold".parse::<TextTag>().is_err());
        assert!("rtf-bold=1".parse::<TextTag>().is_err());
        assert!("rtf-font-size=12.25".parse::<TextTag>().is_err());
        assert!("rtf-tabs=1,x".parse::<TextTag>().is_err());
        assert!("rtf-underline=zigzag".parse::<TextTag>().is_err());
    }

    #[test]
    fn test_paragraph_classification() {
        assert!(TextTag::Tabs(vec![]).is_paragraph());
        assert!(TextTag::Justify(Alignment::Left).is_paragraph());
        assert!(!TextTag::Bold.is_paragraph());
    }
}
