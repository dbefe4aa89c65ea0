//! Character and paragraph formatting.
//!
//! [`Attributes`] is the state of every document-like destination. It is
//! cloned on `{` and restored on `}`; `\plain` and `\pard` reset it to hard
//! defaults. When text is flushed, [`Attributes::tags`] turns every field
//! that differs from its default into one [`TextTag`].

use super::context::ParserContext;
use super::control::{FormatWord, Param};
use super::error::{DiagnosticKind, RtfError, RtfResult};
use super::tags::TextTag;
use super::types::{Alignment, ColorRef, Direction, FontRef, UnderlineStyle};
use phf::phf_map;
use smallvec::SmallVec;

/// Formatting in effect for one brace scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    /// Paragraph or character style (`\s`, `\cs`, `\ds`, `\ts`)
    pub style: Option<i32>,

    pub bold: bool,
    pub italic: bool,
    pub underline: Option<UnderlineStyle>,
    pub strikethrough: bool,
    pub smallcaps: bool,
    pub subscript: bool,
    pub superscript: bool,
    pub invisible: bool,
    pub foreground: Option<ColorRef>,
    /// Written by `\cb`, `\chcbpat` and `\highlight` alike
    pub background: Option<ColorRef>,
    pub font: Option<FontRef>,
    /// Font size in half-points
    pub size: Option<i32>,
    /// Baseline offset in half-points
    pub rise: i32,
    /// Horizontal scaling in percent
    pub scale: i32,
    pub language: Option<i32>,
    pub char_direction: Option<Direction>,

    pub justification: Option<Alignment>,
    pub par_direction: Option<Direction>,
    /// Spacing and margins in twips
    pub space_before: i32,
    pub space_after: i32,
    pub left_margin: i32,
    pub right_margin: i32,
    /// First-line indent
    pub indent: i32,
    pub leading: i32,
    /// Tab stop positions in twips
    pub tabs: SmallVec<[i32; 8]>,
    pub space_before_auto: bool,
    pub space_after_auto: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            style: None,
            bold: false,
            italic: false,
            underline: None,
            strikethrough: false,
            smallcaps: false,
            subscript: false,
            superscript: false,
            invisible: false,
            foreground: None,
            background: None,
            font: None,
            size: None,
            rise: 0,
            scale: 100,
            language: None,
            char_direction: None,
            justification: None,
            par_direction: None,
            space_before: 0,
            space_after: 0,
            left_margin: 0,
            right_margin: 0,
            indent: 0,
            leading: 0,
            tabs: SmallVec::new(),
            space_before_auto: false,
            space_after_auto: false,
        }
    }
}

impl Attributes {
    /// `\plain`: character formatting back to defaults, language back to
    /// the document default.
    pub fn reset_character(&mut self, default_language: Option<i32>) {
        let defaults = Self::default();
        self.bold = defaults.bold;
        self.italic = defaults.italic;
        self.underline = defaults.underline;
        self.strikethrough = defaults.strikethrough;
        self.smallcaps = defaults.smallcaps;
        self.subscript = defaults.subscript;
        self.superscript = defaults.superscript;
        self.invisible = defaults.invisible;
        self.foreground = defaults.foreground;
        self.background = defaults.background;
        self.font = defaults.font;
        self.size = defaults.size;
        self.rise = defaults.rise;
        self.scale = defaults.scale;
        self.char_direction = defaults.char_direction;
        self.language = default_language;
    }

    /// `\pard`: paragraph formatting and style back to defaults.
    pub fn reset_paragraph(&mut self) {
        let defaults = Self::default();
        self.style = defaults.style;
        self.justification = defaults.justification;
        self.par_direction = defaults.par_direction;
        self.space_before = defaults.space_before;
        self.space_after = defaults.space_after;
        self.left_margin = defaults.left_margin;
        self.right_margin = defaults.right_margin;
        self.indent = defaults.indent;
        self.leading = defaults.leading;
        self.tabs.clear();
        self.space_before_auto = defaults.space_before_auto;
        self.space_after_auto = defaults.space_after_auto;
    }

    /// One tag per field that differs from its default.
    ///
    /// Text without an explicit font gets the document default font, as
    /// long as the font table declares it.
    pub fn tags(&self, ctx: &ParserContext<'_>) -> Vec<TextTag> {
        let mut tags = Vec::new();

        if self.bold {
            tags.push(TextTag::Bold);
        }
        if self.italic {
            tags.push(TextTag::Italic);
        }
        if let Some(style) = self.underline {
            tags.push(TextTag::Underline(style));
        }
        if self.strikethrough {
            tags.push(TextTag::Strikethrough);
        }
        if self.smallcaps {
            tags.push(TextTag::SmallCaps);
        }
        if self.superscript {
            tags.push(TextTag::Superscript);
        }
        if self.subscript {
            tags.push(TextTag::Subscript);
        }
        if self.invisible {
            tags.push(TextTag::Invisible);
        }
        if let Some(color) = self.foreground {
            tags.push(TextTag::Foreground(color));
        }
        if let Some(color) = self.background {
            tags.push(TextTag::Background(color));
        }
        let font = self
            .font
            .or(ctx.default_font.filter(|&f| ctx.fonts.get(f).is_some()));
        if let Some(font) = font {
            tags.push(TextTag::Font(font));
        }
        if let Some(size) = self.size {
            tags.push(TextTag::FontSize(size));
        }
        if self.rise != 0 {
            tags.push(TextTag::Rise(self.rise));
        }
        if self.scale != 100 {
            tags.push(TextTag::Scale(self.scale));
        }
        if let Some(language) = self.language {
            tags.push(TextTag::Language(language));
        }
        if let Some(direction) = self.char_direction {
            tags.push(TextTag::CharDirection(direction));
        }

        if let Some(justification) = self.justification {
            tags.push(TextTag::Justify(justification));
        }
        if let Some(direction) = self.par_direction {
            tags.push(TextTag::ParDirection(direction));
        }
        if self.space_before != 0 && !self.space_before_auto {
            tags.push(TextTag::SpaceBefore(self.space_before));
        }
        if self.space_after != 0 && !self.space_after_auto {
            tags.push(TextTag::SpaceAfter(self.space_after));
        }
        if self.left_margin != 0 {
            tags.push(TextTag::LeftMargin(self.left_margin));
        }
        if self.right_margin != 0 {
            tags.push(TextTag::RightMargin(self.right_margin));
        }
        if self.indent != 0 {
            tags.push(TextTag::Indent(self.indent));
        }
        if self.leading != 0 {
            tags.push(TextTag::Leading(self.leading));
        }
        if !self.tabs.is_empty() {
            tags.push(TextTag::Tabs(self.tabs.to_vec()));
        }
        if let Some(style) = self.style {
            tags.push(TextTag::Style(style));
        }

        tags
    }
}

/// Formatting words understood by every destination with [`Attributes`].
pub static FORMATTING: phf::Map<&'static str, FormatWord> = phf_map! {
    "plain" => FormatWord { param: Param::None, action: plain },
    "pard" => FormatWord { param: Param::None, action: pard },

    "b" => FormatWord { param: Param::Optional(1), action: bold },
    "i" => FormatWord { param: Param::Optional(1), action: italic },
    "ul" => FormatWord { param: Param::Optional(1), action: underline },
    "uld" => FormatWord { param: Param::Optional(1), action: underline_dotted },
    "uldb" => FormatWord { param: Param::Optional(1), action: underline_double },
    "ulth" => FormatWord { param: Param::Optional(1), action: underline_thick },
    "ulw" => FormatWord { param: Param::Optional(1), action: underline_word },
    "ulwave" => FormatWord { param: Param::Optional(1), action: underline_wave },
    "ulnone" => FormatWord { param: Param::None, action: underline_none },
    "strike" => FormatWord { param: Param::Optional(1), action: strikethrough },
    "striked" => FormatWord { param: Param::Optional(1), action: strikethrough },
    "scaps" => FormatWord { param: Param::Optional(1), action: smallcaps },
    "sub" => FormatWord { param: Param::Optional(1), action: subscript },
    "super" => FormatWord { param: Param::Optional(1), action: superscript },
    "nosupersub" => FormatWord { param: Param::None, action: nosupersub },
    "v" => FormatWord { param: Param::Optional(1), action: invisible },
    "up" => FormatWord { param: Param::Optional(6), action: up },
    "dn" => FormatWord { param: Param::Optional(6), action: down },
    "charscalex" => FormatWord { param: Param::Optional(100), action: scale },
    "cf" => FormatWord { param: Param::Optional(0), action: foreground },
    "cb" => FormatWord { param: Param::Optional(0), action: background },
    "chcbpat" => FormatWord { param: Param::Optional(0), action: background },
    "highlight" => FormatWord { param: Param::Optional(0), action: background },
    "f" => FormatWord { param: Param::Required, action: font },
    "fs" => FormatWord { param: Param::Optional(24), action: font_size },
    "lang" => FormatWord { param: Param::Required, action: language },
    "ltrch" => FormatWord { param: Param::None, action: ltr_char },
    "rtlch" => FormatWord { param: Param::None, action: rtl_char },

    "ql" => FormatWord { param: Param::None, action: align_left },
    "qr" => FormatWord { param: Param::None, action: align_right },
    "qc" => FormatWord { param: Param::None, action: align_center },
    "qj" => FormatWord { param: Param::None, action: align_justify },
    "ltrpar" => FormatWord { param: Param::None, action: ltr_paragraph },
    "rtlpar" => FormatWord { param: Param::None, action: rtl_paragraph },
    "sb" => FormatWord { param: Param::Optional(0), action: space_before },
    "sa" => FormatWord { param: Param::Optional(0), action: space_after },
    "sbauto" => FormatWord { param: Param::Optional(0), action: space_before_auto },
    "saauto" => FormatWord { param: Param::Optional(0), action: space_after_auto },
    "li" => FormatWord { param: Param::Optional(0), action: left_margin },
    "ri" => FormatWord { param: Param::Optional(0), action: right_margin },
    "fi" => FormatWord { param: Param::Optional(0), action: indent },
    "sl" => FormatWord { param: Param::Optional(0), action: leading },
    // Line spacing is always taken as exact
    "slmult" => FormatWord { param: Param::Optional(0), action: ignore },
    "tx" => FormatWord { param: Param::Required, action: tab_stop },
    "tb" => FormatWord { param: Param::Required, action: tab_stop },

    "s" => FormatWord { param: Param::Required, action: style },
    "cs" => FormatWord { param: Param::Required, action: style },
    "ds" => FormatWord { param: Param::Required, action: style },
    "ts" => FormatWord { param: Param::Required, action: style },
};

fn plain(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.reset_character(ctx.default_language);
    Ok(())
}

fn pard(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.reset_paragraph();
    Ok(())
}

fn bold(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.bold = on != 0;
    Ok(())
}

fn italic(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.italic = on != 0;
    Ok(())
}

fn set_underline(attrs: &mut Attributes, style: UnderlineStyle, on: i32) -> RtfResult<()> {
    attrs.underline = (on != 0).then_some(style);
    Ok(())
}

fn underline(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Single, on)
}

fn underline_dotted(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Dotted, on)
}

fn underline_double(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Double, on)
}

fn underline_thick(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Thick, on)
}

fn underline_word(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Word, on)
}

fn underline_wave(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    set_underline(attrs, UnderlineStyle::Wave, on)
}

fn underline_none(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.underline = None;
    Ok(())
}

fn strikethrough(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.strikethrough = on != 0;
    Ok(())
}

fn smallcaps(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.smallcaps = on != 0;
    Ok(())
}

fn subscript(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.subscript = on != 0;
    if attrs.subscript {
        attrs.superscript = false;
    }
    Ok(())
}

fn superscript(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.superscript = on != 0;
    if attrs.superscript {
        attrs.subscript = false;
    }
    Ok(())
}

fn nosupersub(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.subscript = false;
    attrs.superscript = false;
    Ok(())
}

fn invisible(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.invisible = on != 0;
    Ok(())
}

fn up(attrs: &mut Attributes, _: &mut ParserContext<'_>, half_points: i32) -> RtfResult<()> {
    attrs.rise = half_points;
    Ok(())
}

fn down(attrs: &mut Attributes, _: &mut ParserContext<'_>, half_points: i32) -> RtfResult<()> {
    attrs.rise = half_points.saturating_neg();
    Ok(())
}

fn scale(attrs: &mut Attributes, _: &mut ParserContext<'_>, percent: i32) -> RtfResult<()> {
    attrs.scale = percent;
    Ok(())
}

/// Colors must be declared before use.
fn declared_color(ctx: &ParserContext<'_>, index: ColorRef) -> RtfResult<ColorRef> {
    if ctx.colors.contains(index) {
        Ok(index)
    } else {
        Err(RtfError::UndefinedColor(index))
    }
}

fn foreground(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, index: i32) -> RtfResult<()> {
    attrs.foreground = Some(declared_color(ctx, index)?);
    Ok(())
}

fn background(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, index: i32) -> RtfResult<()> {
    attrs.background = Some(declared_color(ctx, index)?);
    Ok(())
}

fn font(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, index: i32) -> RtfResult<()> {
    if ctx.fonts.get(index).is_some() {
        attrs.font = Some(index);
    } else {
        ctx.warn(
            DiagnosticKind::UndefinedFont,
            format!("font {index} is not defined in the font table"),
        );
    }
    Ok(())
}

fn font_size(attrs: &mut Attributes, _: &mut ParserContext<'_>, half_points: i32) -> RtfResult<()> {
    if half_points < 0 {
        return Err(RtfError::BadFontSize(half_points));
    }
    attrs.size = (half_points > 0).then_some(half_points);
    Ok(())
}

fn language(attrs: &mut Attributes, _: &mut ParserContext<'_>, id: i32) -> RtfResult<()> {
    attrs.language = Some(id);
    Ok(())
}

fn ltr_char(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.char_direction = Some(Direction::LeftToRight);
    Ok(())
}

fn rtl_char(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.char_direction = Some(Direction::RightToLeft);
    Ok(())
}

fn align_left(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.justification = Some(Alignment::Left);
    Ok(())
}

fn align_right(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.justification = Some(Alignment::Right);
    Ok(())
}

fn align_center(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.justification = Some(Alignment::Center);
    Ok(())
}

fn align_justify(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.justification = Some(Alignment::Justify);
    Ok(())
}

fn ltr_paragraph(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.par_direction = Some(Direction::LeftToRight);
    Ok(())
}

fn rtl_paragraph(attrs: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    attrs.par_direction = Some(Direction::RightToLeft);
    Ok(())
}

fn space_before(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.space_before = twips;
    Ok(())
}

fn space_after(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.space_after = twips;
    Ok(())
}

fn space_before_auto(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.space_before_auto = on != 0;
    Ok(())
}

fn space_after_auto(attrs: &mut Attributes, _: &mut ParserContext<'_>, on: i32) -> RtfResult<()> {
    attrs.space_after_auto = on != 0;
    Ok(())
}

fn left_margin(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.left_margin = twips;
    Ok(())
}

fn right_margin(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.right_margin = twips;
    Ok(())
}

fn indent(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.indent = twips;
    Ok(())
}

fn leading(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.leading = twips;
    Ok(())
}

fn ignore(_: &mut Attributes, _: &mut ParserContext<'_>, _: i32) -> RtfResult<()> {
    Ok(())
}

fn tab_stop(attrs: &mut Attributes, _: &mut ParserContext<'_>, twips: i32) -> RtfResult<()> {
    attrs.tabs.push(twips);
    Ok(())
}

fn style(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, index: i32) -> RtfResult<()> {
    if ctx.styles.contains(index) {
        attrs.style = Some(index);
    } else {
        ctx.warn(
            DiagnosticKind::UndefinedStyle,
            format!("style {index} is not defined in the stylesheet"),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::picture::BuiltinCodec;
    use crate::rtf::types::{Color, Font};

    fn apply(attrs: &mut Attributes, ctx: &mut ParserContext<'_>, name: &str, param: Option<i32>) -> RtfResult<()> {
        let word = FORMATTING.get(name).unwrap();
        let value = word.param.resolve(name, param)?;
        (word.action)(attrs, ctx, value)
    }

    #[test]
    fn test_defaults_emit_no_tags() {
        let ctx = ParserContext::new(&BuiltinCodec, None);
        assert!(Attributes::default().tags(&ctx).is_empty());
    }

    #[test]
    fn test_toggles_and_values() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut attrs = Attributes::default();
        apply(&mut attrs, &mut ctx, "b", None).unwrap();
        apply(&mut attrs, &mut ctx, "i", None).unwrap();
        apply(&mut attrs, &mut ctx, "i", Some(0)).unwrap();
        apply(&mut attrs, &mut ctx, "fs", Some(25)).unwrap();
        apply(&mut attrs, &mut ctx, "uldb", None).unwrap();
        apply(&mut attrs, &mut ctx, "dn", None).unwrap();
        apply(&mut attrs, &mut ctx, "tx", Some(720)).unwrap();
        apply(&mut attrs, &mut ctx, "tx", Some(1440)).unwrap();

        assert_eq!(
            attrs.tags(&ctx),
            vec![
                TextTag::Bold,
                TextTag::Underline(UnderlineStyle::Double),
                TextTag::FontSize(25),
                TextTag::Rise(-6),
                TextTag::Tabs(vec![720, 1440]),
            ]
        );
    }

    #[test]
    fn test_plain_and_pard_reset_their_halves() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.default_language = Some(1033);
        let mut attrs = Attributes::default();
        apply(&mut attrs, &mut ctx, "b", None).unwrap();
        apply(&mut attrs, &mut ctx, "qc", None).unwrap();
        apply(&mut attrs, &mut ctx, "lang", Some(1036)).unwrap();

        apply(&mut attrs, &mut ctx, "plain", None).unwrap();
        assert!(!attrs.bold);
        assert_eq!(attrs.language, Some(1033));
        assert_eq!(attrs.justification, Some(Alignment::Center));

        apply(&mut attrs, &mut ctx, "pard", None).unwrap();
        assert_eq!(attrs.justification, None);
    }

    #[test]
    fn test_undefined_color_is_fatal() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut attrs = Attributes::default();
        // Index 0 is the implicit automatic color
        apply(&mut attrs, &mut ctx, "cf", Some(0)).unwrap();
        assert!(matches!(
            apply(&mut attrs, &mut ctx, "cf", Some(1)),
            Err(RtfError::UndefinedColor(1))
        ));

        ctx.colors.add(Color::black());
        ctx.colors.add(Color::new(255, 0, 0));
        apply(&mut attrs, &mut ctx, "highlight", Some(1)).unwrap();
        assert_eq!(attrs.background, Some(1));
    }

    #[test]
    fn test_undefined_font_is_a_warning() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.fonts.insert(0, Font { name: "Arial".into(), ..Font::default() });
        let mut attrs = Attributes::default();
        apply(&mut attrs, &mut ctx, "f", Some(0)).unwrap();
        apply(&mut attrs, &mut ctx, "f", Some(7)).unwrap();
        assert_eq!(attrs.font, Some(0));

        let (_, diagnostics) = ctx.into_output();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UndefinedFont);
    }

    #[test]
    fn test_font_size_validation() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        let mut attrs = Attributes::default();
        assert!(matches!(
            apply(&mut attrs, &mut ctx, "fs", Some(-2)),
            Err(RtfError::BadFontSize(-2))
        ));
        assert!(matches!(
            apply(&mut attrs, &mut ctx, "lang", None),
            Err(RtfError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_default_font_fallback() {
        let mut ctx = ParserContext::new(&BuiltinCodec, None);
        ctx.default_font = Some(1);
        assert!(Attributes::default().tags(&ctx).is_empty());
        ctx.fonts.insert(1, Font::default());
        assert_eq!(Attributes::default().tags(&ctx), vec![TextTag::Font(1)]);
    }

    #[test]
    fn test_clone_does_not_share_tabs() {
        let mut parent = Attributes::default();
        parent.tabs.push(720);
        let mut child = parent.clone();
        child.tabs.push(1440);
        assert_eq!(parent.tabs.as_slice(), &[720]);
    }
}
