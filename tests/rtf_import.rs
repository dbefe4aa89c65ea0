//! End-to-end behaviour of the RTF importer through the public API.

use cartouche::rtf::{
    FontFamily, RtfDocument, RtfError, RtfErrorKind, Run, TagStyle, TextTag,
};

fn text_runs(doc: &RtfDocument) -> Vec<(String, Vec<TextTag>)> {
    doc.runs()
        .into_iter()
        .filter_map(|run| match run {
            Run::Text { text, tags } => Some((text.to_string(), tags)),
            Run::Image(_) => None,
        })
        .collect()
}

#[test]
fn font_table_and_size_apply_to_both_paragraphs() {
    let doc = RtfDocument::parse(
        r"{\rtf1\ansi\deff0{\fonttbl{\f0\fswiss Arial;}}\f0\fs24 Hello\par World}",
    )
    .unwrap();

    assert_eq!(doc.paragraphs(), vec!["Hello", "World"]);
    let buffer = doc.buffer();
    for pos in (0..5).chain(6..11) {
        let tags = buffer.tags_at(pos);
        assert!(tags.contains(&TextTag::Font(0)), "font missing at {pos}");
        assert!(tags.contains(&TextTag::FontSize(24)), "size missing at {pos}");
    }
    assert_eq!(TextTag::FontSize(24).to_string(), "rtf-font-size=12");
    assert!(matches!(
        buffer.definition(&TextTag::Font(0)),
        Some(TagStyle::Font { name, family: FontFamily::Swiss, .. }) if name == "Arial"
    ));
}

#[test]
fn bold_group_yields_three_runs() {
    let doc = RtfDocument::parse(r"{\rtf1\ansi\deff0 plain{\b bold}plain}").unwrap();
    let runs = text_runs(&doc);

    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0], ("plain".to_string(), vec![]));
    assert_eq!(runs[1], ("bold".to_string(), vec![TextTag::Bold]));
    assert_eq!(runs[2], ("plain".to_string(), vec![]));
}

#[test]
fn child_scope_inherits_and_parent_is_restored() {
    let doc = RtfDocument::parse(r"{\rtf1 \b a{b\i c\b0 d}e}").unwrap();
    let buffer = doc.buffer();

    assert_eq!(doc.text(), "abcde");
    assert_eq!(buffer.tags_at(0), vec![TextTag::Bold]);
    assert_eq!(buffer.tags_at(1), vec![TextTag::Bold]);
    assert_eq!(buffer.tags_at(2), vec![TextTag::Bold, TextTag::Italic]);
    assert_eq!(buffer.tags_at(3), vec![TextTag::Italic]);
    assert_eq!(buffer.tags_at(4), vec![TextTag::Bold]);
}

#[test]
fn unknown_control_word_is_tolerated() {
    let doc = RtfDocument::parse(r"{\rtf1\ansi \zzzqq keep {\zzzqq42 this}\par}").unwrap();
    assert_eq!(doc.text(), "keep this\n");
    assert!(text_runs(&doc).iter().all(|(_, tags)| tags.is_empty()));
}

#[test]
fn ignorable_destination_produces_nothing() {
    let doc = RtfDocument::parse(
        r"{\rtf1 before{\*\unknowndest garbage {nested} \b content}after}",
    )
    .unwrap();
    assert_eq!(doc.text(), "beforeafter");
    assert!(doc.buffer().tags().next().is_none());
}

#[test]
fn structural_errors_are_fatal() {
    let cases: [(&str, RtfErrorKind); 6] = [
        ("", RtfErrorKind::Malformed),
        ("plain text", RtfErrorKind::Malformed),
        (r"{\rtf1 never closed", RtfErrorKind::Malformed),
        (r"{\rtf1 {\b nested} open", RtfErrorKind::Malformed),
        (r"{\rtf1 done} extra", RtfErrorKind::Malformed),
        (r"{\rtf1 bad \'g1 hex}", RtfErrorKind::BadHexEscape),
    ];
    for (input, kind) in cases {
        match RtfDocument::parse(input) {
            Err(err) => assert_eq!(err.kind(), kind, "input {input:?}"),
            Ok(doc) => panic!("{input:?} parsed to {:?}", doc.text()),
        }
    }
    assert!(matches!(
        RtfDocument::parse(r"{\rtf1 done} extra"),
        Err(RtfError::TrailingContent(13))
    ));
}

#[test]
fn unicode_with_fallback() {
    let doc = RtfDocument::parse(r"{\rtf1\ansi\uc1 caf\u233?{\uc2\u8364 EU}!}").unwrap();
    assert_eq!(doc.text(), "caf\u{e9}\u{20ac}!");
}

#[test]
fn hex_escapes_follow_the_declared_codepage() {
    let cases = [
        (r"{\rtf1\pc caf\'82 \'db}", "caf\u{e9} \u{2588}"),
        (r"{\rtf1\pca caf\'82 \'d5}", "caf\u{e9} \u{131}"),
        (r"{\rtf1\mac caf\'8e}", "caf\u{e9}"),
        (r"{\rtf1\ansi caf\'e9}", "caf\u{e9}"),
    ];
    for (input, expected) in cases {
        let doc = RtfDocument::parse(input).unwrap();
        assert_eq!(doc.text(), expected, "input {input:?}");
        assert!(doc.diagnostics().is_empty());
    }
}

#[test]
fn font_charset_overrides_document_codepage() {
    let doc = RtfDocument::parse(
        r"{\rtf1\pc{\fonttbl{\f0\fcharset204 Courier;}{\f1 Arial;}}\f0 \'c4\'e0 {\f1 \'82}}",
    )
    .unwrap();
    assert_eq!(doc.text(), "\u{414}\u{430} \u{e9}");
}

#[test]
fn grouped_font_entry_without_semicolon_is_kept() {
    let doc = RtfDocument::parse(r"{\rtf1{\fonttbl{\f0 Arial}{\f1 Times;}}\f1 x}").unwrap();
    let buffer = doc.buffer();
    let name = |index| match buffer.definition(&TextTag::Font(index)) {
        Some(TagStyle::Font { name, .. }) => Some(name.as_str()),
        _ => None,
    };
    assert_eq!(name(0), Some("Arial"));
    assert_eq!(name(1), Some("Times"));
    assert_eq!(buffer.tags_at(0), vec![TextTag::Font(1)]);
}
