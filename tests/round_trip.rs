//! Round-trip properties: RTF import/export and plist read/write.

use cartouche::plist::Plist;
use cartouche::rtf::{RtfDocument, export_rtf};
use chrono::DateTime;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// A formatted stretch of source RTF.
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
    size: Option<i32>,
    accent: bool,
    par: bool,
}

impl Segment {
    fn write(&self, rtf: &mut String) {
        let mut words = String::new();
        if self.bold {
            words.push_str("\\b");
        }
        if self.italic {
            words.push_str("\\i");
        }
        if self.underline {
            words.push_str("\\ul");
        }
        if let Some(size) = self.size {
            words.push_str(&format!("\\fs{size}"));
        }
        rtf.push('{');
        if !words.is_empty() {
            rtf.push_str(&words);
            rtf.push(' ');
        }
        rtf.push_str(&self.text);
        if self.accent {
            rtf.push_str("\\'e9");
        }
        rtf.push('}');
        if self.par {
            rtf.push_str("\\par\n");
        }
    }
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    (
        "[a-zA-Z0-9.,!?][a-zA-Z0-9 .,!?]{0,15}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::option::of(8i32..72),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(text, bold, italic, underline, size, accent, par)| Segment {
            text,
            bold,
            italic,
            underline,
            size,
            accent,
            par,
        })
}

fn document_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(segment_strategy(), 1..8),
        prop_oneof![Just(""), Just("\\qc"), Just("\\qr\\li720")],
    )
        .prop_map(|(segments, paragraph)| {
            let mut rtf = String::from(
                "{\\rtf1\\ansi\\ansicpg1252{\\fonttbl{\\f0\\fswiss Helvetica;}}\
                 {\\colortbl;\\red200\\green10\\blue10;}\\f0\\pard",
            );
            rtf.push_str(paragraph);
            rtf.push(' ');
            for segment in &segments {
                segment.write(&mut rtf);
            }
            rtf.push('}');
            rtf
        })
}

fn plist_leaf() -> impl Strategy<Value = Plist> {
    prop_oneof![
        "[a-zA-Z0-9 <>&'\"\t\n\u{e9}\u{20ac}-]{0,12}".prop_map(Plist::String),
        any::<i64>().prop_map(Plist::Integer),
        (-1_000_000i64..1_000_000).prop_map(|n| Plist::Real(n as f64 / 1024.0)),
        any::<bool>().prop_map(Plist::Boolean),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Plist::Data),
        (0i64..4_102_444_800).prop_map(|secs| {
            Plist::Date(DateTime::from_timestamp(secs, 0).unwrap())
        }),
    ]
}

fn plist_strategy() -> impl Strategy<Value = Plist> {
    plist_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Plist::Array),
            prop::collection::vec(("[a-zA-Z0-9 &<]{0,8}", inner), 0..6).prop_map(|entries| {
                Plist::Dictionary(entries.into_iter().collect::<BTreeMap<_, _>>())
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rtf_export_preserves_the_imported_model(source in document_strategy()) {
        let first = RtfDocument::parse(&source);
        prop_assert!(first.is_ok(), "import failed: {:?}", first.err());
        let first = first.unwrap();

        let exported = export_rtf(first.buffer());
        let second = RtfDocument::parse(&exported);
        prop_assert!(second.is_ok(), "reimport failed: {:?}\n{}", second.err(), exported);
        let second = second.unwrap();

        prop_assert_eq!(second.text(), first.text());
        prop_assert_eq!(second.runs(), first.runs());
        prop_assert_eq!(second.paragraphs(), first.paragraphs());
    }

    #[test]
    fn plist_write_then_read_is_identity(plist in plist_strategy()) {
        let xml = plist.to_xml_string();
        let read = Plist::from_str(&xml);
        prop_assert!(read.is_ok(), "read failed: {:?}\n{}", read.err(), xml);
        let read = read.unwrap();
        prop_assert_eq!(&read, &plist);
        prop_assert_eq!(read.to_xml_string(), xml);
    }
}

#[test]
fn plist_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Settings.plist");

    let mut dict = BTreeMap::new();
    dict.insert("Name".to_string(), Plist::from("Cartouche"));
    dict.insert(
        "Recent".to_string(),
        Plist::Array(vec![Plist::from("a.rtf"), Plist::from("b.rtfd")]),
    );
    dict.insert("Zoom".to_string(), Plist::Real(1.25));
    let plist = Plist::Dictionary(dict);

    plist.to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\t<key>Name</key>\n\t<string>Cartouche</string>\n"));
    assert!(text.contains("<real>1.25000000000000</real>"));
    assert_eq!(Plist::from_file(&path).unwrap(), plist);
}
