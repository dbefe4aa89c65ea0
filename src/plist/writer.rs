//! XML property-list writer.
//!
//! Output follows the layout Apple's tools produce: XML declaration, the
//! property-list DOCTYPE, one element per line indented with tabs. The root
//! value is not indented.

use super::parser::DATE_FORMAT;
use super::value::Plist;
use crate::common::xml::escape_xml;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
<plist version=\"1.0\">\n";

const XML_FOOTER: &str = "</plist>\n";

/// Serialize a whole document.
pub(crate) fn write_document(plist: &Plist) -> String {
    let mut xml = String::with_capacity(256);
    xml.push_str(XML_HEADER);
    write_value(&mut xml, plist, 0);
    xml.push_str(XML_FOOTER);
    xml
}

fn indent(xml: &mut String, depth: usize) {
    for _ in 0..depth {
        xml.push('\t');
    }
}

fn write_leaf(xml: &mut String, depth: usize, element: &str, text: &str) {
    indent(xml, depth);
    xml.push('<');
    xml.push_str(element);
    xml.push('>');
    xml.push_str(text);
    xml.push_str("</");
    xml.push_str(element);
    xml.push_str(">\n");
}

fn write_value(xml: &mut String, value: &Plist, depth: usize) {
    match value {
        Plist::Dictionary(dict) if dict.is_empty() => {
            indent(xml, depth);
            xml.push_str("<dict/>\n");
        },
        Plist::Dictionary(dict) => {
            indent(xml, depth);
            xml.push_str("<dict>\n");
            for (key, child) in dict {
                write_leaf(xml, depth + 1, "key", &escape_xml(key));
                write_value(xml, child, depth + 1);
            }
            indent(xml, depth);
            xml.push_str("</dict>\n");
        },
        Plist::Array(items) if items.is_empty() => {
            indent(xml, depth);
            xml.push_str("<array/>\n");
        },
        Plist::Array(items) => {
            indent(xml, depth);
            xml.push_str("<array>\n");
            for child in items {
                write_value(xml, child, depth + 1);
            }
            indent(xml, depth);
            xml.push_str("</array>\n");
        },
        Plist::String(s) => write_leaf(xml, depth, "string", &escape_xml(s)),
        Plist::Integer(n) => {
            let mut buffer = itoa::Buffer::new();
            write_leaf(xml, depth, "integer", buffer.format(*n));
        },
        Plist::Real(r) => write_leaf(xml, depth, "real", &format!("{r:.14}")),
        Plist::Date(date) => {
            write_leaf(xml, depth, "date", &date.format(DATE_FORMAT).to_string());
        },
        Plist::Data(bytes) => write_leaf(xml, depth, "data", &STANDARD.encode(bytes)),
        Plist::Boolean(b) => {
            indent(xml, depth);
            xml.push_str(if *b { "<true/>\n" } else { "<false/>\n" });
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn test_document_layout() {
        let mut dict = BTreeMap::new();
        dict.insert("b".to_string(), Plist::from(vec![Plist::from(1), Plist::from(false)]));
        dict.insert("a".to_string(), Plist::from("x < y"));
        let xml = write_document(&Plist::Dictionary(dict));
        let expected = format!(
            "{XML_HEADER}<dict>\n\
             \t<key>a</key>\n\
             \t<string>x &lt; y</string>\n\
             \t<key>b</key>\n\
             \t<array>\n\
             \t\t<integer>1</integer>\n\
             \t\t<false/>\n\
             \t</array>\n\
             </dict>\n{XML_FOOTER}"
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_leaf_formats() {
        let mut out = String::new();
        write_value(&mut out, &Plist::Real(0.5), 0);
        write_value(&mut out, &Plist::Data(b"Hello".to_vec()), 0);
        let date = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        write_value(&mut out, &Plist::Date(date), 0);
        write_value(&mut out, &Plist::Dictionary(BTreeMap::new()), 0);
        write_value(&mut out, &Plist::Array(Vec::new()), 1);
        assert_eq!(
            out,
            "<real>0.50000000000000</real>\n\
             <data>SGVsbG8=</data>\n\
             <date>1970-01-01T00:00:00Z</date>\n\
             <dict/>\n\
             \t<array/>\n"
        );
    }

    #[test]
    fn test_keys_are_escaped() {
        let mut dict = BTreeMap::new();
        dict.insert("a&b".to_string(), Plist::from(true));
        let mut out = String::new();
        write_value(&mut out, &Plist::Dictionary(dict), 0);
        assert!(out.contains("<key>a&amp;b</key>"));
    }
}
