//! RTF field instructions.
//!
//! RTF fields are structured as:
//! {\field{\*\fldinst FIELD_INSTRUCTION}{\fldrslt FIELD_RESULT}}
//!
//! An instruction is a keyword, an optional argument and switches, e.g.
//! `HYPERLINK "https://example.com" \o "tooltip"` or `PAGE \* roman`.
//! The scanner makes one forward pass; whether a switch consumes the next
//! token as its argument depends on the field type, and switches it does
//! not know never do.

/// Field type in RTF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Hyperlink field
    Hyperlink,
    /// Picture loaded from a file
    IncludePicture,
    /// Page number
    Page,
    /// Cross-reference
    Reference,
    /// Date/time
    Date,
    /// Table of contents
    Toc,
    /// Unknown or custom field
    Unknown,
}

impl FieldType {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "HYPERLINK" => FieldType::Hyperlink,
            "INCLUDEPICTURE" => FieldType::IncludePicture,
            "PAGE" => FieldType::Page,
            "REF" | "PAGEREF" | "NOTEREF" => FieldType::Reference,
            "DATE" | "TIME" | "CREATEDATE" | "SAVEDATE" | "PRINTDATE" => FieldType::Date,
            "TOC" => FieldType::Toc,
            _ => FieldType::Unknown,
        }
    }

    /// Whether `switch` takes the following token as its argument.
    fn switch_takes_argument(self, switch: &str) -> bool {
        // General formatting switches
        if matches!(switch, "*" | "#" | "@") {
            return true;
        }
        match self {
            FieldType::Hyperlink => matches!(switch, "l" | "o" | "t"),
            FieldType::IncludePicture => switch == "c",
            FieldType::Toc => matches!(switch, "b" | "f" | "l" | "o" | "s" | "t"),
            _ => false,
        }
    }
}

/// A switch such as `\o "tooltip"`, without the backslash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub name: String,
    pub argument: Option<String>,
}

/// Parsed field instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field type
    pub field_type: FieldType,
    /// The keyword as written
    pub keyword: String,
    /// First argument, e.g. the URL of a hyperlink
    pub argument: Option<String>,
    pub switches: Vec<Switch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Word(String),
    Switch(String),
}

impl Field {
    /// Parse a field instruction.
    ///
    /// Returns `None` for an instruction without a keyword.
    pub fn parse_instruction(instruction: &str) -> Option<Self> {
        let mut pieces = scan(instruction).into_iter().peekable();
        let keyword = match pieces.next()? {
            Piece::Word(word) => word,
            Piece::Switch(_) => return None,
        };
        let field_type = FieldType::from_keyword(&keyword);

        let mut argument = None;
        let mut switches = Vec::new();
        while let Some(piece) = pieces.next() {
            match piece {
                Piece::Switch(name) => {
                    let argument = if field_type.switch_takes_argument(&name) {
                        pieces.next_if(|p| matches!(p, Piece::Word(_))).map(|p| match p {
                            Piece::Word(word) | Piece::Switch(word) => word,
                        })
                    } else {
                        None
                    };
                    switches.push(Switch { name, argument });
                },
                Piece::Word(word) => {
                    argument.get_or_insert(word);
                },
            }
        }

        Some(Self {
            field_type,
            keyword,
            argument,
            switches,
        })
    }

    /// Render a number the way the field's `\*` switches ask for.
    pub fn format_number(&self, number: u32) -> String {
        let mut format = NumberFormat::Arabic;
        let mut case = None;
        for switch in self.switches.iter().filter(|s| s.name == "*") {
            let Some(arg) = switch.argument.as_deref() else {
                continue;
            };
            if let Some(f) = NumberFormat::from_switch(arg) {
                format = f;
            } else if let Some(c) = CaseFormat::from_switch(arg) {
                case = Some(c);
            }
        }
        let text = format.format(number);
        match case {
            Some(case) => case.apply(&text),
            None => text,
        }
    }
}

/// Split an instruction into words and switches.
///
/// Quoted strings are single words; `\"` and `\\` inside quotes stand for
/// the quote and the backslash.
fn scan(instruction: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut chars = instruction.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut word = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '"' => break,
                    '\\' if matches!(chars.peek(), Some('"' | '\\')) => {
                        word.extend(chars.next());
                    },
                    c => word.push(c),
                }
            }
            pieces.push(Piece::Word(word));
        } else if c == '\\' {
            chars.next();
            let mut name = String::new();
            match chars.peek() {
                Some(&c) if c.is_ascii_alphabetic() => {
                    while let Some(c) = chars.next_if(char::is_ascii_alphabetic) {
                        name.push(c);
                    }
                },
                Some(&c) if !c.is_whitespace() => {
                    name.push(c);
                    chars.next();
                },
                _ => continue,
            }
            pieces.push(Piece::Switch(name));
        } else {
            let mut word = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '"' && *c != '\\') {
                word.push(c);
            }
            pieces.push(Piece::Word(word));
        }
    }

    pieces
}

/// Number format named by a `\*` switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberFormat {
    /// Arabic numerals (1, 2, 3...)
    #[default]
    Arabic,
    /// Lowercase letters (a, b, c...)
    LowercaseLetter,
    /// Uppercase letters (A, B, C...)
    UppercaseLetter,
    /// Lowercase Roman numerals (i, ii, iii...)
    LowercaseRoman,
    /// Uppercase Roman numerals (I, II, III...)
    UppercaseRoman,
    /// Ordinal (1st, 2nd, 3rd...)
    Ordinal,
    /// Cardinal text (one, two, three...)
    CardinalText,
    /// Ordinal text (first, second, third...)
    OrdinalText,
    /// Uppercase hexadecimal
    Hex,
}

impl NumberFormat {
    /// `roman` and `ROMAN`, `alphabetic` and `ALPHABETIC` differ by case;
    /// the other names do not.
    fn from_switch(name: &str) -> Option<Self> {
        let format = match name {
            "roman" => NumberFormat::LowercaseRoman,
            "ROMAN" => NumberFormat::UppercaseRoman,
            "alphabetic" => NumberFormat::LowercaseLetter,
            "ALPHABETIC" => NumberFormat::UppercaseLetter,
            _ => match name.to_ascii_lowercase().as_str() {
                "arabic" => NumberFormat::Arabic,
                "ordinal" => NumberFormat::Ordinal,
                "cardtext" => NumberFormat::CardinalText,
                "ordtext" => NumberFormat::OrdinalText,
                "hex" => NumberFormat::Hex,
                _ => return None,
            },
        };
        Some(format)
    }

    /// Format a number according to this format
    pub fn format(&self, number: u32) -> String {
        match self {
            NumberFormat::Arabic => number.to_string(),
            NumberFormat::LowercaseLetter => to_letter(number, false),
            NumberFormat::UppercaseLetter => to_letter(number, true),
            NumberFormat::LowercaseRoman => to_roman(number, false),
            NumberFormat::UppercaseRoman => to_roman(number, true),
            NumberFormat::Ordinal => to_ordinal(number),
            NumberFormat::CardinalText => to_cardinal_text(number),
            NumberFormat::OrdinalText => to_ordinal_text(number),
            NumberFormat::Hex => format!("{number:X}"),
        }
    }
}

/// Capitalization named by a `\*` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseFormat {
    Upper,
    Lower,
    FirstCap,
    Caps,
}

impl CaseFormat {
    fn from_switch(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "upper" => Some(CaseFormat::Upper),
            "lower" => Some(CaseFormat::Lower),
            "firstcap" => Some(CaseFormat::FirstCap),
            "caps" => Some(CaseFormat::Caps),
            _ => None,
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            CaseFormat::Upper => text.to_uppercase(),
            CaseFormat::Lower => text.to_lowercase(),
            CaseFormat::FirstCap => capitalize(text),
            CaseFormat::Caps => text
                .split(' ')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_letter(number: u32, uppercase: bool) -> String {
    let mut result = Vec::new();
    let mut n = number;
    while n > 0 {
        n -= 1;
        result.push((n % 26) as u8 + if uppercase { b'A' } else { b'a' });
        n /= 26;
    }
    result.iter().rev().map(|&b| b as char).collect()
}

fn to_roman(number: u32, uppercase: bool) -> String {
    const NUMERALS: [(&str, u32); 13] = [
        ("m", 1000), ("cm", 900), ("d", 500), ("cd", 400),
        ("c", 100), ("xc", 90), ("l", 50), ("xl", 40),
        ("x", 10), ("ix", 9), ("v", 5), ("iv", 4), ("i", 1),
    ];

    if number == 0 || number > 3999 {
        return number.to_string();
    }

    let mut result = String::new();
    let mut n = number;
    for (numeral, value) in NUMERALS {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    if uppercase {
        result.make_ascii_uppercase();
    }
    result
}

fn to_ordinal(number: u32) -> String {
    let suffix = match number % 100 {
        11..=13 => "th",
        _ => match number % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{number}{suffix}")
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn to_cardinal_text(number: u32) -> String {
    match number {
        0..20 => ONES[number as usize].to_string(),
        20..100 => match number % 10 {
            0 => TENS[(number / 10) as usize].to_string(),
            ones => format!("{}-{}", TENS[(number / 10) as usize], ONES[ones as usize]),
        },
        _ => number.to_string(),
    }
}

fn to_ordinal_text(number: u32) -> String {
    const ORDINALS: [&str; 20] = [
        "zeroth", "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth",
        "ninth", "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth",
        "sixteenth", "seventeenth", "eighteenth", "nineteenth",
    ];

    if number < 20 {
        return ORDINALS[number as usize].to_string();
    }
    to_ordinal(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch<'a>(field: &'a Field, name: &str) -> Option<&'a str> {
        field
            .switches
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.argument.as_deref())
    }

    #[test]
    fn test_parse_hyperlink() {
        let field = Field::parse_instruction(r#"HYPERLINK "https://example.com""#).unwrap();
        assert_eq!(field.field_type, FieldType::Hyperlink);
        assert_eq!(field.argument.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_parse_hyperlink_with_switches() {
        let field =
            Field::parse_instruction(r#" HYPERLINK "https://example.com" \o "Click \"here\"" \l top \h"#)
                .unwrap();
        assert_eq!(switch(&field, "o"), Some(r#"Click "here""#));
        assert_eq!(field.argument.as_deref(), Some("https://example.com"));
        assert_eq!(switch(&field, "l"), Some("top"));
        assert!(field.switches.iter().any(|s| s.name == "h"));
    }

    #[test]
    fn test_unknown_switch_takes_no_argument() {
        let field = Field::parse_instruction(r"MERGEFIELD \z Name").unwrap();
        assert_eq!(field.field_type, FieldType::Unknown);
        assert_eq!(field.switches, vec![Switch { name: "z".into(), argument: None }]);
        assert_eq!(field.argument.as_deref(), Some("Name"));
    }

    #[test]
    fn test_parse_include_picture() {
        let field = Field::parse_instruction(r#"INCLUDEPICTURE "images\\logo.png" \d"#).unwrap();
        assert_eq!(field.field_type, FieldType::IncludePicture);
        assert_eq!(field.argument.as_deref(), Some(r"images\logo.png"));
    }

    #[test]
    fn test_empty_instruction() {
        assert!(Field::parse_instruction("   ").is_none());
        assert!(Field::parse_instruction(r"\* roman").is_none());
    }

    #[test]
    fn test_page_formats() {
        let page = |inst: &str| Field::parse_instruction(inst).unwrap().format_number(1);
        assert_eq!(page("PAGE"), "1");
        assert_eq!(page(r"PAGE \* MERGEFORMAT"), "1");
        assert_eq!(page(r"PAGE \* roman"), "i");
        assert_eq!(page(r"PAGE \* ROMAN"), "I");
        assert_eq!(page(r"PAGE \* alphabetic"), "a");
        assert_eq!(page(r"PAGE \* ALPHABETIC"), "A");
        assert_eq!(page(r"PAGE \* Ordinal"), "1st");
        assert_eq!(page(r"PAGE \* CardText"), "one");
        assert_eq!(page(r"PAGE \* OrdText \* Upper"), "FIRST");
        assert_eq!(page(r"PAGE \* CardText \* FirstCap"), "One");
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(NumberFormat::UppercaseRoman.format(1994), "MCMXCIV");
        assert_eq!(NumberFormat::LowercaseLetter.format(28), "ab");
        assert_eq!(NumberFormat::Ordinal.format(12), "12th");
        assert_eq!(NumberFormat::Ordinal.format(22), "22nd");
        assert_eq!(NumberFormat::CardinalText.format(42), "forty-two");
        assert_eq!(NumberFormat::Hex.format(255), "FF");
        assert_eq!(CaseFormat::Caps.apply("forty two"), "Forty Two");
    }
}
