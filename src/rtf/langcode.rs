//! Windows language identifiers (`\lang`, `\deflang`) to ISO codes.

use phf::phf_map;

static LANGUAGES: phf::Map<u32, &'static str> = phf_map! {
    0x0401u32 => "ar-SA",
    0x0402u32 => "bg-BG",
    0x0403u32 => "ca-ES",
    0x0404u32 => "zh-TW",
    0x0405u32 => "cs-CZ",
    0x0406u32 => "da-DK",
    0x0407u32 => "de-DE",
    0x0408u32 => "el-GR",
    0x0409u32 => "en-US",
    0x040Au32 => "es-ES",
    0x040Bu32 => "fi-FI",
    0x040Cu32 => "fr-FR",
    0x040Du32 => "he-IL",
    0x040Eu32 => "hu-HU",
    0x040Fu32 => "is-IS",
    0x0410u32 => "it-IT",
    0x0411u32 => "ja-JP",
    0x0412u32 => "ko-KR",
    0x0413u32 => "nl-NL",
    0x0414u32 => "nb-NO",
    0x0415u32 => "pl-PL",
    0x0416u32 => "pt-BR",
    0x0417u32 => "rm-CH",
    0x0418u32 => "ro-RO",
    0x0419u32 => "ru-RU",
    0x041Au32 => "hr-HR",
    0x041Bu32 => "sk-SK",
    0x041Cu32 => "sq-AL",
    0x041Du32 => "sv-SE",
    0x041Eu32 => "th-TH",
    0x041Fu32 => "tr-TR",
    0x0420u32 => "ur-PK",
    0x0421u32 => "id-ID",
    0x0422u32 => "uk-UA",
    0x0423u32 => "be-BY",
    0x0424u32 => "sl-SI",
    0x0425u32 => "et-EE",
    0x0426u32 => "lv-LV",
    0x0427u32 => "lt-LT",
    0x0429u32 => "fa-IR",
    0x042Au32 => "vi-VN",
    0x042Bu32 => "hy-AM",
    0x042Du32 => "eu-ES",
    0x042Fu32 => "mk-MK",
    0x0436u32 => "af-ZA",
    0x0437u32 => "ka-GE",
    0x0438u32 => "fo-FO",
    0x0439u32 => "hi-IN",
    0x043Eu32 => "ms-MY",
    0x043Fu32 => "kk-KZ",
    0x0441u32 => "sw-KE",
    0x0445u32 => "bn-IN",
    0x0446u32 => "pa-IN",
    0x0447u32 => "gu-IN",
    0x0449u32 => "ta-IN",
    0x044Au32 => "te-IN",
    0x044Bu32 => "kn-IN",
    0x044Cu32 => "ml-IN",
    0x044Eu32 => "mr-IN",
    0x0452u32 => "cy-GB",
    0x0456u32 => "gl-ES",
    0x0462u32 => "fy-NL",
    0x0464u32 => "fil-PH",
    0x046Eu32 => "lb-LU",
    0x0481u32 => "mi-NZ",
    0x0804u32 => "zh-CN",
    0x0807u32 => "de-CH",
    0x0809u32 => "en-GB",
    0x080Au32 => "es-MX",
    0x080Cu32 => "fr-BE",
    0x0810u32 => "it-CH",
    0x0813u32 => "nl-BE",
    0x0814u32 => "nn-NO",
    0x0816u32 => "pt-PT",
    0x081Au32 => "sr-Latn-RS",
    0x081Du32 => "sv-FI",
    0x083Cu32 => "ga-IE",
    0x0C04u32 => "zh-HK",
    0x0C07u32 => "de-AT",
    0x0C09u32 => "en-AU",
    0x0C0Au32 => "es-ES",
    0x0C0Cu32 => "fr-CA",
    0x0C1Au32 => "sr-Cyrl-RS",
    0x1004u32 => "zh-SG",
    0x1009u32 => "en-CA",
    0x100Cu32 => "fr-CH",
    0x1409u32 => "en-NZ",
    0x1809u32 => "en-IE",
    0x1C09u32 => "en-ZA",
    0x2C0Au32 => "es-AR",
    0x4009u32 => "en-IN",
};

/// ISO code of a Windows language identifier, if it is a known one.
pub fn language_code(id: i32) -> Option<&'static str> {
    let id = u32::try_from(id).ok()?;
    LANGUAGES.get(&id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(language_code(1033), Some("en-US"));
        assert_eq!(language_code(2057), Some("en-GB"));
        assert_eq!(language_code(1041), Some("ja-JP"));
        // 1024 is "no language"
        assert_eq!(language_code(1024), None);
        assert_eq!(language_code(-1), None);
    }
}
