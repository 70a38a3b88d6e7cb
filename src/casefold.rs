// SPDX-FileCopyrightText: 2022 Sascha Brawer <sascha@brawer.ch>
// SPDX-FileCopyrightText: 2026 The paranames authors
// SPDX-License-Identifier: MIT
//
// Comparison keys for names. Keys are case-folded according to the
// Unicode case folding algorithm, with the Unicode-provided special
// mapping for Turkic languages, so that "İstanbul" and "istanbul"
// collapse in Turkish but "I" and "ı" stay apart elsewhere.

use unicode_casefold::{Locale, UnicodeCaseFold, Variant};

// https://en.wikipedia.org/wiki/List_of_Turkic_languages
fn locale(lang: &str) -> Locale {
    // Regional variants such as "tt-cyrl" fold like their base language.
    let base = lang.split('-').next().unwrap_or(lang);
    match base {
        "aib" => Locale::Turkic, // Äynu
        "alt" => Locale::Turkic, // Southern Altai
        "atv" => Locale::Turkic, // Northern Altai
        "az" => Locale::Turkic,  // Azerbaijani
        "azb" => Locale::Turkic, // South Azerbaijani
        "ba" => Locale::Turkic,  // Bashkir
        "chg" => Locale::Turkic, // Chagatai
        "cjs" => Locale::Turkic, // Shor
        "crh" => Locale::Turkic, // Crimean Tatar
        "cv" => Locale::Turkic,  // Chuvash
        "gag" => Locale::Turkic, // Gagauz
        "kaa" => Locale::Turkic, // Karakalpak
        "kjh" => Locale::Turkic, // Khakas
        "kk" => Locale::Turkic,  // Kazakh
        "krc" => Locale::Turkic, // Karachay-Balkar
        "kum" => Locale::Turkic, // Kumyk
        "ky" => Locale::Turkic,  // Kyrgyz
        "nog" => Locale::Turkic, // Nogai
        "ota" => Locale::Turkic, // Ottoman Turkish
        "sah" => Locale::Turkic, // Yakut
        "tk" => Locale::Turkic,  // Turkmen
        "tr" => Locale::Turkic,  // Turkish
        "tt" => Locale::Turkic,  // Tatar
        "tyv" => Locale::Turkic, // Tuvan
        "ug" => Locale::Turkic,  // Uyghur
        "uz" => Locale::Turkic,  // Uzbek
        _ => Locale::NonTurkic,
    }
}

/// Folds `text` for comparison; runs of whitespace and control
/// characters become a single '_', leading and trailing ones vanish.
pub fn fold(lang: &str, text: &str) -> String {
    let mut s = String::with_capacity(text.len());
    let mut pending_gap = false;
    for c in text.case_fold_with(Variant::Full, locale(lang)) {
        if c.is_control() || c.is_whitespace() {
            pending_gap = !s.is_empty();
        } else {
            if pending_gap {
                s.push('_');
                pending_gap = false;
            }
            s.push(c);
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_spaces() {
        assert_eq!(fold("en", "  Joe   BIDEN "), "joe_biden");
        assert_eq!(fold("de", "Straße"), "strasse");
    }

    #[test]
    fn turkic_dotted_i() {
        assert_eq!(fold("tr", "İstanbul"), "istanbul");
        assert_eq!(fold("tr", "IRMAK"), "ırmak");
        assert_eq!(fold("en", "IRMAK"), "irmak");
        assert_eq!(fold("tt-cyrl", "I"), "ı");
    }
}
