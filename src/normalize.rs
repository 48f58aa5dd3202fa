//! Text folding into canonical comparable forms.
//!
//! Every string that takes part in matching passes through this module:
//! record fields once at load time, query tokens once per search. Folding is
//! case-insensitive, maps visually confusable Latin/Cyrillic letters onto a
//! single representative, and either strips or keeps delimiters depending on
//! the [`FoldMode`].

use std::borrow::Cow;

use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfc_quick};

/// The twelve confusable classes as `(canonical Latin, Cyrillic look-alike)`.
///
/// Lowercase only; uppercase input is lowercased before lookup, which covers
/// the uppercase forms of both scripts.
pub(crate) const HOMOGLYPH_CLASSES: [(char, char); 12] = [
    ('a', 'а'),
    ('b', 'в'),
    ('c', 'с'),
    ('e', 'е'),
    ('h', 'н'),
    ('k', 'к'),
    ('m', 'м'),
    ('o', 'о'),
    ('p', 'р'),
    ('t', 'т'),
    ('x', 'х'),
    ('y', 'у'),
];

/// Whether delimiters survive folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    /// Keep only `[a-z0-9а-яё]` after folding. Used for matching and indexing.
    Strict,
    /// Keep punctuation and whitespace. Used for positional tie-breaks and
    /// substring bonuses.
    Delimited,
}

/// Map a lowercase character to the canonical member of its confusable class.
///
/// Characters outside the twelve classes are returned unchanged.
///
/// # Examples
///
/// ```
/// use pricesearch::normalize::canonical_homoglyph;
///
/// assert_eq!(canonical_homoglyph('р'), 'p'); // Cyrillic er
/// assert_eq!(canonical_homoglyph('p'), 'p');
/// assert_eq!(canonical_homoglyph('ж'), 'ж');
/// ```
pub fn canonical_homoglyph(c: char) -> char {
    HOMOGLYPH_CLASSES
        .iter()
        .find(|&&(_, cyr)| cyr == c)
        .map_or(c, |&(latin, _)| latin)
}

/// Characters allowed through [`FoldMode::Strict`].
fn is_strict_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | 'а'..='я' | 'ё')
}

/// Compose the input to NFC so that decomposed letters such as `е` + U+0308
/// fold the same way as their precomposed form (`ё`).
///
/// Borrows when the input is already composed, which is the common case.
fn compose(text: &str) -> Cow<'_, str> {
    if text.is_ascii() || is_nfc_quick(text.chars()) == IsNormalized::Yes {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Fold `text` according to `mode`.
///
/// Lowercasing is per character (`char::to_lowercase`), so the result does
/// not depend on the position of a character within the string or on any
/// locale.
pub fn fold(text: &str, mode: FoldMode) -> String {
    let composed = compose(text);
    let mut out = String::with_capacity(composed.len());
    for c in composed.chars() {
        for lower in c.to_lowercase() {
            let canon = canonical_homoglyph(lower);
            if mode == FoldMode::Delimited || is_strict_char(canon) {
                out.push(canon);
            }
        }
    }
    // Canonicalizing a base letter can make it composable with a mark that
    // follows it (Cyrillic а + U+0300 becomes Latin a + U+0300).
    if mode == FoldMode::Delimited
        && !out.is_ascii()
        && is_nfc_quick(out.chars()) != IsNormalized::Yes
    {
        out = out.nfc().collect();
    }
    out
}

/// Fold `text` into its strict canonical form.
///
/// Lowercases, canonicalizes homoglyphs and strips everything outside
/// `[a-z0-9а-яё]`. Empty input yields an empty string; the function never
/// fails and is idempotent.
///
/// # Examples
///
/// ```
/// use pricesearch::normalize::normalize;
///
/// // Latin "a" and Cyrillic "а" fold to the same character.
/// assert_eq!(normalize("а"), normalize("a"));
/// assert_eq!(normalize("Болт М6-20"), "бoлtm620");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    fold(text, FoldMode::Strict)
}

/// Fold `text` like [`normalize`] but keep delimiters and whitespace.
///
/// # Examples
///
/// ```
/// use pricesearch::normalize::normalize_delimited;
///
/// assert_eq!(normalize_delimited("Bolt M6x20"), "bolt m6x20");
/// ```
pub fn normalize_delimited(text: &str) -> String {
    fold(text, FoldMode::Delimited)
}

/// Phonetic substitution for one lowercase character, in either direction.
///
/// `None` means the character has no entry and passes through unchanged.
/// Hard and soft signs map to the empty string.
fn transliteration(c: char) -> Option<&'static str> {
    let out = match c {
        // Cyrillic to Latin.
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Latin to Cyrillic.
        'a' => "а",
        'b' => "б",
        'v' | 'w' => "в",
        'g' => "г",
        'd' => "д",
        'e' => "е",
        'f' => "ф",
        'h' => "х",
        'i' => "и",
        'j' => "й",
        'k' => "к",
        'l' => "л",
        'm' => "м",
        'n' => "н",
        'o' => "о",
        'p' => "п",
        'r' => "р",
        's' => "с",
        't' => "т",
        'u' => "у",
        'x' => "кс",
        'y' => "ы",
        'z' => "з",
        _ => return None,
    };
    Some(out)
}

/// Transliterate `text` one character at a time between Cyrillic and Latin.
///
/// Each character is lowercased and substituted independently; there is no
/// homoglyph folding and no look-ahead. Characters without a table entry
/// (digits, punctuation, other scripts) pass through lowercased.
///
/// # Examples
///
/// ```
/// use pricesearch::normalize::transliterate;
///
/// assert_eq!(transliterate("Чаша"), "chasha");
/// assert_eq!(transliterate("zhuk"), "зхук");
/// assert_eq!(transliterate("m6"), "м6");
/// ```
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        for lower in c.to_lowercase() {
            match transliteration(lower) {
                Some(sub) => out.push_str(sub),
                None => out.push(lower),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- homoglyph classes ---

    #[test]
    fn every_class_folds_both_scripts_and_cases() {
        for (latin, cyr) in HOMOGLYPH_CLASSES {
            let upper_latin: String = latin.to_uppercase().collect();
            let upper_cyr: String = cyr.to_uppercase().collect();
            let expected = latin.to_string();
            assert_eq!(normalize(&latin.to_string()), expected);
            assert_eq!(normalize(&cyr.to_string()), expected, "cyrillic {cyr}");
            assert_eq!(normalize(&upper_latin), expected);
            assert_eq!(normalize(&upper_cyr), expected, "upper cyrillic {upper_cyr}");
        }
    }

    #[test]
    fn non_confusable_cyrillic_passes_through() {
        // У and К are confusables, Ж is not.
        assert_eq!(normalize("ЖУК"), "жyk");
        assert_eq!(normalize("щ"), "щ");
    }

    // --- strict mode ---

    #[test]
    fn strict_strips_delimiters() {
        assert_eq!(normalize("A-1 / b.2"), "a1b2");
    }

    #[test]
    fn strict_drops_other_scripts() {
        assert_eq!(normalize("ΑΒΓ 12"), "12");
    }

    #[test]
    fn strict_keeps_yo() {
        assert_eq!(normalize("Ёлка"), "ёлka");
    }

    #[test]
    fn decomposed_yo_composes_first() {
        assert_eq!(normalize("е\u{0308}"), "ё");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_delimited(""), "");
        assert_eq!(transliterate(""), "");
    }

    #[test]
    fn idempotent_on_mixed_input() {
        let samples = [
            "Болт М6х20 DIN 933",
            "  Ёж, ёлка; İstanbul ẞ  ",
            "(a+b)*[c]?^$\\",
            "е\u{0308}й\u{0306}",
            "а\u{0300}",
            "12345",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "strict: {s:?}");
            let once = normalize_delimited(s);
            assert_eq!(normalize_delimited(&once), once, "delimited: {s:?}");
        }
    }

    // --- delimited mode ---

    #[test]
    fn delimited_recomposes_after_homoglyph_folding() {
        // Cyrillic а has no precomposed grave form; Latin a does.
        assert_eq!(normalize_delimited("а\u{0300}"), "\u{e0}");
        assert_eq!(normalize_delimited("\u{e0}"), "\u{e0}");
    }

    #[test]
    fn delimited_keeps_punctuation() {
        assert_eq!(normalize_delimited("Кабель ВВГ-3x2.5"), "kaбeль bbг-3x2.5");
    }

    // --- transliteration ---

    #[test]
    fn transliterate_cyrillic_digraphs() {
        assert_eq!(transliterate("щука"), "schuka");
        assert_eq!(transliterate("Юла"), "yula");
    }

    #[test]
    fn transliterate_signs_vanish() {
        assert_eq!(transliterate("объём"), "obyom");
        assert_eq!(transliterate("соль"), "sol");
    }

    #[test]
    fn transliterate_latin_to_cyrillic() {
        assert_eq!(transliterate("box"), "бокс");
        assert_eq!(transliterate("Wago"), "ваго");
    }

    #[test]
    fn transliterate_has_no_homoglyph_folding() {
        // "с" is a confusable of Latin "c" but transliterates phonetically.
        assert_eq!(transliterate("с"), "s");
    }
}
