//! Locale-aware ordering of display names.
//!
//! Approximates the default (root/pt-BR) collation of browsers' `localeCompare`
//! in three levels: base letters ignoring case and accents, then accents,
//! then case with lowercase first. Names equal on all three levels fall back
//! to code-point order so the ordering is total.
//!
//! On the primary level compatibility forms are folded (`º` is `o`) and
//! whitespace, punctuation and symbols sort before digits, digits before
//! letters.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use legis_core::Suggestion;

/// ASCII punctuation and symbols in primary order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary weight of one character. Variant order is comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Weight {
    Space,
    Punctuation(u8),
    Symbol(char),
    Alphanumeric(char),
}

impl Weight {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Space
        } else if let Some(i) = PUNCTUATION_ORDER.find(c) {
            Self::Punctuation(i as u8)
        } else if c.is_alphanumeric() {
            Self::Alphanumeric(c)
        } else {
            Self::Symbol(c)
        }
    }
}

/// Sort key for one string. Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: Vec<Weight>,
    secondary: Vec<char>,
    tertiary: Vec<(char, bool)>,
    raw: String,
}

impl CollationKey {
    pub fn new(s: &str) -> Self {
        let decomposed: Vec<char> = s.nfd().collect();

        let primary = s
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .map(Weight::of)
            .collect();
        let secondary = decomposed.iter().flat_map(|c| c.to_lowercase()).collect();
        let tertiary = decomposed
            .iter()
            .flat_map(|c| {
                let upper = c.is_uppercase();
                c.to_lowercase().map(move |l| (l, upper))
            })
            .collect();

        Self {
            primary,
            secondary,
            tertiary,
            raw: s.to_string(),
        }
    }
}

/// Compare two display names the way the picker orders them.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Sort suggestions ascending by name.
pub fn sort_suggestions(suggestions: &mut [Suggestion]) {
    suggestions.sort_by_cached_key(|s| CollationKey::new(&s.name));
}
