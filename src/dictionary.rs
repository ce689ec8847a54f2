//! Shared keyword dictionary for dictionary attacks.
//!
//! Keys people actually pick: cryptography vocabulary, classic textbook
//! keywords, and a handful of common English words. Used by the Vigenère,
//! Beaufort, Autokey and Columnar solvers before any statistical search.

use lazy_static::lazy_static;

/// Raw keyword list; kept lowercase so additions stay readable.
const COMMON_KEYS: &[&str] = &[
    // Cryptography vocabulary
    "key", "keyword", "secret", "password", "cipher", "code", "crypto", "hidden",
    "mystery", "puzzle", "enigma", "secure", "private", "lock", "safe", "vigenere",
    // Classic textbook keys
    "lemon", "zebras", "fortification", "monarch", "kingdom", "column",
    // Common English words seen as keys
    "the", "and", "hello", "world", "test", "flag", "admin", "letter", "winter",
    "summer", "dragon", "wizard", "magic", "shadow", "silver", "golden",
];

lazy_static! {
    /// Uppercase dictionary used by the keyword-based crackers.
    pub static ref KEYWORD_DICTIONARY: Vec<String> = COMMON_KEYS
        .iter()
        .map(|word| word.to_ascii_uppercase())
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_is_uppercase_and_deduplicated() {
        for word in KEYWORD_DICTIONARY.iter() {
            assert!(word.bytes().all(|b| b.is_ascii_uppercase()), "{word}");
        }
        let mut sorted = KEYWORD_DICTIONARY.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), KEYWORD_DICTIONARY.len());
    }

    #[test]
    fn contains_the_classic_textbook_keys() {
        for expected in ["KEY", "SECRET", "KEYWORD", "LEMON", "CIPHER"] {
            assert!(KEYWORD_DICTIONARY.iter().any(|w| w == expected));
        }
    }
}
