//! Vigenère cipher engine.
//!
//! A repeating keyword shifts each letter by a different amount. Breaking
//! it is a two-step affair: estimate the key length (average column IoC,
//! cross-checked against Kasiski distance factors), then solve each column
//! as an independent Caesar cipher. A small dictionary of common keywords
//! is always tried as well.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::dictionary::KEYWORD_DICTIONARY;
use crate::errors::CipherError;
use crate::languages::{Language, ALL_LANGUAGES};
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

/// Below this many letters the column statistics are meaningless.
const MIN_CRACK_LENGTH: usize = 10;

/// How many estimated key lengths get a full per-column solve.
const KEY_LENGTHS_TO_TRY: usize = 5;

/// The Vigenère engine.
pub struct VigenereEngine;

/// Every `key_len`-th byte starting at `offset`, for canonicalized input.
pub(crate) fn column(text: &[u8], offset: usize, key_len: usize) -> Vec<u8> {
    text.iter().skip(offset).step_by(key_len).copied().collect()
}

/// Rank candidate key lengths by average column IoC, descending. Lengths
/// that also divide a Kasiski distance are promoted to the front.
pub(crate) fn estimate_key_lengths(
    text: &[u8],
    kasiski_distances: &[usize],
    max_key_length: usize,
) -> Vec<usize> {
    let n = text.len();
    if n < 2 {
        return vec![1];
    }

    let mut ranked: Vec<(usize, f64)> = (1..=max_key_length.min(n / 2))
        .map(|key_len| {
            let total: f64 = (0..key_len)
                .map(|offset| statistics::index_of_coincidence(&column(text, offset, key_len)))
                .sum();
            (key_len, total / key_len as f64)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut kasiski_factors: Vec<usize> = Vec::new();
    for &d in kasiski_distances {
        for f in 2..=max_key_length.min(d) {
            if d % f == 0 && !kasiski_factors.contains(&f) {
                kasiski_factors.push(f);
            }
        }
    }

    let mut promoted: Vec<usize> = Vec::new();
    let mut rest: Vec<usize> = Vec::new();
    for (len, _) in ranked {
        if kasiski_factors.contains(&len) {
            promoted.push(len);
        } else {
            rest.push(len);
        }
    }
    promoted.extend(rest);
    promoted.truncate(max_key_length);
    promoted
}

/// Chi-squared of a decrypted column against the target language, or the
/// best across all languages when none is set.
pub(crate) fn column_language_score(decrypted: &[u8], target: Option<Language>) -> f64 {
    match target {
        Some(lang) => statistics::chi_squared(decrypted, lang),
        None => ALL_LANGUAGES
            .iter()
            .map(|&lang| statistics::chi_squared(decrypted, lang))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Solve each column as a Caesar cipher and concatenate the shifts.
fn find_key(text: &[u8], key_len: usize, target: Option<Language>) -> String {
    let mut key = String::with_capacity(key_len);
    for offset in 0..key_len {
        let col = column(text, offset, key_len);
        let mut best_shift = 0u8;
        let mut best_score = f64::INFINITY;
        for shift in 0..26u8 {
            let decrypted: Vec<u8> = col
                .iter()
                .map(|&b| b'A' + ((b - b'A') + 26 - shift) % 26)
                .collect();
            let score = column_language_score(&decrypted, target);
            if score < best_score {
                best_score = score;
                best_shift = shift;
            }
        }
        key.push((b'A' + best_shift) as char);
    }
    key
}

/// Shift letters by the repeating keyword; non-letters pass through and do
/// not advance the key.
pub(crate) fn keyword_transform(text: &str, key: &str, encrypt: bool) -> String {
    let key_bytes = key.as_bytes();
    let mut key_idx = 0;
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let shift = key_bytes[key_idx % key_bytes.len()] - b'A';
                let idx = c.to_ascii_uppercase() as u8 - b'A';
                let out = if encrypt {
                    (idx + shift) % 26
                } else {
                    (idx + 26 - shift) % 26
                };
                key_idx += 1;
                (b'A' + out) as char
            } else {
                c
            }
        })
        .collect()
}

impl CipherEngine for VigenereEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Vigenere
    }

    fn name(&self) -> &'static str {
        "Vigenère Cipher"
    }

    fn description(&self) -> &'static str {
        "A polyalphabetic cipher where a repeating keyword selects a different \
         Caesar shift for every position. Broken by estimating the key length \
         from column statistics, then solving each column independently."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        let ioc = statistics.index_of_coincidence;
        let base = if ioc < 0.05 {
            0.8
        } else if ioc < 0.055 {
            0.6
        } else if ioc < 0.06 {
            0.4
        } else {
            0.1
        };
        // Repeated sequences at regular spacing point at a periodic key.
        if statistics.kasiski_distances.is_empty() {
            base
        } else {
            (base + 0.15).min(0.95)
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        statistics: &StatisticsProfile,
        options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let filtered = statistics::canonicalize(ciphertext);
        if filtered.len() < MIN_CRACK_LENGTH {
            debug!("text too short for Vigenère analysis");
            return Vec::new();
        }
        let bytes = filtered.as_bytes();

        let lengths = estimate_key_lengths(
            bytes,
            &statistics.kasiski_distances,
            options.max_key_length,
        );
        trace!("candidate key lengths: {:?}", &lengths[..lengths.len().min(8)]);

        let mut candidates = Vec::new();
        for &key_len in lengths.iter().take(KEY_LENGTHS_TO_TRY) {
            let key = find_key(bytes, key_len, options.target_language);
            let plaintext = keyword_transform(ciphertext, &key, false);
            let (_, score) = scoring::best_combined(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::Vigenere,
                key: CipherKey::Keyword(key),
                method: "kasiski_frequency",
                score,
            });
        }

        for word in KEYWORD_DICTIONARY.iter() {
            let plaintext = keyword_transform(ciphertext, word, false);
            let (_, score) = scoring::best_combined(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::Vigenere,
                key: CipherKey::Keyword(word.clone()),
                method: "dictionary",
                score,
            });
        }

        sort_and_trim(&mut candidates);
        candidates
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        let CipherKey::Keyword(word) = key else {
            return Err(CipherError::InvalidKey(
                "vigenère expects an alphabetic keyword".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "keyword '{word}' must be non-empty and alphabetic"
            )));
        }
        let plaintext = keyword_transform(ciphertext, word, false);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let CipherKey::Keyword(word) = key else {
            return Err(CipherError::InvalidKey(
                "vigenère expects an alphabetic keyword".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "keyword '{word}' must be non-empty and alphabetic"
            )));
        }
        Ok(keyword_transform(plaintext, word, true))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        let length = rng.random_range(4..=10);
        let word: String = (0..length)
            .map(|_| (b'A' + rng.random_range(0..26u8)) as char)
            .collect();
        CipherKey::Keyword(word)
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Keyword(word)
            if !word.is_empty() && word.bytes().all(|b| b.is_ascii_uppercase()))
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, key: &CipherKey) -> String {
        let word = key.to_string();
        let shifts: Vec<String> = word
            .bytes()
            .map(|b| format!("{}={}", b as char, b - b'A'))
            .collect();
        format!(
            "Vigenère cipher with keyword '{word}' (length {}). Letter shifts: {}. \
             Each ciphertext letter is shifted back by its key letter's alphabet position.",
            word.len(),
            shifts.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;

    #[test]
    fn classic_lemon_vector() {
        let engine = VigenereEngine;
        let key = CipherKey::Keyword("LEMON".into());
        let ct = engine.encrypt("ATTACKATDAWN", &key).unwrap();
        assert_eq!(ct, "LXFOPVEFRNHR");
        let back = engine.decrypt_with_key(&ct, &key).unwrap();
        assert_eq!(back.plaintext, "ATTACKATDAWN");
    }

    #[test]
    fn key_length_estimation_finds_the_period() {
        let engine = VigenereEngine;
        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG".repeat(3);
        let key = CipherKey::Keyword("KEYWORD".into());
        let ciphertext = engine.encrypt(&plaintext, &key).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let lengths = estimate_key_lengths(
            ciphertext.as_bytes(),
            &stats.kasiski_distances,
            15,
        );
        assert!(
            lengths[..3].contains(&7),
            "expected 7 near the front, got {:?}",
            &lengths[..5.min(lengths.len())]
        );
    }

    #[test]
    fn crack_recovers_a_dictionary_keyword() {
        let engine = VigenereEngine;
        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG".repeat(3);
        let key = CipherKey::Keyword("KEYWORD".into());
        let ciphertext = engine.encrypt(&plaintext, &key).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let candidates =
            engine.attempt_decrypt(&ciphertext, &stats, &AnalysisOptions::default());
        assert!(
            candidates
                .iter()
                .any(|c| c.key == CipherKey::Keyword("KEYWORD".into())),
            "keys found: {:?}",
            candidates.iter().map(|c| c.key.to_string()).collect::<Vec<_>>()
        );
        assert_eq!(candidates[0].plaintext, plaintext);
    }

    #[test]
    fn short_text_returns_no_candidates() {
        let engine = VigenereEngine;
        let stats = statistics::analyze("ABCDE");
        assert!(engine
            .attempt_decrypt("ABCDE", &stats, &AnalysisOptions::default())
            .is_empty());
    }

    #[test]
    fn single_letter_key_degenerates_to_caesar() {
        let engine = VigenereEngine;
        let key = CipherKey::Keyword("H".into());
        let ct = engine.encrypt("HELLO", &key).unwrap();
        assert_eq!(ct, "OLSSV");
    }

    #[test]
    fn non_letters_do_not_consume_key_positions() {
        let engine = VigenereEngine;
        let key = CipherKey::Keyword("AB".into());
        // A-shift 0, B-shift 1; the space must not desynchronize the key.
        let ct = engine.encrypt("AA AA", &key).unwrap();
        assert_eq!(ct, "AB AB");
    }

    #[test]
    fn rejects_empty_or_non_alphabetic_keywords() {
        let engine = VigenereEngine;
        assert!(!engine.validate_key(&CipherKey::Keyword("".into())));
        assert!(engine.validate_key(&CipherKey::Keyword("LEMON".into())));
        assert!(engine.decrypt_with_key("ABC", &CipherKey::Shift(3)).is_err());
    }
}
