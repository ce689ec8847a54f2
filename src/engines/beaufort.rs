//! Beaufort cipher engine.
//!
//! A reciprocal keyword cipher: C = (K - P) mod 26. Because subtracting
//! from the key is an involution, the same transform both encrypts and
//! decrypts. Cracking mirrors Vigenère, with the per-column search running
//! through the inverted shift.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::vigenere::{column, column_language_score, estimate_key_lengths};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::dictionary::KEYWORD_DICTIONARY;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Below this many letters the column statistics are meaningless.
const MIN_CRACK_LENGTH: usize = 10;

/// How many estimated key lengths get a full per-column solve.
const KEY_LENGTHS_TO_TRY: usize = 5;

/// The Beaufort engine.
pub struct BeaufortEngine;

/// Apply the Beaufort transform: out = (key - in) mod 26. Involutive, so
/// this is both the encryption and the decryption. Non-letters pass
/// through without advancing the key.
fn beaufort_transform(text: &str, key: &str) -> String {
    let key_bytes = key.as_bytes();
    let mut key_idx = 0;
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let k = key_bytes[key_idx % key_bytes.len()] - b'A';
                let idx = c.to_ascii_uppercase() as u8 - b'A';
                key_idx += 1;
                (b'A' + (k + 26 - idx) % 26) as char
            } else {
                c
            }
        })
        .collect()
}

/// Solve each column: for Beaufort the candidate plaintext letter is
/// (shift - c) mod 26 rather than (c - shift).
fn find_key(text: &[u8], key_len: usize, options: &AnalysisOptions) -> String {
    let mut key = String::with_capacity(key_len);
    for offset in 0..key_len {
        let col = column(text, offset, key_len);
        let mut best_shift = 0u8;
        let mut best_score = f64::INFINITY;
        for shift in 0..26u8 {
            let decrypted: Vec<u8> = col
                .iter()
                .map(|&b| b'A' + (shift + 26 - (b - b'A')) % 26)
                .collect();
            let score = column_language_score(&decrypted, options.target_language);
            if score < best_score {
                best_score = score;
                best_shift = shift;
            }
        }
        key.push((b'A' + best_shift) as char);
    }
    key
}

impl CipherEngine for BeaufortEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Beaufort
    }

    fn name(&self) -> &'static str {
        "Beaufort Cipher"
    }

    fn description(&self) -> &'static str {
        "A reciprocal polyalphabetic cipher computing C = (K - P) mod 26. \
         Applying the same operation with the same key decrypts."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        // Same flattened-IoC signature as Vigenère, but rarer in practice.
        let ioc = statistics.index_of_coincidence;
        if ioc < 0.05 {
            0.4
        } else if ioc < 0.055 {
            0.3
        } else if ioc < 0.06 {
            0.2
        } else {
            0.05
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
            debug!("text too short for Beaufort analysis");
            return Vec::new();
        }
        let bytes = filtered.as_bytes();

        let lengths = estimate_key_lengths(
            bytes,
            &statistics.kasiski_distances,
            options.max_key_length,
        );

        let mut candidates = Vec::new();
        for &key_len in lengths.iter().take(KEY_LENGTHS_TO_TRY) {
            let key = find_key(bytes, key_len, options);
            let plaintext = beaufort_transform(ciphertext, &key);
            let (_, score) = scoring::best_combined(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::Beaufort,
                key: CipherKey::Keyword(key),
                method: "kasiski_frequency",
                score,
            });
        }

        for word in KEYWORD_DICTIONARY.iter() {
            let plaintext = beaufort_transform(ciphertext, word);
            let (_, score) = scoring::best_combined(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::Beaufort,
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
                "beaufort expects an alphabetic keyword".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "keyword '{word}' must be non-empty and alphabetic"
            )));
        }
        let plaintext = beaufort_transform(ciphertext, word);
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
                "beaufort expects an alphabetic keyword".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "keyword '{word}' must be non-empty and alphabetic"
            )));
        }
        Ok(beaufort_transform(plaintext, word))
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
        format!(
            "Beaufort cipher with keyword '{key}'. Each output letter is the key \
             letter minus the input letter, mod 26; the operation is its own inverse."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;

    #[test]
    fn beaufort_is_self_inverse() {
        let engine = BeaufortEngine;
        let key = CipherKey::Keyword("FORTIFY".into());
        let once = engine.encrypt("DEFENDTHEEASTWALL", &key).unwrap();
        let twice = engine.encrypt(&once, &key).unwrap();
        assert_eq!(twice, "DEFENDTHEEASTWALL");
    }

    #[test]
    fn known_single_letter_transform() {
        // Key "B" (=1): output = (1 - p) mod 26, so A->B and B->A.
        let engine = BeaufortEngine;
        let key = CipherKey::Keyword("B".into());
        assert_eq!(engine.encrypt("AB", &key).unwrap(), "BA");
    }

    #[test]
    fn crack_recovers_a_dictionary_key() {
        let engine = BeaufortEngine;
        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG".repeat(3);
        let key = CipherKey::Keyword("SECRET".into());
        let ciphertext = engine.encrypt(&plaintext, &key).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let candidates =
            engine.attempt_decrypt(&ciphertext, &stats, &AnalysisOptions::default());
        assert_eq!(candidates[0].plaintext, plaintext);
        assert_eq!(candidates[0].key, CipherKey::Keyword("SECRET".into()));
    }

    #[test]
    fn short_text_returns_no_candidates() {
        let engine = BeaufortEngine;
        let stats = statistics::analyze("ABC");
        assert!(engine
            .attempt_decrypt("ABC", &stats, &AnalysisOptions::default())
            .is_empty());
    }
}
