//! Autokey cipher engine.
//!
//! A Vigenère variant where the keystream is the primer followed by the
//! plaintext itself, so the key never repeats and the Kasiski examination
//! finds nothing. Decryption rebuilds the keystream one letter at a time.
//! Cracking tries common primers, exhausts primer lengths one and two, and
//! for lengths three to five restricts each position to the most frequent
//! plaintext letters.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

/// Below this many letters the search is hopeless.
const MIN_CRACK_LENGTH: usize = 5;

/// Word primers tried before the positional search.
const COMMON_PRIMERS: [&str; 5] = ["KEY", "SECRET", "THE", "CODE", "CIPHER"];

/// Restricted per-position alphabet for primer lengths three to five.
const LIKELY_PRIMER_LETTERS: [u8; 4] = [b'E', b'T', b'A', b'O'];

/// Longest primer the positional search considers.
const MAX_PRIMER_LENGTH: usize = 5;

/// The Autokey engine.
pub struct AutokeyEngine;

/// Encrypt with keystream primer + plaintext letters. Non-letters pass
/// through without consuming keystream.
fn autokey_encrypt(plaintext: &str, primer: &str) -> String {
    let letters: Vec<u8> = plaintext
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase() as u8 - b'A')
        .collect();
    let mut keystream: Vec<u8> = primer.bytes().map(|b| b - b'A').collect();
    keystream.extend(&letters);

    let mut key_idx = 0;
    plaintext
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let p = c.to_ascii_uppercase() as u8 - b'A';
                let out = (p + keystream[key_idx]) % 26;
                key_idx += 1;
                (b'A' + out) as char
            } else {
                c
            }
        })
        .collect()
}

/// Decrypt by reconstructing the keystream: each recovered plaintext
/// letter is appended to the key for later positions.
fn autokey_decrypt(ciphertext: &str, primer: &str) -> String {
    let mut keystream: Vec<u8> = primer.bytes().map(|b| b - b'A').collect();
    let mut key_idx = 0;
    ciphertext
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let y = c.to_ascii_uppercase() as u8 - b'A';
                let shift = keystream[key_idx];
                let p = (y + 26 - shift) % 26;
                keystream.push(p);
                key_idx += 1;
                (b'A' + p) as char
            } else {
                c
            }
        })
        .collect()
}

/// Enumerate primers over the given alphabet with the given length,
/// keeping the chi-best few attempts.
fn search_primers(
    ciphertext: &str,
    alphabet: &[u8],
    length: usize,
    candidates: &mut Vec<RawCandidate>,
) {
    let mut indices = vec![0usize; length];
    loop {
        let primer: String = indices.iter().map(|&i| alphabet[i] as char).collect();
        let plaintext = autokey_decrypt(ciphertext, &primer);
        let (_, score) = scoring::best_chi_squared(&plaintext);
        candidates.push(RawCandidate {
            plaintext,
            cipher_type: CipherType::Autokey,
            key: CipherKey::Keyword(primer),
            method: "primer_search",
            score,
        });

        // Odometer increment over the alphabet.
        let mut pos = length;
        loop {
            if pos == 0 {
                return;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < alphabet.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

impl CipherEngine for AutokeyEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Autokey
    }

    fn name(&self) -> &'static str {
        "Autokey Cipher"
    }

    fn description(&self) -> &'static str {
        "A polyalphabetic cipher whose keystream is a short primer followed by \
         the plaintext itself. The non-repeating key defeats the Kasiski \
         examination that breaks Vigenère."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        // The keystream is natural language rather than uniform, so the IoC
        // sits between random and plain text.
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.04 && ioc < 0.06 {
            0.4
        } else if ioc <= 0.04 {
            0.1
        } else {
            0.2
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        _statistics: &StatisticsProfile,
        _options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let filtered = statistics::canonicalize(ciphertext);
        if filtered.len() < MIN_CRACK_LENGTH {
            debug!("text too short for Autokey analysis");
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for primer in COMMON_PRIMERS {
            let plaintext = autokey_decrypt(ciphertext, primer);
            let (_, score) = scoring::best_chi_squared(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::Autokey,
                key: CipherKey::Keyword(primer.to_string()),
                method: "dictionary",
                score,
            });
        }

        // Lengths 1 and 2 are cheap enough to exhaust; beyond that the
        // per-position alphabet narrows to the most frequent letters.
        let full: Vec<u8> = (b'A'..=b'Z').collect();
        trace!("searching autokey primers up to length {MAX_PRIMER_LENGTH}");
        for length in 1..=MAX_PRIMER_LENGTH {
            if length <= 2 {
                search_primers(ciphertext, &full, length, &mut candidates);
            } else {
                search_primers(ciphertext, &LIKELY_PRIMER_LETTERS, length, &mut candidates);
            }
        }

        sort_and_trim(&mut candidates);
        candidates
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        let CipherKey::Keyword(primer) = key else {
            return Err(CipherError::InvalidKey(
                "autokey expects an alphabetic primer".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "primer '{primer}' must be non-empty and alphabetic"
            )));
        }
        let plaintext = autokey_decrypt(ciphertext, primer);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let CipherKey::Keyword(primer) = key else {
            return Err(CipherError::InvalidKey(
                "autokey expects an alphabetic primer".into(),
            ));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "primer '{primer}' must be non-empty and alphabetic"
            )));
        }
        Ok(autokey_encrypt(plaintext, primer))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        let length = rng.random_range(1..=5);
        let word: String = (0..length)
            .map(|_| (b'A' + rng.random_range(0..26u8)) as char)
            .collect();
        CipherKey::Keyword(word)
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Keyword(word)
            if !word.is_empty() && word.bytes().all(|b| b.is_ascii_uppercase()))
    }

    fn explain(&self, _ciphertext: &str, plaintext: &str, key: &CipherKey) -> String {
        let preview: String = statistics::canonicalize(plaintext).chars().take(10).collect();
        format!(
            "Autokey cipher with primer '{key}'. The keystream starts with the \
             primer and continues with the plaintext itself ({key}{preview}...), \
             so the key never repeats."
        )
    }
}
