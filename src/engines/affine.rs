//! Affine cipher engine.
//!
//! Encryption is the linear map E(x) = (a*x + b) mod 26 over letter
//! indices; decryption applies the modular inverse of `a`. Only the twelve
//! values of `a` coprime with 26 are valid, giving 312 keys in total,
//! which is small enough to enumerate outright.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::StatisticsProfile;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Multipliers coprime with 26.
pub const VALID_A: [u8; 12] = [1, 3, 5, 7, 9, 11, 15, 17, 19, 21, 23, 25];

/// The affine cipher engine.
pub struct AffineEngine;

/// Modular multiplicative inverse of `a` mod `m`, when gcd(a, m) = 1.
fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    let (mut old_r, mut r) = (a.rem_euclid(m), m);
    let (mut old_s, mut s) = (1i64, 0i64);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(m))
}

/// Apply E(x) = (a*x + b) mod 26, uppercasing; non-letters pass through.
fn affine_encrypt(text: &str, a: u8, b: u8) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let x = (c.to_ascii_uppercase() as u8 - b'A') as u32;
                (b'A' + ((a as u32 * x + b as u32) % 26) as u8) as char
            } else {
                c
            }
        })
        .collect()
}

/// Apply D(y) = a_inv * (y - b) mod 26.
fn affine_decrypt(text: &str, a_inv: i64, b: u8) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let y = (c.to_ascii_uppercase() as u8 - b'A') as i64;
                let x = (a_inv * (y - b as i64)).rem_euclid(26);
                (b'A' + x as u8) as char
            } else {
                c
            }
        })
        .collect()
}

impl CipherEngine for AffineEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Affine
    }

    fn name(&self) -> &'static str {
        "Affine Cipher"
    }

    fn description(&self) -> &'static str {
        "A monoalphabetic cipher using the linear map E(x) = (ax + b) mod 26. \
         The multiplier must be coprime with 26, leaving 312 possible keys."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.06 {
            0.5
        } else if ioc > 0.05 {
            0.3
        } else {
            0.1
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        _statistics: &StatisticsProfile,
        _options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        trace!("enumerating all 312 affine keys");
        let mut candidates = Vec::with_capacity(312);
        for &a in &VALID_A {
            let Some(a_inv) = mod_inverse(a as i64, 26) else {
                continue;
            };
            for b in 0..26u8 {
                let plaintext = affine_decrypt(ciphertext, a_inv, b);
                let (_, score) = scoring::best_combined(&plaintext);
                candidates.push(RawCandidate {
                    plaintext,
                    cipher_type: CipherType::Affine,
                    key: CipherKey::Affine { a, b },
                    method: "brute_force",
                    score,
                });
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
        let CipherKey::Affine { a, b } = key else {
            return Err(CipherError::InvalidKey("affine expects an 'a,b' pair".into()));
        };
        let a_inv = mod_inverse(*a as i64, 26).ok_or_else(|| {
            CipherError::InvalidKey(format!("a={a} is not coprime with 26"))
        })?;
        if *b > 25 {
            return Err(CipherError::InvalidKey(format!("b={b} must be in 0..=25")));
        }
        let plaintext = affine_decrypt(ciphertext, a_inv, *b);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let CipherKey::Affine { a, b } = key else {
            return Err(CipherError::InvalidKey("affine expects an 'a,b' pair".into()));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "a={a} must be coprime with 26 and b={b} in 0..=25"
            )));
        }
        Ok(affine_encrypt(plaintext, *a, *b))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        let a = *VALID_A.choose(rng).unwrap_or(&5);
        let b = rng.random_range(0..26);
        CipherKey::Affine { a, b }
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Affine { a, b } if VALID_A.contains(a) && *b <= 25)
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, key: &CipherKey) -> String {
        let (a, b) = match key {
            CipherKey::Affine { a, b } => (*a, *b),
            _ => (0, 0),
        };
        let a_inv = mod_inverse(a as i64, 26).unwrap_or(0);
        format!(
            "Affine cipher with a={a}, b={b}. Encryption maps x to ({a}x + {b}) mod 26; \
             decryption multiplies by the modular inverse of {a}, which is {a_inv}."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;
    use rand::SeedableRng;

    #[test]
    fn known_vector_a5_b8() {
        let engine = AffineEngine;
        let key = CipherKey::Affine { a: 5, b: 8 };
        let ct = engine.encrypt("AFFINECIPHER", &key).unwrap();
        assert_eq!(ct, "IHHWVCSWFRCP");
        let back = engine.decrypt_with_key(&ct, &key).unwrap();
        assert_eq!(back.plaintext, "AFFINECIPHER");
    }

    #[test]
    fn brute_force_recovers_the_key() {
        let engine = AffineEngine;
        let key = CipherKey::Affine { a: 5, b: 8 };
        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG";
        let ciphertext = engine.encrypt(plaintext, &key).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let candidates =
            engine.attempt_decrypt(&ciphertext, &stats, &AnalysisOptions::default());
        assert_eq!(candidates[0].key, key);
        assert_eq!(candidates[0].plaintext, plaintext);
    }

    #[test]
    fn mod_inverse_matches_known_pairs() {
        assert_eq!(mod_inverse(5, 26), Some(21));
        assert_eq!(mod_inverse(7, 26), Some(15));
        assert_eq!(mod_inverse(25, 26), Some(25));
        assert_eq!(mod_inverse(13, 26), None);
        assert_eq!(mod_inverse(2, 26), None);
    }

    #[test]
    fn non_coprime_multiplier_is_rejected() {
        let engine = AffineEngine;
        let key = CipherKey::Affine { a: 13, b: 4 };
        assert!(!engine.validate_key(&key));
        assert!(engine.encrypt("ABC", &key).is_err());
        assert!(engine.decrypt_with_key("ABC", &key).is_err());
    }

    #[test]
    fn identity_key_round_trips() {
        let engine = AffineEngine;
        let key = CipherKey::Affine { a: 1, b: 0 };
        assert_eq!(engine.encrypt("NOCHANGE", &key).unwrap(), "NOCHANGE");
    }

    #[test]
    fn random_keys_are_always_valid() {
        let engine = AffineEngine;
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert!(engine.validate_key(&engine.generate_random_key(&mut rng)));
        }
    }
}
