//! Atbash: the alphabet reversed, A <-> Z, B <-> Y. Originally a Hebrew
//! scribal cipher; self-inverse, with no key material at all.

use super::interface::{CipherEngine, CipherKey, DecryptionResult, RawCandidate};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::StatisticsProfile;
use rand::rngs::StdRng;

/// The Atbash engine.
pub struct AtbashEngine;

/// Map letter index i to 25 - i, uppercasing; non-letters pass through.
fn mirror(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                (b'Z' - (c.to_ascii_uppercase() as u8 - b'A')) as char
            } else {
                c
            }
        })
        .collect()
}

impl CipherEngine for AtbashEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Atbash
    }

    fn name(&self) -> &'static str {
        "Atbash Cipher"
    }

    fn description(&self) -> &'static str {
        "A substitution cipher where the alphabet is reversed: A becomes Z, \
         B becomes Y. Applying it twice returns the original text."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        // Monoalphabetic signature, but such a specific mapping that the
        // prior stays low.
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.06 {
            0.2
        } else if ioc > 0.05 {
            0.1
        } else {
            0.05
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        _statistics: &StatisticsProfile,
        _options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let plaintext = mirror(ciphertext);
        let (_, score) = scoring::best_combined(&plaintext);
        vec![RawCandidate {
            plaintext,
            cipher_type: CipherType::Atbash,
            key: CipherKey::Atbash,
            method: "fixed_substitution",
            score,
        }]
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(
                "atbash takes the literal key 'atbash'".into(),
            ));
        }
        let plaintext = mirror(ciphertext);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: CipherKey::Atbash,
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(
                "atbash takes the literal key 'atbash'".into(),
            ));
        }
        Ok(mirror(plaintext))
    }

    fn generate_random_key(&self, _rng: &mut StdRng) -> CipherKey {
        CipherKey::Atbash
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Atbash)
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, _key: &CipherKey) -> String {
        "Atbash maps each letter to its mirror in the alphabet (A to Z, B to Y). \
         The mapping is its own inverse."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atbash_is_self_inverse() {
        let engine = AtbashEngine;
        let once = engine.encrypt("WIZARD", &CipherKey::Atbash).unwrap();
        assert_eq!(once, "DRAZIW");
        let twice = engine.encrypt(&once, &CipherKey::Atbash).unwrap();
        assert_eq!(twice, "WIZARD");
    }

    #[test]
    fn known_mapping_at_the_ends() {
        assert_eq!(mirror("AZ"), "ZA");
        assert_eq!(mirror("NM"), "MN");
    }

    #[test]
    fn rejects_other_key_shapes() {
        let engine = AtbashEngine;
        assert!(engine.encrypt("A", &CipherKey::Shift(3)).is_err());
        assert!(engine.validate_key(&CipherKey::Atbash));
    }
}
