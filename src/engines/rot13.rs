//! ROT13: the Caesar cipher with its shift fixed at 13, making it
//! self-inverse. There is exactly one candidate to try.

use super::caesar::shift_text;
use super::interface::{CipherEngine, CipherKey, DecryptionResult, RawCandidate};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::StatisticsProfile;
use rand::rngs::StdRng;

/// Half the alphabet; applying the shift twice is the identity.
const ROT: u8 = 13;

/// The ROT13 engine.
pub struct Rot13Engine;

impl CipherEngine for Rot13Engine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Rot13
    }

    fn name(&self) -> &'static str {
        "ROT13"
    }

    fn description(&self) -> &'static str {
        "The Caesar cipher with a fixed shift of 13. Because 13 is half the \
         alphabet, encryption and decryption are the same operation."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.06 {
            0.3
        } else if ioc > 0.05 {
            0.15
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
        let plaintext = shift_text(ciphertext, ROT);
        let (_, score) = scoring::best_combined(&plaintext);
        vec![RawCandidate {
            plaintext,
            cipher_type: CipherType::Rot13,
            key: CipherKey::Shift(ROT),
            method: "fixed_shift",
            score,
        }]
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey("rot13 always uses shift 13".into()));
        }
        let plaintext = shift_text(ciphertext, ROT);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey("rot13 always uses shift 13".into()));
        }
        Ok(shift_text(plaintext, ROT))
    }

    fn generate_random_key(&self, _rng: &mut StdRng) -> CipherKey {
        CipherKey::Shift(ROT)
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Shift(13))
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, _key: &CipherKey) -> String {
        "ROT13 rotates every letter 13 positions. Applying it a second time \
         restores the original text."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rot13_is_self_inverse() {
        let engine = Rot13Engine;
        let key = CipherKey::Shift(13);
        let once = engine.encrypt("WHYDIDTHECHICKEN", &key).unwrap();
        let twice = engine.encrypt(&once, &key).unwrap();
        assert_eq!(twice, "WHYDIDTHECHICKEN");
    }

    #[test]
    fn known_mapping() {
        let engine = Rot13Engine;
        let ct = engine.encrypt("HELLO", &CipherKey::Shift(13)).unwrap();
        assert_eq!(ct, "URYYB");
    }

    #[test]
    fn only_shift_thirteen_is_valid() {
        let engine = Rot13Engine;
        assert!(engine.validate_key(&CipherKey::Shift(13)));
        assert!(!engine.validate_key(&CipherKey::Shift(7)));
        assert!(engine.encrypt("A", &CipherKey::Shift(7)).is_err());
    }
}
