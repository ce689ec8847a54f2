//! Caesar cipher engine.
//!
//! A fixed shift of the alphabet. With only 26 keys it is broken by brute
//! force: every shift is tried and the multi-language scorer ranks the
//! results.

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
use rand::Rng;

/// The Caesar shift engine.
pub struct CaesarEngine;

/// Shift every letter forward by `shift`, uppercasing as it goes.
/// Non-letters pass through untouched.
pub(crate) fn shift_text(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let idx = (c.to_ascii_uppercase() as u8 - b'A' + shift) % 26;
                (b'A' + idx) as char
            } else {
                c
            }
        })
        .collect()
}

/// Undo a forward shift.
pub(crate) fn unshift_text(text: &str, shift: u8) -> String {
    shift_text(text, (26 - shift % 26) % 26)
}

impl CipherEngine for CaesarEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Caesar
    }

    fn name(&self) -> &'static str {
        "Caesar Cipher"
    }

    fn description(&self) -> &'static str {
        "A substitution cipher where each letter is shifted by a fixed amount. \
         Named after Julius Caesar, who used it for military communications."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        // The shift preserves letter frequencies, so a natural-language IoC
        // is the signature.
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.06 {
            0.7
        } else if ioc > 0.05 {
            0.4
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
        trace!("brute-forcing all 26 Caesar shifts");
        let mut candidates: Vec<RawCandidate> = (0..26u8)
            .map(|shift| {
                let plaintext = unshift_text(ciphertext, shift);
                let (_, score) = scoring::best_combined(&plaintext);
                RawCandidate {
                    plaintext,
                    cipher_type: CipherType::Caesar,
                    key: CipherKey::Shift(shift),
                    method: "brute_force",
                    score,
                }
            })
            .collect();
        sort_and_trim(&mut candidates);
        candidates
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        let CipherKey::Shift(shift) = key else {
            return Err(CipherError::InvalidKey(
                "caesar expects a shift in 0..=25".into(),
            ));
        };
        let plaintext = unshift_text(ciphertext, *shift);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let CipherKey::Shift(shift) = key else {
            return Err(CipherError::InvalidKey(
                "caesar expects a shift in 0..=25".into(),
            ));
        };
        Ok(shift_text(plaintext, *shift))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        CipherKey::Shift(rng.random_range(1..26))
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Shift(shift) if *shift <= 25)
    }

    fn explain(&self, ciphertext: &str, plaintext: &str, key: &CipherKey) -> String {
        let first_ct = ciphertext.chars().next().unwrap_or('?');
        let first_pt = plaintext.chars().next().unwrap_or('?');
        format!(
            "Caesar cipher with shift {key}. Each letter was shifted back {key} positions \
             in the alphabet; the first ciphertext letter '{first_ct}' becomes '{first_pt}'."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;
    use rand::SeedableRng;

    #[test]
    fn known_shift_seven_round_trip() {
        let engine = CaesarEngine;
        let ct = engine.encrypt("HELLO", &CipherKey::Shift(7)).unwrap();
        assert_eq!(ct, "OLSSV");
        let result = engine.decrypt_with_key("OLSSV", &CipherKey::Shift(7)).unwrap();
        assert_eq!(result.plaintext, "HELLO");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn brute_force_recovers_the_shift() {
        let engine = CaesarEngine;
        let plaintext = "THERAININSPAINFALLSMAINLYONTHEPLAIN";
        let ciphertext = engine.encrypt(plaintext, &CipherKey::Shift(7)).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let candidates =
            engine.attempt_decrypt(&ciphertext, &stats, &AnalysisOptions::default());
        assert_eq!(candidates[0].key, CipherKey::Shift(7));
        assert_eq!(candidates[0].plaintext, plaintext);
        assert!(candidates.len() <= 5);
    }

    #[test]
    fn shift_zero_is_identity() {
        assert_eq!(shift_text("ATTACK AT DAWN", 0), "ATTACK AT DAWN");
    }

    #[test]
    fn non_letters_pass_through() {
        let engine = CaesarEngine;
        let ct = engine.encrypt("a b!", &CipherKey::Shift(1)).unwrap();
        assert_eq!(ct, "B C!");
    }

    #[test]
    fn rejects_foreign_key_shapes() {
        let engine = CaesarEngine;
        assert!(engine
            .decrypt_with_key("OLSSV", &CipherKey::Keyword("LEMON".into()))
            .is_err());
        assert!(!engine.validate_key(&CipherKey::Atbash));
        assert!(engine.validate_key(&CipherKey::Shift(25)));
    }

    #[test]
    fn random_keys_are_valid_and_nonzero() {
        let engine = CaesarEngine;
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let key = engine.generate_random_key(&mut rng);
            assert!(engine.validate_key(&key));
            assert_ne!(key, CipherKey::Shift(0));
        }
    }
}
