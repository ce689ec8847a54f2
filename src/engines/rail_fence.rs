//! Rail fence cipher engine.
//!
//! The plaintext zigzags across `r` rails and the ciphertext reads the
//! rails row by row. The key space is tiny, so cracking brute-forces every
//! rail count. Transposition only rearranges letters; both directions work
//! over the canonicalized text.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::trace;
use rand::rngs::StdRng;
use rand::Rng;

/// Smallest meaningful rail count.
const MIN_RAILS: u8 = 2;

/// The rail fence engine.
pub struct RailFenceEngine;

/// Rail index for position `i` in the zigzag with `rails` rails.
fn rail_at(i: usize, rails: usize) -> usize {
    let period = 2 * rails - 2;
    let phase = i % period;
    rails - 1 - phase.abs_diff(rails - 1)
}

/// Write the canonicalized text in a zigzag and read off row by row.
fn rail_encrypt(text: &str, rails: usize) -> String {
    let filtered = statistics::canonicalize(text);
    let n = filtered.len();
    if rails <= 1 || rails >= n {
        return filtered;
    }

    let bytes = filtered.as_bytes();
    let mut fence: Vec<Vec<u8>> = vec![Vec::new(); rails];
    for (i, &b) in bytes.iter().enumerate() {
        fence[rail_at(i, rails)].push(b);
    }
    fence.into_iter().flatten().map(|b| b as char).collect()
}

/// Reconstruct the rail lengths, slice the ciphertext into rails, then
/// walk the zigzag pulling one character from the assigned rail.
fn rail_decrypt(text: &str, rails: usize) -> String {
    let filtered = statistics::canonicalize(text);
    let n = filtered.len();
    if rails <= 1 || rails >= n {
        return filtered;
    }

    let bytes = filtered.as_bytes();
    let mut rail_lengths = vec![0usize; rails];
    for i in 0..n {
        rail_lengths[rail_at(i, rails)] += 1;
    }

    let mut fences: Vec<&[u8]> = Vec::with_capacity(rails);
    let mut start = 0;
    for &len in &rail_lengths {
        fences.push(&bytes[start..start + len]);
        start += len;
    }

    let mut cursors = vec![0usize; rails];
    let mut out = String::with_capacity(n);
    for i in 0..n {
        let rail = rail_at(i, rails);
        out.push(fences[rail][cursors[rail]] as char);
        cursors[rail] += 1;
    }
    out
}

impl CipherEngine for RailFenceEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::RailFence
    }

    fn name(&self) -> &'static str {
        "Rail Fence Cipher"
    }

    fn description(&self) -> &'static str {
        "A transposition cipher that writes the plaintext in a zigzag across \
         several rails and reads each rail in sequence. The rail count is \
         the entire key."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        // Transposition keeps letter frequencies intact, so the IoC should
        // sit squarely in natural-language range.
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.065 {
            0.5
        } else if ioc > 0.06 {
            0.3
        } else {
            0.1
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        _statistics: &StatisticsProfile,
        options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let filtered = statistics::canonicalize(ciphertext);
        let max_rails = options.max_rails.min(filtered.len() / 2);
        trace!("brute-forcing rail counts 2..={max_rails}");

        let mut candidates = Vec::new();
        for rails in MIN_RAILS as usize..=max_rails {
            let plaintext = rail_decrypt(&filtered, rails);
            let (_, score) = scoring::best_combined(&plaintext);
            candidates.push(RawCandidate {
                plaintext,
                cipher_type: CipherType::RailFence,
                key: CipherKey::Rails(rails as u8),
                method: "brute_force",
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
        let CipherKey::Rails(rails) = key else {
            return Err(CipherError::InvalidKey("rail fence expects a rail count".into()));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "rail count {rails} must be at least 2"
            )));
        }
        let plaintext = rail_decrypt(ciphertext, *rails as usize);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let CipherKey::Rails(rails) = key else {
            return Err(CipherError::InvalidKey("rail fence expects a rail count".into()));
        };
        if !self.validate_key(key) {
            return Err(CipherError::InvalidKey(format!(
                "rail count {rails} must be at least 2"
            )));
        }
        Ok(rail_encrypt(plaintext, *rails as usize))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        CipherKey::Rails(rng.random_range(2..=10))
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        matches!(key, CipherKey::Rails(rails) if *rails >= MIN_RAILS)
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, key: &CipherKey) -> String {
        format!(
            "Rail fence cipher with {key} rails. The plaintext zigzags across \
             {key} rows and the ciphertext reads each row in sequence; decryption \
             rebuilds the row lengths and walks the zigzag back."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;

    #[test]
    fn zigzag_assignment_for_three_rails() {
        let rails: Vec<usize> = (0..8).map(|i| rail_at(i, 3)).collect();
        assert_eq!(rails, vec![0, 1, 2, 1, 0, 1, 2, 1]);
    }

    #[test]
    fn classic_three_rail_vector() {
        let engine = RailFenceEngine;
        let key = CipherKey::Rails(3);
        let ct = engine.encrypt("WEAREDISCOVEREDRUNATONCE", &key).unwrap();
        assert_eq!(ct, "WECRUOERDSOEERNTNEAIVDAC");
        let back = engine.decrypt_with_key(&ct, &key).unwrap();
        assert_eq!(back.plaintext, "WEAREDISCOVEREDRUNATONCE");
    }

    #[test]
    fn round_trip_across_rail_counts() {
        let engine = RailFenceEngine;
        let plaintext = "DEFENDTHEEASTWALLOFTHECASTLE";
        for rails in 2..=9u8 {
            let key = CipherKey::Rails(rails);
            let ct = engine.encrypt(plaintext, &key).unwrap();
            let back = engine.decrypt_with_key(&ct, &key).unwrap();
            assert_eq!(back.plaintext, plaintext, "rails={rails}");
        }
    }

    #[test]
    fn brute_force_recovers_the_rail_count() {
        let engine = RailFenceEngine;
        let key = CipherKey::Rails(3);
        let ciphertext = engine.encrypt("WEAREDISCOVEREDRUNATONCE", &key).unwrap();
        let stats = statistics::analyze(&ciphertext);
        let candidates =
            engine.attempt_decrypt(&ciphertext, &stats, &AnalysisOptions::default());
        assert_eq!(candidates[0].key, CipherKey::Rails(3));
        assert_eq!(candidates[0].plaintext, "WEAREDISCOVEREDRUNATONCE");
    }

    #[test]
    fn degenerate_rail_counts_are_identity() {
        // More rails than letters leaves the text unchanged.
        assert_eq!(rail_encrypt("ABC", 5), "ABC");
        assert_eq!(rail_decrypt("ABC", 5), "ABC");
    }

    #[test]
    fn rejects_rail_count_below_two() {
        let engine = RailFenceEngine;
        assert!(!engine.validate_key(&CipherKey::Rails(1)));
        assert!(engine.encrypt("ABCDEF", &CipherKey::Rails(1)).is_err());
    }
}
