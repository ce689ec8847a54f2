//! The engine contract shared by every cipher implementation.
//!
//! Engines are stateless: each exposes applicability detection, automated
//! cracking (`attempt_decrypt`), keyed decryption, encryption, key
//! validation/generation and a human-readable explanation. Automated
//! cracking is infallible by design; an engine that cannot make progress
//! returns an empty candidate list so the orchestrator keeps going.

use crate::config::AnalysisOptions;
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use rand::rngs::StdRng;
use serde::Serializer;
use std::fmt;

use super::CipherType;

/// How many candidates an engine returns from `attempt_decrypt`.
pub const MAX_CANDIDATES_PER_ENGINE: usize = 5;

/// A parsed, cipher-specific key.
///
/// Keys cross the API boundary as strings (`"7"`, `"5,8"`, `"LEMON"`,
/// `"3,1,4,2"`, a 26-letter permutation, or the literal `"atbash"`) and are
/// parsed into this tagged form before any engine sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherKey {
    /// Caesar / ROT13 shift in 0..=25.
    Shift(u8),
    /// Affine coefficients; `a` must be coprime with 26.
    Affine {
        /// Multiplicative coefficient.
        a: u8,
        /// Additive coefficient.
        b: u8,
    },
    /// The fixed Atbash mapping; carries no parameters.
    Atbash,
    /// A 26-letter alphabet permutation for simple substitution.
    Permutation(String),
    /// An uppercase keyword for Vigenère, Beaufort or Autokey.
    Keyword(String),
    /// Rail count for the rail fence cipher.
    Rails(u8),
    /// Explicit 1-indexed column ordering for columnar transposition.
    ColumnOrder(Vec<usize>),
}

impl CipherKey {
    /// Parse the boundary string form of a key for the given cipher.
    pub fn parse(cipher_type: CipherType, raw: &str) -> Result<CipherKey, CipherError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CipherError::InvalidKey("key must not be empty".into()));
        }
        match cipher_type {
            CipherType::Caesar | CipherType::Rot13 => {
                let shift: i64 = trimmed
                    .parse()
                    .map_err(|_| CipherError::InvalidKey(format!("'{trimmed}' is not a shift")))?;
                Ok(CipherKey::Shift(shift.rem_euclid(26) as u8))
            }
            CipherType::Atbash => {
                if trimmed.eq_ignore_ascii_case("atbash") {
                    Ok(CipherKey::Atbash)
                } else {
                    Err(CipherError::InvalidKey(
                        "atbash takes the literal key 'atbash'".into(),
                    ))
                }
            }
            CipherType::Affine => {
                let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
                if parts.len() != 2 {
                    return Err(CipherError::InvalidKey(format!(
                        "affine key must be 'a,b', got '{trimmed}'"
                    )));
                }
                let a: u8 = parts[0]
                    .parse()
                    .map_err(|_| CipherError::InvalidKey(format!("'{}' is not a number", parts[0])))?;
                let b: u8 = parts[1]
                    .parse()
                    .map_err(|_| CipherError::InvalidKey(format!("'{}' is not a number", parts[1])))?;
                Ok(CipherKey::Affine { a, b })
            }
            CipherType::SimpleSubstitution => {
                let upper = trimmed.to_ascii_uppercase();
                Ok(CipherKey::Permutation(upper))
            }
            CipherType::Vigenere | CipherType::Beaufort | CipherType::Autokey => {
                let upper = trimmed.to_ascii_uppercase();
                if !upper.bytes().all(|b| b.is_ascii_uppercase()) {
                    return Err(CipherError::InvalidKey(format!(
                        "keyword '{trimmed}' must be alphabetic"
                    )));
                }
                Ok(CipherKey::Keyword(upper))
            }
            CipherType::RailFence => {
                let rails: u8 = trimmed
                    .parse()
                    .map_err(|_| CipherError::InvalidKey(format!("'{trimmed}' is not a rail count")))?;
                Ok(CipherKey::Rails(rails))
            }
            CipherType::Columnar => {
                // Either a comma-separated 1-indexed ordering or a keyword.
                if trimmed.contains(',') || trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    let order: Result<Vec<usize>, _> =
                        trimmed.split(',').map(|p| p.trim().parse::<usize>()).collect();
                    let order = order.map_err(|_| {
                        CipherError::InvalidKey(format!("'{trimmed}' is not a column ordering"))
                    })?;
                    Ok(CipherKey::ColumnOrder(order))
                } else {
                    let upper = trimmed.to_ascii_uppercase();
                    if !upper.bytes().all(|b| b.is_ascii_uppercase()) {
                        return Err(CipherError::InvalidKey(format!(
                            "keyword '{trimmed}' must be alphabetic"
                        )));
                    }
                    Ok(CipherKey::Keyword(upper))
                }
            }
        }
    }
}

impl fmt::Display for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherKey::Shift(shift) => write!(f, "{shift}"),
            CipherKey::Affine { a, b } => write!(f, "{a},{b}"),
            CipherKey::Atbash => f.write_str("atbash"),
            CipherKey::Permutation(key) => f.write_str(key),
            CipherKey::Keyword(word) => f.write_str(word),
            CipherKey::Rails(rails) => write!(f, "{rails}"),
            CipherKey::ColumnOrder(order) => {
                let rendered: Vec<String> = order.iter().map(|n| n.to_string()).collect();
                f.write_str(&rendered.join(","))
            }
        }
    }
}

impl serde::Serialize for CipherKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// A decryption attempt produced by an engine, before multi-language
/// scoring. `score` is the engine's own internal ranking (ascending).
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// The decrypted text.
    pub plaintext: String,
    /// Which cipher produced it.
    pub cipher_type: CipherType,
    /// The key that produced it.
    pub key: CipherKey,
    /// Tag describing how the key was found.
    pub method: &'static str,
    /// Engine-internal score, lower is better.
    pub score: f64,
}

/// Result of a keyed or single-best decryption.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DecryptionResult {
    /// The decrypted text.
    pub plaintext: String,
    /// The key used.
    pub key: CipherKey,
    /// 1.0 for a supplied key, otherwise derived from the scorer.
    pub confidence: f64,
    /// Human-readable account of how the decryption works.
    pub explanation: String,
}

/// The capability set every cipher engine implements.
pub trait CipherEngine: Send + Sync {
    /// Which cipher this engine handles.
    fn cipher_type(&self) -> CipherType;

    /// Display name.
    fn name(&self) -> &'static str;

    /// One-paragraph description of the cipher.
    fn description(&self) -> &'static str;

    /// Heuristic applicability score in [0, 1] from the statistics alone.
    fn detect(&self, statistics: &StatisticsProfile) -> f64;

    /// Attempt automated decryption; up to five candidates sorted by the
    /// engine's internal score, or an empty list on failure.
    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        statistics: &StatisticsProfile,
        options: &AnalysisOptions,
    ) -> Vec<RawCandidate>;

    /// Decrypt with a caller-supplied key.
    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError>;

    /// Encrypt plaintext with the given key.
    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError>;

    /// Produce a random valid key from the supplied generator.
    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey;

    /// Whether the key is valid for this cipher.
    fn validate_key(&self, key: &CipherKey) -> bool;

    /// Human-readable account of a decryption.
    fn explain(&self, ciphertext: &str, plaintext: &str, key: &CipherKey) -> String;

    /// Find the best key and decrypt, wrapping `attempt_decrypt`.
    fn find_key_and_decrypt(
        &self,
        ciphertext: &str,
        options: &AnalysisOptions,
    ) -> Result<DecryptionResult, CipherError> {
        let statistics = statistics::analyze(ciphertext);
        let mut candidates = self.attempt_decrypt(ciphertext, &statistics, options);
        if candidates.is_empty() {
            return Err(CipherError::DecryptionFailed(format!(
                "{} produced no candidates",
                self.name()
            )));
        }
        let best = candidates.remove(0);
        let (_, chi) = scoring::best_chi_squared(&best.plaintext);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &best.plaintext, &best.key),
            confidence: scoring::confidence_from_chi(chi),
            plaintext: best.plaintext,
            key: best.key,
        })
    }
}

/// Sort candidates by internal score ascending, drop duplicate keys, keep
/// the per-engine maximum.
pub(crate) fn sort_and_trim(candidates: &mut Vec<RawCandidate>) {
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
    let mut seen: Vec<String> = Vec::new();
    candidates.retain(|c| {
        let key = c.key.to_string();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    candidates.truncate(MAX_CANDIDATES_PER_ENGINE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_keys_parse_and_wrap() {
        assert_eq!(
            CipherKey::parse(CipherType::Caesar, "7"),
            Ok(CipherKey::Shift(7))
        );
        assert_eq!(
            CipherKey::parse(CipherType::Caesar, "33"),
            Ok(CipherKey::Shift(7))
        );
        assert_eq!(
            CipherKey::parse(CipherType::Caesar, "-1"),
            Ok(CipherKey::Shift(25))
        );
        assert!(CipherKey::parse(CipherType::Caesar, "seven").is_err());
    }

    #[test]
    fn affine_keys_parse_pairs() {
        assert_eq!(
            CipherKey::parse(CipherType::Affine, "5, 8"),
            Ok(CipherKey::Affine { a: 5, b: 8 })
        );
        assert!(CipherKey::parse(CipherType::Affine, "5").is_err());
        assert!(CipherKey::parse(CipherType::Affine, "five,eight").is_err());
    }

    #[test]
    fn columnar_keys_accept_keyword_or_ordering() {
        assert_eq!(
            CipherKey::parse(CipherType::Columnar, "zebras"),
            Ok(CipherKey::Keyword("ZEBRAS".into()))
        );
        assert_eq!(
            CipherKey::parse(CipherType::Columnar, "3,1,4,2"),
            Ok(CipherKey::ColumnOrder(vec![3, 1, 4, 2]))
        );
    }

    #[test]
    fn atbash_key_is_a_literal_marker() {
        assert_eq!(
            CipherKey::parse(CipherType::Atbash, "Atbash"),
            Ok(CipherKey::Atbash)
        );
        assert!(CipherKey::parse(CipherType::Atbash, "reverse").is_err());
    }

    #[test]
    fn keys_round_trip_through_display() {
        let cases = [
            (CipherType::Caesar, "7"),
            (CipherType::Affine, "5,8"),
            (CipherType::Vigenere, "LEMON"),
            (CipherType::RailFence, "3"),
            (CipherType::Columnar, "3,1,4,2"),
            (CipherType::Atbash, "atbash"),
        ];
        for (cipher, raw) in cases {
            let key = CipherKey::parse(cipher, raw).unwrap();
            assert_eq!(key.to_string(), raw);
        }
    }

    #[test]
    fn sort_and_trim_orders_and_dedups() {
        let make = |score: f64, shift: u8| RawCandidate {
            plaintext: "X".into(),
            cipher_type: CipherType::Caesar,
            key: CipherKey::Shift(shift),
            method: "brute_force",
            score,
        };
        let mut candidates = vec![
            make(30.0, 1),
            make(10.0, 2),
            make(20.0, 2), // duplicate key, worse score
            make(5.0, 3),
            make(50.0, 4),
            make(40.0, 5),
            make(60.0, 6),
        ];
        sort_and_trim(&mut candidates);
        assert_eq!(candidates.len(), MAX_CANDIDATES_PER_ENGINE);
        assert_eq!(candidates[0].key, CipherKey::Shift(3));
        assert!(candidates.windows(2).all(|w| w[0].score <= w[1].score));
    }
}
