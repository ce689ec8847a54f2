//! Simple substitution cipher engine.
//!
//! The key is a full alphabet permutation, so the 26! key space rules out
//! brute force. The solver hill-climbs: start from the permutation that
//! maps the expected plaintext frequency order onto the observed
//! ciphertext frequency order, then repeatedly swap two key positions and
//! keep the swap only when the multi-language fitness strictly improves.
//! Restarts run independently (and in parallel) and the best key wins.

use super::interface::{CipherEngine, CipherKey, DecryptionResult, RawCandidate};
use super::CipherType;
use crate::config::{AnalysisOptions, CancelFlag};
use crate::errors::CipherError;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Plaintext letters by expected English frequency, most common first.
const FREQUENCY_ORDER: &[u8; 26] = b"ETAOINSHRDLCUMWFGYPBVKJXQZ";

/// Below this many letters the statistics cannot drive the climb.
const MIN_CRACK_LENGTH: usize = 20;

/// How often the climber polls the cancellation flag.
const CANCEL_CHECK_INTERVAL: usize = 256;

/// Spread restart seeds apart so their streams do not overlap.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// The simple substitution engine.
pub struct SubstitutionEngine;

/// Encrypt: plaintext letter at index i maps to key[i].
fn apply_key_encrypt(text: &str, key: &[u8; 26]) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                key[(c.to_ascii_uppercase() as u8 - b'A') as usize] as char
            } else {
                c
            }
        })
        .collect()
}

/// Decrypt through the inverse mapping.
fn apply_key_decrypt(text: &str, key: &[u8; 26]) -> String {
    let mut inverse = [0u8; 26];
    for (i, &mapped) in key.iter().enumerate() {
        inverse[(mapped - b'A') as usize] = b'A' + i as u8;
    }
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                inverse[(c.to_ascii_uppercase() as u8 - b'A') as usize] as char
            } else {
                c
            }
        })
        .collect()
}

/// Initial key from frequency analysis: the most common ciphertext letter
/// is assumed to encrypt the most common plaintext letter, and so on down
/// both orders.
fn initial_key(ciphertext: &[u8]) -> [u8; 26] {
    let counts = statistics::letter_counts(ciphertext);
    let mut cipher_order: Vec<usize> = (0..26).collect();
    cipher_order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));

    let mut key = [0u8; 26];
    for rank in 0..26 {
        let plain_idx = (FREQUENCY_ORDER[rank] - b'A') as usize;
        key[plain_idx] = b'A' + cipher_order[rank] as u8;
    }
    key
}

/// Fitness of a candidate key: negated best-language combined score, so
/// higher is better.
fn fitness(ciphertext: &str, key: &[u8; 26]) -> f64 {
    let plaintext = apply_key_decrypt(ciphertext, key);
    let (_, combined) = scoring::best_combined(&plaintext);
    -combined
}

/// One hill-climb restart. Returns the best key and its fitness.
fn climb(
    ciphertext: &str,
    seed: u64,
    max_iterations: usize,
    cancel: &CancelFlag,
) -> ([u8; 26], f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut key = initial_key(ciphertext.as_bytes());
    let mut best = fitness(ciphertext, &key);

    // A restart that stops improving for a tenth of the budget is stuck in
    // a local maximum; spend the remaining budget elsewhere.
    let stagnation_limit = (max_iterations / 10).max(1);
    let mut stagnant = 0usize;

    for iteration in 0..max_iterations {
        if iteration % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            debug!("hill climb cancelled at iteration {iteration}");
            break;
        }

        let i = rng.random_range(0..26);
        let mut j = rng.random_range(0..26);
        while j == i {
            j = rng.random_range(0..26);
        }

        key.swap(i, j);
        let candidate = fitness(ciphertext, &key);
        if candidate > best {
            best = candidate;
            stagnant = 0;
        } else {
            key.swap(i, j);
            stagnant += 1;
            if stagnant >= stagnation_limit {
                trace!("restart stagnated after {iteration} iterations");
                break;
            }
        }
    }

    (key, best)
}

impl CipherEngine for SubstitutionEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::SimpleSubstitution
    }

    fn name(&self) -> &'static str {
        "Simple Substitution Cipher"
    }

    fn description(&self) -> &'static str {
        "Each letter maps to a different letter through a fixed alphabet \
         permutation. With 26! keys the cipher is immune to brute force and \
         falls instead to frequency analysis plus hill climbing."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        let ioc = statistics.index_of_coincidence;
        let chi = statistics.chi_squared_english.unwrap_or(0.0);
        if ioc > 0.06 {
            // Natural IoC but a frequency table that matches no plain shift
            // points at an arbitrary permutation.
            if chi > 100.0 {
                0.8
            } else {
                0.5
            }
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
        options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let filtered = statistics::canonicalize(ciphertext);
        if filtered.len() < MIN_CRACK_LENGTH {
            debug!("text too short for substitution hill climbing");
            return Vec::new();
        }

        let seed = options.effective_seed();
        let restarts = options.hill_climb_restarts.max(1);
        trace!(
            "hill climbing with {restarts} restarts x {} iterations",
            options.hill_climb_iterations
        );

        // Restarts are independent; each gets its own deterministic seed so
        // the outcome does not depend on scheduling.
        let results: Vec<([u8; 26], f64)> = (0..restarts)
            .into_par_iter()
            .map(|restart| {
                climb(
                    &filtered,
                    seed.wrapping_add(restart as u64 ^ (restart as u64).wrapping_mul(SEED_STRIDE)),
                    options.hill_climb_iterations,
                    &options.cancel,
                )
            })
            .collect();

        let Some((key, best_fitness)) = results
            .into_iter()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
        else {
            return Vec::new();
        };

        let plaintext = apply_key_decrypt(&filtered, &key);
        let key_string: String = key.iter().map(|&b| b as char).collect();
        vec![RawCandidate {
            plaintext,
            cipher_type: CipherType::SimpleSubstitution,
            key: CipherKey::Permutation(key_string),
            method: "hill_climbing",
            score: -best_fitness,
        }]
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        let table = permutation_table(key)?;
        let plaintext = apply_key_decrypt(ciphertext, &table);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let table = permutation_table(key)?;
        Ok(apply_key_encrypt(plaintext, &table))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        let mut letters: Vec<u8> = (b'A'..=b'Z').collect();
        letters.shuffle(rng);
        CipherKey::Permutation(letters.into_iter().map(|b| b as char).collect())
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        permutation_table(key).is_ok()
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, key: &CipherKey) -> String {
        let word = key.to_string();
        let sample: Vec<String> = word
            .bytes()
            .take(5)
            .enumerate()
            .map(|(i, b)| format!("{}->{}", (b'A' + i as u8) as char, b as char))
            .collect();
        format!(
            "Simple substitution with key {word}. The alphabet maps as {}, and so on; \
             the key was recovered by hill climbing over two-letter swaps.",
            sample.join(", ")
        )
    }
}

/// Parse and check a permutation key into a lookup table.
fn permutation_table(key: &CipherKey) -> Result<[u8; 26], CipherError> {
    let CipherKey::Permutation(word) = key else {
        return Err(CipherError::InvalidKey(
            "substitution expects a 26-letter alphabet permutation".into(),
        ));
    };
    let bytes = word.as_bytes();
    if bytes.len() != 26 {
        return Err(CipherError::InvalidKey(format!(
            "permutation must have 26 letters, got {}",
            bytes.len()
        )));
    }
    let mut seen = [false; 26];
    let mut table = [0u8; 26];
    for (i, &b) in bytes.iter().enumerate() {
        if !b.is_ascii_uppercase() {
            return Err(CipherError::InvalidKey(
                "permutation must be uppercase A-Z".into(),
            ));
        }
        let idx = (b - b'A') as usize;
        if seen[idx] {
            return Err(CipherError::InvalidKey(format!(
                "letter {} appears twice in the permutation",
                b as char
            )));
        }
        seen[idx] = true;
        table[i] = b;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics;
    use rand::SeedableRng;

    const KEYED_ALPHABET: &str = "ZEBRASCDFGHIJKLMNOPQTUVWXY";

    #[test]
    fn keyed_alphabet_round_trips() {
        let engine = SubstitutionEngine;
        let key = CipherKey::Permutation(KEYED_ALPHABET.into());
        let ct = engine.encrypt("FLEEATONCE", &key).unwrap();
        assert_eq!(ct, "SIAAZQLKBA");
        let back = engine.decrypt_with_key(&ct, &key).unwrap();
        assert_eq!(back.plaintext, "FLEEATONCE");
    }

    #[test]
    fn bad_permutations_are_rejected() {
        let engine = SubstitutionEngine;
        assert!(!engine.validate_key(&CipherKey::Permutation("ABC".into())));
        assert!(!engine.validate_key(&CipherKey::Permutation(
            "AABCDEFGHIJKLMNOPQRSTUVWXY".into()
        )));
        assert!(engine.validate_key(&CipherKey::Permutation(KEYED_ALPHABET.into())));
        assert!(engine.decrypt_with_key("XYZ", &CipherKey::Shift(3)).is_err());
    }

    #[test]
    fn initial_key_pairs_frequency_orders() {
        // In "EEEEETTTA" the most common cipher letter is E, so the key
        // must encrypt plaintext E (most common English letter) as E.
        let key = initial_key(b"EEEEETTTA");
        assert_eq!(key[(b'E' - b'A') as usize], b'E');
        assert_eq!(key[(b'T' - b'A') as usize], b'T');
    }

    #[test]
    fn random_keys_are_valid_permutations() {
        let engine = SubstitutionEngine;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert!(engine.validate_key(&engine.generate_random_key(&mut rng)));
        }
    }

    #[test]
    fn hill_climb_improves_over_the_initial_key() {
        let engine = SubstitutionEngine;
        // Long, ordinary English; encrypt with a fixed permutation.
        let plaintext = statistics::canonicalize(
            "It was a bright cold day in April and the clocks were striking \
             thirteen Winston Smith his chin nuzzled into his breast in an \
             effort to escape the vile wind slipped quickly through the glass \
             doors of Victory Mansions though not quickly enough to prevent a \
             swirl of gritty dust from entering along with him",
        );
        let key = CipherKey::Permutation(KEYED_ALPHABET.into());
        let ciphertext = engine.encrypt(&plaintext, &key).unwrap();
        let stats = statistics::analyze(&ciphertext);

        let mut options = AnalysisOptions::default();
        options.hill_climb_iterations = 2000;
        options.hill_climb_restarts = 4;
        options.seed = Some(42);

        let candidates = engine.attempt_decrypt(&ciphertext, &stats, &options);
        assert_eq!(candidates.len(), 1);

        // The climb must do better than the raw frequency-mapping start.
        let start = initial_key(ciphertext.as_bytes());
        let start_fitness = fitness(&ciphertext, &start);
        assert!(
            -candidates[0].score >= start_fitness,
            "climb ended below its starting fitness"
        );
    }

    #[test]
    fn short_text_returns_no_candidates() {
        let engine = SubstitutionEngine;
        let stats = statistics::analyze("TOOSHORT");
        assert!(engine
            .attempt_decrypt("TOOSHORT", &stats, &AnalysisOptions::default())
            .is_empty());
    }
}
