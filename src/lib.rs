//! Minerva is a classical-cipher cryptanalysis engine: hand it an unknown
//! ciphertext over A-Z and it identifies the cipher family, recovers a
//! plausible key, and ranks the decryptions by linguistic plausibility
//! across six European languages.
//!
//! The pipeline runs statistics -> classification -> tiered engine
//! orchestration -> multi-language scoring -> filtering:
//!
//! ```rust
//! use minerva::{analyze, AnalysisOptions};
//!
//! // "THE RAIN IN SPAIN FALLS MAINLY ON THE PLAIN", Caesar-shifted by 7.
//! let result = analyze(
//!     "AOL YHPU PU ZWHPU MHSSZ THPUSF VU AOL WSHPU",
//!     &AnalysisOptions::default(),
//! )
//! .unwrap();
//!
//! let best = result.best_candidate.unwrap();
//! assert_eq!(best.cipher_type, minerva::CipherType::Caesar);
//! assert_eq!(best.plaintext, "THERAININSPAINFALLSMAINLYONTHEPLAIN");
//! assert_eq!(best.key.to_string(), "7");
//! ```
//!
//! Every stage is also exported on its own: [`statistics`] for the
//! fingerprint, [`classifier`] for family probabilities, [`engines`] for
//! direct access to a single cipher.
// Warns in case we forget to include documentation
#![warn(missing_docs)]

/// Cipher family classification from statistical invariants.
pub mod classifier;
/// CLI argument parsing.
pub mod cli;
/// Colored terminal rendering of analysis results.
pub mod cli_pretty_printing;
/// Analysis options and cancellation.
pub mod config;
/// Keyword dictionary shared by the dictionary-attack solvers.
pub mod dictionary;
/// Cipher engines and the engine registry.
pub mod engines;
/// Error types.
pub mod errors;
/// Hard rejection of impossible plaintexts.
pub mod filter;
/// Embedded reference data for the supported languages.
pub mod languages;
/// Tiered engine orchestration.
pub mod orchestrator;
/// Multi-language candidate scoring.
pub mod scoring;
/// Statistical fingerprinting of ciphertext.
pub mod statistics;

pub use config::{AnalysisOptions, CancelFlag};
pub use engines::interface::{CipherEngine, CipherKey, DecryptionResult};
pub use engines::{CipherFamily, CipherType};
pub use errors::CipherError;
pub use languages::Language;
pub use orchestrator::OrchestrationResult;
pub use scoring::ScoredCandidate;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Reject inputs longer than the configured cap.
fn validate_length(text: &str, max: usize) -> Result<(), CipherError> {
    let length = text.chars().count();
    if length > max {
        return Err(CipherError::InputTooLong { length, max });
    }
    Ok(())
}

/// Analyze an unknown ciphertext: classify the cipher family, run the
/// matching engines in cost order, and return the ranked candidates.
///
/// Never fails on a valid-length input; when every engine's output is
/// garbage the result simply carries no best candidate.
pub fn analyze(
    ciphertext: &str,
    options: &AnalysisOptions,
) -> Result<OrchestrationResult, CipherError> {
    validate_length(ciphertext, options.max_ciphertext_length)?;
    debug!("analyzing {} characters", ciphertext.len());
    Ok(orchestrator::orchestrate(ciphertext, options))
}

/// Decrypt with a chosen cipher. With a key, the engine decrypts directly;
/// without one, it searches for the best key first.
pub fn decrypt(
    ciphertext: &str,
    cipher_type: CipherType,
    key: Option<&str>,
    options: &AnalysisOptions,
) -> Result<DecryptionResult, CipherError> {
    validate_length(ciphertext, options.max_ciphertext_length)?;
    let engine = engines::get_engine(cipher_type)
        .ok_or_else(|| CipherError::UnsupportedCipher(cipher_type.to_string()))?;

    match key {
        Some(raw) => {
            let parsed = CipherKey::parse(cipher_type, raw)?;
            engine.decrypt_with_key(ciphertext, &parsed)
        }
        None => engine.find_key_and_decrypt(ciphertext, options),
    }
}

/// Encrypt with a chosen cipher. Without a key, a fresh random key is
/// generated (and logged, since it is not otherwise returned).
pub fn encrypt(
    plaintext: &str,
    cipher_type: CipherType,
    key: Option<&str>,
) -> Result<String, CipherError> {
    validate_length(plaintext, config::DEFAULT_MAX_CIPHERTEXT_LENGTH)?;
    let engine = engines::get_engine(cipher_type)
        .ok_or_else(|| CipherError::UnsupportedCipher(cipher_type.to_string()))?;

    let parsed = match key {
        Some(raw) => CipherKey::parse(cipher_type, raw)?,
        None => {
            let mut rng = StdRng::from_os_rng();
            let generated = engine.generate_random_key(&mut rng);
            info!("no key supplied, generated {cipher_type} key '{generated}'");
            generated
        }
    };
    engine.encrypt(plaintext, &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_rejects_oversized_input() {
        let options = AnalysisOptions {
            max_ciphertext_length: 10,
            ..Default::default()
        };
        let result = analyze("ABCDEFGHIJK", &options);
        assert_eq!(
            result.unwrap_err(),
            CipherError::InputTooLong { length: 11, max: 10 }
        );
    }

    #[test]
    fn decrypt_with_explicit_key() {
        let result = decrypt(
            "OLSSV",
            CipherType::Caesar,
            Some("7"),
            &AnalysisOptions::default(),
        )
        .unwrap();
        assert_eq!(result.plaintext, "HELLO");
        assert_eq!(result.confidence, 1.0);
        assert!(!result.explanation.is_empty());
    }

    #[test]
    fn decrypt_without_key_searches() {
        let result = decrypt(
            "OLSSV DVYSK OLSSV DVYSK OLSSV DVYSK",
            CipherType::Caesar,
            None,
            &AnalysisOptions::default(),
        )
        .unwrap();
        assert_eq!(
            result.plaintext.replace(' ', ""),
            "HELLOWORLDHELLOWORLDHELLOWORLD"
        );
    }

    #[test]
    fn encrypt_decrypt_round_trip_through_the_facade() {
        let ct = encrypt("ATTACKATDAWN", CipherType::Vigenere, Some("LEMON")).unwrap();
        assert_eq!(ct, "LXFOPVEFRNHR");
        let back = decrypt(
            &ct,
            CipherType::Vigenere,
            Some("LEMON"),
            &AnalysisOptions::default(),
        )
        .unwrap();
        assert_eq!(back.plaintext, "ATTACKATDAWN");
    }

    #[test]
    fn encrypt_with_generated_key_still_encrypts() {
        let ct = encrypt("HELLO WORLD", CipherType::Caesar, None).unwrap();
        assert_eq!(statistics::canonicalize(&ct).len(), 10);
    }

    #[test]
    fn invalid_keys_surface_as_errors() {
        let err = decrypt(
            "ABC",
            CipherType::Affine,
            Some("13,2"),
            &AnalysisOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CipherError::InvalidKey(_)));
    }
}
