//! Error types for the cryptanalysis engine.

use thiserror::Error;

/// Errors surfaced by the user-driven operations (`analyze`, `decrypt`,
/// `encrypt`). Engine-internal failures during automated cracking never
/// reach the caller; they show up as empty candidate lists instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CipherError {
    /// The ciphertext exceeded the configured length cap.
    #[error("input length {length} exceeds the maximum of {max}")]
    InputTooLong {
        /// Observed input length.
        length: usize,
        /// Configured cap.
        max: usize,
    },

    /// A cipher type was named that no engine implements.
    #[error("unsupported cipher type '{0}'")]
    UnsupportedCipher(String),

    /// The supplied key is not valid for the chosen cipher.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Automated key search produced no candidate for a non-empty input.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}
