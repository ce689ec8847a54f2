//! Cipher engines and the process-wide engine registry.
//!
//! Each engine lives in its own module and implements the
//! [`interface::CipherEngine`] contract. The registry is a static table
//! built once at startup; lookups return the same cached instance for the
//! lifetime of the process.

/// Affine cipher (E(x) = ax + b mod 26).
pub mod affine;
/// Atbash fixed-mapping cipher.
pub mod atbash;
/// Autokey cipher (primer extended by the plaintext).
pub mod autokey;
/// Beaufort cipher (reciprocal Vigenère variant).
pub mod beaufort;
/// Caesar shift cipher.
pub mod caesar;
/// Columnar transposition cipher.
pub mod columnar;
/// Shared engine contract, keys and candidate types.
pub mod interface;
/// Rail fence zigzag transposition cipher.
pub mod rail_fence;
/// ROT13 fixed-shift cipher.
pub mod rot13;
/// Simple substitution cipher (hill-climbing solver).
pub mod substitution;
/// Vigenère cipher.
pub mod vigenere;

use interface::CipherEngine;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::CipherError;

/// The three cipher families the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherFamily {
    /// One fixed letter-for-letter mapping.
    Monoalphabetic,
    /// The mapping changes with position.
    Polyalphabetic,
    /// Letters are rearranged, not replaced.
    Transposition,
}

impl fmt::Display for CipherFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherFamily::Monoalphabetic => "monoalphabetic",
            CipherFamily::Polyalphabetic => "polyalphabetic",
            CipherFamily::Transposition => "transposition",
        };
        f.write_str(name)
    }
}

/// Every cipher the engine suite implements.
///
/// Declaration order doubles as the tie-break order in the final candidate
/// ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherType {
    /// Fixed shift.
    Caesar,
    /// Caesar with shift 13; self-inverse.
    Rot13,
    /// Reversed alphabet; self-inverse.
    Atbash,
    /// Linear map `ax + b mod 26`.
    Affine,
    /// Arbitrary alphabet permutation.
    SimpleSubstitution,
    /// Repeating-keyword shift.
    Vigenere,
    /// Reciprocal keyword cipher.
    Beaufort,
    /// Keyword primer extended by the plaintext.
    Autokey,
    /// Zigzag transposition over N rails.
    RailFence,
    /// Column-reordering transposition.
    Columnar,
}

/// All cipher types in declaration (tie-break) order.
pub const ALL_CIPHER_TYPES: [CipherType; 10] = [
    CipherType::Caesar,
    CipherType::Rot13,
    CipherType::Atbash,
    CipherType::Affine,
    CipherType::SimpleSubstitution,
    CipherType::Vigenere,
    CipherType::Beaufort,
    CipherType::Autokey,
    CipherType::RailFence,
    CipherType::Columnar,
];

impl CipherType {
    /// Snake-case name used on the wire and in the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherType::Caesar => "caesar",
            CipherType::Rot13 => "rot13",
            CipherType::Atbash => "atbash",
            CipherType::Affine => "affine",
            CipherType::SimpleSubstitution => "simple_substitution",
            CipherType::Vigenere => "vigenere",
            CipherType::Beaufort => "beaufort",
            CipherType::Autokey => "autokey",
            CipherType::RailFence => "rail_fence",
            CipherType::Columnar => "columnar",
        }
    }

    /// Which family this cipher belongs to.
    pub fn family(&self) -> CipherFamily {
        match self {
            CipherType::Caesar
            | CipherType::Rot13
            | CipherType::Atbash
            | CipherType::Affine
            | CipherType::SimpleSubstitution => CipherFamily::Monoalphabetic,
            CipherType::Vigenere | CipherType::Beaufort | CipherType::Autokey => {
                CipherFamily::Polyalphabetic
            }
            CipherType::RailFence | CipherType::Columnar => CipherFamily::Transposition,
        }
    }

    /// Position in [`ALL_CIPHER_TYPES`], used for deterministic tie-breaking.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherType {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "caesar" => Ok(CipherType::Caesar),
            "rot13" => Ok(CipherType::Rot13),
            "atbash" => Ok(CipherType::Atbash),
            "affine" => Ok(CipherType::Affine),
            "simple_substitution" | "substitution" => Ok(CipherType::SimpleSubstitution),
            "vigenere" => Ok(CipherType::Vigenere),
            "beaufort" => Ok(CipherType::Beaufort),
            "autokey" => Ok(CipherType::Autokey),
            "rail_fence" | "railfence" => Ok(CipherType::RailFence),
            "columnar" => Ok(CipherType::Columnar),
            other => Err(CipherError::UnsupportedCipher(other.to_string())),
        }
    }
}

/// The engine registry: one cached instance per cipher type, built once at
/// startup and read-only thereafter.
static ENGINE_MAP: Lazy<HashMap<CipherType, Box<dyn CipherEngine>>> = Lazy::new(|| {
    let engines: Vec<Box<dyn CipherEngine>> = vec![
        Box::new(caesar::CaesarEngine),
        Box::new(rot13::Rot13Engine),
        Box::new(atbash::AtbashEngine),
        Box::new(affine::AffineEngine),
        Box::new(substitution::SubstitutionEngine),
        Box::new(vigenere::VigenereEngine),
        Box::new(beaufort::BeaufortEngine),
        Box::new(autokey::AutokeyEngine),
        Box::new(rail_fence::RailFenceEngine),
        Box::new(columnar::ColumnarEngine),
    ];
    engines
        .into_iter()
        .map(|engine| (engine.cipher_type(), engine))
        .collect()
});

/// Look up the cached engine for a cipher type.
pub fn get_engine(cipher_type: CipherType) -> Option<&'static dyn CipherEngine> {
    ENGINE_MAP.get(&cipher_type).map(|boxed| boxed.as_ref())
}

/// All engines belonging to a family, in declaration order.
pub fn engines_by_family(family: CipherFamily) -> Vec<&'static dyn CipherEngine> {
    ALL_CIPHER_TYPES
        .iter()
        .filter(|t| t.family() == family)
        .filter_map(|&t| get_engine(t))
        .collect()
}
