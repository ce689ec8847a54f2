//! CLI argument parsing.
//!
//! Three subcommands mirror the library facade: `analyze` for unknown
//! ciphertext, `decrypt` and `encrypt` for a chosen cipher. Tuning flags
//! map straight onto [`AnalysisOptions`].

use crate::config::AnalysisOptions;
use crate::languages::Language;
use clap::{ArgAction, Parser, Subcommand};
use std::time::Duration;

/// Command-line interface for the cryptanalysis engine.
#[derive(Parser, Debug)]
#[command(name = "minerva", version, about = "Classical-cipher cryptanalysis engine")]
pub struct Cli {
    /// What to do with the text.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit machine-readable JSON instead of the colored report.
    #[arg(long, global = true)]
    pub json: bool,
}

/// The supported operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Identify the cipher, recover a key and rank the decryptions.
    Analyze {
        /// The ciphertext to analyze.
        text: String,

        /// Longest keyword considered by the polyalphabetic solvers.
        #[arg(long, default_value_t = 15)]
        max_key_length: usize,

        /// Largest rail count brute-forced for rail fence.
        #[arg(long, default_value_t = 10)]
        max_rails: usize,

        /// Iterations per hill-climb restart.
        #[arg(long, default_value_t = 5000)]
        hill_climb_iterations: usize,

        /// Number of hill-climb restarts.
        #[arg(long, default_value_t = 10)]
        hill_climb_restarts: usize,

        /// Score per-column solves against this language only.
        #[arg(long)]
        language: Option<String>,

        /// Seed for the stochastic searches, for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,

        /// Wall-clock budget per tier, in milliseconds.
        #[arg(long)]
        tier_budget_ms: Option<u64>,
    },

    /// Decrypt with a known cipher (and optionally a known key).
    Decrypt {
        /// The ciphertext to decrypt.
        text: String,

        /// Cipher type (caesar, rot13, atbash, affine, simple_substitution,
        /// vigenere, beaufort, autokey, rail_fence, columnar).
        #[arg(long)]
        cipher: String,

        /// The key; omitted keys trigger an automated search.
        #[arg(long)]
        key: Option<String>,
    },

    /// Encrypt with a chosen cipher.
    Encrypt {
        /// The plaintext to encrypt.
        text: String,

        /// Cipher type, as for decrypt.
        #[arg(long)]
        cipher: String,

        /// The key; omitted keys are generated randomly and logged.
        #[arg(long)]
        key: Option<String>,
    },
}

/// Build [`AnalysisOptions`] from the analyze subcommand's flags.
#[allow(clippy::too_many_arguments)]
pub fn build_options(
    max_key_length: usize,
    max_rails: usize,
    hill_climb_iterations: usize,
    hill_climb_restarts: usize,
    language: Option<Language>,
    seed: Option<u64>,
    tier_budget_ms: Option<u64>,
) -> AnalysisOptions {
    AnalysisOptions {
        max_key_length,
        max_rails,
        hill_climb_iterations,
        hill_climb_restarts,
        target_language: language,
        seed,
        tier_budget: tier_budget_ms.map(Duration::from_millis),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "minerva",
            "analyze",
            "OLSSV",
            "--max-key-length",
            "8",
            "--seed",
            "42",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Analyze {
                max_key_length,
                seed,
                ..
            } => {
                assert_eq!(max_key_length, 8);
                assert_eq!(seed, Some(42));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn decrypt_requires_a_cipher() {
        assert!(Cli::try_parse_from(["minerva", "decrypt", "OLSSV"]).is_err());
        let cli = Cli::try_parse_from([
            "minerva", "decrypt", "OLSSV", "--cipher", "caesar", "--key", "7",
        ])
        .unwrap();
        match cli.command {
            Command::Decrypt { cipher, key, .. } => {
                assert_eq!(cipher, "caesar");
                assert_eq!(key.as_deref(), Some("7"));
            }
            _ => panic!("expected decrypt"),
        }
    }

    #[test]
    fn options_carry_the_tier_budget() {
        let options = build_options(15, 10, 5000, 10, None, None, Some(250));
        assert_eq!(options.tier_budget, Some(Duration::from_millis(250)));
    }
}
