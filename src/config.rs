//! Analysis options shared by the facade, orchestrator and engines.

use crate::languages::Language;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default cap on accepted ciphertext length.
pub const DEFAULT_MAX_CIPHERTEXT_LENGTH: usize = 100_000;

/// Seed used for stochastic search when the caller does not supply one, so
/// repeated runs produce identical output.
pub const DEFAULT_SEED: u64 = 0x1DE5_CA7E_5EED;

/// Cooperative cancellation flag shared between the orchestrator and the
/// engines it dispatches. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask in-flight work to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Polled by long-running engines (the hill climber checks every 256
    /// iterations, columnar enumeration between permutations).
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tuning knobs for a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Longest keyword the polyalphabetic and columnar solvers consider.
    pub max_key_length: usize,
    /// Largest rail count the rail-fence solver brute-forces.
    pub max_rails: usize,
    /// Iteration budget per hill-climb restart.
    pub hill_climb_iterations: usize,
    /// Number of hill-climb restarts.
    pub hill_climb_restarts: usize,
    /// When set, per-column Caesar solves score against this language only
    /// instead of taking the best across all languages.
    pub target_language: Option<Language>,
    /// Seed for stochastic search; `None` uses [`DEFAULT_SEED`].
    pub seed: Option<u64>,
    /// Inputs longer than this are rejected with `InputTooLong`.
    pub max_ciphertext_length: usize,
    /// Optional wall-clock budget per orchestrator tier. When exceeded the
    /// orchestrator stops launching engines in that tier and drains
    /// in-flight work.
    pub tier_budget: Option<Duration>,
    /// Shared cancellation flag.
    pub cancel: CancelFlag,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            max_key_length: 15,
            max_rails: 10,
            hill_climb_iterations: 5000,
            hill_climb_restarts: 10,
            target_language: None,
            seed: None,
            max_ciphertext_length: DEFAULT_MAX_CIPHERTEXT_LENGTH,
            tier_budget: None,
            cancel: CancelFlag::new(),
        }
    }
}

impl AnalysisOptions {
    /// The effective seed for stochastic search.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}
