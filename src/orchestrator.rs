//! Tiered orchestration of the cipher engines.
//!
//! The classifier picks which ciphers are worth trying; the orchestrator
//! runs them in cost order. Tier 1 holds the closed-form brute forces,
//! tier 2 the keyword solvers, tier 3 the hill climber. After each tier
//! the best candidate so far is probed, and a dominant one (combined score
//! under `EARLY_EXIT_CHI`) stops the search. Engines inside a tier are
//! independent and run on the rayon pool; every candidate is re-scored and
//! re-sorted globally afterwards, so accumulation order never changes the
//! final ranking.

use crate::classifier::{self, CipherFamilyProbabilities};
use crate::config::AnalysisOptions;
use crate::engines::interface::RawCandidate;
use crate::engines::{get_engine, CipherType};
use crate::filter::{self, FilterReasons};
use crate::scoring::{self, ScoredCandidate};
use crate::statistics;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// A candidate scoring below this is almost certainly the answer.
pub const EARLY_EXIT_CHI: f64 = 40.0;
/// A candidate scoring below this is good enough to skip the expensive tier.
pub const GOOD_ENOUGH_CHI: f64 = 80.0;

/// Families with probability at or above this are searched.
const FAMILY_THRESHOLD: f64 = 0.2;
/// Lowered threshold when the classification itself is uncertain.
const UNCERTAIN_FAMILY_THRESHOLD: f64 = 0.1;
/// Classification confidence below this counts as uncertain.
const LOW_CONFIDENCE: f64 = 0.3;

/// Final number of candidates reported.
const MAX_RESULTS: usize = 10;

/// Cheap, deterministic engines.
const TIER_1: [CipherType; 5] = [
    CipherType::Caesar,
    CipherType::Rot13,
    CipherType::Atbash,
    CipherType::Affine,
    CipherType::RailFence,
];

/// Keyword and ordering searches.
const TIER_2: [CipherType; 4] = [
    CipherType::Vigenere,
    CipherType::Beaufort,
    CipherType::Autokey,
    CipherType::Columnar,
];

/// Stochastic optimization.
const TIER_3: [CipherType; 1] = [CipherType::SimpleSubstitution];

/// Everything `analyze` returns: the winning candidates, the classification
/// that steered the search, and counters describing the run.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    /// The top candidate, when any survived filtering.
    pub best_candidate: Option<ScoredCandidate>,
    /// All surviving candidates, best first.
    pub candidates: Vec<ScoredCandidate>,
    /// The classification that guided engine selection.
    pub classification: CipherFamilyProbabilities,
    /// Raw candidates produced across all engines.
    pub candidates_generated: usize,
    /// Candidates left after filtering.
    pub candidates_after_filter: usize,
    /// Why candidates were dropped.
    pub filter_reasons: FilterReasons,
    /// Whether the search stopped before running every tier.
    pub early_exit: bool,
    /// Reason for the early stop, when there was one.
    pub early_exit_reason: Option<String>,
    /// Names of the tiers that actually ran.
    pub tiers_executed: Vec<String>,
}

impl OrchestrationResult {
    fn aborted(reason: &str) -> Self {
        OrchestrationResult {
            best_candidate: None,
            candidates: Vec::new(),
            classification: CipherFamilyProbabilities::default(),
            candidates_generated: 0,
            candidates_after_filter: 0,
            filter_reasons: FilterReasons::default(),
            early_exit: true,
            early_exit_reason: Some(reason.to_string()),
            tiers_executed: Vec::new(),
        }
    }
}

/// Run the full pipeline over one ciphertext.
pub fn orchestrate(ciphertext: &str, options: &AnalysisOptions) -> OrchestrationResult {
    let normalized = statistics::canonicalize(ciphertext);
    if normalized.len() < 3 {
        debug!("ciphertext too short to analyze ({} letters)", normalized.len());
        return OrchestrationResult::aborted("ciphertext too short");
    }

    let profile = statistics::analyze(&normalized);
    let classification = classifier::classify(&profile);
    let selected = select_ciphers(&classification);
    info!(
        "classification mono={:.2} poly={:.2} trans={:.2}; trying {} ciphers",
        classification.monoalphabetic,
        classification.polyalphabetic,
        classification.transposition,
        selected.len()
    );

    let mut raw: Vec<RawCandidate> = Vec::new();
    let mut tiers_executed = Vec::new();
    let mut early_exit = false;
    let mut early_exit_reason = None;

    let tiers: [(&str, &[CipherType]); 3] =
        [("tier1", &TIER_1), ("tier2", &TIER_2), ("tier3", &TIER_3)];

    for (tier_name, tier_ciphers) in tiers {
        let to_run: Vec<CipherType> = selected
            .iter()
            .copied()
            .filter(|t| tier_ciphers.contains(t))
            .collect();
        if to_run.is_empty() {
            continue;
        }

        // A good-but-not-dominant candidate is not worth the hill climber.
        if tier_name == "tier3" {
            if let Some(best) = probe_best(&raw) {
                if best.best_score < GOOD_ENOUGH_CHI {
                    early_exit = true;
                    early_exit_reason = Some(format!(
                        "good candidate found (score={:.1}), skipping tier3",
                        best.best_score
                    ));
                    break;
                }
            }
        }

        tiers_executed.push(tier_name.to_string());
        raw.extend(run_tier(&normalized, &to_run, &profile, options, tier_name));

        if let Some(best) = probe_best(&raw) {
            if best.best_score < EARLY_EXIT_CHI {
                early_exit = true;
                early_exit_reason = Some(format!(
                    "dominant candidate found in {tier_name} (score={:.1})",
                    best.best_score
                ));
                break;
            }
        }
    }

    let candidates_generated = raw.len();
    let scored: Vec<ScoredCandidate> = raw.into_iter().map(scoring::score_candidate).collect();
    let filtered = filter::filter(scored, MAX_RESULTS);

    debug!(
        "{} candidates generated, {} after filter",
        candidates_generated,
        filtered.passed.len()
    );

    OrchestrationResult {
        best_candidate: filtered.passed.first().cloned(),
        candidates_after_filter: filtered.passed.len(),
        candidates: filtered.passed,
        classification,
        candidates_generated,
        filter_reasons: filtered.reasons,
        early_exit,
        early_exit_reason,
        tiers_executed,
    }
}

/// Ciphers worth running, from the classifier's family probabilities and
/// per-family rankings. Falls back to the three family archetypes when
/// nothing clears the threshold.
fn select_ciphers(classification: &CipherFamilyProbabilities) -> Vec<CipherType> {
    let threshold = if classification.classification_confidence < LOW_CONFIDENCE {
        UNCERTAIN_FAMILY_THRESHOLD
    } else {
        FAMILY_THRESHOLD
    };

    let mut selected: Vec<CipherType> = Vec::new();
    let push = |cipher: CipherType, selected: &mut Vec<CipherType>| {
        if !selected.contains(&cipher) {
            selected.push(cipher);
        }
    };

    if classification.monoalphabetic >= threshold {
        for &cipher in &classification.likely_monoalphabetic {
            push(cipher, &mut selected);
        }
        push(CipherType::Caesar, &mut selected);
    }
    if classification.polyalphabetic >= threshold {
        for &cipher in &classification.likely_polyalphabetic {
            push(cipher, &mut selected);
        }
        push(CipherType::Vigenere, &mut selected);
    }
    if classification.transposition >= threshold {
        for &cipher in &classification.likely_transposition {
            push(cipher, &mut selected);
        }
        push(CipherType::RailFence, &mut selected);
    }

    if selected.is_empty() {
        selected = vec![
            CipherType::Caesar,
            CipherType::Vigenere,
            CipherType::RailFence,
        ];
    }
    trace!("selected ciphers: {:?}", selected);
    selected
}

/// Run every selected engine of one tier, in parallel, draining in-flight
/// engines when the tier's wall-clock budget runs out.
fn run_tier(
    ciphertext: &str,
    ciphers: &[CipherType],
    profile: &statistics::StatisticsProfile,
    options: &AnalysisOptions,
    tier_name: &str,
) -> Vec<RawCandidate> {
    let started = Instant::now();
    trace!("running {tier_name} with {ciphers:?}");

    let results: Vec<Vec<RawCandidate>> = ciphers
        .par_iter()
        .map(|&cipher| {
            // Budget check happens before launch; engines already running
            // finish their work and get drained normally.
            if let Some(budget) = options.tier_budget {
                if started.elapsed() > budget {
                    options.cancel.cancel();
                    warn!("{tier_name} budget exceeded, skipping {cipher}");
                    return Vec::new();
                }
            }
            let Some(engine) = get_engine(cipher) else {
                return Vec::new();
            };
            let candidates = engine.attempt_decrypt(ciphertext, profile, options);
            if candidates.is_empty() {
                debug!("{} produced no candidates", engine.name());
            }
            candidates
        })
        .collect();

    results.into_iter().flatten().collect()
}

/// Score the accumulated raw candidates and return the best one that
/// passes a quick garbage check. Used only for early-exit probing; the
/// final ranking re-scores everything.
fn probe_best(raw: &[RawCandidate]) -> Option<ScoredCandidate> {
    raw.iter()
        .filter(|c| !filter::quick_reject(&c.plaintext))
        .map(|c| scoring::score_candidate(c.clone()))
        .min_by(|a, b| filter::candidate_order(a, b))
}

/// Which tier a cipher runs in; the CLI shows this next to candidates.
pub fn tier_of(cipher: CipherType) -> &'static str {
    if TIER_1.contains(&cipher) {
        "tier1"
    } else if TIER_2.contains(&cipher) {
        "tier2"
    } else {
        "tier3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::interface::{CipherEngine, CipherKey};
    use crate::engines::{caesar::CaesarEngine, vigenere::VigenereEngine};

    #[test]
    fn too_short_input_aborts() {
        let result = orchestrate("AB", &AnalysisOptions::default());
        assert!(result.early_exit);
        assert_eq!(result.early_exit_reason.as_deref(), Some("ciphertext too short"));
        assert!(result.candidates.is_empty());
        assert!(result.tiers_executed.is_empty());
    }

    #[test]
    fn caesar_prose_exits_in_tier_one() {
        // Ordinary prose scores far below the early-exit threshold once the
        // right shift is found; the search must stop after tier 1.
        let plaintext = "ITWASABRIGHTCOLDDAYINAPRILANDTHECLOCKSWERESTRIKINGTHIRTEEN\
                         WINSTONSMITHHISCHINNUZZLEDINTOHISBREASTINANEFFORTTOESCAPE\
                         THEVILEWINDSLIPPEDQUICKLYTHROUGHTHEGLASSDOORS";
        let ciphertext = CaesarEngine
            .encrypt(plaintext, &CipherKey::Shift(7))
            .unwrap();
        let result = orchestrate(&ciphertext, &AnalysisOptions::default());

        assert!(result.early_exit);
        assert_eq!(result.tiers_executed, vec!["tier1"]);
        let best = result.best_candidate.expect("candidate expected");
        assert_eq!(best.cipher_type, CipherType::Caesar);
        assert_eq!(best.key, CipherKey::Shift(7));
        assert_eq!(best.plaintext, plaintext);
    }

    #[test]
    fn vigenere_prose_is_recovered_in_tier_two() {
        let plaintext = "ITWASABRIGHTCOLDDAYINAPRILANDTHECLOCKSWERESTRIKINGTHIRTEEN\
                         WINSTONSMITHHISCHINNUZZLEDINTOHISBREASTINANEFFORTTOESCAPE";
        let ciphertext = VigenereEngine
            .encrypt(plaintext, &CipherKey::Keyword("KEYWORD".into()))
            .unwrap();
        let result = orchestrate(&ciphertext, &AnalysisOptions::default());

        assert!(result
            .candidates
            .iter()
            .any(|c| c.key == CipherKey::Keyword("KEYWORD".into())));
        assert!(result.tiers_executed.contains(&"tier2".to_string()));
        // A prose decrypt scores well under the good-enough bar, so the
        // hill climber never needed to run.
        assert!(!result.tiers_executed.contains(&"tier3".to_string()));
    }

    #[test]
    fn every_reported_candidate_passed_the_filter() {
        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG".repeat(2);
        let ciphertext = CaesarEngine
            .encrypt(&plaintext, &CipherKey::Shift(3))
            .unwrap();
        let result = orchestrate(&ciphertext, &AnalysisOptions::default());
        for candidate in &result.candidates {
            assert!(!crate::filter::quick_reject(&candidate.plaintext));
        }
        assert!(result.candidates.len() <= 10);
        assert_eq!(result.candidates_after_filter, result.candidates.len());
    }

    #[test]
    fn candidates_are_sorted_by_score() {
        let plaintext = "WEAREDISCOVEREDRUNATONCEFLEETOTHEHILLS".repeat(2);
        let ciphertext = CaesarEngine
            .encrypt(&plaintext, &CipherKey::Shift(11))
            .unwrap();
        let result = orchestrate(&ciphertext, &AnalysisOptions::default());
        let scores: Vec<f64> = result.candidates.iter().map(|c| c.best_score).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn selection_falls_back_to_the_archetypes() {
        let classification = CipherFamilyProbabilities::default();
        let selected = select_ciphers(&classification);
        assert_eq!(
            selected,
            vec![CipherType::Caesar, CipherType::Vigenere, CipherType::RailFence]
        );
    }

    #[test]
    fn tier_membership_is_stable() {
        assert_eq!(tier_of(CipherType::Caesar), "tier1");
        assert_eq!(tier_of(CipherType::Columnar), "tier2");
        assert_eq!(tier_of(CipherType::SimpleSubstitution), "tier3");
    }
}
