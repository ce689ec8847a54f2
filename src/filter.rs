//! Hard rejection of linguistically impossible candidates.
//!
//! The scorer ranks; the filter only removes garbage. A candidate is
//! dropped when it has no letters, almost no vowels, a letter repeated five
//! or more times in a row, an implausibly long consonant run, or a
//! chi-squared above the ceiling for every supported language.

use crate::scoring::ScoredCandidate;
use crate::statistics::canonicalize;
use log::trace;
use serde::Serialize;

/// A candidate whose chi-squared exceeds this for every language is garbage.
pub const MAX_CHI_SQUARED: f64 = 300.0;
/// More consecutive repeats of one letter than this is garbage.
pub const MAX_CONSECUTIVE_SAME: usize = 4;
/// Minimum acceptable vowel share.
pub const MIN_VOWEL_RATIO: f64 = 0.05;
/// Longest consonant run seen in natural language text. Kept high because
/// German compounds and unaccented French both produce long runs.
pub const MAX_CONSONANT_RUN: usize = 10;

/// Counters for why candidates were rejected.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterReasons {
    /// Rejected for an empty canonicalized plaintext.
    pub empty: usize,
    /// Rejected for vowel ratio below the minimum.
    pub no_vowels: usize,
    /// Rejected for a letter repeated too many times in a row.
    pub consecutive_letters: usize,
    /// Rejected for a consonant run longer than any language allows.
    pub consonant_run: usize,
    /// Rejected because chi-squared was too high for every language.
    pub high_chi_squared: usize,
}

/// Outcome of a filtering pass.
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// Candidates that survived, sorted by total candidate order.
    pub passed: Vec<ScoredCandidate>,
    /// How many were removed.
    pub filtered_out: usize,
    /// Per-reason rejection counters.
    pub reasons: FilterReasons,
}

/// Filter scored candidates and keep the best `max_results`, sorted by
/// combined score ascending with deterministic tie-breaking (language
/// declaration order, then cipher declaration order).
pub fn filter(candidates: Vec<ScoredCandidate>, max_results: usize) -> FilterResult {
    let total = candidates.len();
    let mut reasons = FilterReasons::default();
    let mut passed: Vec<ScoredCandidate> = Vec::new();

    for candidate in candidates {
        let text = canonicalize(&candidate.plaintext);

        if text.is_empty() {
            reasons.empty += 1;
            continue;
        }
        if vowel_ratio(text.as_bytes()) < MIN_VOWEL_RATIO {
            reasons.no_vowels += 1;
            continue;
        }
        if has_consecutive_same(text.as_bytes(), MAX_CONSECUTIVE_SAME + 1) {
            reasons.consecutive_letters += 1;
            continue;
        }
        if longest_consonant_run(text.as_bytes()) > MAX_CONSONANT_RUN {
            reasons.consonant_run += 1;
            continue;
        }
        let all_chi_high = !candidate.all_scores.is_empty()
            && candidate
                .all_scores
                .iter()
                .all(|s| s.chi_squared > MAX_CHI_SQUARED);
        if all_chi_high {
            reasons.high_chi_squared += 1;
            continue;
        }

        passed.push(candidate);
    }

    let filtered_out = total - passed.len();
    passed.sort_by(candidate_order);
    passed.truncate(max_results);

    trace!(
        "filter kept {}/{} candidates ({:?})",
        passed.len(),
        total,
        reasons
    );

    FilterResult {
        filtered_out,
        passed,
        reasons,
    }
}

/// Cheap rejection test used while probing for early exit; checks only the
/// scoreless subset of the hard filters. Anything this rejects, the full
/// filter rejects too.
pub fn quick_reject(plaintext: &str) -> bool {
    let text = canonicalize(plaintext);
    if text.is_empty() {
        return true;
    }
    if vowel_ratio(text.as_bytes()) < MIN_VOWEL_RATIO {
        return true;
    }
    has_consecutive_same(text.as_bytes(), MAX_CONSECUTIVE_SAME + 1)
}

/// Total order over scored candidates: combined score, then language
/// declaration order, then cipher declaration order.
pub fn candidate_order(a: &ScoredCandidate, b: &ScoredCandidate) -> std::cmp::Ordering {
    a.best_score
        .total_cmp(&b.best_score)
        .then_with(|| a.best_language.index().cmp(&b.best_language.index()))
        .then_with(|| a.cipher_type.index().cmp(&b.cipher_type.index()))
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'A' | b'E' | b'I' | b'O' | b'U')
}

fn vowel_ratio(text: &[u8]) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let vowels = text.iter().filter(|&&b| is_vowel(b)).count();
    vowels as f64 / text.len() as f64
}

/// Whether any letter appears at least `run` times consecutively.
fn has_consecutive_same(text: &[u8], run: usize) -> bool {
    if text.len() < run {
        return false;
    }
    let mut count = 1;
    for i in 1..text.len() {
        if text[i] == text[i - 1] {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            count = 1;
        }
    }
    false
}

fn longest_consonant_run(text: &[u8]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &b in text {
        if is_vowel(b) {
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}
