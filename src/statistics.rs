//! Statistical fingerprinting of ciphertext.
//!
//! One pass over the canonicalized text produces a [`StatisticsProfile`]:
//! letter/bigram/trigram frequencies, index of coincidence, Shannon entropy,
//! chi-squared against English, repeated substrings and the Kasiski distance
//! table. The profile is computed once per ciphertext and read-only after.

use crate::languages::{Language, ALL_LANGUAGES, ALPHABET};
use log::trace;
use serde::Serialize;
use std::collections::HashMap;

/// Repeated-substring search window (inclusive bounds).
const MIN_SEQUENCE_LEN: usize = 3;
const MAX_SEQUENCE_LEN: usize = 10;

/// How many n-grams and repeated sequences the profile retains.
const TOP_NGRAMS: usize = 50;
const TOP_SEQUENCES: usize = 20;

/// Uppercase the input and drop everything outside A-Z.
///
/// This is the only normalization the pipeline performs; it is idempotent.
pub fn canonicalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Occurrence data for a single letter.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterFrequency {
    /// The letter (A-Z).
    pub character: char,
    /// Absolute occurrence count.
    pub count: usize,
    /// Count divided by text length.
    pub relative_frequency: f64,
}

/// Occurrence data for a bigram or trigram.
#[derive(Debug, Clone, Serialize)]
pub struct NgramFrequency {
    /// The n-gram itself.
    pub ngram: String,
    /// Absolute occurrence count.
    pub count: usize,
    /// Count divided by the number of n-gram windows.
    pub relative_frequency: f64,
}

/// A substring that occurs more than once, with its positions and gaps.
#[derive(Debug, Clone, Serialize)]
pub struct RepeatedSequence {
    /// The repeated substring.
    pub sequence: String,
    /// Every start position, ascending.
    pub positions: Vec<usize>,
    /// Gaps between consecutive positions (Kasiski raw material).
    pub distances: Vec<usize>,
    /// Occurrence count.
    pub count: usize,
}

/// The complete statistical fingerprint of a ciphertext.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsProfile {
    /// Number of A-Z characters analyzed.
    pub length: usize,
    /// Number of distinct letters observed.
    pub unique_chars: usize,
    /// All 26 letters with counts, sorted by frequency descending.
    pub character_frequencies: Vec<CharacterFrequency>,
    /// Top bigrams by count.
    pub bigram_frequencies: Vec<NgramFrequency>,
    /// Top trigrams by count.
    pub trigram_frequencies: Vec<NgramFrequency>,
    /// Probability two random positions hold the same letter.
    pub index_of_coincidence: f64,
    /// Shannon entropy in bits, at most log2(26).
    pub entropy: f64,
    /// Chi-squared against English, `None` for empty input.
    pub chi_squared_english: Option<f64>,
    /// Repeated substrings of length 3..=10, best first.
    pub repeated_sequences: Vec<RepeatedSequence>,
    /// Sorted, deduplicated union of all repeat gaps.
    pub kasiski_distances: Vec<usize>,
}

impl StatisticsProfile {
    /// Profile of the empty ciphertext: zeroed metrics, undefined chi-squared.
    pub fn empty() -> Self {
        StatisticsProfile {
            length: 0,
            unique_chars: 0,
            character_frequencies: Vec::new(),
            bigram_frequencies: Vec::new(),
            trigram_frequencies: Vec::new(),
            index_of_coincidence: 0.0,
            entropy: 0.0,
            chi_squared_english: None,
            repeated_sequences: Vec::new(),
            kasiski_distances: Vec::new(),
        }
    }
}

/// Count occurrences of each letter in canonicalized (A-Z only) bytes.
pub fn letter_counts(text: &[u8]) -> [usize; 26] {
    let mut counts = [0usize; 26];
    for &b in text {
        counts[(b - b'A') as usize] += 1;
    }
    counts
}

/// Index of coincidence of canonicalized bytes; 0.0 when shorter than two.
pub fn index_of_coincidence(text: &[u8]) -> f64 {
    let n = text.len();
    if n <= 1 {
        return 0.0;
    }
    let counts = letter_counts(text);
    let numerator: f64 = counts.iter().map(|&c| (c * c.saturating_sub(1)) as f64).sum();
    numerator / (n as f64 * (n as f64 - 1.0))
}

/// Shannon entropy of canonicalized bytes, in bits.
pub fn entropy(text: &[u8]) -> f64 {
    let n = text.len();
    if n == 0 {
        return 0.0;
    }
    let counts = letter_counts(text);
    let mut h = 0.0;
    for &count in &counts {
        if count > 0 {
            let p = count as f64 / n as f64;
            h -= p * p.log2();
        }
    }
    h
}

/// Chi-squared of canonicalized bytes against a language's letter profile.
///
/// Expected counts for very rare letters are floored at 0.1% so the
/// denominator never vanishes. Lower is a better match.
pub fn chi_squared(text: &[u8], language: Language) -> f64 {
    let n = text.len();
    if n == 0 {
        return 0.0;
    }
    let counts = letter_counts(text);
    let freqs = language.letter_frequencies();
    let mut chi = 0.0;
    for i in 0..26 {
        let observed = counts[i] as f64;
        let expected = (freqs[i].max(0.1) / 100.0) * n as f64;
        chi += (observed - expected).powi(2) / expected;
    }
    chi
}

/// Order candidate languages by closeness of the observed IoC to each
/// language's expected value. Falls back to English-first for the flat IoC
/// of polyalphabetic or random text.
pub fn detect_language_from_ioc(ioc: f64) -> Vec<Language> {
    if ioc < 0.05 {
        return vec![Language::English];
    }
    let mut ranked: Vec<(Language, f64)> = ALL_LANGUAGES
        .iter()
        .map(|&lang| (lang, (ioc - lang.expected_ioc()).abs()))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.into_iter().map(|(lang, _)| lang).collect()
}

/// Build the full statistical profile for a ciphertext.
///
/// The input is canonicalized first; an input with no letters yields
/// [`StatisticsProfile::empty`].
pub fn analyze(text: &str) -> StatisticsProfile {
    let filtered = canonicalize(text);
    let bytes = filtered.as_bytes();
    let n = bytes.len();

    if n == 0 {
        return StatisticsProfile::empty();
    }

    trace!("computing statistics profile over {} letters", n);

    let counts = letter_counts(bytes);
    let unique_chars = counts.iter().filter(|&&c| c > 0).count();

    let mut character_frequencies: Vec<CharacterFrequency> = ALPHABET
        .iter()
        .enumerate()
        .map(|(i, &letter)| CharacterFrequency {
            character: letter as char,
            count: counts[i],
            relative_frequency: counts[i] as f64 / n as f64,
        })
        .collect();
    // Stable sort keeps alphabetical order among equal counts.
    character_frequencies.sort_by(|a, b| b.count.cmp(&a.count));

    let repeated_sequences = find_repeated_sequences(bytes);
    let kasiski_distances = kasiski_distances(&repeated_sequences);

    StatisticsProfile {
        length: n,
        unique_chars,
        character_frequencies,
        bigram_frequencies: ngram_frequencies(bytes, 2),
        trigram_frequencies: ngram_frequencies(bytes, 3),
        index_of_coincidence: index_of_coincidence(bytes),
        entropy: entropy(bytes),
        chi_squared_english: Some(chi_squared(bytes, Language::English)),
        repeated_sequences,
        kasiski_distances,
    }
}

/// Count all n-gram windows and keep the most frequent.
fn ngram_frequencies(text: &[u8], n: usize) -> Vec<NgramFrequency> {
    if text.len() < n {
        return Vec::new();
    }
    let total = text.len() - n + 1;
    let mut counts: HashMap<&[u8], usize> = HashMap::new();
    for window in text.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }

    let mut result: Vec<NgramFrequency> = counts
        .into_iter()
        .map(|(ngram, count)| NgramFrequency {
            ngram: String::from_utf8_lossy(ngram).into_owned(),
            count,
            relative_frequency: count as f64 / total as f64,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ngram.cmp(&b.ngram)));
    result.truncate(TOP_NGRAMS);
    result
}

/// Find substrings of length 3..=10 that occur more than once.
///
/// Retains the top 20 by (count descending, length descending). The gaps
/// between consecutive occurrences feed the Kasiski examination.
fn find_repeated_sequences(text: &[u8]) -> Vec<RepeatedSequence> {
    let n = text.len();
    let max_len = MAX_SEQUENCE_LEN.min(n / 2);
    let mut repeated = Vec::new();

    for length in MIN_SEQUENCE_LEN..=max_len {
        let mut seen: HashMap<&[u8], Vec<usize>> = HashMap::new();
        for i in 0..=(n - length) {
            seen.entry(&text[i..i + length]).or_default().push(i);
        }

        for (seq, positions) in seen {
            if positions.len() > 1 {
                let distances: Vec<usize> = positions.windows(2).map(|w| w[1] - w[0]).collect();
                repeated.push(RepeatedSequence {
                    sequence: String::from_utf8_lossy(seq).into_owned(),
                    count: positions.len(),
                    positions,
                    distances,
                });
            }
        }
    }

    repeated.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.sequence.len().cmp(&a.sequence.len()))
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    repeated.truncate(TOP_SEQUENCES);
    repeated
}

/// Sorted unique union of all gaps from the repeated-substring table.
fn kasiski_distances(repeated: &[RepeatedSequence]) -> Vec<usize> {
    let mut distances: Vec<usize> = repeated
        .iter()
        .flat_map(|seq| seq.distances.iter().copied())
        .collect();
    distances.sort_unstable();
    distances.dedup();
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOREM: &str = "the quick brown fox jumps over the lazy dog and runs through the forest";

    #[test]
    fn canonicalize_uppercases_and_filters() {
        assert_eq!(canonicalize("Hello, World! 123"), "HELLOWORLD");
        assert_eq!(canonicalize(""), "");
        // Idempotent.
        assert_eq!(canonicalize(&canonicalize("a b c")), "ABC");
    }

    #[test]
    fn empty_input_yields_empty_profile() {
        let profile = analyze("123 !?");
        assert_eq!(profile.length, 0);
        assert!(profile.chi_squared_english.is_none());
        assert_eq!(profile.index_of_coincidence, 0.0);
    }

    #[test]
    fn frequencies_sum_to_one() {
        let profile = analyze(LOREM);
        let total: f64 = profile
            .character_frequencies
            .iter()
            .map(|f| f.relative_frequency)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(profile.character_frequencies.len(), 26);
    }

    #[test]
    fn english_text_has_natural_ioc() {
        let profile = analyze(LOREM);
        assert!(
            profile.index_of_coincidence > 0.04 && profile.index_of_coincidence < 0.09,
            "ioc was {}",
            profile.index_of_coincidence
        );
    }

    #[test]
    fn flat_text_has_low_ioc() {
        let profile = analyze("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert!(profile.index_of_coincidence < 0.01);
    }

    #[test]
    fn entropy_is_bounded_by_alphabet_size() {
        let profile = analyze(LOREM);
        assert!(profile.entropy > 0.0);
        assert!(profile.entropy <= 26f64.log2());
    }

    #[test]
    fn english_chi_squared_is_low_for_english() {
        let english = canonicalize(LOREM);
        let garbage = "QQXXZZJJQQXXZZJJQQXXZZJJQQXXZZJJ";
        let chi_en = chi_squared(english.as_bytes(), Language::English);
        let chi_garbage = chi_squared(garbage.as_bytes(), Language::English);
        assert!(chi_en < chi_garbage);
        assert!(chi_en < 100.0, "chi was {chi_en}");
    }

    #[test]
    fn repeated_sequences_are_found_with_distances() {
        // "ABCXYZABC": ABC repeats at 0 and 6.
        let profile = analyze("ABCXYZABC");
        let abc = profile
            .repeated_sequences
            .iter()
            .find(|s| s.sequence == "ABC")
            .expect("ABC should be detected");
        assert_eq!(abc.positions, vec![0, 6]);
        assert_eq!(abc.distances, vec![6]);
        assert_eq!(profile.kasiski_distances, vec![6]);
    }

    #[test]
    fn short_text_has_no_repeated_sequences() {
        let profile = analyze("ABCD");
        assert!(profile.repeated_sequences.is_empty());
        assert!(profile.kasiski_distances.is_empty());
    }

    #[test]
    fn ioc_detects_likely_languages() {
        let ranked = detect_language_from_ioc(0.0667);
        assert_eq!(ranked[0], Language::English);
        // Low IoC falls back to English only.
        assert_eq!(detect_language_from_ioc(0.039), vec![Language::English]);
    }
}
