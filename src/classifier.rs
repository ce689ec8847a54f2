//! Cipher family classification from statistical invariants.
//!
//! Every classical cipher preserves or destroys specific statistical
//! structure, and that structure leaks the family before any decryption is
//! attempted. The classifier starts from an index-of-coincidence prior and
//! nudges it with four further signals: the shape of the frequency curve
//! (Spearman rank correlation against reference languages), bigram hit
//! rates, Kasiski repeats, and entropy.

use crate::engines::CipherType;
use crate::languages::{Language, ALL_LANGUAGES};
use crate::statistics::StatisticsProfile;
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashMap;

/// IoC at or above this suggests monoalphabetic or transposition.
pub const IOC_HIGH_THRESHOLD: f64 = 0.060;
/// IoC between mid and high suggests a short-key polyalphabetic.
pub const IOC_MID_THRESHOLD: f64 = 0.050;
/// IoC below this suggests a long-key polyalphabetic or random text.
pub const IOC_LOW_THRESHOLD: f64 = 0.042;

/// Texts shorter than this get a flat prior.
const MIN_CLASSIFIABLE_LENGTH: usize = 20;

/// Largest key-length factor the Kasiski hint considers.
const MAX_KASISKI_FACTOR: usize = 15;

/// Probability distribution over cipher families with supporting detail.
#[derive(Debug, Clone, Serialize)]
pub struct CipherFamilyProbabilities {
    /// Probability of a monoalphabetic substitution.
    pub monoalphabetic: f64,
    /// Probability of a polyalphabetic substitution.
    pub polyalphabetic: f64,
    /// Probability of a transposition.
    pub transposition: f64,
    /// Ranked likely ciphers within the monoalphabetic family.
    pub likely_monoalphabetic: Vec<CipherType>,
    /// Ranked likely ciphers within the polyalphabetic family.
    pub likely_polyalphabetic: Vec<CipherType>,
    /// Ranked likely ciphers within the transposition family.
    pub likely_transposition: Vec<CipherType>,
    /// Key-length hints for polyalphabetic ciphers (at most five).
    pub estimated_key_lengths: Vec<usize>,
    /// Gap between the top and second probability.
    pub classification_confidence: f64,
    /// Human-readable account of each signal.
    pub reasoning: Vec<String>,
}

impl Default for CipherFamilyProbabilities {
    fn default() -> Self {
        CipherFamilyProbabilities {
            monoalphabetic: 0.0,
            polyalphabetic: 0.0,
            transposition: 0.0,
            likely_monoalphabetic: Vec::new(),
            likely_polyalphabetic: Vec::new(),
            likely_transposition: Vec::new(),
            estimated_key_lengths: Vec::new(),
            classification_confidence: 0.0,
            reasoning: Vec::new(),
        }
    }
}

/// Classify the cipher family from a statistics profile.
pub fn classify(profile: &StatisticsProfile) -> CipherFamilyProbabilities {
    if profile.length < MIN_CLASSIFIABLE_LENGTH {
        debug!(
            "text too short to classify ({} letters), returning flat prior",
            profile.length
        );
        return CipherFamilyProbabilities {
            monoalphabetic: 1.0 / 3.0,
            polyalphabetic: 1.0 / 3.0,
            transposition: 1.0 / 3.0,
            classification_confidence: 0.1,
            reasoning: vec!["Text too short for reliable classification".to_string()],
            ..Default::default()
        };
    }

    let ioc = profile.index_of_coincidence;
    let mut reasoning = Vec::new();

    // IoC prior: the fastest discriminator.
    let (mut mono, mut poly, mut trans): (f64, f64, f64) = if ioc >= IOC_HIGH_THRESHOLD {
        reasoning.push(format!(
            "IoC={ioc:.4} (high) suggests monoalphabetic or transposition"
        ));
        (0.7, 0.1, 0.6)
    } else if ioc >= IOC_MID_THRESHOLD {
        reasoning.push(format!(
            "IoC={ioc:.4} (medium) suggests short-key polyalphabetic"
        ));
        (0.3, 0.6, 0.2)
    } else if ioc >= IOC_LOW_THRESHOLD {
        reasoning.push(format!("IoC={ioc:.4} (low) suggests polyalphabetic"));
        (0.1, 0.8, 0.1)
    } else {
        reasoning.push(format!(
            "IoC={ioc:.4} (very low) suggests long-key polyalphabetic or random text"
        ));
        (0.05, 0.7, 0.05)
    };

    // Frequency-curve shape. Substitution permutes the curve but keeps its
    // shape; a flattened curve points at polyalphabetic.
    let (curve_lang, curve_corr) = frequency_curve_match(profile);
    if curve_corr > 0.85 {
        mono = (mono + 0.2).min(0.9);
        trans = (trans + 0.1).min(0.9);
        reasoning.push(format!(
            "Frequency curve strongly matches {curve_lang} (r={curve_corr:.2}), consistent with mono/transposition"
        ));
    } else if curve_corr > 0.6 {
        mono = (mono + 0.15).min(0.9);
        reasoning.push(format!(
            "Frequency curve moderately matches {curve_lang} (r={curve_corr:.2}), suggests monoalphabetic"
        ));
    } else {
        poly = (poly + 0.2).min(0.9);
        reasoning.push(format!(
            "Frequency curve matches no language well (r={curve_corr:.2}), suggests polyalphabetic"
        ));
    }

    // Bigram structure survives substitution of single letters only in
    // transposition ciphers, where the letters themselves are untouched.
    let (bigram_lang, bigram_corr) = best_bigram_correlation(profile);
    if bigram_corr > 0.7 {
        trans = (trans + 0.2).min(0.95);
        reasoning.push(format!(
            "High bigram hit rate for {bigram_lang} ({bigram_corr:.2}), strong transposition signal"
        ));
    } else if bigram_corr < 0.3 {
        trans = (trans - 0.2).max(0.05);
        reasoning.push(format!(
            "Low bigram hit rate ({bigram_corr:.2}) argues against transposition"
        ));
    }

    // Kasiski: repeated substrings at regular spacing are the signature of
    // a periodic polyalphabetic cipher.
    let key_lengths = kasiski_key_lengths(&profile.kasiski_distances);
    if !key_lengths.is_empty() {
        poly = (poly + 0.2).min(0.95);
        mono = (mono - 0.15).max(0.05);
        reasoning.push(format!(
            "Kasiski repeats found, likely key lengths {:?}",
            &key_lengths[..key_lengths.len().min(3)]
        ));
    }

    // Entropy: a flattened distribution runs close to log2(26).
    let entropy_ratio = profile.entropy / 26f64.log2();
    if entropy_ratio > 0.95 {
        poly = (poly + 0.1).min(0.9);
        reasoning.push(format!(
            "High entropy ({:.2} bits) indicates a flattened distribution",
            profile.entropy
        ));
    } else if entropy_ratio < 0.85 {
        mono = (mono + 0.1).min(0.9);
        trans = (trans + 0.1).min(0.9);
        reasoning.push(format!(
            "Moderate entropy ({:.2} bits) indicates preserved structure",
            profile.entropy
        ));
    }

    let total = mono + poly + trans;
    mono /= total;
    poly /= total;
    trans /= total;

    let mut probs = [mono, poly, trans];
    probs.sort_by(f64::total_cmp);
    let confidence = probs[2] - probs[1];

    trace!(
        "classification: mono={mono:.3} poly={poly:.3} trans={trans:.3} confidence={confidence:.3}"
    );

    CipherFamilyProbabilities {
        monoalphabetic: mono,
        polyalphabetic: poly,
        transposition: trans,
        likely_monoalphabetic: rank_monoalphabetic(curve_corr),
        likely_polyalphabetic: rank_polyalphabetic(&key_lengths),
        likely_transposition: vec![CipherType::RailFence, CipherType::Columnar],
        estimated_key_lengths: key_lengths,
        classification_confidence: confidence,
        reasoning,
    }
}

/// Best Spearman rank correlation between the observed frequency curve
/// (sorted descending) and each language's sorted reference curve.
fn frequency_curve_match(profile: &StatisticsProfile) -> (Language, f64) {
    let observed: Vec<f64> = profile
        .character_frequencies
        .iter()
        .map(|f| f.relative_frequency * 100.0)
        .collect();

    let mut best = (Language::English, 0.0f64);
    for lang in ALL_LANGUAGES {
        let mut expected: Vec<f64> = lang.letter_frequencies().to_vec();
        expected.sort_by(|a, b| b.total_cmp(a));
        let corr = spearman(&observed, &expected);
        if corr.is_finite() && corr > best.1 {
            best = (lang, corr);
        }
    }
    best
}

/// Per-language bigram hit percentage from the profile's bigram table,
/// normalized into [0, 1]. The top ten reference bigrams of a language
/// typically cover ~10% of positions in matching natural text.
fn best_bigram_correlation(profile: &StatisticsProfile) -> (Language, f64) {
    if profile.length < 2 {
        return (Language::English, 0.0);
    }
    let total = (profile.length - 1) as f64;
    let counts: HashMap<&str, usize> = profile
        .bigram_frequencies
        .iter()
        .map(|ng| (ng.ngram.as_str(), ng.count))
        .collect();

    let mut best = (Language::English, 0.0f64);
    for lang in ALL_LANGUAGES {
        let hit_percent: f64 = lang
            .common_bigrams()
            .iter()
            .take(10)
            .map(|bg| *counts.get(*bg).unwrap_or(&0) as f64 / total * 100.0)
            .sum();
        let corr = (hit_percent / 10.0).min(1.0);
        if corr > best.1 {
            best = (lang, corr);
        }
    }
    best
}

/// Rank candidate key lengths by how many Kasiski distances they divide.
/// Returns at most five factors in 2..=15, most supported first.
pub fn kasiski_key_lengths(distances: &[usize]) -> Vec<usize> {
    if distances.is_empty() {
        return Vec::new();
    }
    let mut factor_counts: HashMap<usize, usize> = HashMap::new();
    for &d in distances {
        for f in 2..=MAX_KASISKI_FACTOR.min(d) {
            if d % f == 0 {
                *factor_counts.entry(f).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(usize, usize)> = factor_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(5).map(|(f, _)| f).collect()
}

/// Caesar first; the broader substitutions join when the frequency curve
/// does not already look like a plain shift.
fn rank_monoalphabetic(curve_corr: f64) -> Vec<CipherType> {
    let mut ciphers = vec![CipherType::Caesar];
    if curve_corr <= 0.8 {
        ciphers.push(CipherType::SimpleSubstitution);
        ciphers.push(CipherType::Affine);
    }
    ciphers.push(CipherType::Atbash);
    ciphers.push(CipherType::Rot13);
    ciphers
}

/// Vigenère first; Autokey moves up when no periodic key length was found,
/// since a non-repeating key defeats the Kasiski examination.
fn rank_polyalphabetic(key_lengths: &[usize]) -> Vec<CipherType> {
    let mut ciphers = vec![CipherType::Vigenere, CipherType::Beaufort];
    if key_lengths.is_empty() {
        ciphers.insert(1, CipherType::Autokey);
    } else {
        ciphers.push(CipherType::Autokey);
    }
    ciphers
}

/// Spearman rank correlation with average ranks for ties.
fn spearman(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    pearson(&ranks(a), &ranks(b))
}

/// Assign 1-based ranks, averaging over runs of equal values.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut result = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Average rank over the tie run [i, j].
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            result[idx] = avg;
        }
        i = j + 1;
    }
    result
}

/// Pearson correlation coefficient.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..x.len() {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}
