//! Multi-language candidate scoring.
//!
//! Every decryption candidate is scored against all supported languages
//! with three signals: chi-squared against letter frequencies, the share of
//! bigram positions hitting that language's common bigrams, and the share
//! of the language's common words appearing as substrings (candidate text
//! has no spaces, so substring search is the contract). The combined score
//! is `chi_squared - 50 * bigram_ratio - 100 * word_ratio`; lower is
//! better, and the language minimizing it becomes `best_language`.

use crate::engines::interface::{CipherKey, RawCandidate};
use crate::engines::CipherType;
use crate::languages::{Language, ALL_LANGUAGES};
use crate::statistics::{canonicalize, chi_squared};
use serde::Serialize;

/// Weight of the bigram hit ratio in the combined score.
const BIGRAM_WEIGHT: f64 = 50.0;
/// Weight of the common-word hit ratio in the combined score.
const WORD_WEIGHT: f64 = 100.0;

/// Per-language breakdown of a candidate's score.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageScore {
    /// The language scored against.
    pub language: Language,
    /// Chi-squared against the language's letter frequencies.
    pub chi_squared: f64,
    /// Fraction of bigram positions matching the language's top bigrams.
    pub bigram_score: f64,
    /// Fraction of the language's common words found as substrings.
    pub word_score: f64,
    /// `chi_squared - 50 * bigram_score - 100 * word_score`.
    pub combined_score: f64,
}

/// A candidate with multi-language scores attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    /// The decrypted text.
    pub plaintext: String,
    /// Which cipher produced it.
    pub cipher_type: CipherType,
    /// The key that produced it.
    pub key: CipherKey,
    /// How the key was found.
    pub method: &'static str,
    /// The language minimizing the combined score.
    pub best_language: Language,
    /// The combined score for that language; lower is better.
    pub best_score: f64,
    /// Scores for every language, in declaration order.
    pub all_scores: Vec<LanguageScore>,
    /// Confidence in [0, 1] derived from the best chi-squared.
    pub confidence: f64,
}

/// Fraction of bigram positions in canonicalized bytes that hit the
/// language's common-bigram table. Zero for texts shorter than two.
pub fn bigram_ratio(text: &[u8], language: Language) -> f64 {
    if text.len() < 2 {
        return 0.0;
    }
    let common = language.common_bigrams();
    let total = text.len() - 1;
    let matches = text
        .windows(2)
        .filter(|w| common.iter().any(|bg| bg.as_bytes() == *w))
        .count();
    matches as f64 / total as f64
}

/// Fraction of the language's common words (length >= 3) found as
/// substrings of the canonicalized text.
pub fn word_hit_ratio(text: &str, language: Language) -> f64 {
    let words = language.common_words();
    if words.is_empty() {
        return 0.0;
    }
    let found = words
        .iter()
        .filter(|w| w.len() >= 3 && text.contains(*w))
        .count();
    found as f64 / words.len() as f64
}

/// Combined score of canonicalized text against one language.
pub fn combined_score(text: &str, language: Language) -> f64 {
    let bytes = text.as_bytes();
    chi_squared(bytes, language) - BIGRAM_WEIGHT * bigram_ratio(bytes, language)
        - WORD_WEIGHT * word_hit_ratio(text, language)
}

/// Full per-language score breakdown for canonicalized text.
pub fn score_against(text: &str, language: Language) -> LanguageScore {
    let bytes = text.as_bytes();
    let chi = chi_squared(bytes, language);
    let bigram = bigram_ratio(bytes, language);
    let word = word_hit_ratio(text, language);
    LanguageScore {
        language,
        chi_squared: chi,
        bigram_score: bigram,
        word_score: word,
        combined_score: chi - BIGRAM_WEIGHT * bigram - WORD_WEIGHT * word,
    }
}

/// The language with the lowest combined score for the given text, ties
/// broken by language declaration order. The input is canonicalized first.
pub fn best_combined(text: &str) -> (Language, f64) {
    let filtered = canonicalize(text);
    let mut best = (Language::English, f64::INFINITY);
    for lang in ALL_LANGUAGES {
        let score = combined_score(&filtered, lang);
        if score < best.1 {
            best = (lang, score);
        }
    }
    best
}

/// The language with the lowest chi-squared for the given text. Cheaper
/// than [`best_combined`]; used for engine-internal ranking of large
/// candidate pools.
pub fn best_chi_squared(text: &str) -> (Language, f64) {
    let filtered = canonicalize(text);
    let mut best = (Language::English, f64::INFINITY);
    for lang in ALL_LANGUAGES {
        let score = chi_squared(filtered.as_bytes(), lang);
        if score < best.1 {
            best = (lang, score);
        }
    }
    best
}

/// Map the best chi-squared to a confidence bucket.
pub fn confidence_from_chi(chi: f64) -> f64 {
    if chi < 40.0 {
        0.95
    } else if chi < 60.0 {
        0.85
    } else if chi < 100.0 {
        0.70
    } else if chi < 150.0 {
        0.50
    } else if chi < 250.0 {
        0.30
    } else {
        0.10
    }
}

/// Score a raw candidate against every language.
///
/// Consumes the raw candidate and yields a new owned [`ScoredCandidate`].
/// An empty plaintext gets an infinite score and zero confidence; the
/// filter removes it downstream.
pub fn score_candidate(candidate: RawCandidate) -> ScoredCandidate {
    let filtered = canonicalize(&candidate.plaintext);

    if filtered.is_empty() {
        return ScoredCandidate {
            plaintext: candidate.plaintext,
            cipher_type: candidate.cipher_type,
            key: candidate.key,
            method: candidate.method,
            best_language: Language::English,
            best_score: f64::INFINITY,
            all_scores: Vec::new(),
            confidence: 0.0,
        };
    }

    let all_scores: Vec<LanguageScore> = ALL_LANGUAGES
        .iter()
        .map(|&lang| score_against(&filtered, lang))
        .collect();

    // Strict less-than keeps the earliest language on ties.
    let mut best_idx = 0;
    for (i, score) in all_scores.iter().enumerate() {
        if score.combined_score < all_scores[best_idx].combined_score {
            best_idx = i;
        }
    }

    let best = &all_scores[best_idx];
    ScoredCandidate {
        plaintext: candidate.plaintext,
        cipher_type: candidate.cipher_type,
        key: candidate.key,
        method: candidate.method,
        best_language: best.language,
        best_score: best.combined_score,
        confidence: confidence_from_chi(best.chi_squared),
        all_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(plaintext: &str) -> RawCandidate {
        RawCandidate {
            plaintext: plaintext.to_string(),
            cipher_type: CipherType::Caesar,
            key: CipherKey::Shift(0),
            method: "brute_force",
            score: 0.0,
        }
    }

    #[test]
    fn english_text_scores_best_as_english() {
        let scored = score_candidate(raw(
            "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG AND THE CAT WATCHES THEM FROM THE WALL",
        ));
        assert_eq!(scored.best_language, Language::English);
        assert_eq!(scored.all_scores.len(), 6);
        assert!(scored.confidence > 0.5);
    }

    #[test]
    fn german_text_scores_best_as_german() {
        let scored = score_candidate(raw(
            "DER SCHNELLE BRAUNE FUCHS SPRINGT UEBER DEN FAULEN HUND UND DIE KATZE SCHAUT IHNEN ZU",
        ));
        assert_eq!(scored.best_language, Language::German);
    }

    #[test]
    fn combined_score_is_finite_for_any_letter_string() {
        for text in ["A", "ZZZZ", "QXJKVBW", "THEAND"] {
            for lang in ALL_LANGUAGES {
                let score = combined_score(text, lang);
                assert!(score.is_finite(), "{text}/{lang} gave {score}");
            }
        }
    }

    #[test]
    fn empty_plaintext_scores_infinite() {
        let scored = score_candidate(raw(""));
        assert_eq!(scored.best_score, f64::INFINITY);
        assert_eq!(scored.confidence, 0.0);
    }

    #[test]
    fn bigram_ratio_counts_overlapping_windows() {
        // "THE" has windows TH and HE, both common English bigrams.
        assert!((bigram_ratio(b"THE", Language::English) - 1.0).abs() < 1e-9);
        assert_eq!(bigram_ratio(b"T", Language::English), 0.0);
    }

    #[test]
    fn word_hit_ratio_uses_substring_search() {
        // No spaces: THE and THAT are still found inside the run.
        let ratio = word_hit_ratio("XXTHATXX", Language::English);
        assert!(ratio > 0.0);
        assert_eq!(word_hit_ratio("QQQQ", Language::English), 0.0);
    }

    #[test]
    fn confidence_buckets_follow_chi_thresholds() {
        assert_eq!(confidence_from_chi(10.0), 0.95);
        assert_eq!(confidence_from_chi(50.0), 0.85);
        assert_eq!(confidence_from_chi(80.0), 0.70);
        assert_eq!(confidence_from_chi(120.0), 0.50);
        assert_eq!(confidence_from_chi(200.0), 0.30);
        assert_eq!(confidence_from_chi(400.0), 0.10);
    }

    #[test]
    fn gibberish_scores_worse_than_english() {
        let english = score_candidate(raw("THERAININSPAINFALLSMAINLYONTHEPLAIN"));
        let gibberish = score_candidate(raw("XQZJKWVBXQZJKWVBXQZJKWVBXQZJKWVBXQZ"));
        assert!(english.best_score < gibberish.best_score);
    }
}
