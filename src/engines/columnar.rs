//! Columnar transposition cipher engine.
//!
//! The plaintext fills a grid row by row (padded with X) and the columns
//! are read out in the order given by a keyword's alphabetical ranking or
//! an explicit ordering. Cracking tries dictionary keywords, exhausts
//! every ordering for small widths, and samples random orderings for the
//! larger ones. Scoring is against English, where the combined score's
//! bigram and word signals do the real work: a transposition never changes
//! the letter histogram.

use super::interface::{
    sort_and_trim, CipherEngine, CipherKey, DecryptionResult, RawCandidate,
};
use super::CipherType;
use crate::config::AnalysisOptions;
use crate::dictionary::KEYWORD_DICTIONARY;
use crate::errors::CipherError;
use crate::languages::Language;
use crate::scoring;
use crate::statistics::{self, StatisticsProfile};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Widths up to this get every permutation; larger widths are sampled.
const EXHAUSTIVE_WIDTH_LIMIT: usize = 6;

/// Random orderings sampled per width beyond the exhaustive limit.
const SAMPLED_ORDERINGS: usize = 1000;

/// Grid padding character.
const PAD: char = 'X';

/// The columnar transposition engine.
pub struct ColumnarEngine;

/// Alphabetical ranking of a keyword's letters, ties broken left to right,
/// ordinals starting at 1. "ZEBRAS" becomes [6, 3, 2, 4, 1, 5].
pub(crate) fn keyword_to_order(keyword: &str) -> Vec<usize> {
    let letters: Vec<u8> = keyword.bytes().collect();
    let mut sorted: Vec<usize> = (0..letters.len()).collect();
    sorted.sort_by_key(|&i| (letters[i], i));

    let mut order = vec![0usize; letters.len()];
    for (ordinal, &position) in sorted.iter().enumerate() {
        order[position] = ordinal + 1;
    }
    order
}

/// Whether `order` is a permutation of 1..=len.
fn is_permutation(order: &[usize]) -> bool {
    if order.len() < 2 {
        return false;
    }
    let mut seen = vec![false; order.len()];
    for &o in order {
        if o == 0 || o > order.len() || seen[o - 1] {
            return false;
        }
        seen[o - 1] = true;
    }
    true
}

/// Write the canonicalized text row-wise into a grid of width
/// `order.len()`, pad with X, and read columns by ascending ordinal.
fn columnar_encrypt(text: &str, order: &[usize]) -> String {
    let mut filtered = statistics::canonicalize(text);
    let width = order.len();
    while filtered.len() % width != 0 {
        filtered.push(PAD);
    }
    let bytes = filtered.as_bytes();
    let rows = bytes.len() / width;

    let mut out = String::with_capacity(bytes.len());
    for ordinal in 1..=width {
        let position = order.iter().position(|&o| o == ordinal).unwrap_or(0);
        for row in 0..rows {
            out.push(bytes[row * width + position] as char);
        }
    }
    out
}

/// Slice the ciphertext into columns (columns whose ordinal is at most
/// `n mod width` are one row longer when the grid is ragged) and read the
/// grid back row by row.
fn columnar_decrypt(text: &str, order: &[usize]) -> String {
    let filtered = statistics::canonicalize(text);
    let width = order.len();
    let n = filtered.len();
    if width < 2 || n == 0 {
        return filtered;
    }
    let bytes = filtered.as_bytes();
    let rows = n.div_ceil(width);
    let long_columns = n % width;

    let column_length = |position: usize| -> usize {
        if long_columns == 0 || order[position] <= long_columns {
            rows
        } else {
            rows - 1
        }
    };

    let mut columns: Vec<&[u8]> = vec![&[]; width];
    let mut start = 0;
    for ordinal in 1..=width {
        let Some(position) = order.iter().position(|&o| o == ordinal) else {
            continue;
        };
        let len = column_length(position).min(n - start);
        columns[position] = &bytes[start..start + len];
        start += len;
    }

    let mut out = String::with_capacity(n);
    for row in 0..rows {
        for column in columns.iter().take(width) {
            if row < column.len() {
                out.push(column[row] as char);
            }
        }
    }
    out
}

/// English combined score for ranking orderings.
fn english_score(plaintext: &str) -> f64 {
    scoring::combined_score(plaintext, Language::English)
}

/// All permutations of 1..=len via Heap's algorithm.
fn permutations(len: usize) -> Vec<Vec<usize>> {
    fn heap(k: usize, items: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k {
            heap(k - 1, items, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
    }
    let mut items: Vec<usize> = (1..=len).collect();
    let mut out = Vec::new();
    heap(len, &mut items, &mut out);
    out
}

impl CipherEngine for ColumnarEngine {
    fn cipher_type(&self) -> CipherType {
        CipherType::Columnar
    }

    fn name(&self) -> &'static str {
        "Columnar Transposition Cipher"
    }

    fn description(&self) -> &'static str {
        "A transposition cipher that writes the plaintext into a grid row by \
         row and reads the columns in the order given by a keyword's \
         alphabetical ranking."
    }

    fn detect(&self, statistics: &StatisticsProfile) -> f64 {
        let ioc = statistics.index_of_coincidence;
        if ioc > 0.065 {
            0.6
        } else if ioc > 0.06 {
            0.4
        } else {
            0.1
        }
    }

    fn attempt_decrypt(
        &self,
        ciphertext: &str,
        _statistics: &StatisticsProfile,
        options: &AnalysisOptions,
    ) -> Vec<RawCandidate> {
        let filtered = statistics::canonicalize(ciphertext);
        let n = filtered.len();
        if n < 4 {
            debug!("text too short for columnar analysis");
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for word in KEYWORD_DICTIONARY.iter() {
            if word.len() < 2 || word.len() > n {
                continue;
            }
            let order = keyword_to_order(word);
            let plaintext = columnar_decrypt(&filtered, &order);
            candidates.push(RawCandidate {
                score: english_score(&plaintext),
                plaintext,
                cipher_type: CipherType::Columnar,
                key: CipherKey::Keyword(word.clone()),
                method: "dictionary",
            });
        }

        // Exhaust every ordering for narrow grids.
        let exhaustive_max = EXHAUSTIVE_WIDTH_LIMIT.min(n / 2);
        for width in 2..=exhaustive_max {
            let mut best: Option<(Vec<usize>, String, f64)> = None;
            for order in permutations(width) {
                if options.cancel.is_cancelled() {
                    debug!("columnar enumeration cancelled");
                    sort_and_trim(&mut candidates);
                    return candidates;
                }
                let plaintext = columnar_decrypt(&filtered, &order);
                let score = english_score(&plaintext);
                if best.as_ref().is_none_or(|(_, _, s)| score < *s) {
                    best = Some((order, plaintext, score));
                }
            }
            if let Some((order, plaintext, score)) = best {
                candidates.push(RawCandidate {
                    plaintext,
                    cipher_type: CipherType::Columnar,
                    key: CipherKey::ColumnOrder(order),
                    method: "permutation_search",
                    score,
                });
            }
        }

        // Sample random orderings for the wider grids.
        let mut rng = StdRng::seed_from_u64(options.effective_seed());
        for width in (EXHAUSTIVE_WIDTH_LIMIT + 1)..=options.max_key_length.min(n / 2) {
            let mut best: Option<(Vec<usize>, String, f64)> = None;
            for _ in 0..SAMPLED_ORDERINGS {
                if options.cancel.is_cancelled() {
                    debug!("columnar sampling cancelled");
                    sort_and_trim(&mut candidates);
                    return candidates;
                }
                let mut order: Vec<usize> = (1..=width).collect();
                order.shuffle(&mut rng);
                let plaintext = columnar_decrypt(&filtered, &order);
                let score = english_score(&plaintext);
                if best.as_ref().is_none_or(|(_, _, s)| score < *s) {
                    best = Some((order, plaintext, score));
                }
            }
            if let Some((order, plaintext, score)) = best {
                candidates.push(RawCandidate {
                    plaintext,
                    cipher_type: CipherType::Columnar,
                    key: CipherKey::ColumnOrder(order),
                    method: "sampled_orderings",
                    score,
                });
            }
        }

        trace!("columnar produced {} candidates before trim", candidates.len());
        sort_and_trim(&mut candidates);
        candidates
    }

    fn decrypt_with_key(
        &self,
        ciphertext: &str,
        key: &CipherKey,
    ) -> Result<DecryptionResult, CipherError> {
        let order = match key {
            CipherKey::Keyword(word) if word.len() >= 2 => keyword_to_order(word),
            CipherKey::ColumnOrder(order) if is_permutation(order) => order.clone(),
            _ => {
                return Err(CipherError::InvalidKey(
                    "columnar expects a keyword or a 1-indexed column ordering".into(),
                ))
            }
        };
        let plaintext = columnar_decrypt(ciphertext, &order);
        Ok(DecryptionResult {
            explanation: self.explain(ciphertext, &plaintext, key),
            plaintext,
            key: key.clone(),
            confidence: 1.0,
        })
    }

    fn encrypt(&self, plaintext: &str, key: &CipherKey) -> Result<String, CipherError> {
        let order = match key {
            CipherKey::Keyword(word) if word.len() >= 2 => keyword_to_order(word),
            CipherKey::ColumnOrder(order) if is_permutation(order) => order.clone(),
            _ => {
                return Err(CipherError::InvalidKey(
                    "columnar expects a keyword or a 1-indexed column ordering".into(),
                ))
            }
        };
        Ok(columnar_encrypt(plaintext, &order))
    }

    fn generate_random_key(&self, rng: &mut StdRng) -> CipherKey {
        let length = rng.random_range(4..=8);
        let word: String = (0..length)
            .map(|_| (b'A' + rng.random_range(0..26u8)) as char)
            .collect();
        CipherKey::Keyword(word)
    }

    fn validate_key(&self, key: &CipherKey) -> bool {
        match key {
            CipherKey::Keyword(word) => {
                word.len() >= 2 && word.bytes().all(|b| b.is_ascii_uppercase())
            }
            CipherKey::ColumnOrder(order) => is_permutation(order),
            _ => false,
        }
    }

    fn explain(&self, _ciphertext: &str, _plaintext: &str, key: &CipherKey) -> String {
        match key {
            CipherKey::Keyword(word) => {
                let order = keyword_to_order(word);
                let rendered: Vec<String> = order.iter().map(|o| o.to_string()).collect();
                format!(
                    "Columnar transposition with keyword '{word}'. Sorting the keyword \
                     alphabetically gives column order {}; the plaintext was written in \
                     rows and the columns read out in that order.",
                    rendered.join(",")
                )
            }
            _ => format!(
                "Columnar transposition with explicit column order {key}. The \
                 ciphertext was sliced into columns and the grid read back row by row."
            ),
        }
    }
}
