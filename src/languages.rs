//! Reference language data for the scorer and classifier.
//!
//! Letter frequencies, common bigrams, common words and expected index of
//! coincidence for the six supported European languages. All tables are
//! embedded constants so they can be shared by reference across threads;
//! nothing here touches the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The uppercase Latin alphabet every pipeline stage works over.
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Languages the scorer can rank candidates against.
///
/// Declaration order matters: it is the tie-break order when two languages
/// produce the same combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    English,
    /// French
    French,
    /// German
    German,
    /// Spanish
    Spanish,
    /// Italian
    Italian,
    /// Portuguese
    Portuguese,
}

/// All supported languages in declaration (tie-break) order.
pub const ALL_LANGUAGES: [Language; 6] = [
    Language::English,
    Language::French,
    Language::German,
    Language::Spanish,
    Language::Italian,
    Language::Portuguese,
];

impl Language {
    /// Lowercase name used on the wire and in the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
            Language::German => "german",
            Language::Spanish => "spanish",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
        }
    }

    /// Position in [`ALL_LANGUAGES`], used for deterministic tie-breaking.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Letter frequency table (percentages, indexed A..Z).
    pub fn letter_frequencies(&self) -> &'static [f64; 26] {
        match self {
            Language::English => &ENGLISH_FREQUENCIES,
            Language::French => &FRENCH_FREQUENCIES,
            Language::German => &GERMAN_FREQUENCIES,
            Language::Spanish => &SPANISH_FREQUENCIES,
            Language::Italian => &ITALIAN_FREQUENCIES,
            Language::Portuguese => &PORTUGUESE_FREQUENCIES,
        }
    }

    /// The most common bigrams, ordered most frequent first.
    pub fn common_bigrams(&self) -> &'static [&'static str] {
        match self {
            Language::English => ENGLISH_BIGRAMS,
            Language::French => FRENCH_BIGRAMS,
            Language::German => GERMAN_BIGRAMS,
            Language::Spanish => SPANISH_BIGRAMS,
            Language::Italian => ITALIAN_BIGRAMS,
            Language::Portuguese => PORTUGUESE_BIGRAMS,
        }
    }

    /// Common short words used for substring detection in spaceless text.
    pub fn common_words(&self) -> &'static [&'static str] {
        match self {
            Language::English => ENGLISH_WORDS,
            Language::French => FRENCH_WORDS,
            Language::German => GERMAN_WORDS,
            Language::Spanish => SPANISH_WORDS,
            Language::Italian => ITALIAN_WORDS,
            Language::Portuguese => PORTUGUESE_WORDS,
        }
    }

    /// Expected index of coincidence for natural text in this language.
    pub fn expected_ioc(&self) -> f64 {
        match self {
            Language::English => 0.0667,
            Language::French => 0.0778,
            Language::German => 0.0762,
            Language::Spanish => 0.0775,
            Language::Italian => 0.0738,
            Language::Portuguese => 0.0745,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "french" | "fr" => Ok(Language::French),
            "german" | "de" => Ok(Language::German),
            "spanish" | "es" => Ok(Language::Spanish),
            "italian" | "it" => Ok(Language::Italian),
            "portuguese" | "pt" => Ok(Language::Portuguese),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

/// English letter frequencies (percentages, A..Z).
pub const ENGLISH_FREQUENCIES: [f64; 26] = [
    8.17, 1.29, 2.78, 4.25, 12.70, 2.23, 2.02, 6.09, 6.97, 0.15, 0.77, 4.03, 2.41, // A-M
    6.75, 7.51, 1.93, 0.10, 5.99, 6.33, 9.06, 2.76, 0.98, 2.36, 0.15, 1.97, 0.07, // N-Z
];

/// French letter frequencies (percentages, A..Z).
pub const FRENCH_FREQUENCIES: [f64; 26] = [
    7.64, 0.90, 3.18, 3.67, 14.72, 1.07, 0.87, 0.74, 7.53, 0.55, 0.05, 5.46, 2.97,
    7.10, 5.27, 2.52, 1.36, 6.55, 7.95, 7.24, 6.31, 1.83, 0.05, 0.39, 0.31, 0.14,
];

/// German letter frequencies (percentages, A..Z).
pub const GERMAN_FREQUENCIES: [f64; 26] = [
    6.51, 1.89, 3.06, 5.08, 16.40, 1.66, 3.01, 4.76, 7.55, 0.27, 1.21, 3.44, 2.53,
    9.78, 2.51, 0.79, 0.02, 7.00, 7.27, 6.15, 4.35, 0.67, 1.89, 0.03, 0.04, 1.13,
];

/// Spanish letter frequencies (percentages, A..Z).
pub const SPANISH_FREQUENCIES: [f64; 26] = [
    12.53, 1.42, 4.68, 5.86, 13.68, 0.69, 1.01, 0.70, 6.25, 0.44, 0.01, 4.97, 3.16,
    6.71, 8.68, 2.51, 0.88, 6.87, 7.98, 4.63, 3.93, 0.90, 0.02, 0.22, 0.90, 0.52,
];

/// Italian letter frequencies (percentages, A..Z).
pub const ITALIAN_FREQUENCIES: [f64; 26] = [
    11.74, 0.92, 4.50, 3.73, 11.79, 0.95, 1.64, 1.54, 11.28, 0.01, 0.01, 6.51, 2.51,
    6.88, 9.83, 3.05, 0.51, 6.37, 4.98, 5.62, 3.01, 2.10, 0.02, 0.02, 0.02, 0.49,
];

/// Portuguese letter frequencies (percentages, A..Z).
pub const PORTUGUESE_FREQUENCIES: [f64; 26] = [
    14.63, 1.04, 3.88, 4.99, 12.57, 1.02, 1.30, 1.28, 6.18, 0.40, 0.02, 2.78, 4.74,
    5.05, 10.73, 2.52, 1.20, 6.53, 7.81, 4.34, 4.63, 1.67, 0.01, 0.21, 0.01, 0.47,
];

/// Top English bigrams, most frequent first.
pub const ENGLISH_BIGRAMS: &[&str] = &[
    "TH", "HE", "IN", "ER", "AN", "RE", "ON", "AT", "EN", "ND", "TI", "ES", "OR", "TE",
    "OF", "ED", "IS", "IT", "AL", "AR", "ST", "TO", "NT", "NG", "SE", "HA", "AS", "OU",
    "IO", "LE",
];

/// Top French bigrams, most frequent first.
pub const FRENCH_BIGRAMS: &[&str] = &[
    "ES", "LE", "DE", "EN", "RE", "NT", "ON", "ER", "OU", "AN", "TE", "AI", "SE", "IT",
    "ET", "ME", "IS", "QU", "LA", "NE", "LI", "EL", "UR", "EU", "CE", "TI", "EM", "PA",
    "RI", "NS",
];

/// Top German bigrams, most frequent first.
pub const GERMAN_BIGRAMS: &[&str] = &[
    "EN", "ER", "CH", "DE", "EI", "ND", "TE", "IN", "IE", "GE", "ES", "NE", "UN", "ST",
    "RE", "HE", "AN", "BE", "SE", "NG", "AU", "SS", "IC", "SC", "DI", "LE", "LI", "VE",
    "DA", "RI",
];

/// Top Spanish bigrams, most frequent first.
pub const SPANISH_BIGRAMS: &[&str] = &[
    "DE", "EN", "ES", "EL", "LA", "OS", "UE", "AS", "ER", "RA", "AN", "AL", "AD", "ON",
    "AR", "RE", "SE", "NT", "OR", "DO", "CO", "TA", "CI", "TE", "IO", "IA", "ND", "QU",
    "NO", "ST",
];

/// Top Italian bigrams, most frequent first.
pub const ITALIAN_BIGRAMS: &[&str] = &[
    "RE", "ER", "ON", "DI", "TO", "EN", "TA", "TE", "AN", "AT", "NE", "NO", "RA", "LA",
    "TI", "DE", "CO", "LE", "NT", "IO", "RI", "IN", "AL", "AR", "SE", "SO", "SI", "EL",
    "CH", "ZI",
];

/// Top Portuguese bigrams, most frequent first.
pub const PORTUGUESE_BIGRAMS: &[&str] = &[
    "DE", "OS", "AS", "ES", "DO", "DA", "EM", "EN", "NO", "RA", "ER", "NT", "AN", "AD",
    "AO", "OR", "AR", "SE", "QU", "TE", "CO", "TA", "AL", "RE", "ST", "AM", "IA", "NA",
    "CA", "IS",
];

/// Common English words (2-7 letters).
pub const ENGLISH_WORDS: &[&str] = &[
    "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HAD", "HER", "WAS",
    "ONE", "OUR", "OUT", "HAS", "HIS", "HOW", "ITS", "MAY", "NEW", "NOW", "OLD", "SEE",
    "TWO", "WAY", "WHO", "BOY", "DID", "GET", "HIM", "LET", "PUT", "SAY", "SHE", "TOO",
    "USE", "THAT", "WITH", "HAVE", "THIS", "WILL", "YOUR", "FROM", "THEY", "BEEN",
    "MANY", "SOME", "THEM", "THEN", "THESE", "WOULD", "MAKE", "LIKE", "INTO", "TIME",
    "VERY", "WHEN", "COME", "COULD", "MORE", "THAN", "FIRST", "WATER", "OTHER",
    "PEOPLE",
];

/// Common French words.
pub const FRENCH_WORDS: &[&str] = &[
    "LE", "LA", "LES", "DE", "DES", "DU", "UN", "UNE", "ET", "EST", "EN", "QUE", "QUI",
    "IL", "ELLE", "ON", "NE", "PAS", "PLUS", "DANS", "CE", "CETTE", "CES", "POUR",
    "PAR", "SUR", "AVEC", "SANS", "SOUS", "MAIS", "OU", "AU", "AUX", "SON", "SA",
    "SES", "MON", "MA", "MES", "TON", "TA", "TES", "NOTRE", "VOTRE", "LEUR", "NOUS",
    "VOUS", "ILS", "ELLES", "SONT", "ETRE", "AVOIR", "FAIT", "FAIRE", "PEUT", "TOUT",
    "TOUS", "TOUTE", "BIEN", "COMME", "AUSSI", "AUTRE", "TRES", "TEMPS", "MONDE",
    "HOMME", "FEMME", "JOUR",
];

/// Common German words.
pub const GERMAN_WORDS: &[&str] = &[
    "DER", "DIE", "DAS", "UND", "IST", "VON", "ZU", "DEN", "MIT", "SICH", "DES", "AUF",
    "FUR", "NICHT", "ALS", "AUCH", "ES", "AN", "WIR", "HAT", "AUS", "ER", "AM", "EINE",
    "EINER", "EINEM", "EINEN", "WIE", "NACH", "IM", "SIND", "NUR", "NOCH", "KANN",
    "BEI", "ABER", "WENN", "MAN", "MEHR", "ODER", "WAR", "SEIN", "SCHON", "SO", "WIRD",
    "SEHR", "DIESE", "NUN", "UNTER", "MUSS", "HABEN", "HATTE", "IHRE", "WERDEN",
    "WURDE",
];

/// Common Spanish words.
pub const SPANISH_WORDS: &[&str] = &[
    "DE", "LA", "QUE", "EL", "EN", "LOS", "DEL", "SE", "LAS", "POR", "UN", "PARA",
    "CON", "NO", "UNA", "SU", "AL", "ES", "LO", "COMO", "MAS", "PERO", "SUS", "LE",
    "YA", "HA", "ERA", "SIDO", "ESTE", "ESTA", "DESDE", "SIN", "ENTRE", "CUANDO",
    "TODO", "SER", "SON", "DOS", "TIENE", "HASTA", "HACE", "PUEDE", "TODOS", "ASI",
    "NOS", "MUY", "BIEN", "TIEMPO", "VIDA", "MUNDO",
];

/// Common Italian words.
pub const ITALIAN_WORDS: &[&str] = &[
    "DI", "CHE", "IL", "LA", "UN", "UNA", "PER", "NON", "CON", "DEL", "DA", "SONO",
    "DELLA", "ANCHE", "PIU", "HA", "ERA", "LORO", "SUO", "SUE", "MA", "COME", "IO",
    "TU", "LUI", "LEI", "NOI", "VOI", "ESSERE", "AVERE", "QUESTO", "QUELLO", "TUTTO",
    "TUTTI", "BENE", "SEMPRE", "DOVE", "QUANDO", "PRIMA", "DOPO", "ANCORA", "MOLTO",
];

/// Common Portuguese words.
pub const PORTUGUESE_WORDS: &[&str] = &[
    "DE", "QUE", "NAO", "EM", "PARA", "COM", "UMA", "OS", "NO", "SE", "NA", "POR",
    "MAIS", "AS", "DOS", "COMO", "MAS", "AO", "ELE", "DAS", "SEM", "MESMO", "AOS",
    "TEM", "SEUS", "QUEM", "NAS", "ME", "ESSE", "ELES", "VOCE", "ESSA", "NUM", "NEM",
    "SUAS", "MEU", "MINHA", "NUMA", "PELOS", "ELAS", "ERA", "SER", "QUANDO", "MUITO",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_tables_sum_to_roughly_one_hundred() {
        for lang in ALL_LANGUAGES {
            let total: f64 = lang.letter_frequencies().iter().sum();
            assert!(
                (total - 100.0).abs() < 1.0,
                "{lang} frequencies sum to {total}"
            );
        }
    }

    #[test]
    fn every_language_has_thirty_bigrams() {
        for lang in ALL_LANGUAGES {
            assert_eq!(lang.common_bigrams().len(), 30, "{lang}");
            for bg in lang.common_bigrams() {
                assert_eq!(bg.len(), 2);
            }
        }
    }

    #[test]
    fn word_lists_are_uppercase_alphabetic() {
        for lang in ALL_LANGUAGES {
            assert!(lang.common_words().len() >= 40, "{lang}");
            for word in lang.common_words() {
                assert!(word.bytes().all(|b| b.is_ascii_uppercase()), "{word}");
            }
        }
    }

    #[test]
    fn language_round_trips_through_str() {
        for lang in ALL_LANGUAGES {
            assert_eq!(lang.as_str().parse::<Language>(), Ok(lang));
        }
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn tie_break_order_is_declaration_order() {
        assert_eq!(Language::English.index(), 0);
        assert_eq!(Language::Portuguese.index(), 5);
    }
}
