//! Confidence scoring between a transcript fragment and one lyric line.
//!
//! Both inputs must already be normalized (see `normalize`). The score is a
//! word-overlap ratio plus two bonuses:
//! - Substring bonus when one whole string contains the other
//! - Keyword bonus for long (more discriminating) words that match

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::normalize::tokenize;

/// Flat bonus when either full string contains the other.
pub const SUBSTRING_BONUS: f64 = 0.25;

/// Bonus per matched recognized word longer than `KEYWORD_MIN_CHARS`.
pub const KEYWORD_BONUS: f64 = 0.10;

pub const KEYWORD_MIN_CHARS: usize = 5;

/// Elided short forms a recognizer may emit for a sung full form, keyed both ways.
pub static CONTRACTION_ALIASES: Lazy<FxHashMap<&'static str, Vec<&'static str>>> =
    Lazy::new(|| {
        let mut m: FxHashMap<&'static str, Vec<&'static str>> = FxHashMap::default();
        for (short, long) in [("pa", "para")] {
            m.entry(short).or_default().push(long);
            m.entry(long).or_default().push(short);
        }
        m
    });

pub fn is_contraction_of(word: &str, other: &str) -> bool {
    CONTRACTION_ALIASES
        .get(word)
        .is_some_and(|forms| forms.iter().any(|f| *f == other))
}

/// Word-level match: equal, substring either way, or a known contraction pair.
pub fn words_match(recognized: &str, line_word: &str) -> bool {
    recognized == line_word
        || line_word.contains(recognized)
        || recognized.contains(line_word)
        || is_contraction_of(recognized, line_word)
}

/// Similarity in [0, 1] between a normalized fragment and a normalized line.
pub fn score(recognized: &str, line: &str) -> f64 {
    let recognized_words = tokenize(recognized);
    let line_words = tokenize(line);

    if recognized_words.is_empty() || line_words.is_empty() {
        return 0.0;
    }

    let matched = recognized_words
        .iter()
        .filter(|&&w| line_words.iter().any(|&lw| words_match(w, lw)))
        .count();
    let word_match_ratio = matched as f64 / recognized_words.len().max(line_words.len()) as f64;

    let substring_bonus = if line.contains(recognized) || recognized.contains(line) {
        SUBSTRING_BONUS
    } else {
        0.0
    };

    let keywords = recognized_words
        .iter()
        .filter(|&&w| w.chars().count() >= KEYWORD_MIN_CHARS)
        .filter(|&&w| line_words.iter().any(|&lw| lw.contains(w) || w.contains(lw)))
        .count();
    let keyword_bonus = keywords as f64 * KEYWORD_BONUS;

    (word_match_ratio + substring_bonus + keyword_bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_exact_line_scores_full() {
        assert_eq!(score("dos", "dos"), 1.0);
        assert_eq!(score("te quiero mucho", "te quiero mucho"), 1.0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(score("", "dos"), 0.0);
        assert_eq!(score("dos", ""), 0.0);
        assert_eq!(score("", ""), 0.0);
    }

    #[test]
    fn test_only_short_words_scores_zero() {
        assert_eq!(score("y a", "y a la"), 0.0);
    }

    #[test]
    fn test_unrelated_words_score_zero() {
        assert_eq!(score("cero", "uno"), 0.0);
    }

    #[test]
    fn test_ratio_uses_longer_token_list() {
        // 1 of max(1, 4) words, plus substring bonus ("noche" is inside the line)
        let s = score("noche", "toda la noche entera");
        let expected = 0.25 + SUBSTRING_BONUS + KEYWORD_BONUS;
        assert!((s - expected).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn test_partial_word_counts_as_match() {
        assert!(words_match("quier", "quiero"));
        assert!(words_match("quiero", "quier"));
        assert!(!words_match("cero", "uno"));
    }

    #[rstest]
    #[case("pa", "para")]
    #[case("para", "pa")]
    fn test_contraction_aliases(#[case] a: &str, #[case] b: &str) {
        assert!(is_contraction_of(a, b));
        assert!(words_match(a, b));
    }

    #[test]
    fn test_keyword_bonus_only_for_long_words() {
        // "sol" and "mar" are short: no keyword bonus, but both match
        let short = score("sol mar", "sol mar cielo");
        let expected = 2.0 / 3.0 + SUBSTRING_BONUS;
        assert!((short - expected).abs() < 1e-9, "got {short}");
    }

    #[test]
    fn test_score_is_capped_at_one() {
        assert_eq!(score("corazon partido", "corazon partido"), 1.0);
    }

    proptest! {
        #[test]
        fn prop_score_in_unit_interval(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            let s = score(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
