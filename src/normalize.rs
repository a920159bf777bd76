//! Text canonicalization shared by transcript fragments and lyric lines.
//!
//! CRITICAL: fragments and lines must go through the same `normalize` before
//! any comparison. Inconsistent normalization shows up as silent no-matches.

use unicode_normalization::UnicodeNormalization;

/// Tokens this short carry no matching signal (articles, prepositions).
pub const MIN_TOKEN_CHARS: usize = 2;

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Lowercase, decompose (NFD), drop combining marks, trim.
/// e.g., "  Corazón " → "corazon", "ÁRBOL" → "arbol"
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.trim().to_string()
}

/// Whitespace tokens of an already-normalized string, minus the short ones.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Corazón"), "corazon");
        assert_eq!(normalize("ÁRBOL"), "arbol");
        assert_eq!(normalize("pingüino"), "pinguino");
        assert_eq!(normalize("niño"), "nino");
    }

    #[test]
    fn test_normalize_trims_but_keeps_inner_spacing() {
        assert_eq!(normalize("  Te  Quiero \n"), "te  quiero");
    }

    #[test]
    fn test_normalize_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("Canción de AMOR");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_precomposed_and_decomposed_agree() {
        // "é" as one code point vs "e" + U+0301
        assert_eq!(normalize("caf\u{00E9}"), normalize("cafe\u{0301}"));
    }

    #[test]
    fn test_tokenize_drops_short_words() {
        assert_eq!(tokenize("y a la playa"), vec!["la", "playa"]);
        assert!(tokenize("a e y").is_empty());
        assert!(tokenize("").is_empty());
    }
}
