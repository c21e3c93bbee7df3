//! Text normalization: NFC, zero-width stripping, stray marker removal, whitespace collapse.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Zero-width and other invisible formatting characters that should never
/// survive into offsets downstream.
const ZERO_WIDTH: &[char] = &[
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{FEFF}', // byte order mark
    '\u{00AD}', // soft hyphen
];

/// Matches a line that consists solely of a bracketed strategy marker left
/// over from a prior annotation pass, e.g. `[OM+]` or `[ SL+ , MOD+ ]`.
static STRATEGY_MARKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\[\s*[A-Z]{2,3}\+\s*(?:,\s*[A-Z]{2,3}\+\s*)*\]\s*$").unwrap());

static INTERNAL_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Runs the full normalization pipeline described for the preprocessor:
/// NFC, zero-width stripping, stray-marker-line removal, then whitespace
/// collapse per line with leading/trailing trim per paragraph left to the
/// segmenter (which operates on the normalized text).
pub fn normalize(raw: &str) -> String {
    let nfc: String = raw.nfc().collect();
    let stripped: String = nfc.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect();
    let without_markers = STRATEGY_MARKER_LINE.replace_all(&stripped, "");

    without_markers
        .lines()
        .map(|line| INTERNAL_WHITESPACE.replace_all(line.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("uma    frase   com   espacos"), "uma frase com espacos");
    }

    #[test]
    fn strips_zero_width_characters() {
        let input = "pal\u{200B}avra";
        assert_eq!(normalize(input), "palavra");
    }

    #[test]
    fn strips_stray_strategy_marker_lines() {
        let input = "Primeiro paragrafo.\n[OM+]\nSegundo paragrafo.";
        let out = normalize(input);
        assert!(!out.contains("[OM+]"));
    }

    #[test]
    fn keeps_inline_bracket_text() {
        let input = "O texto [citado] permanece.";
        assert_eq!(normalize(input), input);
    }
}
