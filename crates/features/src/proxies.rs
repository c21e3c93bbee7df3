//! Lexical proxies standing in for the unavailable Portuguese POS pipeline
//! (spec §4.4 MV+/TA+ notes).

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

const PASSIVE_SUFFIXES: &[&str] = &["ado", "ada", "ados", "adas", "ido", "ida"];

static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "eu", "tu", "ele", "ela", "nos", "nós", "vos", "eles", "elas", "voce", "você", "voces",
        "vocês", "me", "te", "se", "lhe", "lhes", "nos", "vos", "o", "a", "os", "as", "isto",
        "isso", "aquilo", "este", "esta", "esse", "essa", "aquele", "aquela", "meu", "minha",
        "seu", "sua", "teu", "tua", "nosso", "nossa",
    ]
    .into_iter()
    .collect()
});

fn words(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

/// Fraction of words ending in a common Portuguese passive-participle suffix.
pub fn passive_suffix_rate(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens
        .iter()
        .filter(|w| {
            let lower = w.to_lowercase();
            PASSIVE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .count();
    hits as f64 / tokens.len() as f64
}

/// Fraction of words that are closed-class pronouns.
pub fn pronoun_rate(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|w| PRONOUNS.contains(w.to_lowercase().as_str())).count();
    hits as f64 / tokens.len() as f64
}

/// Fraction of words that start with an uppercase letter and are not the
/// first word of their sentence (proxy for proper-noun density); approximated
/// here over the whole text for simplicity.
pub fn capitalized_rate(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens
        .iter()
        .filter(|w| w.chars().next().map(|c| c.is_uppercase()).unwrap_or(false))
        .count();
    hits as f64 / tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_passive_participles() {
        let rate = passive_suffix_rate("o relatorio foi aprovado pelos deputados eleitos");
        assert!(rate > 0.0);
    }

    #[test]
    fn detects_pronouns() {
        let rate = pronoun_rate("ele disse que ela viria");
        assert!(rate > 0.0);
    }

    #[test]
    fn empty_text_has_zero_rates() {
        assert_eq!(passive_suffix_rate(""), 0.0);
        assert_eq!(pronoun_rate(""), 0.0);
        assert_eq!(capitalized_rate(""), 0.0);
    }
}
