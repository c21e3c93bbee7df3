//! Lexical-Jaccard similarity used when the Embedder is in degraded mode.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "o", "as", "os", "de", "do", "da", "dos", "das", "em", "no", "na", "nos", "nas",
        "um", "uma", "uns", "umas", "e", "ou", "que", "para", "por", "com", "sem", "se", "sua",
        "seu", "suas", "seus", "ao", "aos", "à", "às", "mas", "como", "mais", "menos", "muito",
        "ja", "já", "nao", "não", "sim", "ser", "estar", "foi", "era", "este", "esta", "isso",
        "ele", "ela", "eles", "elas", "eu", "tu", "voce", "você",
    ]
    .into_iter()
    .collect()
});

/// Lowercases and splits on non-alphanumeric boundaries, dropping stop words,
/// standing in for a lemmatized content-word set (spec §4.3's lexical fallback
/// and §4.4's lexical overlap feature share this approximation).
pub fn content_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_words() {
        let words = content_words("O gato e o cachorro");
        assert!(!words.contains("o"));
        assert!(!words.contains("e"));
        assert!(words.contains("gato"));
        assert!(words.contains("cachorro"));
    }

    #[test]
    fn identical_sets_have_jaccard_one() {
        let a = content_words("gato cachorro");
        let b = content_words("gato cachorro");
        assert_eq!(jaccard(&a, &b), 1.0);
    }

    #[test]
    fn disjoint_sets_have_jaccard_zero() {
        let a = content_words("gato");
        let b = content_words("bicicleta");
        assert_eq!(jaccard(&a, &b), 0.0);
    }
}
