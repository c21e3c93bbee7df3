//! Document/Paragraph/Sentence types produced by the Preprocessor (spec §3, §4.1).
//!
//! All offsets are half-open `[char_start, char_end)` byte-safe char indices into
//! the owning `Document::raw_text`, which is itself the NFC-normalized input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub index_in_paragraph: usize,
    pub global_index: usize,
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
    pub sentences: Vec<Sentence>,
    pub char_start: usize,
    pub char_end: usize,
}

impl Paragraph {
    /// True when this paragraph looks like a heading: a single sentence, no
    /// terminal punctuation, at most 12 words (spec §9 MT+ decision).
    pub fn looks_like_heading(&self) -> bool {
        let trimmed = self.text.trim();
        if trimmed.is_empty() || self.sentences.len() > 1 {
            return false;
        }
        let ends_with_terminal = trimmed
            .chars()
            .last()
            .map(|c| matches!(c, '.' | '?' | '!'))
            .unwrap_or(false);
        let word_count = trimmed.split_whitespace().count();
        !ends_with_terminal && word_count > 0 && word_count <= 12
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub raw_text: String,
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn word_count(&self) -> usize {
        self.raw_text.split_whitespace().count()
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Slice of `raw_text` covered by `[start, end)`, used when mapping span
    /// proposals back to concrete text for evidence strings.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let chars: Vec<(usize, char)> = self.raw_text.char_indices().collect();
        let byte_start = chars.get(start).map(|(b, _)| *b).unwrap_or(self.raw_text.len());
        let byte_end = chars.get(end).map(|(b, _)| *b).unwrap_or(self.raw_text.len());
        &self.raw_text[byte_start..byte_end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_detection() {
        let heading = Paragraph {
            index: 0,
            text: "Introdução Geral".to_string(),
            sentences: vec![Sentence {
                index_in_paragraph: 0,
                global_index: 0,
                text: "Introdução Geral".to_string(),
                char_start: 0,
                char_end: 16,
            }],
            char_start: 0,
            char_end: 16,
        };
        assert!(heading.looks_like_heading());

        let not_heading = Paragraph {
            index: 1,
            text: "Este texto tem pontuação final.".to_string(),
            sentences: vec![],
            char_start: 0,
            char_end: 32,
        };
        assert!(!not_heading.looks_like_heading());
    }
}
