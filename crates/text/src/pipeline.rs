//! Preprocessor: normalize raw text and segment it into a `Document`.

use crate::error::{Result, TextError};
use crate::normalize::normalize;
use crate::segment::build_document;
use net_est_core::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    pub max_words: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self { max_words: 2000 }
    }
}

/// One step of preprocessing, kept for the pipeline's overall step trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessStep {
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessorConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self { config }
    }

    /// Normalizes and segments `raw` into a `Document`, returning the trail
    /// of steps applied for inclusion in the orchestrator's stage trace.
    pub fn process(&self, raw: &str) -> Result<(Document, Vec<PreprocessStep>)> {
        let mut steps = Vec::new();

        let normalized = normalize(raw);
        steps.push(PreprocessStep {
            name: "normalize".to_string(),
            detail: "NFC normalization, zero-width stripping, marker removal, whitespace collapse".to_string(),
        });

        if normalized.trim().is_empty() {
            return Err(TextError::Empty);
        }

        let document = build_document(normalized);
        let word_count = document.word_count();
        debug!(word_count, paragraphs = document.paragraphs.len(), "segmented document");

        if word_count > self.config.max_words {
            return Err(TextError::TooLong {
                actual: word_count,
                max: self.config.max_words,
            });
        }

        steps.push(PreprocessStep {
            name: "segment".to_string(),
            detail: format!("{} paragraphs, {} words", document.paragraphs.len(), word_count),
        });

        Ok((document, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        let pre = Preprocessor::new(PreprocessorConfig::default());
        let result = pre.process("   \n\n  ");
        assert!(matches!(result, Err(TextError::Empty)));
    }

    #[test]
    fn rejects_text_over_max_words() {
        let pre = Preprocessor::new(PreprocessorConfig { max_words: 3 });
        let result = pre.process("uma duas tres quatro cinco");
        assert!(matches!(result, Err(TextError::TooLong { .. })));
    }

    #[test]
    fn produces_document_with_steps() {
        let pre = Preprocessor::new(PreprocessorConfig::default());
        let (doc, steps) = pre.process("Primeira frase. Segunda frase.\n\nSegundo paragrafo.").unwrap();
        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(steps.len(), 2);
    }
}
