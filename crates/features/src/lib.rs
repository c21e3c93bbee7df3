//! Feature & Span Extractor: computes a per-pair feature vector and proposes
//! candidate spans for the strategy classifier (spec §4.4).

mod connectors;
mod proxies;

pub use connectors::CONNECTORS;
pub use proxies::{capitalized_rate, passive_suffix_rate, pronoun_rate};

use net_est_align::{content_words, jaccard};
use net_est_core::{Paragraph, Sentence, Span};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct PairFeatures {
    pub length_ratio: f64,
    pub sentence_count_ratio: f64,
    pub avg_source_sentence_words: f64,
    pub avg_target_sentence_words: f64,
    pub avg_source_word_chars: f64,
    pub avg_target_word_chars: f64,
    pub lexical_overlap: f64,
    pub semantic_similarity: f64,
    pub connectors_gained: Vec<&'static str>,
    pub connectors_lost: Vec<&'static str>,
    pub target_sentence_count: usize,
    pub source_sentence_count: usize,
    pub passive_suffix_rate_source: f64,
    pub passive_suffix_rate_target: f64,
    pub pronoun_rate_source: f64,
    pub pronoun_rate_target: f64,
    pub capitalized_rate_target: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Paragraph,
    SentenceAnchor,
    InsertedSpan,
    DeletedSpan,
}

#[derive(Debug, Clone)]
pub struct SpanProposal {
    pub kind: SpanKind,
    pub target_offsets: Vec<Span>,
    pub source_offsets: Option<Vec<Span>>,
}

fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

fn avg_sentence_words(sentences: &[Sentence]) -> f64 {
    if sentences.is_empty() {
        return 0.0;
    }
    let total: usize = sentences.iter().map(|s| word_count(&s.text)).sum();
    total as f64 / sentences.len() as f64
}

/// Mean character length of words, a proxy for vocabulary simplicity.
fn avg_word_chars(text: &str) -> f64 {
    let words: Vec<&str> = text.unicode_words().collect();
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words.iter().map(|w| w.chars().count()).sum();
    total as f64 / words.len() as f64
}

/// Computes the feature vector for one aligned paragraph pair.
pub fn extract_features(source: &Paragraph, target: &Paragraph, semantic_similarity: f64, degraded: bool) -> PairFeatures {
    let source_words = word_count(&source.text).max(1);
    let target_words = word_count(&target.text);

    let source_content = content_words(&source.text);
    let target_content = content_words(&target.text);

    PairFeatures {
        length_ratio: target_words as f64 / source_words as f64,
        sentence_count_ratio: target.sentences.len() as f64 / source.sentences.len().max(1) as f64,
        avg_source_sentence_words: avg_sentence_words(&source.sentences),
        avg_target_sentence_words: avg_sentence_words(&target.sentences),
        avg_source_word_chars: avg_word_chars(&source.text),
        avg_target_word_chars: avg_word_chars(&target.text),
        lexical_overlap: jaccard(&source_content, &target_content),
        semantic_similarity,
        connectors_gained: connectors::gained(&source.text, &target.text),
        connectors_lost: connectors::lost(&source.text, &target.text),
        target_sentence_count: target.sentences.len(),
        source_sentence_count: source.sentences.len(),
        passive_suffix_rate_source: passive_suffix_rate(&source.text),
        passive_suffix_rate_target: passive_suffix_rate(&target.text),
        pronoun_rate_source: pronoun_rate(&source.text),
        pronoun_rate_target: pronoun_rate(&target.text),
        capitalized_rate_target: capitalized_rate(&target.text),
        degraded,
    }
}

const SENTENCE_ANCHOR_OVERLAP_THRESHOLD: f64 = 0.6;

/// Proposes candidate spans for the pair: the whole-paragraph default anchor,
/// sentence-level anchors for high-overlap sentence pairs, and inserted/deleted
/// span anchors derived from connector deltas.
pub fn propose_spans(source: &Paragraph, target: &Paragraph, features: &PairFeatures) -> Vec<SpanProposal> {
    let mut proposals = vec![SpanProposal {
        kind: SpanKind::Paragraph,
        target_offsets: vec![Span { start: target.char_start, end: target.char_end }],
        source_offsets: Some(vec![Span { start: source.char_start, end: source.char_end }]),
    }];

    for target_sentence in &target.sentences {
        let target_words = content_words(&target_sentence.text);
        let mut best: Option<(&Sentence, f64)> = None;
        for source_sentence in &source.sentences {
            let overlap = jaccard(&target_words, &content_words(&source_sentence.text));
            if best.map(|(_, b)| overlap > b).unwrap_or(true) {
                best = Some((source_sentence, overlap));
            }
        }
        if let Some((source_sentence, overlap)) = best {
            if overlap >= SENTENCE_ANCHOR_OVERLAP_THRESHOLD {
                proposals.push(SpanProposal {
                    kind: SpanKind::SentenceAnchor,
                    target_offsets: vec![Span { start: target_sentence.char_start, end: target_sentence.char_end }],
                    source_offsets: Some(vec![Span { start: source_sentence.char_start, end: source_sentence.char_end }]),
                });
            }
        }
    }

    if !features.connectors_gained.is_empty() {
        proposals.push(SpanProposal {
            kind: SpanKind::InsertedSpan,
            target_offsets: vec![Span { start: target.char_start, end: target.char_end }],
            source_offsets: None,
        });
    }

    if !features.connectors_lost.is_empty() {
        let anchor = target
            .sentences
            .first()
            .map(|s| Span { start: s.char_start, end: s.char_end })
            .unwrap_or(Span { start: target.char_start, end: target.char_end });
        proposals.push(SpanProposal {
            kind: SpanKind::DeletedSpan,
            target_offsets: vec![anchor],
            source_offsets: Some(vec![Span { start: source.char_start, end: source.char_end }]),
        });
    }

    proposals
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_core::Document;

    fn document(text: &str) -> Document {
        net_est_text_for_tests::build(text)
    }

    mod net_est_text_for_tests {
        // Minimal local segmenter for feature-extractor unit tests, avoiding
        // a dev-dependency cycle on net-est-text.
        use net_est_core::{Document, Paragraph, Sentence};

        pub fn build(text: &str) -> Document {
            let mut paragraphs = Vec::new();
            let mut global = 0usize;
            let mut char_pos = 0usize;
            for (p_idx, para) in text.split("\n\n").enumerate() {
                let para_start = char_pos;
                let mut sentences = Vec::new();
                let mut sent_pos = para_start;
                for (s_idx, sent) in para.split_inclusive(['.', '?', '!']).enumerate() {
                    if sent.trim().is_empty() {
                        continue;
                    }
                    let len = sent.chars().count();
                    sentences.push(Sentence {
                        index_in_paragraph: s_idx,
                        global_index: global,
                        text: sent.trim().to_string(),
                        char_start: sent_pos,
                        char_end: sent_pos + len,
                    });
                    global += 1;
                    sent_pos += len;
                }
                let para_len = para.chars().count();
                paragraphs.push(Paragraph {
                    index: p_idx,
                    text: para.to_string(),
                    sentences,
                    char_start: para_start,
                    char_end: para_start + para_len,
                });
                char_pos += para_len + 2;
            }
            Document { raw_text: text.to_string(), paragraphs }
        }
    }

    #[test]
    fn length_ratio_reflects_word_counts() {
        let doc = document("uma duas tres quatro.\n\numa duas.");
        let features = extract_features(&doc.paragraphs[0], &doc.paragraphs[1], 0.8, false);
        assert!(features.length_ratio < 1.0);
    }

    #[test]
    fn paragraph_span_is_always_proposed() {
        let doc = document("uma frase aqui.\n\noutra frase aqui.");
        let features = extract_features(&doc.paragraphs[0], &doc.paragraphs[1], 0.8, false);
        let proposals = propose_spans(&doc.paragraphs[0], &doc.paragraphs[1], &features);
        assert!(proposals.iter().any(|p| p.kind == SpanKind::Paragraph));
    }

    #[test]
    fn inserted_connector_yields_inserted_span() {
        let doc = document("o texto original.\n\no texto, ou seja, explicado.");
        let features = extract_features(&doc.paragraphs[0], &doc.paragraphs[1], 0.8, false);
        let proposals = propose_spans(&doc.paragraphs[0], &doc.paragraphs[1], &features);
        assert!(proposals.iter().any(|p| p.kind == SpanKind::InsertedSpan));
    }
}
