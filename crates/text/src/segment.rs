//! Paragraph and sentence segmentation with stable character offsets.
//!
//! The segmenter treats maximal runs of non-blank lines as paragraphs and
//! splits each paragraph into sentences using a curated list of Portuguese
//! abbreviations to avoid fracturing on `Dr.`, `Sr.`, `p. ex.` and similar.

use net_est_core::{Document, Paragraph, Sentence};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Titles, measures and ordinal markers that end in `.` but never terminate
/// a sentence on their own. Lowercased, without the trailing period.
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sr", "sra", "srs", "sras", "dr", "dra", "drs", "dras", "prof", "profa", "exmo", "exma",
        "av", "al", "nº", "p", "ex", "etc", "pág", "cf", "vol", "cap", "art", "ed", "trad", "org",
        "a.c", "d.c", "séc",
    ]
    .into_iter()
    .collect()
});

/// Splits normalized text into paragraphs separated by one or more blank lines.
/// Returns `(text, char_start, char_end)` triples with offsets into `text`.
fn split_paragraphs(text: &str) -> Vec<(String, usize, usize)> {
    let mut paragraphs = Vec::new();
    let mut char_pos = 0usize;
    let mut buf = String::new();
    let mut buf_start: Option<usize> = None;

    let flush = |buf: &mut String, buf_start: &mut Option<usize>, end: usize, out: &mut Vec<(String, usize, usize)>| {
        if let Some(start) = buf_start.take() {
            let trimmed = buf.trim_end();
            if !trimmed.is_empty() {
                out.push((trimmed.to_string(), start, start + trimmed.chars().count()));
            }
        }
        buf.clear();
    };

    for line in text.split('\n') {
        let line_chars = line.chars().count();
        if line.trim().is_empty() {
            flush(&mut buf, &mut buf_start, char_pos, &mut paragraphs);
        } else {
            if buf_start.is_none() {
                buf_start = Some(char_pos);
            } else {
                buf.push('\n');
            }
            buf.push_str(line);
        }
        char_pos += line_chars + 1; // +1 for the '\n' consumed by split
    }
    flush(&mut buf, &mut buf_start, char_pos, &mut paragraphs);

    paragraphs
}

/// Returns true if `word` (lowercased, without trailing period) is a known
/// non-terminating abbreviation.
fn is_abbreviation(word: &str) -> bool {
    let trimmed = word.trim_end_matches('.').to_lowercase();
    ABBREVIATIONS.contains(trimmed.as_str())
}

/// Splits one paragraph's text into sentences, preserving terminal punctuation
/// and returning offsets relative to the paragraph's own text.
fn split_sentences(paragraph_text: &str) -> Vec<(String, usize, usize)> {
    let chars: Vec<char> = paragraph_text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c == '.' || c == '?' || c == '!' {
            let is_boundary = {
                let next_is_space_or_end = chars
                    .get(i + 1)
                    .map(|n| n.is_whitespace())
                    .unwrap_or(true);

                if !next_is_space_or_end {
                    false
                } else if c == '.' {
                    let word_start = chars[start..=i]
                        .iter()
                        .rposition(|ch| ch.is_whitespace())
                        .map(|p| start + p + 1)
                        .unwrap_or(start);
                    let word: String = chars[word_start..=i].iter().collect();
                    !is_abbreviation(&word)
                } else {
                    true
                }
            };

            if is_boundary {
                let end = i + 1;
                let text: String = chars[start..end].iter().collect();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let lead_ws = text.len() - text.trim_start().len();
                    sentences.push((trimmed.to_string(), start + lead_ws, start + lead_ws + trimmed.chars().count()));
                }
                start = end;
                while start < chars.len() && chars[start].is_whitespace() {
                    start += 1;
                }
            }
        }
        i += 1;
    }

    if start < chars.len() {
        let text: String = chars[start..].iter().collect();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let lead_ws = text.len() - text.trim_start().len();
            sentences.push((trimmed.to_string(), start + lead_ws, start + lead_ws + trimmed.chars().count()));
        }
    }

    sentences
}

/// Builds a `Document` from already-normalized text.
pub fn build_document(normalized: String) -> Document {
    let mut paragraphs = Vec::new();

    for (index, (para_text, para_start, para_end)) in split_paragraphs(&normalized).into_iter().enumerate() {
        let mut sentences = Vec::new();
        for (s_index, (sent_text, rel_start, rel_end)) in split_sentences(&para_text).into_iter().enumerate() {
            sentences.push(Sentence {
                index_in_paragraph: s_index,
                global_index: 0, // reassigned below
                text: sent_text,
                char_start: para_start + rel_start,
                char_end: para_start + rel_end,
            });
        }
        paragraphs.push(Paragraph {
            index,
            text: para_text,
            sentences,
            char_start: para_start,
            char_end: para_end,
        });
    }

    let mut global_index = 0usize;
    for paragraph in paragraphs.iter_mut() {
        for sentence in paragraph.sentences.iter_mut() {
            sentence.global_index = global_index;
            global_index += 1;
        }
    }

    Document {
        raw_text: normalized,
        paragraphs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let paragraphs = split_paragraphs("Primeiro.\n\nSegundo.");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].0, "Primeiro.");
        assert_eq!(paragraphs[1].0, "Segundo.");
    }

    #[test]
    fn does_not_split_on_abbreviation() {
        let sentences = split_sentences("O Dr. Silva chegou. Ele trouxe o relatorio.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].0.contains("Dr. Silva"));
    }

    #[test]
    fn splits_on_question_and_exclamation() {
        let sentences = split_sentences("Voce veio? Que bom! Obrigado.");
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn offsets_round_trip_into_source_text() {
        let text = "Primeiro paragrafo com duas frases. Segunda frase aqui.\n\nSegundo paragrafo.".to_string();
        let doc = build_document(text.clone());
        for paragraph in &doc.paragraphs {
            let slice: String = text.chars().skip(paragraph.char_start).take(paragraph.char_end - paragraph.char_start).collect();
            assert_eq!(slice, paragraph.text);
            for sentence in &paragraph.sentences {
                let slice: String = text.chars().skip(sentence.char_start).take(sentence.char_end - sentence.char_start).collect();
                assert_eq!(slice, sentence.text);
            }
        }
    }

    #[test]
    fn global_sentence_indices_are_sequential() {
        let doc = build_document("Um. Dois.\n\nTres.".to_string());
        let indices: Vec<usize> = doc.paragraphs.iter().flat_map(|p| p.sentences.iter().map(|s| s.global_index)).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
