//! Paragraph Aligner: pairwise similarity, top-K selection with tie-breaking,
//! symmetrized alignment, and confidence bucketing (spec §4.3).

mod lexical;

pub use lexical::{content_words, jaccard};

use net_est_core::{AlignedPair, AlignmentResult, ConfidenceBucket, Embedding, UnalignedParagraph};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub threshold: f64,
    pub top_k: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self { threshold: 0.5, top_k: 3 }
    }
}

pub struct Aligner {
    config: AlignerConfig,
}

/// One candidate match considered while picking top-K for a given row.
struct Candidate {
    index: usize,
    similarity: f64,
}

impl Aligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    /// Aligns source and target paragraphs using precomputed embeddings.
    /// `source` and `target` must be in paragraph-index order.
    pub fn align(&self, source: &[Embedding], target: &[Embedding]) -> AlignmentResult {
        let matrix = Self::similarity_matrix(source, target, Embedding::dot);
        self.align_from_matrix(&matrix, false)
    }

    /// Aligns using lexical-Jaccard similarity, for degraded-mode operation.
    pub fn align_lexical(&self, source_texts: &[String], target_texts: &[String]) -> AlignmentResult {
        let source_words: Vec<HashSet<String>> = source_texts.iter().map(|t| content_words(t)).collect();
        let target_words: Vec<HashSet<String>> = target_texts.iter().map(|t| content_words(t)).collect();

        let rows = source_words.len();
        let cols = target_words.len();
        let mut matrix = vec![vec![0.0f64; cols]; rows];
        for i in 0..rows {
            for j in 0..cols {
                matrix[i][j] = jaccard(&source_words[i], &target_words[j]);
            }
        }

        self.align_from_matrix(&matrix, true)
    }

    fn similarity_matrix(source: &[Embedding], target: &[Embedding], score: impl Fn(&Embedding, &Embedding) -> f32) -> Vec<Vec<f64>> {
        source
            .iter()
            .map(|s| target.iter().map(|t| score(s, t) as f64).collect())
            .collect()
    }

    fn align_from_matrix(&self, matrix: &[Vec<f64>], degraded: bool) -> AlignmentResult {
        let rows = matrix.len();
        let cols = if rows == 0 { 0 } else { matrix[0].len() };

        if rows == 0 || cols == 0 {
            return AlignmentResult::default();
        }

        let mut pairs = Vec::new();
        let mut target_hit = vec![false; cols];
        let mut source_best: Vec<Option<(usize, f64)>> = vec![None; rows];
        let mut target_best: Vec<Option<(usize, f64)>> = vec![None; cols];

        for i in 0..rows {
            let mut candidates: Vec<Candidate> = (0..cols)
                .map(|j| Candidate { index: j, similarity: matrix[i][j] })
                .filter(|c| c.similarity >= self.config.threshold)
                .collect();

            Self::sort_candidates(&mut candidates, i);
            candidates.truncate(self.config.top_k);

            for candidate in &candidates {
                target_hit[candidate.index] = true;
                pairs.push(AlignedPair {
                    source_paragraph_index: i,
                    target_paragraph_index: candidate.index,
                    similarity: candidate.similarity,
                    confidence: ConfidenceBucket::bucket(candidate.similarity, self.config.threshold, degraded),
                    degraded,
                });
            }

            for j in 0..cols {
                let sim = matrix[i][j];
                if source_best[i].map(|(_, best)| sim > best).unwrap_or(true) {
                    source_best[i] = Some((j, sim));
                }
                if target_best[j].map(|(_, best)| sim > best).unwrap_or(true) {
                    target_best[j] = Some((i, sim));
                }
            }
        }

        let source_aligned: HashSet<usize> = pairs.iter().map(|p| p.source_paragraph_index).collect();

        let unaligned_source = (0..rows)
            .filter(|i| !source_aligned.contains(i))
            .map(|i| UnalignedParagraph {
                paragraph_index: i,
                best_similarity: source_best[i].map(|(_, s)| s).unwrap_or(0.0),
                best_counterpart_index: source_best[i].map(|(j, _)| j),
            })
            .collect();

        let unaligned_target = (0..cols)
            .filter(|j| !target_hit[*j])
            .map(|j| UnalignedParagraph {
                paragraph_index: j,
                best_similarity: target_best[j].map(|(_, s)| s).unwrap_or(0.0),
                best_counterpart_index: target_best[j].map(|(i, _)| i),
            })
            .collect();

        AlignmentResult {
            pairs,
            unaligned_source,
            unaligned_target,
            truncated: false,
        }
    }

    /// Sorts by similarity descending; ties broken by distance to the source
    /// row index, then by smaller target index (spec §4.3 tie-breaking rule).
    fn sort_candidates(candidates: &mut [Candidate], row: usize) {
        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let da = (a.index as i64 - row as i64).abs();
                    let db = (b.index as i64 - row as i64).abs();
                    da.cmp(&db)
                })
                .then_with(|| a.index.cmp(&b.index))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(v: Vec<f32>) -> Embedding {
        Embedding { vector: v, model_version: "test".to_string() }
    }

    #[test]
    fn empty_sides_produce_empty_result() {
        let aligner = Aligner::new(AlignerConfig::default());
        let result = aligner.align(&[], &[embedding(vec![1.0, 0.0])]);
        assert!(result.pairs.is_empty());
        assert!(result.unaligned_source.is_empty());
        assert!(result.unaligned_target.is_empty());
    }

    #[test]
    fn aligns_best_matches_above_threshold() {
        let aligner = Aligner::new(AlignerConfig { threshold: 0.5, top_k: 1 });
        let source = vec![embedding(vec![1.0, 0.0]), embedding(vec![0.0, 1.0])];
        let target = vec![embedding(vec![1.0, 0.0]), embedding(vec![0.0, 1.0])];
        let result = aligner.align(&source, &target);
        assert_eq!(result.pairs.len(), 2);
        assert!(result.unaligned_source.is_empty());
        assert!(result.unaligned_target.is_empty());
    }

    #[test]
    fn below_threshold_paragraphs_are_unaligned() {
        let aligner = Aligner::new(AlignerConfig { threshold: 0.9, top_k: 3 });
        let source = vec![embedding(vec![1.0, 0.0])];
        let target = vec![embedding(vec![0.0, 1.0])];
        let result = aligner.align(&source, &target);
        assert!(result.pairs.is_empty());
        assert_eq!(result.unaligned_source.len(), 1);
        assert_eq!(result.unaligned_target.len(), 1);
        assert_eq!(result.unaligned_source[0].best_counterpart_index, Some(0));
    }

    #[test]
    fn tie_break_prefers_closer_index() {
        let aligner = Aligner::new(AlignerConfig { threshold: 0.1, top_k: 1 });
        // Row 1 ties between target 0 and target 2 at the same similarity.
        let matrix = vec![
            vec![1.0, 0.2, 0.2],
            vec![0.5, 0.5, 0.5],
        ];
        let result = aligner.align_from_matrix(&matrix, false);
        let row1 = result.pairs.iter().find(|p| p.source_paragraph_index == 1).unwrap();
        assert_eq!(row1.target_paragraph_index, 0);
    }

    #[test]
    fn lexical_fallback_uses_degraded_buckets() {
        let aligner = Aligner::new(AlignerConfig::default());
        let source = vec!["o gato correu rapido".to_string()];
        let target = vec!["o gato correu muito rapido ontem".to_string()];
        let result = aligner.align_lexical(&source, &target);
        assert_eq!(result.pairs.len(), 1);
        assert!(result.pairs[0].degraded);
    }
}
