//! Embedding and AlignedPair types shared between the Embedder and Aligner (spec §3, §4.3).

use serde::{Deserialize, Serialize};

/// A fixed-length, L2-normalized dense vector. Cosine similarity between two
/// `Embedding`s is a plain dot product because of the normalization invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub model_version: String,
}

impl Embedding {
    pub fn dot(&self, other: &Embedding) -> f32 {
        self.vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBucket {
    /// Bucket a similarity score using the thresholds in spec §4.3 step 5,
    /// halved when `degraded` (lexical fallback produces lower magnitudes).
    pub fn bucket(similarity: f64, threshold: f64, degraded: bool) -> Self {
        let (high, medium) = if degraded {
            (0.4, 0.325)
        } else {
            (0.8, 0.65)
        };
        if similarity >= high {
            ConfidenceBucket::High
        } else if similarity >= medium {
            ConfidenceBucket::Medium
        } else if similarity >= threshold {
            ConfidenceBucket::Low
        } else {
            ConfidenceBucket::VeryLow
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedPair {
    pub source_paragraph_index: usize,
    pub target_paragraph_index: usize,
    pub similarity: f64,
    pub confidence: ConfidenceBucket,
    /// True when this pair was scored via the lexical-Jaccard fallback
    /// rather than the sentence-transformer (spec §4.2 degraded mode).
    pub degraded: bool,
}

/// A source or target paragraph left unaligned, kept for diagnostic display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnalignedParagraph {
    pub paragraph_index: usize,
    pub best_similarity: f64,
    pub best_counterpart_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlignmentResult {
    pub pairs: Vec<AlignedPair>,
    pub unaligned_source: Vec<UnalignedParagraph>,
    pub unaligned_target: Vec<UnalignedParagraph>,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_thresholds() {
        assert_eq!(ConfidenceBucket::bucket(0.85, 0.5, false), ConfidenceBucket::High);
        assert_eq!(ConfidenceBucket::bucket(0.7, 0.5, false), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::bucket(0.55, 0.5, false), ConfidenceBucket::Low);
        assert_eq!(ConfidenceBucket::bucket(0.2, 0.5, false), ConfidenceBucket::VeryLow);
    }

    #[test]
    fn dot_product_of_normalized_vectors_is_cosine() {
        let a = Embedding {
            vector: vec![1.0, 0.0],
            model_version: "test".to_string(),
        };
        let b = Embedding {
            vector: vec![1.0, 0.0],
            model_version: "test".to_string(),
        };
        assert_eq!(a.dot(&b), 1.0);
    }
}
