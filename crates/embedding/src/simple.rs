//! Degraded-mode embedder used when no ONNX model is configured or loadable.
//!
//! Produces a deterministic hash-based vector so the rest of the pipeline
//! keeps functioning (with reduced quality and `degraded=true` flags) instead
//! of failing outright.

use crate::error::Result;
use net_est_core::Embedding;

pub const DEGRADED_MODEL_VERSION: &str = "degraded-hash-v1";
const DIM: usize = 384;

#[derive(Debug, Clone, Default)]
pub struct SimpleEmbedder;

impl SimpleEmbedder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }

    fn encode_one(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; DIM];
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize).wrapping_add(i) % DIM;
            vector[idx] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Embedding {
            vector,
            model_version: DEGRADED_MODEL_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        let embedder = SimpleEmbedder::new();
        let a = embedder.encode_one("mesmo texto");
        let b = embedder.encode_one("mesmo texto");
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn is_l2_normalized() {
        let embedder = SimpleEmbedder::new();
        let e = embedder.encode_one("qualquer texto nao vazio");
        let norm: f32 = e.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn differs_for_different_text() {
        let embedder = SimpleEmbedder::new();
        let a = embedder.encode_one("primeiro");
        let b = embedder.encode_one("segundo");
        assert_ne!(a.vector, b.vector);
    }
}
