//! Embedder: maps Portuguese text fragments to fixed-length, L2-normalized
//! vectors, with an in-process LRU cache and a degraded-mode fallback when
//! no ONNX model is configured or loadable.

mod cache;
mod error;
#[cfg(feature = "onnx")]
mod onnx;
mod simple;

pub use cache::EmbeddingCache;
pub use error::{EmbeddingError, Result};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxEmbedder, OnnxEmbedderConfig};
pub use simple::{SimpleEmbedder, DEGRADED_MODEL_VERSION};

use net_est_core::Embedding;
use tracing::{info, warn};

enum Backend {
    #[cfg(feature = "onnx")]
    Onnx(OnnxEmbedder),
    Degraded(SimpleEmbedder),
}

/// Front door used by the rest of the pipeline: wraps whichever backend is
/// active behind a cache and exposes a uniform async interface.
pub struct EmbeddingService {
    backend: Backend,
    cache: EmbeddingCache,
}

impl EmbeddingService {
    /// Attempts to load the configured ONNX model; falls back to the
    /// degraded hash-based embedder if the model or tokenizer is missing.
    #[cfg(feature = "onnx")]
    pub fn load(
        model_path: Option<&std::path::Path>,
        tokenizer_path: Option<&std::path::Path>,
        onnx_config: OnnxEmbedderConfig,
        cache_capacity: usize,
    ) -> Self {
        let backend = match (model_path, tokenizer_path) {
            (Some(m), Some(t)) => match OnnxEmbedder::load(m, t, onnx_config) {
                Ok(embedder) => {
                    info!(model_version = embedder.model_version(), "loaded onnx embedder");
                    Backend::Onnx(embedder)
                }
                Err(err) => {
                    warn!(error = %err, "failed to load onnx model, falling back to degraded embedder");
                    Backend::Degraded(SimpleEmbedder::new())
                }
            },
            _ => {
                warn!("no embedder model configured, running in degraded mode");
                Backend::Degraded(SimpleEmbedder::new())
            }
        };

        Self {
            backend,
            cache: EmbeddingCache::new(cache_capacity),
        }
    }

    /// Builds a service that always runs in degraded mode, regardless of
    /// whether the `onnx` feature is compiled in.
    pub fn degraded(cache_capacity: usize) -> Self {
        Self {
            backend: Backend::Degraded(SimpleEmbedder::new()),
            cache: EmbeddingCache::new(cache_capacity),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.backend, Backend::Degraded(_))
    }

    pub fn model_version(&self) -> &str {
        match &self.backend {
            #[cfg(feature = "onnx")]
            Backend::Onnx(e) => e.model_version(),
            Backend::Degraded(_) => DEGRADED_MODEL_VERSION,
        }
    }

    /// Encodes a batch of texts, serving cache hits directly and only
    /// running inference for misses, preserving input order.
    pub fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let model_version = self.model_version().to_string();
        let mut results: Vec<Option<Embedding>> = vec![None; texts.len()];
        let mut miss_indices = Vec::new();
        let mut miss_texts = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if let Some(cached) = self.cache.get(&model_version, text) {
                results[i] = Some(cached);
            } else {
                miss_indices.push(i);
                miss_texts.push(text.clone());
            }
        }

        if !miss_texts.is_empty() {
            let computed = match &self.backend {
                #[cfg(feature = "onnx")]
                Backend::Onnx(e) => e.encode(&miss_texts)?,
                Backend::Degraded(e) => e.encode(&miss_texts)?,
            };
            for (idx, embedding) in miss_indices.into_iter().zip(computed.into_iter()) {
                self.cache.put(&model_version, &texts[idx], embedding.clone());
                results[idx] = Some(embedding);
            }
        }

        Ok(results.into_iter().map(|r| r.expect("every index filled")).collect())
    }

    /// Encodes on a blocking worker thread so the async executor is never
    /// blocked by CPU-bound inference.
    pub async fn encode_async(self: std::sync::Arc<Self>, texts: Vec<String>) -> Result<Vec<Embedding>> {
        tokio::task::spawn_blocking(move || self.encode(&texts))
            .await
            .map_err(|e| EmbeddingError::Inference(format!("worker task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_service_is_deterministic_and_cached() {
        let service = EmbeddingService::degraded(8);
        let texts = vec!["ola mundo".to_string(), "ola mundo".to_string()];
        let result = service.encode(&texts).unwrap();
        assert_eq!(result[0].vector, result[1].vector);
        assert_eq!(service.cache.len(), 1);
        assert!(service.is_degraded());
    }
}
