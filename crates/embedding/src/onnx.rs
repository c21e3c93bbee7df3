//! ONNX Runtime-backed sentence embedder: tokenize, run the model, mean-pool
//! the token embeddings over the attention mask, then L2-normalize.

use crate::error::{EmbeddingError, Result};
use ndarray::Array2;
use net_est_core::Embedding;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use tokenizers::Tokenizer;

#[derive(Debug, Clone)]
pub struct OnnxEmbedderConfig {
    pub model_version: String,
    pub max_seq_len: usize,
    pub batch_size: usize,
    pub output_name: String,
}

impl Default for OnnxEmbedderConfig {
    fn default() -> Self {
        Self {
            model_version: "paraphrase-multilingual-minilm-l12-v2".to_string(),
            max_seq_len: 256,
            batch_size: 32,
            output_name: "last_hidden_state".to_string(),
        }
    }
}

pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    config: OnnxEmbedderConfig,
}

impl OnnxEmbedder {
    pub fn load(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        config: OnnxEmbedderConfig,
    ) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;

        Ok(Self { session: Mutex::new(session), tokenizer, config })
    }

    pub fn model_version(&self) -> &str {
        &self.config.model_version
    }

    pub fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.config.batch_size) {
            let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
            embeddings.extend(self.encode_batch(&refs)?);
        }
        Ok(embeddings)
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let batch_size = texts.len();
        let max_len = self.config.max_seq_len;

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];
        let mut real_lengths = vec![0usize; batch_size];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();
            let len = ids.len().min(max_len);
            real_lengths[i] = len;
            let offset = i * max_len;
            for j in 0..len {
                input_ids[offset + j] = ids[j] as i64;
                attention_mask[offset + j] = mask[j] as i64;
                token_type_ids[offset + j] = types[j] as i64;
            }
        }

        let input_ids = Array2::from_shape_vec((batch_size, max_len), input_ids)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let attention_mask_arr = Array2::from_shape_vec((batch_size, max_len), attention_mask)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let token_type_ids = Array2::from_shape_vec((batch_size, max_len), token_type_ids)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let input_ids_tensor =
            Tensor::from_array(input_ids).map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let attention_mask_tensor = Tensor::from_array(attention_mask_arr)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let token_type_ids_tensor = Tensor::from_array(token_type_ids)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            ])
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let (shape, hidden_data) = outputs
            .get(&self.config.output_name)
            .ok_or_else(|| {
                EmbeddingError::Inference(format!("missing output tensor {}", self.config.output_name))
            })?
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let (tensor_batch, tensor_seq_len, hidden_dim) = match dims.as_slice() {
            [b, s, h] => (*b, *s, *h),
            other => return Err(EmbeddingError::Inference(format!("unexpected tensor shape {other:?}"))),
        };

        let mut result = Vec::with_capacity(batch_size);
        for i in 0..batch_size.min(tensor_batch) {
            let seq_len = real_lengths[i].min(tensor_seq_len);
            let mut pooled = vec![0.0f32; hidden_dim];
            for j in 0..seq_len {
                for k in 0..hidden_dim {
                    let idx = i * tensor_seq_len * hidden_dim + j * hidden_dim + k;
                    pooled[k] += hidden_data[idx];
                }
            }
            let denom = seq_len.max(1) as f32;
            for v in &mut pooled {
                *v /= denom;
            }
            let norm: f32 = pooled.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut pooled {
                    *v /= norm;
                }
            }
            result.push(Embedding {
                vector: pooled,
                model_version: self.config.model_version.clone(),
            });
        }

        Ok(result)
    }
}
