//! LRU cache keyed by `(model_version, sha256(text))`.

use lru::LruCache;
use net_est_core::Embedding;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;

fn cache_key(model_version: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{model_version}:{digest}")
}

pub struct EmbeddingCache {
    inner: Mutex<LruCache<String, Embedding>>,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, model_version: &str, text: &str) -> Option<Embedding> {
        let key = cache_key(model_version, text);
        self.inner.lock().get(&key).cloned()
    }

    pub fn put(&self, model_version: &str, text: &str, embedding: Embedding) {
        let key = cache_key(model_version, text);
        self.inner.lock().put(key, embedding);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_retrieves_by_text_and_version() {
        let cache = EmbeddingCache::new(4);
        let embedding = Embedding {
            vector: vec![0.1, 0.2],
            model_version: "v1".to_string(),
        };
        cache.put("v1", "ola mundo", embedding.clone());
        assert_eq!(cache.get("v1", "ola mundo").unwrap().vector, embedding.vector);
        assert!(cache.get("v2", "ola mundo").is_none());
    }

    #[test]
    fn evicts_least_recently_used_past_capacity() {
        let cache = EmbeddingCache::new(1);
        let e1 = Embedding { vector: vec![1.0], model_version: "v1".to_string() };
        let e2 = Embedding { vector: vec![2.0], model_version: "v1".to_string() };
        cache.put("v1", "a", e1);
        cache.put("v1", "b", e2);
        assert!(cache.get("v1", "a").is_none());
        assert!(cache.get("v1", "b").is_some());
    }
}
