//! Centralized defaults for values that are tuning knobs rather than settings
//! a user is expected to change per-deployment. Everything a deployment does
//! need to change lives in `Settings` instead (see settings.rs).

/// Preprocessor defaults (spec §4.1, §6).
pub mod preprocessor {
    pub const MAX_WORDS: usize = 2000;
}

/// Embedder defaults (spec §4.2, §6).
pub mod embedder {
    pub const BATCH_SIZE: usize = 32;
    pub const CACHE_CAPACITY: usize = 4096;
}

/// Paragraph Aligner defaults (spec §4.3, §6).
pub mod aligner {
    pub const THRESHOLD: f64 = 0.5;
    pub const TOP_K: usize = 3;
    pub const CONFIDENCE_HIGH: f64 = 0.8;
    pub const CONFIDENCE_MEDIUM: f64 = 0.65;
}

/// Strategy Classifier defaults (spec §4.5, §6).
pub mod classifier {
    pub const MIN_CONFIDENCE: f64 = 0.3;
    pub const ENABLE_OM: bool = false;
}

/// Concurrency defaults (spec §5).
pub mod concurrency {
    pub const WORKER_POOL_SIZE: usize = 4;
    pub const STAGE_TIMEOUT_MS: u64 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_fractions() {
        assert!(aligner::THRESHOLD > 0.0 && aligner::THRESHOLD < 1.0);
        assert!(classifier::MIN_CONFIDENCE >= 0.0 && classifier::MIN_CONFIDENCE <= 1.0);
    }
}
