//! Main settings module.

use crate::constants::{aligner, classifier, concurrency, embedder, preprocessor};
use crate::ConfigError;
use config::{Config, Environment, File};
use net_est_core::StrategyCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default = "default_max_words")]
    pub max_words: usize,

    #[serde(default)]
    pub embedder: EmbedderConfig,

    #[serde(default)]
    pub aligner: AlignerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default = "concurrency_worker_pool_size")]
    pub worker_pool_size: usize,

    #[serde(default = "concurrency_stage_timeout_ms")]
    pub stage_timeout_ms: u64,
}

fn default_max_words() -> usize {
    preprocessor::MAX_WORDS
}

fn concurrency_worker_pool_size() -> usize {
    concurrency::WORKER_POOL_SIZE
}

fn concurrency_stage_timeout_ms() -> u64 {
    concurrency::STAGE_TIMEOUT_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            max_words: default_max_words(),
            embedder: EmbedderConfig::default(),
            aligner: AlignerConfig::default(),
            classifier: ClassifierConfig::default(),
            persistence: PersistenceConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
            worker_pool_size: concurrency_worker_pool_size(),
            stage_timeout_ms: concurrency_stage_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Path to the ONNX model + tokenizer directory; absence triggers degraded mode.
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_model_id() -> String {
    "paraphrase-multilingual-minilm-l12-v2".to_string()
}
fn default_batch_size() -> usize {
    embedder::BATCH_SIZE
}
fn default_cache_capacity() -> usize {
    embedder::CACHE_CAPACITY
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            model_path: None,
            batch_size: default_batch_size(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_threshold() -> f64 {
    aligner::THRESHOLD
}
fn default_top_k() -> usize {
    aligner::TOP_K
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_k: default_top_k(),
        }
    }
}

/// Per-tag threshold/weight override, keyed by strategy tag string (e.g. "SL+").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuleWeight {
    pub threshold_override: Option<f64>,
    pub weight_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default)]
    pub enable_om: bool,
    #[serde(default)]
    pub rule_weights: HashMap<String, RuleWeight>,
}

fn default_min_confidence() -> f64 {
    classifier::MIN_CONFIDENCE
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            enable_om: classifier::ENABLE_OM,
            rule_weights: HashMap::new(),
        }
    }
}

impl ClassifierConfig {
    pub fn weight_for(&self, code: StrategyCode) -> RuleWeight {
        self.rule_weights.get(code.as_tag()).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    #[default]
    Filesystem,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: PersistenceBackend,
    #[serde(default = "default_persistence_path")]
    pub path: String,
}

fn default_persistence_path() -> String {
    "data/sessions".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            path: default_persistence_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_fraction("max_words_positive", self.max_words as f64, 1.0, f64::MAX)?;
        self.validate_fraction("aligner.threshold", self.aligner.threshold, 0.0, 1.0)?;
        self.validate_fraction("classifier.min_confidence", self.classifier.min_confidence, 0.0, 1.0)?;

        if self.aligner.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "aligner.top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.embedder.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "embedder.batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.worker_pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_pool_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.stage_timeout_ms < 50 {
            return Err(ConfigError::InvalidValue {
                field: "stage_timeout_ms".to_string(),
                message: "timeout too low (minimum 50ms)".to_string(),
            });
        }

        for (tag, weight) in &self.classifier.rule_weights {
            if StrategyCode::from_tag(tag).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: format!("classifier.rule_weights.{tag}"),
                    message: "unknown strategy tag".to_string(),
                });
            }
            if let Some(t) = weight.threshold_override {
                if !(0.0..=1.0).contains(&t) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("classifier.rule_weights.{tag}.threshold_override"),
                        message: format!("must be between 0.0 and 1.0, got {t}"),
                    });
                }
            }
        }

        Ok(())
    }

    fn validate_fraction(&self, field: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
        if !(min..=max).contains(&value) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("must be between {min} and {max}, got {value}"),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`NET_EST__` prefix, `__` separator)
/// 2. `config/{env}.toml` (if env specified)
/// 3. `config/default.toml`
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("NET_EST")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut settings = Settings::default();
        settings.aligner.threshold = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_negative_min_confidence() {
        let mut settings = Settings::default();
        settings.classifier.min_confidence = -0.1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_unknown_rule_weight_tag() {
        let mut settings = Settings::default();
        settings
            .classifier
            .rule_weights
            .insert("ZZZ".to_string(), RuleWeight::default());
        assert!(settings.validate().is_err());
    }
}
