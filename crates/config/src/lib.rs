//! Configuration management for NET-EST.
//!
//! Supports loading from `config/default.toml`, an optional `config/{env}.toml`,
//! and `NET_EST__`-prefixed environment variables (highest priority).

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, AlignerConfig, ClassifierConfig, EmbedderConfig, ObservabilityConfig,
    PersistenceBackend, PersistenceConfig, RuleWeight, RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for net_est_core::Error {
    fn from(err: ConfigError) -> Self {
        net_est_core::Error::Internal(err.to_string())
    }
}
