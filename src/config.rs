use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::SacmError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

impl From<ConfigError> for SacmError {
    fn from(err: ConfigError) -> Self {
        SacmError::Configuration(err.to_string())
    }
}

/// Retry behaviour for transient retrieval failures. The defaults match
/// the provider contract: five attempts, exponential backoff starting at
/// one second and capped at ten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Backoff for a given zero-based attempt index: base * 2^attempt,
    /// capped at max_delay.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        let ms = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
        }
    }
}

/// Settings for the semantic-index provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the index provider.
    pub endpoint: Option<String>,

    /// Collection (pre-built index) to query.
    pub collection: String,

    /// API key; falls back to the SACM_INDEX_API_KEY environment variable.
    pub api_key: Option<String>,

    /// Default number of chunks per query.
    pub top_k: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            collection: "knowledge_base".to_string(),
            api_key: None,
            top_k: 3,
            request_timeout_secs: 30,
        }
    }
}

/// Configuration for the SACM core. Values layer in the usual order:
/// built-in defaults, then an optional YAML file, then environment
/// variables loaded from .env at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SacmConfig {
    /// Rejections tolerated per stage before the task terminally fails.
    pub max_stage_retries: u32,

    /// Root the security audit scans when none is given explicitly.
    pub scan_root: PathBuf,

    pub index: IndexConfig,

    pub retry: RetryPolicy,
}

impl Default for SacmConfig {
    fn default() -> Self {
        Self {
            max_stage_retries: 3,
            scan_root: PathBuf::from("."),
            index: IndexConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl SacmConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: SacmConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration, preferring a file when one is given and
    /// overlaying environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                info!("Loading configuration from {}", p.display());
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables onto this configuration.
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = env::var("SACM_INDEX_ENDPOINT") {
            debug!("Using index endpoint from environment");
            self.index.endpoint = Some(endpoint);
        }
        if let Ok(collection) = env::var("SACM_INDEX_COLLECTION") {
            self.index.collection = collection;
        }
        if let Ok(key) = env::var("SACM_INDEX_API_KEY") {
            debug!("Using index API key from environment");
            self.index.api_key = Some(key);
        }
        if let Ok(retries) = env::var("SACM_MAX_STAGE_RETRIES") {
            if let Ok(parsed) = retries.parse() {
                self.max_stage_retries = parsed;
            }
        }
        if let Ok(root) = env::var("SACM_SCAN_ROOT") {
            self.scan_root = PathBuf::from(root);
        }
    }

    /// Resolve the index API key from config or environment.
    pub fn index_api_key(&self) -> Option<String> {
        self.index
            .api_key
            .clone()
            .or_else(|| env::var("SACM_INDEX_API_KEY").ok())
    }
}
