use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const ENV_CONFIG_PATH: &str = "DRAFTER_CONFIG_PATH";
const ENV_ENGINE_URL: &str = "ENGINE_URL";
const ENV_ENGINE_TIMEOUT_SECS: &str = "ENGINE_TIMEOUT_SECS";
const DEFAULT_CONFIG_PATH: &str = "drafter.yaml";
const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8080";

/// Connection settings for the local generation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Controls the generate-validate-retry loop shared by every section.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Generation rounds before the controller gives up on a section.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Added to the section's base temperature on each retry.
    #[serde(default = "default_temperature_step")]
    pub temperature_step: f32,
    #[serde(default = "default_max_temperature")]
    pub max_temperature: f32,
    /// An attempt is accepted early when valid with at most this many warnings.
    #[serde(default = "default_warning_limit")]
    pub accept_warning_limit: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            temperature_step: default_temperature_step(),
            max_temperature: default_max_temperature(),
            accept_warning_limit: default_warning_limit(),
        }
    }
}

/// Prior-art corpus and CPC label locations. Both are optional; drafting
/// works without them, claims just lose their retrieval grounding.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub prior_art_path: Option<PathBuf>,
    #[serde(default)]
    pub cpc_labels_path: Option<PathBuf>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            prior_art_path: None,
            cpc_labels_path: None,
            top_k: default_top_k(),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub retry: RetryConfig,
    pub index: IndexConfig,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let mut engine = file.engine;
        if let Ok(url) = std::env::var(ENV_ENGINE_URL) {
            engine.url = url;
        }
        if let Ok(timeout) = std::env::var(ENV_ENGINE_TIMEOUT_SECS)
            && let Ok(secs) = timeout.parse()
        {
            engine.timeout_secs = secs;
        }

        Self {
            engine,
            retry: file.retry,
            index: file.index,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Handle empty file
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn engine_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.engine.url)
    }
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_temperature_step() -> f32 {
    0.1
}

fn default_max_temperature() -> f32 {
    1.0
}

fn default_warning_limit() -> usize {
    1
}

fn default_top_k() -> usize {
    3
}
