use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Completion endpoint used by the hobby normalizer
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f64 { 0.2 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Upper bound on normalization calls in flight for one ranking
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_normalizations: usize,
    /// Exclude candidates whose hobbies fail to normalize instead of
    /// failing the whole ranking
    #[serde(default)]
    pub isolate_candidate_failures: bool,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_concurrent_normalizations: default_max_concurrent(),
            isolate_candidate_failures: false,
            max_results: None,
        }
    }
}

fn default_max_concurrent() -> usize { 4 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 { 10_000 }
fn default_cache_ttl() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with SKILLSWAP_)
    /// 4. OPENAI_API_KEY, when no API key was configured
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SKILLSWAP_LLM__MODEL -> llm.model
            .add_source(environment())
            .build()?;

        with_api_key_fallback(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        with_api_key_fallback(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SKILLSWAP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Fill `llm.api_key` from OPENAI_API_KEY when nothing else set it
fn with_api_key_fallback(settings: Config) -> Result<Config, ConfigError> {
    if settings.get_string("llm.api_key").is_ok() {
        return Ok(settings);
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("llm.api_key", key)?
            .build(),
        _ => Ok(settings),
    }
}
