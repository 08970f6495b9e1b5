//! Lookup configuration.
//!
//! Configuration can be loaded from:
//! - A TOML file (path from `NUN_CONFIG`, or given explicitly), with `${VAR}`
//!   environment substitution
//! - Environment variables (`NUN_*` prefixed, plus `OPENAI_API_KEY`)
//!
//! # Example
//!
//! ```toml
//! [backend]
//! base_url = "https://api.openai.com/v1"
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o"
//!
//! [routing.classification]
//! model = "gpt-4o-mini"
//! temperature = 0.0
//!
//! [routing.ranking]
//! temperature = 0.3
//! max_tokens = 1500
//!
//! [cache]
//! capacity = 256
//! ttl_seconds = 3600
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use nun_core::defaults;
use nun_core::InferenceOperation;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for nun_core::Error {
    fn from(e: ConfigError) -> Self {
        nun_core::Error::Config(e.to_string())
    }
}

/// Default chat-completions endpoint.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = defaults::TIMEOUT_SECS;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used when a request carries no override.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Skip TLS verification (for self-signed certs in local environments).
    pub skip_tls_verify: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            skip_tls_verify: false,
        }
    }
}

/// Per-stage model tier and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSettings {
    /// Model override for this stage; backend default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl OperationSettings {
    /// Defaults for the region classification stage.
    pub fn classification() -> Self {
        Self {
            model: None,
            temperature: defaults::CLASSIFICATION_TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
        }
    }

    /// Defaults for the code ranking stage.
    pub fn ranking() -> Self {
        Self {
            model: None,
            temperature: defaults::RANKING_TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
        }
    }

    fn validate(&self, operation: InferenceOperation) -> ConfigResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "{} temperature must be within 0.0..=2.0, got {}",
                operation, self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Validation(format!(
                "{} max_tokens must be greater than zero",
                operation
            )));
        }

        if matches!(self.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} model cannot be empty",
                operation
            )));
        }

        Ok(())
    }
}

/// Stage-specific settings. Which tier handles which stage is a tuning knob.
///
/// Each `[routing.<stage>]` table may set any subset of its keys; the rest
/// keep that stage's own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RoutingTables")]
pub struct RoutingConfig {
    pub classification: OperationSettings,
    pub ranking: OperationSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RoutingTables {
    #[serde(default)]
    classification: SettingsTable,
    #[serde(default)]
    ranking: SettingsTable,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsTable {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl SettingsTable {
    fn over(self, base: OperationSettings) -> OperationSettings {
        OperationSettings {
            model: self.model.or(base.model),
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
        }
    }
}

impl From<RoutingTables> for RoutingConfig {
    fn from(tables: RoutingTables) -> Self {
        Self {
            classification: tables
                .classification
                .over(OperationSettings::classification()),
            ranking: tables.ranking.over(OperationSettings::ranking()),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            classification: OperationSettings::classification(),
            ranking: OperationSettings::ranking(),
        }
    }
}

impl RoutingConfig {
    /// Get the settings for a specific operation.
    pub fn settings(&self, operation: InferenceOperation) -> &OperationSettings {
        match operation {
            InferenceOperation::Classification => &self.classification,
            InferenceOperation::Ranking => &self.ranking,
        }
    }
}

/// Memo cache bounds.
///
/// Eviction is least-recently-used beyond `capacity`; entries older than
/// `ttl_seconds` (when set) are treated as misses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::CACHE_CAPACITY,
            ttl_seconds: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }
}

/// Main lookup configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub backend: OpenAIConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl LookupConfig {
    /// Load from `path`, else from `$NUN_CONFIG`, else from environment variables.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| env::var("NUN_CONFIG").ok().map(PathBuf::from));

        match path {
            Some(path) => {
                info!("Loading lookup config from: {}", path.display());
                Self::from_file(&path)
            }
            None => {
                debug!("No config file given, using environment variables");
                let config = Self::from_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML after substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let backend = OpenAIConfig {
            base_url: env::var("NUN_BASE_URL")
                .or_else(|_| env::var("OPENAI_BASE_URL"))
                .unwrap_or_else(|_| defaults::OPENAI_URL.to_string()),
            api_key: env::var("NUN_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok(),
            model: env::var("NUN_MODEL").unwrap_or_else(|_| defaults::GEN_MODEL.to_string()),
            timeout_seconds: env::var("NUN_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::TIMEOUT_SECS),
            skip_tls_verify: env::var("NUN_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
        };

        let routing = RoutingConfig {
            classification: OperationSettings {
                model: env::var("NUN_CLASSIFICATION_MODEL").ok(),
                ..OperationSettings::classification()
            },
            ranking: OperationSettings {
                model: env::var("NUN_RANKING_MODEL").ok(),
                ..OperationSettings::ranking()
            },
        };

        let cache = CacheConfig {
            capacity: env::var("NUN_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::CACHE_CAPACITY),
            ttl_seconds: env::var("NUN_CACHE_TTL").ok().and_then(|s| s.parse().ok()),
        };

        Self {
            backend,
            routing,
            cache,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = &self.backend.base_url;
        if base_url.is_empty() {
            return Err(ConfigError::Validation(
                "backend base_url cannot be empty".to_string(),
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "backend base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend model cannot be empty".to_string(),
            ));
        }

        self.routing
            .classification
            .validate(InferenceOperation::Classification)?;
        self.routing.ranking.validate(InferenceOperation::Ranking)?;

        if self.cache.capacity == 0 {
            return Err(ConfigError::Validation(
                "cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    ///
    /// Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex is valid");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}
