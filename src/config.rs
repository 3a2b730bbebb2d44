//! Configuration for postcheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (POSTCHECK_API_KEY, POSTCHECK_API_URL,
//!    POSTCHECK_MODEL, POSTCHECK_SEARCH_ENDPOINT, POSTCHECK_CONFIG)
//! 2. Config file (.postcheck/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - POSTCHECK_CONFIG, if set, names the file directly
//! - otherwise the current directory and its parents are searched for
//!   .postcheck/config.yaml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Completion endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Chat-completion endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token; usually supplied via POSTCHECK_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Primary model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Backup models, tried in order on throttling
    #[serde(default = "default_backup_models")]
    pub backup_models: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_seconds: u64,

    /// Attempts per model before falling back
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retries in seconds
    #[serde(default = "default_backoff")]
    pub backoff_seconds: u64,
}

/// Search endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Endpoint implementing the q/max_results JSON contract
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Results requested per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Qualifier appended to every query
    #[serde(default = "default_recency_qualifier")]
    pub recency_qualifier: String,
}

/// Article extraction settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Per-fetch timeout in seconds
    #[serde(default = "default_extract_timeout")]
    pub timeout_seconds: u64,

    /// Excerpt budget in characters
    #[serde(default = "default_max_excerpt_chars")]
    pub max_chars: usize,
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "llama3-8b-8192".to_string()
}
fn default_backup_models() -> Vec<String> {
    vec!["llama2-7b-4096".to_string(), "mixtral-8x7b-32768".to_string()]
}
fn default_completion_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff() -> u64 {
    2
}
fn default_search_endpoint() -> String {
    // Any endpoint implementing the q/max_results JSON contract works;
    // the default assumes a local search proxy.
    "http://127.0.0.1:8088/search".to_string()
}
fn default_max_results() -> usize {
    3
}
fn default_recency_qualifier() -> String {
    "after:2020-01-01".to_string()
}
fn default_extract_timeout() -> u64 {
    10
}
fn default_max_excerpt_chars() -> usize {
    2000
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            backup_models: default_backup_models(),
            timeout_seconds: default_completion_timeout(),
            max_retries: default_max_retries(),
            backoff_seconds: default_backoff(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            recency_qualifier: default_recency_qualifier(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_extract_timeout(),
            max_chars: default_max_excerpt_chars(),
        }
    }
}

/// Full configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

impl Config {
    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }

    /// Load configuration from file (if found) and environment
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("POSTCHECK_API_KEY") {
            self.completion.api_key = key;
        }
        if let Ok(url) = std::env::var("POSTCHECK_API_URL") {
            self.completion.api_url = url;
        }
        if let Ok(model) = std::env::var("POSTCHECK_MODEL") {
            self.completion.model = model;
        }
        if let Ok(endpoint) = std::env::var("POSTCHECK_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
    }
}

/// Find the config file: POSTCHECK_CONFIG first, then .postcheck/config.yaml
/// in the current directory or any parent.
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("POSTCHECK_CONFIG") {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Some(path);
        }
        return None;
    }

    let mut current: PathBuf = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(".postcheck").join("config.yaml");
        if candidate.exists() {
            return Some(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Read a config file from an explicit path (used by the CLI --config flag)
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config = Config::from_yaml(&content)?;
    config.apply_env();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert_eq!(config.completion.backup_models.len(), 2);
        assert_eq!(config.completion.timeout_seconds, 30);
        assert_eq!(config.completion.max_retries, 3);
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.extract.timeout_seconds, 10);
        assert_eq!(config.extract.max_chars, 2000);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
completion:
  model: custom-model
  backup_models: []
search:
  max_results: 5
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.completion.model, "custom-model");
        assert!(config.completion.backup_models.is_empty());
        assert_eq!(config.completion.timeout_seconds, 30);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.recency_qualifier, "after:2020-01-01");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(Config::from_yaml("completion: [not, a, map]").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "completion:\n  model: from-file\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.completion.model, "from-file");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.yaml")).is_err());
    }
}
