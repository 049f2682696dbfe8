//! Weekend Wanderer configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "weekendwanderer";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Prompt template configuration
    pub prompts: PromptsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .weekendwanderer.yml
        let local_config = PathBuf::from(".weekendwanderer.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/weekendwanderer/weekendwanderer.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging exists.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".weekendwanderer.yml")];
                paths.extend(user_config_path());
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(format!("{}.yml", APP_DIR)))
}

/// Expand a leading `~/` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    ///
    /// An empty value counts as missing.
    pub fn api_key(&self) -> Option<String> {
        debug!(env_var = %self.api_key_env, "LlmConfig::api_key: called");
        std::env::var(&self.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the saved trips
    #[serde(rename = "trips-file")]
    pub trips_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/weekendwanderer on Linux)
        let trips_file = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".weekendwanderer"))
            .join("trips.json");

        Self { trips_file }
    }
}

impl StorageConfig {
    /// Trips file with `~/` expanded
    pub fn trips_path(&self) -> PathBuf {
        expand_tilde(&self.trips_file)
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.pmt` overrides before the embedded templates
    #[serde(rename = "override-dir")]
    pub override_dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        let override_dir = dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("prompts"))
            .unwrap_or_else(|| PathBuf::from(".weekendwanderer/prompts"));

        Self { override_dir }
    }
}

impl PromptsConfig {
    /// Override directory with `~/` expanded
    pub fn override_path(&self) -> PathBuf {
        expand_tilde(&self.override_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.storage.trips_file.ends_with("trips.json"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: gemini
  model: gemini-2.5-pro
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  temperature: 0.3
  max-tokens: 4096
  timeout-ms: 60000
storage:
  trips-file: /tmp/trips.json
prompts:
  override-dir: /tmp/prompts
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.timeout_ms, 60000);
        assert_eq!(config.storage.trips_file, PathBuf::from("/tmp/trips.json"));
        assert_eq!(config.prompts.override_dir, PathBuf::from("/tmp/prompts"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.0-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "gemini-2.0-flash");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.llm.max_tokens, 8192);
    }

    #[test]
    fn test_load_explicit_path_and_log_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ww.yml");
        fs::write(&path, "log-level: warn\nstorage:\n  trips-file: /tmp/x.json\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage.trips_file, PathBuf::from("/tmp/x.json"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let plain = PathBuf::from("/var/data/trips.json");
        assert_eq!(expand_tilde(&plain), plain);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/trips.json")), home.join("trips.json"));
        }
    }

    #[test]
    #[serial]
    fn test_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "WW_TEST_API_KEY".to_string(),
            ..LlmConfig::default()
        };

        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::remove_var("WW_TEST_API_KEY") };
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var("WW_TEST_API_KEY", "   ") };
        assert!(config.api_key().is_none());

        unsafe { std::env::set_var("WW_TEST_API_KEY", "secret") };
        assert_eq!(config.api_key().as_deref(), Some("secret"));

        unsafe { std::env::remove_var("WW_TEST_API_KEY") };
    }
}
