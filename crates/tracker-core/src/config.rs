use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::TrackerError;
use crate::ledger::{DEFAULT_GOAL_HOURS, MAX_GOAL_HOURS};

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub goal: GoalConfig,
    pub server: ServerConfig,
    pub system_prompt: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            goal: GoalConfig::default(),
            server: ServerConfig::default(),
            system_prompt: Some("You are a helpful assistant.".into()),
        }
    }
}

impl AppConfig {
    /// Load configuration from default path (~/.config/vision-tracker/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Write current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vision-tracker")
            .join("config.toml")
    }

    /// Data directory for REPL history.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vision-tracker")
    }

    /// Reject values the ledger and summarizer cannot work with.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.goal.hours.is_finite()
            || self.goal.hours <= 0.0
            || self.goal.hours > MAX_GOAL_HOURS
        {
            return Err(TrackerError::InvalidConfig(format!(
                "goal.hours must be within (0, {}], got {}",
                MAX_GOAL_HOURS, self.goal.hours
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(TrackerError::InvalidConfig(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.provider.model.trim().is_empty() {
            return Err(TrackerError::InvalidConfig("provider.model is empty".into()));
        }
        Ok(())
    }
}

/// Text-generation provider configuration (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL for the OpenAI-compatible API.
    pub api_base: String,
    /// Model name.
    pub model: String,
    /// Optional API key. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on a single summary request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".into()),
            max_tokens: 250,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key from config, then from the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_ref()
                .and_then(|env_var| std::env::var(env_var).ok())
                .filter(|key| !key.trim().is_empty())
        })
    }
}

/// Daily goal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Total score that counts as a full day.
    pub hours: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            hours: DEFAULT_GOAL_HOURS,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Bearer token for authentication (None = no auth).
    pub auth_token: Option<String>,
    /// Enable CORS.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            auth_token: None,
            cors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("hours = 10.0"));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.goal.hours = 8.0;
        config.provider.max_tokens = 400;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.goal.hours, 8.0);
        assert_eq!(loaded.provider.max_tokens, 400);
        assert_eq!(loaded.provider.model, config.provider.model);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str("[goal]\nhours = 6.0\n").unwrap();
        assert_eq!(config.goal.hours, 6.0);
        assert_eq!(config.provider.max_tokens, 250);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_goal() {
        let mut config = AppConfig::default();
        config.goal.hours = 0.0;
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));

        config.goal.hours = -3.0;
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_goal() {
        let mut config = AppConfig::default();
        config.goal.hours = 1e19;
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));

        config.goal.hours = MAX_GOAL_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_temperature() {
        let mut config = AppConfig::default();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let provider = ProviderConfig {
            api_key: Some("sk-config".into()),
            api_key_env: Some("VISION_TRACKER_TEST_UNSET_KEY".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(provider.resolve_api_key().as_deref(), Some("sk-config"));
    }

    #[test]
    fn test_missing_env_key_resolves_to_none() {
        let provider = ProviderConfig {
            api_key: None,
            api_key_env: Some("VISION_TRACKER_TEST_DEFINITELY_UNSET".into()),
            ..ProviderConfig::default()
        };
        assert!(provider.resolve_api_key().is_none());
    }
}
