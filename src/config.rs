//! Client configuration.
//!
//! The original deployment suffered from per-screen backend addresses; here
//! there is exactly one base URL, resolved by merge priority:
//! built-in default < `~/.tally/config.toml` < `./.tally/config.toml` < CLI.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CHAT_TIMEOUT_MS: u64 = 15_000;

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Settings for the chat assistant. The chat call is the only request with
/// a client-side timeout; everything else runs to completion or failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_timeout")]
    pub timeout_ms: u64,
}

fn default_chat_timeout() -> u64 {
    DEFAULT_CHAT_TIMEOUT_MS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_chat_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat: ChatConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default paths.
    /// Priority: project (./.tally/config.toml) > user (~/.tally/config.toml) > defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".tally").join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = Path::new(".tally").join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority for any
    /// value it sets away from the default).
    pub fn merge(&mut self, other: Config) {
        if other.base_url != default_base_url() {
            self.base_url = other.base_url;
        }
        if other.chat.timeout_ms != default_chat_timeout() {
            self.chat.timeout_ms = other.chat.timeout_ms;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.base_url.trim().is_empty() {
            errors.push(ValidationError {
                field: "base_url".to_string(),
                message: "Must not be empty".to_string(),
            });
        } else if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            errors.push(ValidationError {
                field: "base_url".to_string(),
                message: format!("Expected an http(s) URL, got '{}'", self.base_url),
            });
        }

        if self.chat.timeout_ms == 0 {
            errors.push(ValidationError {
                field: "chat.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_merge_overrides_base_url() {
        let mut config = Config::default();
        config.merge(Config {
            base_url: "https://kpi.example.com".to_string(),
            chat: ChatConfig::default(),
        });
        assert_eq!(config.base_url, "https://kpi.example.com");
        assert_eq!(config.chat.timeout_ms, DEFAULT_CHAT_TIMEOUT_MS);
    }

    #[test]
    fn test_merge_keeps_existing_on_default() {
        let mut config = Config {
            base_url: "https://kpi.example.com".to_string(),
            chat: ChatConfig { timeout_ms: 5_000 },
        };
        config.merge(Config::default());
        assert_eq!(config.base_url, "https://kpi.example.com");
        assert_eq!(config.chat.timeout_ms, 5_000);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            base_url: "kpi.example.com".to_string(),
            chat: ChatConfig::default(),
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("base_url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            base_url: default_base_url(),
            chat: ChatConfig { timeout_ms: 0 },
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("timeout_ms"));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://kpi.example.com\"\n\n[chat]\ntimeout_ms = 8000\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://kpi.example.com");
        assert_eq!(config.chat.timeout_ms, 8_000);
    }
}
