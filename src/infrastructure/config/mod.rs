//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;
use crate::infrastructure::adapters::telegram::DEFAULT_API_BASE;

pub const ENV_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_API_URL: &str = "TELEGRAM_API_URL";
pub const ENV_LOG_FILE: &str = "LOG_FILE";
pub const ENV_SHUTDOWN_TIMEOUT: &str = "SHUTDOWN_TIMEOUT_SECS";

pub const DEFAULT_PORT: u16 = 8000;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
    pub supervisor: SupervisorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub token: Option<String>,
    pub api_url: String,
    pub prefix: String,
    pub poll_timeout_secs: u64,
    pub retry_delay_secs: u64,
    pub drop_pending_updates: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HealthConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SupervisorConfig {
    pub shutdown_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "beartech-bot".to_string(),
            token: None,
            api_url: DEFAULT_API_BASE.to_string(),
            prefix: "/".to_string(),
            poll_timeout_secs: 30,
            retry_delay_secs: 5,
            drop_pending_updates: true,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("beartech_bot.log")),
            level: "info".to_string(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 10,
        }
    }
}

impl SupervisorConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TOKEN) {
            self.bot.token = Some(token);
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.health.port = parse_value(ENV_PORT, &port)?;
        }

        if let Some(url) = lookup(ENV_API_URL) {
            self.bot.api_url = url;
        }

        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.logging.file = if file.is_empty() { None } else { Some(PathBuf::from(file)) };
        }

        if let Some(secs) = lookup(ENV_SHUTDOWN_TIMEOUT) {
            self.supervisor.shutdown_timeout_secs = parse_value(ENV_SHUTDOWN_TIMEOUT, &secs)?;
        }

        Ok(self)
    }

    /// Required keys that are unset or empty
    pub fn missing_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.bot.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            missing.push(ENV_TOKEN.to_string());
        }
        missing
    }

    /// The bot token, or every missing required key
    pub fn validate(&self) -> Result<String, ConfigError> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }
        Ok(self.bot.token.clone().unwrap_or_default())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_reported() {
        let config = Config::default().with_env(env(&[("PORT", "9001")])).unwrap();

        assert_eq!(config.missing_keys(), vec!["TELEGRAM_BOT_TOKEN".to_string()]);
        match config.validate() {
            Err(ConfigError::MissingKeys(keys)) => assert_eq!(keys, vec!["TELEGRAM_BOT_TOKEN"]),
            other => panic!("expected missing keys, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let config = Config::default().with_env(env(&[("TELEGRAM_BOT_TOKEN", "  ")])).unwrap();
        assert_eq!(config.missing_keys(), vec!["TELEGRAM_BOT_TOKEN".to_string()]);
    }

    #[test]
    fn test_port_defaults_to_8000() {
        let config = Config::default().with_env(env(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap();

        assert_eq!(config.health.port, 8000);
        assert_eq!(config.validate().unwrap(), "t");
    }

    #[test]
    fn test_port_from_env() {
        let config = Config::default()
            .with_env(env(&[("TELEGRAM_BOT_TOKEN", "t"), ("PORT", "9001")]))
            .unwrap();
        assert_eq!(config.health.port, 9001);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::default().with_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_load_yaml_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "bot:\n  token: from-file\n  poll-timeout-secs: 10\nhealth:\n  port: 8080\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.bot.token.as_deref(), Some("from-file"));
        assert_eq!(config.bot.poll_timeout_secs, 10);
        assert!(config.bot.drop_pending_updates);
        assert_eq!(config.health.port, 8080);
        assert_eq!(config.supervisor.shutdown_timeout_secs, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.bot.token = Some("from-file".to_string());

        let config = config
            .with_env(env(&[("TELEGRAM_BOT_TOKEN", "from-env"), ("LOG_FILE", "")]))
            .unwrap();

        assert_eq!(config.bot.token.as_deref(), Some("from-env"));
        assert!(config.logging.file.is_none());
    }
}
