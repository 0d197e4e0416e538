//! Configuration management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bot configuration, loaded from a JSON file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub homeserver: String,
    pub access_token: String,
    pub owner: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn new(
        homeserver: impl Into<String>,
        access_token: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            homeserver: homeserver.into(),
            access_token: access_token.into(),
            owner: owner.into(),
            log_level: default_log_level(),
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.homeserver.is_empty() {
            return Err(ConfigError::MissingField("homeserver".to_string()));
        }
        if self.access_token.is_empty() {
            return Err(ConfigError::MissingField("accessToken".to_string()));
        }
        if self.owner.is_empty() {
            return Err(ConfigError::MissingField("owner".to_string()));
        }
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "logLevel must be one of {:?}, got '{}'",
                VALID_LOG_LEVELS, self.log_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(owner: &str) -> Self {
        Self::new("https://example.org", "syt_secret", owner)
    }
}
