use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use super::error::ConfigError;
use super::state::EnvironmentScope;
use super::state::LIST_PAGE_SIZE;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub list: ListConfig,
    pub environment: EnvironmentConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list: ListConfig::default(),
            environment: EnvironmentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: LIST_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub id: String,
    pub organization: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            organization: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn scope(&self) -> EnvironmentScope {
        let scope = EnvironmentScope::new(self.id.clone());
        match &self.organization {
            Some(organization) => scope.with_organization(organization.clone()),
            None => scope,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.list.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "list.page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.environment.id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "environment.id",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
