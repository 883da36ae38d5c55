/// Engine configuration
///
/// Everything here has a default, so the config file is optional and may
/// set only the keys it cares about:
///
/// ```toml
/// [schedule]
/// base = "last_completion"
/// max_interval_days = 365
///
/// [window]
/// back_days = 3
/// forward_days = 11
/// step_days = 7
/// ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Scheduler, WindowConfig, MAX_WINDOW_SIDE_DAYS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub schedule: Scheduler,
    #[serde(default)]
    pub window: WindowConfig,
}

impl EngineConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Window sides are bounded; every day in the window is rendered
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, days) in [
            ("back_days", self.window.back_days),
            ("forward_days", self.window.forward_days),
        ] {
            if days > MAX_WINDOW_SIDE_DAYS {
                return Err(ConfigError::Invalid(format!(
                    "window.{} is {}, at most {} is allowed",
                    key, days, MAX_WINDOW_SIDE_DAYS
                )));
            }
        }
        Ok(())
    }
}
