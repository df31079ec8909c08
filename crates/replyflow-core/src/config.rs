//! Configuration for the flow engine
//!
//! Defaults, optionally a YAML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::assembler::DEFAULT_STATUS;
use crate::CoreError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Status written into payloads whose settings step names none
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Count a skipped step as satisfied once the flow has moved past it
    #[serde(default = "default_count_skipped_steps")]
    pub count_skipped_steps: bool,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_count_skipped_steps() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            default_status: default_status(),
            count_skipped_steps: default_count_skipped_steps(),
            log_filter: default_log_filter(),
        }
    }
}

impl FlowConfig {
    /// Load configuration from defaults and environment variables
    pub fn load() -> Result<Self, CoreError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        info!("Loaded flow configuration");
        Ok(config)
    }

    /// Load configuration from a YAML file, then apply environment overrides
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config: FlowConfig = serde_yaml::from_str(&raw).map_err(|e| {
            CoreError::ConfigurationError(format!("{}: {}", path.display(), e))
        })?;
        config.apply_env_overrides();
        config.validate()?;
        info!(path = %path.display(), "Loaded flow configuration from file");
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(status) = env::var("REPLYFLOW_DEFAULT_STATUS") {
            self.default_status = status;
        }

        if let Ok(counted) = env::var("REPLYFLOW_COUNT_SKIPPED_STEPS") {
            match counted.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.count_skipped_steps = true,
                "false" | "0" | "no" => self.count_skipped_steps = false,
                _ => warn!("Invalid REPLYFLOW_COUNT_SKIPPED_STEPS value: {}", counted),
            }
        }

        if let Ok(filter) = env::var("REPLYFLOW_LOG_FILTER") {
            self.log_filter = filter;
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.default_status.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "default_status must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
