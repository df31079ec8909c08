//! Logging setup for replyflow.

use serde::{Deserialize, Serialize};

pub mod logging;
pub use logging::{init_logging, init_test_logging, LogExt};

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup record
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Log level filter (e.g., "info,replyflow_core=debug"); `RUST_LOG` wins when set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub enable_json_logging: bool,
}

fn default_service_name() -> String {
    "replyflow".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_filter: default_log_filter(),
            enable_json_logging: false,
        }
    }
}

impl MonitoringConfig {
    /// Config for `service_name` with default filter and pretty output
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    /// Use `filter` when `RUST_LOG` is unset
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Toggle JSON output
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.enable_json_logging = enabled;
        self
    }
}
