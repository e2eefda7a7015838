use bulkstep_api::core::utils::logging::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, PartialEq, Clone, Serialize)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl LoggingConfig {
    pub fn get_log_env(&self) -> EnvFilter {
        bulkstep_api::core::utils::logging::get_log_env(self.log_level.clone())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
