use serde::{Deserialize, Serialize};

/// Configuration for the usage_tracker module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageTrackerConfig {
    /// Directory holding `users.json` and `activity.json`; relative paths are under `server.home_dir`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_activity_retention")]
    pub activity_retention: usize,
    #[serde(default = "default_version")]
    pub default_version: String,
}

impl Default for UsageTrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            activity_retention: default_activity_retention(),
            default_version: default_version(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_activity_retention() -> usize {
    1000
}

fn default_version() -> String {
    "1.0.0".to_string()
}
