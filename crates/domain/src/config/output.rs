use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Destination file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Drop results whose answer lists are all empty.
    #[serde(default)]
    pub skip_empty: bool,

    /// Drop results under this domain that only carry wildcard answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard_domain: Option<String>,

    /// Seconds between progress log lines, 0 disables them.
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            skip_empty: false,
            wildcard_domain: None,
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

fn default_progress_interval_secs() -> u64 {
    5
}
