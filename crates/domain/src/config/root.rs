use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::output::OutputConfig;
use super::resolver::ResolverConfig;

const LOCAL_CONFIG_PATH: &str = "dnsweep.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/dnsweep/config.toml";

/// Main configuration structure for dnsweep
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Name servers, concurrency and throttling
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Where results go and how progress is reported
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnsweep.toml in current directory
    /// 3. /etc/dnsweep/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(servers) = overrides.servers {
            self.resolver.servers = servers;
        }
        if let Some(workers) = overrides.workers {
            self.resolver.workers = workers;
        }
        if let Some(rate_limit) = overrides.rate_limit {
            self.resolver.rate_limit = rate_limit;
        }
        if let Some(capacity) = overrides.capacity {
            self.resolver.capacity = capacity;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.resolver.query_timeout_ms = timeout;
        }
        if let Some(types) = overrides.record_types {
            self.resolver.record_types = types;
        }
        if let Some(path) = overrides.output_path {
            self.output.path = Some(path);
        }
        if overrides.skip_empty {
            self.output.skip_empty = true;
        }
        if let Some(domain) = overrides.wildcard_domain {
            self.output.wildcard_domain = Some(domain);
        }
        if let Some(secs) = overrides.progress_interval_secs {
            self.output.progress_interval_secs = secs;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver.validate()
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub servers: Option<Vec<String>>,
    pub workers: Option<usize>,
    pub rate_limit: Option<f64>,
    pub capacity: Option<usize>,
    pub query_timeout_ms: Option<u64>,
    pub record_types: Option<Vec<String>>,
    pub output_path: Option<String>,
    pub skip_empty: bool,
    pub wildcard_domain: Option<String>,
    pub progress_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}
