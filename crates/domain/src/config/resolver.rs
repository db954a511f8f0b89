use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use super::errors::ConfigError;
use crate::RecordType;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Name server IP literals, one pooled server each.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Queries per second allowed through each server.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,

    /// Bound of the job queue's input and output channels.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_record_types")]
    pub record_types: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            port: default_port(),
            workers: default_workers(),
            rate_limit: default_rate_limit(),
            capacity: default_capacity(),
            query_timeout_ms: default_query_timeout_ms(),
            record_types: default_record_types(),
        }
    }
}

impl ResolverConfig {
    pub fn server_addrs(&self) -> Result<Vec<IpAddr>, ConfigError> {
        self.servers
            .iter()
            .map(|s| {
                s.trim().parse::<IpAddr>().map_err(|_| {
                    ConfigError::Validation(format!("Invalid name server address '{}'", s))
                })
            })
            .collect()
    }

    pub fn parsed_record_types(&self) -> Result<Vec<RecordType>, ConfigError> {
        let types = RecordType::parse_list(&self.record_types.join(","))
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        if types.is_empty() {
            return Err(ConfigError::Validation(
                "At least one record type is required".to_string(),
            ));
        }
        Ok(types)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Validation(
                "No name servers configured".to_string(),
            ));
        }
        self.server_addrs()?;

        if self.workers == 0 {
            return Err(ConfigError::Validation(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(ConfigError::Validation(
                "Queue capacity must be at least 1".to_string(),
            ));
        }
        if !self.rate_limit.is_finite() || self.rate_limit <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "Rate limit must be a positive number, got {}",
                self.rate_limit
            )));
        }
        if self.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout cannot be 0".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        self.parsed_record_types()?;

        Ok(())
    }
}

fn default_servers() -> Vec<String> {
    vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()]
}

fn default_port() -> u16 {
    53
}

fn default_workers() -> usize {
    10
}

fn default_rate_limit() -> f64 {
    10.0
}

fn default_capacity() -> usize {
    100
}

fn default_query_timeout_ms() -> u64 {
    3000
}

fn default_record_types() -> Vec<String> {
    vec!["A".to_string()]
}
