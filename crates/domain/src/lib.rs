//! dnsweep domain layer
pub mod config;
pub mod dns_job;
pub mod errors;
pub mod name_source;
pub mod names;
pub mod record_type;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, OutputConfig, ResolverConfig};
pub use dns_job::{DnsJob, DnsResult, JobState, Meta};
pub use errors::DomainError;
pub use name_source::NameSource;
pub use record_type::RecordType;
