//! Configuration for dnsweep
//!
//! - `root`: main configuration, file lookup and CLI overrides
//! - `resolver`: name servers, workers, rate limit, record types
//! - `output`: result sink and progress reporting
//! - `logging`: log level
//! - `errors`: configuration errors

pub mod errors;
pub mod logging;
pub mod output;
pub mod resolver;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use output::OutputConfig;
pub use resolver::ResolverConfig;
pub use root::{CliOverrides, Config};
