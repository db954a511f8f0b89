//! [`NameSource`](dnsweep_domain::NameSource) implementations.
pub mod chain;
pub mod ip_range;
pub mod lines;

pub use chain::ChainSource;
pub use ip_range::{IpRange, IpRangeSource};
pub use lines::{first_line, LinesSource};
