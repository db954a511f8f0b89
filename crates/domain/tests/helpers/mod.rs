pub mod builders;

pub use builders::DnsJobBuilder;
