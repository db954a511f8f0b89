//! Network and file adapters: the rate-limited server pool, UDP query
//! execution, the DNS resolver processor, name sources and result writers.
pub mod dns;
pub mod input;
pub mod output;
