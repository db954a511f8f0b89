pub mod exchange;
pub mod forwarding;
pub mod pool;
pub mod resolver;
pub mod reverse_name;
pub mod transport;
pub mod wildcard;

pub use exchange::{Exchange, QueryExecutor};
pub use pool::{Lease, NameServer, ServerPool};
pub use resolver::{DnsProcessor, DnsResolver, ResolveFailure};
pub use reverse_name::ip_to_reverse_domain;
pub use wildcard::WildcardDetector;
