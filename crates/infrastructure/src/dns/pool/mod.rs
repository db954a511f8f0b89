mod server;
mod server_pool;

pub use server::NameServer;
pub use server_pool::{Lease, ServerPool};
