//! Bounded pool of name servers.
//!
//! The pool is a channel whose buffer holds exactly one slot per server.
//! `take` waits for a free server, and a released server only re-enters the
//! buffer after its rate-limit interval has passed, so each server is used
//! at most `rate_limit` times per second.

use dnsweep_domain::{DomainError, RecordType};
use std::net::IpAddr;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace, warn};

use super::NameServer;
use crate::dns::Exchange;

pub struct ServerPool {
    home: mpsc::Sender<NameServer>,
    servers: Mutex<mpsc::Receiver<NameServer>>,
    rate_limit: f64,
}

impl ServerPool {
    /// Pool sized to `ips`, every server throttled to `rate_limit` queries
    /// per second.
    pub fn new(ips: &[IpAddr], rate_limit: f64) -> Result<Self, DomainError> {
        if ips.is_empty() {
            return Err(DomainError::NoServers);
        }
        if !rate_limit.is_finite() || rate_limit <= 0.0 {
            return Err(DomainError::ConfigError(format!(
                "Rate limit must be a positive number, got {}",
                rate_limit
            )));
        }

        let (home, servers) = mpsc::channel(ips.len());
        let pool = Self {
            home,
            servers: Mutex::new(servers),
            rate_limit,
        };

        for ip in ips {
            pool.add(NameServer::new(*ip, rate_limit))?;
        }

        debug!(servers = ips.len(), rate_limit = rate_limit, "Server pool ready");
        Ok(pool)
    }

    fn add(&self, server: NameServer) -> Result<(), DomainError> {
        self.home
            .try_send(server)
            .map_err(|_| DomainError::ConfigError("Server pool is full".to_string()))
    }

    /// Waits until a server is free and leases it. The server goes back to
    /// the pool when the lease is dropped.
    pub async fn take(&self) -> Result<Lease, DomainError> {
        let server = self
            .servers
            .lock()
            .await
            .recv()
            .await
            .ok_or(DomainError::NoServers)?;

        trace!(server = %server.ip(), "Server leased");

        Ok(Lease {
            server,
            home: self.home.clone(),
        })
    }

    /// Gives up `lease`; its server re-enters the pool once the rate-limit
    /// delay has elapsed. Dropping the lease does the same.
    pub fn release(&self, lease: Lease) {
        drop(lease);
    }

    pub fn capacity(&self) -> usize {
        self.home.max_capacity()
    }

    /// Servers currently sitting in the pool.
    pub fn available(&self) -> usize {
        self.home.max_capacity() - self.home.capacity()
    }

    pub fn rate_limit(&self) -> f64 {
        self.rate_limit
    }
}

/// Exclusive use of one server.
pub struct Lease {
    server: NameServer,
    home: mpsc::Sender<NameServer>,
}

impl Lease {
    pub fn server(&self) -> &NameServer {
        &self.server
    }

    pub async fn query<X: Exchange + ?Sized>(
        &mut self,
        exchange: &X,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        self.server.query(exchange, name, record_type).await
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        release_to(self.home.clone(), self.server.clone());
    }
}

fn release_to(home: mpsc::Sender<NameServer>, server: NameServer) {
    let delay = server.delay();

    trace!(
        server = %server.ip(),
        queries = server.queries(),
        rate = %format!("{:.2}", server.rate()),
        delay_ms = delay.as_millis() as u64,
        "Releasing server"
    );

    if delay.is_zero() {
        return_now(&home, server);
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if home.send(server).await.is_err() {
                    debug!("Server pool dropped before delayed release");
                }
            });
        }
        Err(_) => return_now(&home, server),
    }
}

fn return_now(home: &mpsc::Sender<NameServer>, server: NameServer) {
    match home.try_send(server) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("Server pool dropped before release");
        }
        Err(mpsc::error::TrySendError::Full(server)) => {
            warn!(server = %server.ip(), "Server pool over capacity, dropping server");
        }
    }
}
