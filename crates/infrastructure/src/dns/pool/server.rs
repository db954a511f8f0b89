use dnsweep_domain::{DomainError, RecordType};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::dns::Exchange;

/// A pooled name server and its usage history. Only the worker holding
/// the lease touches it.
#[derive(Debug, Clone)]
pub struct NameServer {
    ip: IpAddr,
    queries: u64,
    rate_limit: f64,
    created_at: Instant,
    last_used_at: Option<Instant>,
}

impl NameServer {
    pub(crate) fn new(ip: IpAddr, rate_limit: f64) -> Self {
        Self {
            ip,
            queries: 0,
            rate_limit,
            created_at: Instant::now(),
            last_used_at: None,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn queries(&self) -> u64 {
        self.queries
    }

    pub fn last_used_at(&self) -> Option<Instant> {
        self.last_used_at
    }

    /// Issue one exchange through this server. Failures count as a use too.
    pub async fn query<X: Exchange + ?Sized>(
        &mut self,
        exchange: &X,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        let result = exchange.exchange(self.ip, name, record_type).await;
        self.queries += 1;
        self.last_used_at = Some(Instant::now());
        result
    }

    /// Average queries per second since the server joined the pool.
    /// Diagnostic only; throttling goes by [`delay`](Self::delay).
    pub fn rate(&self) -> f64 {
        let elapsed = self.created_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.queries as f64 / elapsed
    }

    /// Time left before this server may be used again: one `1 / rate_limit`
    /// interval after its last use. Zero for a server never used.
    pub fn delay(&self) -> Duration {
        match self.last_used_at {
            Some(last_used_at) => {
                Duration::from_secs_f64(1.0 / self.rate_limit).saturating_sub(last_used_at.elapsed())
            }
            None => Duration::ZERO,
        }
    }
}
