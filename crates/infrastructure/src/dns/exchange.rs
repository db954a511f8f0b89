use async_trait::async_trait;
use dnsweep_domain::{DomainError, RecordType};
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::forwarding::{MessageBuilder, ResponseParser};
use super::transport::{server_addr, UdpTransport};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PORT: u16 = 53;

/// One question against one name server, answered with the extracted
/// record strings for `record_type`.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
    async fn exchange(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError>;
}

/// UDP query execution with an explicit timeout, port and id source.
pub struct QueryExecutor {
    timeout: Duration,
    port: u16,
    rng: Mutex<fastrand::Rng>,
}

impl QueryExecutor {
    pub fn new(timeout: Duration, port: u16) -> Self {
        Self {
            timeout,
            port,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Seeded generator for reproducible transaction ids.
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn next_id(&self) -> u16 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .u16(..)
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_PORT)
    }
}

#[async_trait]
impl Exchange for QueryExecutor {
    async fn exchange(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        let id = self.next_id();
        let request = MessageBuilder::build_query(name, record_type, id)?;

        let transport = UdpTransport::new(server_addr(server, self.port));
        let response = transport.send(&request, self.timeout).await?;

        let answers = ResponseParser::parse(&response, id, record_type)?;

        debug!(
            server = %server,
            name = %name,
            record_type = %record_type,
            answers = answers.len(),
            "DNS exchange complete"
        );

        Ok(answers)
    }
}
