//! DNS resolution on top of the generic job queue.
//!
//! [`DnsProcessor`] resolves one record type of a [`DnsJob`] per step
//! through a leased server; [`DnsResolver`] wires it into a [`JobQueue`]
//! and exposes the producer side.

use async_trait::async_trait;
use dnsweep_domain::{
    DnsJob, DnsResult, DomainError, JobState, Meta, RecordType, ResolverConfig,
};
use dnsweep_jobs::{JobHandle, JobQueue, Processor, QueueError, QueueStats, StatsSource, Step};
use std::net::IpAddr;
use thiserror::Error;
use tracing::{debug, info};

use super::exchange::{Exchange, QueryExecutor};
use super::pool::ServerPool;

/// An error-stream event, naming the job and the step it came from.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{name} ({}): {error}", step_label(.record_type))]
pub struct ResolveFailure {
    pub name: String,
    pub record_type: Option<RecordType>,
    pub error: DomainError,
}

fn step_label(record_type: &Option<RecordType>) -> &'static str {
    record_type.map_or("-", |rt| rt.as_str())
}

pub struct DnsProcessor<X: Exchange> {
    pool: ServerPool,
    exchange: X,
}

impl<X: Exchange> DnsProcessor<X> {
    pub fn new(pool: ServerPool, exchange: X) -> Self {
        Self { pool, exchange }
    }

    pub fn pool(&self) -> &ServerPool {
        &self.pool
    }

    pub fn exchange(&self) -> &X {
        &self.exchange
    }
}

#[async_trait]
impl<X: Exchange> Processor for DnsProcessor<X> {
    type Job = DnsJob;
    type Output = DnsResult;
    type Error = ResolveFailure;

    async fn process(&self, mut job: DnsJob) -> Step<DnsJob, DnsResult, ResolveFailure> {
        let record_type = match job.state() {
            JobState::Pending(rt) => rt,
            JobState::Complete => {
                return Step::Failed(ResolveFailure {
                    name: job.name().to_string(),
                    record_type: None,
                    error: DomainError::InvalidJob("no record types left to resolve".to_string()),
                });
            }
        };

        let mut lease = match self.pool.take().await {
            Ok(lease) => lease,
            Err(error) => {
                return Step::Failed(ResolveFailure {
                    name: job.name().to_string(),
                    record_type: Some(record_type),
                    error,
                });
            }
        };

        let outcome = lease.query(&self.exchange, job.name(), record_type).await;
        let server = lease.server().ip();
        drop(lease);

        match outcome {
            Ok(answers) => match job.record_answer(answers) {
                JobState::Pending(_) => Step::More(job),
                JobState::Complete => Step::Done(job.into_result()),
            },
            Err(error) => {
                debug!(
                    name = %job.name(),
                    record_type = %record_type,
                    server = %server,
                    error = %error,
                    "Query failed"
                );

                let failure = ResolveFailure {
                    name: job.name().to_string(),
                    record_type: Some(record_type),
                    error,
                };

                if failure.error.is_transient() {
                    Step::Retry {
                        job,
                        error: failure,
                    }
                } else {
                    Step::Failed(failure)
                }
            }
        }
    }
}

/// Rate-limited concurrent resolver for multi-type jobs.
pub struct DnsResolver<X: Exchange = QueryExecutor> {
    queue: JobQueue<DnsProcessor<X>>,
}

impl DnsResolver<QueryExecutor> {
    /// UDP resolver on port 53 with a 3 second query timeout.
    pub fn new(
        servers: &[IpAddr],
        workers: usize,
        rate_limit: f64,
        capacity: usize,
    ) -> Result<Self, DomainError> {
        Self::with_exchange(
            QueryExecutor::default(),
            servers,
            workers,
            rate_limit,
            capacity,
        )
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self, DomainError> {
        let servers = config
            .server_addrs()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let executor = QueryExecutor::new(config.query_timeout(), config.port);

        Self::with_exchange(
            executor,
            &servers,
            config.workers,
            config.rate_limit,
            config.capacity,
        )
    }
}

impl<X: Exchange> DnsResolver<X> {
    pub fn with_exchange(
        exchange: X,
        servers: &[IpAddr],
        workers: usize,
        rate_limit: f64,
        capacity: usize,
    ) -> Result<Self, DomainError> {
        let pool = ServerPool::new(servers, rate_limit)?;
        let queue = JobQueue::new(DnsProcessor::new(pool, exchange), workers, capacity)
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;

        info!(
            servers = servers.len(),
            workers = workers,
            rate_limit = rate_limit,
            capacity = capacity,
            "DNS resolver created"
        );

        Ok(Self { queue })
    }

    pub fn processor(&self) -> &DnsProcessor<X> {
        self.queue.processor()
    }

    pub fn add(&self, n: u64) {
        self.queue.add(n);
    }

    /// Enqueue `name` for every type in `qtypes`; `meta` comes back with
    /// the result.
    pub async fn schedule(
        &self,
        name: impl Into<String>,
        qtypes: Vec<RecordType>,
        meta: Meta,
    ) -> Result<(), QueueError> {
        self.queue.schedule(DnsJob::new(name, qtypes, meta)).await
    }

    pub async fn schedule_with_handle(
        &self,
        name: impl Into<String>,
        qtypes: Vec<RecordType>,
        meta: Meta,
    ) -> Result<JobHandle<DnsResult>, QueueError> {
        self.queue
            .schedule_with_handle(DnsJob::new(name, qtypes, meta))
            .await
    }

    pub fn start(&self) -> Result<(), QueueError> {
        self.queue.start()
    }

    pub fn stop(&self) {
        self.queue.stop();
    }

    pub async fn next(&self) -> Option<DnsResult> {
        self.queue.next().await
    }

    pub async fn next_error(&self) -> Option<ResolveFailure> {
        self.queue.next_error().await
    }

    pub async fn wait_workers(&self) {
        self.queue.wait_workers().await;
    }

    pub async fn wait_jobs(&self) {
        self.queue.wait_jobs().await;
    }

    pub fn added(&self) -> u64 {
        self.queue.added()
    }

    pub fn processed(&self) -> u64 {
        self.queue.processed()
    }

    pub fn progress(&self) -> f64 {
        self.queue.progress()
    }

    pub fn speed(&self) -> f64 {
        self.queue.speed()
    }
}

impl<X: Exchange> StatsSource for DnsResolver<X> {
    fn stats(&self) -> QueueStats {
        self.queue.stats()
    }
}
