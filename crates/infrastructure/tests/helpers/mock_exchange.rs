use async_trait::async_trait;
use dnsweep_domain::{DomainError, RecordType};
use dnsweep_infrastructure::dns::Exchange;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory exchange: answers `<name>/<type>` unless told otherwise,
/// failing selected questions a set number of times first.
#[derive(Default)]
pub struct MockExchange {
    transient_failures: Mutex<HashMap<(String, RecordType), usize>>,
    permanent_failures: Vec<String>,
    empty: Vec<RecordType>,
    records: HashMap<String, String>,
    wildcards: Vec<(String, String)>,
    latency: Option<Duration>,
    calls: Mutex<Vec<(String, RecordType, IpAddr, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, name: &str, record_type: RecordType, times: usize) -> Self {
        self.transient_failures
            .lock()
            .unwrap()
            .insert((name.to_string(), record_type), times);
        self
    }

    pub fn rejecting(mut self, name: &str) -> Self {
        self.permanent_failures.push(name.to_string());
        self
    }

    pub fn empty_for(mut self, record_type: RecordType) -> Self {
        self.empty.push(record_type);
        self
    }

    /// `name` answers `answer` for every type.
    pub fn with_record(mut self, name: &str, answer: &str) -> Self {
        self.records.insert(name.to_string(), answer.to_string());
        self
    }

    /// Every name below `zone` without its own record answers `answer`.
    pub fn with_wildcard(mut self, zone: &str, answer: &str) -> Self {
        self.wildcards.push((format!(".{}", zone), answer.to_string()));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<(String, RecordType, IpAddr, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, ..)| n == name)
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn answer_for(name: &str, record_type: RecordType) -> String {
        format!("{}/{}", name, record_type)
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn exchange(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), record_type, server, Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.permanent_failures.iter().any(|n| n == name) {
            return Err(DomainError::InvalidDomainName(name.to_string()));
        }

        {
            let mut failures = self.transient_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&(name.to_string(), record_type)) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DomainError::TransportTimeout {
                        server: server.to_string(),
                    });
                }
            }
        }

        if let Some(answer) = self.records.get(name) {
            return Ok(vec![answer.clone()]);
        }
        if let Some((_, answer)) = self.wildcards.iter().find(|(zone, _)| name.ends_with(zone)) {
            return Ok(vec![answer.clone()]);
        }

        if self.empty.contains(&record_type) {
            return Ok(Vec::new());
        }

        Ok(vec![Self::answer_for(name, record_type)])
    }
}
