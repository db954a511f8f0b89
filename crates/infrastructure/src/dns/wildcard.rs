//! Wildcard detection below a base domain.
//!
//! A zone answers as a wildcard when a random label under it resolves.
//! A result is a wildcard hit when every answer it carries is also what
//! such a random name resolves to in one of its parent zones, down to and
//! including the base.

use dnsweep_domain::names::{random_label, subdomains};
use dnsweep_domain::{DnsResult, DomainError, RecordType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::exchange::Exchange;
use super::pool::ServerPool;

const PROBE_LABEL_LEN: usize = 16;

pub struct WildcardDetector {
    base: String,
    rng: fastrand::Rng,
    /// Answers a random name got per zone and type; empty means no wildcard.
    probed: HashMap<(String, RecordType), HashSet<String>>,
}

impl WildcardDetector {
    pub fn new(base: &str, rng: fastrand::Rng) -> Self {
        Self {
            base: normalize(base),
            rng,
            probed: HashMap::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Probes each parent zone of `result.name` at most once per record
    /// type, leasing servers from `pool` like any other query.
    pub async fn is_wildcard<X: Exchange + ?Sized>(
        &mut self,
        pool: &ServerPool,
        exchange: &X,
        result: &DnsResult,
    ) -> Result<bool, DomainError> {
        if result.is_empty() {
            return Ok(false);
        }

        for zone in parent_zones(&normalize(&result.name), &self.base) {
            let mut covered = true;

            for (record_type, values) in &result.answers {
                if values.is_empty() {
                    continue;
                }
                let wildcard = self.probe(pool, exchange, &zone, *record_type).await?;
                if wildcard.is_empty() || !values.iter().all(|v| wildcard.contains(v)) {
                    covered = false;
                    break;
                }
            }

            if covered {
                debug!(name = %result.name, zone = %zone, "Wildcard answer");
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn probe<X: Exchange + ?Sized>(
        &mut self,
        pool: &ServerPool,
        exchange: &X,
        zone: &str,
        record_type: RecordType,
    ) -> Result<&HashSet<String>, DomainError> {
        let key = (zone.to_string(), record_type);

        if !self.probed.contains_key(&key) {
            let name = format!("{}.{}", random_label(&mut self.rng, PROBE_LABEL_LEN), zone);
            let mut lease = pool.take().await?;
            let answers = lease.query(exchange, &name, record_type).await?;
            drop(lease);

            if !answers.is_empty() {
                info!(
                    zone = %zone,
                    record_type = %record_type,
                    answers = answers.len(),
                    "Wildcard detected"
                );
            }
            self.probed.insert(key.clone(), answers.into_iter().collect());
        }

        Ok(&self.probed[&key])
    }
}

/// Zones whose wildcard could have produced `name`, nearest first. Empty
/// when `name` is not strictly below `base`.
fn parent_zones(name: &str, base: &str) -> Vec<String> {
    if !name.ends_with(&format!(".{}", base)) {
        return Vec::new();
    }

    subdomains(name, base)
        .iter()
        .filter_map(|sub| sub.split_once('.').map(|(_, zone)| zone.to_string()))
        .collect()
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_zones_nearest_first() {
        assert_eq!(
            parent_zones("a.b.example.com", "example.com"),
            vec!["b.example.com".to_string(), "example.com".to_string()]
        );
    }

    #[test]
    fn test_parent_zones_outside_base() {
        assert!(parent_zones("example.com", "example.com").is_empty());
        assert!(parent_zones("a.example.org", "example.com").is_empty());
        assert!(parent_zones("a.badexample.com", "example.com").is_empty());
    }

    #[test]
    fn test_base_is_normalized() {
        let detector = WildcardDetector::new("Example.COM.", fastrand::Rng::with_seed(1));
        assert_eq!(detector.base(), "example.com");
    }
}
