//! Feeding names into the resolver and draining its streams.

use dnsweep_domain::{DnsResult, Meta, NameSource, RecordType};
use dnsweep_infrastructure::dns::{ip_to_reverse_domain, DnsResolver, Exchange, WildcardDetector};
use dnsweep_infrastructure::input::IpRangeSource;
use dnsweep_infrastructure::output::JsonSeqWriter;
use serde_json::json;
use std::io::Write;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Schedules one job per name. Returns how many were scheduled.
pub async fn feed_names(
    resolver: &DnsResolver,
    source: &mut dyn NameSource,
    record_types: &[RecordType],
) -> anyhow::Result<u64> {
    let mut scheduled = 0;

    while let Some(name) = source.next() {
        resolver
            .schedule(name, record_types.to_vec(), Meta::new())
            .await?;
        scheduled += 1;
    }

    Ok(scheduled)
}

/// Schedules a PTR lookup per address, keeping the address in the meta.
pub async fn feed_ptr(resolver: &DnsResolver, source: &mut IpRangeSource) -> anyhow::Result<u64> {
    let mut scheduled = 0;

    while let Some(ip) = source.next_ip() {
        let ip = IpAddr::V4(ip);
        let mut meta = Meta::new();
        meta.insert("ip".to_string(), json!(ip.to_string()));

        resolver
            .schedule(ip_to_reverse_domain(&ip), vec![RecordType::PTR], meta)
            .await?;
        scheduled += 1;
    }

    Ok(scheduled)
}

/// Writes results until the stream closes. Returns the number written.
///
/// After a write failure the stream is still drained, so workers never
/// stall on a full result channel; the first failure is returned at the end.
pub async fn write_results<X: Exchange, W: Write>(
    resolver: Arc<DnsResolver<X>>,
    mut writer: JsonSeqWriter<W>,
    skip_empty: bool,
    mut wildcard: Option<WildcardDetector>,
) -> anyhow::Result<u64> {
    let mut failure = None;
    let mut discarded = 0u64;

    while let Some(result) = resolver.next().await {
        if failure.is_some() {
            discarded += 1;
            continue;
        }

        if !keep(&result, skip_empty) {
            debug!(name = %result.name, "Skipping empty result");
            continue;
        }

        if let Some(detector) = wildcard.as_mut() {
            let processor = resolver.processor();
            match detector
                .is_wildcard(processor.pool(), processor.exchange(), &result)
                .await
            {
                Ok(true) => {
                    debug!(name = %result.name, "Skipping wildcard result");
                    continue;
                }
                Ok(false) => {}
                Err(e) => warn!(
                    name = %result.name,
                    error = %e,
                    "Wildcard probe failed, keeping result"
                ),
            }
        }

        if let Err(e) = writer.write(&result) {
            error!(error = %e, "Failed to write result, discarding the rest");
            failure = Some(e);
        }
    }

    if let Some(e) = failure {
        warn!(written = writer.written(), discarded = discarded, "Output incomplete");
        return Err(e.into());
    }

    writer.flush()?;
    Ok(writer.written())
}

/// Logs errors until the stream closes. Returns how many were seen.
pub async fn log_errors(resolver: Arc<DnsResolver>) -> u64 {
    let mut seen = 0;

    while let Some(failure) = resolver.next_error().await {
        warn!(
            name = %failure.name,
            record_type = ?failure.record_type,
            error = %failure.error,
            transient = failure.error.is_transient(),
            "Resolution error"
        );
        seen += 1;
    }

    seen
}

/// `--skip-empty` drops results with no answers of any type.
pub fn keep(result: &DnsResult, skip_empty: bool) -> bool {
    !(skip_empty && result.is_empty())
}
