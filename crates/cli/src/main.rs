use anyhow::bail;
use clap::Parser;
use dnsweep_domain::{CliOverrides, NameSource};
use dnsweep_infrastructure::dns::{DnsResolver, WildcardDetector};
use dnsweep_infrastructure::input::{ChainSource, IpRangeSource, LinesSource};
use dnsweep_infrastructure::output::JsonSeqWriter;
use dnsweep_jobs::{ProgressReporter, StatsSource};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod bootstrap;
mod sweep;

#[derive(Parser, Debug)]
#[command(name = "dnsweep")]
#[command(version)]
#[command(about = "dnsweep - rate-limited bulk DNS resolver")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// File with one name per line (repeatable)
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Vec<String>,

    /// IPv4 range to sweep with PTR lookups (repeatable)
    #[arg(long, value_name = "RANGE")]
    ptr: Vec<String>,

    /// Name servers, comma separated
    #[arg(short = 's', long, value_delimiter = ',')]
    servers: Option<Vec<String>>,

    /// Worker count
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Queries per second per name server
    #[arg(short = 'r', long)]
    rate_limit: Option<f64>,

    /// Job queue capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Query timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Record types, comma separated, or "all"
    #[arg(short = 't', long, value_delimiter = ',')]
    types: Option<Vec<String>>,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<String>,

    /// Drop results without any answers
    #[arg(long)]
    skip_empty: bool,

    /// Drop results under this domain that only carry its wildcard answers
    #[arg(long, value_name = "DOMAIN")]
    wildcard_domain: Option<String>,

    /// Seconds between progress lines, 0 disables
    #[arg(long, value_name = "SECS")]
    progress_interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            servers: self.servers.clone(),
            workers: self.workers,
            rate_limit: self.rate_limit,
            capacity: self.capacity,
            query_timeout_ms: self.timeout,
            record_types: self.types.clone(),
            output_path: self.output.clone(),
            skip_empty: self.skip_empty,
            wildcard_domain: self.wildcard_domain.clone(),
            progress_interval_secs: self.progress_interval,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!("Starting dnsweep v{}", env!("CARGO_PKG_VERSION"));

    if cli.input.is_empty() && cli.ptr.is_empty() {
        bail!("nothing to resolve: pass --input FILE and/or --ptr RANGE");
    }

    let record_types = config.resolver.parsed_record_types()?;

    let mut names = ChainSource::new(Vec::new());
    for path in &cli.input {
        names.push(Box::new(LinesSource::open(path)?));
    }
    let mut ptr_targets = IpRangeSource::parse(&cli.ptr)?;

    let total = names.count() + ptr_targets.count();

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        servers = config.resolver.servers.len(),
        workers = config.resolver.workers,
        rate_limit = config.resolver.rate_limit,
        record_types = ?record_types,
        jobs = total,
        "Configuration loaded"
    );

    let output: Box<dyn Write + Send> = match &config.output.path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    let resolver = Arc::new(DnsResolver::from_config(&config.resolver)?);
    resolver.add(total);
    resolver.start()?;

    let shutdown = CancellationToken::new();
    let reporter = if config.output.progress_interval_secs > 0 {
        let stats: Arc<dyn StatsSource> = resolver.clone();
        let reporter = ProgressReporter::new(stats)
            .with_interval(config.output.progress_interval_secs)
            .with_cancellation(shutdown.clone());
        Some(Arc::new(reporter).start())
    } else {
        None
    };

    let wildcard = config
        .output
        .wildcard_domain
        .as_deref()
        .map(|base| WildcardDetector::new(base, fastrand::Rng::new()));

    let results = tokio::spawn(sweep::write_results(
        resolver.clone(),
        JsonSeqWriter::new(output),
        config.output.skip_empty,
        wildcard,
    ));
    let errors = tokio::spawn(sweep::log_errors(resolver.clone()));

    let started = Instant::now();

    let fed = async {
        let names_fed = sweep::feed_names(&resolver, &mut names, &record_types).await?;
        let ptr_fed = sweep::feed_ptr(&resolver, &mut ptr_targets).await?;
        anyhow::Ok(names_fed + ptr_fed)
    }
    .await;

    resolver.stop();
    if let Err(e) = names.close() {
        warn!(error = %e, "Failed to close input");
    }

    let scheduled = fed?;
    if scheduled != total {
        warn!(
            expected = total,
            scheduled = scheduled,
            "Input changed while reading, progress will be off"
        );
    }

    resolver.wait_workers().await;

    let written = results.await??;
    let failures = errors.await?;

    shutdown.cancel();
    if let Some(reporter) = reporter {
        let _ = reporter.await;
    }

    info!(
        processed = resolver.processed(),
        written = written,
        errors = failures,
        elapsed_secs = started.elapsed().as_secs(),
        speed = %format!("{:.1}", resolver.speed()),
        "Sweep finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated_lists() {
        let cli = Cli::try_parse_from([
            "dnsweep",
            "--input",
            "names.txt",
            "--servers",
            "9.9.9.9,1.1.1.1",
            "--types",
            "A,MX",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(
            overrides.servers,
            Some(vec!["9.9.9.9".to_string(), "1.1.1.1".to_string()])
        );
        assert_eq!(
            overrides.record_types,
            Some(vec!["A".to_string(), "MX".to_string()])
        );
        assert_eq!(cli.input, vec!["names.txt".to_string()]);
    }

    #[test]
    fn test_repeatable_inputs() {
        let cli = Cli::try_parse_from([
            "dnsweep",
            "-i",
            "a.txt",
            "-i",
            "b.txt",
            "--ptr",
            "192.0.2.0/30",
            "--ptr",
            "198.51.100.1",
        ])
        .unwrap();

        assert_eq!(cli.input.len(), 2);
        assert_eq!(cli.ptr.len(), 2);
    }

    #[test]
    fn test_wildcard_domain_flag() {
        let cli =
            Cli::try_parse_from(["dnsweep", "--wildcard-domain", "example.com"]).unwrap();
        assert_eq!(
            cli.overrides().wildcard_domain.as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_unset_flags_leave_config_alone() {
        let cli = Cli::try_parse_from(["dnsweep"]).unwrap();
        let overrides = cli.overrides();

        assert!(overrides.servers.is_none());
        assert!(overrides.workers.is_none());
        assert!(overrides.rate_limit.is_none());
        assert!(!overrides.skip_empty);
        assert!(overrides.wildcard_domain.is_none());
    }
}
