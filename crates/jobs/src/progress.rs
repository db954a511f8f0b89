use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueStats {
    pub added: u64,
    pub processed: u64,
    pub progress: f64,
    pub speed: f64,
}

pub trait StatsSource: Send + Sync {
    fn stats(&self) -> QueueStats;
}

/// Background job that logs queue progress on a fixed interval until
/// cancelled.
pub struct ProgressReporter {
    source: Arc<dyn StatsSource>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl ProgressReporter {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self {
            source,
            interval_secs: DEFAULT_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!(
            interval_secs = self.interval_secs,
            "Starting progress reporter"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        let stats = self.source.stats();
                        info!(
                            processed = stats.processed,
                            added = stats.added,
                            speed = %format!("{:.1}", stats.speed),
                            "ProgressReporter: shutting down"
                        );
                        break;
                    }
                    _ = interval.tick() => {
                        let stats = self.source.stats();
                        info!(
                            processed = stats.processed,
                            added = stats.added,
                            percent = %format!("{:.1}", stats.progress * 100.0),
                            speed = %format!("{:.1}", stats.speed),
                            "Progress"
                        );
                    }
                }
            }
        })
    }
}
