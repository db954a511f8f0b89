pub mod mock_processor;

use dnsweep_jobs::{JobQueue, Processor};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use mock_processor::{MockProcessor, TestError, TestJob, TestOutput};

/// Drains both output streams in the background until they close.
pub fn drain<P: Processor>(
    queue: &Arc<JobQueue<P>>,
) -> (JoinHandle<Vec<P::Output>>, JoinHandle<Vec<P::Error>>) {
    let results_queue = Arc::clone(queue);
    let results = tokio::spawn(async move {
        let mut out = Vec::new();
        while let Some(result) = results_queue.next().await {
            out.push(result);
        }
        out
    });

    let errors_queue = Arc::clone(queue);
    let errors = tokio::spawn(async move {
        let mut out = Vec::new();
        while let Some(error) = errors_queue.next_error().await {
            out.push(error);
        }
        out
    });

    (results, errors)
}
