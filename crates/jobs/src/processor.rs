use async_trait::async_trait;

/// What a single processing step decided about its job.
///
/// The job is handed to [`Processor::process`] by value and comes back in
/// `More` and `Retry`, so at most one step of a given job runs at a time.
#[derive(Debug)]
pub enum Step<J, R, E> {
    /// Finished. Counted as processed and published on the result stream.
    Done(R),

    /// Needs another step. Requeued without touching the counters.
    More(J),

    /// Transient failure. The error is published and the job requeued as is.
    Retry { job: J, error: E },

    /// Permanent failure. The error is published and the job counted as
    /// processed, with no result.
    Failed(E),
}

#[async_trait]
pub trait Processor: Send + Sync + 'static {
    type Job: Send + 'static;
    type Output: Clone + Send + 'static;
    type Error: Send + 'static;

    async fn process(&self, job: Self::Job) -> Step<Self::Job, Self::Output, Self::Error>;
}
