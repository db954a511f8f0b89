use tokio::sync::oneshot;

/// Typed slot receiving a single job's output, independent of the shared
/// result stream.
#[derive(Debug)]
pub struct JobHandle<R> {
    rx: oneshot::Receiver<R>,
}

impl<R> JobHandle<R> {
    pub(crate) fn new(rx: oneshot::Receiver<R>) -> Self {
        Self { rx }
    }

    /// Resolves once the job completes. `None` when the job failed
    /// permanently or the queue was dropped first.
    pub async fn wait(self) -> Option<R> {
        self.rx.await.ok()
    }
}
