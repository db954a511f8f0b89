//! Bounded multi-worker job queue.
//!
//! Fresh jobs enter through a bounded input channel; jobs that asked for
//! another step (or hit a transient failure) go to a single retry buffer
//! that workers drain before taking fresh input. Every admitted job lives
//! in exactly one place at a time (input, retry buffer, or a worker), so
//! the retry buffer never holds more than the number of admitted jobs.
//!
//! `stop()` only closes the input side. Workers keep running until the
//! input is drained and no admitted job is still in flight, which means a
//! job being requeued can never race with shutdown.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, watch, Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::progress::{QueueStats, StatsSource};
use crate::{JobHandle, Processor, QueueError, Step};

struct Task<J, R> {
    job: J,
    dest: Option<oneshot::Sender<R>>,
}

type TaskOf<P> = Task<<P as Processor>::Job, <P as Processor>::Output>;

struct Inbox<T> {
    todo: mpsc::Receiver<T>,
    retry: mpsc::UnboundedReceiver<T>,
    todo_closed: bool,
}

enum Next<T> {
    Retried(T),
    Fresh(T),
    InputClosed,
    Settled,
}

struct Shared<P: Processor> {
    processor: P,
    inbox: Mutex<Inbox<TaskOf<P>>>,
    retry_tx: mpsc::UnboundedSender<TaskOf<P>>,
    /// Signalled whenever an in-flight job reaches its final step.
    settled: Notify,
    in_flight: AtomicUsize,
    added: AtomicU64,
    processed: AtomicU64,
    pending: watch::Sender<u64>,
    workers_done: watch::Sender<bool>,
}

pub struct JobQueue<P: Processor> {
    shared: Arc<Shared<P>>,
    todo_tx: StdMutex<Option<mpsc::Sender<TaskOf<P>>>>,
    outputs: StdMutex<Option<(mpsc::Sender<P::Output>, mpsc::Sender<P::Error>)>>,
    results: Mutex<mpsc::Receiver<P::Output>>,
    errors: Mutex<mpsc::Receiver<P::Error>>,
    workers: usize,
    started: AtomicBool,
    created_at: Instant,
}

impl<P: Processor> JobQueue<P> {
    /// `capacity` bounds the input, result and error channels alike.
    pub fn new(processor: P, workers: usize, capacity: usize) -> Result<Self, QueueError> {
        if workers == 0 {
            return Err(QueueError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(QueueError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }

        let (todo_tx, todo_rx) = mpsc::channel(capacity);
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::channel(capacity);
        let (errors_tx, errors_rx) = mpsc::channel(capacity);
        let (pending, _) = watch::channel(0);
        let (workers_done, _) = watch::channel(false);

        let shared = Arc::new(Shared {
            processor,
            inbox: Mutex::new(Inbox {
                todo: todo_rx,
                retry: retry_rx,
                todo_closed: false,
            }),
            retry_tx,
            settled: Notify::new(),
            in_flight: AtomicUsize::new(0),
            added: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            pending,
            workers_done,
        });

        Ok(Self {
            shared,
            todo_tx: StdMutex::new(Some(todo_tx)),
            outputs: StdMutex::new(Some((results_tx, errors_tx))),
            results: Mutex::new(results_rx),
            errors: Mutex::new(errors_rx),
            workers,
            started: AtomicBool::new(false),
            created_at: Instant::now(),
        })
    }

    pub fn processor(&self) -> &P {
        &self.shared.processor
    }

    /// Registers `n` more jobs as outstanding. The queue never infers this
    /// from `schedule` calls.
    pub fn add(&self, n: u64) {
        self.shared.added.fetch_add(n, Ordering::Relaxed);
        self.shared.pending.send_modify(|pending| *pending += n);
    }

    /// Enqueues a job, waiting while the input channel is full.
    pub async fn schedule(&self, job: P::Job) -> Result<(), QueueError> {
        self.enqueue(Task { job, dest: None }).await
    }

    /// Like [`schedule`](Self::schedule), and also returns a handle that
    /// receives this job's output directly.
    pub async fn schedule_with_handle(
        &self,
        job: P::Job,
    ) -> Result<JobHandle<P::Output>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(Task {
            job,
            dest: Some(tx),
        })
        .await?;
        Ok(JobHandle::new(rx))
    }

    async fn enqueue(&self, task: TaskOf<P>) -> Result<(), QueueError> {
        let sender = self
            .todo_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match sender {
            Some(sender) => sender.send(task).await.map_err(|_| QueueError::Closed),
            None => Err(QueueError::Closed),
        }
    }

    /// Spawns the workers plus one coordinator that closes the result and
    /// error streams after the last worker exits. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) -> Result<(), QueueError> {
        let (results, errors) = self
            .outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(QueueError::AlreadyStarted)?;
        self.started.store(true, Ordering::Release);

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            workers.spawn(run_worker(
                Arc::clone(&self.shared),
                id,
                results.clone(),
                errors.clone(),
            ));
        }

        info!(workers = self.workers, "Job queue started");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Job queue worker terminated abnormally");
                }
            }
            drop(results);
            drop(errors);
            shared.workers_done.send_replace(true);
            debug!("All workers exited, output streams closed");
        });

        Ok(())
    }

    /// Closes the input. Queued and in-flight jobs still run to completion;
    /// later `schedule` calls fail with [`QueueError::Closed`].
    pub fn stop(&self) {
        let sender = self
            .todo_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_some() {
            debug!("Job queue input closed");
        }
    }

    /// Next completed output, or `None` once every worker has exited and
    /// the stream is drained.
    pub async fn next(&self) -> Option<P::Output> {
        self.results.lock().await.recv().await
    }

    /// Next processing error; an independent stream with the same
    /// end-of-stream behaviour as [`next`](Self::next).
    pub async fn next_error(&self) -> Option<P::Error> {
        self.errors.lock().await.recv().await
    }

    /// Returns immediately if the queue was never started.
    pub async fn wait_workers(&self) {
        if !self.started.load(Ordering::Acquire) {
            return;
        }
        let mut done = self.shared.workers_done.subscribe();
        let _ = done.wait_for(|done| *done).await;
    }

    /// Waits until every added job has been processed.
    pub async fn wait_jobs(&self) {
        let mut pending = self.shared.pending.subscribe();
        let _ = pending.wait_for(|pending| *pending == 0).await;
    }

    pub fn added(&self) -> u64 {
        self.shared.added.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> u64 {
        self.shared.processed.load(Ordering::Relaxed)
    }

    /// Processed over added, 0.0 while nothing has been added.
    pub fn progress(&self) -> f64 {
        let added = self.added();
        if added == 0 {
            return 0.0;
        }
        self.processed() as f64 / added as f64
    }

    /// Processed jobs per second since the queue was created.
    pub fn speed(&self) -> f64 {
        let elapsed = self.created_at.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.processed() as f64 / elapsed
    }
}

impl<P: Processor> StatsSource for JobQueue<P> {
    fn stats(&self) -> QueueStats {
        QueueStats {
            added: self.added(),
            processed: self.processed(),
            progress: self.progress(),
            speed: self.speed(),
        }
    }
}

async fn run_worker<P: Processor>(
    shared: Arc<Shared<P>>,
    id: usize,
    results: mpsc::Sender<P::Output>,
    errors: mpsc::Sender<P::Error>,
) {
    debug!(worker = id, "Worker started");

    while let Some(task) = shared.next_task().await {
        shared.run_step(task, &results, &errors).await;
    }

    debug!(worker = id, "Worker exiting");
}

impl<P: Processor> Shared<P> {
    /// `None` once the input is closed and drained and nothing is in flight.
    async fn next_task(&self) -> Option<TaskOf<P>> {
        let mut guard = self.inbox.lock().await;
        let inbox = &mut *guard;

        loop {
            if let Ok(task) = inbox.retry.try_recv() {
                return Some(task);
            }
            if inbox.todo_closed && self.in_flight.load(Ordering::Acquire) == 0 {
                return None;
            }

            let todo_open = !inbox.todo_closed;
            let next = tokio::select! {
                biased;
                Some(task) = inbox.retry.recv() => Next::Retried(task),
                task = inbox.todo.recv(), if todo_open => match task {
                    Some(task) => Next::Fresh(task),
                    None => Next::InputClosed,
                },
                _ = self.settled.notified() => Next::Settled,
            };

            match next {
                Next::Retried(task) => return Some(task),
                Next::Fresh(task) => {
                    self.in_flight.fetch_add(1, Ordering::AcqRel);
                    return Some(task);
                }
                Next::InputClosed => inbox.todo_closed = true,
                Next::Settled => {}
            }
        }
    }

    async fn run_step(
        &self,
        task: TaskOf<P>,
        results: &mpsc::Sender<P::Output>,
        errors: &mpsc::Sender<P::Error>,
    ) {
        let Task { job, dest } = task;

        let step = match AssertUnwindSafe(self.processor.process(job))
            .catch_unwind()
            .await
        {
            Ok(step) => step,
            Err(panic) => {
                // Counted as processed without a result.
                error!(panic = panic_message(&*panic), "Processor panicked, dropping job");
                self.record_completion();
                self.settle();
                return;
            }
        };

        match step {
            Step::Done(output) => {
                self.record_completion();
                if let Some(dest) = dest {
                    let _ = dest.send(output.clone());
                }
                if results.send(output).await.is_err() {
                    debug!("Result stream receiver dropped");
                }
                self.settle();
            }
            Step::More(job) => self.requeue(Task { job, dest }),
            Step::Retry { job, error } => {
                if errors.send(error).await.is_err() {
                    debug!("Error stream receiver dropped");
                }
                self.requeue(Task { job, dest });
            }
            Step::Failed(error) => {
                if errors.send(error).await.is_err() {
                    debug!("Error stream receiver dropped");
                }
                self.record_completion();
                self.settle();
            }
        }
    }

    fn requeue(&self, task: TaskOf<P>) {
        if self.retry_tx.send(task).is_err() {
            error!("Retry buffer closed, dropping job");
            self.settle();
        }
    }

    fn record_completion(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.pending.send_modify(|pending| {
            if *pending == 0 {
                warn!("Job completed without a matching add()");
            } else {
                *pending -= 1;
            }
        });
    }

    fn settle(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.settled.notify_one();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
