#![allow(dead_code)]

use async_trait::async_trait;
use dnsweep_jobs::{Processor, Step};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct TestJob {
    pub id: u32,
    pub extra_steps: u32,
}

impl TestJob {
    pub fn new(id: u32) -> Self {
        Self { id, extra_steps: 0 }
    }

    pub fn with_steps(id: u32, extra_steps: u32) -> Self {
        Self { id, extra_steps }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestOutput {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestError {
    pub id: u32,
    pub permanent: bool,
}

/// Completes jobs after their extra steps; ids in `fail_once` hit one
/// transient failure first, ids in `invalid` fail permanently and ids in
/// `panicking` panic inside `process`.
pub struct MockProcessor {
    fail_once: Mutex<HashSet<u32>>,
    invalid: HashSet<u32>,
    panicking: HashSet<u32>,
    calls: Mutex<HashMap<u32, u32>>,
    delay: Option<Duration>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self {
            fail_once: Mutex::new(HashSet::new()),
            invalid: HashSet::new(),
            panicking: HashSet::new(),
            calls: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    pub fn with_fail_once(self, ids: &[u32]) -> Self {
        self.fail_once.lock().unwrap().extend(ids.iter().copied());
        self
    }

    pub fn with_invalid(mut self, ids: &[u32]) -> Self {
        self.invalid.extend(ids.iter().copied());
        self
    }

    pub fn with_panic(mut self, ids: &[u32]) -> Self {
        self.panicking.extend(ids.iter().copied());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_for(&self, id: u32) -> u32 {
        self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Processor for MockProcessor {
    type Job = TestJob;
    type Output = TestOutput;
    type Error = TestError;

    async fn process(&self, mut job: TestJob) -> Step<TestJob, TestOutput, TestError> {
        *self.calls.lock().unwrap().entry(job.id).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panicking.contains(&job.id) {
            panic!("processor blew up on job {}", job.id);
        }

        if self.invalid.contains(&job.id) {
            return Step::Failed(TestError {
                id: job.id,
                permanent: true,
            });
        }

        if self.fail_once.lock().unwrap().remove(&job.id) {
            let error = TestError {
                id: job.id,
                permanent: false,
            };
            return Step::Retry { job, error };
        }

        if job.extra_steps > 0 {
            job.extra_steps -= 1;
            return Step::More(job);
        }

        Step::Done(TestOutput { id: job.id })
    }
}
