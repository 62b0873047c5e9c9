//! Fixed-size worker pool over a shared job queue.

use crate::{RetryHarness, RetryPolicy};
use futures_util::future::join_all;
use std::collections::VecDeque;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storyboard_error::{RetryError, RetryableError, StoryError, StoryErrorKind, TimeoutError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Outcome of one job, reported at the job's original index.
#[derive(Debug)]
pub struct JobResult<T, E> {
    index: usize,
    outcome: Result<T, RetryError<E>>,
}

impl<T, E> JobResult<T, E> {
    /// Position of the job in the input list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True when the job produced a value.
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The produced value, if any.
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The terminal error, if any.
    pub fn error(&self) -> Option<&RetryError<E>> {
        self.outcome.as_ref().err()
    }

    /// Consume the result.
    pub fn into_outcome(self) -> Result<T, RetryError<E>> {
        self.outcome
    }
}

/// Runs independent jobs with at most `concurrency` in flight.
///
/// Workers are cooperative futures on the current task, not OS threads. Each job
/// runs through a [`RetryHarness`]; one job's failure never affects another.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_error::CollaboratorError;
/// use storyboard_retry::{BoundedPool, RetryPolicy};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let policy = RetryPolicy::new(1, Duration::from_millis(1), 1.0, Duration::from_secs(1));
/// let pool = BoundedPool::new(2, policy, CancellationToken::new()).unwrap();
///
/// let results = pool
///     .process_all(vec![1, 2, 3], |n| async move { Ok::<_, CollaboratorError>(n * 10) })
///     .await;
///
/// let values: Vec<_> = results.iter().map(|r| *r.value().unwrap()).collect();
/// assert_eq!(values, vec![10, 20, 30]);
/// assert_eq!(pool.completed(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BoundedPool {
    concurrency: usize,
    harness: RetryHarness,
    completed: Arc<AtomicUsize>,
}

impl BoundedPool {
    /// Create a pool. A concurrency of zero is rejected.
    #[track_caller]
    pub fn new(
        concurrency: usize,
        policy: RetryPolicy,
        stop: CancellationToken,
    ) -> Result<Self, StoryError> {
        if concurrency == 0 {
            return Err(StoryError::new(StoryErrorKind::InvalidConcurrency));
        }
        policy.validate()?;
        Ok(Self {
            concurrency,
            harness: RetryHarness::new(policy, stop),
            completed: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Maximum jobs in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Jobs finished so far, successful or not.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Shared counter for progress reporting from another task.
    pub fn progress_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completed)
    }

    /// Run every job and return one result per job, in input order.
    pub async fn process_all<J, T, E, F, Fut>(
        &self,
        jobs: Vec<J>,
        operation: F,
    ) -> Vec<JobResult<T, E>>
    where
        J: Clone,
        F: Fn(J) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + TimeoutError + Display,
    {
        self.process_all_with_progress(jobs, operation, |_, _| {})
            .await
    }

    /// Like [`BoundedPool::process_all`], calling `on_complete(completed, total)`
    /// once per finished job, successful or not.
    #[instrument(
        skip(self, jobs, operation, on_complete),
        fields(jobs = jobs.len(), concurrency = self.concurrency)
    )]
    pub async fn process_all_with_progress<J, T, E, F, Fut, P>(
        &self,
        jobs: Vec<J>,
        operation: F,
        on_complete: P,
    ) -> Vec<JobResult<T, E>>
    where
        J: Clone,
        F: Fn(J) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + TimeoutError + Display,
        P: Fn(usize, usize),
    {
        let total = jobs.len();
        let queue: Mutex<VecDeque<(usize, J)>> = Mutex::new(jobs.into_iter().enumerate().collect());
        let slots: Mutex<Vec<Option<JobResult<T, E>>>> =
            Mutex::new((0..total).map(|_| None).collect());
        let workers = self.concurrency.min(total.max(1));

        let worker = |id: usize| {
            let queue = &queue;
            let slots = &slots;
            let operation = &operation;
            let on_complete = &on_complete;
            async move {
                while let Some((index, job)) = next_job(queue) {
                    debug!(worker = id, job = index, "Starting job");
                    let outcome = self
                        .harness
                        .run("pool_job", || operation(job.clone()))
                        .await;
                    if let Err(e) = &outcome {
                        warn!(worker = id, job = index, error = %e, "Job failed");
                    }
                    store_result(slots, JobResult { index, outcome });
                    let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(completed = done, total, "Job finished");
                    on_complete(done, total);
                }
            }
        };

        join_all((0..workers).map(worker)).await;

        slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_iter()
            .flatten()
            .collect()
    }
}

fn next_job<J>(queue: &Mutex<VecDeque<(usize, J)>>) -> Option<(usize, J)> {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

fn store_result<T, E>(slots: &Mutex<Vec<Option<JobResult<T, E>>>>, result: JobResult<T, E>) {
    let mut slots = slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let index = result.index;
    slots[index] = Some(result);
}

/// Run `jobs` through a fresh pool.
///
/// Fails fast with [`StoryErrorKind::InvalidConcurrency`] when `concurrency` is 0.
pub async fn process_all<J, T, E, F, Fut>(
    jobs: Vec<J>,
    concurrency: usize,
    policy: RetryPolicy,
    stop: CancellationToken,
    operation: F,
) -> Result<Vec<JobResult<T, E>>, StoryError>
where
    J: Clone,
    F: Fn(J) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + TimeoutError + Display,
{
    let pool = BoundedPool::new(concurrency, policy, stop)?;
    Ok(pool.process_all(jobs, operation).await)
}
