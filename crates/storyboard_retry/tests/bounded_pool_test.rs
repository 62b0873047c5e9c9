//! Ordering, isolation and progress tests for the bounded worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyboard_error::{CollaboratorError, StoryErrorKind};
use storyboard_retry::{BoundedPool, RetryPolicy, process_all};
use tokio_util::sync::CancellationToken;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_attempts,
        Duration::from_millis(10),
        1.0,
        Duration::from_secs(5),
    )
}

#[tokio::test(start_paused = true)]
async fn results_follow_input_order_when_one_job_fails() {
    // later jobs finish first so completion order differs from input order
    let jobs: Vec<usize> = (0..5).collect();

    let results = process_all(
        jobs,
        2,
        fast_policy(2),
        CancellationToken::new(),
        |job| async move {
            tokio::time::sleep(Duration::from_millis(100 * (5 - job as u64))).await;
            if job == 1 {
                Err(CollaboratorError::http(500, "job 2 always fails"))
            } else {
                Ok(job * 2)
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 5);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.index(), i);
    }
    assert!(!results[1].success());
    assert!(results[1].error().unwrap().is_exhausted());
    for i in [0, 2, 3, 4] {
        assert!(results[i].success(), "job {i} should succeed");
        assert_eq!(*results[i].value().unwrap(), i * 2);
    }
}

#[tokio::test]
async fn zero_concurrency_fails_fast() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let err = process_all(
        vec![1, 2, 3],
        0,
        fast_policy(1),
        CancellationToken::new(),
        move |_job: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, CollaboratorError>(()) }
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, StoryErrorKind::InvalidConcurrency);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_concurrency_limit() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let pool = BoundedPool::new(3, fast_policy(1), CancellationToken::new()).unwrap();

    let results = pool
        .process_all((0..10).collect::<Vec<u32>>(), |job| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, CollaboratorError>(job)
            }
        })
        .await;

    assert_eq!(results.len(), 10);
    assert_eq!(peak.load(Ordering::SeqCst), 3);
    assert_eq!(pool.completed(), 10);
}

#[tokio::test(start_paused = true)]
async fn completed_count_includes_failures() {
    let pool = BoundedPool::new(8, fast_policy(1), CancellationToken::new()).unwrap();
    let progress = pool.progress_handle();

    let results = pool
        .process_all(vec![true, false, true], |ok| async move {
            if ok {
                Ok(())
            } else {
                Err(CollaboratorError::http(503, "busy"))
            }
        })
        .await;

    assert_eq!(progress.load(Ordering::SeqCst), 3);
    assert_eq!(results.iter().filter(|r| r.success()).count(), 2);
}

#[tokio::test]
async fn empty_batch_returns_no_results() {
    let pool = BoundedPool::new(2, fast_policy(1), CancellationToken::new()).unwrap();
    let results = pool
        .process_all(Vec::<u8>::new(), |_| async { Ok::<_, CollaboratorError>(()) })
        .await;
    assert!(results.is_empty());
    assert_eq!(pool.completed(), 0);
}

#[tokio::test(start_paused = true)]
async fn progress_callback_fires_once_per_job() {
    let pool = BoundedPool::new(2, fast_policy(1), CancellationToken::new()).unwrap();
    let seen = std::sync::Mutex::new(Vec::new());

    pool.process_all_with_progress(
        vec![0u64, 1, 2, 3],
        |job| async move {
            tokio::time::sleep(Duration::from_millis(10 * (job + 1))).await;
            if job == 2 {
                Err(CollaboratorError::http(400, "bad"))
            } else {
                Ok(job)
            }
        },
        |completed, total| seen.lock().unwrap().push((completed, total)),
    )
    .await;

    assert_eq!(
        seen.into_inner().unwrap(),
        vec![(1, 4), (2, 4), (3, 4), (4, 4)]
    );
}
