//! Retry harness and bounded worker pool.
//!
//! Every external call in the storyboard engine goes through [`RetryHarness`]:
//! bounded attempts, exponential backoff capped at a ceiling, a timeout on each
//! attempt and a run-scoped [`CancellationToken`] checked between attempts.
//!
//! [`BoundedPool`] runs batches of independent jobs (image variants, for
//! example) with a fixed number of cooperative workers, each job going through
//! the harness.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod harness;
mod policy;
mod pool;

pub use harness::{RetryHarness, run_with_retry};
pub use policy::RetryPolicy;
pub use pool::{BoundedPool, JobResult, process_all};
