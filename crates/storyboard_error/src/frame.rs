//! Frame-scoped failures recorded by the storyboard driver.

use crate::{RetryError, RetryErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage at which a frame failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FrameStage {
    /// Structured story text generation
    #[display("text")]
    Text,
    /// Image generation
    #[display("image")]
    Image,
}

/// What went wrong inside the failing stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FrameErrorKind {
    /// The collaborator kept failing until retries (and fallback models) ran out
    #[display("exhausted after {} attempts: {}", attempts, last_error)]
    Exhausted {
        /// Attempts made on the last model tried
        attempts: u32,
        /// Rendered last underlying error
        last_error: String,
    },
    /// The collaborator rejected the request permanently
    #[display("rejected on attempt {}: {}", attempt, error)]
    Rejected {
        /// Attempt on which the rejection surfaced
        attempt: u32,
        /// Rendered permanent error
        error: String,
    },
    /// Generation was stopped while this stage was in flight
    #[display("cancelled after {} attempts", attempts)]
    Cancelled {
        /// Attempts made before the stop signal
        attempts: u32,
    },
}

/// A failure attributed to one frame and one stage.
///
/// Frame errors never abort a run; the driver records them and moves on, so they
/// carry run data (frame, stage) instead of a source location.
///
/// # Examples
///
/// ```
/// use storyboard_error::{CollaboratorError, FrameError, FrameStage, RetryError, RetryErrorKind};
///
/// let retry = RetryError::new(RetryErrorKind::Exhausted {
///     attempts: 3,
///     last_error: CollaboratorError::http(500, "boom"),
/// });
/// let err = FrameError::from_retry(3, FrameStage::Image, &retry);
/// assert_eq!(err.frame, 3);
/// assert_eq!(err.stage, FrameStage::Image);
/// assert!(!err.is_cancelled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameError {
    /// One-based frame index
    pub frame: u32,
    /// Stage that failed
    pub stage: FrameStage,
    /// Failure detail
    pub kind: FrameErrorKind,
}

impl FrameError {
    /// Create a frame error.
    pub fn new(frame: u32, stage: FrameStage, kind: FrameErrorKind) -> Self {
        Self { frame, stage, kind }
    }

    /// Attribute a retry harness outcome to a frame and stage.
    pub fn from_retry<E: fmt::Display>(frame: u32, stage: FrameStage, err: &RetryError<E>) -> Self {
        let kind = match err.kind() {
            RetryErrorKind::Exhausted {
                attempts,
                last_error,
            } => FrameErrorKind::Exhausted {
                attempts: *attempts,
                last_error: last_error.to_string(),
            },
            RetryErrorKind::Rejected { attempt, error } => FrameErrorKind::Rejected {
                attempt: *attempt,
                error: error.to_string(),
            },
            RetryErrorKind::Cancelled { attempts } => FrameErrorKind::Cancelled {
                attempts: *attempts,
            },
        };
        Self::new(frame, stage, kind)
    }

    /// True when the failure came from a stop request rather than the collaborator.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, FrameErrorKind::Cancelled { .. })
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame Error: frame {} failed at {} stage: {}",
            self.frame, self.stage, self.kind
        )
    }
}

impl std::error::Error for FrameError {}
