//! Terminal outcomes of the retry harness.

use std::fmt;

/// Why a retried operation gave up.
///
/// Generic over the operation's own error so the last underlying failure is kept
/// intact for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryErrorKind<E> {
    /// Every permitted attempt failed.
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: E,
    },
    /// The operation failed with an error classified as permanent.
    Rejected {
        /// Attempt on which the permanent error surfaced
        attempt: u32,
        /// The permanent error
        error: E,
    },
    /// The run-scoped stop signal fired between attempts.
    Cancelled {
        /// Attempts completed before cancellation
        attempts: u32,
    },
}

impl<E: fmt::Display> fmt::Display for RetryErrorKind<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryErrorKind::Exhausted {
                attempts,
                last_error,
            } => write!(f, "Exhausted after {} attempts: {}", attempts, last_error),
            RetryErrorKind::Rejected { attempt, error } => {
                write!(f, "Permanent failure on attempt {}: {}", attempt, error)
            }
            RetryErrorKind::Cancelled { attempts } => {
                write!(f, "Cancelled after {} attempts", attempts)
            }
        }
    }
}

/// Retry harness error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{CollaboratorError, RetryError, RetryErrorKind};
///
/// let err = RetryError::new(RetryErrorKind::Exhausted {
///     attempts: 3,
///     last_error: CollaboratorError::http(503, "busy"),
/// });
/// assert!(err.is_exhausted());
/// assert!(!err.is_cancelled());
/// assert!(format!("{}", err).contains("3 attempts"));
/// ```
#[derive(Debug, Clone)]
pub struct RetryError<E> {
    kind: RetryErrorKind<E>,
    line: u32,
    file: &'static str,
}

impl<E> RetryError<E> {
    /// Create a new retry error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RetryErrorKind<E>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RetryErrorKind<E> {
        &self.kind
    }

    /// Consume the error, returning its kind.
    pub fn into_kind(self) -> RetryErrorKind<E> {
        self.kind
    }

    /// True when the stop signal ended the attempts.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, RetryErrorKind::Cancelled { .. })
    }

    /// True when every permitted attempt was used.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, RetryErrorKind::Exhausted { .. })
    }

    /// Number of attempts actually made.
    pub fn attempts(&self) -> u32 {
        match &self.kind {
            RetryErrorKind::Exhausted { attempts, .. } => *attempts,
            RetryErrorKind::Rejected { attempt, .. } => *attempt,
            RetryErrorKind::Cancelled { attempts } => *attempts,
        }
    }

    /// The last underlying error, absent on cancellation.
    pub fn last_error(&self) -> Option<&E> {
        match &self.kind {
            RetryErrorKind::Exhausted { last_error, .. } => Some(last_error),
            RetryErrorKind::Rejected { error, .. } => Some(error),
            RetryErrorKind::Cancelled { .. } => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Retry Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
