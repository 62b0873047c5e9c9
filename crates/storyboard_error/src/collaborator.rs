//! Errors raised by the external text and image collaborators, and their retry
//! classification.

use std::time::Duration;

/// Failure conditions reported by a generative collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CollaboratorErrorKind {
    /// HTTP-style error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Provider asked the caller to slow down
    #[display("Rate limited (retry after {:?} ms)", retry_after_ms)]
    RateLimited {
        /// Provider hint for the next attempt, in milliseconds
        retry_after_ms: Option<u64>,
    },
    /// A single attempt ran past its deadline
    #[display("Attempt timed out after {} ms", _0)]
    Timeout(u64),
    /// Connection-level failure before a response arrived
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// The collaborator answered with nothing usable
    #[display("Collaborator returned an empty result")]
    EmptyResponse,
    /// The request itself was rejected as malformed
    #[display("Malformed request: {}", _0)]
    MalformedRequest(String),
    /// The requested model is not served by the collaborator
    #[display("Model unavailable: {}", _0)]
    ModelUnavailable(String),
}

impl CollaboratorErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            CollaboratorErrorKind::RateLimited { .. } => true,
            CollaboratorErrorKind::Timeout(_) => true,
            CollaboratorErrorKind::Transport(_) => true,
            CollaboratorErrorKind::EmptyResponse => true,
            CollaboratorErrorKind::MalformedRequest(_) => false,
            CollaboratorErrorKind::ModelUnavailable(_) => false,
        }
    }

    /// Server-provided delay before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CollaboratorErrorKind::RateLimited {
                retry_after_ms: Some(ms),
            } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

/// Collaborator error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{CollaboratorError, CollaboratorErrorKind, RetryableError};
///
/// let err = CollaboratorError::new(CollaboratorErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Collaborator Error: {} at line {} in {}", kind, line, file)]
pub struct CollaboratorError {
    /// The kind of error that occurred
    pub kind: CollaboratorErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CollaboratorError {
    /// Create a new CollaboratorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CollaboratorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an HTTP-status failure.
    #[track_caller]
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Http {
            status_code,
            message: message.into(),
        })
    }
}

/// Errors that know whether another attempt could succeed.
///
/// The retry harness consults this before sleeping: permanent failures (bad
/// request, unknown model) end the run of attempts at once, while transient ones
/// (timeouts, 429, 5xx) are retried until the policy is spent.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Server-provided delay that should replace the computed backoff.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Errors that can represent an attempt abandoned at its deadline.
pub trait TimeoutError {
    /// Build the error recorded when an attempt exceeds `after`.
    fn timed_out(after: Duration) -> Self;
}

impl RetryableError for CollaboratorError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.kind.retry_after()
    }
}

impl TimeoutError for CollaboratorError {
    #[track_caller]
    fn timed_out(after: Duration) -> Self {
        Self::new(CollaboratorErrorKind::Timeout(after.as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(CollaboratorError::http(status, "transient").is_retryable());
        }
        for status in [400, 401, 403, 404] {
            assert!(!CollaboratorError::http(status, "permanent").is_retryable());
        }
    }

    #[test]
    fn test_malformed_request_is_permanent() {
        let err = CollaboratorError::new(CollaboratorErrorKind::MalformedRequest(
            "prompt too long".to_string(),
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_after_hint() {
        let err = CollaboratorError::new(CollaboratorErrorKind::RateLimited {
            retry_after_ms: Some(750),
        });
        assert_eq!(err.retry_after(), Some(Duration::from_millis(750)));
        assert_eq!(CollaboratorError::http(503, "busy").retry_after(), None);
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = CollaboratorError::timed_out(Duration::from_secs(2));
        assert_eq!(err.kind, CollaboratorErrorKind::Timeout(2000));
        assert!(err.is_retryable());
    }
}
