//! Top-level error wrapper types.

use crate::{CollaboratorError, ConfigError, FrameError, RetryError, StorageError, StoryError};

/// Every error the storyboard crates can surface.
///
/// # Examples
///
/// ```
/// use storyboard_error::{ConfigError, StoryboardError};
///
/// let err: StoryboardError = ConfigError::new("bad retry section").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Run validation error
    #[from(StoryError)]
    Story(StoryError),
    /// Collaborator error surfaced outside the retry harness
    #[from(CollaboratorError)]
    Collaborator(CollaboratorError),
    /// Retry harness gave up on a collaborator call
    #[from(RetryError<CollaboratorError>)]
    Retry(RetryError<CollaboratorError>),
    /// A single frame failed
    #[from(FrameError)]
    Frame(FrameError),
    /// Persistence error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Storyboard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryError, StoryErrorKind, StoryboardErrorKind, StoryboardResult};
///
/// fn might_fail() -> StoryboardResult<()> {
///     Err(StoryError::new(StoryErrorKind::InvalidConcurrency))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), StoryboardErrorKind::Story(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StoryboardErrorKind
impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;
