//! Story run error types.
//!
//! These are the fail-fast conditions: they are raised before any external call
//! is attempted.

/// Specific error conditions for storyboard runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoryErrorKind {
    /// A run needs at least one frame
    #[display("A storyboard needs at least one frame (got {})", _0)]
    InvalidFrameCount(u32),
    /// Frame index outside 1..=total
    #[display("Frame {} is outside the storyboard (1..={})", frame, total)]
    FrameOutOfRange {
        /// Requested frame
        frame: u32,
        /// Frames in the run
        total: u32,
    },
    /// Worker pool sized to zero
    #[display("Concurrency must be at least 1")]
    InvalidConcurrency,
    /// Retry policy that can never succeed
    #[display("Invalid retry policy: {}", _0)]
    InvalidPolicy(String),
    /// Scenario text is empty or whitespace
    #[display("Story scenario cannot be empty")]
    EmptyScenario,
    /// Frame has no generated text to regenerate an image from
    #[display("Frame {} has not been generated yet", _0)]
    FrameNotGenerated(u32),
}

/// Error type for storyboard run validation.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::FrameOutOfRange { frame: 7, total: 5 });
/// assert!(format!("{}", err).contains("Frame 7"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The specific error condition
    pub kind: StoryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StoryError {
    /// Create a new StoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
