//! Error types for the storyboard engine.
//!
//! This crate provides the foundation error types used throughout the storyboard
//! workspace.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! Two errors sit outside the pattern because they carry run data rather than a
//! location: [`RetryError`], which is generic over the failing operation's error,
//! and [`FrameError`], which is attributed to a frame and a pipeline stage.
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{StoryError, StoryErrorKind, StoryboardResult};
//!
//! fn plan(total_frames: u32) -> StoryboardResult<u32> {
//!     if total_frames == 0 {
//!         Err(StoryError::new(StoryErrorKind::InvalidFrameCount(total_frames)))?
//!     }
//!     Ok(total_frames)
//! }
//!
//! assert!(plan(0).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborator;
mod config;
mod error;
mod frame;
mod retry;
mod storage;
mod story;

pub use collaborator::{CollaboratorError, CollaboratorErrorKind, RetryableError, TimeoutError};
pub use config::ConfigError;
pub use error::{StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use frame::{FrameError, FrameErrorKind, FrameStage};
pub use retry::{RetryError, RetryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use story::{StoryError, StoryErrorKind};
