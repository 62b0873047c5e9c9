//! Run-level records: location history, summaries and the storyboard snapshot.

use crate::{FrameResult, ImageHandle};
use serde::{Deserialize, Serialize};
use storyboard_error::{FrameError, FrameStage};

/// A recorded change of scene location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationChange {
    /// Frame at which the location changed
    pub frame: u32,
    /// Previous location
    pub from: String,
    /// New location
    pub to: String,
}

/// Whether a frame's text came from the collaborator or was synthesized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FrameSource {
    /// Parsed from collaborator output
    #[default]
    #[display("parsed")]
    Parsed,
    /// Deterministic fallback record
    #[display("fallback")]
    Fallback,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every frame completed
    Success,
    /// The run finished but some frames failed
    CompletedWithErrors {
        /// Number of failed frames
        errors: usize,
    },
    /// The stop signal ended the run early
    Stopped,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "success"),
            RunOutcome::CompletedWithErrors { errors } => {
                write!(f, "completed with {} errors", errors)
            }
            RunOutcome::Stopped => write!(f, "stopped early"),
        }
    }
}

/// The structured report of a driver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RunSummary {
    /// Run identifier
    run_id: String,
    /// Frames requested
    total_frames: u32,
    /// Frames whose text and image both completed
    completed_frames: u32,
    /// Frame-scoped failures, in frame order
    errors: Vec<FrameError>,
    /// Overall outcome
    outcome: RunOutcome,
}

impl RunSummary {
    /// Summarize a run. `stopped` wins over errors when deciding the outcome.
    pub fn new(
        run_id: impl Into<String>,
        total_frames: u32,
        completed_frames: u32,
        errors: Vec<FrameError>,
        stopped: bool,
    ) -> Self {
        let outcome = if stopped {
            RunOutcome::Stopped
        } else if errors.is_empty() {
            RunOutcome::Success
        } else {
            RunOutcome::CompletedWithErrors {
                errors: errors.len(),
            }
        };
        Self {
            run_id: run_id.into(),
            total_frames,
            completed_frames,
            errors,
            outcome,
        }
    }

    /// True when the run completed with no errors.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }

    /// `(frame, stage)` pairs for every failure.
    pub fn failed_frames(&self) -> Vec<(u32, FrameStage)> {
        self.errors.iter().map(|e| (e.frame, e.stage)).collect()
    }
}

/// One frame of a storyboard as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardFrame {
    /// One-based frame index
    pub frame: u32,
    /// Structured text
    pub details: FrameResult,
    /// Whether the text was parsed or synthesized
    #[serde(default)]
    pub source: FrameSource,
    /// Rendered image, absent when the image stage failed
    #[serde(default)]
    pub image: Option<ImageHandle>,
}

/// The ordered collection of generated frames for one run.
///
/// # Examples
///
/// ```
/// use storyboard_core::{FrameResult, FrameSource, Storyboard, StoryboardFrame};
///
/// let mut board = Storyboard::new("run-1", "A courier crosses a city", 3);
/// board.upsert(StoryboardFrame {
///     frame: 2,
///     details: FrameResult::default(),
///     source: FrameSource::Parsed,
///     image: None,
/// });
/// board.upsert(StoryboardFrame {
///     frame: 1,
///     details: FrameResult::default(),
///     source: FrameSource::Fallback,
///     image: None,
/// });
///
/// let order: Vec<u32> = board.frames().iter().map(|f| f.frame).collect();
/// assert_eq!(order, vec![1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Storyboard {
    /// Run identifier
    run_id: String,
    /// Scenario the frames were generated from
    scenario: String,
    /// Frames requested
    total_frames: u32,
    /// Creation time
    created_at: chrono::DateTime<chrono::Utc>,
    /// Generated frames, sorted by index
    frames: Vec<StoryboardFrame>,
}

impl Storyboard {
    /// Create an empty storyboard.
    pub fn new(run_id: impl Into<String>, scenario: impl Into<String>, total_frames: u32) -> Self {
        Self {
            run_id: run_id.into(),
            scenario: scenario.into(),
            total_frames,
            created_at: chrono::Utc::now(),
            frames: Vec::new(),
        }
    }

    /// Insert a frame, replacing any existing entry with the same index.
    pub fn upsert(&mut self, frame: StoryboardFrame) {
        match self.frames.binary_search_by_key(&frame.frame, |f| f.frame) {
            Ok(pos) => self.frames[pos] = frame,
            Err(pos) => self.frames.insert(pos, frame),
        }
    }

    /// Look up a frame by index.
    pub fn frame(&self, index: u32) -> Option<&StoryboardFrame> {
        self.frames
            .binary_search_by_key(&index, |f| f.frame)
            .ok()
            .map(|pos| &self.frames[pos])
    }

    /// Drop every frame, keeping run metadata.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Change the frame count (frames beyond it are discarded).
    pub fn set_total_frames(&mut self, total_frames: u32) {
        self.total_frames = total_frames;
        self.frames.retain(|f| f.frame <= total_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_error::FrameErrorKind;

    #[test]
    fn outcome_prefers_stopped() {
        let err = FrameError::new(2, FrameStage::Text, FrameErrorKind::Cancelled { attempts: 1 });
        let summary = RunSummary::new("r", 5, 1, vec![err], true);
        assert_eq!(*summary.outcome(), RunOutcome::Stopped);
    }

    #[test]
    fn outcome_counts_errors() {
        let err = FrameError::new(
            3,
            FrameStage::Image,
            FrameErrorKind::Exhausted {
                attempts: 3,
                last_error: "503".into(),
            },
        );
        let summary = RunSummary::new("r", 5, 4, vec![err], false);
        assert_eq!(summary.outcome().to_string(), "completed with 1 errors");
        assert_eq!(summary.failed_frames(), vec![(3, FrameStage::Image)]);
        assert!(!summary.is_success());
    }

    #[test]
    fn upsert_replaces_existing_frame() {
        let mut board = Storyboard::new("r", "s", 2);
        let mut details = FrameResult::default();
        board.upsert(StoryboardFrame {
            frame: 1,
            details: details.clone(),
            source: FrameSource::Parsed,
            image: None,
        });
        details.title = "Regenerated".into();
        board.upsert(StoryboardFrame {
            frame: 1,
            details,
            source: FrameSource::Parsed,
            image: None,
        });
        assert_eq!(board.frames().len(), 1);
        assert_eq!(board.frame(1).unwrap().details.title, "Regenerated");
    }
}
