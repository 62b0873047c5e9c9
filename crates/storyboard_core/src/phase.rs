//! Narrative phases and the per-frame context derived from them.

use serde::{Deserialize, Serialize};

/// Narrative stage of a frame.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Introduce the world and characters
    #[display("setup")]
    Setup,
    /// Raise and develop the conflict
    #[display("confrontation")]
    Confrontation,
    /// Conclude the story
    #[display("resolution")]
    Resolution,
}

impl Phase {
    /// Upper progress bound (inclusive) for this phase.
    pub fn threshold(self) -> f64 {
        match self {
            Phase::Setup => 0.25,
            Phase::Confrontation => 0.75,
            Phase::Resolution => 1.0,
        }
    }

    /// Generation instructions for frames in this phase.
    pub fn instructions(self) -> &'static str {
        match self {
            Phase::Setup => {
                "Introduce the detailed story world including any necessary elements and introduce detailed characters with comprehensive descriptions (appearance, personality, abilities, colors, etc.), including side-characters if needed. Ensure locations are described consistently and chronologically. If this is frame 1, define main characters in detail & setting."
            }
            Phase::Confrontation => {
                "Raise conflict and develop the storyline. Possibly change location if logical. Maintain consistency with prior frames and develop characters' interactions."
            }
            Phase::Resolution => {
                "Conclude or wrap up the story. Include any logical plot twists. Ensure consistency with prior frames and resolve conflicts introduced during the confrontation phase."
            }
        }
    }
}

/// Finer-grained stage used to pick camera angles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum CameraPhase {
    /// First quarter of the story
    #[display("introduction")]
    Introduction,
    /// Second quarter
    #[display("action")]
    Action,
    /// Third quarter
    #[display("drama")]
    Drama,
    /// Final quarter
    #[display("conclusion")]
    Conclusion,
}

impl CameraPhase {
    /// Bucket story progress into a camera phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::CameraPhase;
    ///
    /// assert_eq!(CameraPhase::from_progress(0.25), CameraPhase::Introduction);
    /// assert_eq!(CameraPhase::from_progress(0.6), CameraPhase::Drama);
    /// assert_eq!(CameraPhase::from_progress(1.0), CameraPhase::Conclusion);
    /// ```
    pub fn from_progress(progress: f64) -> Self {
        if progress <= 0.25 {
            CameraPhase::Introduction
        } else if progress <= 0.5 {
            CameraPhase::Action
        } else if progress <= 0.75 {
            CameraPhase::Drama
        } else {
            CameraPhase::Conclusion
        }
    }

    /// Angles suited to this phase, in preference order.
    pub fn angles(self) -> &'static [&'static str] {
        match self {
            CameraPhase::Introduction => &["wide shot", "establishing shot", "medium shot"],
            CameraPhase::Action => &[
                "tracking shot",
                "dutch angle",
                "POV shot",
                "over-the-shoulder shot",
            ],
            CameraPhase::Drama => &["close-up shot", "extreme close-up", "low angle shot"],
            CameraPhase::Conclusion => &["high angle shot", "bird's eye view", "extreme wide shot"],
        }
    }
}

/// Phase information derived for one frame.
///
/// Immutable once computed; `tension` is advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PhaseContext {
    /// One-based frame index
    frame: u32,
    /// Frames in the run
    total_frames: u32,
    /// Narrative phase
    phase: Phase,
    /// `frame / total_frames`, in (0, 1]
    progress: f64,
    /// Tension signal in [0, 1]
    tension: f64,
}

impl PhaseContext {
    /// Assemble a context from already-derived values.
    pub fn new(frame: u32, total_frames: u32, phase: Phase, progress: f64, tension: f64) -> Self {
        Self {
            frame,
            total_frames,
            phase,
            progress,
            tension,
        }
    }

    /// True for the final frame of the run.
    pub fn is_final(&self) -> bool {
        self.frame == self.total_frames
    }

    /// Camera bucket for this frame's progress.
    pub fn camera_phase(&self) -> CameraPhase {
        CameraPhase::from_progress(self.progress)
    }

    /// Progress rounded to a whole percentage.
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}
