//! Story phase state machine.
//!
//! Maps a frame's position in the run to a narrative phase and an advisory
//! tension value. Thresholds are checked in ascending order and the final frame
//! is always a resolution frame, so every run has an explicit ending regardless
//! of floating-point rounding.

use storyboard_core::{Phase, PhaseContext};
use storyboard_error::{StoryError, StoryErrorKind};
use strum::IntoEnumIterator;

/// Classify frame `frame` (1-based) of a `total_frames` run.
///
/// # Errors
///
/// Fails fast when `total_frames` is zero or `frame` is outside `1..=total_frames`.
///
/// # Examples
///
/// ```
/// use storyboard_core::Phase;
/// use storyboard_narrative::classify;
///
/// let first = classify(1, 8).unwrap();
/// assert_eq!(*first.phase(), Phase::Setup);
///
/// let last = classify(8, 8).unwrap();
/// assert_eq!(*last.phase(), Phase::Resolution);
/// assert_eq!(*last.tension(), 0.0);
/// ```
#[track_caller]
pub fn classify(frame: u32, total_frames: u32) -> Result<PhaseContext, StoryError> {
    if total_frames == 0 {
        return Err(StoryError::new(StoryErrorKind::InvalidFrameCount(total_frames)));
    }
    if frame == 0 || frame > total_frames {
        return Err(StoryError::new(StoryErrorKind::FrameOutOfRange {
            frame,
            total: total_frames,
        }));
    }

    let progress = frame as f64 / total_frames as f64;
    let phase = if frame == total_frames {
        Phase::Resolution
    } else {
        phase_for_progress(progress)
    };

    Ok(PhaseContext::new(
        frame,
        total_frames,
        phase,
        progress,
        tension(progress),
    ))
}

/// First phase whose threshold covers `progress`.
pub fn phase_for_progress(progress: f64) -> Phase {
    Phase::iter()
        .find(|phase| progress <= phase.threshold())
        .unwrap_or(Phase::Resolution)
}

/// Advisory tension curve over progress.
///
/// Rises linearly to 1 at the midpoint, falls to 0.5 by 75%, then falls to 0
/// at completion.
pub fn tension(progress: f64) -> f64 {
    let value = if progress < 0.5 {
        2.0 * progress
    } else if progress < 0.75 {
        2.0 - 2.0 * progress
    } else {
        2.0 * (1.0 - progress)
    };
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_frame_is_always_resolution() {
        for total in 1..=200 {
            let ctx = classify(total, total).unwrap();
            assert_eq!(*ctx.phase(), Phase::Resolution, "total = {total}");
        }
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(*classify(1, 4).unwrap().phase(), Phase::Setup);
        assert_eq!(*classify(2, 4).unwrap().phase(), Phase::Confrontation);
        assert_eq!(*classify(3, 4).unwrap().phase(), Phase::Confrontation);
        assert_eq!(*classify(4, 4).unwrap().phase(), Phase::Resolution);
        assert_eq!(*classify(8, 10).unwrap().phase(), Phase::Resolution);
    }

    #[test]
    fn single_frame_run_is_resolution() {
        let ctx = classify(1, 1).unwrap();
        assert_eq!(*ctx.phase(), Phase::Resolution);
        assert!(ctx.is_final());
    }

    #[test]
    fn tension_is_piecewise() {
        assert_eq!(tension(0.25), 0.5);
        assert_eq!(tension(0.5), 1.0);
        assert_eq!(tension(0.6), 2.0 - 1.2);
        assert_eq!(tension(0.75), 0.5);
        assert_eq!(tension(1.0), 0.0);
    }

    #[test]
    fn rejects_invalid_indices() {
        assert_eq!(
            classify(1, 0).unwrap_err().kind,
            StoryErrorKind::InvalidFrameCount(0)
        );
        assert_eq!(
            classify(0, 3).unwrap_err().kind,
            StoryErrorKind::FrameOutOfRange { frame: 0, total: 3 }
        );
        assert!(classify(4, 3).is_err());
    }
}
