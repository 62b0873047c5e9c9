//! Run-scoped narrative state.
//!
//! Everything that must persist across the frames of one run lives in a single
//! [`StoryRunState`] owned by the driver and lent to the pipeline by `&mut`.

use crate::{CameraAllocation, ConsistencyMemory, SceneDiversity, StorySettings};
use std::collections::BTreeMap;
use storyboard_core::Storyboard;
use storyboard_error::{FrameError, FrameStage, StoryError, StoryErrorKind};
use tracing::{debug, info};

/// Progress of one frame through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum FrameStatus {
    /// Not started
    #[default]
    #[display("pending")]
    Pending,
    /// Waiting on the text collaborator
    #[display("text requested")]
    TextRequested,
    /// Text parsed, defaulted and reconciled
    #[display("text validated")]
    TextValidated,
    /// Waiting on the image collaborator
    #[display("image requested")]
    ImageRequested,
    /// Text and image both available
    #[display("complete")]
    Complete,
    /// Gave up at the given stage
    #[display("failed at {}", _0)]
    Failed(FrameStage),
}

/// State of one storyboard run.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct StoryRunState {
    /// Run identifier used as the persistence key
    run_id: String,
    /// Scenario the trackers belong to
    scenario: String,
    /// Frames in the run
    total_frames: u32,
    /// Frame being generated; `None` before start and after completion
    current_frame: Option<u32>,
    /// Per-frame failures, in frame order
    errors: Vec<FrameError>,
    /// Camera angle bookkeeping
    camera: CameraAllocation,
    /// Scene-type bookkeeping
    diversity: SceneDiversity,
    /// Characters, locations and actions so far
    memory: ConsistencyMemory,
    /// Pipeline stage per frame
    statuses: BTreeMap<u32, FrameStatus>,
    /// Frames produced so far
    storyboard: Storyboard,
}

impl StoryRunState {
    /// Fresh state for `scenario`.
    ///
    /// # Errors
    ///
    /// Fails fast on an empty scenario or a zero frame count.
    #[track_caller]
    pub fn new(
        scenario: impl Into<String>,
        total_frames: u32,
        settings: &StorySettings,
    ) -> Result<Self, StoryError> {
        let scenario = scenario.into();
        validate(&scenario, total_frames)?;
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(%run_id, total_frames, "Starting new story run");
        Ok(Self {
            storyboard: Storyboard::new(run_id.clone(), scenario.clone(), total_frames),
            run_id,
            scenario,
            total_frames,
            current_frame: None,
            errors: Vec::new(),
            camera: CameraAllocation::default(),
            diversity: diversity_for(settings),
            memory: ConsistencyMemory::new(),
            statuses: BTreeMap::new(),
        })
    }

    /// Prepare for a run of `scenario`.
    ///
    /// A different scenario discards every tracker and starts a new run id. The
    /// same scenario keeps its run id and consistency memory; camera and scene
    /// allocation start over along with the per-run bookkeeping.
    ///
    /// # Errors
    ///
    /// Fails fast on an empty scenario or a zero frame count.
    #[track_caller]
    pub fn prepare(
        &mut self,
        scenario: &str,
        total_frames: u32,
        settings: &StorySettings,
    ) -> Result<(), StoryError> {
        validate(scenario, total_frames)?;
        if scenario != self.scenario {
            debug!("Scenario changed, resetting trackers");
            *self = Self::new(scenario, total_frames, settings)?;
            return Ok(());
        }

        debug!(run_id = %self.run_id, total_frames, "Resuming story run");
        self.total_frames = total_frames;
        self.current_frame = None;
        self.errors.clear();
        self.statuses.clear();
        self.camera = CameraAllocation::default();
        self.diversity = diversity_for(settings);
        self.storyboard.set_total_frames(total_frames);
        Ok(())
    }

    /// True when `frame` is a valid index for this run.
    pub fn contains(&self, frame: u32) -> bool {
        (1..=self.total_frames).contains(&frame)
    }

    /// Stage reached by `frame`.
    pub fn status(&self, frame: u32) -> FrameStatus {
        self.statuses.get(&frame).copied().unwrap_or_default()
    }

    /// Frames that reached [`FrameStatus::Complete`].
    pub fn completed_frames(&self) -> u32 {
        self.statuses
            .values()
            .filter(|status| **status == FrameStatus::Complete)
            .count() as u32
    }

    pub(crate) fn set_status(&mut self, frame: u32, status: FrameStatus) {
        debug!(frame, %status, "Frame status");
        self.statuses.insert(frame, status);
    }

    pub(crate) fn set_current_frame(&mut self, frame: Option<u32>) {
        self.current_frame = frame;
    }

    /// Record a failure, replacing any earlier failure of the same frame.
    pub(crate) fn record_error(&mut self, error: FrameError) {
        self.clear_error(error.frame);
        let at = self.errors.partition_point(|e| e.frame < error.frame);
        self.errors.insert(at, error);
    }

    pub(crate) fn clear_error(&mut self, frame: u32) {
        self.errors.retain(|e| e.frame != frame);
    }

    pub(crate) fn camera_mut(&mut self) -> &mut CameraAllocation {
        &mut self.camera
    }

    pub(crate) fn diversity_mut(&mut self) -> &mut SceneDiversity {
        &mut self.diversity
    }

    pub(crate) fn memory_mut(&mut self) -> &mut ConsistencyMemory {
        &mut self.memory
    }

    pub(crate) fn storyboard_mut(&mut self) -> &mut Storyboard {
        &mut self.storyboard
    }
}

#[track_caller]
fn validate(scenario: &str, total_frames: u32) -> Result<(), StoryError> {
    if scenario.trim().is_empty() {
        return Err(StoryError::new(StoryErrorKind::EmptyScenario));
    }
    if total_frames == 0 {
        return Err(StoryError::new(StoryErrorKind::InvalidFrameCount(total_frames)));
    }
    Ok(())
}

fn diversity_for(settings: &StorySettings) -> SceneDiversity {
    match settings.seed {
        Some(seed) => SceneDiversity::seeded(
            &settings.theme,
            settings.required_elements.clone(),
            settings.tone(),
            seed,
        ),
        None => SceneDiversity::new(
            &settings.theme,
            settings.required_elements.clone(),
            settings.tone(),
        ),
    }
}
