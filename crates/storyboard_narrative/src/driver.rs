//! Sequential storyboard driver.

use crate::{FrameFailure, FrameGenerator, StoryRunState, plan_frame};
use std::sync::Arc;
use storyboard_core::{RunSummary, Storyboard, StoryboardFrame};
use storyboard_error::{StoryError, StoryErrorKind, StoryboardResult};
use storyboard_interface::{NullObserver, ProgressObserver};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Drives frames `1..=N` through the pipeline, one at a time.
///
/// A failed frame is recorded and the run moves on. The stop signal is checked
/// before every frame and observed inside the retry harness; a stopped run
/// reports [`storyboard_core::RunOutcome::Stopped`].
pub struct StoryboardDriver {
    generator: FrameGenerator,
    observer: Arc<dyn ProgressObserver>,
    state: Option<StoryRunState>,
}

impl std::fmt::Debug for StoryboardDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryboardDriver")
            .field("generator", &self.generator)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl StoryboardDriver {
    /// Create a driver with no observer.
    pub fn new(generator: FrameGenerator) -> Self {
        Self {
            generator,
            observer: Arc::new(NullObserver),
            state: None,
        }
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The frame generator.
    pub fn generator(&self) -> &FrameGenerator {
        &self.generator
    }

    /// State of the current or last run.
    pub fn state(&self) -> Option<&StoryRunState> {
        self.state.as_ref()
    }

    /// Frames produced so far, in order.
    pub fn storyboard(&self) -> Option<&Storyboard> {
        self.state.as_ref().map(StoryRunState::storyboard)
    }

    /// Generate `total_frames` frames for `scenario`.
    ///
    /// Running the same scenario again resumes its trackers; a new scenario
    /// starts from scratch.
    ///
    /// # Errors
    ///
    /// Fails fast, before any external call, on an empty scenario or a zero
    /// frame count. Frame failures are reported in the summary, not as errors.
    #[instrument(skip(self, scenario, stop))]
    pub async fn run(
        &mut self,
        scenario: &str,
        total_frames: u32,
        stop: &CancellationToken,
    ) -> StoryboardResult<RunSummary> {
        let settings = &self.generator.config().story;
        let mut state = match self.state.take() {
            Some(mut state) => match state.prepare(scenario, total_frames, settings) {
                Ok(()) => state,
                Err(e) => {
                    self.state = Some(state);
                    return Err(e.into());
                }
            },
            None => StoryRunState::new(scenario, total_frames, settings)?,
        };
        info!(run_id = %state.run_id(), total_frames, "Storyboard run started");

        let summary = self.drive(&mut state, stop).await;
        self.state = Some(state);
        let summary = summary?;
        info!(
            outcome = %summary.outcome(),
            completed = summary.completed_frames(),
            "Storyboard run finished"
        );
        Ok(summary)
    }

    async fn drive(
        &self,
        state: &mut StoryRunState,
        stop: &CancellationToken,
    ) -> StoryboardResult<RunSummary> {
        let total_frames = *state.total_frames();
        let mut completed = 0;
        let mut stopped = false;

        for frame in 1..=total_frames {
            if stop.is_cancelled() {
                warn!(frame, "Stop requested, ending run");
                stopped = true;
                break;
            }
            state.set_current_frame(Some(frame));

            let plan = plan_frame(state, frame)?;
            match self.generator.generate_frame(state, plan, stop).await {
                Ok(output) => {
                    completed += 1;
                    self.observer
                        .on_frame(frame, &output.details, Some(&output.image));
                    state.storyboard_mut().upsert(output.into());
                }
                Err(failure) => {
                    stopped = failure.error.is_cancelled();
                    record_failure(state, self.observer.as_ref(), failure);
                }
            }
            self.observer.on_progress(frame, total_frames);
            if stopped {
                warn!(frame, "Run cancelled during frame");
                break;
            }
        }

        state.set_current_frame(None);
        Ok(RunSummary::new(
            state.run_id().clone(),
            total_frames,
            completed,
            state.errors().clone(),
            stopped,
        ))
    }

    /// Re-run the pipeline for one frame, reusing the run's trackers.
    ///
    /// Any earlier failure of the frame is replaced by the new outcome.
    ///
    /// # Errors
    ///
    /// Fails fast if no run has started or `frame` is outside the run. A frame
    /// failure is returned as `Ok(Err(..))`.
    #[instrument(skip(self, stop))]
    pub async fn regenerate_frame(
        &mut self,
        frame: u32,
        stop: &CancellationToken,
    ) -> StoryboardResult<Result<StoryboardFrame, FrameFailure>> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| StoryError::new(StoryErrorKind::FrameNotGenerated(frame)))?;
        let plan = plan_frame(state, frame)?;
        state.clear_error(frame);

        match self.generator.generate_frame(state, plan, stop).await {
            Ok(output) => {
                self.observer
                    .on_frame(frame, &output.details, Some(&output.image));
                let generated: StoryboardFrame = output.into();
                state.storyboard_mut().upsert(generated.clone());
                info!(frame, "Frame regenerated");
                Ok(Ok(generated))
            }
            Err(failure) => {
                record_failure(state, self.observer.as_ref(), failure.clone());
                Ok(Err(failure))
            }
        }
    }
}

fn record_failure(
    state: &mut StoryRunState,
    observer: &dyn ProgressObserver,
    failure: FrameFailure,
) {
    observer.on_frame_error(&failure.error);
    if let Some(partial) = failure.partial {
        observer.on_frame(partial.frame, &partial.details, None);
        state.storyboard_mut().upsert(partial);
    }
    state.record_error(failure.error);
}
