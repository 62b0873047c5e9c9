//! Per-frame generation pipeline.
//!
//! A frame moves through `Pending → TextRequested → TextValidated →
//! ImageRequested → Complete`, or stops at `Failed(stage)`. Each collaborator
//! call runs under the retry harness; fallback models are walked here, one full
//! harness run per model.

use crate::{
    FrameStatus, StoryRunState, StoryboardConfig, classify, diversity_prompt, image_prompt,
    negative_prompt, parse_frame, text_prompt, SYSTEM_PROMPT,
};
use rand::Rng;
use std::sync::Arc;
use storyboard_core::{
    FrameResult, FrameSource, ImageHandle, ImageRequest, PhaseContext, SceneSeed,
    StoryboardFrame, StyleTemplate, TextRequest, TextResponse,
};
use storyboard_error::{
    CollaboratorError, CollaboratorErrorKind, FrameError, FrameStage, RetryError, StoryError,
};
use storyboard_interface::{ImageGenerator, TextGenerator};
use storyboard_retry::RetryHarness;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Everything decided about a frame before any external call.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct FramePlan {
    /// Phase, progress and tension
    context: PhaseContext,
    /// Camera angle the text must use
    camera_angle: String,
    /// Scene-diversity hints
    seed: SceneSeed,
    /// User prompt for the text collaborator
    prompt: String,
}

impl FramePlan {
    /// One-based frame index.
    pub fn frame(&self) -> u32 {
        *self.context.frame()
    }
}

/// Decide phase, camera angle and scene seed for `frame`, and compose its prompt.
///
/// Advances the run's camera and diversity trackers.
///
/// # Errors
///
/// Fails fast when `frame` is outside the run.
pub fn plan_frame(state: &mut StoryRunState, frame: u32) -> Result<FramePlan, StoryError> {
    let context = classify(frame, *state.total_frames())?;
    let camera_angle = state.camera_mut().next_angle(context.camera_phase());
    let seed = state
        .diversity_mut()
        .next_seed(frame, *context.progress(), *context.phase());
    let diversity = diversity_prompt(
        state.scenario(),
        &seed,
        context.percent(),
        &state.diversity().used_types(),
    );
    let prompt = text_prompt(&context, &diversity, state.memory(), &camera_angle);
    debug!(frame, phase = %context.phase(), camera = %camera_angle, "Planned frame");
    Ok(FramePlan {
        context,
        camera_angle,
        seed,
        prompt,
    })
}

/// A fully generated frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// One-based frame index
    pub frame: u32,
    /// Reconciled frame text
    pub details: FrameResult,
    /// Whether the text was parsed or synthesised
    pub source: FrameSource,
    /// Rendered image
    pub image: ImageHandle,
}

impl From<FrameOutput> for StoryboardFrame {
    fn from(output: FrameOutput) -> Self {
        StoryboardFrame {
            frame: output.frame,
            details: output.details,
            source: output.source,
            image: Some(output.image),
        }
    }
}

/// A frame that could not be completed.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFailure {
    /// What failed, and where
    pub error: FrameError,
    /// Text that was already produced when the image stage failed
    pub partial: Option<StoryboardFrame>,
}

/// Generates frames against a text and an image collaborator.
#[derive(Clone)]
pub struct FrameGenerator {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    config: StoryboardConfig,
}

impl std::fmt::Debug for FrameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGenerator")
            .field("text", &self.text.provider_name())
            .field("image", &self.image.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

impl FrameGenerator {
    /// Create a generator.
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        config: StoryboardConfig,
    ) -> Self {
        Self {
            text,
            image,
            config,
        }
    }

    /// Configuration in force.
    pub fn config(&self) -> &StoryboardConfig {
        &self.config
    }

    /// The image collaborator.
    pub fn image_generator(&self) -> Arc<dyn ImageGenerator> {
        Arc::clone(&self.image)
    }

    /// Run the text and image stages for a planned frame.
    ///
    /// On image failure the reconciled text is returned in
    /// [`FrameFailure::partial`]; consistency memory has already absorbed it.
    #[instrument(
        skip(self, state, plan, stop),
        fields(frame = plan.frame(), phase = %plan.context().phase())
    )]
    pub async fn generate_frame(
        &self,
        state: &mut StoryRunState,
        plan: FramePlan,
        stop: &CancellationToken,
    ) -> Result<FrameOutput, FrameFailure> {
        let frame = plan.frame();
        state.set_status(frame, FrameStatus::Pending);

        state.set_status(frame, FrameStatus::TextRequested);
        let response = match self.request_text(plan.prompt(), stop).await {
            Ok(response) => response,
            Err(err) => {
                let error = FrameError::from_retry(frame, FrameStage::Text, &err);
                error!(frame, error = %error, "Text stage failed");
                state.set_status(frame, FrameStatus::Failed(FrameStage::Text));
                return Err(FrameFailure {
                    error,
                    partial: None,
                });
            }
        };

        let parsed = parse_frame(&response, plan.prompt());
        let source = parsed.source();
        let mut details = parsed.into_frame();
        state.memory_mut().record_frame(frame, &mut details);
        state.set_status(frame, FrameStatus::TextValidated);
        debug!(frame, %source, title = %details.title, "Frame text ready");

        state.set_status(frame, FrameStatus::ImageRequested);
        match self.request_image(&details, stop).await {
            Ok(image) => {
                state.set_status(frame, FrameStatus::Complete);
                info!(frame, model = %image.model(), bytes = image.len(), "Frame complete");
                Ok(FrameOutput {
                    frame,
                    details,
                    source,
                    image,
                })
            }
            Err(err) => {
                let error = FrameError::from_retry(frame, FrameStage::Image, &err);
                error!(frame, error = %error, "Image stage failed");
                state.set_status(frame, FrameStatus::Failed(FrameStage::Image));
                Err(FrameFailure {
                    error,
                    partial: Some(StoryboardFrame {
                        frame,
                        details,
                        source,
                        image: None,
                    }),
                })
            }
        }
    }

    /// Walk the text model chain until one model answers.
    async fn request_text(
        &self,
        prompt: &str,
        stop: &CancellationToken,
    ) -> Result<TextResponse, RetryError<CollaboratorError>> {
        let harness = RetryHarness::new(self.config.retry.text.clone(), stop.clone());
        let models = self.config.models.text_chain();
        let mut last = None;

        for model in models {
            let request = TextRequest::new(SYSTEM_PROMPT, prompt, model.as_str());
            let text = self.text.as_ref();
            let request = &request;
            let result = harness
                .run("text", move || async move {
                    let response = text.generate(request).await?;
                    match &response {
                        TextResponse::Text(text) if text.trim().is_empty() => Err(
                            CollaboratorError::new(CollaboratorErrorKind::EmptyResponse),
                        ),
                        _ => Ok(response),
                    }
                })
                .await;
            match result {
                Ok(response) => return Ok(response),
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    warn!(%model, error = %err, "Text model failed, trying next");
                    last = Some(err);
                }
            }
        }

        Err(last.unwrap_or_else(no_models))
    }

    /// Walk the image model chain until one model renders.
    async fn request_image(
        &self,
        details: &FrameResult,
        stop: &CancellationToken,
    ) -> Result<ImageHandle, RetryError<CollaboratorError>> {
        let settings = &self.config.image;
        let style = StyleTemplate::lookup(&settings.style);
        let negative = negative_prompt(&settings.negative_prompt, style);
        let prompt = image_prompt(details, style, &negative);
        let (width, height) = settings.dimensions();
        let seed = settings
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..1_000_000_000));

        let harness = RetryHarness::new(self.config.retry.image.clone(), stop.clone());
        let mut last = None;

        for model in self.config.models.image_chain(&self.config.models.image) {
            let request = ImageRequest::new(prompt.as_str(), model.as_str())
                .with_width(width)
                .with_height(height)
                .with_seed(seed)
                .with_flags(settings.flags);
            let image = self.image.as_ref();
            let request = &request;
            let result = harness.run("image", move || render(image, request)).await;
            match result {
                Ok(handle) => return Ok(handle),
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    warn!(%model, error = %err, "Image model failed, trying next");
                    last = Some(err);
                }
            }
        }

        Err(last.unwrap_or_else(no_models))
    }
}

/// Render one image request, treating an empty payload as a transient failure.
pub async fn render(
    image: &dyn ImageGenerator,
    request: &ImageRequest,
) -> Result<ImageHandle, CollaboratorError> {
    let generated = image.generate(request).await?;
    if generated.is_empty() {
        return Err(CollaboratorError::new(CollaboratorErrorKind::EmptyResponse));
    }
    Ok(ImageHandle::new(request, generated))
}

fn no_models() -> RetryError<CollaboratorError> {
    RetryError::new(storyboard_error::RetryErrorKind::Rejected {
        attempt: 0,
        error: CollaboratorError::new(CollaboratorErrorKind::ModelUnavailable(
            "no models configured".to_string(),
        )),
    })
}
