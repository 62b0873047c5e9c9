//! Core data types for the storyboard generation engine.
//!
//! This crate provides the plain data shared by every other storyboard crate:
//! frame text, narrative phases, scene seeds, style templates, collaborator
//! requests and run summaries. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod camera;
mod frame;
mod phase;
mod request;
mod run;
mod scene;
mod style;

pub use camera::{CAMERA_ANGLES, DEFAULT_CAMERA_ANGLE, PRIORITY_ANGLES};
pub use frame::{FrameField, FrameResult, FrameResultBuilder};
pub use phase::{CameraPhase, Phase, PhaseContext};
pub use request::{
    GeneratedImage, ImageFlags, ImageHandle, ImageRequest, ImageRequestBuilder, TextRequest,
    TextRequestBuilder, TextResponse,
};
pub use run::{FrameSource, LocationChange, RunOutcome, RunSummary, Storyboard, StoryboardFrame};
pub use scene::{SceneArchetype, SceneSeed, ToneSettings};
pub use style::{AspectRatio, DEFAULT_NEGATIVE_PROMPT, StyleTemplate, merge_negative_prompt};
