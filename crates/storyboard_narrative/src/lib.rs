//! Narrative continuity and frame orchestration for storyboard generation.
//!
//! This crate turns a scenario into an ordered storyboard. For every frame it
//! classifies the story phase, allocates a camera angle and scene seed, asks the
//! text collaborator for structured frame text, reconciles that text with what
//! earlier frames established, and renders an image.
//!
//! # Components
//!
//! - [`classify`]: story phase state machine
//! - [`CameraAllocation`] and [`SceneDiversity`]: variety across frames
//! - [`ConsistencyMemory`]: baseline characters and location history
//! - [`FrameGenerator`]: the per-frame pipeline
//! - [`StoryboardDriver`]: sequential runs, stop handling and regeneration
//! - [`StoryboardConfig`]: layered TOML configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyboard_narrative::{FrameGenerator, StoryboardConfig, StoryboardDriver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(text: Arc<dyn storyboard_interface::TextGenerator>,
//! #                  image: Arc<dyn storyboard_interface::ImageGenerator>)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryboardConfig::load()?;
//! let mut driver = StoryboardDriver::new(FrameGenerator::new(text, image, config));
//!
//! let summary = driver.run("A courier crosses a flooded city", 6, &CancellationToken::new()).await?;
//! println!("{}", summary.outcome());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod consistency;
mod diversity;
mod driver;
mod extraction;
mod phase;
mod pipeline;
mod prompt;
mod state;
mod store;

pub use batch::{VariantResult, render_variants};
pub use config::{
    DEFAULT_IMAGE_MODEL, ImageSettings, ModelSettings, PoolSettings, RetrySettings,
    StoryboardConfig, StorySettings,
};
pub use consistency::ConsistencyMemory;
pub use diversity::{CameraAllocation, SceneDiversity, intensity};
pub use driver::StoryboardDriver;
pub use extraction::{ParsedFrame, extract_json, fallback_frame, parse_frame};
pub use phase::{classify, phase_for_progress, tension};
pub use pipeline::{FrameFailure, FrameGenerator, FrameOutput, FramePlan, plan_frame, render};
pub use prompt::{SYSTEM_PROMPT, diversity_prompt, image_prompt, negative_prompt, text_prompt};
pub use state::{FrameStatus, StoryRunState};
pub use store::{FileStore, InMemoryStore, load_storyboard, save_storyboard};
