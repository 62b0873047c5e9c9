//! Storyboard - narrative-consistent storyboard generation
//!
//! Storyboard turns a free-text scenario into an ordered sequence of frames, each
//! with structured story text and a rendered image, while keeping characters,
//! locations and pacing coherent across the whole sequence. Unreliable text and
//! image services are called through a retry harness with per-model fallbacks,
//! and one failed frame never stops the rest of the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyboard::{FrameGenerator, OfflineImage, OfflineText, StoryboardConfig, StoryboardDriver};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = FrameGenerator::new(
//!         Arc::new(OfflineText::new()),
//!         Arc::new(OfflineImage::new()),
//!         StoryboardConfig::load()?,
//!     );
//!     let mut driver = StoryboardDriver::new(generator);
//!
//!     let summary = driver
//!         .run("A courier crosses a flooded city", 6, &CancellationToken::new())
//!         .await?;
//!     println!("{}", summary.outcome());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - OpenTelemetry span export alongside the log output
//!
//! # Architecture
//!
//! Storyboard is organized as a workspace with focused crates:
//!
//! - `storyboard_error` - Error types
//! - `storyboard_core` - Frames, phases, scene seeds, styles and requests
//! - `storyboard_interface` - Collaborator, observer and store traits
//! - `storyboard_retry` - Retry harness and bounded worker pool
//! - `storyboard_narrative` - Continuity tracking, prompts, pipeline and driver
//!
//! This crate re-exports everything for convenience and adds offline
//! collaborators plus logging setup for the `storyboard` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;
mod offline;

pub use observability::{ObservabilityConfig, init_observability, shutdown_observability};
pub use offline::{OfflineImage, OfflineText};

// Re-export the workspace crates
pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_narrative::*;
pub use storyboard_retry::*;
