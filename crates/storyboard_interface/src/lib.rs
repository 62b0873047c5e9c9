//! Trait definitions for the storyboard generation engine.
//!
//! The engine never talks to a provider, a rendering surface or a storage medium
//! directly. It calls through the traits in this crate, which the binary (or a
//! test) implements.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageGenerator, NullObserver, ProgressObserver, StoryboardStore, TextGenerator};
