//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyboard binary.

mod commands;
mod observer;
mod plan;
mod run;
mod show;
mod variants;

pub use commands::{Cli, Commands, OutputFormat};
pub use observer::ConsoleObserver;
pub use plan::plan_storyboard;
pub use run::run_storyboard;
pub use show::show_storyboard;
pub use variants::render_image_variants;

use std::path::Path;
use storyboard::{StoryboardConfig, StoryboardResult};

/// Load the layered configuration, with `path` on top when given.
pub fn load_config(path: Option<&Path>) -> StoryboardResult<StoryboardConfig> {
    let config = match path {
        Some(path) => StoryboardConfig::from_file(path)?,
        None => StoryboardConfig::load()?,
    };
    tracing::debug!(
        text_model = %config.models.text,
        image_model = %config.models.image,
        "Configuration loaded"
    );
    Ok(config)
}
