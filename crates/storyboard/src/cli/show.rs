//! Saved storyboard display.

use super::OutputFormat;
use super::run::print_frames;
use std::path::Path;
use storyboard::{FileStore, StoryboardResult, load_storyboard};

/// Load the storyboard saved under `run_id` in `dir` and print it.
pub async fn show_storyboard(run_id: &str, dir: &Path, format: OutputFormat) -> StoryboardResult<()> {
    let store = FileStore::new(dir)?;
    let board = load_storyboard(&store, run_id).await?;
    tracing::debug!(run_id, frames = board.frames().len(), "Storyboard loaded");

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&board).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!("Storyboard {}", board.run_id());
            println!("Scenario: {}", board.scenario());
            println!("Created: {}", board.created_at().format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "Frames: {} of {}",
                board.frames().len(),
                board.total_frames()
            );
            println!();
            print_frames(&board);
        }
    }
    Ok(())
}
