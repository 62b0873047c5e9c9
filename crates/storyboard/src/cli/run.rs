//! Storyboard generation command handler.

use super::{ConsoleObserver, OutputFormat};
use std::path::Path;
use std::sync::Arc;
use storyboard::{
    FileStore, FrameGenerator, OfflineImage, OfflineText, RunSummary, Storyboard,
    StoryboardConfig, StoryboardDriver, StoryboardResult, save_storyboard,
};
use tokio_util::sync::CancellationToken;

/// Generate a storyboard with the offline collaborators.
///
/// Ctrl-C stops the run after the attempt in flight; frames finished so far are
/// kept and saved.
#[tracing::instrument(skip(config, scenario, save))]
pub async fn run_storyboard(
    config: StoryboardConfig,
    scenario: &str,
    frames: u32,
    save: Option<&Path>,
    format: OutputFormat,
) -> StoryboardResult<RunSummary> {
    let generator = FrameGenerator::new(
        Arc::new(OfflineText::new()),
        Arc::new(OfflineImage::new()),
        config,
    );
    let mut driver = StoryboardDriver::new(generator).with_observer(Arc::new(ConsoleObserver));

    let stop = CancellationToken::new();
    let signal = stop.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current attempt");
            signal.cancel();
        }
    });

    let summary = driver.run(scenario, frames, &stop).await;
    interrupt.abort();
    let summary = summary?;

    if let (Some(dir), Some(board)) = (save, driver.storyboard()) {
        let store = FileStore::new(dir)?;
        save_storyboard(&store, board).await?;
        tracing::info!(run_id = %board.run_id(), dir = %dir.display(), "Storyboard saved");
    }

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "summary": &summary,
                "storyboard": driver.storyboard(),
            });
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        OutputFormat::Human => {
            print_summary(&summary);
            if let Some(board) = driver.storyboard() {
                print_frames(board);
            }
        }
    }

    Ok(summary)
}

/// Print the outcome and any failed frames.
pub fn print_summary(summary: &RunSummary) {
    println!("\nStoryboard Run Summary:");
    println!("=======================");
    println!("Run: {}", summary.run_id());
    println!("Outcome: {}", summary.outcome());
    println!(
        "Frames completed: {} of {}",
        summary.completed_frames(),
        summary.total_frames()
    );
    for error in summary.errors() {
        println!("  {}", error);
    }
    println!();
}

/// Print each frame's text and image details.
pub fn print_frames(board: &Storyboard) {
    for frame in board.frames() {
        let details = &frame.details;
        println!("Frame {}: {} [{}]", frame.frame, details.title, frame.source);
        println!("  Camera: {}", details.camera);
        println!("  Location: {}", details.location);
        println!("  Characters: {}", details.characters);
        println!("  Action: {}", details.action);
        println!("  Emotion: {}", details.emotion);
        match &frame.image {
            Some(image) => println!(
                "  Image: {} seed {} ({}x{}, {})",
                image.model(),
                image.seed(),
                image.width(),
                image.height(),
                image.mime()
            ),
            None => println!("  Image: none"),
        }
        println!();
    }
}
