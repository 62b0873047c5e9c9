//! Progress reporting on stderr.

use storyboard::{FrameError, FrameResult, ImageHandle, ProgressObserver};

/// Prints one line per progress event to stderr, keeping stdout for results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn on_progress(&self, completed: u32, total: u32) {
        eprintln!("[{}/{}]", completed, total);
    }

    fn on_frame(&self, frame: u32, result: &FrameResult, image: Option<&ImageHandle>) {
        match image {
            Some(image) => eprintln!(
                "  frame {}: {} ({}, {} bytes)",
                frame,
                result.title,
                image.model(),
                image.len()
            ),
            None => eprintln!("  frame {}: {} (no image)", frame, result.title),
        }
    }

    fn on_frame_error(&self, error: &FrameError) {
        eprintln!("  {}", error);
    }
}
