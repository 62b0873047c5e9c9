//! Scripted collaborators and helpers for storyboard tests.

#![allow(dead_code)]

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyboard_core::{
    FrameResult, GeneratedImage, ImageHandle, ImageRequest, TextRequest, TextResponse,
};
use storyboard_error::{CollaboratorError, FrameError, FrameStage};
use storyboard_interface::{ImageGenerator, ProgressObserver, TextGenerator};
use storyboard_narrative::StoryboardConfig;
use storyboard_retry::RetryPolicy;
use tokio_util::sync::CancellationToken;

/// Characters the first frame establishes.
pub const HERO: &str = "Mira, a courier in a red coat";

/// Bundled configuration with two quick attempts per model and fixed seeds.
pub fn fast_config() -> StoryboardConfig {
    let mut config = StoryboardConfig::bundled().expect("bundled config parses");
    let policy = RetryPolicy::new(2, Duration::from_millis(10), 1.0, Duration::from_secs(5));
    config.retry.text = policy.clone();
    config.retry.image = policy;
    config.story.seed = Some(7);
    config.image.seed = Some(42);
    config
}

/// Frame number from a text prompt's `Frame #N of M` line.
pub fn frame_number(prompt: &str) -> u32 {
    Regex::new(r"Frame #(\d+) of")
        .ok()
        .and_then(|re| re.captures(prompt))
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Text collaborator that answers with frame JSON keyed off the prompt.
///
/// Frame 1 introduces [`HERO`]; later frames try to swap the cast. Frames 1-2
/// are at the harbor and later ones at the lighthouse. `emotion` is never sent.
/// Odd frames come back as structured JSON, even frames as a fenced block.
#[derive(Default)]
pub struct StoryText {
    failing_models: Vec<String>,
    prose: bool,
    requests: Mutex<Vec<(u32, String)>>,
}

impl StoryText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request to one of `models` fails with a 503.
    pub fn failing(models: &[&str]) -> Self {
        Self {
            failing_models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Answers with prose that holds no JSON.
    pub fn prose() -> Self {
        Self {
            prose: true,
            ..Self::default()
        }
    }

    /// Models requested, in call order.
    pub fn models(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Frames requested, in call order.
    pub fn frames(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|(f, _)| *f).collect()
    }
}

#[async_trait]
impl TextGenerator for StoryText {
    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, CollaboratorError> {
        let frame = frame_number(request.prompt());
        let take = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((frame, request.model().clone()));
            requests.iter().filter(|(f, _)| *f == frame).count()
        };

        if self.failing_models.contains(request.model()) {
            return Err(CollaboratorError::http(503, "text service unavailable"));
        }
        if self.prose {
            return Ok(TextResponse::Text(
                "I would love to help with this scene, but here is a poem instead.".into(),
            ));
        }

        let value = json!({
            "title": format!("Shot {frame}"),
            "action": format!("Action {frame} take {take}"),
            "background": "Rain over the docks",
            "characters": if frame == 1 { HERO } else { "A stranger in grey" },
            "location": if frame <= 2 { "Harbor" } else { "Lighthouse" },
            "camera": "wide shot",
            "narration": "The courier keeps moving",
            "storyProgress": "The package changes hands",
            "characterPlacement": "Mira in the foreground",
            "positioningMovement": "Mira walks left to right"
        });
        if frame % 2 == 1 {
            Ok(TextResponse::Json(value))
        } else {
            Ok(TextResponse::Text(format!(
                "Here is the frame:\n```json\n{}\n```",
                serde_json::to_string_pretty(&value).unwrap()
            )))
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted-text"
    }
}

/// Image collaborator that renders three bytes per request.
#[derive(Default)]
pub struct StoryImage {
    fail_titles: Mutex<Vec<String>>,
    fail_seeds: Vec<u64>,
    blank: bool,
    stop_after: Option<(usize, CancellationToken)>,
    requests: Mutex<Vec<ImageRequest>>,
    rendered: AtomicUsize,
}

impl StoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames with one of these titles fail with a 503 until [`Self::heal`].
    pub fn failing_titles(titles: &[&str]) -> Self {
        Self {
            fail_titles: Mutex::new(titles.iter().map(|t| t.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Requests with one of these seeds fail with a 503.
    pub fn failing_seeds(seeds: &[u64]) -> Self {
        Self {
            fail_seeds: seeds.to_vec(),
            ..Self::default()
        }
    }

    /// Every render succeeds with an empty payload.
    pub fn blank() -> Self {
        Self {
            blank: true,
            ..Self::default()
        }
    }

    /// Cancel `stop` once `renders` images have succeeded.
    pub fn stopping_after(renders: usize, stop: CancellationToken) -> Self {
        Self {
            stop_after: Some((renders, stop)),
            ..Self::default()
        }
    }

    /// Stop failing by title.
    pub fn heal(&self) {
        self.fail_titles.lock().unwrap().clear();
    }

    /// Every request received.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose prompt carries `title`.
    pub fn requests_for(&self, title: &str) -> Vec<ImageRequest> {
        let marker = format!("**Title:** {title}.");
        self.requests()
            .into_iter()
            .filter(|r| r.prompt().contains(&marker))
            .collect()
    }
}

#[async_trait]
impl ImageGenerator for StoryImage {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());

        let failing_title = self
            .fail_titles
            .lock()
            .unwrap()
            .iter()
            .any(|t| request.prompt().contains(&format!("**Title:** {t}.")));
        if failing_title || self.fail_seeds.contains(request.seed()) {
            return Err(CollaboratorError::http(503, "image service unavailable"));
        }
        if self.blank {
            return Ok(GeneratedImage::new(Vec::new(), "image/png"));
        }

        let rendered = self.rendered.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, stop)) = &self.stop_after {
            if rendered >= *after {
                stop.cancel();
            }
        }
        Ok(GeneratedImage::new(vec![1, 2, 3], "image/png"))
    }

    fn provider_name(&self) -> &'static str {
        "scripted-image"
    }
}

/// Observer that records every notification.
#[derive(Default)]
pub struct RecordingObserver {
    pub progress: Mutex<Vec<(u32, u32)>>,
    pub frames: Mutex<Vec<(u32, bool)>>,
    pub errors: Mutex<Vec<(u32, FrameStage)>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, completed: u32, total: u32) {
        self.progress.lock().unwrap().push((completed, total));
    }

    fn on_frame(&self, frame: u32, _result: &FrameResult, image: Option<&ImageHandle>) {
        self.frames.lock().unwrap().push((frame, image.is_some()));
    }

    fn on_frame_error(&self, error: &FrameError) {
        self.errors.lock().unwrap().push((error.frame, error.stage));
    }
}
