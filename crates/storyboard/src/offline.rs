//! Deterministic local collaborators.
//!
//! These stand in for the remote text and image services so a full run can be
//! exercised without network access. Text is synthesised from the frame prompt;
//! images are SVG placeholder cards.

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use storyboard_core::{GeneratedImage, ImageRequest, TextRequest, TextResponse};
use storyboard_error::{CollaboratorError, CollaboratorErrorKind};
use storyboard_interface::{ImageGenerator, TextGenerator};
use tracing::debug;

/// Text collaborator that builds frame JSON from the cues in its prompt.
#[derive(Debug, Clone)]
pub struct OfflineText {
    cues: Vec<(Cue, Regex)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Frame,
    Phase,
    Camera,
    Scenario,
    SceneType,
    Beat,
    Characters,
    Location,
}

const CUE_PATTERNS: &[(Cue, &str)] = &[
    (Cue::Frame, r"Frame #(\d+) of \d+"),
    (Cue::Phase, r"(?m)^Phase: (.+)$"),
    (Cue::Camera, r#"Camera angle must be: "([^"]+)""#),
    (Cue::Scenario, r"(?m)^Original Scenario: (.+)$"),
    (Cue::SceneType, r"(?m)^Scene Type: (.+)$"),
    (Cue::Beat, r"(?m)^Scene Beat: (.+)$"),
    (Cue::Characters, r"(?m)^- Base characters: (.+)$"),
    (Cue::Location, r"(?m)^- Current location: (.+)$"),
];

impl OfflineText {
    /// Create the collaborator.
    pub fn new() -> Self {
        let cues = CUE_PATTERNS
            .iter()
            .filter_map(|(cue, pattern)| Regex::new(pattern).ok().map(|re| (*cue, re)))
            .collect();
        Self { cues }
    }

    fn cue<'a>(&self, cue: Cue, prompt: &'a str) -> Option<&'a str> {
        let (_, re) = self.cues.iter().find(|(c, _)| *c == cue)?;
        let value = re.captures(prompt)?.get(1)?.as_str().trim();
        match value {
            "" | "None yet" | "Unknown" => None,
            value => Some(value),
        }
    }

    /// Frame text for `prompt`.
    fn synthesise(&self, prompt: &str) -> serde_json::Value {
        let frame = self.cue(Cue::Frame, prompt).unwrap_or("1");
        let phase = self.cue(Cue::Phase, prompt).unwrap_or("setup");
        let scenario = self.cue(Cue::Scenario, prompt).unwrap_or("the story");
        let scene = self.cue(Cue::SceneType, prompt).unwrap_or("scene");
        let beat = self.cue(Cue::Beat, prompt).unwrap_or("a quiet moment");
        let camera = self.cue(Cue::Camera, prompt).unwrap_or("medium shot");
        let characters = self
            .cue(Cue::Characters, prompt)
            .unwrap_or("The protagonist, in plain travelling clothes");
        let location = self
            .cue(Cue::Location, prompt)
            .unwrap_or("The place where the story begins");
        let emotion = match phase {
            "setup" => "Curious",
            "confrontation" => "Tense",
            _ => "Relieved",
        };

        json!({
            "title": format!("Frame {frame}: {}", capitalise(beat)),
            "action": format!("In a {scene} scene, the story reaches {beat}"),
            "background": format!("Details of {location}, lit to suit the {phase}"),
            "characters": characters,
            "location": location,
            "camera": camera,
            "emotion": emotion,
            "narration": format!("Frame {frame} carries {scenario} through its {phase}"),
            "storyProgress": capitalise(beat),
            "characterPlacement": "The main character holds the centre of the frame",
            "positioningMovement": format!("Movement follows the {camera}"),
        })
    }
}

impl Default for OfflineText {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl TextGenerator for OfflineText {
    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, CollaboratorError> {
        debug!(model = %request.model(), "Synthesising frame text offline");
        Ok(TextResponse::Json(self.synthesise(request.prompt())))
    }

    fn provider_name(&self) -> &'static str {
        "offline"
    }
}

/// Image collaborator that renders an SVG card labelled with model and seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineImage;

impl OfflineImage {
    /// Create the collaborator.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageGenerator for OfflineImage {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, CollaboratorError> {
        if request.prompt().trim().is_empty() {
            return Err(CollaboratorError::new(
                CollaboratorErrorKind::MalformedRequest("empty image prompt".to_string()),
            ));
        }
        let (width, height) = (*request.width(), *request.height());
        let colour = request.seed() % 0x0100_0000;
        let svg = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect width="100%" height="100%" fill="#{colour:06x}"/><text x="50%" y="50%" font-family="sans-serif" font-size="48" text-anchor="middle" fill="#ffffff">{model} / seed {seed}</text></svg>"##,
            model = request.model(),
            seed = request.seed(),
        );
        Ok(GeneratedImage::new(svg.into_bytes(), "image/svg+xml"))
    }

    fn provider_name(&self) -> &'static str {
        "offline"
    }
}
