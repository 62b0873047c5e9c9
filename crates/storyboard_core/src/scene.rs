//! Scene archetypes, tone and per-frame scene seeds.

use crate::Phase;
use serde::{Deserialize, Serialize};

/// Broad kind of scene a frame should depict.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SceneArchetype {
    /// Physical conflict and movement
    #[display("action")]
    Action,
    /// Character-driven moments
    #[display("drama")]
    Drama,
    /// Movement between story states
    #[display("transition")]
    Transition,
    /// Mood pieces
    #[display("atmosphere")]
    Atmosphere,
}

impl SceneArchetype {
    /// Example beats belonging to this archetype.
    pub fn beats(self) -> &'static [&'static str] {
        match self {
            SceneArchetype::Action => &["chase", "confrontation", "escape", "battle", "rescue"],
            SceneArchetype::Drama => &["revelation", "decision", "conversation", "reflection", "loss"],
            SceneArchetype::Transition => &[
                "journey",
                "discovery",
                "transformation",
                "aftermath",
                "preparation",
            ],
            SceneArchetype::Atmosphere => &["mystery", "tension", "joy", "sorrow", "wonder"],
        }
    }
}

/// Tone settings for a story.
///
/// # Examples
///
/// ```
/// use storyboard_core::ToneSettings;
///
/// let tone = ToneSettings::default();
/// assert_eq!(tone.genre, "drama");
/// assert_eq!(tone.mood, "neutral");
/// assert_eq!(tone.intensity, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSettings {
    /// Story genre
    #[serde(default = "default_genre")]
    pub genre: String,
    /// Overall mood
    #[serde(default = "default_mood")]
    pub mood: String,
    /// Baseline intensity in [0, 1]
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

fn default_genre() -> String {
    "drama".to_string()
}

fn default_mood() -> String {
    "neutral".to_string()
}

fn default_intensity() -> f64 {
    0.5
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            genre: default_genre(),
            mood: default_mood(),
            intensity: default_intensity(),
        }
    }
}

/// Diversity hints generated for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SceneSeed {
    /// Frame this seed was generated for
    frame: u32,
    /// Phase the frame belongs to
    phase: Phase,
    /// Selected scene archetype
    archetype: SceneArchetype,
    /// Concrete beat drawn from the archetype, e.g. "chase"
    beat: Option<String>,
    /// Required story elements to weave in (at most two)
    elements: Vec<String>,
    /// `sin(progress * PI)`: low at both ends, peaking mid-story
    intensity: f64,
    /// Mood from the tone settings
    mood: String,
    /// Leading theme keyword, if any
    theme: Option<String>,
    /// Reserved; no selection logic reads it.
    novelty_score: f64,
}

impl SceneSeed {
    /// Create a seed without a beat. The novelty score starts at zero.
    pub fn new(
        frame: u32,
        phase: Phase,
        archetype: SceneArchetype,
        elements: Vec<String>,
        intensity: f64,
        mood: impl Into<String>,
        theme: Option<String>,
    ) -> Self {
        Self {
            frame,
            phase,
            archetype,
            beat: None,
            elements,
            intensity,
            mood: mood.into(),
            theme,
            novelty_score: 0.0,
        }
    }

    /// Attach a concrete scene beat.
    pub fn with_beat(mut self, beat: impl Into<String>) -> Self {
        self.beat = Some(beat.into());
        self
    }
}
