//! Structured story text for a single frame.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// The required text fields of every frame.
///
/// Field keys are the camelCase names the text collaborator is asked to emit.
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
#[serde(rename_all = "camelCase")]
pub enum FrameField {
    /// Short frame title
    #[display("title")]
    Title,
    /// What happens in the frame
    #[display("action")]
    Action,
    /// Background description
    #[display("background")]
    Background,
    /// Character roster and descriptions
    #[display("characters")]
    Characters,
    /// Where the frame takes place
    #[display("location")]
    Location,
    /// Camera angle
    #[display("camera")]
    Camera,
    /// Emotional tone
    #[display("emotion")]
    Emotion,
    /// Narration text
    #[display("narration")]
    Narration,
    /// Key story event
    #[display("storyProgress")]
    StoryProgress,
    /// Placement of each character
    #[display("characterPlacement")]
    CharacterPlacement,
    /// Positioning and movement during the action
    #[display("positioningMovement")]
    PositioningMovement,
}

impl FrameField {
    /// The JSON key for this field.
    pub fn key(self) -> &'static str {
        match self {
            FrameField::Title => "title",
            FrameField::Action => "action",
            FrameField::Background => "background",
            FrameField::Characters => "characters",
            FrameField::Location => "location",
            FrameField::Camera => "camera",
            FrameField::Emotion => "emotion",
            FrameField::Narration => "narration",
            FrameField::StoryProgress => "storyProgress",
            FrameField::CharacterPlacement => "characterPlacement",
            FrameField::PositioningMovement => "positioningMovement",
        }
    }

    /// Value substituted when the text collaborator omits or blanks this field.
    pub fn default_value(self) -> &'static str {
        match self {
            FrameField::Title => "Untitled Scene",
            FrameField::Action => "Scene continues",
            FrameField::Background => "Simple background",
            FrameField::Characters => "Characters in scene",
            FrameField::Location => "Current location",
            FrameField::Camera => "Default camera angle",
            FrameField::Emotion => "Neutral",
            FrameField::Narration => "The story continues",
            FrameField::StoryProgress => "Story in progress",
            FrameField::CharacterPlacement => "Characters positioned naturally",
            FrameField::PositioningMovement => "Natural movement and positioning",
        }
    }

    /// All JSON keys, in prompt order.
    pub fn keys() -> Vec<&'static str> {
        FrameField::iter().map(FrameField::key).collect()
    }
}

/// The structured text of one frame.
///
/// Every field is always populated. Construction paths that start from partial
/// collaborator output fill gaps with [`FrameField::default_value`].
///
/// # Examples
///
/// ```
/// use storyboard_core::{FrameField, FrameResult};
///
/// let frame = FrameResult::builder()
///     .title("The Gate")
///     .characters("Mira, a courier in a red coat")
///     .build()
///     .unwrap();
///
/// assert_eq!(frame.title, "The Gate");
/// assert_eq!(frame.emotion, FrameField::Emotion.default_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_builder::Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), default)]
pub struct FrameResult {
    /// Short frame title
    pub title: String,
    /// What happens in the frame
    pub action: String,
    /// Background description
    pub background: String,
    /// Character roster and descriptions
    pub characters: String,
    /// Where the frame takes place
    pub location: String,
    /// Camera angle
    pub camera: String,
    /// Emotional tone
    pub emotion: String,
    /// Narration text
    pub narration: String,
    /// Key story event
    pub story_progress: String,
    /// Placement of each character
    pub character_placement: String,
    /// Positioning and movement during the action
    pub positioning_movement: String,
}

impl Default for FrameResult {
    fn default() -> Self {
        Self {
            title: FrameField::Title.default_value().to_string(),
            action: FrameField::Action.default_value().to_string(),
            background: FrameField::Background.default_value().to_string(),
            characters: FrameField::Characters.default_value().to_string(),
            location: FrameField::Location.default_value().to_string(),
            camera: FrameField::Camera.default_value().to_string(),
            emotion: FrameField::Emotion.default_value().to_string(),
            narration: FrameField::Narration.default_value().to_string(),
            story_progress: FrameField::StoryProgress.default_value().to_string(),
            character_placement: FrameField::CharacterPlacement.default_value().to_string(),
            positioning_movement: FrameField::PositioningMovement.default_value().to_string(),
        }
    }
}

impl FrameResult {
    /// Creates a new frame builder.
    pub fn builder() -> FrameResultBuilder {
        FrameResultBuilder::default()
    }

    /// Read a field by name.
    pub fn get(&self, field: FrameField) -> &str {
        match field {
            FrameField::Title => &self.title,
            FrameField::Action => &self.action,
            FrameField::Background => &self.background,
            FrameField::Characters => &self.characters,
            FrameField::Location => &self.location,
            FrameField::Camera => &self.camera,
            FrameField::Emotion => &self.emotion,
            FrameField::Narration => &self.narration,
            FrameField::StoryProgress => &self.story_progress,
            FrameField::CharacterPlacement => &self.character_placement,
            FrameField::PositioningMovement => &self.positioning_movement,
        }
    }

    /// Overwrite a field by name.
    pub fn set(&mut self, field: FrameField, value: impl Into<String>) {
        let slot = match field {
            FrameField::Title => &mut self.title,
            FrameField::Action => &mut self.action,
            FrameField::Background => &mut self.background,
            FrameField::Characters => &mut self.characters,
            FrameField::Location => &mut self.location,
            FrameField::Camera => &mut self.camera,
            FrameField::Emotion => &mut self.emotion,
            FrameField::Narration => &mut self.narration,
            FrameField::StoryProgress => &mut self.story_progress,
            FrameField::CharacterPlacement => &mut self.character_placement,
            FrameField::PositioningMovement => &mut self.positioning_movement,
        };
        *slot = value.into();
    }

    /// Build a frame from a JSON object, defaulting every missing or unusable field.
    ///
    /// Strings are taken as-is (trimmed); numbers and booleans are rendered to text;
    /// null, empty strings, arrays and objects count as missing. Returns the frame
    /// together with the fields that had to be defaulted.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> (Self, Vec<FrameField>) {
        let mut frame = Self::default();
        let mut defaulted = Vec::new();
        for field in FrameField::iter() {
            let value = match object.get(field.key()) {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                    Some(s.trim().to_string())
                }
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
                _ => None,
            };
            match value {
                Some(v) => frame.set(field, v),
                None => defaulted.push(field),
            }
        }
        (frame, defaulted)
    }
}
