//! Prompt assembly for the text and image collaborators.

use crate::ConsistencyMemory;
use storyboard_core::{
    FrameField, FrameResult, PhaseContext, SceneArchetype, SceneSeed, StyleTemplate,
};
use strum::IntoEnumIterator;

/// System message sent with every text request.
pub const SYSTEM_PROMPT: &str = "You must produce valid JSON with string values. Include as many of these keys as possible: title, action, background, characters, location, camera, emotion, narration, storyProgress, characterPlacement, positioningMovement.";

const TECHNICAL_REQUIREMENTS: &str = "high detail, clear focus on the action, proper anatomy and positioning, balanced lighting, high resolution, and sharpness.";

/// Scene-diversity section of a text prompt.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Phase, SceneArchetype, SceneSeed};
/// use storyboard_narrative::diversity_prompt;
///
/// let seed = SceneSeed::new(1, Phase::Setup, SceneArchetype::Drama, vec!["a letter".into()], 0.7, "tense", None)
///     .with_beat("revelation");
/// let section = diversity_prompt("A lighthouse keeper", &seed, 25, &[SceneArchetype::Drama]);
/// assert!(section.contains("Scene Type: drama"));
/// assert!(section.contains("Required Elements: a letter"));
/// assert!(section.contains("Original Scenario: A lighthouse keeper"));
/// ```
pub fn diversity_prompt(
    scenario: &str,
    seed: &SceneSeed,
    percent: u32,
    previous: &[SceneArchetype],
) -> String {
    let previous = previous
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let beat = seed
        .beat()
        .as_deref()
        .map(|beat| format!("Scene Beat: {beat}\n"))
        .unwrap_or_default();

    format!(
        "Scene Type: {archetype}
{beat}Required Elements: {elements}
Emotional Intensity: {intensity:.2}
Mood: {mood}
Theme: {theme}

Original Scenario: {scenario}

Create a scene that:
1. Incorporates the required elements naturally
2. Maintains the {archetype} feeling
3. Progresses the story while adding creative elements
4. Matches the emotional intensity and mood
5. Reinforces the central theme

Additional Context:
- Story Phase: {phase}
- Progress: {percent}%
- Previous Scenes: {previous}
",
        archetype = seed.archetype(),
        elements = seed.elements().join(", "),
        intensity = seed.intensity(),
        mood = seed.mood(),
        theme = seed.theme().as_deref().unwrap_or("none"),
        phase = seed.phase(),
    )
}

/// User prompt for one frame's text request.
///
/// Combines the diversity section, the frame position, the continuity rules held
/// in `memory`, the phase instructions, the required camera angle and the JSON
/// key template.
pub fn text_prompt(
    context: &PhaseContext,
    diversity: &str,
    memory: &ConsistencyMemory,
    camera_angle: &str,
) -> String {
    let actions = memory.previous_actions().join(", ");
    let or = |value: Option<&str>, placeholder: &'static str| -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => placeholder.to_string(),
        }
    };

    format!(
        "
You are creating a single story frame in a chronological sequence.
{diversity}
Frame #{frame} of {total}
Phase: {phase}
Progress: {percent}%

Continuity rules:
- Base characters: {base_characters}
- Original location: {base_location}
- Previous actions used: {actions}
- Current location: {current_location}

Your objective:
{objective}

Camera angle must be: \"{camera_angle}\"

Output strictly valid JSON with the following keys (string values only):
{template}
",
        frame = context.frame(),
        total = context.total_frames(),
        phase = context.phase(),
        percent = context.percent(),
        base_characters = or(memory.base_characters(), "None yet"),
        base_location = or(memory.base_location(), "None yet"),
        actions = or(Some(actions.as_str()), "None yet"),
        current_location = or(memory.current_location(), "Unknown"),
        objective = context.phase().instructions(),
        template = key_template(camera_angle),
    )
}

fn key_template(camera_angle: &str) -> String {
    let line = |field: FrameField| -> String {
        let hint = match field {
            FrameField::Title => "Title of the frame".to_string(),
            FrameField::Action => "Detailed action/story".to_string(),
            FrameField::Background => "Detailed background description".to_string(),
            FrameField::Characters => {
                "Use same descriptions from frame 1 (only if known) + new if introduced".to_string()
            }
            FrameField::Location => "Keep or change logically".to_string(),
            FrameField::Camera => format!("Must be {camera_angle}"),
            FrameField::Emotion => "Emotional vibe or tone".to_string(),
            FrameField::Narration => "How this moment fits the overall story".to_string(),
            FrameField::StoryProgress => "Key event or detail".to_string(),
            FrameField::CharacterPlacement => {
                "Describe the placement of each character within the scene".to_string()
            }
            FrameField::PositioningMovement => {
                "Describe the specific positioning and movement of characters during the action"
                    .to_string()
            }
        };
        format!("  \"{}\": \"{}\"", field.key(), hint)
    };

    let body = FrameField::iter()
        .map(line)
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{body}\n}}")
}

/// Image prompt for a frame, as labelled sections separated by blank lines.
///
/// Empty optional sections are dropped. `negative_prompt` is emitted verbatim
/// under **Avoid**.
///
/// # Examples
///
/// ```
/// use storyboard_core::{FrameResult, StyleTemplate};
/// use storyboard_narrative::image_prompt;
///
/// let frame = FrameResult::builder()
///     .title("Storm")
///     .location("Cliffs")
///     .camera("low angle shot")
///     .build()
///     .unwrap();
/// let prompt = image_prompt(&frame, StyleTemplate::lookup("Film Noir"), "blur");
/// assert!(prompt.starts_with("**Title:** Storm."));
/// assert!(prompt.contains("**Camera Angle:** low angle shot."));
/// assert!(prompt.contains("**Artistic Style:** Film Noir - "));
/// assert!(prompt.ends_with("**Avoid:** blur"));
/// ```
pub fn image_prompt(frame: &FrameResult, style: &StyleTemplate, negative_prompt: &str) -> String {
    let optional = |label: &str, value: &str| -> String {
        if value.trim().is_empty() {
            String::new()
        } else {
            format!("**{label}:** {value}.")
        }
    };

    let sections = [
        optional("Title", &frame.title),
        format!("**Location/Setting:** {}.", frame.location),
        optional("Background", &frame.background),
        format!("**Characters:** {}.", frame.characters),
        format!("**Action:** {}.", frame.action),
        optional("Emotion", &frame.emotion),
        optional("Camera Angle", &frame.camera),
        format!(
            "**Character Placement and Interactions:** {}.",
            frame.character_placement
        ),
        format!(
            "**Positioning and Movement:** {}.",
            frame.positioning_movement
        ),
        if style.description.is_empty() {
            String::new()
        } else {
            format!("**Artistic Style:** {} - {}", style.name, style.description)
        },
        format!("**Technical Requirements:** {TECHNICAL_REQUIREMENTS}"),
        if negative_prompt.trim().is_empty() {
            String::new()
        } else {
            format!("**Avoid:** {negative_prompt}")
        },
    ];

    sections
        .into_iter()
        .filter(|section| !section.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Negative prompt for an image request: the default list, the caller's
/// additions and the style's own exclusions.
pub fn negative_prompt(user: &str, style: &StyleTemplate) -> String {
    let merged = storyboard_core::merge_negative_prompt(user);
    if style.negative_prompt.is_empty() {
        merged
    } else {
        format!("{}, {}", merged, style.negative_prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_core::{DEFAULT_NEGATIVE_PROMPT, Phase};

    #[test]
    fn first_frame_prompt_uses_placeholders() {
        let context = crate::classify(1, 4).unwrap();
        let memory = ConsistencyMemory::new();
        let prompt = text_prompt(&context, "DIVERSITY", &memory, "wide shot");

        assert!(prompt.contains("You are creating a single story frame in a chronological sequence.\nDIVERSITY"));
        assert!(prompt.contains("Frame #1 of 4\nPhase: setup\nProgress: 25%"));
        assert!(prompt.contains("- Base characters: None yet"));
        assert!(prompt.contains("- Original location: None yet"));
        assert!(prompt.contains("- Previous actions used: None yet"));
        assert!(prompt.contains("- Current location: Unknown"));
        assert!(prompt.contains(Phase::Setup.instructions()));
        assert!(prompt.contains("Camera angle must be: \"wide shot\""));
        assert!(prompt.contains("  \"camera\": \"Must be wide shot\","));
        assert!(prompt.contains("  \"positioningMovement\": "));
    }

    #[test]
    fn later_prompt_carries_continuity() {
        let mut memory = ConsistencyMemory::new();
        let mut first = FrameResult::builder()
            .characters("Ada")
            .location("mill")
            .action("Ada repairs the wheel")
            .build()
            .unwrap();
        memory.record_frame(1, &mut first);

        let context = crate::classify(3, 4).unwrap();
        let prompt = text_prompt(&context, "", &memory, "close-up shot");
        assert!(prompt.contains("- Base characters: Ada\n"));
        assert!(prompt.contains("- Original location: mill\n"));
        assert!(prompt.contains("- Previous actions used: Ada repairs the wheel\n"));
        assert!(prompt.contains("Phase: confrontation"));
    }

    #[test]
    fn template_is_valid_json() {
        let template = key_template("POV shot");
        let value: serde_json::Value = serde_json::from_str(&template).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn image_prompt_drops_empty_sections() {
        let frame = FrameResult {
            title: String::new(),
            background: " ".into(),
            emotion: String::new(),
            ..FrameResult::default()
        };
        let prompt = image_prompt(&frame, StyleTemplate::lookup("None"), "");
        assert!(prompt.starts_with("**Location/Setting:** Current location."));
        assert!(!prompt.contains("**Background:**"));
        assert!(!prompt.contains("**Emotion:**"));
        assert!(!prompt.contains("**Avoid:**"));
        assert!(prompt.ends_with(TECHNICAL_REQUIREMENTS));
        assert!(!prompt.contains("\n\n\n"));
    }

    #[test]
    fn negative_prompt_appends_style_exclusions() {
        let noir = StyleTemplate::lookup("Film Noir");
        let merged = negative_prompt("text", noir);
        assert!(merged.starts_with(DEFAULT_NEGATIVE_PROMPT));
        assert!(merged.contains(", text, "));
        assert!(merged.ends_with(noir.negative_prompt));
    }
}
