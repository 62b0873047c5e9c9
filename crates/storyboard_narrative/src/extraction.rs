//! Parse-or-default handling of text collaborator output.
//!
//! Model responses often wrap JSON in markdown fences or surround it with prose.
//! Extraction tries fenced blocks first, then the first balanced object. When
//! nothing usable is found the frame is synthesised from hints in the request
//! prompt, and tagged as such so callers can tell it apart from genuine output.

use regex::Regex;
use serde_json::{Map, Value};
use storyboard_core::{FrameField, FrameResult, FrameSource, TextResponse};
use tracing::{debug, warn};

/// A frame recovered from a text response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFrame {
    /// The response held a JSON object. `defaulted` lists the fields that were
    /// missing or unusable and received their fixed default.
    Parsed {
        /// Frame text
        frame: FrameResult,
        /// Fields filled with defaults
        defaulted: Vec<FrameField>,
    },
    /// Nothing parseable; the frame was built from the request prompt.
    Fallback {
        /// Frame text
        frame: FrameResult,
    },
}

impl ParsedFrame {
    /// The frame text, whichever way it was obtained.
    pub fn frame(&self) -> &FrameResult {
        match self {
            ParsedFrame::Parsed { frame, .. } | ParsedFrame::Fallback { frame } => frame,
        }
    }

    /// Take the frame text.
    pub fn into_frame(self) -> FrameResult {
        match self {
            ParsedFrame::Parsed { frame, .. } | ParsedFrame::Fallback { frame } => frame,
        }
    }

    /// How the frame was obtained.
    pub fn source(&self) -> FrameSource {
        match self {
            ParsedFrame::Parsed { .. } => FrameSource::Parsed,
            ParsedFrame::Fallback { .. } => FrameSource::Fallback,
        }
    }
}

/// Turn a collaborator response into a complete frame.
///
/// `request_prompt` is the user prompt that produced the response; it is mined
/// for `characters:` and `location:` hints when the response is unusable.
///
/// # Examples
///
/// ```
/// use storyboard_core::{FrameField, TextResponse};
/// use storyboard_narrative::{parse_frame, ParsedFrame};
///
/// let response = TextResponse::Text(
///     "```json\n{\"title\": \"Dawn\", \"action\": \"The ship leaves port\"}\n```".to_string(),
/// );
/// match parse_frame(&response, "") {
///     ParsedFrame::Parsed { frame, defaulted } => {
///         assert_eq!(frame.title, "Dawn");
///         assert!(defaulted.contains(&FrameField::Emotion));
///     }
///     ParsedFrame::Fallback { .. } => panic!("expected parsed output"),
/// }
/// ```
pub fn parse_frame(response: &TextResponse, request_prompt: &str) -> ParsedFrame {
    let object = match response {
        TextResponse::Json(value) => object_from_value(value.clone()),
        TextResponse::Text(text) => extract_json(text)
            .and_then(|json| serde_json::from_str::<Value>(&json).ok())
            .and_then(object_from_value),
    };

    match object {
        Some(object) => {
            let (frame, defaulted) = FrameResult::from_json_object(&object);
            if !defaulted.is_empty() {
                debug!(
                    fields = ?defaulted.iter().map(|f| f.key()).collect::<Vec<_>>(),
                    "Filled missing frame fields with defaults"
                );
            }
            ParsedFrame::Parsed { frame, defaulted }
        }
        None => {
            warn!("Text response held no usable JSON, using fallback frame");
            ParsedFrame::Fallback {
                frame: fallback_frame(request_prompt),
            }
        }
    }
}

/// Deterministic frame built from prompt hints.
pub fn fallback_frame(request_prompt: &str) -> FrameResult {
    let characters = hint(r"(?i)characters?:([^.!?\n]+)", request_prompt)
        .unwrap_or_else(|| "Characters in scene".to_string());
    let location = hint(r"(?i)location:([^.!?\n]+)", request_prompt)
        .unwrap_or_else(|| "Current location".to_string());
    let camera = hint(r#"(?i)camera angle must be:\s*"([^"\n]+)""#, request_prompt)
        .unwrap_or_else(|| "Medium shot".to_string());

    FrameResult {
        title: "Scene".to_string(),
        action: "The story continues".to_string(),
        background: "A suitable background".to_string(),
        characters,
        location,
        camera,
        emotion: "Neutral".to_string(),
        narration: "The scene progresses".to_string(),
        story_progress: "Story continues naturally".to_string(),
        character_placement: "Characters are positioned appropriately".to_string(),
        positioning_movement: "Characters move naturally in the scene".to_string(),
    }
}

fn hint(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty() && !matches!(*value, "None yet" | "Unknown"))
        .map(str::to_string)
}

fn object_from_value(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(object) => Some(object),
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(object) => Some(object),
            _ => None,
        }),
        _ => None,
    }
}

/// Extract a JSON object from a response that may contain markdown or extra text.
///
/// Tries a fenced ```json block, then any fenced block, then the first balanced
/// `{ ... }` in the raw text.
pub fn extract_json(response: &str) -> Option<String> {
    extract_from_code_block(response, "json")
        .and_then(|block| extract_balanced(&block, '{', '}'))
        .or_else(|| extract_balanced(response, '{', '}'))
}

/// Content of the first markdown code block, tolerating a missing closing fence.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        return Some(match response[content_start..].find("```") {
            Some(end) => response[content_start..content_start + end].trim().to_string(),
            None => response[content_start..].trim().to_string(),
        });
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);
    Some(match response[skip_to..].find("```") {
        Some(end) => response[skip_to..skip_to + end].trim().to_string(),
        None => response[skip_to..].trim().to_string(),
    })
}

/// Content between the first `open` and its matching `close`, skipping
/// delimiters inside string literals.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
