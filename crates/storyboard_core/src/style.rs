//! Art style templates, negative prompts and aspect ratios.

use serde::{Deserialize, Serialize};

/// Negative prompt applied to every image request.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "ensure that there is no low quality, blurry, bad anatomy, out of frame, direct eye contact, facing viewer, looking at viewer, static portrait poses, posing, photography studio, staged photos, awareness of camera, posed shots, deliberate posing, symmetrical stance, centered composition, centered pose, centered framing";

/// A named art style injected into image prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleTemplate {
    /// Display name, also the lookup key
    pub name: &'static str,
    /// Descriptive text appended to the image prompt
    pub description: &'static str,
    /// Style-specific elements to avoid
    pub negative_prompt: &'static str,
}

const STYLES: [StyleTemplate; 17] = [
    StyleTemplate {
        name: "None",
        description: "no specific style, plain and unstyled",
        negative_prompt: "avoid any complex details or artistic elements",
    },
    StyleTemplate {
        name: "Pixel Art",
        description: "classic pixel art style, 16-bit aesthetic, carefully crafted pixel details, vibrant retro charm",
        negative_prompt: "avoid realistic textures, high resolution, or smooth shading",
    },
    StyleTemplate {
        name: "Cinematic",
        description: "cinematic masterpiece, dramatic lighting, filmic color grading, strong atmosphere",
        negative_prompt: "avoid flat lighting or dull composition",
    },
    StyleTemplate {
        name: "Anime",
        description: "vivid color schemes, expressive characters, stylized lines, cinematic anime atmosphere",
        negative_prompt: "avoid overly realistic anatomy or muted colors",
    },
    StyleTemplate {
        name: "Realistic",
        description: "photorealistic style, meticulous textures, lifelike proportions, natural lighting",
        negative_prompt: "avoid cartoonish elements or simplified details",
    },
    StyleTemplate {
        name: "Mix",
        description: "a fusion of multiple art styles (e.g., Cinematic plus Pixel Art)",
        negative_prompt: "avoid uniform or single-style elements",
    },
    StyleTemplate {
        name: "Storyboard",
        description: "simple storyboard style, hand-drawn sketches, quick shading, comic lines",
        negative_prompt: "avoid detailed rendering or complex painting",
    },
    StyleTemplate {
        name: "Film Noir",
        description: "high-contrast black & white, deep shadows, moody vintage atmosphere",
        negative_prompt: "avoid bright colors or modern aesthetics",
    },
    StyleTemplate {
        name: "Vintage",
        description: "faded colors, nostalgic film grain, old photographic look, warm tones",
        negative_prompt: "avoid modern saturated color or clarity",
    },
    StyleTemplate {
        name: "Graphic Design",
        description: "clean layouts, bold typography, strong shapes, minimalist composition",
        negative_prompt: "avoid cluttered or chaotic visual elements",
    },
    StyleTemplate {
        name: "Cartoon",
        description: "bold outlines, exaggerated features, vibrant colors, playful comedic style",
        negative_prompt: "avoid realistic textures or muted tones",
    },
    StyleTemplate {
        name: "Watercolor",
        description: "delicate watercolor painting style, soft brush strokes, pastel tones, organic textures",
        negative_prompt: "avoid hard edges or digital precision",
    },
    StyleTemplate {
        name: "Surrealism",
        description: "dreamlike imagery, abstract forms, unusual compositions, fusion of reality & imagination",
        negative_prompt: "avoid strictly realistic or logical structures",
    },
    StyleTemplate {
        name: "Comics Style",
        description: "bold outlines, dynamic panels, halftone patterns, reminiscent of classic Marvel/DC comics",
        negative_prompt: "avoid photorealistic shading or subtle transitions",
    },
    StyleTemplate {
        name: "Concept Art",
        description: "detailed environment, imaginative design, rough painterly strokes typical of concept art",
        negative_prompt: "avoid overly simple or mundane designs",
    },
    StyleTemplate {
        name: "Paper Cut-Out",
        description: "layered colored paper effect, stylized shapes, slight shadow layering",
        negative_prompt: "avoid realistic textures, or finely detailed painting",
    },
    StyleTemplate {
        name: "AI Comics",
        description: "AI-generated comic style, semi-realistic lines, comedic composition, digital shading",
        negative_prompt: "avoid purely hand-drawn or extremely rough sketches, or super-detailed realism",
    },
];

impl StyleTemplate {
    /// All known styles.
    pub fn all() -> &'static [StyleTemplate] {
        &STYLES
    }

    /// Find a style by name (case-insensitive).
    pub fn find(name: &str) -> Option<&'static StyleTemplate> {
        STYLES.iter().find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Find a style by name, falling back to `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::StyleTemplate;
    ///
    /// assert_eq!(StyleTemplate::lookup("film noir").name, "Film Noir");
    /// assert_eq!(StyleTemplate::lookup("oil on velvet").name, "None");
    /// ```
    pub fn lookup(name: &str) -> &'static StyleTemplate {
        Self::find(name).unwrap_or(&STYLES[0])
    }
}

/// Combine the default negative prompt with a caller-supplied one.
///
/// # Examples
///
/// ```
/// use storyboard_core::{merge_negative_prompt, DEFAULT_NEGATIVE_PROMPT};
///
/// assert_eq!(merge_negative_prompt(""), DEFAULT_NEGATIVE_PROMPT);
/// assert!(merge_negative_prompt("text, watermark").ends_with(", text, watermark"));
/// ```
pub fn merge_negative_prompt(user: &str) -> String {
    let user = user.trim();
    if user.is_empty() {
        DEFAULT_NEGATIVE_PROMPT.to_string()
    } else {
        format!("{}, {}", DEFAULT_NEGATIVE_PROMPT, user)
    }
}

/// Image aspect ratio.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum AspectRatio {
    /// 1920x1080
    #[serde(rename = "16:9")]
    #[display("16:9")]
    Widescreen,
    /// 1600x1200
    #[serde(rename = "4:3")]
    #[display("4:3")]
    Standard,
    /// 1080x1920
    #[serde(rename = "9:16")]
    #[display("9:16")]
    Portrait,
    /// 1080x1080
    #[serde(rename = "1:1")]
    #[display("1:1")]
    Square,
    /// 1024x1024
    #[default]
    #[serde(other)]
    #[display("default")]
    Default,
}

impl AspectRatio {
    /// Parse a `W:H` label; unknown labels map to [`AspectRatio::Default`].
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "16:9" => AspectRatio::Widescreen,
            "4:3" => AspectRatio::Standard,
            "9:16" => AspectRatio::Portrait,
            "1:1" => AspectRatio::Square,
            _ => AspectRatio::Default,
        }
    }

    /// Pixel dimensions as `(width, height)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::AspectRatio;
    ///
    /// assert_eq!(AspectRatio::parse("16:9").dimensions(), (1920, 1080));
    /// assert_eq!(AspectRatio::parse("21:9").dimensions(), (1024, 1024));
    /// ```
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Widescreen => (1920, 1080),
            AspectRatio::Standard => (1600, 1200),
            AspectRatio::Portrait => (1080, 1920),
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Default => (1024, 1024),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_catalogue_has_unique_names() {
        let mut names: Vec<_> = StyleTemplate::all().iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 17);
    }

    #[test]
    fn aspect_ratio_parses_all_known_labels() {
        assert_eq!(AspectRatio::parse("4:3").dimensions(), (1600, 1200));
        assert_eq!(AspectRatio::parse("9:16").dimensions(), (1080, 1920));
        assert_eq!(AspectRatio::parse(" 1:1 ").dimensions(), (1080, 1080));
        assert_eq!(AspectRatio::parse("").dimensions(), (1024, 1024));
    }
}
