//! Layered storyboard configuration.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - `~/.config/storyboard/storyboard.toml`
//! - `./storyboard.toml`
//! - An explicit file, when one is given

use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use storyboard_core::{AspectRatio, ImageFlags, ToneSettings};
use storyboard_error::ConfigError;
use storyboard_retry::RetryPolicy;
use tracing::debug;

const DEFAULT_CONFIG: &str = include_str!("../storyboard.toml");

/// Image model used when a model has no configured fallbacks.
pub const DEFAULT_IMAGE_MODEL: &str = "flux";

/// Retry policies per collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Policy for text requests
    #[serde(default = "RetryPolicy::text")]
    pub text: RetryPolicy,
    /// Policy for image requests
    #[serde(default = "RetryPolicy::image")]
    pub image: RetryPolicy,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            text: RetryPolicy::text(),
            image: RetryPolicy::image(),
        }
    }
}

/// Worker pool settings for batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Jobs in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    3
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Models and their fallback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModelSettings {
    /// Preferred text model
    #[serde(default)]
    pub text: String,
    /// Text models tried after the preferred one, in order
    #[serde(default)]
    pub text_fallbacks: Vec<String>,
    /// Preferred image model
    #[serde(default)]
    pub image: String,
    /// Fallback list per image model
    #[serde(default)]
    pub image_fallbacks: BTreeMap<String, Vec<String>>,
}

impl ModelSettings {
    /// Text models to try, preferred first, without duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_narrative::ModelSettings;
    ///
    /// let models = ModelSettings {
    ///     text: "openai".into(),
    ///     text_fallbacks: vec!["mistral".into(), "openai".into(), "llama".into()],
    ///     ..Default::default()
    /// };
    /// assert_eq!(models.text_chain(), vec!["openai", "mistral", "llama"]);
    /// ```
    pub fn text_chain(&self) -> Vec<String> {
        dedupe(std::iter::once(self.text.clone()).chain(self.text_fallbacks.iter().cloned()))
    }

    /// Image models to try for `model`, preferred first.
    ///
    /// A model with no configured fallbacks falls back to [`DEFAULT_IMAGE_MODEL`].
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_narrative::ModelSettings;
    ///
    /// let models = ModelSettings::default();
    /// assert_eq!(models.image_chain("my-model"), vec!["my-model", "flux"]);
    /// ```
    pub fn image_chain(&self, model: &str) -> Vec<String> {
        let fallbacks = match self.image_fallbacks.get(model) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => vec![DEFAULT_IMAGE_MODEL.to_string()],
        };
        dedupe(std::iter::once(model.to_string()).chain(fallbacks))
    }
}

fn dedupe(models: impl Iterator<Item = String>) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    for model in models {
        let model = model.trim().to_string();
        if !model.is_empty() && !chain.contains(&model) {
            chain.push(model);
        }
    }
    chain
}

/// Image rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Aspect ratio label, e.g. `16:9`
    #[serde(default = "default_aspect")]
    pub aspect: String,
    /// Explicit width, overriding the aspect ratio
    #[serde(default)]
    pub width: Option<u32>,
    /// Explicit height, overriding the aspect ratio
    #[serde(default)]
    pub height: Option<u32>,
    /// Art style name
    #[serde(default = "default_style")]
    pub style: String,
    /// Extra exclusions merged into the default negative prompt
    #[serde(default)]
    pub negative_prompt: String,
    /// Fixed seed; random per frame when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Provider flags
    #[serde(default)]
    pub flags: ImageFlags,
}

fn default_aspect() -> String {
    "default".to_string()
}

fn default_style() -> String {
    "None".to_string()
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            aspect: default_aspect(),
            width: None,
            height: None,
            style: default_style(),
            negative_prompt: String::new(),
            seed: None,
            flags: ImageFlags::default(),
        }
    }
}

impl ImageSettings {
    /// Pixel dimensions: explicit width and height when both are set, otherwise
    /// those of the aspect ratio.
    pub fn dimensions(&self) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => AspectRatio::parse(&self.aspect).dimensions(),
        }
    }
}

/// Story tone and diversity inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySettings {
    /// Story genre
    #[serde(default = "default_genre")]
    pub genre: String,
    /// Overall mood
    #[serde(default = "default_mood")]
    pub mood: String,
    /// Baseline intensity
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Comma-separated theme keywords
    #[serde(default)]
    pub theme: String,
    /// Elements every story should include somewhere
    #[serde(default)]
    pub required_elements: Vec<String>,
    /// Seed for scene selection; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_genre() -> String {
    ToneSettings::default().genre
}

fn default_mood() -> String {
    ToneSettings::default().mood
}

fn default_intensity() -> f64 {
    ToneSettings::default().intensity
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            genre: default_genre(),
            mood: default_mood(),
            intensity: default_intensity(),
            theme: String::new(),
            required_elements: Vec::new(),
            seed: None,
        }
    }
}

impl StorySettings {
    /// Tone settings derived from this section.
    pub fn tone(&self) -> ToneSettings {
        ToneSettings {
            genre: self.genre.clone(),
            mood: self.mood.clone(),
            intensity: self.intensity.clamp(0.0, 1.0),
        }
    }
}

/// Top-level storyboard configuration.
///
/// ```toml
/// [models]
/// text = "openai"
/// text_fallbacks = ["mistral", "llama"]
///
/// [image]
/// aspect = "16:9"
/// style = "Film Noir"
/// ```
///
/// # Example
///
/// ```no_run
/// use storyboard_narrative::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// println!("text models: {:?}", config.models.text_chain());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoryboardConfig {
    /// Retry policies
    #[serde(default)]
    pub retry: RetrySettings,
    /// Batch pool settings
    #[serde(default)]
    pub pool: PoolSettings,
    /// Models and fallbacks
    #[serde(default)]
    pub models: ModelSettings,
    /// Image rendering
    #[serde(default)]
    pub image: ImageSettings,
    /// Story tone and diversity
    #[serde(default)]
    pub story: StorySettings,
}

impl StoryboardConfig {
    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> Result<Self, ConfigError> {
        finish(Self::base())
    }

    /// Load with precedence: current directory > home directory > bundled default.
    ///
    /// Missing user files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any present file fails to parse or validate.
    pub fn load() -> Result<Self, ConfigError> {
        finish(Self::layered())
    }

    /// Load the layered configuration plus `path` on top.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is missing or any source fails to parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading storyboard configuration");
        finish(Self::layered().add_source(File::from(path)))
    }

    /// Check values that would otherwise fail mid-run.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.concurrency == 0 {
            return Err(ConfigError::for_key(
                "pool.concurrency",
                "concurrency must be at least 1",
            ));
        }
        if self.models.text.trim().is_empty() {
            return Err(ConfigError::for_key("models.text", "no text model configured"));
        }
        if self.models.image.trim().is_empty() {
            return Err(ConfigError::for_key("models.image", "no image model configured"));
        }
        for (key, policy) in [("retry.text", &self.retry.text), ("retry.image", &self.retry.image)] {
            policy
                .validate()
                .map_err(|e| ConfigError::for_key(key, e.kind.to_string()))?;
        }
        Ok(())
    }

    fn base() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn layered() -> ConfigBuilder<DefaultState> {
        let mut builder = Self::base();
        if let Some(config_dir) = dirs::home_dir() {
            let home_config = config_dir.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }
        builder.add_source(File::with_name("storyboard").required(false))
    }
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<StoryboardConfig, ConfigError> {
    let config: StoryboardConfig = builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_parse() {
        let config = StoryboardConfig::bundled().unwrap();
        assert_eq!(config.pool.concurrency, 3);
        assert_eq!(config.models.text, "openai");
        assert_eq!(config.models.text_chain(), vec!["openai", "mistral", "llama", "deepseek"]);
        assert_eq!(*config.retry.text.base_delay_ms(), 1000);
        assert_eq!(*config.retry.image.base_delay_ms(), 2000);
        assert_eq!(config.image.dimensions(), (1024, 1024));
        assert!(config.image.flags.nologo);
        assert_eq!(config.story.tone(), ToneSettings::default());
    }

    #[test]
    fn image_chain_follows_configured_fallbacks() {
        let config = StoryboardConfig::bundled().unwrap();
        assert_eq!(
            config.models.image_chain("flux-3d"),
            vec!["flux-3d", "flux", "flux-pro", "flux-realism"]
        );
        assert_eq!(config.models.image_chain("unknown"), vec!["unknown", "flux"]);
    }

    #[test]
    fn explicit_dimensions_override_aspect() {
        let image = ImageSettings {
            aspect: "16:9".into(),
            ..Default::default()
        };
        assert_eq!(image.dimensions(), (1920, 1080));
        let image = ImageSettings {
            width: Some(640),
            height: Some(480),
            ..image
        };
        assert_eq!(image.dimensions(), (640, 480));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = StoryboardConfig::bundled().unwrap();
        config.pool.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.key.as_deref(), Some("pool.concurrency"));
    }
}
