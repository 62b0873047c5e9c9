//! Requests to and responses from the generation collaborators.

use serde::{Deserialize, Serialize};

/// A request to the text-generation collaborator.
///
/// # Examples
///
/// ```
/// use storyboard_core::TextRequest;
///
/// let request = TextRequest::builder()
///     .system("Respond in JSON")
///     .prompt("Frame #1 of 5")
///     .model("openai")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.model(), "openai");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
#[setters(prefix = "with_", into)]
pub struct TextRequest {
    /// System instructions
    system: String,
    /// User prompt
    prompt: String,
    /// Model hint
    model: String,
}

impl TextRequest {
    /// Creates a request from its parts.
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            model: model.into(),
        }
    }

    /// Creates a new request builder.
    pub fn builder() -> TextRequestBuilder {
        TextRequestBuilder::default()
    }
}

/// What the text collaborator returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TextResponse {
    /// Already-structured output
    Json(serde_json::Value),
    /// Raw text, possibly containing JSON
    Text(String),
}

/// Provider toggles forwarded with every image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageFlags {
    /// Suppress provider watermark
    #[serde(default = "default_true")]
    pub nologo: bool,
    /// Keep the image out of public feeds
    #[serde(default)]
    pub private: bool,
    /// Let the provider rewrite the prompt
    #[serde(default)]
    pub enhance: bool,
    /// Provider safety filter
    #[serde(default)]
    pub safe: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ImageFlags {
    fn default() -> Self {
        Self {
            nologo: true,
            private: false,
            enhance: false,
            safe: false,
        }
    }
}

/// A request to the image-generation collaborator.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
#[setters(prefix = "with_", into)]
pub struct ImageRequest {
    /// Final image prompt
    prompt: String,
    /// Image model
    #[builder(default = "String::from(\"flux\")")]
    model: String,
    /// Width in pixels
    #[builder(default = "1024")]
    width: u32,
    /// Height in pixels
    #[builder(default = "1024")]
    height: u32,
    /// Generation seed
    #[builder(default)]
    seed: u64,
    /// Provider flags
    #[builder(default)]
    flags: ImageFlags,
}

impl ImageRequest {
    /// Creates a 1024x1024 request with default flags and seed 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::ImageRequest;
    ///
    /// let request = ImageRequest::new("a lighthouse at dusk", "turbo")
    ///     .with_width(1920u32)
    ///     .with_seed(7u64);
    /// assert_eq!(*request.width(), 1920);
    /// assert_eq!(*request.height(), 1024);
    /// assert!(request.flags().nologo);
    /// ```
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            width: 1024,
            height: 1024,
            seed: 0,
            flags: ImageFlags::default(),
        }
    }

    /// Creates a new request builder.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// Binary image produced by the image collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct GeneratedImage {
    /// Encoded image bytes
    data: Vec<u8>,
    /// MIME type of `data`
    mime: String,
}

impl GeneratedImage {
    /// Wrap encoded image bytes.
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    /// True when the collaborator returned no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Opaque, serializable handle to a rendered frame image.
///
/// The presentation layer treats this as a token; bytes are kept so a saved
/// storyboard can be restored without the image service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImageHandle {
    /// Unique handle id
    id: uuid::Uuid,
    /// Model that produced the image
    model: String,
    /// Seed used
    seed: u64,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// MIME type
    mime: String,
    /// Encoded image bytes, base64 in serialized form
    #[serde(with = "base64_bytes")]
    data: Vec<u8>,
}

impl ImageHandle {
    /// Create a handle for an image generated from `request`.
    pub fn new(request: &ImageRequest, image: GeneratedImage) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            model: request.model.clone(),
            seed: request.seed,
            width: request.width,
            height: request.height,
            mime: image.mime,
            data: image.data,
        }
    }

    /// Size of the image payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_request_defaults() {
        let request = ImageRequest::builder().prompt("a lighthouse").build().unwrap();
        assert_eq!(request.model(), "flux");
        assert_eq!((*request.width(), *request.height()), (1024, 1024));
        assert!(request.flags().nologo);
        assert!(!request.flags().safe);
    }

    #[test]
    fn image_handle_serializes_bytes_as_base64() {
        let request = ImageRequest::builder()
            .prompt("a lighthouse")
            .seed(7u64)
            .build()
            .unwrap();
        let handle = ImageHandle::new(&request, GeneratedImage::new(vec![1, 2, 3], "image/png"));
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["data"], "AQID");
        let back: ImageHandle = serde_json::from_value(json).unwrap();
        assert_eq!(back, handle);
    }
}
