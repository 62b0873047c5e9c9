//! Collaborator, observer and persistence traits.

use async_trait::async_trait;
use storyboard_core::{
    FrameResult, GeneratedImage, ImageHandle, ImageRequest, TextRequest, TextResponse,
};
use storyboard_error::{CollaboratorError, FrameError, StorageError};

/// A generative text service.
///
/// Implementations may return malformed JSON, partial fields, or an HTTP-style
/// error; the pipeline tolerates all three.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a request.
    async fn generate(&self, request: &TextRequest) -> Result<TextResponse, CollaboratorError>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &'static str;
}

/// A generative image service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Render an image for a request.
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, CollaboratorError>;

    /// Provider name used in logs.
    fn provider_name(&self) -> &'static str;
}

/// Receives progress notifications from a run.
///
/// All methods default to doing nothing, so observers implement only what they
/// render.
pub trait ProgressObserver: Send + Sync {
    /// `completed` of `total` frames have been attempted.
    fn on_progress(&self, _completed: u32, _total: u32) {}

    /// A frame finished its text stage, and its image stage if `image` is present.
    fn on_frame(&self, _frame: u32, _result: &FrameResult, _image: Option<&ImageHandle>) {}

    /// A frame failed.
    fn on_frame_error(&self, _error: &FrameError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Get/set storage of opaque serialized storyboards keyed by run id.
#[async_trait]
pub trait StoryboardStore: Send + Sync {
    /// Store a blob under `run_id`, replacing any previous value.
    async fn set(&self, run_id: &str, blob: Vec<u8>) -> Result<(), StorageError>;

    /// Fetch the blob stored under `run_id`, if any.
    async fn get(&self, run_id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Run ids with a stored blob, sorted.
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingObserver {
        progress: Mutex<Vec<(u32, u32)>>,
    }

    impl ProgressObserver for CountingObserver {
        fn on_progress(&self, completed: u32, total: u32) {
            self.progress.lock().unwrap().push((completed, total));
        }
    }

    #[test]
    fn observers_only_override_what_they_need() {
        let observer = CountingObserver::default();
        observer.on_progress(1, 3);
        observer.on_frame(1, &FrameResult::default(), None);
        assert_eq!(*observer.progress.lock().unwrap(), vec![(1, 3)]);

        let dyn_observer: &dyn ProgressObserver = &NullObserver;
        dyn_observer.on_progress(2, 3);
    }

    struct EchoText;

    #[async_trait]
    impl TextGenerator for EchoText {
        async fn generate(&self, request: &TextRequest) -> Result<TextResponse, CollaboratorError> {
            Ok(TextResponse::Text(request.prompt().clone()))
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn text_generator_is_object_safe() {
        let generator: Box<dyn TextGenerator> = Box::new(EchoText);
        let request = TextRequest::builder()
            .system("s")
            .prompt("hello")
            .model("m")
            .build()
            .unwrap();
        let response = generator.generate(&request).await.unwrap();
        assert_eq!(response, TextResponse::Text("hello".into()));
        assert_eq!(generator.provider_name(), "echo");
    }
}
