//! Seeded image variants rendered through the bounded pool.

use crate::pipeline::render;
use std::sync::Arc;
use storyboard_core::{ImageHandle, ImageRequest};
use storyboard_error::{CollaboratorError, RetryError, StoryError};
use storyboard_interface::{ImageGenerator, ProgressObserver};
use storyboard_retry::{BoundedPool, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Outcome of one variant.
#[derive(Debug)]
pub struct VariantResult {
    /// Position in the batch
    pub index: usize,
    /// Seed the variant was requested with
    pub seed: u64,
    /// Rendered image or the terminal error
    pub outcome: Result<ImageHandle, RetryError<CollaboratorError>>,
}

impl VariantResult {
    /// True when the variant rendered.
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Render `count` variants of `base`, seeded `base.seed + i`.
///
/// At most `concurrency` requests are in flight. A failed variant never stops
/// the others; results come back in seed order and the observer hears about
/// every finished variant.
///
/// # Errors
///
/// Fails fast when `concurrency` is zero or the policy is invalid.
#[instrument(skip(image, base, policy, stop, observer), fields(model = %base.model()))]
pub async fn render_variants(
    image: Arc<dyn ImageGenerator>,
    base: &ImageRequest,
    count: usize,
    concurrency: usize,
    policy: RetryPolicy,
    stop: CancellationToken,
    observer: &dyn ProgressObserver,
) -> Result<Vec<VariantResult>, StoryError> {
    let pool = BoundedPool::new(concurrency, policy, stop)?;
    let jobs: Vec<ImageRequest> = (0..count as u64)
        .map(|i| base.clone().with_seed(base.seed().wrapping_add(i)))
        .collect();
    let seeds: Vec<u64> = jobs.iter().map(|job| *job.seed()).collect();

    let results = pool
        .process_all_with_progress(
            jobs,
            |request: ImageRequest| {
                let image = Arc::clone(&image);
                async move { render(image.as_ref(), &request).await }
            },
            |completed, total| observer.on_progress(completed as u32, total as u32),
        )
        .await;

    let variants: Vec<VariantResult> = results
        .into_iter()
        .map(|result| {
            let index = result.index();
            VariantResult {
                index,
                seed: seeds[index],
                outcome: result.into_outcome(),
            }
        })
        .collect();

    let rendered = variants.iter().filter(|v| v.success()).count();
    info!(rendered, total = count, "Variant batch finished");
    Ok(variants)
}
