//! Image variant batch command handler.

use super::ConsoleObserver;
use std::sync::Arc;
use storyboard::{
    ImageRequest, OfflineImage, StoryboardConfig, StoryboardResult, VariantResult,
    render_variants,
};
use tokio_util::sync::CancellationToken;

/// Render `count` seeded variants of `prompt` with the offline image collaborator.
pub async fn render_image_variants(
    config: &StoryboardConfig,
    prompt: &str,
    count: usize,
    seed: u64,
    model: Option<String>,
    concurrency: Option<usize>,
) -> StoryboardResult<Vec<VariantResult>> {
    let (width, height) = config.image.dimensions();
    let model = model.unwrap_or_else(|| config.models.image.clone());
    let base = ImageRequest::new(prompt, model)
        .with_width(width)
        .with_height(height)
        .with_seed(seed)
        .with_flags(config.image.flags);

    let variants = render_variants(
        Arc::new(OfflineImage::new()),
        &base,
        count,
        concurrency.unwrap_or(config.pool.concurrency),
        config.retry.image.clone(),
        CancellationToken::new(),
        &ConsoleObserver,
    )
    .await?;

    for variant in &variants {
        match &variant.outcome {
            Ok(image) => println!(
                "Variant {} (seed {}): {} bytes {}",
                variant.index + 1,
                variant.seed,
                image.len(),
                image.mime()
            ),
            Err(e) => println!("Variant {} (seed {}): failed: {}", variant.index + 1, variant.seed, e),
        }
    }
    Ok(variants)
}
