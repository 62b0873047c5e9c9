//! Frame planning and the per-frame pipeline.

mod test_utils;

use std::sync::Arc;
use storyboard_core::{FrameSource, ImageRequest, Phase};
use storyboard_error::{CollaboratorErrorKind, FrameErrorKind, FrameStage, StoryErrorKind};
use storyboard_narrative::{
    FrameGenerator, FrameStatus, StoryRunState, StorySettings, plan_frame, render,
};
use test_utils::{StoryImage, StoryText, fast_config};
use tokio_util::sync::CancellationToken;

const SCENARIO: &str = "A lighthouse keeper finds a message in a bottle";

fn state(total: u32) -> StoryRunState {
    let settings = StorySettings {
        seed: Some(3),
        ..Default::default()
    };
    StoryRunState::new(SCENARIO, total, &settings).unwrap()
}

#[test]
fn plan_carries_position_camera_and_scene() {
    let mut state = state(4);
    let plan = plan_frame(&mut state, 1).unwrap();

    assert_eq!(plan.frame(), 1);
    assert_eq!(*plan.context().phase(), Phase::Setup);
    assert!(plan.prompt().contains("Frame #1 of 4"));
    assert!(plan.prompt().contains(SCENARIO));
    assert!(plan.prompt().contains(&format!("Must be {}", plan.camera_angle())));
    assert!(plan.prompt().contains(&format!("Scene Type: {}", plan.seed().archetype())));
    assert!(state.camera().is_used(plan.camera_angle()));
    assert_eq!(state.diversity().seeds().len(), 1);
}

#[test]
fn consecutive_plans_do_not_repeat_camera_angles() {
    let mut state = state(6);
    let angles: Vec<String> = (1..=6)
        .map(|frame| plan_frame(&mut state, frame).unwrap().camera_angle().clone())
        .collect();
    for pair in angles.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn planning_outside_the_run_fails_fast() {
    let mut state = state(3);
    let err = plan_frame(&mut state, 4).unwrap_err();
    assert_eq!(err.kind, StoryErrorKind::FrameOutOfRange { frame: 4, total: 3 });
    assert!(state.diversity().seeds().is_empty());
}

#[tokio::test]
async fn empty_image_payload_is_an_error() {
    let image = StoryImage::blank();
    let request = ImageRequest::new("a lighthouse", "flux");
    let err = render(&image, &request).await.unwrap_err();
    assert_eq!(err.kind, CollaboratorErrorKind::EmptyResponse);
}

#[tokio::test]
async fn rendered_handle_keeps_request_parameters() {
    let image = StoryImage::new();
    let request = ImageRequest::new("a lighthouse", "turbo")
        .with_seed(99u64)
        .with_width(1920u32)
        .with_height(1080u32);
    let handle = render(&image, &request).await.unwrap();
    assert_eq!(handle.model(), "turbo");
    assert_eq!(*handle.seed(), 99);
    assert_eq!((*handle.width(), *handle.height()), (1920, 1080));
    assert_eq!(handle.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn image_requests_follow_configuration() {
    let text = Arc::new(StoryText::new());
    let image = Arc::new(StoryImage::new());
    let mut config = fast_config();
    config.image.aspect = "16:9".to_string();
    config.image.style = "Film Noir".to_string();
    config.image.negative_prompt = "watermark".to_string();
    let generator = FrameGenerator::new(text, image.clone(), config);

    let mut state = state(2);
    let plan = plan_frame(&mut state, 1).unwrap();
    let output = generator
        .generate_frame(&mut state, plan, &CancellationToken::new())
        .await
        .unwrap();

    let requests = image.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model(), "flux");
    assert_eq!(*request.seed(), 42);
    assert_eq!((*request.width(), *request.height()), (1920, 1080));
    assert!(request.prompt().contains("**Title:** Shot 1."));
    assert!(request.prompt().contains("watermark"));
    assert_eq!(*output.image.seed(), 42);
    assert_eq!(state.status(1), FrameStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn image_failure_keeps_the_frame_text() {
    let text = Arc::new(StoryText::new());
    let image = Arc::new(StoryImage::blank());
    let mut config = fast_config();
    config.models.image = "custom-model".to_string();
    let generator = FrameGenerator::new(text, image.clone(), config);

    let mut state = state(2);
    let plan = plan_frame(&mut state, 1).unwrap();
    let failure = generator
        .generate_frame(&mut state, plan, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure.error.frame, 1);
    assert_eq!(failure.error.stage, FrameStage::Image);
    match &failure.error.kind {
        FrameErrorKind::Exhausted { attempts, last_error } => {
            assert_eq!(*attempts, 2);
            assert!(last_error.contains("empty result"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }

    let partial = failure.partial.expect("text survives the image failure");
    assert_eq!(partial.details.title, "Shot 1");
    assert!(partial.image.is_none());

    // Unknown models fall back to the default image model only.
    let models: Vec<String> = image.requests().iter().map(|r| r.model().clone()).collect();
    assert_eq!(models, vec!["custom-model", "custom-model", "flux", "flux"]);
    assert_eq!(state.status(1), FrameStatus::Failed(FrameStage::Image));
}

#[tokio::test(start_paused = true)]
async fn fallback_frame_keeps_the_planned_camera_angle() {
    let text = Arc::new(StoryText::prose());
    let image = Arc::new(StoryImage::new());
    let generator = FrameGenerator::new(text, image.clone(), fast_config());

    let mut state = state(3);
    let plan = plan_frame(&mut state, 1).unwrap();
    let angle = plan.camera_angle().clone();
    let output = generator
        .generate_frame(&mut state, plan, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.source, FrameSource::Fallback);
    assert_eq!(output.details.camera, angle);
    let requests = image.requests();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0]
            .prompt()
            .contains(&format!("**Camera Angle:** {angle}."))
    );
}
