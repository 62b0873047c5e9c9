use storyboard_core::{
    FrameResult, FrameSource, GeneratedImage, ImageHandle, ImageRequest, Storyboard,
    StoryboardFrame,
};

fn frame(index: u32, title: &str, image: Option<ImageHandle>) -> StoryboardFrame {
    StoryboardFrame {
        frame: index,
        details: FrameResult::builder().title(title).build().unwrap(),
        source: FrameSource::Parsed,
        image,
    }
}

#[test]
fn storyboard_serializes_with_camel_case_keys() {
    let mut board = Storyboard::new("run-7", "A lighthouse keeper finds a map", 2);
    board.upsert(frame(1, "The Map", None));

    let json = serde_json::to_value(&board).unwrap();
    assert_eq!(json["runId"], "run-7");
    assert_eq!(json["totalFrames"], 2);
    assert_eq!(json["frames"][0]["details"]["storyProgress"], "Story in progress");
    assert_eq!(json["frames"][0]["source"], "parsed");
}

#[test]
fn storyboard_round_trips_through_json() {
    let request = ImageRequest::builder().prompt("a map").seed(11u64).build().unwrap();
    let handle = ImageHandle::new(&request, GeneratedImage::new(b"png".to_vec(), "image/png"));

    let mut board = Storyboard::new("run-8", "scenario", 3);
    board.upsert(frame(3, "Storm", None));
    board.upsert(frame(1, "Dawn", Some(handle)));

    let text = serde_json::to_string(&board).unwrap();
    let restored: Storyboard = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, board);
    assert_eq!(restored.frames()[0].frame, 1);
    assert_eq!(restored.frame(1).unwrap().image.as_ref().unwrap().data(), b"png");
}

#[test]
fn shrinking_total_frames_drops_trailing_frames() {
    let mut board = Storyboard::new("run-9", "scenario", 3);
    for i in 1..=3 {
        board.upsert(frame(i, "x", None));
    }
    board.set_total_frames(2);
    assert_eq!(board.frames().len(), 2);
    assert!(board.frame(3).is_none());
}
