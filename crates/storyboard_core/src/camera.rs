//! Camera angle catalogue.

/// Every angle the allocator may hand out.
pub const CAMERA_ANGLES: [&str; 15] = [
    "low angle shot",
    "high angle shot",
    "bird's eye view",
    "worm's eye view",
    "eye level shot",
    "dutch angle",
    "over-the-shoulder shot",
    "medium shot",
    "close-up shot",
    "extreme close-up",
    "wide shot",
    "extreme wide shot",
    "tracking shot",
    "POV shot",
    "two shot",
];

/// Angles tried first, when valid for the current phase.
pub const PRIORITY_ANGLES: [&str; 5] = [
    "wide shot",
    "tracking shot",
    "dutch angle",
    "bird's eye view",
    "establishing shot",
];

/// Returned once every angle has been used.
pub const DEFAULT_CAMERA_ANGLE: &str = "wide shot";
