//! Global constants for clickproof

/// Canonical image width in pixels. Every challenge image has this width.
pub const TARGET_WIDTH: u32 = 800;

/// Canonical image height in pixels. Every challenge image has this height.
pub const TARGET_HEIGHT: u32 = 600;

/// Version tag written into every corpus artifact.
pub const CORPUS_VERSION: &str = "1.0.0";

/// Default corpus artifact filename inside the output directory.
pub const DEFAULT_CORPUS_FILENAME: &str = "challenges.json";

/// Default URL prefix under which normalized images are served.
pub const DEFAULT_IMAGE_URL_PREFIX: &str = "/challenges/normalized";

/// Challenge type used when the annotation has none.
pub const DEFAULT_CHALLENGE_TYPE: &str = "unknown";

/// Question used when the annotation has none.
pub const DEFAULT_QUESTION: &str = "Identify the issue in this image";

/// Padding color for the `contain` resize policy (white).
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

/// How long a failure message stays visible, in milliseconds.
pub const FAILURE_MESSAGE_DURATION_MS: u64 = 2000;

/// Feedback shown on success when the matched region has no label.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "You found it!";

/// Minimum number of vertices for a polygon region.
pub const MIN_POLYGON_VERTICES: usize = 3;
