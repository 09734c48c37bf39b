//! Cosmetic feedback text.

use rand::Rng;
use rand::seq::SliceRandom;
use web_time::{Duration, Instant};

use crate::constants::DEFAULT_SUCCESS_MESSAGE;

const PLUMBING: &[&str] = &[
    "That's not where the leak is!",
    "Better call a plumber...",
    "Have you tried turning it off and on again?",
    "Time to break out the WD-40!",
];

const CONSTRUCTION: &[&str] = &[
    "That wall isn't going anywhere!",
    "Back to the drawing board...",
    "Time to call the foreman...",
    "Did you check the blueprints?",
];

const ELECTRICAL: &[&str] = &[
    "Shocking attempt!",
    "That's not very bright...",
    "Current-ly not correct...",
    "Watt were you thinking?",
];

const ROOFING: &[&str] = &[
    "That's not where the leak is!",
    "Through the roof with that attempt!",
    "Time to call the roofer...",
    "Shingle and ready to mingle... with a professional",
];

const DAMP: &[&str] = &[
    "That's not damp, that's modern art!",
    "Dry your eyes, that's not it...",
    "Keep looking, it's not that damp spot!",
    "Not quite right, try again...",
];

const LEAK: &[&str] = &[
    "That's supposed to be wet!",
    "The leak is in another castle...",
    "Keep looking, we're not paying for all this water!",
    "Nope, that's just your tears of frustration",
    "Have you tried using flex tape?",
];

const CRACK: &[&str] = &[
    "That's a feature, not a crack!",
    "Nice try, but that's just a shadow",
    "Keep looking, it's breaking my heart...",
    "Have you tried turning the wall off and on again?",
    "That's just character building!",
];

const DEFAULT: &[&str] = &[
    "Not quite right...",
    "Time to call a professional?",
    "Back to the drawing board...",
    "That's a feature, not a bug!",
];

/// Failure messages for a challenge type. Unknown types get a generic set.
pub fn failure_messages(kind: &str) -> &'static [&'static str] {
    match kind.trim().to_ascii_lowercase().as_str() {
        "plumbing" => PLUMBING,
        "construction" => CONSTRUCTION,
        "electrical" => ELECTRICAL,
        "roofing" => ROOFING,
        "damp" => DAMP,
        "leak" => LEAK,
        "crack" => CRACK,
        _ => DEFAULT,
    }
}

/// Pick a failure message for a challenge type at random.
pub fn random_failure_message<R: Rng + ?Sized>(kind: &str, rng: &mut R) -> &'static str {
    failure_messages(kind)
        .choose(rng)
        .copied()
        .unwrap_or(DEFAULT[0])
}

/// Success feedback: the matched region's label, or a generic line.
pub fn success_message(label: &str) -> &str {
    let label = label.trim();
    if label.is_empty() {
        DEFAULT_SUCCESS_MESSAGE
    } else {
        label
    }
}

/// A message that disappears on its own after a fixed time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientMessage {
    text: String,
    shown_at: Instant,
    duration: Duration,
}

impl TransientMessage {
    pub fn new(text: impl Into<String>, shown_at: Instant, duration: Duration) -> Self {
        Self {
            text: text.into(),
            shown_at,
            duration,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the message is still visible at `now`.
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_known_and_unknown_types() {
        assert_eq!(failure_messages("electrical")[0], "Shocking attempt!");
        assert_eq!(failure_messages("Leak").len(), 5);
        assert_eq!(failure_messages("unknown"), DEFAULT);
        assert_eq!(failure_messages(""), DEFAULT);
    }

    #[test]
    fn test_random_message_from_type_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let message = random_failure_message("crack", &mut rng);
            assert!(CRACK.contains(&message));
        }
    }

    #[test]
    fn test_success_message() {
        assert_eq!(success_message("leaking tap"), "leaking tap");
        assert_eq!(success_message(""), "You found it!");
        assert_eq!(success_message("   "), "You found it!");
    }

    #[test]
    fn test_transient_message_expires() {
        let start = Instant::now();
        let message = TransientMessage::new("Nope", start, Duration::from_millis(2000));
        assert!(message.is_visible_at(start));
        assert!(message.is_visible_at(start + Duration::from_millis(1999)));
        assert!(!message.is_visible_at(start + Duration::from_millis(2000)));
        assert_eq!(message.text(), "Nope");
    }
}
