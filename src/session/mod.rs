//! Challenge session state machine.
//!
//! One [`Session`] drives one widget: it shuffles the corpus, presents a
//! challenge, turns clicks on the rendered image into canonical points, and
//! verifies them against the challenge's correct regions.
//!
//! ```text
//! Loading ──▶ Presenting ──click──▶ AwaitingSelection ──verify──▶ Complete
//!    │             ▲                   ▲          │ (fail)           │
//!    ▼             │                   └──────────┘                  │
//! NoChallenges     └──────────────────────next───────────────────────┘
//! ```
//!
//! Verification runs synchronously inside [`Session::verify`], which takes
//! `&mut self`; events for one session are therefore always serialized.
//! Clicks without a challenge, clicks after completion and verification
//! without a pending point are ignored rather than reported as errors.

mod callback;
pub mod messages;
mod response;


use rand::Rng;
use rand::seq::SliceRandom;
use web_time::Instant;

pub use callback::Callback;
pub use response::{ERROR_INVALID_REGION, VerificationResponse, current_timestamp};

use crate::config::SessionConfig;
use crate::corpus::{CorpusError, CorpusStore};
use crate::geometry::Point;
use crate::model::Challenge;
use crate::transform::render_to_canonical;
use messages::TransientMessage;

/// Lifecycle state. `current` indexes the session's challenge list.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the corpus.
    Loading,
    /// Corpus was empty or failed to load.
    NoChallenges,
    /// A fresh challenge is shown; nothing selected yet.
    Presenting { current: usize },
    /// The user has interacted; `pending` is cleared after a failed attempt.
    AwaitingSelection {
        current: usize,
        pending: Option<Point>,
    },
    /// Passed. Clicks are ignored until the next challenge is requested.
    Complete {
        current: usize,
        matched_label: String,
    },
}

impl SessionState {
    /// Get the index of the displayed challenge, if any.
    pub fn current(&self) -> Option<usize> {
        match self {
            SessionState::Loading | SessionState::NoChallenges => None,
            SessionState::Presenting { current }
            | SessionState::AwaitingSelection { current, .. }
            | SessionState::Complete { current, .. } => Some(*current),
        }
    }

    /// Get the selected point awaiting verification, if any.
    pub fn pending(&self) -> Option<Point> {
        match self {
            SessionState::AwaitingSelection { pending, .. } => *pending,
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SessionState::Complete { .. })
    }
}

/// Discrete inputs to a session.
#[derive(Debug)]
pub enum SessionEvent {
    /// The corpus finished loading.
    CorpusLoaded(Vec<Challenge>),
    /// The corpus could not be loaded.
    CorpusFailed(CorpusError),
    /// Click inside the rendered image, measured in the element's own pixels.
    Click {
        offset_x: f64,
        offset_y: f64,
        rendered_width: f64,
        rendered_height: f64,
    },
    /// Click already expressed in canonical coordinates.
    CanonicalClick(Point),
    Verify,
    Next,
}

/// State for one challenge widget.
pub struct Session<R: Rng> {
    config: SessionConfig,
    rng: R,
    challenges: Vec<Challenge>,
    /// Remaining shuffled indices to draw from on "next".
    working_set: Vec<usize>,
    state: SessionState,
    failure: Option<TransientMessage>,
    load_error: Option<String>,
    on_verify: Callback<VerificationResponse>,
}

impl<R: Rng> Session<R> {
    /// Create a session in the loading state.
    pub fn new(config: SessionConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            challenges: Vec::new(),
            working_set: Vec::new(),
            state: SessionState::Loading,
            failure: None,
            load_error: None,
            on_verify: Callback::none(),
        }
    }

    /// Set the hook that receives every verification result.
    pub fn on_verify<F>(mut self, f: F) -> Self
    where
        F: Fn(VerificationResponse) + 'static,
    {
        self.on_verify = Callback::new(f);
        self
    }

    /// Apply an event. Returns the verification result for [`SessionEvent::Verify`]
    /// when an attempt was made.
    pub fn handle(&mut self, event: SessionEvent) -> Option<VerificationResponse> {
        match event {
            SessionEvent::CorpusLoaded(challenges) => {
                self.load(challenges);
                None
            }
            SessionEvent::CorpusFailed(error) => {
                self.load_failed(&error);
                None
            }
            SessionEvent::Click {
                offset_x,
                offset_y,
                rendered_width,
                rendered_height,
            } => {
                self.click(offset_x, offset_y, rendered_width, rendered_height);
                None
            }
            SessionEvent::CanonicalClick(point) => {
                self.select(point);
                None
            }
            SessionEvent::Verify => self.verify(),
            SessionEvent::Next => {
                self.next();
                None
            }
        }
    }

    /// Start from a loaded store, or from a load failure.
    pub fn load_from_store(&mut self, store: Result<&CorpusStore, &CorpusError>) {
        match store {
            Ok(store) => self.load(store.challenges().to_vec()),
            Err(error) => self.load_failed(error),
        }
    }

    /// Shuffle the challenges and present the first one.
    pub fn load(&mut self, challenges: Vec<Challenge>) {
        self.challenges = challenges;
        self.failure = None;
        self.load_error = None;

        let mut order: Vec<usize> = (0..self.challenges.len()).collect();
        order.shuffle(&mut self.rng);

        // The working set is consumed from the back.
        match order.pop() {
            Some(first) => {
                self.working_set = order;
                self.present(first);
            }
            None => {
                log::warn!("Corpus has no challenges");
                self.working_set.clear();
                self.state = SessionState::NoChallenges;
            }
        }
    }

    /// Record a corpus failure; the session shows the empty state.
    pub fn load_failed(&mut self, error: &CorpusError) {
        log::error!("Failed to load challenges: {}", error);
        self.challenges.clear();
        self.working_set.clear();
        self.failure = None;
        self.load_error = Some(error.to_string());
        self.state = SessionState::NoChallenges;
    }

    /// Handle a click on the rendered image.
    ///
    /// The offset is scaled by canonical size over rendered size and rounded.
    /// Returns `false` if the click was ignored.
    pub fn click(
        &mut self,
        offset_x: f64,
        offset_y: f64,
        rendered_width: f64,
        rendered_height: f64,
    ) -> bool {
        match render_to_canonical(offset_x, offset_y, rendered_width, rendered_height) {
            Ok(point) => self.select(point),
            Err(e) => {
                log::debug!("Ignoring click: {}", e);
                false
            }
        }
    }

    /// Set the pending selection to a canonical point.
    ///
    /// Returns `false` if no challenge is shown or it is already complete.
    pub fn select(&mut self, point: Point) -> bool {
        let current = match self.state {
            SessionState::Presenting { current }
            | SessionState::AwaitingSelection { current, .. } => current,
            _ => return false,
        };
        log::debug!("Selected ({}, {})", point.x, point.y);
        self.state = SessionState::AwaitingSelection {
            current,
            pending: Some(point),
        };
        true
    }

    /// Verify the pending selection against the current challenge.
    ///
    /// Only correct regions are tested, in insertion order; the first hit
    /// provides the feedback label. The result is passed to the verification
    /// hook and returned. Returns `None` when there is nothing to verify.
    pub fn verify(&mut self) -> Option<VerificationResponse> {
        let SessionState::AwaitingSelection {
            current,
            pending: Some(point),
        } = self.state
        else {
            return None;
        };
        let challenge = self.challenges.get(current)?;

        let mut matched = None;
        let mut error_codes = Vec::new();
        for (index, region) in challenge.correct_regions() {
            match region.shape.contains(point) {
                Ok(hit) => {
                    log::debug!(
                        "{} region {} ({}): {}",
                        challenge.id,
                        index,
                        region.shape.kind().name(),
                        if hit { "hit" } else { "miss" }
                    );
                    if hit {
                        matched = Some(region.label.clone());
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("{} region {} cannot be tested: {}", challenge.id, index, e);
                    if !error_codes.iter().any(|c| c == ERROR_INVALID_REGION) {
                        error_codes.push(ERROR_INVALID_REGION.to_string());
                    }
                }
            }
        }

        let response =
            VerificationResponse::new(matched.is_some(), self.config.hostname.clone(), error_codes);
        log::info!(
            "Challenge {} at ({}, {}): {}",
            challenge.id,
            point.x,
            point.y,
            if response.success { "passed" } else { "failed" }
        );

        match matched {
            Some(matched_label) => {
                self.failure = None;
                self.state = SessionState::Complete {
                    current,
                    matched_label,
                };
            }
            None => {
                let text = messages::random_failure_message(&challenge.kind, &mut self.rng);
                self.failure = Some(TransientMessage::new(
                    text,
                    Instant::now(),
                    self.config.failure_message_duration(),
                ));
                self.state = SessionState::AwaitingSelection {
                    current,
                    pending: None,
                };
            }
        }

        self.on_verify.call(response.clone());
        Some(response)
    }

    /// Move to another challenge after completion.
    ///
    /// Draws from the shuffled working set, never returning the challenge
    /// just completed when another exists. An exhausted working set is
    /// refilled with a fresh shuffle. Returns `false` if ignored.
    pub fn next(&mut self) -> bool {
        let SessionState::Complete { current, .. } = self.state else {
            return false;
        };

        let Some(current_id) = self.challenges.get(current).map(|c| c.id.clone()) else {
            return false;
        };
        let is_other = |challenges: &[Challenge], index: usize| {
            challenges.get(index).is_some_and(|c| c.id != current_id)
        };

        let mut drawn = None;
        while let Some(index) = self.working_set.pop() {
            if is_other(&self.challenges, index) {
                drawn = Some(index);
                break;
            }
        }

        if drawn.is_none() {
            let mut refill: Vec<usize> = (0..self.challenges.len())
                .filter(|&i| is_other(&self.challenges, i))
                .collect();
            refill.shuffle(&mut self.rng);
            log::debug!("Working set refilled with {} challenges", refill.len());
            drawn = refill.pop();
            self.working_set = refill;
        }

        // A corpus with a single challenge can only repeat it.
        self.present(drawn.unwrap_or(current));
        true
    }

    fn present(&mut self, index: usize) {
        self.failure = None;
        if let Some(challenge) = self.challenges.get(index) {
            log::debug!("Presenting challenge {}", challenge.id);
        }
        self.state = SessionState::Presenting { current: index };
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the displayed challenge.
    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.state.current().and_then(|i| self.challenges.get(i))
    }

    /// Get the success feedback once the challenge is complete.
    pub fn success_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Complete { matched_label, .. } => {
                Some(messages::success_message(matched_label))
            }
            _ => None,
        }
    }

    /// Get the failure message if it is still visible at `now`.
    pub fn failure_message_at(&self, now: Instant) -> Option<&str> {
        self.failure
            .as_ref()
            .filter(|m| m.is_visible_at(now))
            .map(|m| m.text())
    }

    /// Get the failure message if it is still visible.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure_message_at(Instant::now())
    }

    /// Get the corpus load error, if the session is empty because of one.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Number of challenges available to this session.
    pub fn challenge_count(&self) -> usize {
        self.challenges.len()
    }
}
