//! Challenge, region and corpus records.

use serde::{Deserialize, Serialize};

use crate::constants::CORPUS_VERSION;
use crate::model::shape::RegionShape;

/// Difficulty tier of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Get the serialized name of this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Get all tiers from easiest to hardest.
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Parse a tier name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

/// A labeled area of a challenge image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Geometry in canonical space.
    pub shape: RegionShape,
    /// Whether clicking this region passes the challenge.
    pub is_correct: bool,
    /// What the region shows (e.g. "leaking tap").
    #[serde(default)]
    pub label: String,
}

impl Region {
    /// Create a new region.
    pub fn new(shape: RegionShape, is_correct: bool, label: impl Into<String>) -> Self {
        Self {
            shape,
            is_correct,
            label: label.into(),
        }
    }
}

/// One verification task: an image, a question and its regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Stable identifier derived from the source filename.
    pub id: String,
    /// Open-ended taxonomy ("plumbing", "electrical", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Prompt shown to the user.
    pub question: String,
    /// Path or URL of the canonical image.
    pub image_url: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Regions in insertion order.
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Challenge {
    /// Iterate over the correct regions with their indices, in insertion order.
    pub fn correct_regions(&self) -> impl Iterator<Item = (usize, &Region)> {
        self.regions.iter().enumerate().filter(|(_, r)| r.is_correct)
    }

    /// Check if the challenge can be passed at all.
    pub fn has_correct_region(&self) -> bool {
        self.regions.iter().any(|r| r.is_correct)
    }
}

/// The persisted collection of challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    /// Artifact format version.
    pub version: String,
    /// Challenges in source manifest order.
    pub challenges: Vec<Challenge>,
}

impl Corpus {
    /// Create a corpus tagged with the current version.
    pub fn new(challenges: Vec<Challenge>) -> Self {
        Self {
            version: CORPUS_VERSION.to_string(),
            challenges,
        }
    }

    /// Total number of regions across all challenges.
    pub fn total_regions(&self) -> usize {
        self.challenges.iter().map(|c| c.regions.len()).sum()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
