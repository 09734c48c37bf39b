//! Challenge corpus store.
//!
//! The corpus artifact is a JSON document written once by ingestion and read
//! wholesale at session start:
//!
//! ```json
//! { "version": "1.0.0", "challenges": [ { "id": "sink", "type": "plumbing", ... } ] }
//! ```
//!
//! A loaded store is immutable, so it can be shared freely between sessions.

use std::path::Path;

use thiserror::Error;

use crate::constants::CORPUS_VERSION;
use crate::geometry::GeometryError;
use crate::model::{Challenge, Corpus};

/// Errors that can occur when loading or saving a corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// I/O error reading or writing the artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact is not valid corpus JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact version cannot be read by this build
    #[error("Unsupported corpus version '{found}' (expected {expected})")]
    VersionMismatch {
        expected: &'static str,
        found: String,
    },

    /// A stored region is malformed
    #[error("Invalid region {index} in challenge '{challenge}': {source}")]
    InvalidRegion {
        challenge: String,
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Parse a `major.minor.patch` version string.
pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let major = parts[0].parse().ok()?;
    let minor = parts[1].parse().ok()?;
    let patch = parts[2].parse().ok()?;
    Some((major, minor, patch))
}

/// Check if an artifact version can be read. Any version with the same
/// major number as [`CORPUS_VERSION`] is accepted.
pub fn is_version_readable(version: &str) -> bool {
    match (parse_version(version), parse_version(CORPUS_VERSION)) {
        (Some((major, _, _)), Some((current, _, _))) => major == current,
        _ => false,
    }
}

/// Read-only collection of challenges.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    corpus: Corpus,
}

impl CorpusStore {
    /// Load and validate a corpus artifact.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        log::info!(
            "Loaded corpus {:?}: {} challenges, {} regions",
            path,
            store.len(),
            store.corpus.total_regions()
        );
        Ok(store)
    }

    /// Parse and validate corpus JSON.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let corpus: Corpus = serde_json::from_str(json)?;
        Self::from_corpus(corpus)
    }

    /// Wrap an in-memory corpus after validating it.
    pub fn from_corpus(corpus: Corpus) -> Result<Self, CorpusError> {
        if !is_version_readable(&corpus.version) {
            return Err(CorpusError::VersionMismatch {
                expected: CORPUS_VERSION,
                found: corpus.version,
            });
        }
        if corpus.version != CORPUS_VERSION {
            log::warn!(
                "Corpus version {} differs from {}, reading anyway",
                corpus.version,
                CORPUS_VERSION
            );
        }

        for challenge in &corpus.challenges {
            for (index, region) in challenge.regions.iter().enumerate() {
                region
                    .shape
                    .validate()
                    .map_err(|source| CorpusError::InvalidRegion {
                        challenge: challenge.id.clone(),
                        index,
                        source,
                    })?;
            }
        }

        Ok(Self { corpus })
    }

    /// Get the underlying corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Get all challenges in artifact order.
    pub fn challenges(&self) -> &[Challenge] {
        &self.corpus.challenges
    }

    /// Find a challenge by id.
    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.corpus.challenges.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.corpus.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.challenges.is_empty()
    }
}

/// Write a corpus artifact as pretty-printed JSON.
pub fn save_corpus(corpus: &Corpus, path: &Path) -> Result<(), CorpusError> {
    let json = serde_json::to_string_pretty(corpus)?;
    std::fs::write(path, json)?;
    log::info!("Saved corpus to {:?}", path);
    Ok(())
}
