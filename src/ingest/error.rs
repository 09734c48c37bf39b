//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

use super::manifest::ManifestError;
use super::manifest::attributes::RegionError;
use crate::corpus::CorpusError;
use crate::transform::TransformError;

/// Errors that can occur while ingesting a batch.
///
/// [`IngestError::Manifest`], [`IngestError::EmptyBatch`] and output
/// failures abort the batch. Everything tied to a single source file is
/// reported and that file is skipped, unless the pipeline is configured to
/// stop on the first failure.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O error on the output side
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Source image does not exist
    #[error("Image not found: {0:?}")]
    ImageNotFound(PathBuf),

    /// Source image could not be decoded
    #[error("Failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Source image size could not be determined or is zero
    #[error("Missing dimensions for image {image:?}")]
    MissingDimensions { image: PathBuf },

    /// Image size rejected by the coordinate transform
    #[error("Cannot scale image {image:?}: {source}")]
    Transform {
        image: PathBuf,
        #[source]
        source: TransformError,
    },

    /// A region that cannot be ingested
    #[error("Region {index} of {filename}: {source}")]
    Shape {
        filename: String,
        index: usize,
        #[source]
        source: RegionError,
    },

    /// Two source files map to the same challenge id
    #[error("Duplicate challenge id '{id}' (from {filename})")]
    DuplicateId { id: String, filename: String },

    /// Filename without a usable stem
    #[error("Cannot derive a challenge id from '{0}'")]
    InvalidFilename(String),

    /// Manifest contains no images
    #[error("Manifest contains no images")]
    EmptyBatch,

    /// Normalized image could not be written
    #[error("Failed to encode {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Corpus artifact could not be written
    #[error("Failed to write corpus: {0}")]
    Corpus(#[from] CorpusError),
}

impl IngestError {
    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a decode error for an image path.
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Create an encode error for an output path.
    pub fn encode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }

    /// Check if this error ends the whole batch regardless of policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::Manifest(_)
                | Self::EmptyBatch
                | Self::Corpus(_)
        )
    }
}
