//! Annotation ingestion and canonicalization.
//!
//! Reads an annotation manifest and its source images, resizes every image
//! onto the canonical 800×600 canvas, maps each region through the same
//! transform, and writes the normalized images plus the corpus artifact.
//!
//! Failures tied to one source file are isolated: the file is skipped and
//! listed in the [`IngestReport`]. An unreadable manifest, an empty batch or
//! an unwritable output directory abort the run.

mod error;
pub mod image;
pub mod manifest;
mod pipeline;

pub use error::IngestError;
pub use self::image::{ImageNormalizer, OutputFormat, ResizePolicy};
pub use pipeline::{IngestOutcome, IngestReport, Ingestor, challenge_id};

#[cfg(test)]
mod tests;
