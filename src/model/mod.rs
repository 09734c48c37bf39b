//! Data models for clickproof.

mod challenge;
mod shape;

pub use challenge::{Challenge, Corpus, Difficulty, Region};
pub use shape::{RegionShape, Shape, ShapeKind, SourceShape};
