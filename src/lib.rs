//! clickproof - image-click verification challenges
//!
//! Two halves share one canonical 800×600 coordinate space:
//!
//! - [`ingest`] turns annotated source images of any size into normalized
//!   images and a corpus of challenges whose regions are expressed in
//!   canonical pixels.
//! - [`session`] presents challenges from a [`corpus::CorpusStore`], converts
//!   clicks on the rendered image to canonical points, and hit-tests them
//!   with [`geometry`].

pub mod config;
pub mod constants;
pub mod corpus;
pub mod geometry;
pub mod ingest;
pub mod model;
pub mod session;
pub mod transform;

pub use corpus::CorpusStore;
pub use ingest::Ingestor;
pub use model::{Challenge, Corpus, Region, RegionShape};
pub use session::{Session, SessionEvent, SessionState, VerificationResponse};
