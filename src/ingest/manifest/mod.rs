//! Annotation manifest parsing.
//!
//! Manifests are exported by the annotation tool (VGG Image Annotator) either
//! as CSV, one row per region, or as a JSON project keyed by image. Both are
//! flattened into [`AnnotationRecord`]s, one per region, in manifest order.
//! Shape and attribute payloads stay as raw JSON here; they are interpreted
//! per region by [`attributes`] so a bad region never fails the whole batch.

pub mod attributes;
mod error;
mod via_csv;
mod via_json;

use std::collections::HashMap;
use std::path::Path;

pub use error::ManifestError;
pub use via_csv::ViaCsvFormat;
pub use via_json::ViaJsonFormat;

/// One region record, or one image without regions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    /// 1-based position in the manifest, for diagnostics.
    pub row: usize,
    /// Source image filename, relative to the image directory.
    pub filename: String,
    /// Per-file metadata (`type`, `question`, `difficulty`).
    pub file_attributes: serde_json::Value,
    /// The region, or `None` when the image has no regions.
    pub region: Option<RawRegion>,
}

/// Uninterpreted region payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRegion {
    /// Shape attributes (`name` plus shape-specific fields).
    pub shape: serde_json::Value,
    /// Region attributes (`isCorrect`, `label`).
    pub attributes: serde_json::Value,
}

impl RawRegion {
    /// Build a region from raw payloads, `None` when the shape is empty.
    pub fn from_values(shape: serde_json::Value, attributes: serde_json::Value) -> Option<Self> {
        let empty = match &shape {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        (!empty).then_some(Self { shape, attributes })
    }
}

/// A manifest format the ingestion pipeline can read.
pub trait ManifestFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "via-csv").
    fn id(&self) -> &'static str;

    /// Human-readable name for messages.
    fn display_name(&self) -> &'static str;

    /// File extensions this format uses.
    fn extensions(&self) -> &[&'static str];

    /// Parse manifest content into records in manifest order.
    fn parse(&self, content: &str) -> Result<Vec<AnnotationRecord>, ManifestError>;
}

/// Registry of available manifest formats.
pub struct ManifestRegistry {
    formats: HashMap<&'static str, Box<dyn ManifestFormat>>,
}

impl ManifestRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(ViaCsvFormat));
        registry.register(Box::new(ViaJsonFormat));

        registry
    }

    /// Register a format implementation.
    pub fn register(&mut self, format: Box<dyn ManifestFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn ManifestFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Find the format for a file extension (case-insensitive).
    pub fn by_extension(&self, ext: &str) -> Option<&dyn ManifestFormat> {
        self.formats
            .values()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .map(|f| f.as_ref())
    }

    /// Get all format IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.formats.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Read and parse a manifest file, choosing the format by extension.
    pub fn read(&self, path: &Path) -> Result<Vec<AnnotationRecord>, ManifestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = self
            .by_extension(ext)
            .ok_or_else(|| ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;

        log::info!("Reading {} manifest {:?}", format.display_name(), path);
        let content = std::fs::read_to_string(path)?;
        let records = format.parse(&content)?;
        log::debug!("Manifest {:?} has {} records", path, records.len());
        Ok(records)
    }
}

impl Default for ManifestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON-in-text attribute column. Blank text counts as `{}`.
fn parse_json_column(
    text: &str,
    row: usize,
    column: &str,
) -> Result<serde_json::Value, ManifestError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text).map_err(|e| ManifestError::InvalidRecord {
        row,
        message: format!("{column}: {e}"),
    })
}
