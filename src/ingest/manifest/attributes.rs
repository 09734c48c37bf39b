//! Interpretation of per-file and per-region attribute payloads.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::RawRegion;
use crate::constants::{DEFAULT_CHALLENGE_TYPE, DEFAULT_QUESTION};
use crate::model::{Difficulty, Shape, SourceShape};
use crate::transform::TransformError;

/// Why a single region could not be ingested.
#[derive(Error, Debug)]
pub enum RegionError {
    /// Shape payload has no `name`
    #[error("Shape has no name")]
    MissingName,

    /// Shape kind the challenge model cannot express
    #[error("Unsupported shape '{name}'")]
    Unsupported {
        /// Shape name from the manifest
        name: String,
    },

    /// Ellipse drawn with a rotation
    #[error("Rotated ellipse (theta = {theta}) is not supported")]
    RotatedEllipse {
        /// Rotation in radians
        theta: f64,
    },

    /// Shape fields are missing or not numeric
    #[error("Malformed {name}: {source}")]
    Malformed {
        /// Shape name from the manifest
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Shape could not be mapped into canonical space
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl RegionError {
    fn unsupported(name: &str) -> Self {
        Self::Unsupported {
            name: name.to_string(),
        }
    }
}

/// Per-file challenge metadata with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttributes {
    pub kind: String,
    pub question: String,
    pub difficulty: Difficulty,
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self {
            kind: DEFAULT_CHALLENGE_TYPE.to_string(),
            question: DEFAULT_QUESTION.to_string(),
            difficulty: Difficulty::default(),
        }
    }
}

impl FileAttributes {
    /// Read `type`, `question` and `difficulty`, falling back to defaults.
    ///
    /// Blank strings count as missing. An unknown difficulty is replaced by
    /// the default and reported through `warnings`.
    pub fn from_value(value: &Value, warnings: &mut Vec<String>) -> Self {
        let mut attributes = Self::default();

        if let Some(kind) = text_field(value, "type") {
            attributes.kind = kind.to_string();
        }
        if let Some(question) = text_field(value, "question") {
            attributes.question = question.to_string();
        }
        if let Some(name) = text_field(value, "difficulty") {
            match Difficulty::parse(name) {
                Some(difficulty) => attributes.difficulty = difficulty,
                None => warnings.push(format!(
                    "unknown difficulty '{name}', using '{}'",
                    attributes.difficulty.name()
                )),
            }
        }

        attributes
    }
}

/// A region as drawn against its source image.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRegion {
    pub shape: SourceShape,
    pub is_correct: bool,
    pub label: String,
}

#[derive(Deserialize)]
struct Circle {
    cx: f64,
    cy: f64,
    r: f64,
}

/// Interpret a raw region payload.
///
/// `circle` becomes an ellipse with equal radii. `point`, `polyline` and
/// rotated ellipses have no hit-test counterpart and are rejected.
pub fn parse_region(raw: &RawRegion) -> Result<SourceRegion, RegionError> {
    let name = raw
        .shape
        .get("name")
        .and_then(Value::as_str)
        .ok_or(RegionError::MissingName)?;

    let malformed = |source| RegionError::Malformed {
        name: name.to_string(),
        source,
    };

    let shape = match name {
        "polygon" | "rect" => SourceShape::deserialize(&raw.shape).map_err(malformed)?,
        "ellipse" => {
            if let Some(theta) = raw.shape.get("theta").and_then(Value::as_f64) {
                if theta != 0.0 {
                    return Err(RegionError::RotatedEllipse { theta });
                }
            }
            SourceShape::deserialize(&raw.shape).map_err(malformed)?
        }
        "circle" => {
            let circle = Circle::deserialize(&raw.shape).map_err(malformed)?;
            Shape::Ellipse {
                cx: circle.cx,
                cy: circle.cy,
                rx: circle.r,
                ry: circle.r,
            }
        }
        other => return Err(RegionError::unsupported(other)),
    };

    Ok(SourceRegion {
        shape,
        is_correct: is_correct(&raw.attributes),
        label: text_field(&raw.attributes, "label")
            .unwrap_or_default()
            .to_string(),
    })
}

/// The annotation tool stores `isCorrect` as the string "true"; a JSON bool
/// is accepted as well. Anything else is false.
fn is_correct(attributes: &Value) -> bool {
    match attributes.get("isCorrect") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Non-blank string field, trimmed.
fn text_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
