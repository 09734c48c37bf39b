//! Region shapes.

use serde::{Deserialize, Serialize};

use crate::geometry::{self, GeometryError, Point};

/// Geometry of a region, tagged by shape kind.
///
/// Serializes with the shape name in a `name` field, matching the annotation
/// tool's `region_shape_attributes` layout:
///
/// ```json
/// { "name": "rect", "x": 150, "y": 150, "width": 50, "height": 50 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Shape<T> {
    /// Closed polygon; vertex `i` is `(all_points_x[i], all_points_y[i])`.
    Polygon {
        all_points_x: Vec<T>,
        all_points_y: Vec<T>,
    },
    /// Axis-aligned rectangle defined by top-left corner and size.
    Rect { x: T, y: T, width: T, height: T },
    /// Axis-aligned ellipse defined by centre and radii.
    Ellipse { cx: T, cy: T, rx: T, ry: T },
}

/// A shape in canonical pixel space. All coordinates are integers.
pub type RegionShape = Shape<i32>;

/// A shape as drawn against a source image, before normalization.
pub type SourceShape = Shape<f64>;

/// Shape kind without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Polygon,
    Rect,
    Ellipse,
}

impl ShapeKind {
    /// Get the serialized name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rect => "rect",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

impl<T: Copy + Into<f64>> Shape<T> {
    /// Get the kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
        }
    }

    /// Check that the shape is well formed.
    ///
    /// Polygons need equal-length coordinate arrays with at least three
    /// vertices; widths, heights and radii must be non-negative; every value
    /// must be finite.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Shape::Polygon {
                all_points_x,
                all_points_y,
            } => geometry::check_polygon(all_points_x, all_points_y),
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                check_finite("x", *x)?;
                check_finite("y", *y)?;
                check_extent("width", *width)?;
                check_extent("height", *height)
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                check_finite("cx", *cx)?;
                check_finite("cy", *cy)?;
                check_extent("rx", *rx)?;
                check_extent("ry", *ry)
            }
        }
    }

    /// Check if a point is inside this shape.
    ///
    /// Only polygons can fail, when their coordinate arrays are malformed.
    pub fn contains(&self, point: Point) -> Result<bool, GeometryError> {
        match self {
            Shape::Polygon {
                all_points_x,
                all_points_y,
            } => geometry::point_in_polygon(point, all_points_x, all_points_y),
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Ok(geometry::point_in_rect(point, *x, *y, *width, *height)),
            Shape::Ellipse { cx, cy, rx, ry } => {
                Ok(geometry::point_in_ellipse(point, *cx, *cy, *rx, *ry))
            }
        }
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    ///
    /// Returns `None` for a polygon without vertices.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Shape::Polygon {
                all_points_x,
                all_points_y,
            } => {
                let (min_x, max_x) = min_max(all_points_x)?;
                let (min_y, max_y) = min_max(all_points_y)?;
                Some((min_x, min_y, max_x, max_y))
            }
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let (x, y, width, height): (f64, f64, f64, f64) =
                    ((*x).into(), (*y).into(), (*width).into(), (*height).into());
                Some((x, y, x + width, y + height))
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                let (cx, cy, rx, ry): (f64, f64, f64, f64) =
                    ((*cx).into(), (*cy).into(), (*rx).into(), (*ry).into());
                Some((cx - rx, cy - ry, cx + rx, cy + ry))
            }
        }
    }
}

fn check_finite<T: Into<f64>>(field: &'static str, value: T) -> Result<(), GeometryError> {
    if value.into().is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFiniteCoordinate { field })
    }
}

fn check_extent<T: Into<f64>>(field: &'static str, value: T) -> Result<(), GeometryError> {
    let value: f64 = value.into();
    if !value.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate { field });
    }
    if value < 0.0 {
        return Err(GeometryError::NegativeExtent { field, value });
    }
    Ok(())
}

fn min_max<T: Copy + Into<f64>>(values: &[T]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, v| {
        let v: f64 = (*v).into();
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
        })
    })
}
