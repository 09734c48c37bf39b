//! Coordinate scaling between pixel spaces.
//!
//! Region geometry is drawn against source images of arbitrary size and must
//! be re-expressed in the canonical 800×600 space. Positions and extents both
//! scale multiplicatively about the top-left origin. Every scaled value is
//! rounded half away from zero (`f64::round`), so a scale followed by its
//! inverse reproduces the input within one pixel.
//!
//! [`CanvasTransform`] pairs the scale with the padding offsets of a
//! letterboxed resize, so the coordinate transform always matches the way the
//! image itself was resized.

use thiserror::Error;

use crate::constants::{TARGET_HEIGHT, TARGET_WIDTH};
use crate::geometry::{GeometryError, Point};
use crate::model::{RegionShape, Shape};

/// Errors from coordinate scaling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Scale factor is zero, negative or not finite
    #[error("Invalid {axis} scale factor: {value}")]
    InvalidScale {
        /// "x" or "y"
        axis: &'static str,
        /// The rejected factor
        value: f64,
    },

    /// Source or render size is zero, negative or not finite
    #[error("Invalid size {width}x{height}")]
    InvalidSize {
        /// Width that was given
        width: f64,
        /// Height that was given
        height: f64,
    },

    /// Scaled coordinate does not fit the canonical integer range
    #[error("Scaled coordinate out of range: {value}")]
    OutOfRange {
        /// The unrounded scaled value
        value: f64,
    },

    /// Input shape is malformed
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Independent per-axis scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    /// Create scale factors, rejecting zero, negative and non-finite values.
    pub fn new(x: f64, y: f64) -> Result<Self, TransformError> {
        check_factor("x", x)?;
        check_factor("y", y)?;
        Ok(Self { x, y })
    }

    /// Identity scale.
    pub fn identity() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Factors mapping a `width`×`height` source image onto the canonical size.
    pub fn to_canonical(width: u32, height: u32) -> Result<Self, TransformError> {
        Self::between(
            f64::from(width),
            f64::from(height),
            f64::from(TARGET_WIDTH),
            f64::from(TARGET_HEIGHT),
        )
    }

    /// Factors mapping a rendered image element back onto canonical space.
    ///
    /// The element may be displayed at any size; the ratio is taken against
    /// its current rendered size, not the original source image.
    pub fn from_render(rendered_width: f64, rendered_height: f64) -> Result<Self, TransformError> {
        Self::between(
            rendered_width,
            rendered_height,
            f64::from(TARGET_WIDTH),
            f64::from(TARGET_HEIGHT),
        )
    }

    /// The inverse scale.
    pub fn inverse(&self) -> Self {
        Self {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
        }
    }

    fn between(from_w: f64, from_h: f64, to_w: f64, to_h: f64) -> Result<Self, TransformError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(from_w) || !valid(from_h) {
            return Err(TransformError::InvalidSize {
                width: from_w,
                height: from_h,
            });
        }
        Self::new(to_w / from_w, to_h / from_h)
    }
}

/// Scale every coordinate of `shape` by the given factors.
///
/// Returns a new shape of the same kind in integer pixel space. Polygon
/// arrays are scaled element-wise; order and length are preserved.
///
/// # Errors
/// [`TransformError::InvalidScale`] for non-positive or non-finite factors and
/// [`TransformError::Geometry`] if the input shape is malformed.
pub fn scale<T: Copy + Into<f64>>(
    shape: &Shape<T>,
    scale_x: f64,
    scale_y: f64,
) -> Result<RegionShape, TransformError> {
    let factors = ScaleFactors::new(scale_x, scale_y)?;
    CanvasTransform::from_scale(factors).apply(shape)
}

/// Convert a click inside a rendered image element to canonical coordinates.
///
/// `offset_x`/`offset_y` are measured from the element's top-left corner in
/// the element's own (possibly CSS-scaled) pixels.
pub fn render_to_canonical(
    offset_x: f64,
    offset_y: f64,
    rendered_width: f64,
    rendered_height: f64,
) -> Result<Point, TransformError> {
    let factors = ScaleFactors::from_render(rendered_width, rendered_height)?;
    Ok(Point::new(offset_x * factors.x, offset_y * factors.y).rounded())
}

/// Scale plus integer padding offset, applied as `round(v * scale) + offset`.
///
/// Offsets only shift positions; widths, heights and radii are scaled only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub scale: ScaleFactors,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Size of the scaled source image inside the canonical canvas.
    pub content_width: u32,
    pub content_height: u32,
}

impl CanvasTransform {
    /// A pure scale with no padding.
    pub fn from_scale(scale: ScaleFactors) -> Self {
        Self {
            scale,
            offset_x: 0,
            offset_y: 0,
            content_width: TARGET_WIDTH,
            content_height: TARGET_HEIGHT,
        }
    }

    /// Stretch the source to fill the canonical canvas exactly.
    pub fn stretch(source_width: u32, source_height: u32) -> Result<Self, TransformError> {
        Ok(Self::from_scale(ScaleFactors::to_canonical(
            source_width,
            source_height,
        )?))
    }

    /// Fit the source inside the canonical canvas preserving aspect ratio,
    /// centred, with the remainder padded.
    pub fn contain(source_width: u32, source_height: u32) -> Result<Self, TransformError> {
        let stretch = ScaleFactors::to_canonical(source_width, source_height)?;
        let uniform = stretch.x.min(stretch.y);

        let content_width = fit_extent(source_width, uniform, TARGET_WIDTH);
        let content_height = fit_extent(source_height, uniform, TARGET_HEIGHT);

        // Both terms are at most TARGET_* / 2, well inside i32
        let offset_x = ((TARGET_WIDTH - content_width) / 2) as i32;
        let offset_y = ((TARGET_HEIGHT - content_height) / 2) as i32;

        Ok(Self {
            scale: ScaleFactors::new(uniform, uniform)?,
            offset_x,
            offset_y,
            content_width,
            content_height,
        })
    }

    /// Check whether the transform adds padding.
    pub fn is_letterboxed(&self) -> bool {
        self.offset_x != 0 || self.offset_y != 0
    }

    /// Transform a point, rounding to the integer grid.
    pub fn apply_point(&self, point: Point) -> Point {
        Point::new(
            (point.x * self.scale.x).round() + f64::from(self.offset_x),
            (point.y * self.scale.y).round() + f64::from(self.offset_y),
        )
    }

    /// Transform a shape into canonical space.
    pub fn apply<T: Copy + Into<f64>>(
        &self,
        shape: &Shape<T>,
    ) -> Result<RegionShape, TransformError> {
        shape.validate()?;

        let sx = self.scale.x;
        let sy = self.scale.y;
        let ext_x = |v: T| round_coord(Into::<f64>::into(v) * sx);
        let ext_y = |v: T| round_coord(Into::<f64>::into(v) * sy);
        let pos_x = |v: T| shift(ext_x(v)?, self.offset_x);
        let pos_y = |v: T| shift(ext_y(v)?, self.offset_y);

        Ok(match shape {
            Shape::Polygon {
                all_points_x,
                all_points_y,
            } => Shape::Polygon {
                all_points_x: all_points_x
                    .iter()
                    .map(|v| pos_x(*v))
                    .collect::<Result<_, _>>()?,
                all_points_y: all_points_y
                    .iter()
                    .map(|v| pos_y(*v))
                    .collect::<Result<_, _>>()?,
            },
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Shape::Rect {
                x: pos_x(*x)?,
                y: pos_y(*y)?,
                width: ext_x(*width)?,
                height: ext_y(*height)?,
            },
            Shape::Ellipse { cx, cy, rx, ry } => Shape::Ellipse {
                cx: pos_x(*cx)?,
                cy: pos_y(*cy)?,
                rx: ext_x(*rx)?,
                ry: ext_y(*ry)?,
            },
        })
    }
}

fn check_factor(axis: &'static str, value: f64) -> Result<(), TransformError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TransformError::InvalidScale { axis, value })
    }
}

/// Round half away from zero into the canonical integer range.
fn round_coord(value: f64) -> Result<i32, TransformError> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= f64::from(i32::MIN) && rounded <= f64::from(i32::MAX) {
        Ok(rounded as i32)
    } else {
        Err(TransformError::OutOfRange { value })
    }
}

fn shift(coord: i32, offset: i32) -> Result<i32, TransformError> {
    coord
        .checked_add(offset)
        .ok_or(TransformError::OutOfRange {
            value: f64::from(coord) + f64::from(offset),
        })
}

/// Scaled extent clamped to `1..=target`.
fn fit_extent(source: u32, scale: f64, target: u32) -> u32 {
    let scaled = (f64::from(source) * scale).round();
    (scaled as u32).clamp(1, target)
}
