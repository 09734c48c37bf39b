//! Point-in-region hit testing.
//!
//! Three pure predicates, one per region shape kind. They operate in whatever
//! coordinate space their inputs are expressed in; no scaling happens here.
//! Boundaries are inclusive for rectangles and ellipses. Polygons use the
//! even-odd rule, so self-intersecting outlines are "inside" wherever a ray
//! crosses an odd number of edges.

use thiserror::Error;

use crate::constants::MIN_POLYGON_VERTICES;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round both coordinates half away from zero.
    pub fn rounded(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }
}

/// Malformed shape data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Polygon X and Y arrays differ in length
    #[error("Polygon has {xs} X coordinates but {ys} Y coordinates")]
    MismatchedPolygon {
        /// Length of the X array
        xs: usize,
        /// Length of the Y array
        ys: usize,
    },

    /// Polygon has fewer than three vertices
    #[error("Polygon needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices present
        count: usize,
    },

    /// Width, height or radius below zero
    #[error("Negative extent for '{field}': {value}")]
    NegativeExtent {
        /// Name of the offending field
        field: &'static str,
        /// The value found
        value: f64,
    },

    /// NaN or infinite coordinate
    #[error("Non-finite coordinate in field '{field}'")]
    NonFiniteCoordinate {
        /// Name of the offending field
        field: &'static str,
    },
}

/// Check the preconditions of [`point_in_polygon`] without testing a point.
pub fn check_polygon<T: Copy + Into<f64>>(xs: &[T], ys: &[T]) -> Result<(), GeometryError> {
    if xs.len() != ys.len() {
        return Err(GeometryError::MismatchedPolygon {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < MIN_POLYGON_VERTICES {
        return Err(GeometryError::TooFewVertices { count: xs.len() });
    }
    if xs.iter().any(|v| !Into::<f64>::into(*v).is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate {
            field: "all_points_x",
        });
    }
    if ys.iter().any(|v| !Into::<f64>::into(*v).is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate {
            field: "all_points_y",
        });
    }
    Ok(())
}

/// Test whether `point` lies inside the polygon with vertices `(xs[i], ys[i])`.
///
/// Ray casting: a horizontal ray from the point toggles `inside` at every
/// edge it crosses to the right of the point.
///
/// # Errors
/// [`GeometryError::MismatchedPolygon`] if the arrays differ in length and
/// [`GeometryError::TooFewVertices`] for fewer than three vertices. The
/// arrays are never truncated to a common length.
pub fn point_in_polygon<T: Copy + Into<f64>>(
    point: Point,
    xs: &[T],
    ys: &[T],
) -> Result<bool, GeometryError> {
    check_polygon(xs, ys)?;

    let n = xs.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi): (f64, f64) = (xs[i].into(), ys[i].into());
        let (xj, yj): (f64, f64) = (xs[j].into(), ys[j].into());
        // yi != yj whenever the crossing condition holds
        if (yi > point.y) != (yj > point.y) && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    Ok(inside)
}

/// Test whether `point` lies inside the axis-aligned rectangle, edges included.
pub fn point_in_rect<T: Copy + Into<f64>>(point: Point, x: T, y: T, width: T, height: T) -> bool {
    let (x, y, width, height): (f64, f64, f64, f64) =
        (x.into(), y.into(), width.into(), height.into());
    point.x >= x && point.x <= x + width && point.y >= y && point.y <= y + height
}

/// Test whether `point` lies inside the axis-aligned ellipse, boundary included.
///
/// A zero radius collapses that axis: the point must then sit exactly on the
/// centre line for that axis, and the other axis decides.
pub fn point_in_ellipse<T: Copy + Into<f64>>(point: Point, cx: T, cy: T, rx: T, ry: T) -> bool {
    let (cx, cy, rx, ry): (f64, f64, f64, f64) = (cx.into(), cy.into(), rx.into(), ry.into());
    let terms = (axis_term(point.x - cx, rx), axis_term(point.y - cy, ry));
    match terms {
        (Some(dx), Some(dy)) => dx + dy <= 1.0,
        _ => false,
    }
}

/// Squared normalized offset along one axis, `None` when a zero radius is missed.
fn axis_term(offset: f64, radius: f64) -> Option<f64> {
    if radius == 0.0 {
        (offset == 0.0).then_some(0.0)
    } else {
        let t = offset / radius;
        Some(t * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (Vec<i32>, Vec<i32>) {
        (vec![0, 100, 100, 0], vec![0, 0, 100, 100])
    }

    #[test]
    fn test_polygon_centroid_inside() {
        let (xs, ys) = square();
        assert!(point_in_polygon(Point::new(50.0, 50.0), &xs, &ys).unwrap());

        let tri_x = [10.0, 90.0, 50.0];
        let tri_y = [10.0, 10.0, 80.0];
        let centroid = Point::new(50.0, (10.0 + 10.0 + 80.0) / 3.0);
        assert!(point_in_polygon(centroid, &tri_x, &tri_y).unwrap());
    }

    #[test]
    fn test_polygon_far_outside() {
        let (xs, ys) = square();
        assert!(!point_in_polygon(Point::new(500.0, 50.0), &xs, &ys).unwrap());
        assert!(!point_in_polygon(Point::new(-1.0, -1.0), &xs, &ys).unwrap());
        assert!(!point_in_polygon(Point::new(50.0, 1000.0), &xs, &ys).unwrap());
    }

    #[test]
    fn test_polygon_concave() {
        // U shape with the notch cut in from the top edge
        let xs = [0, 30, 30, 70, 70, 100, 100, 0];
        let ys = [0, 0, 60, 60, 0, 0, 100, 100];
        assert!(point_in_polygon(Point::new(15.0, 30.0), &xs, &ys).unwrap());
        assert!(!point_in_polygon(Point::new(50.0, 30.0), &xs, &ys).unwrap());
        assert!(point_in_polygon(Point::new(50.0, 80.0), &xs, &ys).unwrap());
    }

    #[test]
    fn test_polygon_self_intersecting_even_odd() {
        // Pentagram: the central pentagon is crossed twice, so even-odd calls it outside
        let xs = [50.0, 79.0, 2.0, 98.0, 21.0];
        let ys = [0.0, 90.0, 35.0, 35.0, 90.0];
        assert!(!point_in_polygon(Point::new(50.0, 50.0), &xs, &ys).unwrap());
        // A star tip is crossed once
        assert!(point_in_polygon(Point::new(50.0, 15.0), &xs, &ys).unwrap());
    }

    #[test]
    fn test_polygon_mismatched_arrays() {
        let result = point_in_polygon(Point::new(1.0, 1.0), &[0, 10, 10, 0], &[0, 0, 10]);
        assert_eq!(result, Err(GeometryError::MismatchedPolygon { xs: 4, ys: 3 }));
    }

    #[test]
    fn test_polygon_too_few_vertices() {
        let result = point_in_polygon(Point::new(1.0, 1.0), &[0, 10], &[0, 10]);
        assert_eq!(result, Err(GeometryError::TooFewVertices { count: 2 }));
    }

    #[test]
    fn test_rect_inclusive_boundary() {
        assert!(point_in_rect(Point::new(10.0, 10.0), 10, 10, 20, 10));
        assert!(point_in_rect(Point::new(30.0, 20.0), 10, 10, 20, 10));
        assert!(point_in_rect(Point::new(20.0, 15.0), 10, 10, 20, 10));
        assert!(!point_in_rect(Point::new(31.0, 10.0), 10, 10, 20, 10));
        assert!(!point_in_rect(Point::new(10.0, 21.0), 10, 10, 20, 10));
        assert!(!point_in_rect(Point::new(9.0, 15.0), 10, 10, 20, 10));
    }

    #[test]
    fn test_ellipse() {
        assert!(point_in_ellipse(Point::new(100.0, 100.0), 100, 100, 50, 25));
        assert!(point_in_ellipse(Point::new(150.0, 100.0), 100, 100, 50, 25));
        assert!(point_in_ellipse(Point::new(100.0, 125.0), 100, 100, 50, 25));
        assert!(!point_in_ellipse(Point::new(151.0, 100.0), 100, 100, 50, 25));
        assert!(!point_in_ellipse(Point::new(100.0, 126.0), 100, 100, 50, 25));
        // Inside the bounding box but outside the curve
        assert!(!point_in_ellipse(Point::new(145.0, 120.0), 100, 100, 50, 25));
    }

    #[test]
    fn test_ellipse_zero_radius() {
        // Degenerate into a vertical segment
        assert!(point_in_ellipse(Point::new(100.0, 110.0), 100, 100, 0, 25));
        assert!(!point_in_ellipse(Point::new(101.0, 100.0), 100, 100, 0, 25));
        assert!(!point_in_ellipse(Point::new(100.0, 130.0), 100, 100, 0, 25));

        // Degenerate into the centre point
        assert!(point_in_ellipse(Point::new(5.0, 5.0), 5, 5, 0, 0));
        assert!(!point_in_ellipse(Point::new(5.0, 6.0), 5, 5, 0, 0));
    }

    #[test]
    fn test_predicates_deterministic() {
        let (xs, ys) = square();
        for i in 0..50 {
            let p = Point::new(f64::from(i * 3), f64::from(i * 2));
            let first = point_in_polygon(p, &xs, &ys).unwrap();
            assert_eq!(first, point_in_polygon(p, &xs, &ys).unwrap());
            assert_eq!(
                point_in_rect(p, 0, 0, 100, 100),
                point_in_rect(p, 0, 0, 100, 100)
            );
            assert_eq!(
                point_in_ellipse(p, 50, 50, 40, 20),
                point_in_ellipse(p, 50, 50, 40, 20)
            );
        }
    }

    #[test]
    fn test_point_rounding() {
        let p = Point::new(2.5, -2.5).rounded();
        assert_eq!(p, Point::new(3.0, -3.0));
    }
}
