//! Shared types for the magic wand selection pipeline.

use serde::{Deserialize, Serialize};

use crate::contour::ContourTracerKind;

/// Re-export `GrayImage` so downstream crates can reference selection
/// masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can hand the source image
/// to a session without depending on `image` directly.
pub use image::RgbImage;

/// Mask value for a selected pixel.
pub const SELECTED: u8 = 255;

/// Mask value for an unselected pixel.
pub const UNSELECTED: u8 = 0;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Self::new(f64::from(p.x), f64::from(p.y))
    }
}

/// An integer pixel coordinate, as delivered by the UI layer.
///
/// Coordinates are already mapped into image space; the core applies no
/// scale or offset correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl PixelPoint {
    /// Create a new pixel coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of any `image` buffer.
    #[must_use]
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned region of the image eligible for flood fill.
///
/// Bounds are half-open: columns `x0..x1`, rows `y0..y1`. Zero-area
/// rectangles are legal and simply select nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    /// Left edge (inclusive).
    pub x0: u32,
    /// Top edge (inclusive).
    pub y0: u32,
    /// Right edge (exclusive).
    pub x1: u32,
    /// Bottom edge (exclusive).
    pub y1: u32,
}

impl SelectionRect {
    /// The rectangle covering the whole image.
    #[must_use]
    pub const fn full(dimensions: Dimensions) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: dimensions.width,
            y1: dimensions.height,
        }
    }

    /// Build a rectangle from two corners given in any order.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidRectangle`] if either corner lies
    /// beyond `dimensions` (a corner equal to the width or height is the
    /// exclusive edge and is allowed).
    pub const fn from_corners(
        a: PixelPoint,
        b: PixelPoint,
        dimensions: Dimensions,
    ) -> Result<Self, SelectionError> {
        if a.x > dimensions.width
            || b.x > dimensions.width
            || a.y > dimensions.height
            || b.y > dimensions.height
        {
            return Err(SelectionError::InvalidRectangle {
                origin: a,
                corner: b,
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        let (x0, x1) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (y0, y1) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Whether `p` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Returns `true` for a zero-area rectangle.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }
}

/// Final ordered boundary of a selection.
///
/// Points run clockwise around the selection's centroid. A polygon with
/// fewer than three points is not a usable shape; callers should treat it
/// as "no selection" rather than try to close it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a polygon from an ordered vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// An empty polygon ("no selection").
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polygon.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the polygon has enough points to enclose an area.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.0.len() >= 3
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// Pixel adjacency used when growing a flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only.
    #[default]
    Four,
    /// Horizontal, vertical, and diagonal neighbors.
    Eight,
}

impl Connectivity {
    /// Neighbor offsets for this connectivity.
    #[must_use]
    pub const fn offsets(self) -> &'static [(i64, i64)] {
        match self {
            Self::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Self::Eight => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = SelectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(SelectionError::InvalidConfig(format!(
                "connectivity must be 4 or 8, got {other}"
            ))),
        }
    }
}

/// What a candidate pixel's color is compared against during a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillRange {
    /// Every candidate is compared with the seed pixel's color.
    #[default]
    Fixed,
    /// Every candidate is compared with the already-included neighbor it
    /// was reached from, so the fill can drift along gradients.
    Floating,
}

/// Thresholds for [`simplify`](crate::simplify::simplify).
///
/// The defaults are empirical and have no geometric derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Minimum turn (degrees) a point must introduce to be kept.
    pub angle_threshold_deg: f64,
    /// Minimum distance (pixels) from the previous raw point for a point
    /// to be kept.
    pub distance_threshold: f64,
    /// Half-angle (degrees) of the cone around the anchor-to-center
    /// direction that survives a deletion gesture.
    pub deletion_cone_deg: f64,
}

impl SimplifyConfig {
    /// Default minimum turn angle in degrees.
    pub const DEFAULT_ANGLE_THRESHOLD_DEG: f64 = 20.0;
    /// Default minimum distance in pixels.
    pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 50.0;
    /// Default deletion cone half-angle in degrees.
    pub const DEFAULT_DELETION_CONE_DEG: f64 = 45.0;
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            angle_threshold_deg: Self::DEFAULT_ANGLE_THRESHOLD_DEG,
            distance_threshold: Self::DEFAULT_DISTANCE_THRESHOLD,
            deletion_cone_deg: Self::DEFAULT_DELETION_CONE_DEG,
        }
    }
}

/// Configuration for a [`SelectionSession`](crate::SelectionSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pixel adjacency for flood fills.
    pub connectivity: Connectivity,

    /// Per-channel color tolerance, applied to R, G, and B alike as both
    /// the lower and the upper bound.
    pub tolerance: u8,

    /// Whether fills compare against the seed color or the neighbor color.
    pub fill_range: FillRange,

    /// Which contour tracing algorithm to use.
    pub contour_tracer: ContourTracerKind,

    /// Boundary simplification thresholds.
    pub simplify: SimplifyConfig,
}

impl SessionConfig {
    /// Default connectivity.
    pub const DEFAULT_CONNECTIVITY: Connectivity = Connectivity::Four;
    /// Default per-channel tolerance.
    pub const DEFAULT_TOLERANCE: u8 = 32;

    /// Check threshold values.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidConfig`] if a threshold is negative
    /// or not finite, or if the deletion cone is outside `0..=180` degrees.
    pub fn validate(&self) -> Result<(), SelectionError> {
        let s = &self.simplify;
        for (name, value) in [
            ("angle_threshold_deg", s.angle_threshold_deg),
            ("distance_threshold", s.distance_threshold),
            ("deletion_cone_deg", s.deletion_cone_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SelectionError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if s.deletion_cone_deg > 180.0 {
            return Err(SelectionError::InvalidConfig(format!(
                "deletion_cone_deg must be at most 180, got {}",
                s.deletion_cone_deg
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connectivity: Self::DEFAULT_CONNECTIVITY,
            tolerance: Self::DEFAULT_TOLERANCE,
            fill_range: FillRange::default(),
            contour_tracer: ContourTracerKind::default(),
            simplify: SimplifyConfig::default(),
        }
    }
}

/// Errors that can occur while processing a selection gesture.
///
/// Degenerate results (an empty mask, a polygon with fewer than three
/// points, a zero-area rectangle) are not errors.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// The seed point lies outside the image or the current rectangle.
    #[error("seed ({x}, {y}) is outside the {width}x{height} fill region")]
    InvalidSeed {
        /// Seed column.
        x: u32,
        /// Seed row.
        y: u32,
        /// Width of the region the seed was checked against.
        width: u32,
        /// Height of the region the seed was checked against.
        height: u32,
    },

    /// A rectangle corner lies outside the image.
    #[error(
        "rectangle ({}, {})-({}, {}) exceeds the {width}x{height} image",
        .origin.x,
        .origin.y,
        .corner.x,
        .corner.y
    )]
    InvalidRectangle {
        /// First corner as supplied.
        origin: PixelPoint,
        /// Second corner as supplied.
        corner: PixelPoint,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// Two masks that must share dimensions do not.
    #[error("mask dimensions differ: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions of the accumulated mask (or image).
        expected: Dimensions,
        /// Dimensions of the offending mask.
        actual: Dimensions,
    },

    /// The contour tracer produced output of an unexpected shape.
    #[error("contour tracing produced unexpected output: {0}")]
    ContourTracing(String),

    /// Session configuration is invalid.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DIMS: Dimensions = Dimensions {
        width: 20,
        height: 10,
    };

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_from_pixel_point() {
        let p = Point::from(PixelPoint::new(7, 11));
        assert_eq!(p, Point::new(7.0, 11.0));
    }

    // --- SelectionRect tests ---

    #[test]
    fn full_rect_contains_every_pixel() {
        let rect = SelectionRect::full(DIMS);
        assert!(rect.contains(PixelPoint::new(0, 0)));
        assert!(rect.contains(PixelPoint::new(19, 9)));
        assert!(!rect.contains(PixelPoint::new(20, 9)));
        assert!(!rect.contains(PixelPoint::new(19, 10)));
    }

    #[test]
    fn from_corners_normalizes_order() {
        let rect =
            SelectionRect::from_corners(PixelPoint::new(15, 8), PixelPoint::new(5, 2), DIMS)
                .unwrap();
        assert_eq!(
            rect,
            SelectionRect {
                x0: 5,
                y0: 2,
                x1: 15,
                y1: 8
            }
        );
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 6);
    }

    #[test]
    fn from_corners_accepts_image_edge() {
        let rect =
            SelectionRect::from_corners(PixelPoint::new(0, 0), PixelPoint::new(20, 10), DIMS)
                .unwrap();
        assert_eq!(rect, SelectionRect::full(DIMS));
    }

    #[test]
    fn from_corners_rejects_outside_image() {
        let result =
            SelectionRect::from_corners(PixelPoint::new(0, 0), PixelPoint::new(21, 5), DIMS);
        assert!(matches!(
            result,
            Err(SelectionError::InvalidRectangle { width: 20, .. })
        ));
    }

    #[test]
    fn zero_area_rect_contains_nothing() {
        let rect =
            SelectionRect::from_corners(PixelPoint::new(4, 4), PixelPoint::new(4, 9), DIMS)
                .unwrap();
        assert!(rect.is_empty());
        assert!(!rect.contains(PixelPoint::new(4, 5)));
    }

    // --- Polygon tests ---

    #[test]
    fn polygon_usability() {
        assert!(!Polygon::empty().is_usable());
        let two = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(!two.is_usable());
        let three = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        assert!(three.is_usable());
        assert_eq!(three.len(), 3);
    }

    // --- Connectivity tests ---

    #[test]
    fn connectivity_from_number() {
        assert_eq!(Connectivity::try_from(4).unwrap(), Connectivity::Four);
        assert_eq!(Connectivity::try_from(8).unwrap(), Connectivity::Eight);
        assert!(matches!(
            Connectivity::try_from(6),
            Err(SelectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn connectivity_offset_counts() {
        assert_eq!(Connectivity::Four.offsets().len(), 4);
        assert_eq!(Connectivity::Eight.offsets().len(), 8);
    }

    // --- SessionConfig tests ---

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.connectivity, Connectivity::Four);
        assert_eq!(config.tolerance, 32);
        assert_eq!(config.fill_range, FillRange::Fixed);
        assert!((config.simplify.angle_threshold_deg - 20.0).abs() < f64::EPSILON);
        assert!((config.simplify.distance_threshold - 50.0).abs() < f64::EPSILON);
        assert!((config.simplify.deletion_cone_deg - 45.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_threshold() {
        let config = SessionConfig {
            simplify: SimplifyConfig {
                distance_threshold: -1.0,
                ..SimplifyConfig::default()
            },
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SelectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_wide_cone() {
        let config = SessionConfig {
            simplify: SimplifyConfig {
                deletion_cone_deg: 200.0,
                ..SimplifyConfig::default()
            },
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_config_serde_round_trip() {
        let config = SessionConfig {
            connectivity: Connectivity::Eight,
            tolerance: 7,
            fill_range: FillRange::Floating,
            contour_tracer: ContourTracerKind::BorderFollowing,
            simplify: SimplifyConfig {
                angle_threshold_deg: 10.0,
                distance_threshold: 3.5,
                deletion_cone_deg: 30.0,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"tolerance": 5}"#).unwrap();
        assert_eq!(config.tolerance, 5);
        assert_eq!(config.connectivity, Connectivity::Four);
        assert_eq!(config.simplify, SimplifyConfig::default());
    }

    // --- SelectionError tests ---

    #[test]
    fn error_invalid_seed_display() {
        let err = SelectionError::InvalidSeed {
            x: 30,
            y: 4,
            width: 20,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "seed (30, 4) is outside the 20x10 fill region"
        );
    }

    #[test]
    fn error_dimension_mismatch_display() {
        let err = SelectionError::DimensionMismatch {
            expected: DIMS,
            actual: Dimensions {
                width: 5,
                height: 5,
            },
        };
        assert_eq!(
            err.to_string(),
            "mask dimensions differ: expected 20x10, got 5x5"
        );
    }
}
