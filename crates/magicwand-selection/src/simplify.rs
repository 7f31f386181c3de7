//! Boundary simplification: reduce traced contour points to a clean ring.
//!
//! Steps, applied to the flattened points of every exterior contour:
//!
//! 1. Centroid of all points.
//! 2. Radius filter: drop points closer to the centroid than the mean
//!    centroid distance. These are treated as trace noise.
//! 3. Deletion cone (only for a deletion gesture): keep points whose
//!    direction from the anchor lies within a cone around the
//!    anchor-to-centroid direction.
//! 4. Angular sort around the centroid, ties broken by distance.
//! 5. Sequential collapse: drop points that neither turn enough nor sit
//!    far enough from their raw predecessor.
//!
//! The radius filter and the cone are empirical heuristics. They make no
//! claim of shape fidelity, so tests pin their observable behavior rather
//! than any geometric guarantee.

use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};

use tracing::debug;

use crate::types::{Point, Polygon, SimplifyConfig};

/// Relative slack on the mean radius so that equidistant points are not
/// lost to rounding in the mean.
const RADIUS_EPSILON: f64 = 1e-9;

/// Point counts after each simplification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimplifyCounts {
    /// Points handed to the simplifier.
    pub input: usize,
    /// Points surviving the radius filter.
    pub after_radius: usize,
    /// Points surviving the deletion cone (equal to `after_radius` when
    /// no anchor was given).
    pub after_cone: usize,
    /// Points in the final polygon.
    pub output: usize,
}

/// Simplify raw contour points into a polygon.
///
/// `deletion_anchor` activates the deletion cone. An empty input yields an
/// empty polygon; the result may have fewer than three points, which
/// callers must treat as "no usable selection".
#[must_use = "returns the simplified polygon"]
pub fn simplify(
    points: &[Point],
    deletion_anchor: Option<Point>,
    config: &SimplifyConfig,
) -> Polygon {
    simplify_with_counts(points, deletion_anchor, config).0
}

/// [`simplify`], also reporting how many points survived each step.
#[must_use = "returns the simplified polygon"]
pub fn simplify_with_counts(
    points: &[Point],
    deletion_anchor: Option<Point>,
    config: &SimplifyConfig,
) -> (Polygon, SimplifyCounts) {
    let Some(center) = centroid(points) else {
        return (Polygon::empty(), SimplifyCounts::default());
    };

    let mut kept = radius_filter(points, center);
    let after_radius = kept.len();

    if let Some(anchor) = deletion_anchor {
        kept = deletion_cone(&kept, center, anchor, config.deletion_cone_deg);
    }
    let after_cone = kept.len();

    sort_clockwise(&mut kept, center);
    let ring = collapse(&kept, config);

    let counts = SimplifyCounts {
        input: points.len(),
        after_radius,
        after_cone,
        output: ring.len(),
    };
    debug!(?counts, "simplified boundary");
    (Polygon::new(ring), counts)
}

/// Arithmetic mean of the points, or `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Keep the points at least as far from `center` as the mean distance.
///
/// The cutoff is the mean minus a relative slack of 1e-9 (scaled by the
/// mean, or by 1 when the mean is below 1), so points lying exactly on the
/// mean radius survive floating-point rounding.
#[must_use = "returns the surviving points"]
#[allow(clippy::cast_precision_loss)]
pub fn radius_filter(points: &[Point], center: Point) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    let mean = points.iter().map(|p| p.distance(center)).sum::<f64>() / points.len() as f64;
    let threshold = RADIUS_EPSILON.mul_add(-mean.max(1.0), mean);
    points
        .iter()
        .copied()
        .filter(|p| p.distance(center) >= threshold)
        .collect()
}

/// Keep the points `p` for which the angle between `center - anchor` and
/// `p - anchor` is at most `cone_deg`.
///
/// A zero-length vector on either side counts as angle zero.
#[must_use = "returns the surviving points"]
pub fn deletion_cone(points: &[Point], center: Point, anchor: Point, cone_deg: f64) -> Vec<Point> {
    let axis = (center.x - anchor.x, center.y - anchor.y);
    points
        .iter()
        .copied()
        .filter(|p| {
            let v = (p.x - anchor.x, p.y - anchor.y);
            angle_between_deg(axis, v) <= cone_deg
        })
        .collect()
}

/// Sort key for the angular ordering: `(angle, distance)` around `center`.
///
/// The angle is measured from the reference vector `(0, 1)` and lies in
/// `[0, 2π)`. A point on the center gets `(-π, 0)` and sorts first.
#[must_use]
pub fn clockwise_key(p: Point, center: Point) -> (f64, f64) {
    let (vx, vy) = (p.x - center.x, p.y - center.y);
    let length = vx.hypot(vy);
    if length == 0.0 {
        return (-PI, 0.0);
    }
    let (nx, ny) = (vx / length, vy / length);
    let (ref_x, ref_y) = (0.0_f64, 1.0_f64);
    let dot = nx.mul_add(ref_x, ny * ref_y);
    let cross = ref_y.mul_add(nx, -(ref_x * ny));
    let angle = cross.atan2(dot);
    if angle < 0.0 {
        (TAU + angle, length)
    } else {
        (angle, length)
    }
}

/// Sort points by [`clockwise_key`] around `center`.
///
/// The ring is clockwise in a y-up frame; with image rows growing
/// downward it runs counterclockwise on screen.
pub fn sort_clockwise(points: &mut [Point], center: Point) {
    points.sort_by(|a, b| compare_keys(clockwise_key(*a, center), clockwise_key(*b, center)));
}

fn compare_keys(a: (f64, f64), b: (f64, f64)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1))
}

/// Turn, in degrees, at `last` when moving `second_last -> last -> next`.
///
/// Zero means straight continuation; 180 means doubling back.
#[must_use]
pub fn turn_angle_deg(second_last: Point, last: Point, next: Point) -> f64 {
    angle_between_deg(
        (last.x - second_last.x, last.y - second_last.y),
        (next.x - last.x, next.y - last.y),
    )
}

/// Walk the sorted ring and keep only significant points.
///
/// The first two points are always kept. Each later point is kept only if
/// its turn relative to the last two kept points exceeds
/// `angle_threshold_deg` and its distance from the previous raw point
/// exceeds `distance_threshold`.
#[must_use = "returns the collapsed ring"]
pub fn collapse(sorted: &[Point], config: &SimplifyConfig) -> Vec<Point> {
    let mut current: Vec<Point> = Vec::new();
    for (i, &p) in sorted.iter().enumerate() {
        let accept = match current.as_slice() {
            [.., second_last, last] => {
                let turn = turn_angle_deg(*second_last, *last, p);
                let step = sorted[i - 1].distance(p);
                turn > config.angle_threshold_deg && step > config.distance_threshold
            }
            _ => true,
        };
        if accept {
            current.push(p);
        }
    }
    current
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
fn angle_between_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dot = a.0.mul_add(b.0, a.1 * b.1);
    let cross = a.0.mul_add(b.1, -(a.1 * b.0));
    cross.abs().atan2(dot).to_degrees()
}
