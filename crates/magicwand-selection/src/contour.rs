//! Contour extraction: trace the exterior boundaries of a selection mask.
//!
//! This module defines the [`ContourTracer`] trait for pluggable tracing
//! algorithms and the [`ContourTracerKind`] enum for selecting one at
//! runtime. Only outermost boundaries are kept: holes, and islands inside
//! holes, never contribute points.
//!
//! Each boundary comes back segment-compressed. Runs of boundary pixels
//! that continue in the same direction collapse to their two end corners
//! here, independent of the later simplification stage.

use image::{GrayImage, Luma};
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Point, SELECTED, SelectionError, UNSELECTED};

/// One traced exterior boundary, as corner points in trace order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a contour from ordered corner points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns the number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    #[default]
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (nonzero = selected).
/// Output: one compressed [`Contour`] per outermost selected region.
pub trait ContourTracer {
    /// Trace exterior contours in the given mask.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::ContourTracing`] if the underlying
    /// primitive produces output this crate does not understand.
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Contour>, SelectionError>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Contour>, SelectionError> {
        match *self {
            Self::BorderFollowing => trace_border_following(mask),
        }
    }
}

/// Trace the exterior contours of `mask` with the default tracer.
///
/// An empty mask yields no contours; disjoint regions yield one each.
///
/// # Errors
///
/// Returns [`SelectionError::ContourTracing`] on malformed tracer output.
pub fn extract_exterior_contours(mask: &GrayImage) -> Result<Vec<Contour>, SelectionError> {
    ContourTracerKind::default().trace(mask)
}

/// Concatenate all contours into one flat point list, in trace order.
#[must_use = "returns the flattened points"]
pub fn flatten(contours: &[Contour]) -> Vec<Point> {
    contours
        .iter()
        .flat_map(|c| c.points().iter().copied())
        .collect()
}

fn trace_border_following(mask: &GrayImage) -> Result<Vec<Contour>, SelectionError> {
    let (width, height) = mask.dimensions();
    let padded = pad_mask(mask)?;
    let contours: Vec<TracedContour> = imageproc::contours::find_contours(&padded);
    validate_traced(&contours, padded.width(), padded.height())?;

    let mut exterior = Vec::new();
    for (index, c) in contours.into_iter().enumerate() {
        if c.border_type != BorderType::Outer || c.parent.is_some() {
            continue;
        }
        let points = c
            .points
            .into_iter()
            .map(|p| unpad(index, p.x, p.y, width, height))
            .collect::<Result<Vec<_>, _>>()?;
        let corners = compress_segments(&points)
            .into_iter()
            .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect();
        exterior.push(Contour::new(corners));
    }

    debug!(
        contours = exterior.len(),
        points = exterior.iter().map(Contour::len).sum::<usize>(),
        "traced exterior contours"
    );
    Ok(exterior)
}

type TracedContour = imageproc::contours::Contour<u32>;

/// Copy `mask` into a buffer with a one-pixel unselected border.
///
/// Border following only starts an outer border at a selected pixel whose
/// left neighbor is unselected, so a region touching column 0 would
/// otherwise be reported as a hole.
fn pad_mask(mask: &GrayImage) -> Result<GrayImage, SelectionError> {
    let (width, height) = mask.dimensions();
    let (Some(padded_width), Some(padded_height)) = (width.checked_add(2), height.checked_add(2))
    else {
        return Err(SelectionError::ContourTracing(format!(
            "{width}x{height} mask is too large to pad"
        )));
    };
    Ok(GrayImage::from_fn(padded_width, padded_height, |x, y| {
        let inside = (1..=width).contains(&x) && (1..=height).contains(&y);
        if inside && mask.get_pixel(x - 1, y - 1).0[0] != UNSELECTED {
            Luma([SELECTED])
        } else {
            Luma([UNSELECTED])
        }
    }))
}

/// Map a point traced on the padded mask back onto the unpadded mask.
fn unpad(
    index: usize,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<(u32, u32), SelectionError> {
    match (x.checked_sub(1), y.checked_sub(1)) {
        (Some(ux), Some(uy)) if ux < width && uy < height => Ok((ux, uy)),
        _ => Err(SelectionError::ContourTracing(format!(
            "contour {index} has padded point ({x}, {y}) outside the {width}x{height} mask"
        ))),
    }
}

/// Check the border-following output for structural consistency.
///
/// Every contour needs at least one point inside `width x height`, every
/// parent index must exist, an outer border may only sit inside a hole
/// border, and a hole border must have a parent.
fn validate_traced(
    contours: &[TracedContour],
    width: u32,
    height: u32,
) -> Result<(), SelectionError> {
    for (index, contour) in contours.iter().enumerate() {
        if contour.points.is_empty() {
            return Err(SelectionError::ContourTracing(format!(
                "contour {index} has no points"
            )));
        }
        if let Some(p) = contour
            .points
            .iter()
            .find(|p| p.x >= width || p.y >= height)
        {
            return Err(SelectionError::ContourTracing(format!(
                "contour {index} has point ({}, {}) outside the {width}x{height} mask",
                p.x, p.y
            )));
        }
        match (contour.border_type, contour.parent) {
            (BorderType::Hole, None) => {
                return Err(SelectionError::ContourTracing(format!(
                    "hole contour {index} has no enclosing border"
                )));
            }
            (border_type, Some(parent)) => {
                let Some(parent_contour) = contours.get(parent) else {
                    return Err(SelectionError::ContourTracing(format!(
                        "contour {index} references missing parent {parent}"
                    )));
                };
                if border_type == BorderType::Outer
                    && parent_contour.border_type != BorderType::Hole
                {
                    return Err(SelectionError::ContourTracing(format!(
                        "outer contour {index} has parent {parent}, which is not a hole border"
                    )));
                }
            }
            (BorderType::Outer, None) => {}
        }
    }
    Ok(())
}

/// Drop every point of a closed boundary whose incoming and outgoing
/// steps point the same way, leaving only corners.
fn compress_segments(points: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let incoming = step_direction(prev, points[i]);
            let outgoing = step_direction(points[i], next);
            incoming != outgoing || incoming == (0, 0)
        })
        .map(|i| points[i])
        .collect()
}

/// Unit direction (`-1`, `0`, or `1` per axis) from `a` to `b`.
fn step_direction(a: (u32, u32), b: (u32, u32)) -> (i8, i8) {
    let sign = |from: u32, to: u32| match to.cmp(&from) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    (sign(a.0, b.0), sign(a.1, b.1))
}
