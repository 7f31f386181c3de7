//! Flood fill: grow a region of similar color from a seed pixel.
//!
//! Produces a fresh binary mask (255 = filled, 0 = not filled) with the
//! same dimensions as the source image. Growth never leaves the current
//! [`SelectionRect`], and the source image is only read.
//!
//! This is step 1 of every selection gesture, before mask composition.

use std::collections::VecDeque;

use image::{Luma, Rgb};
use tracing::debug;

use crate::types::{
    Connectivity, Dimensions, FillRange, GrayImage, PixelPoint, RgbImage, SELECTED,
    SelectionError, SelectionRect, SessionConfig,
};

/// Parameters for a single flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillParams {
    /// Per-channel tolerance, used as both the lower and upper bound.
    pub tolerance: u8,
    /// Pixel adjacency.
    pub connectivity: Connectivity,
    /// Reference color mode.
    pub range: FillRange,
}

impl From<&SessionConfig> for FillParams {
    fn from(config: &SessionConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            connectivity: config.connectivity,
            range: config.fill_range,
        }
    }
}

/// Flood fill `image` from `seed`, restricted to `rect`.
///
/// A neighbor `q` joins the fill when every channel satisfies
/// `reference - tolerance <= q <= reference + tolerance`, where the
/// reference is the seed color for [`FillRange::Fixed`] and the color of
/// the filled pixel `q` was reached from for [`FillRange::Floating`].
///
/// # Errors
///
/// Returns [`SelectionError::InvalidSeed`] if `seed` lies outside the
/// image or outside `rect`. Seeds are never clamped: an out-of-range seed
/// means the caller mapped coordinates incorrectly.
///
/// Returns [`SelectionError::InvalidRectangle`] if `rect` extends past
/// the image.
pub fn flood_fill(
    image: &RgbImage,
    rect: SelectionRect,
    seed: PixelPoint,
    params: FillParams,
) -> Result<GrayImage, SelectionError> {
    let dimensions = Dimensions::of(image);
    if seed.x >= dimensions.width || seed.y >= dimensions.height {
        return Err(SelectionError::InvalidSeed {
            x: seed.x,
            y: seed.y,
            width: dimensions.width,
            height: dimensions.height,
        });
    }
    if rect.x1 > dimensions.width || rect.y1 > dimensions.height {
        return Err(SelectionError::InvalidRectangle {
            origin: PixelPoint::new(rect.x0, rect.y0),
            corner: PixelPoint::new(rect.x1, rect.y1),
            width: dimensions.width,
            height: dimensions.height,
        });
    }
    if !rect.contains(seed) {
        return Err(SelectionError::InvalidSeed {
            x: seed.x,
            y: seed.y,
            width: rect.width(),
            height: rect.height(),
        });
    }

    let mut mask = GrayImage::new(dimensions.width, dimensions.height);
    let seed_color = *image.get_pixel(seed.x, seed.y);

    // The mask doubles as the visited set: only filled pixels are queued.
    let mut queue = VecDeque::new();
    mask.put_pixel(seed.x, seed.y, Luma([SELECTED]));
    queue.push_back(seed);
    let mut filled: u64 = 1;

    while let Some(current) = queue.pop_front() {
        let reference = match params.range {
            FillRange::Fixed => seed_color,
            FillRange::Floating => *image.get_pixel(current.x, current.y),
        };

        for &(dx, dy) in params.connectivity.offsets() {
            let Some(next) = offset(current, dx, dy) else {
                continue;
            };
            if !rect.contains(next) || mask.get_pixel(next.x, next.y).0[0] == SELECTED {
                continue;
            }
            if within_tolerance(*image.get_pixel(next.x, next.y), reference, params.tolerance) {
                mask.put_pixel(next.x, next.y, Luma([SELECTED]));
                filled += 1;
                queue.push_back(next);
            }
        }
    }

    debug!(
        seed_x = seed.x,
        seed_y = seed.y,
        tolerance = params.tolerance,
        filled,
        "flood fill complete"
    );
    Ok(mask)
}

/// Whether every channel of `color` is within `tolerance` of `reference`.
#[must_use]
pub fn within_tolerance(color: Rgb<u8>, reference: Rgb<u8>, tolerance: u8) -> bool {
    color
        .0
        .iter()
        .zip(reference.0)
        .all(|(&c, r)| c.abs_diff(r) <= tolerance)
}

/// Step from `p` by `(dx, dy)`, returning `None` on underflow or overflow.
fn offset(p: PixelPoint, dx: i64, dy: i64) -> Option<PixelPoint> {
    let x = u32::try_from(i64::from(p.x) + dx).ok()?;
    let y = u32::try_from(i64::from(p.y) + dy).ok()?;
    Some(PixelPoint::new(x, y))
}
