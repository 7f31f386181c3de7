//! Mask composition: merge a freshly filled region into the running
//! selection with a boolean operator.
//!
//! All masks are binary (`0` or `255`) and share the source image's
//! dimensions. Operators work pixelwise.

use image::Luma;

use crate::gesture::CombineOp;
use crate::types::{Dimensions, GrayImage, SELECTED, SelectionError, UNSELECTED};

/// Combine `accumulated` with `region` using `op`.
///
/// | op          | result                        |
/// |-------------|-------------------------------|
/// | `Add`       | `accumulated OR region`       |
/// | `Subtract`  | `accumulated AND NOT region`  |
/// | `Intersect` | `accumulated AND region`      |
/// | `Replace`   | `region`                      |
///
/// # Errors
///
/// Returns [`SelectionError::DimensionMismatch`] if the two masks differ
/// in size. Both are always derived from the same image, so a mismatch
/// means an upstream invariant is broken.
pub fn combine(
    accumulated: &GrayImage,
    region: &GrayImage,
    op: CombineOp,
) -> Result<GrayImage, SelectionError> {
    let expected = Dimensions::of(accumulated);
    let actual = Dimensions::of(region);
    if expected != actual {
        return Err(SelectionError::DimensionMismatch { expected, actual });
    }

    let apply: fn(bool, bool) -> bool = match op {
        CombineOp::Add => |a, r| a || r,
        CombineOp::Subtract => |a, r| a && !r,
        CombineOp::Intersect => |a, r| a && r,
        CombineOp::Replace => |_, r| r,
    };

    Ok(GrayImage::from_fn(expected.width, expected.height, |x, y| {
        let a = is_selected(accumulated.get_pixel(x, y));
        let r = is_selected(region.get_pixel(x, y));
        Luma([if apply(a, r) { SELECTED } else { UNSELECTED }])
    }))
}

/// An all-zero mask.
#[must_use = "returns the new mask"]
pub fn empty_mask(dimensions: Dimensions) -> GrayImage {
    GrayImage::new(dimensions.width, dimensions.height)
}

/// Returns `true` if no pixel is selected.
#[must_use]
pub fn is_empty(mask: &GrayImage) -> bool {
    !mask.pixels().any(is_selected)
}

/// Number of selected pixels.
#[must_use]
pub fn selected_pixel_count(mask: &GrayImage) -> u64 {
    mask.pixels().map(|p| u64::from(is_selected(p))).sum()
}

/// Any nonzero value counts as selected.
fn is_selected(p: &Luma<u8>) -> bool {
    p.0[0] != UNSELECTED
}
