//! Color statistics over the selected pixels.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GrayImage, RgbImage, SelectionError, UNSELECTED};

/// Per-channel color statistics of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionStatistics {
    /// Number of selected pixels.
    pub pixel_count: u64,
    /// Mean of R, G, and B over the selected pixels.
    pub mean: [f64; 3],
    /// Population standard deviation of R, G, and B.
    pub std_dev: [f64; 3],
}

/// Compute color statistics of `image` under `mask`.
///
/// Returns `Ok(None)` when nothing is selected.
///
/// # Errors
///
/// Returns [`SelectionError::DimensionMismatch`] if the mask and image
/// differ in size.
#[allow(clippy::cast_precision_loss)]
pub fn selection_statistics(
    image: &RgbImage,
    mask: &GrayImage,
) -> Result<Option<SelectionStatistics>, SelectionError> {
    let expected = Dimensions::of(image);
    let actual = Dimensions::of(mask);
    if expected != actual {
        return Err(SelectionError::DimensionMismatch { expected, actual });
    }

    let selected = || {
        image
            .pixels()
            .zip(mask.pixels())
            .filter(|(_, m)| m.0[0] != UNSELECTED)
            .map(|(p, _)| p.0.map(f64::from))
    };

    let mut pixel_count: u64 = 0;
    let mut sum = [0.0_f64; 3];
    for rgb in selected() {
        pixel_count += 1;
        for (s, v) in sum.iter_mut().zip(rgb) {
            *s += v;
        }
    }
    if pixel_count == 0 {
        return Ok(None);
    }

    let n = pixel_count as f64;
    let mean = sum.map(|s| s / n);

    let mut squared = [0.0_f64; 3];
    for rgb in selected() {
        for ((acc, v), m) in squared.iter_mut().zip(rgb).zip(mean) {
            let d = v - m;
            *acc = d.mul_add(d, *acc);
        }
    }
    let std_dev = squared.map(|s| (s / n).sqrt());

    Ok(Some(SelectionStatistics {
        pixel_count,
        mean,
        std_dev,
    }))
}
