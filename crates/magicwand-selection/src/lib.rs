//! magicwand-selection: Pure magic wand selection pipeline (sans-IO).
//!
//! Turns clicks on a raster image into a selection polygon through:
//! flood fill -> mask composition -> exterior contour extraction ->
//! boundary simplification.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and returns structured data. Image decoding, rendering, and
//! input handling live with the caller.
//!
//! The entry point is [`SelectionSession`], which owns the accumulated
//! mask and the fill rectangle for one image:
//!
//! ```
//! use magicwand_selection::{Modifier, PixelPoint, RgbImage, SelectionSession, SessionConfig};
//!
//! let image = RgbImage::from_pixel(64, 64, image::Rgb([200, 30, 30]));
//! let mut session = SelectionSession::new(&image, SessionConfig::default());
//! let polygon = session.apply_gesture(PixelPoint::new(10, 10), Modifier::Add)?;
//! assert!(polygon.len() >= 2);
//! # Ok::<(), magicwand_selection::SelectionError>(())
//! ```

pub mod composite;
pub mod contour;
pub mod diagnostics;
pub mod fill;
pub mod gesture;
pub mod session;
pub mod simplify;
pub mod stats;
pub mod types;

pub use composite::combine;
pub use contour::{Contour, ContourTracer, ContourTracerKind, extract_exterior_contours};
pub use diagnostics::{Clock, GestureDiagnostics, NoClock};
pub use fill::{FillParams, flood_fill};
pub use gesture::{CombineOp, KeyAction, Modifier, ModifierKeys};
pub use session::{GestureOutcome, SelectionSession, SessionState};
pub use simplify::simplify;
pub use stats::{SelectionStatistics, selection_statistics};
pub use types::{
    Connectivity, Dimensions, FillRange, GrayImage, PixelPoint, Point, Polygon, RgbImage,
    SelectionError, SelectionRect, SessionConfig, SimplifyConfig,
};
