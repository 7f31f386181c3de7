//! Selection session: the interaction state machine.
//!
//! A session borrows one source image and owns the accumulated selection
//! mask plus the current fill rectangle. Each gesture runs
//! fill -> composite -> contour extraction -> simplification and hands back
//! the resulting polygon.
//!
//! Every operation either succeeds completely or leaves the session exactly
//! as it was: the new mask is only committed after all stages succeed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::composite::{self, combine, empty_mask, selected_pixel_count};
use crate::contour::{ContourTracer, flatten};
use crate::diagnostics::{
    Clock, GestureDiagnostics, GestureSummary, NoClock, StageDiagnostics, StageMetrics,
    reduction_ratio,
};
use crate::fill::{FillParams, flood_fill};
use crate::gesture::Modifier;
use crate::simplify::simplify_with_counts;
use crate::stats::{SelectionStatistics, selection_statistics};
use crate::types::{
    Connectivity, Dimensions, GrayImage, PixelPoint, Point, Polygon, RgbImage, SelectionError,
    SelectionRect, SessionConfig,
};

/// Where the session is in the select workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No rectangle defined and nothing selected.
    Idle,
    /// A rectangle was defined; nothing selected yet.
    RectangleDefined,
    /// The mask holds at least one selected pixel.
    Selecting,
}

/// Result of a gesture: the polygon plus per-stage diagnostics.
#[derive(Debug, Clone)]
pub struct GestureOutcome {
    /// Simplified boundary of the updated selection.
    pub polygon: Polygon,
    /// Timing and counts for each stage.
    pub diagnostics: GestureDiagnostics,
}

/// Interactive magic wand selection over one image.
#[derive(Debug, Clone)]
pub struct SelectionSession<'img> {
    image: &'img RgbImage,
    config: SessionConfig,
    rectangle: SelectionRect,
    rectangle_defined: bool,
    mask: GrayImage,
}

/// Output of the trace + simplify half of the pipeline.
struct Boundary {
    polygon: Polygon,
    contours: StageDiagnostics,
    simplify: StageDiagnostics,
    contour_count: usize,
}

impl<'img> SelectionSession<'img> {
    /// Start a session over `image`.
    ///
    /// The rectangle covers the whole image and nothing is selected.
    /// `config` is taken as-is; use [`Self::try_new`] for configuration
    /// that has not been through [`SessionConfig::validate`].
    #[must_use]
    pub fn new(image: &'img RgbImage, config: SessionConfig) -> Self {
        let dimensions = Dimensions::of(image);
        Self {
            image,
            config,
            rectangle: SelectionRect::full(dimensions),
            rectangle_defined: false,
            mask: empty_mask(dimensions),
        }
    }

    /// Start a session over `image` after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidConfig`] if `config` fails
    /// [`SessionConfig::validate`].
    pub fn try_new(image: &'img RgbImage, config: SessionConfig) -> Result<Self, SelectionError> {
        config.validate()?;
        Ok(Self::new(image, config))
    }

    /// Current workflow state, derived from the rectangle and mask.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if !composite::is_empty(&self.mask) {
            SessionState::Selecting
        } else if self.rectangle_defined {
            SessionState::RectangleDefined
        } else {
            SessionState::Idle
        }
    }

    /// The source image.
    #[must_use]
    pub const fn image(&self) -> &'img RgbImage {
        self.image
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The rectangle fills are confined to.
    #[must_use]
    pub const fn rectangle(&self) -> SelectionRect {
        self.rectangle
    }

    /// The accumulated selection mask.
    #[must_use]
    pub const fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Per-channel tolerance for subsequent fills.
    #[must_use]
    pub const fn tolerance(&self) -> u8 {
        self.config.tolerance
    }

    /// Change the tolerance for subsequent fills. The mask is untouched.
    pub fn set_tolerance(&mut self, tolerance: u8) {
        debug!(tolerance, "tolerance changed");
        self.config.tolerance = tolerance;
    }

    /// Change the connectivity for subsequent fills. The mask is untouched.
    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        debug!(?connectivity, "connectivity changed");
        self.config.connectivity = connectivity;
    }

    /// Replace the whole configuration. The mask is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidConfig`] if `config` fails
    /// [`SessionConfig::validate`]; the old configuration stays active.
    pub fn set_config(&mut self, config: SessionConfig) -> Result<(), SelectionError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Restrict fills to the rectangle spanned by two corners and clear the
    /// selection.
    ///
    /// Corners may be given in any order.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidRectangle`] if a corner lies beyond
    /// the image.
    #[instrument("SelectionSession::define_rectangle", skip_all, fields(?origin, ?corner), err)]
    pub fn define_rectangle(
        &mut self,
        origin: PixelPoint,
        corner: PixelPoint,
    ) -> Result<(), SelectionError> {
        let rectangle = SelectionRect::from_corners(origin, corner, Dimensions::of(self.image))?;
        self.rectangle = rectangle;
        self.rectangle_defined = true;
        self.mask = empty_mask(Dimensions::of(self.image));
        info!(?rectangle, "rectangle defined");
        Ok(())
    }

    /// Start over: rectangle covers the whole image, nothing selected.
    pub fn reset(&mut self) {
        let dimensions = Dimensions::of(self.image);
        self.rectangle = SelectionRect::full(dimensions);
        self.rectangle_defined = false;
        self.mask = empty_mask(dimensions);
        info!("session reset");
    }

    /// Run a selection gesture and return the updated boundary.
    ///
    /// A plain click ([`Modifier::None`]) inside the rectangle replaces the
    /// selection; outside it, the session resets and an empty polygon comes
    /// back. The other modifiers merge the filled region into the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSeed`] if a modified click lies
    /// outside the rectangle or the image. Contour failures propagate as
    /// [`SelectionError::ContourTracing`].
    pub fn apply_gesture(
        &mut self,
        seed: PixelPoint,
        modifier: Modifier,
    ) -> Result<Polygon, SelectionError> {
        self.apply_gesture_detailed(seed, modifier, &NoClock)
            .map(|outcome| outcome.polygon)
    }

    /// [`apply_gesture`](Self::apply_gesture), also reporting per-stage
    /// diagnostics timed with `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`apply_gesture`](Self::apply_gesture).
    #[instrument(
        "SelectionSession::apply_gesture",
        skip_all,
        fields(?seed, ?modifier),
        err
    )]
    pub fn apply_gesture_detailed<C: Clock>(
        &mut self,
        seed: PixelPoint,
        modifier: Modifier,
        clock: &C,
    ) -> Result<GestureOutcome, SelectionError> {
        if modifier == Modifier::None && !self.rectangle.contains(seed) {
            let start = clock.now();
            self.reset();
            let boundary = self.trace_boundary(&self.mask, None, clock)?;
            return Ok(self.outcome(boundary, None, None, clock.elapsed(&start)));
        }
        self.run_gesture(seed, modifier, None, clock)
    }

    /// Remove the region around `anchor` from the selection.
    ///
    /// Runs a subtract gesture seeded at `anchor`, then simplifies with
    /// `anchor` as the deletion anchor so only boundary points facing it
    /// survive.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSeed`] if `anchor` lies outside the
    /// rectangle or the image.
    pub fn delete_near(&mut self, anchor: PixelPoint) -> Result<Polygon, SelectionError> {
        self.delete_near_detailed(anchor, &NoClock)
            .map(|outcome| outcome.polygon)
    }

    /// [`delete_near`](Self::delete_near), also reporting per-stage
    /// diagnostics timed with `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`delete_near`](Self::delete_near).
    #[instrument("SelectionSession::delete_near", skip_all, fields(?anchor), err)]
    pub fn delete_near_detailed<C: Clock>(
        &mut self,
        anchor: PixelPoint,
        clock: &C,
    ) -> Result<GestureOutcome, SelectionError> {
        self.run_gesture(anchor, Modifier::Subtract, Some(Point::from(anchor)), clock)
    }

    /// Re-derive the polygon from the current mask without a new fill.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::ContourTracing`] on malformed tracer output.
    pub fn boundary(&self) -> Result<Polygon, SelectionError> {
        self.trace_boundary(&self.mask, None, &NoClock)
            .map(|boundary| boundary.polygon)
    }

    /// Color statistics of the selected pixels, or `None` when nothing is
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::DimensionMismatch`] only if the mask no
    /// longer matches the image, which would be an internal bug.
    pub fn statistics(&self) -> Result<Option<SelectionStatistics>, SelectionError> {
        selection_statistics(self.image, &self.mask)
    }

    fn run_gesture<C: Clock>(
        &mut self,
        seed: PixelPoint,
        modifier: Modifier,
        deletion_anchor: Option<Point>,
        clock: &C,
    ) -> Result<GestureOutcome, SelectionError> {
        let total_start = clock.now();

        // 1. Flood fill.
        let start = clock.now();
        let region = flood_fill(
            self.image,
            self.rectangle,
            seed,
            FillParams::from(&self.config),
        )?;
        let fill = StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Fill {
                seed_x: seed.x,
                seed_y: seed.y,
                tolerance: self.config.tolerance,
                filled_pixel_count: selected_pixel_count(&region),
            },
        };

        // 2. Composite.
        let start = clock.now();
        let op = modifier.combine_op();
        let combined = combine(&self.mask, &region, op)?;
        let composite = StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Composite {
                op,
                selected_before: selected_pixel_count(&self.mask),
                selected_after: selected_pixel_count(&combined),
            },
        };

        // 3-4. Trace and simplify the new mask before committing it.
        let boundary = self.trace_boundary(&combined, deletion_anchor, clock)?;

        self.mask = combined;
        debug!(
            ?op,
            polygon_points = boundary.polygon.len(),
            state = ?self.state(),
            "gesture applied"
        );
        Ok(self.outcome(
            boundary,
            Some(fill),
            Some(composite),
            clock.elapsed(&total_start),
        ))
    }

    fn trace_boundary<C: Clock>(
        &self,
        mask: &GrayImage,
        deletion_anchor: Option<Point>,
        clock: &C,
    ) -> Result<Boundary, SelectionError> {
        let start = clock.now();
        let contours = self.config.contour_tracer.trace(mask)?;
        let points = flatten(&contours);
        let contours_diag = StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::ContourExtraction {
                contour_count: contours.len(),
                total_point_count: points.len(),
            },
        };

        let start = clock.now();
        let (polygon, counts) = simplify_with_counts(&points, deletion_anchor, &self.config.simplify);
        let simplify_diag = StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Simplification {
                deletion_anchor: deletion_anchor.is_some(),
                points_before: counts.input,
                after_radius: counts.after_radius,
                after_cone: counts.after_cone,
                points_after: counts.output,
                reduction_ratio: reduction_ratio(counts.input, counts.output),
            },
        };

        Ok(Boundary {
            polygon,
            contours: contours_diag,
            simplify: simplify_diag,
            contour_count: contours.len(),
        })
    }

    fn outcome(
        &self,
        boundary: Boundary,
        fill: Option<StageDiagnostics>,
        composite: Option<StageDiagnostics>,
        total_duration: std::time::Duration,
    ) -> GestureOutcome {
        let dimensions = Dimensions::of(self.image);
        let summary = GestureSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
            selected_pixel_count: selected_pixel_count(&self.mask),
            contour_count: boundary.contour_count,
            polygon_point_count: boundary.polygon.len(),
        };
        GestureOutcome {
            polygon: boundary.polygon,
            diagnostics: GestureDiagnostics {
                fill,
                composite,
                contours: boundary.contours,
                simplify: boundary.simplify,
                total_duration,
                summary,
            },
        }
    }
}
