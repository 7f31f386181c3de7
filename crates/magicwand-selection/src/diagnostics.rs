//! Gesture diagnostics: timing and counts for each pipeline stage.
//!
//! Every [`apply_gesture_detailed`](crate::SelectionSession::apply_gesture_detailed)
//! call collects these alongside the resulting polygon. They exist for
//! threshold tuning and for spotting slow fills on large images.
//!
//! The library never reads a platform time source itself. Callers pass a
//! [`Clock`]; [`NoClock`] reports zero durations.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gesture::CombineOp;

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// A [`Clock`] that measures nothing; every duration is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    type Instant = ();

    fn now(&self) -> Self::Instant {}

    fn elapsed(&self, _since: &Self::Instant) -> Duration {
        Duration::ZERO
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single gesture.
///
/// `fill` and `composite` are `None` when the gesture reset the session
/// instead of filling (a plain click outside the rectangle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureDiagnostics {
    /// Stage 1: flood fill.
    pub fill: Option<StageDiagnostics>,
    /// Stage 2: mask composition.
    pub composite: Option<StageDiagnostics>,
    /// Stage 3: exterior contour extraction.
    pub contours: StageDiagnostics,
    /// Stage 4: boundary simplification.
    pub simplify: StageDiagnostics,
    /// Total wall-clock duration of the gesture (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: GestureSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Flood fill metrics.
    Fill {
        /// Seed column.
        seed_x: u32,
        /// Seed row.
        seed_y: u32,
        /// Per-channel tolerance used.
        tolerance: u8,
        /// Pixels in the filled region.
        filled_pixel_count: u64,
    },
    /// Mask composition metrics.
    Composite {
        /// Operator applied.
        op: CombineOp,
        /// Selected pixels before composition.
        selected_before: u64,
        /// Selected pixels after composition.
        selected_after: u64,
    },
    /// Contour extraction metrics.
    ContourExtraction {
        /// Number of exterior contours.
        contour_count: usize,
        /// Total corner points across all contours.
        total_point_count: usize,
    },
    /// Boundary simplification metrics.
    Simplification {
        /// Whether a deletion anchor was applied.
        deletion_anchor: bool,
        /// Points before simplification.
        points_before: usize,
        /// Points surviving the radius filter.
        after_radius: usize,
        /// Points surviving the deletion cone.
        after_cone: usize,
        /// Points in the polygon.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
}

/// High-level summary for one gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixels in the source image.
    pub pixel_count: u64,
    /// Selected pixels after the gesture.
    pub selected_pixel_count: u64,
    /// Number of exterior contours traced.
    pub contour_count: usize,
    /// Points in the final polygon.
    pub polygon_point_count: usize,
}

impl GestureDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Gesture Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)  |  Selected pixels: {}",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.pixel_count,
            self.summary.selected_pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = Vec::new();
        if let Some(ref fill) = self.fill {
            stages.push(("Flood Fill", fill));
        }
        if let Some(ref composite) = self.composite {
            stages.push(("Composite", composite));
        }
        stages.push(("Contour Extraction", &self.contours));
        stages.push(("Simplification", &self.simplify));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Polygon points: {}",
            self.summary.contour_count, self.summary.polygon_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Reduction ratio `1.0 - after / before`, or zero for empty input.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Fill {
            seed_x,
            seed_y,
            tolerance,
            filled_pixel_count,
        } => format!("seed=({seed_x}, {seed_y}) tol={tolerance} filled={filled_pixel_count}"),
        StageMetrics::Composite {
            op,
            selected_before,
            selected_after,
        } => format!("{op:?} {selected_before}->{selected_after} px"),
        StageMetrics::ContourExtraction {
            contour_count,
            total_point_count,
        } => format!("{contour_count} contours, {total_point_count} pts"),
        StageMetrics::Simplification {
            deletion_anchor,
            points_before,
            after_radius,
            after_cone,
            points_after,
            reduction_ratio,
        } => {
            let cone = if *deletion_anchor {
                format!(" cone={after_cone}")
            } else {
                String::new()
            };
            format!(
                "{points_before}->{points_after} pts (radius={after_radius}{cone}, {:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
    }
}
