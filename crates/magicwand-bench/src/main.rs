//! magicwand-bench: CLI tool for replaying selection gestures and tuning
//! thresholds.
//!
//! Loads an image, replays a scripted sequence of clicks against a
//! [`SelectionSession`], and prints per-gesture diagnostics. Useful for:
//!
//! - Tuning tolerance and simplification thresholds on real images
//! - Measuring per-stage durations on large images
//! - Checking how many boundary points survive each simplification step
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin magicwand-bench -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Gestures run in the order given, then deletions in the order given.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use magicwand_selection::diagnostics::Clock;
use magicwand_selection::{
    Connectivity, FillRange, GestureOutcome, Modifier, PixelPoint, SelectionError,
    SelectionSession, SessionConfig, SimplifyConfig,
};
use tracing::{error, info};

/// Magic wand gesture replay and diagnostics.
///
/// Runs a scripted series of selection clicks against an image and prints
/// detailed per-stage timing and count diagnostics for each one.
#[derive(Parser)]
#[command(name = "magicwand-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Per-channel color tolerance.
    #[arg(long, default_value_t = SessionConfig::DEFAULT_TOLERANCE)]
    tolerance: u8,

    /// Pixel connectivity for flood fills (4 or 8).
    #[arg(long, default_value_t = 4, value_parser = parse_connectivity)]
    connectivity: u8,

    /// Compare each pixel with the neighbor it was reached from instead of
    /// the seed color.
    #[arg(long)]
    floating_range: bool,

    /// Minimum turn angle (degrees) for a boundary point to be kept.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_ANGLE_THRESHOLD_DEG)]
    angle_threshold: f64,

    /// Minimum distance (pixels) from the previous boundary point.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_DISTANCE_THRESHOLD)]
    distance_threshold: f64,

    /// Half-angle (degrees) of the cone kept by deletion gestures.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_DELETION_CONE_DEG)]
    deletion_cone: f64,

    /// Full session config as a JSON string.
    ///
    /// When provided, all other config flags are ignored. Missing fields
    /// take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Fill rectangle as `X0,Y0,X1,Y1` (corners in any order).
    #[arg(long, value_parser = parse_rect)]
    rect: Option<(PixelPoint, PixelPoint)>,

    /// Selection click as `MODIFIER:X,Y` (modifier: none, add, subtract,
    /// intersect). Repeatable.
    #[arg(long = "gesture", value_parser = parse_gesture)]
    gestures: Vec<(Modifier, PixelPoint)>,

    /// Deletion click as `X,Y`. Repeatable.
    #[arg(long = "delete", value_parser = parse_point)]
    deletes: Vec<PixelPoint>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,
}

fn parse_connectivity(s: &str) -> Result<u8, String> {
    let value: u8 = s.parse().map_err(|e| format!("{e}"))?;
    Connectivity::try_from(value)
        .map(|_| value)
        .map_err(|e| e.to_string())
}

fn parse_point(s: &str) -> Result<PixelPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x {x:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y {y:?}: {e}"))?;
    Ok(PixelPoint::new(x, y))
}

fn parse_rect(s: &str) -> Result<(PixelPoint, PixelPoint), String> {
    let parts: Vec<&str> = s.split(',').collect();
    let [x0, y0, x1, y1] = parts.as_slice() else {
        return Err(format!("expected X0,Y0,X1,Y1, got {s:?}"));
    };
    Ok((
        parse_point(&format!("{x0},{y0}"))?,
        parse_point(&format!("{x1},{y1}"))?,
    ))
}

fn parse_gesture(s: &str) -> Result<(Modifier, PixelPoint), String> {
    let (modifier, point) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MODIFIER:X,Y, got {s:?}"))?;
    Ok((modifier.parse()?, parse_point(point)?))
}

/// Build a [`SessionConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Either way the result is
/// validated.
fn config_from_cli(cli: &Cli) -> Result<SessionConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SessionConfig {
            tolerance: cli.tolerance,
            connectivity: Connectivity::try_from(cli.connectivity).map_err(|e| e.to_string())?,
            fill_range: if cli.floating_range {
                FillRange::Floating
            } else {
                FillRange::Fixed
            },
            simplify: SimplifyConfig {
                angle_threshold_deg: cli.angle_threshold,
                distance_threshold: cli.distance_threshold,
                deletion_cone_deg: cli.deletion_cone,
            },
            ..SessionConfig::default()
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image = match image::open(&cli.image_path) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            error!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    info!(
        path = %cli.image_path.display(),
        width = image.width(),
        height = image.height(),
        gestures = cli.gestures.len(),
        deletes = cli.deletes.len(),
        "image loaded"
    );
    eprintln!("Config: {config:#?}");
    eprintln!();

    let mut session = SelectionSession::new(&image, config);
    if let Some((origin, corner)) = cli.rect
        && let Err(e) = session.define_rectangle(origin, corner)
    {
        error!("Rectangle error: {e}");
        return ExitCode::FAILURE;
    }

    let steps = cli
        .gestures
        .iter()
        .map(|&(modifier, seed)| Step::Gesture(modifier, seed))
        .chain(cli.deletes.iter().map(|&anchor| Step::Delete(anchor)));

    for (index, step) in steps.enumerate() {
        eprintln!("--- Step {}: {step} ---", index + 1);
        let outcome = match run_step(&mut session, step) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Selection error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if cli.json {
            match serde_json::to_string_pretty(&outcome.diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", outcome.diagnostics.report());
            println!("Polygon: {:?}", outcome.polygon.points());
            println!();
        }
    }

    match session.statistics() {
        Ok(Some(stats)) => eprintln!(
            "Selection: {} px, mean RGB [{:.1}, {:.1}, {:.1}], std dev [{:.1}, {:.1}, {:.1}]",
            stats.pixel_count,
            stats.mean[0],
            stats.mean[1],
            stats.mean[2],
            stats.std_dev[0],
            stats.std_dev[1],
            stats.std_dev[2],
        ),
        Ok(None) => eprintln!("Selection: empty"),
        Err(e) => {
            error!("Statistics error: {e}");
            return ExitCode::FAILURE;
        }
    }
    info!(state = ?session.state(), "done");

    ExitCode::SUCCESS
}

/// One scripted interaction.
#[derive(Clone, Copy)]
enum Step {
    Gesture(Modifier, PixelPoint),
    Delete(PixelPoint),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gesture(modifier, p) => write!(f, "{modifier:?} at ({}, {})", p.x, p.y),
            Self::Delete(p) => write!(f, "Delete near ({}, {})", p.x, p.y),
        }
    }
}

fn run_step(
    session: &mut SelectionSession<'_>,
    step: Step,
) -> Result<GestureOutcome, SelectionError> {
    match step {
        Step::Gesture(modifier, seed) => session.apply_gesture_detailed(seed, modifier, &StdClock),
        Step::Delete(anchor) => session.delete_near_detailed(anchor, &StdClock),
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_point() {
        assert_eq!(parse_point("3, 4").unwrap(), PixelPoint::new(3, 4));
        assert!(parse_point("3").is_err());
        assert!(parse_point("-1,4").is_err());
    }

    #[test]
    fn parses_rect() {
        assert_eq!(
            parse_rect("10,20,0,5").unwrap(),
            (PixelPoint::new(10, 20), PixelPoint::new(0, 5))
        );
        assert!(parse_rect("1,2,3").is_err());
    }

    #[test]
    fn parses_gesture() {
        assert_eq!(
            parse_gesture("shift:7,8").unwrap(),
            (Modifier::Add, PixelPoint::new(7, 8))
        );
        assert_eq!(
            parse_gesture("intersect:0,0").unwrap(),
            (Modifier::Intersect, PixelPoint::new(0, 0))
        );
        assert!(parse_gesture("7,8").is_err());
        assert!(parse_gesture("ctrl:7,8").is_err());
    }

    #[test]
    fn connectivity_accepts_four_and_eight() {
        assert_eq!(parse_connectivity("8").unwrap(), 8);
        assert!(parse_connectivity("6").is_err());
    }

    #[test]
    fn cli_flags_build_config() {
        let cli = Cli::try_parse_from([
            "magicwand-bench",
            "img.png",
            "--tolerance",
            "12",
            "--connectivity",
            "8",
            "--floating-range",
            "--distance-threshold",
            "5",
            "--gesture",
            "add:1,2",
            "--gesture",
            "none:3,4",
            "--delete",
            "5,6",
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.tolerance, 12);
        assert_eq!(config.connectivity, Connectivity::Eight);
        assert_eq!(config.fill_range, FillRange::Floating);
        assert!((config.simplify.distance_threshold - 5.0).abs() < f64::EPSILON);
        assert_eq!(cli.gestures.len(), 2);
        assert_eq!(cli.deletes, vec![PixelPoint::new(5, 6)]);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::try_parse_from([
            "magicwand-bench",
            "img.png",
            "--tolerance",
            "12",
            "--config-json",
            r#"{"tolerance": 3}"#,
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.tolerance, 3);
        assert_eq!(config.connectivity, SessionConfig::DEFAULT_CONNECTIVITY);
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let cli = Cli::try_parse_from([
            "magicwand-bench",
            "img.png",
            "--deletion-cone",
            "200",
        ])
        .unwrap();
        assert!(config_from_cli(&cli).is_err());
    }
}
