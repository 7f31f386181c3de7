//! End-to-end selection scenarios through the public session API.

#![allow(clippy::unwrap_used)]

use image::Rgb;
use magicwand_selection::composite::{is_empty, selected_pixel_count};
use magicwand_selection::contour::flatten;
use magicwand_selection::types::SELECTED;
use magicwand_selection::{
    Connectivity, Modifier, PixelPoint, Point, RgbImage, SelectionSession, SessionConfig,
    SessionState, SimplifyConfig, extract_exterior_contours,
};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

const DISK_CENTER: (u32, u32) = (100, 100);
const DISK_RADIUS: u32 = 30;

fn in_disk(x: u32, y: u32) -> bool {
    let dx = i64::from(x) - i64::from(DISK_CENTER.0);
    let dy = i64::from(y) - i64::from(DISK_CENTER.1);
    dx * dx + dy * dy <= i64::from(DISK_RADIUS * DISK_RADIUS)
}

/// 200x200 black image with a white disk of radius 30 at (100, 100).
fn disk_image() -> RgbImage {
    RgbImage::from_fn(200, 200, |x, y| if in_disk(x, y) { WHITE } else { BLACK })
}

fn disk_config() -> SessionConfig {
    SessionConfig {
        tolerance: 1,
        connectivity: Connectivity::Four,
        ..SessionConfig::default()
    }
}

fn assert_near_disk_rim(points: &[Point]) {
    let center = Point::new(f64::from(DISK_CENTER.0), f64::from(DISK_CENTER.1));
    for p in points {
        let r = p.distance(center);
        assert!(
            (r - f64::from(DISK_RADIUS)).abs() <= 2.0,
            "point {p:?} at radius {r}"
        );
    }
}

#[test]
fn disk_fill_matches_disk_exactly() {
    let img = disk_image();
    let mut session = SelectionSession::new(&img, disk_config());
    session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Add)
        .unwrap();

    for (x, y, p) in session.mask().enumerate_pixels() {
        assert_eq!(p.0[0] == SELECTED, in_disk(x, y), "pixel ({x}, {y})");
    }
}

#[test]
fn disk_polygon_hugs_rim_and_reduces_points() {
    let img = disk_image();
    let mut session = SelectionSession::new(&img, disk_config());
    let polygon = session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Add)
        .unwrap();

    let raw = flatten(&extract_exterior_contours(session.mask()).unwrap());
    assert!(!polygon.is_empty());
    assert_near_disk_rim(polygon.points());
    assert!(
        polygon.len() * 2 <= raw.len(),
        "{} polygon points from {} raw points",
        polygon.len(),
        raw.len()
    );
}

#[test]
fn disk_polygon_with_dense_thresholds_stays_on_rim() {
    let img = disk_image();
    let config = SessionConfig {
        simplify: SimplifyConfig {
            distance_threshold: 0.0,
            ..SimplifyConfig::default()
        },
        ..disk_config()
    };
    let mut session = SelectionSession::new(&img, config);
    let polygon = session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Add)
        .unwrap();
    assert!(polygon.len() >= 2);
    assert_near_disk_rim(polygon.points());
}

#[test]
fn add_then_covering_subtract_empties_everything() {
    let img = disk_image();
    let mut session = SelectionSession::new(&img, disk_config());
    session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Add)
        .unwrap();
    assert_eq!(session.state(), SessionState::Selecting);

    let polygon = session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Subtract)
        .unwrap();
    assert!(polygon.is_empty());
    assert!(is_empty(session.mask()));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn plain_click_outside_rectangle_returns_to_idle() {
    let img = disk_image();
    let mut session = SelectionSession::new(&img, disk_config());
    session
        .define_rectangle(PixelPoint::new(60, 60), PixelPoint::new(140, 140))
        .unwrap();
    assert_eq!(session.state(), SessionState::RectangleDefined);
    session
        .apply_gesture(PixelPoint::new(100, 100), Modifier::Add)
        .unwrap();

    let polygon = session
        .apply_gesture(PixelPoint::new(10, 10), Modifier::None)
        .unwrap();
    assert!(polygon.is_empty());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(is_empty(session.mask()));
}

#[test]
fn background_fill_is_clipped_to_rectangle() {
    let img = disk_image();
    let mut session = SelectionSession::new(&img, disk_config());
    session
        .define_rectangle(PixelPoint::new(0, 0), PixelPoint::new(50, 40))
        .unwrap();
    session
        .apply_gesture(PixelPoint::new(5, 5), Modifier::Add)
        .unwrap();
    assert_eq!(selected_pixel_count(session.mask()), 50 * 40);
}

#[test]
fn add_order_does_not_matter() {
    // Three white blocks on black.
    let img = RgbImage::from_fn(60, 20, |x, y| {
        let block = (2..8).contains(&y) && ((2..8).contains(&x) || (20..30).contains(&x));
        let bar = (12..18).contains(&y) && (5..55).contains(&x);
        if block || bar { WHITE } else { BLACK }
    });
    let seeds = [
        PixelPoint::new(4, 4),
        PixelPoint::new(25, 4),
        PixelPoint::new(30, 15),
    ];

    let mut forward = SelectionSession::new(&img, disk_config());
    for &seed in &seeds {
        forward.apply_gesture(seed, Modifier::Add).unwrap();
    }
    let mut backward = SelectionSession::new(&img, disk_config());
    for &seed in seeds.iter().rev() {
        backward.apply_gesture(seed, Modifier::Add).unwrap();
    }

    assert_eq!(forward.mask(), backward.mask());
    assert_eq!(forward.boundary().unwrap(), backward.boundary().unwrap());
}

#[test]
fn delete_near_removes_clicked_region_only() {
    let img = RgbImage::from_fn(80, 30, |x, y| {
        let left = (5..25).contains(&x) && (5..25).contains(&y);
        let right = (50..70).contains(&x) && (5..25).contains(&y);
        if left || right { WHITE } else { BLACK }
    });
    let mut session = SelectionSession::new(&img, disk_config());
    session
        .apply_gesture(PixelPoint::new(10, 10), Modifier::Add)
        .unwrap();
    session
        .apply_gesture(PixelPoint::new(60, 10), Modifier::Add)
        .unwrap();

    session.delete_near(PixelPoint::new(60, 10)).unwrap();
    assert_eq!(selected_pixel_count(session.mask()), 400);
    assert_eq!(session.mask().get_pixel(10, 10).0[0], SELECTED);
    assert_eq!(session.mask().get_pixel(60, 10).0[0], 0);
}

fn corners_only() -> SessionConfig {
    SessionConfig {
        simplify: SimplifyConfig {
            angle_threshold_deg: 0.0,
            distance_threshold: 0.0,
            ..SimplifyConfig::default()
        },
        ..disk_config()
    }
}

#[test]
fn left_edge_block_yields_usable_polygon() {
    let img = RgbImage::from_fn(100, 100, |x, y| {
        if x < 40 && (20..80).contains(&y) { WHITE } else { BLACK }
    });
    let mut session = SelectionSession::new(&img, corners_only());
    let polygon = session
        .apply_gesture(PixelPoint::new(10, 50), Modifier::Add)
        .unwrap();

    assert_eq!(selected_pixel_count(session.mask()), 40 * 60);
    assert!(polygon.is_usable(), "{polygon:?}");
    assert!(polygon.points().iter().any(|p| p.x <= 0.0));
    assert!(polygon.points().contains(&Point::new(0.0, 20.0)));
    assert!(polygon.points().contains(&Point::new(39.0, 79.0)));
}

#[test]
fn full_uniform_image_yields_image_corners() {
    let img = RgbImage::from_pixel(64, 64, Rgb([200, 30, 30]));
    let mut session = SelectionSession::new(&img, SessionConfig::default());
    let polygon = session
        .apply_gesture(PixelPoint::new(10, 10), Modifier::Add)
        .unwrap();

    assert_eq!(selected_pixel_count(session.mask()), 64 * 64);
    assert!(polygon.is_usable(), "{polygon:?}");
    for corner in [(0.0, 0.0), (63.0, 0.0), (63.0, 63.0), (0.0, 63.0)] {
        assert!(
            polygon.points().contains(&Point::new(corner.0, corner.1)),
            "missing corner {corner:?} in {polygon:?}"
        );
    }
}
