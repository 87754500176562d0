#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_distance_is_euclidean() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    let mid = Point::new(-2.0, 10.0).midpoint(Point::new(6.0, 20.0));
    assert!(point_approx_eq(mid, Point::new(2.0, 15.0)));
}

// --- Rect ---

#[test]
fn rect_from_corners_normalizes() {
    let r = Rect::from_corners(Point::new(50.0, 10.0), Point::new(10.0, 40.0));
    assert_eq!(r, Rect { x: 10.0, y: 10.0, w: 40.0, h: 30.0 });
}

#[test]
fn rect_contains_is_inclusive() {
    let r = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(!r.contains(Point::new(10.001, 5.0)));
}

#[test]
fn rect_expanded_grows_every_side() {
    let r = Rect { x: 10.0, y: 20.0, w: 30.0, h: 40.0 }.expanded(5.0);
    assert_eq!(r, Rect { x: 5.0, y: 15.0, w: 40.0, h: 50.0 });
}

#[test]
fn rect_union_covers_both() {
    let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
    let b = Rect { x: 20.0, y: -5.0, w: 5.0, h: 5.0 };
    assert_eq!(a.union(&b), Rect { x: 0.0, y: -5.0, w: 25.0, h: 15.0 });
}

// --- Camera defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam, Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 });
    assert!(point_approx_eq(cam.screen_to_world(Point::new(50.0, 75.0)), Point::new(50.0, 75.0)));
}

// --- Transforms ---

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    // (20 - 20) / 2 = 0, (30 - 10) / 2 = 10
    let world = cam.screen_to_world(Point::new(20.0, 30.0));
    assert!(point_approx_eq(world, Point::new(0.0, 10.0)));
}

#[test]
fn world_to_screen_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_across_zoom_range() {
    let world = Point::new(333.3, -999.9);
    for zoom in [ZOOM_MIN, 0.75, 1.0, 2.5, ZOOM_MAX] {
        let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom };
        let back = cam.screen_to_world(cam.world_to_screen(world));
        assert!(point_approx_eq(world, back), "zoom {zoom}");
    }
}

#[test]
fn screen_dist_to_world_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

#[test]
fn world_rect_to_screen_scales_size() {
    let cam = Camera { pan_x: 10.0, pan_y: 0.0, zoom: 2.0 };
    let r = cam.world_rect_to_screen(&Rect { x: 5.0, y: 5.0, w: 10.0, h: 20.0 });
    assert_eq!(r, Rect { x: 20.0, y: 10.0, w: 20.0, h: 40.0 });
}

// --- Re-anchoring ---

#[test]
fn pin_places_world_point_under_screen_point() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    cam.pin(Point::new(100.0, 50.0), Point::new(300.0, 200.0));
    assert!(point_approx_eq(cam.world_to_screen(Point::new(100.0, 50.0)), Point::new(300.0, 200.0)));
}

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 40.0, pan_y: -20.0, zoom: 1.3 };
    let anchor = Point::new(250.0, 180.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_at(anchor, 2.2);
    assert!(approx_eq(cam.zoom, 2.2));
    assert!(point_approx_eq(cam.screen_to_world(anchor), before));
}

#[test]
fn zoom_at_clamps_to_max() {
    let mut cam = Camera::default();
    cam.zoom_at(Point::new(10.0, 10.0), 50.0);
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_by_clamps_to_min_and_keeps_anchor() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.2 };
    let anchor = Point::new(400.0, 300.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_by(anchor, 0.01);
    assert_eq!(cam.zoom, ZOOM_MIN);
    assert!(point_approx_eq(cam.screen_to_world(anchor), before));
}

#[test]
fn repeated_wheel_steps_stay_in_range() {
    let mut cam = Camera::default();
    for _ in 0..200 {
        cam.zoom_by(Point::new(0.0, 0.0), crate::consts::WHEEL_ZOOM_IN);
    }
    assert_eq!(cam.zoom, ZOOM_MAX);
    for _ in 0..400 {
        cam.zoom_by(Point::new(0.0, 0.0), crate::consts::WHEEL_ZOOM_OUT);
    }
    assert_eq!(cam.zoom, ZOOM_MIN);
}

#[test]
fn center_on_puts_world_point_mid_viewport() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.4 };
    cam.center_on(Point::new(100.0, 100.0), 800.0, 600.0);
    assert!(point_approx_eq(cam.world_to_screen(Point::new(100.0, 100.0)), Point::new(400.0, 300.0)));
}

#[test]
fn clamped_forces_zoom_into_range() {
    let cam = Camera { pan_x: 1.0, pan_y: 2.0, zoom: 9.0 }.clamped();
    assert_eq!(cam, Camera { pan_x: 1.0, pan_y: 2.0, zoom: ZOOM_MAX });
    assert_eq!(clamp_zoom(0.0), ZOOM_MIN);
}
