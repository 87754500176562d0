//! Pan/zoom camera and the world ↔ screen coordinate transform.
//!
//! The camera is an affine map `screen = world * zoom + pan`. Every zoom
//! operation re-anchors the pan so one chosen world point keeps its screen
//! position, which is how wheel zoom, pinch zoom, and anchor-relative panning
//! all avoid drift.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

/// Axis-aligned rectangle, stored as `{x, y, w, h}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x0 = a.x.min(b.x);
        let y0 = a.y.min(b.y);
        Self { x: x0, y: y0, w: (a.x - b.x).abs(), h: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// The same rectangle grown by `pad` on every side.
    #[must_use]
    pub fn expanded(&self, pad: f64) -> Self {
        Self { x: self.x - pad, y: self.y - pad, w: self.w + pad * 2.0, h: self.h + pad * 2.0 }
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self { x, y, w: right - x, h: bottom - y }
    }
}

/// Clamp a zoom factor into the allowed camera range.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are the screen-space translation (`tx`, `ty`) in pixels.
/// `zoom` is the uniform scale factor (`sc`, 1.0 = no zoom), always kept
/// within [`ZOOM_MIN`, `ZOOM_MAX`] by the mutating helpers.
///
/// On the wire the fields are `{tx, ty, sc}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(rename = "tx", alias = "pan_x")]
    pub pan_x: f64,
    #[serde(rename = "ty", alias = "pan_y")]
    pub pan_y: f64,
    #[serde(rename = "sc", alias = "zoom")]
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Project a world rectangle into screen space.
    #[must_use]
    pub fn world_rect_to_screen(&self, rect: &Rect) -> Rect {
        let tl = self.world_to_screen(Point::new(rect.x, rect.y));
        Rect { x: tl.x, y: tl.y, w: rect.w * self.zoom, h: rect.h * self.zoom }
    }

    /// Translate so that `world` sits under `screen` at the current zoom.
    pub fn pin(&mut self, world: Point, screen: Point) {
        self.pan_x = screen.x - world.x * self.zoom;
        self.pan_y = screen.y - world.y * self.zoom;
    }

    /// Set a new (clamped) zoom while keeping the world point under
    /// `anchor_screen` fixed on screen.
    pub fn zoom_at(&mut self, anchor_screen: Point, zoom: f64) {
        let world = self.screen_to_world(anchor_screen);
        self.zoom = clamp_zoom(zoom);
        self.pin(world, anchor_screen);
    }

    /// Multiply the zoom by `factor`, anchored at `anchor_screen`.
    pub fn zoom_by(&mut self, anchor_screen: Point, factor: f64) {
        self.zoom_at(anchor_screen, self.zoom * factor);
    }

    /// Pan so that `world` lands in the centre of a viewport of the given size.
    pub fn center_on(&mut self, world: Point, viewport_w: f64, viewport_h: f64) {
        self.pin(world, Point::new(viewport_w / 2.0, viewport_h / 2.0));
    }

    /// The same camera with its zoom forced into range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { zoom: clamp_zoom(self.zoom), ..self }
    }
}
