//! Fly-to camera animation.
//!
//! A `FlyTo` captures the camera when it starts and interpolates toward a
//! target framing with an ease-in-out curve. The host drives it by calling
//! [`crate::engine::EngineCore::tick`] once per frame with a timestamp.
//!
//! There is no cancellation: starting another fly-to replaces this one and
//! takes the live camera as its new start.

#[cfg(test)]
#[path = "fly_test.rs"]
mod fly_test;

use crate::camera::{Camera, Point};
use crate::consts::{FLY_DURATION_MS, FLY_TARGET_ZOOM};
use crate::doc::NodeId;

/// Quadratic ease-in-out over `p` in `[0, 1]`.
#[must_use]
pub fn ease_in_out(p: f64) -> f64 {
    if p < 0.5 { 2.0 * p * p } else { -1.0 + (4.0 - 2.0 * p) * p }
}

/// An in-flight camera animation toward a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
    pub node: NodeId,
    start: Camera,
    target: Camera,
    /// Set by the first frame that advances the animation.
    started_ms: Option<f64>,
    duration_ms: f64,
}

impl FlyTo {
    /// Frame `world` centred in the viewport at [`FLY_TARGET_ZOOM`].
    #[must_use]
    pub fn new(node: NodeId, world: Point, from: Camera, viewport_w: f64, viewport_h: f64) -> Self {
        let mut target = Camera { zoom: FLY_TARGET_ZOOM, ..from };
        target.center_on(world, viewport_w, viewport_h);
        Self { node, start: from, target, started_ms: None, duration_ms: FLY_DURATION_MS }
    }

    #[must_use]
    pub fn target(&self) -> Camera {
        self.target
    }

    /// Camera at `now_ms` and whether the animation has finished. The first
    /// call fixes the start time.
    pub fn advance(&mut self, now_ms: f64) -> (Camera, bool) {
        let started = *self.started_ms.get_or_insert(now_ms);
        let p = ((now_ms - started) / self.duration_ms).clamp(0.0, 1.0);
        let e = ease_in_out(p);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        let cam = Camera {
            pan_x: lerp(self.start.pan_x, self.target.pan_x),
            pan_y: lerp(self.start.pan_y, self.target.pan_y),
            zoom: lerp(self.start.zoom, self.target.zoom),
        };
        (cam, p >= 1.0)
    }
}
