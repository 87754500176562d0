//! Shared numeric constants for the canvas crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed camera zoom.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed camera zoom.
pub const ZOOM_MAX: f64 = 4.0;

/// Zoom multiplier for one wheel step toward the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom multiplier for one wheel step away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.91;

// ── Gestures ────────────────────────────────────────────────────

/// Screen distance a press must travel before it counts as a drag.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

/// Two taps on the same node closer than this are a double-tap.
pub const DOUBLE_TAP_MS: f64 = 300.0;

/// Multiplier on a node's nominal radius for drop targets and pinch targets.
pub const TARGET_RADIUS_FACTOR: f64 = 1.5;

/// Pinch distance ratio that steps a node one size up.
pub const PINCH_GROW_RATIO: f64 = 1.3;

/// Pinch distance ratio that steps a node one size down.
pub const PINCH_SHRINK_RATIO: f64 = 0.75;

// ── Geometry ────────────────────────────────────────────────────

/// Padding around member nodes when deriving group bounds, and slack when
/// collecting members for a drawn group.
pub const GROUP_PAD: f64 = 28.0;

/// Distance from a node's rim to the centre of each connection handle.
pub const HANDLE_OFFSET: f64 = 8.0;

/// Radius of a connection handle in world units.
pub const HANDLE_RADIUS: f64 = 5.0;

/// Extra world-space slack around a node's outline for hit-testing.
pub const NODE_HIT_PAD: f64 = 6.0;

/// Screen-space hit slop in pixels for thin edges and handles.
pub const EDGE_HIT_SLOP_PX: f64 = 8.0;

/// Curve bulge of a non-self edge as a fraction of its length.
pub const EDGE_CURVE_OFFSET: f64 = 0.18;

/// Line segments used to approximate curved edges when hit-testing.
pub const EDGE_SAMPLES: usize = 16;

// ── History ─────────────────────────────────────────────────────

/// Default number of snapshots kept by the history ring.
pub const HISTORY_MAX_ENTRIES: usize = 80;

/// Default byte budget for all serialized snapshots in the history ring.
pub const HISTORY_MAX_BYTES: usize = 4 * 1024 * 1024;

// ── Fly-to ──────────────────────────────────────────────────────

/// Duration of a fly-to camera animation.
pub const FLY_DURATION_MS: f64 = 700.0;

/// Camera zoom at the end of a fly-to.
pub const FLY_TARGET_ZOOM: f64 = 1.4;

// ── Palettes ────────────────────────────────────────────────────

/// Node colours offered by the palette; the first is the default.
pub const NODE_COLORS: [&str; 6] = ["#00d4ff", "#ff6b35", "#a855f7", "#10b981", "#f59e0b", "#ef4444"];

/// Group colours offered by the palette; the first is the default.
pub const GROUP_COLORS: [&str; 6] = ["#00d4ff", "#ff6b35", "#a855f7", "#10b981", "#f59e0b", "#ef4444"];

/// Default name for a new group.
pub const DEFAULT_GROUP_NAME: &str = "Group";
