//! Input model: pointer buttons, wheel deltas, UI state, and gesture state.
//!
//! This module defines the types consumed by the gesture engine. `UiState`
//! is the selection and mode state the renderer reads. `InputState` is the
//! single-pointer gesture tracked between pointer-down and pointer-up,
//! carrying the context needed to compute moves and emit the final actions on
//! release. `PinchState` is the orthogonal two-contact gesture.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point, Rect};
use crate::consts::{DOUBLE_TAP_MS, DRAG_THRESHOLD_PX};
use crate::doc::{EdgeId, NodeId};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or a touch contact).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (negative = toward the user, zoom in).
    pub dy: f64,
}

/// Background grid drawn behind the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    #[default]
    Dots,
    Lines,
}

/// Selection, focus, and mode state visible to the renderer.
///
/// Not part of document snapshots; undo and redo clear the selection part.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Selected nodes, in selection order.
    pub selected_ids: Vec<NodeId>,
    /// Node whose neighbourhood is highlighted, if any.
    pub focus_id: Option<NodeId>,
    /// Node whose edit affordance is open, if any.
    pub edit_target: Option<NodeId>,
    /// Guided navigation is running.
    pub present_mode: bool,
    /// Nodes visited by presentation, in order.
    pub present_list: Vec<NodeId>,
    /// Index into `present_list`.
    pub present_idx: usize,
    pub grid: GridStyle,
    /// Taps toggle nodes in and out of the selection; empty drags marquee-select.
    pub select_mode: bool,
    /// Empty drags draw a new group.
    pub group_draw_mode: bool,
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Clear selection together with its dependent focus and edit target.
    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
        self.focus_id = None;
        self.edit_target = None;
    }

    /// Drop every reference to a node that no longer exists.
    pub fn forget_node(&mut self, id: NodeId) {
        self.selected_ids.retain(|s| *s != id);
        if self.focus_id == Some(id) {
            self.focus_id = None;
        }
        if self.edit_target == Some(id) {
            self.edit_target = None;
        }
    }
}

/// Where a single-pointer gesture started and whether it has left the tap zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Press {
    /// Screen position at pointer-down.
    pub screen: Point,
    /// World position at pointer-down, under the camera at that moment.
    pub world: Point,
    /// The pointer has travelled past [`DRAG_THRESHOLD_PX`] at least once.
    pub moved: bool,
}

impl Press {
    #[must_use]
    pub fn new(screen: Point, world: Point) -> Self {
        Self { screen, world, moved: false }
    }

    /// Record a pointer position; latches `moved` once the threshold is crossed.
    pub fn track(&mut self, screen: Point) -> bool {
        if !self.moved && self.screen.distance(screen) > DRAG_THRESHOLD_PX {
            self.moved = true;
        }
        self.moved
    }
}

/// Internal state for the single-pointer gesture machine.
///
/// Each active variant carries gesture context needed to compute moves and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging empty canvas. The camera keeps `press.world` under the pointer.
    Panning { press: Press },
    /// Dragging one node directly to the pointer.
    MovingNode {
        press: Press,
        id: NodeId,
        /// The node was already selected before this press.
        was_selected: bool,
    },
    /// Dragging a multi-selection by the delta from `press.world`.
    MovingNodes {
        press: Press,
        /// Node that was grabbed.
        id: NodeId,
        /// Position of each selected node when the move began.
        starts: Vec<(NodeId, Point)>,
    },
    /// Dragging a new edge out of a node's connection handle.
    DraggingHandle { press: Press, from: NodeId },
    /// Marquee selection, drawn in screen space.
    SelectingRect { press: Press },
    /// Drawing a new group's area, anchored at `press.world`.
    DrawingGroup { press: Press },
    /// Pressed on an edge; resolved as a tap on release.
    EdgeTapPending { press: Press, edge: EdgeId },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn press(&self) -> Option<&Press> {
        match self {
            Self::Idle => None,
            Self::Panning { press }
            | Self::MovingNode { press, .. }
            | Self::MovingNodes { press, .. }
            | Self::DraggingHandle { press, .. }
            | Self::SelectingRect { press }
            | Self::DrawingGroup { press }
            | Self::EdgeTapPending { press, .. } => Some(press),
        }
    }

    pub fn press_mut(&mut self) -> Option<&mut Press> {
        match self {
            Self::Idle => None,
            Self::Panning { press }
            | Self::MovingNode { press, .. }
            | Self::MovingNodes { press, .. }
            | Self::DraggingHandle { press, .. }
            | Self::SelectingRect { press }
            | Self::DrawingGroup { press }
            | Self::EdgeTapPending { press, .. } => Some(press),
        }
    }

    /// Short name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "none",
            Self::Panning { .. } => "pan",
            Self::MovingNode { .. } => "node-move",
            Self::MovingNodes { .. } => "multi-node-move",
            Self::DraggingHandle { .. } => "handle-drag",
            Self::SelectingRect { .. } => "rectangle-select",
            Self::DrawingGroup { .. } => "group-draw-rectangle",
            Self::EdgeTapPending { .. } => "edge-tap-pending",
        }
    }
}

/// What a two-contact pinch adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchTarget {
    /// Zoom the camera around the pinch midpoint.
    Camera,
    /// Step a selected node through the size ladder.
    NodeSize(NodeId),
}

/// Two-contact gesture state. Exists only while exactly two contacts are down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    pub target: PinchTarget,
    /// Contact distance the current ratio is measured against.
    pub reference_dist: f64,
    /// Screen midpoint of the contacts at the previous update.
    pub mid: Point,
}

/// Outcome of registering a node tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Single,
    Double,
}

/// Remembers the previous node tap for double-tap detection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TapTracker {
    last: Option<(NodeId, f64)>,
}

impl TapTracker {
    /// Classify a tap on `id` at `now_ms`. A double-tap resets the tracker;
    /// a single tap becomes the new reference.
    pub fn register(&mut self, id: NodeId, now_ms: f64) -> TapKind {
        if let Some((last_id, last_ms)) = self.last
            && last_id == id
            && now_ms - last_ms < DOUBLE_TAP_MS
        {
            self.last = None;
            return TapKind::Double;
        }
        self.last = Some((id, now_ms));
        TapKind::Single
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Rubber-band rectangle shown while marquee-selecting or drawing a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionRect {
    /// Overlay rectangle already in screen space.
    Screen(Rect),
    /// World rectangle that must be re-projected with the live camera.
    World(Rect),
}

impl SelectionRect {
    /// The rectangle in screen space under `camera`.
    #[must_use]
    pub fn to_screen(&self, camera: &Camera) -> Rect {
        match self {
            Self::Screen(r) => *r,
            Self::World(r) => camera.world_rect_to_screen(r),
        }
    }
}

/// Live previews drawn during a gesture. Never part of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    /// Edge being dragged out of `from`'s handle, ending at a world point.
    pub ghost_edge: Option<(NodeId, Point)>,
    /// Node that would be created at a world point, styled like the
    /// handle's owner.
    pub ghost_node: Option<(NodeId, Point)>,
    pub rect: Option<SelectionRect>,
}

impl Preview {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghost_edge.is_none() && self.ghost_node.is_none() && self.rect.is_none()
    }
}
