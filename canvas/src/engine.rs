//! Gesture engine: turns raw pointer, touch, and wheel input into actions.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the [`Store`] and the transient interaction state: the
//! single-pointer gesture ([`InputState`]), the two-contact pinch
//! ([`PinchState`]), double-tap timing, live previews, and any running
//! fly-to. It never writes document fields itself; every change is an
//! [`Action`] handed to the store.
//!
//! Every input handler returns the [`Effect`]s produced while handling it.
//! A pinch always wins over a single-pointer gesture: the second contact
//! cancels whatever drag was in progress without committing it.

use tracing::debug;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{GROUP_PAD, PINCH_GROW_RATIO, PINCH_SHRINK_RATIO, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use crate::dispatch::{Action, Created, Effect, NewGroup, NewNode, NodeMove, Store, WireError};
use crate::doc::{Node, NodeId, NodePatch};
use crate::fly::FlyTo;
use crate::hit::{self, Hit};
use crate::input::{
    Button, InputState, PinchState, PinchTarget, Press, Preview, SelectionRect, TapKind, TapTracker, WheelDelta,
};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Core engine state: everything that doesn't depend on a display surface.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub store: Store,
    pub input: InputState,
    pub pinch: Option<PinchState>,
    pub taps: TapTracker,
    pub preview: Preview,
    pub fly: Option<FlyTo>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pending: Vec<Effect>,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store, e.g. one built with custom history limits.
    #[must_use]
    pub fn with_store(store: Store) -> Self {
        Self { store, ..Self::default() }
    }

    // --- Host inputs ---

    /// Update viewport dimensions in screen pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Apply an action on behalf of the host (panels, presentation, persistence).
    pub fn dispatch(&mut self, action: Action) -> (Option<Created>, Vec<Effect>) {
        let created = self.store.dispatch(action);
        (created, self.finish())
    }

    /// Decode and apply a string-keyed action.
    ///
    /// # Errors
    ///
    /// Returns the decode failure; nothing is changed in that case.
    pub fn dispatch_wire(&mut self, raw: serde_json::Value) -> Result<(Option<Created>, Vec<Effect>), WireError> {
        let created = self.store.dispatch_wire(raw)?;
        Ok((created, self.finish()))
    }

    pub fn undo(&mut self) -> Vec<Effect> {
        self.store.undo();
        self.finish()
    }

    pub fn redo(&mut self) -> Vec<Effect> {
        self.store.redo();
        self.finish()
    }

    /// Start flying the camera to a node. Finishes at once if it doesn't exist.
    pub fn fly_to(&mut self, id: NodeId) -> Vec<Effect> {
        self.start_fly(id);
        self.finish()
    }

    /// Advance the running fly-to animation to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Effect> {
        if let Some(fly) = self.fly.as_mut() {
            let (camera, done) = fly.advance(now_ms);
            let node = fly.node;
            if done {
                self.fly = None;
                self.pending.push(Effect::FlyFinished(node));
            }
            self.store.dispatch(Action::SetCamera(camera));
        }
        self.finish()
    }

    // --- Pointer input ---

    /// Pointer pressed. Non-primary buttons are ignored.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button) -> Vec<Effect> {
        if button != Button::Primary {
            return Vec::new();
        }
        let hit = hit::hit_test(screen, self.store.doc(), &self.store.camera(), self.store.ui());
        self.on_pointer_down_at(screen, hit)
    }

    /// Pointer pressed over an element already classified by the caller.
    pub fn on_pointer_down_at(&mut self, screen: Point, hit: Hit) -> Vec<Effect> {
        if self.pinch.is_none() {
            self.pointer_down(screen, hit);
        }
        self.finish()
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Effect> {
        if self.pinch.is_none() {
            self.pointer_move(screen);
        }
        self.finish()
    }

    /// Pointer released at `now_ms` (used for double-tap timing).
    pub fn on_pointer_up(&mut self, screen: Point, now_ms: f64) -> Vec<Effect> {
        if self.pinch.is_none() {
            self.pointer_up(screen, now_ms);
        }
        self.finish()
    }

    /// Wheel step: zoom in for upward scroll, out for downward, anchored at
    /// the pointer.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Effect> {
        if delta.dy != 0.0 {
            let factor = if delta.dy < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
            let mut camera = self.store.camera();
            camera.zoom_by(screen, factor);
            self.store.dispatch(Action::SetCamera(camera));
        }
        self.finish()
    }

    // --- Touch input ---

    /// Contacts went down. `touches` lists every contact currently down.
    /// One contact drives the pointer gestures and two start a pinch; three
    /// or more are ignored.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Effect> {
        match touches {
            [a, b] => self.begin_pinch(*a, *b),
            [first] if self.pinch.is_none() => {
                let hit = hit::hit_test(*first, self.store.doc(), &self.store.camera(), self.store.ui());
                self.pointer_down(*first, hit);
            }
            _ => {}
        }
        self.finish()
    }

    /// Contacts moved. `touches` lists every contact currently down.
    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Effect> {
        match (touches, self.pinch.is_some()) {
            ([a, b], true) => self.update_pinch(*a, *b),
            ([first], false) => self.pointer_move(*first),
            _ => {}
        }
        self.finish()
    }

    /// A contact lifted at `lifted`. `remaining` lists the contacts still down.
    pub fn on_touch_end(&mut self, remaining: &[Point], lifted: Point, now_ms: f64) -> Vec<Effect> {
        if self.pinch.is_some() {
            if remaining.len() < 2 {
                debug!("pinch end");
                self.pinch = None;
            }
        } else {
            self.pointer_up(lifted, now_ms);
        }
        self.finish()
    }

    /// Abandon the current single-pointer gesture without committing it.
    pub fn cancel_drag(&mut self) -> Vec<Effect> {
        self.cancel_gesture();
        self.finish()
    }

    // --- Queries ---

    /// The currently selected nodes.
    #[must_use]
    pub fn selection(&self) -> &[NodeId] {
        &self.store.ui().selected_ids
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.store.camera()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.store.doc().node(id)
    }

    // =============================================================
    // Gesture machine
    // =============================================================

    fn pointer_down(&mut self, screen: Point, hit: Hit) {
        let ui = self.store.ui();
        if ui.present_mode {
            return;
        }
        let (select_mode, group_draw_mode) = (ui.select_mode, ui.group_draw_mode);
        let press = Press::new(screen, self.store.camera().screen_to_world(screen));

        self.input = match hit {
            Hit::Handle(from) => InputState::DraggingHandle { press, from },
            Hit::Node(id) => {
                if group_draw_mode {
                    return;
                }
                let was_selected = self.store.ui().is_selected(id);
                if select_mode {
                    let mut ids = self.store.ui().selected_ids.clone();
                    if was_selected {
                        ids.retain(|s| *s != id);
                    } else {
                        ids.push(id);
                    }
                    self.store.dispatch(Action::Select { ids });
                    return;
                }
                if !was_selected {
                    self.store.dispatch(Action::Select { ids: vec![id] });
                }
                InputState::MovingNode { press, id, was_selected }
            }
            Hit::Edge(edge) => InputState::EdgeTapPending { press, edge },
            Hit::Group(gid) => {
                self.pending.push(Effect::GroupSummary(gid));
                if !group_draw_mode {
                    self.store.dispatch(Action::Deselect);
                }
                return;
            }
            Hit::Empty if group_draw_mode => {
                self.set_preview_rect(Some(SelectionRect::World(Rect::from_corners(press.world, press.world))));
                InputState::DrawingGroup { press }
            }
            Hit::Empty if select_mode => {
                self.set_preview_rect(Some(SelectionRect::Screen(Rect::from_corners(screen, screen))));
                InputState::SelectingRect { press }
            }
            Hit::Empty => {
                self.store.dispatch(Action::Deselect);
                InputState::Panning { press }
            }
        };
        debug!(gesture = self.input.name(), x = screen.x, y = screen.y, "pointer down");
    }

    fn pointer_move(&mut self, screen: Point) {
        let Some(press) = self.input.press_mut() else {
            return;
        };
        if !press.track(screen) {
            return;
        }
        let camera = self.store.camera();
        let world = camera.screen_to_world(screen);

        match self.input.clone() {
            InputState::Idle | InputState::EdgeTapPending { .. } => {}
            InputState::Panning { press } => {
                let mut next = camera;
                next.pin(press.world, screen);
                self.store.dispatch(Action::SetCamera(next));
            }
            InputState::MovingNode { press, id, .. } => {
                let ui = self.store.ui();
                if ui.selected_ids.len() > 1 && ui.is_selected(id) {
                    let starts: Vec<(NodeId, Point)> = ui
                        .selected_ids
                        .iter()
                        .filter_map(|sid| self.store.doc().node(*sid))
                        .map(|n| (n.id, n.center()))
                        .collect();
                    self.move_group(press, &starts, world);
                    self.input = InputState::MovingNodes { press, id, starts };
                } else {
                    self.store.dispatch(Action::MoveNode { id, x: world.x, y: world.y });
                }
            }
            InputState::MovingNodes { press, starts, .. } => self.move_group(press, &starts, world),
            InputState::DraggingHandle { from, .. } => {
                if self.store.doc().node(from).is_none() {
                    return;
                }
                let over_other = self.store.doc().node_at(world, Some(from)).is_some();
                self.preview.ghost_edge = Some((from, world));
                self.preview.ghost_node = if over_other { None } else { Some((from, world)) };
                self.pending.push(Effect::RenderNeeded);
            }
            InputState::SelectingRect { press } => {
                self.set_preview_rect(Some(SelectionRect::Screen(Rect::from_corners(press.screen, screen))));
            }
            InputState::DrawingGroup { press } => {
                self.set_preview_rect(Some(SelectionRect::World(Rect::from_corners(press.world, world))));
            }
        }
    }

    fn move_group(&mut self, press: Press, starts: &[(NodeId, Point)], world: Point) {
        let dx = world.x - press.world.x;
        let dy = world.y - press.world.y;
        let moves = starts
            .iter()
            .map(|(id, start)| NodeMove { id: *id, x: start.x + dx, y: start.y + dy })
            .collect();
        self.store.dispatch(Action::MoveNodes { moves });
    }

    fn pointer_up(&mut self, screen: Point, now_ms: f64) {
        let state = std::mem::take(&mut self.input);
        if !self.preview.is_empty() {
            self.preview.clear();
            self.pending.push(Effect::RenderNeeded);
        }
        let Some(press) = state.press().copied() else {
            return;
        };
        let world = self.store.camera().screen_to_world(screen);
        debug!(gesture = state.name(), moved = press.moved, "pointer up");

        match state {
            InputState::Idle => {}
            InputState::EdgeTapPending { edge, .. } => {
                self.store.dispatch(Action::CycleEdge { id: edge });
            }
            InputState::DraggingHandle { from, .. } => {
                if press.moved {
                    self.finish_handle_drag(from, world);
                }
            }
            InputState::MovingNode { id, was_selected, .. } => {
                if press.moved {
                    self.store.dispatch(Action::MoveNodeEnd { id: Some(id) });
                } else {
                    self.tap_node(id, was_selected, now_ms);
                }
            }
            InputState::MovingNodes { .. } => {
                self.store.dispatch(Action::MoveNodesEnd);
            }
            InputState::Panning { .. } => {
                if !press.moved {
                    self.store.dispatch(Action::CreateNode(NewNode::at(world)));
                }
            }
            InputState::SelectingRect { .. } => {
                if press.moved {
                    let ids = self.store.doc().nodes_in_rect(&Rect::from_corners(press.world, world));
                    self.store.dispatch(Action::Select { ids });
                }
            }
            InputState::DrawingGroup { .. } => {
                if press.moved {
                    let bounds = Rect::from_corners(press.world, world);
                    let node_ids = self.store.doc().nodes_in_rect(&bounds.expanded(GROUP_PAD));
                    self.store.dispatch(Action::CreateGroup(NewGroup {
                        node_ids,
                        bounds: Some(bounds),
                        ..NewGroup::default()
                    }));
                }
                self.store.dispatch(Action::SetGroupDrawMode { on: false });
            }
        }
    }

    /// Release of a moved handle drag: self-loop, edge to another node, or a
    /// new node styled like the origin plus an edge to it.
    fn finish_handle_drag(&mut self, from: NodeId, world: Point) {
        let Some(origin) = self.store.doc().node(from).cloned() else {
            return;
        };
        if origin.within_target(world) {
            self.store.dispatch(Action::CreateEdge { from, to: from });
            return;
        }
        if let Some(to) = self.store.doc().node_at(world, Some(from)) {
            self.store.dispatch(Action::CreateEdge { from, to });
            return;
        }
        let created = self.store.dispatch(Action::CreateNode(NewNode::styled_like(&origin, world)));
        if let Some(to) = created.and_then(|c| c.node_id()) {
            self.store.dispatch(Action::CreateEdge { from, to });
        }
    }

    fn tap_node(&mut self, id: NodeId, was_selected: bool, now_ms: f64) {
        match self.taps.register(id, now_ms) {
            TapKind::Double => {
                debug!(node = id, "double tap");
                let action = if self.store.ui().edit_target == Some(id) {
                    Action::HideEditBar
                } else {
                    Action::ShowEditBar { id }
                };
                self.store.dispatch(action);
            }
            TapKind::Single => {
                let action = if was_selected { Action::ToggleFocus { id } } else { Action::Select { ids: vec![id] } };
                self.store.dispatch(action);
            }
        }
    }

    fn cancel_gesture(&mut self) {
        if !self.input.is_idle() {
            debug!(gesture = self.input.name(), "gesture cancelled");
        }
        self.input = InputState::Idle;
        if !self.preview.is_empty() {
            self.preview.clear();
            self.pending.push(Effect::RenderNeeded);
        }
    }

    fn set_preview_rect(&mut self, rect: Option<SelectionRect>) {
        self.preview.rect = rect;
        self.pending.push(Effect::RenderNeeded);
    }

    // =============================================================
    // Pinch
    // =============================================================

    fn begin_pinch(&mut self, a: Point, b: Point) {
        self.cancel_gesture();
        let mid = a.midpoint(b);
        let world = self.store.camera().screen_to_world(mid);
        let target = self
            .store
            .ui()
            .selected_ids
            .iter()
            .filter_map(|id| self.store.doc().node(*id))
            .find(|n| n.within_target(world))
            .map_or(PinchTarget::Camera, |n| PinchTarget::NodeSize(n.id));
        debug!(?target, "pinch start");
        self.pinch = Some(PinchState { target, reference_dist: a.distance(b), mid });
    }

    fn update_pinch(&mut self, a: Point, b: Point) {
        let Some(mut pinch) = self.pinch else {
            return;
        };
        let dist = a.distance(b);
        let mid = a.midpoint(b);
        match pinch.target {
            PinchTarget::NodeSize(id) => {
                let reference = if pinch.reference_dist > 0.0 { pinch.reference_dist } else { 1.0 };
                let ratio = dist / reference;
                let Some(size) = self.store.doc().node(id).map(|n| n.size) else {
                    return;
                };
                let step = if ratio > PINCH_GROW_RATIO {
                    size.larger()
                } else if ratio < PINCH_SHRINK_RATIO {
                    size.smaller()
                } else {
                    None
                };
                if let Some(next) = step {
                    let props = NodePatch { size: Some(next), ..NodePatch::default() };
                    self.store.dispatch(Action::UpdateNode { id, props });
                    pinch.reference_dist = dist;
                }
            }
            PinchTarget::Camera => {
                if pinch.reference_dist > 0.0 {
                    let mut camera = self.store.camera();
                    camera.zoom_at(pinch.mid, camera.zoom * (dist / pinch.reference_dist));
                    self.store.dispatch(Action::SetCamera(camera));
                }
                pinch.reference_dist = dist;
            }
        }
        pinch.mid = mid;
        self.pinch = Some(pinch);
    }

    // =============================================================
    // Effects
    // =============================================================

    fn start_fly(&mut self, id: NodeId) {
        match self.store.doc().node(id) {
            Some(node) => {
                let center = node.center();
                self.fly = Some(FlyTo::new(id, center, self.store.camera(), self.viewport_width, self.viewport_height));
            }
            None => self.pending.push(Effect::FlyFinished(id)),
        }
    }

    /// Collect store and engine effects, starting any requested fly-to.
    fn finish(&mut self) -> Vec<Effect> {
        let mut effects = self.store.take_effects();
        for effect in &effects {
            if let Effect::FlyTo(id) = *effect {
                self.start_fly(id);
            }
        }
        effects.append(&mut self.pending);
        let mut rendered = false;
        effects.retain(|e| match e {
            Effect::RenderNeeded if rendered => false,
            Effect::RenderNeeded => {
                rendered = true;
                true
            }
            _ => true,
        });
        effects
    }
}
