#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::consts::{FLY_DURATION_MS, ZOOM_MAX};
use crate::doc::{EdgeMode, GroupId, NodeSize, Shape};
use crate::dispatch::Notice;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn add_node(core: &mut EngineCore, x: f64, y: f64) -> NodeId {
    let (created, _) = core.dispatch(Action::CreateNode(NewNode::at(pt(x, y))));
    created.and_then(|c| c.node_id()).unwrap()
}

fn add_group(core: &mut EngineCore, members: Vec<NodeId>) -> GroupId {
    match core.dispatch(Action::CreateGroup(NewGroup { node_ids: members, ..NewGroup::default() })).0 {
        Some(Created::Group(g)) => g.id,
        other => panic!("expected group, got {other:?}"),
    }
}

fn select(core: &mut EngineCore, ids: &[NodeId]) {
    core.dispatch(Action::Select { ids: ids.to_vec() });
}

fn tap(core: &mut EngineCore, at: Point, now_ms: f64) -> Vec<Effect> {
    let mut effects = core.on_pointer_down(at, Button::Primary);
    effects.extend(core.on_pointer_up(at, now_ms));
    effects
}

fn drag(core: &mut EngineCore, from: Point, to: Point) -> Vec<Effect> {
    let mut effects = core.on_pointer_down(from, Button::Primary);
    effects.extend(core.on_pointer_move(to));
    effects.extend(core.on_pointer_up(to, 0.0));
    effects
}

fn history_len(core: &EngineCore) -> usize {
    core.store.history().len()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn core_new_is_empty_and_idle() {
    let core = EngineCore::new();
    assert!(core.selection().is_empty());
    assert!(core.input.is_idle());
    assert!(core.pinch.is_none());
    assert!(core.store.doc().is_empty());
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn with_store_keeps_history_limits() {
    let limits = crate::history::HistoryLimits { max_entries: 2, max_bytes: usize::MAX };
    let mut core = EngineCore::with_store(Store::with_history_limits(limits));
    for i in 0..5 {
        add_node(&mut core, f64::from(i) * 100.0, 0.0);
    }
    assert_eq!(history_len(&core), 2);
}

// =============================================================
// Empty canvas: tap creates, drag pans
// =============================================================

#[test]
fn tap_on_empty_canvas_creates_node() {
    let mut core = EngineCore::new();
    core.store.dispatch(Action::SetCamera(Camera { pan_x: 100.0, pan_y: 50.0, zoom: 2.0 }));
    let down = core.on_pointer_down(pt(300.0, 250.0), Button::Primary);
    assert_eq!(down.iter().filter(|e| **e == Effect::RenderNeeded).count(), 1);
    let up = core.on_pointer_up(pt(300.0, 250.0), 0.0);
    assert!(up.contains(&Effect::RenderNeeded));
    let nodes = core.store.doc().nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!((nodes[0].x, nodes[0].y), (100.0, 100.0));
}

#[test]
fn small_wobble_is_still_a_tap() {
    let mut core = EngineCore::new();
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary);
    core.on_pointer_move(pt(103.0, 102.0));
    core.on_pointer_up(pt(103.0, 102.0), 0.0);
    assert_eq!(core.store.doc().nodes().len(), 1);
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn drag_on_empty_canvas_pans_without_creating() {
    let mut core = EngineCore::new();
    drag(&mut core, pt(100.0, 100.0), pt(150.0, 130.0));
    assert!(core.store.doc().is_empty());
    let cam = core.camera();
    assert_eq!((cam.pan_x, cam.pan_y), (50.0, 30.0));
    assert!(core.input.is_idle());
}

#[test]
fn pan_keeps_grabbed_world_point_under_pointer() {
    let mut core = EngineCore::new();
    core.store.dispatch(Action::SetCamera(Camera { pan_x: 10.0, pan_y: -20.0, zoom: 1.7 }));
    let grab = pt(200.0, 200.0);
    let world = core.camera().screen_to_world(grab);
    core.on_pointer_down(grab, Button::Primary);
    core.on_pointer_move(pt(260.0, 180.0));
    core.on_pointer_move(pt(320.0, 90.0));
    let back = core.camera().screen_to_world(pt(320.0, 90.0));
    assert!(approx_eq(back.x, world.x) && approx_eq(back.y, world.y));
}

#[test]
fn tap_on_empty_canvas_deselects() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    select(&mut core, &[a]);
    let effects = core.on_pointer_down(pt(400.0, 400.0), Button::Primary);
    assert!(core.selection().is_empty());
    assert!(effects.contains(&Effect::PanelsHidden));
}

#[test]
fn non_primary_button_is_ignored() {
    let mut core = EngineCore::new();
    let effects = core.on_pointer_down(pt(10.0, 10.0), Button::Secondary);
    assert!(effects.is_empty());
    assert!(core.input.is_idle());
    core.on_pointer_up(pt(10.0, 10.0), 0.0);
    assert!(core.store.doc().is_empty());
}

// =============================================================
// Node taps
// =============================================================

#[test]
fn tap_selects_then_second_tap_toggles_focus() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    tap(&mut core, pt(100.0, 100.0), 0.0);
    assert_eq!(core.selection(), &[a]);
    assert_eq!(core.store.ui().focus_id, None);

    tap(&mut core, pt(100.0, 100.0), 1000.0);
    assert_eq!(core.store.ui().focus_id, Some(a));
    tap(&mut core, pt(100.0, 100.0), 2000.0);
    assert_eq!(core.store.ui().focus_id, None);
}

#[test]
fn double_tap_opens_then_closes_edit_bar() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    tap(&mut core, pt(100.0, 100.0), 0.0);
    let effects = tap(&mut core, pt(100.0, 100.0), 200.0);
    assert!(effects.contains(&Effect::EditBarShown(a)));
    assert_eq!(core.store.ui().edit_target, Some(a));

    tap(&mut core, pt(100.0, 100.0), 1000.0);
    let effects = tap(&mut core, pt(100.0, 100.0), 1100.0);
    assert!(effects.contains(&Effect::EditBarHidden));
    assert_eq!(core.store.ui().edit_target, None);
}

#[test]
fn slow_second_tap_is_not_a_double_tap() {
    let mut core = EngineCore::new();
    add_node(&mut core, 100.0, 100.0);
    tap(&mut core, pt(100.0, 100.0), 0.0);
    tap(&mut core, pt(100.0, 100.0), 300.0);
    assert_eq!(core.store.ui().edit_target, None);
}

#[test]
fn taps_on_different_nodes_are_not_a_double_tap() {
    let mut core = EngineCore::new();
    add_node(&mut core, 100.0, 100.0);
    let b = add_node(&mut core, 300.0, 100.0);
    tap(&mut core, pt(100.0, 100.0), 0.0);
    tap(&mut core, pt(300.0, 100.0), 100.0);
    assert_eq!(core.store.ui().edit_target, None);
    assert_eq!(core.selection(), &[b]);
}

#[test]
fn tap_on_another_node_between_breaks_the_double_tap() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    add_node(&mut core, 300.0, 100.0);
    tap(&mut core, pt(100.0, 100.0), 0.0);
    tap(&mut core, pt(300.0, 100.0), 100.0);
    tap(&mut core, pt(100.0, 100.0), 200.0);
    assert_eq!(core.store.ui().edit_target, None);
    assert_eq!(core.selection(), &[a]);
}

// =============================================================
// Node drags
// =============================================================

#[test]
fn node_drag_is_one_undo_step() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    let entries = history_len(&core);

    core.on_pointer_down(pt(100.0, 100.0), Button::Primary);
    for i in 1..=50 {
        core.on_pointer_move(pt(100.0 + f64::from(i) * 2.0, 100.0));
    }
    assert_eq!(history_len(&core), entries);
    core.on_pointer_up(pt(200.0, 100.0), 0.0);
    assert_eq!(history_len(&core), entries + 1);
    assert_eq!(core.node(a).map(|n| n.x), Some(200.0));

    core.undo();
    assert_eq!(core.node(a).map(|n| n.x), Some(100.0));
}

#[test]
fn node_drag_does_not_toggle_focus() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    select(&mut core, &[a]);
    drag(&mut core, pt(100.0, 100.0), pt(180.0, 100.0));
    assert_eq!(core.store.ui().focus_id, None);
}

#[test]
fn locked_node_cannot_be_dragged() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    core.dispatch(Action::ToggleLock { id: a });
    let entries = history_len(&core);
    drag(&mut core, pt(100.0, 100.0), pt(300.0, 300.0));
    let node = core.node(a).unwrap();
    assert_eq!((node.x, node.y), (100.0, 100.0));
    assert_eq!(history_len(&core), entries);
}

#[test]
fn dragging_a_selected_node_moves_the_whole_selection() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    let b = add_node(&mut core, 100.0, 0.0);
    let c = add_node(&mut core, 300.0, 300.0);
    select(&mut core, &[a, b]);
    let entries = history_len(&core);

    core.on_pointer_down(pt(0.0, 0.0), Button::Primary);
    core.on_pointer_move(pt(50.0, 20.0));
    assert!(matches!(core.input, InputState::MovingNodes { .. }));
    core.on_pointer_move(pt(60.0, 30.0));
    core.on_pointer_up(pt(60.0, 30.0), 0.0);

    assert_eq!(core.node(a).map(|n| (n.x, n.y)), Some((60.0, 30.0)));
    assert_eq!(core.node(b).map(|n| (n.x, n.y)), Some((160.0, 30.0)));
    assert_eq!(core.node(c).map(|n| (n.x, n.y)), Some((300.0, 300.0)));
    assert_eq!(history_len(&core), entries + 1);
}

#[test]
fn dragging_an_unselected_node_moves_only_it() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    let b = add_node(&mut core, 100.0, 0.0);
    let c = add_node(&mut core, 300.0, 0.0);
    select(&mut core, &[a, b]);
    drag(&mut core, pt(300.0, 0.0), pt(300.0, 100.0));
    assert_eq!(core.selection(), &[c]);
    assert_eq!(core.node(a).map(|n| n.y), Some(0.0));
    assert_eq!(core.node(c).map(|n| n.y), Some(100.0));
}

// =============================================================
// Handle drags
// =============================================================

#[test]
fn handle_drag_to_empty_space_creates_styled_node_and_edge() {
    let mut core = EngineCore::new();
    let new = NewNode {
        shape: Some(Shape::Square),
        color: Some("#ff6b35".into()),
        size: Some(NodeSize::L),
        ..NewNode::at(pt(100.0, 100.0))
    };
    let a = core.dispatch(Action::CreateNode(new)).0.and_then(|c| c.node_id()).unwrap();
    select(&mut core, &[a]);

    // East handle: radius 40 plus offset 8.
    core.on_pointer_down(pt(148.0, 100.0), Button::Primary);
    assert!(matches!(core.input, InputState::DraggingHandle { from, .. } if from == a));
    core.on_pointer_move(pt(400.0, 300.0));
    assert_eq!(core.preview.ghost_edge, Some((a, pt(400.0, 300.0))));
    assert_eq!(core.preview.ghost_node, Some((a, pt(400.0, 300.0))));
    core.on_pointer_up(pt(400.0, 300.0), 0.0);

    assert!(core.preview.is_empty());
    let nodes = core.store.doc().nodes();
    assert_eq!(nodes.len(), 2);
    let b = &nodes[1];
    assert_eq!((b.x, b.y), (400.0, 300.0));
    assert_eq!((b.shape, b.size, b.color.as_str()), (Shape::Square, NodeSize::L, "#ff6b35"));
    let edge = &core.store.doc().edges()[0];
    assert_eq!((edge.from, edge.to, edge.mode), (a, b.id, EdgeMode::Fwd));
}

#[test]
fn handle_drag_onto_another_node_links_them() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    let b = add_node(&mut core, 400.0, 100.0);
    select(&mut core, &[a]);

    core.on_pointer_down(pt(134.0, 100.0), Button::Primary);
    core.on_pointer_move(pt(390.0, 100.0));
    assert!(core.preview.ghost_node.is_none());
    core.on_pointer_up(pt(390.0, 100.0), 0.0);

    assert_eq!(core.store.doc().nodes().len(), 2);
    assert!(core.store.doc().edge_exists(a, b));
}

#[test]
fn handle_drag_back_onto_origin_creates_self_loop() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    select(&mut core, &[a]);

    // North handle.
    core.on_pointer_down(pt(100.0, 66.0), Button::Primary);
    core.on_pointer_move(pt(100.0, 30.0));
    core.on_pointer_up(pt(100.0, 80.0), 0.0);

    assert!(core.store.doc().edge_exists(a, a));
    assert_eq!(core.store.doc().nodes().len(), 1);
}

#[test]
fn handle_tap_without_drag_does_nothing() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    select(&mut core, &[a]);
    let entries = history_len(&core);
    tap(&mut core, pt(134.0, 100.0), 0.0);
    assert!(core.store.doc().edges().is_empty());
    assert_eq!(core.store.doc().nodes().len(), 1);
    assert_eq!(history_len(&core), entries);
}

#[test]
fn repeated_handle_drag_does_not_duplicate_edge() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    add_node(&mut core, 400.0, 100.0);
    for _ in 0..2 {
        select(&mut core, &[a]);
        drag(&mut core, pt(134.0, 100.0), pt(395.0, 100.0));
    }
    assert_eq!(core.store.doc().edges().len(), 1);
}

// =============================================================
// Edges and groups
// =============================================================

#[test]
fn edge_tap_cycles_direction() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    let b = add_node(&mut core, 400.0, 0.0);
    core.dispatch(Action::CreateEdge { from: a, to: b });
    let eid = core.store.doc().edges()[0].id;

    // Curve midpoint bows 36 units below the chord.
    tap(&mut core, pt(200.0, 36.0), 0.0);
    assert_eq!(core.store.doc().edge(eid).map(|e| e.mode), Some(EdgeMode::Bwd));
    tap(&mut core, pt(200.0, 36.0), 1000.0);
    tap(&mut core, pt(200.0, 36.0), 2000.0);
    assert!(core.store.doc().edge(eid).is_none());
}

#[test]
fn group_tap_requests_summary_and_deselects() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    let gid = add_group(&mut core, vec![a]);
    select(&mut core, &[a]);

    let effects = tap(&mut core, pt(50.0, 50.0), 0.0);
    assert!(effects.contains(&Effect::GroupSummary(gid)));
    assert!(core.selection().is_empty());
    assert_eq!(core.store.doc().nodes().len(), 1);
}

// =============================================================
// Select mode
// =============================================================

#[test]
fn select_mode_taps_toggle_membership() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    let b = add_node(&mut core, 100.0, 0.0);
    core.dispatch(Action::SetSelectMode { on: true });

    tap(&mut core, pt(0.0, 0.0), 0.0);
    tap(&mut core, pt(100.0, 0.0), 1000.0);
    assert_eq!(core.selection(), &[a, b]);
    tap(&mut core, pt(0.0, 0.0), 2000.0);
    assert_eq!(core.selection(), &[b]);
    assert_eq!(core.store.ui().focus_id, None);
}

#[test]
fn select_mode_rectangle_selects_enclosed_centres() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    let b = add_node(&mut core, 100.0, 0.0);
    add_node(&mut core, 300.0, 0.0);
    core.dispatch(Action::SetSelectMode { on: true });

    core.on_pointer_down(pt(-50.0, -50.0), Button::Primary);
    core.on_pointer_move(pt(150.0, 50.0));
    assert_eq!(
        core.preview.rect,
        Some(SelectionRect::Screen(Rect { x: -50.0, y: -50.0, w: 200.0, h: 100.0 }))
    );
    core.on_pointer_up(pt(150.0, 50.0), 0.0);

    assert_eq!(core.selection(), &[a, b]);
    assert!(core.preview.is_empty());
    assert!(core.store.ui().select_mode);
}

// =============================================================
// Group drawing
// =============================================================

#[test]
fn drawn_group_collects_nodes_within_padding() {
    let mut core = EngineCore::new();
    let inside = add_node(&mut core, 100.0, 100.0);
    let on_pad = add_node(&mut core, 250.0 + GROUP_PAD, 100.0);
    add_node(&mut core, 250.0 + GROUP_PAD + 1.0, 100.0);
    core.dispatch(Action::SetGroupDrawMode { on: true });

    core.on_pointer_down(pt(50.0, 50.0), Button::Primary);
    core.on_pointer_move(pt(250.0, 150.0));
    assert!(matches!(core.preview.rect, Some(SelectionRect::World(_))));
    core.on_pointer_up(pt(250.0, 150.0), 0.0);

    let groups = core.store.doc().groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].node_ids, vec![inside, on_pad]);
    assert_eq!(groups[0].bounds, Some(Rect { x: 50.0, y: 50.0, w: 200.0, h: 100.0 }));
    assert!(!core.store.ui().group_draw_mode);
}

#[test]
fn group_draw_tap_just_leaves_the_mode() {
    let mut core = EngineCore::new();
    core.dispatch(Action::SetGroupDrawMode { on: true });
    tap(&mut core, pt(50.0, 50.0), 0.0);
    assert!(core.store.doc().is_empty());
    assert!(!core.store.ui().group_draw_mode);
}

#[test]
fn group_draw_ignores_node_presses() {
    let mut core = EngineCore::new();
    add_node(&mut core, 100.0, 100.0);
    core.dispatch(Action::SetGroupDrawMode { on: true });
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary);
    assert!(core.input.is_idle());
    assert!(core.selection().is_empty());
}

// =============================================================
// Wheel and pinch
// =============================================================

#[test]
fn wheel_zooms_around_pointer() {
    let mut core = EngineCore::new();
    let anchor = pt(200.0, 100.0);
    core.on_wheel(anchor, WheelDelta { dx: 0.0, dy: -120.0 });
    let cam = core.camera();
    assert!(approx_eq(cam.zoom, WHEEL_ZOOM_IN));
    let world = cam.screen_to_world(anchor);
    assert!(approx_eq(world.x, 200.0) && approx_eq(world.y, 100.0));

    core.on_wheel(anchor, WheelDelta { dx: 0.0, dy: 120.0 });
    assert!(approx_eq(core.camera().zoom, WHEEL_ZOOM_IN * WHEEL_ZOOM_OUT));
}

#[test]
fn wheel_without_vertical_delta_is_ignored() {
    let mut core = EngineCore::new();
    let effects = core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 40.0, dy: 0.0 });
    assert!(effects.is_empty());
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn wheel_zoom_is_clamped() {
    let mut core = EngineCore::new();
    for _ in 0..100 {
        core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: -1.0 });
    }
    assert_eq!(core.camera().zoom, ZOOM_MAX);
}

#[test]
fn pinch_on_empty_space_zooms_camera() {
    let mut core = EngineCore::new();
    core.on_touch_start(&[pt(100.0, 100.0), pt(200.0, 100.0)]);
    assert!(matches!(core.pinch, Some(PinchState { target: PinchTarget::Camera, .. })));
    core.on_touch_move(&[pt(50.0, 100.0), pt(250.0, 100.0)]);
    let cam = core.camera();
    assert!(approx_eq(cam.zoom, 2.0));
    let world = cam.screen_to_world(pt(150.0, 100.0));
    assert!(approx_eq(world.x, 150.0) && approx_eq(world.y, 100.0));

    core.on_touch_end(&[pt(250.0, 100.0)], pt(50.0, 100.0), 0.0);
    assert!(core.pinch.is_none());
    assert!(core.store.doc().is_empty());
}

#[test]
fn pinch_over_selected_node_steps_size_with_hysteresis() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 150.0, 100.0);
    select(&mut core, &[a]);
    let size = |core: &EngineCore| core.node(a).map(|n| n.size);

    core.on_touch_start(&[pt(100.0, 100.0), pt(200.0, 100.0)]);
    assert!(matches!(core.pinch, Some(PinchState { target: PinchTarget::NodeSize(id), .. }) if id == a));

    core.on_touch_move(&[pt(80.0, 100.0), pt(220.0, 100.0)]);
    assert_eq!(size(&core), Some(NodeSize::L));
    // Spreading further has nowhere to go.
    core.on_touch_move(&[pt(40.0, 100.0), pt(260.0, 100.0)]);
    assert_eq!(size(&core), Some(NodeSize::L));
    // Pulled back in, but not past the shrink ratio of the last step.
    core.on_touch_move(&[pt(95.0, 100.0), pt(205.0, 100.0)]);
    assert_eq!(size(&core), Some(NodeSize::L));
    core.on_touch_move(&[pt(100.0, 100.0), pt(200.0, 100.0)]);
    assert_eq!(size(&core), Some(NodeSize::M));
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn second_contact_cancels_drag_without_commit() {
    let mut core = EngineCore::new();
    core.on_touch_start(&[pt(300.0, 300.0)]);
    assert!(matches!(core.input, InputState::Panning { .. }));
    core.on_touch_start(&[pt(300.0, 300.0), pt(400.0, 300.0)]);
    assert!(core.input.is_idle());
    assert!(core.pinch.is_some());

    core.on_touch_end(&[pt(300.0, 300.0)], pt(400.0, 300.0), 0.0);
    core.on_touch_end(&[], pt(300.0, 300.0), 10.0);
    assert!(core.store.doc().is_empty());
}

#[test]
fn pointer_events_are_ignored_during_pinch() {
    let mut core = EngineCore::new();
    core.on_touch_start(&[pt(100.0, 100.0), pt(200.0, 100.0)]);
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary);
    core.on_pointer_up(pt(500.0, 500.0), 0.0);
    assert!(core.store.doc().is_empty());
}

#[test]
fn single_touch_tap_creates_node() {
    let mut core = EngineCore::new();
    core.on_touch_start(&[pt(10.0, 20.0)]);
    core.on_touch_end(&[], pt(10.0, 20.0), 0.0);
    assert_eq!(core.store.doc().nodes().len(), 1);
}

#[test]
fn three_contacts_start_nothing() {
    let mut core = EngineCore::new();
    let touches = [pt(10.0, 20.0), pt(200.0, 20.0), pt(100.0, 200.0)];
    core.on_touch_start(&touches);
    assert!(core.input.is_idle());
    assert!(core.pinch.is_none());

    core.on_touch_move(&[pt(60.0, 20.0), pt(250.0, 20.0), pt(150.0, 200.0)]);
    assert_eq!(core.camera(), Camera::default());
    core.on_touch_end(&touches[1..], touches[0], 0.0);
    core.on_touch_end(&touches[2..], touches[1], 5.0);
    core.on_touch_end(&[], touches[2], 10.0);
    assert!(core.store.doc().is_empty());
}

// =============================================================
// Presentation and fly-to
// =============================================================

#[test]
fn present_mode_ignores_pointer_input() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 0.0, 0.0);
    core.dispatch(Action::StartPresent { list: vec![a] });
    tap(&mut core, pt(400.0, 400.0), 0.0);
    assert_eq!(core.store.doc().nodes().len(), 1);
}

#[test]
fn start_present_flies_to_first_node() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0);
    let a = add_node(&mut core, 100.0, 50.0);
    let (_, effects) = core.dispatch(Action::StartPresent { list: vec![a] });
    assert!(effects.contains(&Effect::FlyTo(a)));
    assert!(core.fly.is_some_and(|f| f.node == a));
}

#[test]
fn tick_animates_to_the_node_and_finishes() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0);
    let a = add_node(&mut core, 100.0, 50.0);
    core.fly_to(a);

    core.tick(1000.0);
    assert_eq!(core.camera(), Camera::default());
    let effects = core.tick(1000.0 + FLY_DURATION_MS / 2.0);
    assert!(!effects.contains(&Effect::FlyFinished(a)));
    let effects = core.tick(1000.0 + FLY_DURATION_MS);
    assert!(effects.contains(&Effect::FlyFinished(a)));
    assert!(core.fly.is_none());

    let screen = core.camera().world_to_screen(pt(100.0, 50.0));
    assert!((screen.x - 400.0).abs() < 1e-6);
    assert!((screen.y - 300.0).abs() < 1e-6);
}

#[test]
fn fly_to_missing_node_finishes_immediately() {
    let mut core = EngineCore::new();
    let effects = core.fly_to(42);
    assert_eq!(effects, vec![Effect::FlyFinished(42)]);
    assert!(core.fly.is_none());
    assert!(core.tick(0.0).is_empty());
}

// =============================================================
// Host pass-throughs
// =============================================================

#[test]
fn dispatch_wire_reports_created_entity() {
    let mut core = EngineCore::new();
    let (created, effects) = core
        .dispatch_wire(json!({"type": "CREATE_NODE", "payload": {"x": 1.0, "y": 2.0, "label": "hi"}}))
        .unwrap();
    assert!(matches!(created, Some(Created::Node(ref n)) if n.label == "hi"));
    assert!(effects.contains(&Effect::RenderNeeded));
    assert!(core.dispatch_wire(json!({"type": "BOGUS"})).is_err());
}

#[test]
fn undo_and_redo_report_notices() {
    let mut core = EngineCore::new();
    tap(&mut core, pt(10.0, 10.0), 0.0);
    assert!(core.undo().contains(&Effect::Notice(Notice::Undone)));
    assert!(core.store.doc().is_empty());
    assert!(core.redo().contains(&Effect::Notice(Notice::Redone)));
    assert_eq!(core.store.doc().nodes().len(), 1);
    assert!(core.redo().contains(&Effect::Notice(Notice::NothingToRedo)));
}

#[test]
fn cancel_drag_abandons_gesture() {
    let mut core = EngineCore::new();
    let a = add_node(&mut core, 100.0, 100.0);
    select(&mut core, &[a]);
    core.on_pointer_down(pt(134.0, 100.0), Button::Primary);
    core.on_pointer_move(pt(300.0, 100.0));
    let effects = core.cancel_drag();
    assert!(core.input.is_idle());
    assert!(core.preview.is_empty());
    assert!(effects.contains(&Effect::RenderNeeded));
    core.on_pointer_up(pt(300.0, 100.0), 0.0);
    assert_eq!(core.store.doc().nodes().len(), 1);
}
