use serde_json::{Value, json};

use super::*;
use crate::script::parse_script;

fn replayer() -> Replayer {
    Replayer::new(HistoryLimits::default(), Viewport { width: 800.0, height: 600.0 }, false)
}

fn lines(script: &str) -> Vec<ScriptLine> {
    parse_script(script.as_bytes()).unwrap()
}

fn written(replayer: &Replayer) -> Value {
    let mut out = Vec::new();
    replayer.write_snapshot(&mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn taps_and_handle_drag_build_a_document() {
    let mut r = replayer();
    let summary = r
        .run(&lines(
            r#"{"event": "pointer_down", "x": 100, "y": 100}
{"event": "pointer_up", "x": 100, "y": 100, "t": 0}
{"event": "pointer_down", "x": 100, "y": 100}
{"event": "pointer_up", "x": 100, "y": 100, "t": 1000}
{"event": "pointer_down", "x": 134, "y": 100}
{"event": "pointer_move", "x": 300, "y": 100}
{"event": "pointer_up", "x": 300, "y": 100, "t": 2000}
"#,
        ))
        .unwrap();
    assert_eq!(summary.events, 7);

    let snap = written(&r);
    assert_eq!(snap["nodes"].as_array().map(Vec::len), Some(2));
    assert_eq!(snap["edges"][0]["from"], json!(1));
    assert_eq!(snap["edges"][0]["to"], json!(2));
    assert_eq!(snap["nSeq"], json!(3));
}

#[test]
fn events_without_time_reuse_the_last_timestamp() {
    let mut r = replayer();
    r.run(&lines(
        r#"{"event": "dispatch", "action": {"type": "CREATE_NODE", "payload": {"x": 50, "y": 50}}}
{"event": "pointer_down", "x": 50, "y": 50}
{"event": "pointer_up", "x": 50, "y": 50, "t": 500}
{"event": "pointer_down", "x": 50, "y": 50}
{"event": "pointer_up", "x": 50, "y": 50}
"#,
    ))
    .unwrap();
    assert_eq!(r.core.store.ui().edit_target, Some(1));
}

#[test]
fn rejected_actions_are_counted_when_lenient() {
    let mut r = replayer();
    let summary = r
        .run(&lines(
            r#"{"event": "dispatch", "action": {"type": "LAUNCH_ROCKET"}}
{"event": "dispatch", "action": {"type": "CREATE_NODE", "payload": {"x": 0, "y": 0}}}
"#,
        ))
        .unwrap();
    assert_eq!(summary.rejected, 1);
    assert_eq!(r.core.store.doc().nodes().len(), 1);
}

#[test]
fn strict_mode_stops_at_rejected_action() {
    let mut r = Replayer::new(HistoryLimits::default(), Viewport { width: 800.0, height: 600.0 }, true);
    let err = r
        .run(&lines(
            "# header\n{\"event\": \"dispatch\", \"action\": {\"type\": \"DELETE_NODE\", \"payload\": {}}}\n",
        ))
        .unwrap_err();
    assert!(matches!(err, ReplayError::Rejected { line: 2, source: WireError::Malformed { .. } }));
}

#[test]
fn undo_and_redo_are_counted() {
    let mut r = replayer();
    let summary = r
        .run(&lines(
            r#"{"event": "pointer_down", "x": 10, "y": 10}
{"event": "pointer_up", "x": 10, "y": 10, "t": 0}
{"event": "undo"}
{"event": "undo"}
{"event": "redo"}
"#,
        ))
        .unwrap();
    assert_eq!((summary.undos, summary.redos), (1, 1));
    assert_eq!(r.core.store.doc().nodes().len(), 1);
}

#[test]
fn load_snapshot_restores_document() {
    let mut r = replayer();
    let snapshot = json!({
        "nodes": [{"id": 7, "x": 0, "y": 0, "color": "#00d4ff", "label": "seed"}],
        "edges": [],
        "groups": []
    })
    .to_string();
    r.load_snapshot(snapshot.as_bytes()).unwrap();
    assert_eq!(r.core.node(7).map(|n| n.label.as_str()), Some("seed"));
    assert!(!r.core.store.history().can_undo());

    r.run(&lines("{\"event\": \"dispatch\", \"action\": {\"type\": \"CREATE_NODE\", \"payload\": {\"x\": 90, \"y\": 0}}}\n"))
        .unwrap();
    assert!(r.core.node(8).is_some());
}

#[test]
fn invalid_snapshot_is_reported() {
    let mut r = replayer();
    let err = r.load_snapshot("{\"nodes\": 3}".as_bytes()).unwrap_err();
    assert!(matches!(err, ReplayError::Snapshot(_)));
}

#[test]
fn fly_to_completes_through_ticks() {
    let mut r = replayer();
    let summary = r
        .run(&lines(
            r#"{"event": "dispatch", "action": {"type": "CREATE_NODE", "payload": {"x": 100, "y": 100}}}
{"event": "fly_to", "id": 1}
{"event": "tick", "t": 0}
{"event": "tick", "t": 350}
{"event": "tick", "t": 700}
"#,
        ))
        .unwrap();
    assert_eq!(summary.flights, 1);
    let screen = r.core.camera().world_to_screen(canvas::camera::Point::new(100.0, 100.0));
    assert!((screen.x - 400.0).abs() < 1e-6);
    assert!((screen.y - 300.0).abs() < 1e-6);
}
