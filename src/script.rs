//! Session scripts: one JSON object per line describing a host event.
//!
//! ```text
//! {"event": "pointer_down", "x": 120, "y": 80}
//! {"event": "pointer_up", "x": 120, "y": 80, "t": 16}
//! {"event": "dispatch", "action": {"type": "SET_GRID", "payload": {"style": "lines"}}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. `t` is a timestamp in
//! milliseconds; events without one reuse the last timestamp seen.

use std::io::BufRead;

use canvas::camera::Point;
use canvas::doc::NodeId;
use canvas::input::Button;
use serde::Deserialize;

use crate::replay::ReplayError;

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
        t: Option<f64>,
    },
    TouchStart {
        touches: Vec<Point>,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    TouchEnd {
        #[serde(default)]
        touches: Vec<Point>,
        lifted: Point,
        t: Option<f64>,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    Tick {
        t: f64,
    },
    Viewport {
        width: f64,
        height: f64,
    },
    /// A string-keyed action, decoded by the core.
    Dispatch {
        action: serde_json::Value,
    },
    Undo,
    Redo,
    FlyTo {
        id: NodeId,
    },
    CancelDrag,
}

/// One parsed script line with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub event: ScriptEvent,
}

/// Parse every event in a script.
///
/// # Errors
///
/// Returns `Read` if the reader fails and `Script` (with the line number) for
/// the first line that isn't a known event.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptLine>, ReplayError> {
    let mut events = Vec::new();
    for (idx, raw) in reader.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.map_err(|source| ReplayError::Read { what: "script".into(), source })?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| ReplayError::Script { line, source })?;
        events.push(ScriptLine { line, event });
    }
    Ok(events)
}
