//! Headless session replay: feeds a parsed script through `EngineCore` and
//! reports what happened.

use std::io::{Read, Write};

use canvas::camera::Point;
use canvas::dispatch::{Action, Effect, Notice, Store, WireError};
use canvas::doc::Snapshot;
use canvas::engine::EngineCore;
use canvas::history::HistoryLimits;
use canvas::input::WheelDelta;
use tracing::{debug, info, warn};

use crate::config::Viewport;
use crate::script::{ScriptEvent, ScriptLine};

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot: {0}")]
    Write(#[source] std::io::Error),
    #[error("script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
    #[error("script line {line}: rejected action: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: WireError,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Counters collected while replaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub events: usize,
    pub rejected: usize,
    pub undos: usize,
    pub redos: usize,
    pub flights: usize,
}

/// Replays script events against one engine.
#[derive(Debug)]
pub struct Replayer {
    core: EngineCore,
    strict: bool,
    now_ms: f64,
    summary: Summary,
}

impl Replayer {
    #[must_use]
    pub fn new(limits: HistoryLimits, viewport: Viewport, strict: bool) -> Self {
        let mut core = EngineCore::with_store(Store::with_history_limits(limits));
        core.set_viewport(viewport.width, viewport.height);
        Self { core, strict, now_ms: 0.0, summary: Summary::default() }
    }

    /// Replace the document with a serialized snapshot. History restarts from it.
    ///
    /// # Errors
    ///
    /// Returns `Read` on I/O failure and `Snapshot` if the JSON doesn't parse.
    pub fn load_snapshot(&mut self, reader: impl Read) -> Result<(), ReplayError> {
        let data: Snapshot = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                ReplayError::Read { what: "snapshot".into(), source: e.into() }
            } else {
                ReplayError::Snapshot(e)
            }
        })?;
        let effects = self.core.dispatch(Action::Restore { data }).1;
        self.observe(&effects);
        Ok(())
    }

    /// Replay every event in order.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `Rejected` for the first action the core
    /// refuses to decode. Otherwise rejected actions are logged and counted.
    pub fn run(&mut self, script: &[ScriptLine]) -> Result<Summary, ReplayError> {
        for entry in script {
            self.step(entry)?;
        }
        info!(
            events = self.summary.events,
            rejected = self.summary.rejected,
            undos = self.summary.undos,
            redos = self.summary.redos,
            flights = self.summary.flights,
            nodes = self.core.store.doc().nodes().len(),
            edges = self.core.store.doc().edges().len(),
            groups = self.core.store.doc().groups().len(),
            "replay finished"
        );
        Ok(self.summary)
    }

    fn step(&mut self, entry: &ScriptLine) -> Result<(), ReplayError> {
        self.summary.events += 1;
        let effects = match entry.event.clone() {
            ScriptEvent::PointerDown { x, y, button } => self.core.on_pointer_down(Point::new(x, y), button),
            ScriptEvent::PointerMove { x, y } => self.core.on_pointer_move(Point::new(x, y)),
            ScriptEvent::PointerUp { x, y, t } => {
                let now = self.clock(t);
                self.core.on_pointer_up(Point::new(x, y), now)
            }
            ScriptEvent::TouchStart { touches } => self.core.on_touch_start(&touches),
            ScriptEvent::TouchMove { touches } => self.core.on_touch_move(&touches),
            ScriptEvent::TouchEnd { touches, lifted, t } => {
                let now = self.clock(t);
                self.core.on_touch_end(&touches, lifted, now)
            }
            ScriptEvent::Wheel { x, y, dx, dy } => self.core.on_wheel(Point::new(x, y), WheelDelta { dx, dy }),
            ScriptEvent::Tick { t } => {
                let now = self.clock(Some(t));
                self.core.tick(now)
            }
            ScriptEvent::Viewport { width, height } => {
                self.core.set_viewport(width, height);
                Vec::new()
            }
            ScriptEvent::Dispatch { action } => match self.core.dispatch_wire(action) {
                Ok((_, effects)) => effects,
                Err(source) if self.strict => return Err(ReplayError::Rejected { line: entry.line, source }),
                Err(e) => {
                    warn!(line = entry.line, error = %e, "skipping rejected action");
                    self.summary.rejected += 1;
                    Vec::new()
                }
            },
            ScriptEvent::Undo => self.core.undo(),
            ScriptEvent::Redo => self.core.redo(),
            ScriptEvent::FlyTo { id } => self.core.fly_to(id),
            ScriptEvent::CancelDrag => self.core.cancel_drag(),
        };
        debug!(line = entry.line, effects = effects.len(), "event replayed");
        self.observe(&effects);
        Ok(())
    }

    /// Advance the script clock to `t` if given; otherwise keep the last time.
    fn clock(&mut self, t: Option<f64>) -> f64 {
        if let Some(t) = t {
            self.now_ms = t;
        }
        self.now_ms
    }

    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Notice(Notice::Undone) => self.summary.undos += 1,
                Effect::Notice(Notice::Redone) => self.summary.redos += 1,
                Effect::Notice(notice) => info!(?notice, "notice"),
                Effect::FlyFinished(node) => {
                    self.summary.flights += 1;
                    debug!(node, "fly-to finished");
                }
                Effect::GroupSummary(group) => info!(group, "group summary requested"),
                Effect::RenderNeeded
                | Effect::EditBarShown(_)
                | Effect::EditBarHidden
                | Effect::PanelsHidden
                | Effect::FlyTo(_) => {}
            }
        }
    }

    /// Serialize the live document as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `Encode` or `Write` on failure.
    pub fn write_snapshot(&self, mut writer: impl Write) -> Result<(), ReplayError> {
        let snap = self.core.store.doc().to_snapshot();
        serde_json::to_writer_pretty(&mut writer, &snap).map_err(ReplayError::Encode)?;
        writeln!(writer).map_err(ReplayError::Write)?;
        writer.flush().map_err(ReplayError::Write)
    }
}
