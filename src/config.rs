//! Command-line and environment configuration for the session replayer.

use std::path::PathBuf;
use std::str::FromStr;

use canvas::consts::{HISTORY_MAX_BYTES, HISTORY_MAX_ENTRIES};
use canvas::history::HistoryLimits;
use clap::Parser;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

#[derive(Parser, Debug)]
#[command(name = "thoughtspace", about = "Replay a thought-space editing session headlessly")]
pub struct Cli {
    /// JSON-lines script of input events and actions (`-` reads stdin).
    #[arg(long, env = "THOUGHTSPACE_SCRIPT", default_value = "-")]
    pub script: String,

    /// Snapshot to load before replaying.
    #[arg(long, env = "THOUGHTSPACE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Where to write the final snapshot. Stdout when absent.
    #[arg(long, env = "THOUGHTSPACE_OUT")]
    pub out: Option<PathBuf>,

    /// Viewport size used for fly-to framing, as `WIDTHxHEIGHT`.
    #[arg(long, env = "THOUGHTSPACE_VIEWPORT", default_value = "1280x800")]
    pub viewport: Viewport,

    #[arg(long, env = "THOUGHTSPACE_HISTORY_ENTRIES", default_value_t = HISTORY_MAX_ENTRIES)]
    pub history_entries: usize,

    #[arg(long, env = "THOUGHTSPACE_HISTORY_BYTES", default_value_t = HISTORY_MAX_BYTES)]
    pub history_bytes: usize,

    /// Stop at the first action the core rejects instead of logging it.
    #[arg(long)]
    pub strict: bool,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, env = "THOUGHTSPACE_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    #[must_use]
    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits { max_entries: self.history_entries.max(1), max_bytes: self.history_bytes }
    }
}

/// Viewport size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewportError {
    #[error("expected WIDTHxHEIGHT, got `{0}`")]
    Format(String),
    #[error("viewport dimensions must be positive, got `{0}`")]
    NonPositive(String),
}

impl FromStr for Viewport {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(|| ViewportError::Format(s.to_owned()))?;
        let parse = |v: &str| v.trim().parse::<f64>().map_err(|_| ViewportError::Format(s.to_owned()));
        let (width, height) = (parse(w)?, parse(h)?);
        if !(width > 0.0 && height > 0.0) {
            return Err(ViewportError::NonPositive(s.to_owned()));
        }
        Ok(Self { width, height })
    }
}
