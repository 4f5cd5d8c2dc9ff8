//! Data-changed notifications for hosts that persist the board.
//!
//! The board never writes storage itself. Content changes mark a
//! [`ChangeDebouncer`] dirty, and once the board has been quiet for the
//! configured interval the host's [`DataChangedSink`] receives a
//! [`BoardSnapshot`] to save however it likes.

use crate::board::Board;
use crate::element::BoardElement;
use crate::input::Instant;
use crate::selection::Selection;
use crate::viewport::ViewPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serializable state of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub children: Vec<BoardElement>,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub view_port: ViewPort,
}

impl BoardSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Receives board snapshots after content changes settle.
pub trait DataChangedSink {
    fn data_changed(&mut self, snapshot: &BoardSnapshot);
}

impl<F: FnMut(&BoardSnapshot)> DataChangedSink for F {
    fn data_changed(&mut self, snapshot: &BoardSnapshot) {
        self(snapshot)
    }
}

/// Trailing-edge debounce for content changes.
#[derive(Debug, Clone)]
pub struct ChangeDebouncer {
    /// Quiet period required before flushing.
    interval: Duration,
    /// Time of the most recent change.
    last_change: Option<Instant>,
    /// Whether there are undelivered changes.
    dirty: bool,
}

impl ChangeDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_change: None,
            dirty: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a change at `now`, restarting the quiet period.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether changes are pending and the quiet period has elapsed at `now`.
    pub fn should_flush(&self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_change {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Board {
    /// Current state as a snapshot.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            children: self.children.clone(),
            selection: self.selection.clone(),
            view_port: self.view_port,
        }
    }

    /// Install the sink that receives debounced snapshots.
    pub fn set_data_changed_sink(&mut self, sink: impl DataChangedSink + 'static) {
        self.data_sink = Some(Box::new(sink));
    }

    /// Deliver a snapshot if content changed and the board has been quiet
    /// long enough. Hosts call this from their timer or frame loop.
    pub fn poll_data_changed(&mut self, now: Instant) -> bool {
        if !self.debouncer.should_flush(now) {
            return false;
        }
        self.flush_data_changed()
    }

    /// Deliver pending changes immediately.
    pub fn flush_data_changed(&mut self) -> bool {
        if !self.debouncer.is_dirty() {
            return false;
        }
        self.debouncer.mark_clean();
        let snapshot = self.snapshot();
        match self.data_sink.as_mut() {
            Some(sink) => {
                sink.data_changed(&snapshot);
                true
            }
            None => {
                log::debug!("Content changed but no data sink is installed");
                false
            }
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        self.debouncer.is_dirty()
    }
}
