use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;
use crate::stats::StatsSnapshot;
use crate::timer::Phase;

/// Every state change in the engine produces an Event.
/// The presentation layer subscribes to them instead of polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Ticked {
        phase: Phase,
        remaining_secs: u32,
    },
    PhaseAdvanced {
        from: Phase,
        to: Phase,
        remaining_secs: u32,
        completed_pomodoros: u32,
        quote: String,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        record: SessionRecord,
    },
    /// Remaining time was re-read from settings while stopped.
    SettingsSynced {
        phase: Phase,
        remaining_secs: u32,
    },
    StatsUpdated {
        snapshot: StatsSnapshot,
    },
}

pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Subscriber list for explicit change notification.
///
/// Clones share the listeners, so a store can copy the list out of its lock
/// and notify without holding it.
pub struct Observers<T> {
    listeners: Vec<Arc<dyn Fn(&T) + Send + Sync>>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener<T>) {
        self.listeners.push(Arc::from(listener));
    }

    pub fn notify(&self, value: &T) {
        for listener in &self.listeners {
            listener(value);
        }
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
