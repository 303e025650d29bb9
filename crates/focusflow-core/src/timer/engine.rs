//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no thread or timer:
//! `start()` asks the injected [`Scheduler`] for a 1 Hz subscription whose
//! callback feeds the [`TickSink`], and whoever owns the engine routes those
//! ticks back into [`TimerEngine::tick`].
//!
//! ## Phase Transitions
//!
//! ```text
//! Work --(n % N != 0)--> ShortBreak --> Work
//! Work --(n % N == 0)--> LongBreak  --> Work
//! any  --pause()-------> Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings, sessions, scheduler, tick_sink);
//! engine.start();
//! // For every tick delivered to the sink:
//! engine.tick();
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::phase::Phase;
use super::quotes::QuotePicker;
use crate::clock::{Clock, SystemClock};
use crate::events::{Event, Listener, Observers};
use crate::scheduler::{Scheduler, SubscriptionHandle, TickSink};
use crate::session::SessionRecord;
use crate::stats::{StatsEngine, StatsSnapshot};
use crate::storage::{SessionStore, SettingsStore};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Observable timer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub running: bool,
    /// Completed Work phases. Only ever increases.
    pub completed_pomodoros: u32,
    pub quote: String,
}

/// State plus derived display values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub total_secs: u32,
    /// 0.0 .. 1.0 progress within the current phase.
    pub progress: f64,
    pub color: String,
    pub label: String,
}

/// Core timer engine.
pub struct TimerEngine {
    state: TimerState,
    settings: Arc<dyn SettingsStore>,
    sessions: Box<dyn SessionStore>,
    /// In-memory log; authoritative over the store.
    log: Vec<SessionRecord>,
    /// Records the store has not accepted yet, oldest first.
    unsynced: VecDeque<SessionRecord>,
    scheduler: Box<dyn Scheduler>,
    subscription: Option<SubscriptionHandle>,
    tick_sink: TickSink,
    clock: Arc<dyn Clock>,
    quotes: QuotePicker,
    stats: StatsEngine,
    observers: Observers<Event>,
}

impl TimerEngine {
    /// Create a stopped engine in `Work` with the configured work duration.
    ///
    /// Loads the existing session log; a failed load starts from an empty log.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        sessions: Box<dyn SessionStore>,
        scheduler: Box<dyn Scheduler>,
        tick_sink: TickSink,
    ) -> Self {
        let log = sessions.load_all().unwrap_or_else(|e| {
            warn!(error = %e, "could not load session log; starting empty");
            Vec::new()
        });
        let quotes = QuotePicker::default();
        let state = TimerState {
            phase: Phase::Work,
            remaining_secs: settings.settings().duration_secs(Phase::Work),
            running: false,
            completed_pomodoros: 0,
            quote: quotes.first().to_string(),
        };

        let mut engine = Self {
            state,
            settings,
            sessions,
            log,
            unsynced: VecDeque::new(),
            scheduler,
            subscription: None,
            tick_sink,
            clock: Arc::new(SystemClock),
            quotes,
            stats: StatsEngine::new(),
            observers: Observers::new(),
        };
        engine.refresh_stats();
        engine
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.refresh_stats();
        self
    }

    pub fn with_quotes(mut self, quotes: QuotePicker) -> Self {
        self.state.quote = quotes.first().to_string();
        self.quotes = quotes;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn stats(&self) -> &StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.log
    }

    /// Records still waiting to be written to the session store.
    pub fn unsynced(&self) -> usize {
        self.unsynced.len()
    }

    pub fn subscription(&self) -> Option<SubscriptionHandle> {
        self.subscription
    }

    /// Configured length of the current phase.
    pub fn total_secs(&self) -> u32 {
        self.settings.settings().duration_secs(self.state.phase)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let total = self.total_secs();
        let progress = if total == 0 {
            0.0
        } else {
            (1.0 - f64::from(self.state.remaining_secs) / f64::from(total)).clamp(0.0, 1.0)
        };
        TimerSnapshot {
            state: self.state.clone(),
            total_secs: total,
            progress,
            color: self.state.phase.color().to_string(),
            label: self.state.phase.label().to_string(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener<Event>) {
        self.observers.subscribe(listener);
    }

    pub fn subscribe_stats(&mut self, listener: Listener<StatsSnapshot>) {
        self.stats.subscribe(listener);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or restart) tick delivery. Calling while running replaces the
    /// existing subscription.
    pub fn start(&mut self) {
        self.arm();
        info!(
            phase = %self.state.phase,
            remaining = self.state.remaining_secs,
            "timer started"
        );
        self.emit(Event::TimerStarted {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: self.now_utc(),
        });
    }

    /// Stop ticking and drop into `Paused`. Remaining time is kept.
    pub fn pause(&mut self) {
        self.disarm();
        self.state.running = false;
        self.state.phase = Phase::Paused;
        info!(remaining = self.state.remaining_secs, "timer paused");
        self.emit(Event::TimerPaused {
            remaining_secs: self.state.remaining_secs,
            at: self.now_utc(),
        });
    }

    /// Pause, then refill from the work duration.
    pub fn reset(&mut self) {
        self.pause();
        self.sync_time_with_settings();
        self.emit(Event::TimerReset {
            remaining_secs: self.state.remaining_secs,
            at: self.now_utc(),
        });
    }

    /// A tick delivered through the sink. Ticks from a subscription that has
    /// since been cancelled or replaced are dropped.
    pub fn tick_from(&mut self, source: SubscriptionHandle) {
        if self.subscription != Some(source) {
            debug!(subscription = source.id(), "stale tick dropped");
            return;
        }
        self.tick();
    }

    /// One second elapsed. Ignored unless running.
    pub fn tick(&mut self) {
        if !self.state.running {
            return;
        }
        if self.state.remaining_secs > 0 {
            self.state.remaining_secs -= 1;
            self.emit(Event::Ticked {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
            });
        } else {
            self.advance_phase();
        }
    }

    /// Move to the next phase, re-reading durations from settings.
    pub fn advance_phase(&mut self) {
        let was_running = self.state.running;
        let from = self.state.phase;
        let settings = self.settings.settings();

        let next = match from {
            Phase::Work => {
                self.state.completed_pomodoros += 1;
                self.record_session(Phase::Work, settings.duration_secs(Phase::Work));
                if self.state.completed_pomodoros % settings.pomodoros_until_long_break() == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
            Phase::Paused => {
                debug!("advance requested while paused; ignoring");
                return;
            }
        };

        self.state.phase = next;
        self.state.remaining_secs = settings.duration_secs(next);
        if was_running {
            self.arm();
        }

        self.state.quote = self.quotes.pick().to_string();
        info!(
            from = %from,
            to = %next,
            completed = self.state.completed_pomodoros,
            "phase advanced"
        );
        self.emit(Event::PhaseAdvanced {
            from,
            to: next,
            remaining_secs: self.state.remaining_secs,
            completed_pomodoros: self.state.completed_pomodoros,
            quote: self.state.quote.clone(),
            at: self.now_utc(),
        });
        self.refresh_stats();
    }

    /// Refill remaining time from the configured duration of the current
    /// phase (`Paused` counts as Work).
    pub fn sync_time_with_settings(&mut self) {
        self.state.remaining_secs = self.settings.settings().duration_secs(self.state.phase);
        self.emit(Event::SettingsSynced {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
        });
    }

    /// React to a settings change. Only re-syncs while stopped, so a running
    /// countdown is never clobbered. Returns whether a sync happened.
    pub fn check_for_settings_changes(&mut self) -> bool {
        let expected = self.total_secs();
        if self.state.running || self.state.remaining_secs == expected {
            return false;
        }
        debug!(
            from = self.state.remaining_secs,
            to = expected,
            "settings changed while stopped; resyncing"
        );
        self.sync_time_with_settings();
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self) {
        self.disarm();
        let sink = self.tick_sink.clone();
        let handle = self
            .scheduler
            .subscribe(TICK_INTERVAL, Box::new(move |source: SubscriptionHandle| sink(source)));
        self.subscription = Some(handle);
        self.state.running = true;
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn record_session(&mut self, phase: Phase, duration_secs: u32) {
        let completed_at = self.now_utc();
        let record = match SessionRecord::new(phase, duration_secs, completed_at) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "completed interval not recorded");
                return;
            }
        };
        self.log.push(record.clone());
        self.unsynced.push_back(record.clone());
        self.flush_unsynced();
        self.emit(Event::SessionRecorded { record });
    }

    /// Write pending records in order, stopping at the first failure.
    fn flush_unsynced(&mut self) {
        while let Some(record) = self.unsynced.front() {
            if let Err(e) = self.sessions.append(record) {
                warn!(
                    error = %e,
                    pending = self.unsynced.len(),
                    "session not persisted; will retry on next append"
                );
                return;
            }
            self.unsynced.pop_front();
        }
    }

    fn refresh_stats(&mut self) {
        let now = self.clock.now();
        let snapshot = self.stats.refresh(&self.log, &now).clone();
        self.emit(Event::StatsUpdated { snapshot });
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn emit(&self, event: Event) {
        self.observers.notify(&event);
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.disarm();
    }
}
