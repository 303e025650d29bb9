//! Statistics derived from the session log.
//!
//! Everything here is a pure function of the log and "now" (including its
//! timezone, which decides calendar days). [`StatsEngine`] only caches the
//! latest [`StatsSnapshot`] and tells subscribers when it is recomputed.

mod achievements;
mod aggregate;
mod streak;

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{Listener, Observers};
use crate::session::SessionRecord;
use crate::timer::Phase;

pub use achievements::{compute_achievements, Achievement};
pub use aggregate::{
    aggregate, daily_counts, group_by_day, history, start_of_day, today_window, week_window,
    Aggregate, DailyCount,
};
pub use streak::compute_streak;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub streak: u32,
    pub achievements: BTreeSet<Achievement>,
    pub today: Aggregate,
    pub week: Aggregate,
}

impl StatsSnapshot {
    pub fn compute<Tz: TimeZone>(log: &[SessionRecord], now: &DateTime<Tz>) -> Self {
        let streak = compute_streak(log, now);
        Self {
            streak,
            achievements: compute_achievements(log, streak, now),
            today: aggregate(log, &today_window(now), Some(Phase::Work)),
            week: aggregate(log, &week_window(now), Some(Phase::Work)),
        }
    }
}

/// Holds the latest snapshot and notifies on every refresh.
#[derive(Debug, Default)]
pub struct StatsEngine {
    snapshot: StatsSnapshot,
    observers: Observers<StatsSnapshot>,
}

impl StatsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &StatsSnapshot {
        &self.snapshot
    }

    pub fn subscribe(&mut self, listener: Listener<StatsSnapshot>) {
        self.observers.subscribe(listener);
    }

    pub fn refresh<Tz: TimeZone>(
        &mut self,
        log: &[SessionRecord],
        now: &DateTime<Tz>,
    ) -> &StatsSnapshot {
        self.snapshot = StatsSnapshot::compute(log, now);
        debug!(
            streak = self.snapshot.streak,
            today = self.snapshot.today.count,
            achievements = self.snapshot.achievements.len(),
            "stats recomputed"
        );
        self.observers.notify(&self.snapshot);
        &self.snapshot
    }
}
