//! Milestone badges.
//!
//! Badges are recomputed from the current log on every call. One disappears
//! again as soon as its condition stops holding.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;
use crate::timer::Phase;

const DAILY_POMODORO_GOAL: usize = 5;
const STREAK_GOAL: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "5 Pomodoros in a day")]
    FivePomodorosInADay,
    #[serde(rename = "First Long Break")]
    FirstLongBreak,
    #[serde(rename = "7 days streak")]
    SevenDayStreak,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FivePomodorosInADay => "5 Pomodoros in a day",
            Achievement::FirstLongBreak => "First Long Break",
            Achievement::SevenDayStreak => "7 days streak",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub fn compute_achievements<Tz: TimeZone>(
    log: &[SessionRecord],
    streak: u32,
    now: &DateTime<Tz>,
) -> BTreeSet<Achievement> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut unlocked = BTreeSet::new();

    let today_work = log
        .iter()
        .filter(|r| r.is_work() && r.completed_at().with_timezone(&tz).date_naive() == today)
        .count();
    if today_work >= DAILY_POMODORO_GOAL {
        unlocked.insert(Achievement::FivePomodorosInADay);
    }

    if log.iter().any(|r| r.phase() == Phase::LongBreak) {
        unlocked.insert(Achievement::FirstLongBreak);
    }

    if streak >= STREAK_GOAL {
        unlocked.insert(Achievement::SevenDayStreak);
    }

    unlocked
}
