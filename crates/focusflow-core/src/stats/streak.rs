//! Consecutive-day streak of completed Work sessions.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::session::SessionRecord;

/// Local calendar day of each Work record, deduplicated.
pub(crate) fn work_days<Tz: TimeZone>(log: &[SessionRecord], tz: &Tz) -> BTreeSet<NaiveDate> {
    log.iter()
        .filter(|r| r.is_work())
        .map(|r| r.completed_at().with_timezone(tz).date_naive())
        .collect()
}

/// Count of consecutive local days, ending today or yesterday, with at least
/// one Work session.
///
/// Walks backward from today; each accepted day must be within one day of
/// the previously accepted one. Days after today are ignored.
pub fn compute_streak<Tz: TimeZone>(log: &[SessionRecord], now: &DateTime<Tz>) -> u32 {
    let today = now.date_naive();
    let mut cursor = today;
    let mut streak = 0;

    for day in work_days(log, &now.timezone()).into_iter().rev() {
        if day > today {
            continue;
        }
        if cursor.signed_duration_since(day).num_days() > 1 {
            break;
        }
        streak += 1;
        cursor = day;
    }
    streak
}
