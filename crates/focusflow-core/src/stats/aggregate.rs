//! Windowed totals and per-day counts for the stats screens.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;
use crate::timer::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    pub count: u32,
    pub total_secs: u64,
}

impl Aggregate {
    pub fn focused_minutes(&self) -> u64 {
        self.total_secs / 60
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Count and summed duration of records completed inside `window`
/// (half-open) whose phase matches `phase`, if given.
pub fn aggregate(
    log: &[SessionRecord],
    window: &Range<DateTime<Utc>>,
    phase: Option<Phase>,
) -> Aggregate {
    log.iter()
        .filter(|r| window.contains(&r.completed_at()))
        .filter(|r| phase.map_or(true, |p| r.phase() == p))
        .fold(Aggregate::default(), |mut acc, r| {
            acc.count += 1;
            acc.total_secs += u64::from(r.duration_secs());
            acc
        })
}

/// Local midnight of `date` as a UTC instant.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight skipped by a DST jump; UTC midnight is close enough.
        .unwrap_or_else(|| midnight.and_utc())
}

pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    local_midnight(now.date_naive(), &now.timezone())
}

fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tomorrow = now.date_naive().succ_opt().unwrap_or(NaiveDate::MAX);
    local_midnight(tomorrow, &now.timezone())
}

/// Local midnight today up to local midnight tomorrow.
pub fn today_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Range<DateTime<Utc>> {
    start_of_day(now)..end_of_day(now)
}

/// Six days before `now` up to the end of today.
pub fn week_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Range<DateTime<Utc>> {
    (now.with_timezone(&Utc) - Duration::days(6))..end_of_day(now)
}

/// Work records per local day, ascending by day.
pub fn group_by_day<Tz: TimeZone>(log: &[SessionRecord], tz: &Tz) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in log.iter().filter(|r| r.is_work()) {
        *days
            .entry(record.completed_at().with_timezone(tz).date_naive())
            .or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// The last `days` local days ending today, oldest first, zero-filled.
pub fn daily_counts<Tz: TimeZone>(
    log: &[SessionRecord],
    now: &DateTime<Tz>,
    days: u32,
) -> Vec<DailyCount> {
    let grouped: BTreeMap<NaiveDate, u32> = group_by_day(log, &now.timezone())
        .into_iter()
        .map(|d| (d.date, d.count))
        .collect();
    let today = now.date_naive();

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
        .map(|date| DailyCount {
            date,
            count: grouped.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Records newest first.
pub fn history(log: &[SessionRecord]) -> Vec<&SessionRecord> {
    let mut records: Vec<_> = log.iter().collect();
    records.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-10T09:00:00+03:00").unwrap()
    }

    fn record(phase: Phase, secs: u32, at: &str) -> SessionRecord {
        let at = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
        SessionRecord::new(phase, secs, at).unwrap()
    }

    #[test]
    fn today_window_is_local_midnight_to_midnight() {
        let window = today_window(&now());
        assert_eq!(window.start.to_rfc3339(), "2026-03-09T21:00:00+00:00");
        assert_eq!(window.end.to_rfc3339(), "2026-03-10T21:00:00+00:00");
    }

    #[test]
    fn week_window_starts_six_days_before_now() {
        let window = week_window(&now());
        assert_eq!(window.start.to_rfc3339(), "2026-03-04T06:00:00+00:00");
    }

    #[test]
    fn aggregate_filters_window_and_phase() {
        let log = vec![
            record(Phase::Work, 1500, "2026-03-10T08:00:00+03:00"),
            record(Phase::Work, 1200, "2026-03-10T00:10:00+03:00"),
            record(Phase::ShortBreak, 300, "2026-03-10T08:30:00+03:00"),
            // Yesterday local time.
            record(Phase::Work, 1500, "2026-03-09T23:50:00+03:00"),
        ];
        let today = aggregate(&log, &today_window(&now()), Some(Phase::Work));
        assert_eq!(today, Aggregate { count: 2, total_secs: 2700 });
        assert_eq!(today.focused_minutes(), 45);

        let everything = aggregate(&log, &today_window(&now()), None);
        assert_eq!(everything.count, 3);

        let week = aggregate(&log, &week_window(&now()), Some(Phase::Work));
        assert_eq!(week.count, 3);
    }

    #[test]
    fn group_by_day_is_ascending_and_work_only() {
        let log = vec![
            record(Phase::Work, 1500, "2026-03-10T08:00:00+03:00"),
            record(Phase::Work, 1500, "2026-03-08T08:00:00+03:00"),
            record(Phase::Work, 1500, "2026-03-10T10:00:00+03:00"),
            record(Phase::LongBreak, 900, "2026-03-09T10:00:00+03:00"),
        ];
        let days = group_by_day(&log, &now().timezone());
        let got: Vec<_> = days.iter().map(|d| (d.date.to_string(), d.count)).collect();
        assert_eq!(
            got,
            vec![("2026-03-08".to_string(), 1), ("2026-03-10".to_string(), 2)]
        );
    }

    #[test]
    fn daily_counts_fill_missing_days() {
        let log = vec![
            record(Phase::Work, 1500, "2026-03-10T08:00:00+03:00"),
            record(Phase::Work, 1500, "2026-03-08T08:00:00+03:00"),
            record(Phase::Work, 1500, "2026-02-01T08:00:00+03:00"),
        ];
        let counts: Vec<_> = daily_counts(&log, &now(), 3)
            .into_iter()
            .map(|d| d.count)
            .collect();
        assert_eq!(counts, vec![1, 0, 1]);
        assert_eq!(daily_counts(&log, &now(), 7).len(), 7);
    }

    #[test]
    fn history_is_newest_first() {
        let old = record(Phase::Work, 1500, "2026-03-01T08:00:00+03:00");
        let new = record(Phase::ShortBreak, 300, "2026-03-10T08:00:00+03:00");
        let log = vec![old.clone(), new.clone()];
        assert_eq!(history(&log), vec![&new, &old]);
    }
}
