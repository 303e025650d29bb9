//! Integration tests for statistics over a persisted session log.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use focusflow_core::stats::{compute_streak, daily_counts, history};
use focusflow_core::{
    Achievement, Database, Phase, SessionRecord, SessionStore, StatsSnapshot,
};

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-03-10T12:00:00+00:00").unwrap()
}

fn work_days_ago(days: i64) -> SessionRecord {
    let at = now().with_timezone(&Utc) - Duration::days(days);
    SessionRecord::new(Phase::Work, 1500, at).unwrap()
}

#[test]
fn test_streak_counts_consecutive_days_only() {
    let mut log: Vec<_> = [0, 1, 2].into_iter().map(work_days_ago).collect();
    assert_eq!(compute_streak(&log, &now()), 3);

    log.push(work_days_ago(4));
    assert_eq!(compute_streak(&log, &now()), 3);

    // A streak ending yesterday is still alive; one ending earlier is not.
    let yesterday: Vec<_> = [1, 2].into_iter().map(work_days_ago).collect();
    assert_eq!(compute_streak(&yesterday, &now()), 2);
    let lapsed: Vec<_> = [2, 3].into_iter().map(work_days_ago).collect();
    assert_eq!(compute_streak(&lapsed, &now()), 0);
}

#[test]
fn test_five_work_sessions_unlock_daily_achievement() {
    let mut log: Vec<_> = (0..4).map(|_| work_days_ago(0)).collect();
    let snapshot = StatsSnapshot::compute(&log, &now());
    assert!(!snapshot.achievements.contains(&Achievement::FivePomodorosInADay));

    log.push(work_days_ago(0));
    let snapshot = StatsSnapshot::compute(&log, &now());
    assert!(snapshot.achievements.contains(&Achievement::FivePomodorosInADay));
    assert_eq!(snapshot.today.count, 5);
    assert_eq!(snapshot.today.focused_minutes(), 125);
}

#[test]
fn test_database_log_feeds_stats() {
    let mut db = Database::open_memory().unwrap();
    for days in [0, 0, 1, 3, 8] {
        db.append(&work_days_ago(days)).unwrap();
    }
    let long_break = SessionRecord::new(
        Phase::LongBreak,
        900,
        now().with_timezone(&Utc) - Duration::hours(1),
    )
    .unwrap();
    db.append(&long_break).unwrap();

    let log = db.load_all().unwrap();
    let snapshot = StatsSnapshot::compute(&log, &now());

    assert_eq!(snapshot.streak, 2);
    assert_eq!(snapshot.today.count, 2);
    // Week window is today plus the six days before it.
    assert_eq!(snapshot.week.count, 4);
    assert!(snapshot.achievements.contains(&Achievement::FirstLongBreak));

    let days = daily_counts(&log, &now(), 4);
    let counts: Vec<u32> = days.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![1, 0, 1, 2]);

    let newest = history(&log);
    assert_eq!(newest.len(), 6);
    assert_eq!(newest.last().unwrap().completed_at(), log[4].completed_at());
    assert!(newest
        .windows(2)
        .all(|w| w[0].completed_at() >= w[1].completed_at()));
}
