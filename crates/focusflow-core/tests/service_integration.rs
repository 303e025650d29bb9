//! Integration tests for the timer service actor.
//!
//! Ticks, commands and settings notifications all flow through one queue;
//! these tests drive it with both the manual and the tokio scheduler.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use focusflow_core::{
    ConfigStore, FixedClock, ManualScheduler, MemorySessionStore, MemorySettingsStore, Phase,
    QuotePicker, SettingKey, Settings, SettingsStore, TimerEngine, TimerHandle, TimerService,
    TokioScheduler,
};
use tempfile::TempDir;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        DateTime::parse_from_rfc3339("2026-03-10T10:00:00+01:00").unwrap(),
    ))
}

#[tokio::test]
async fn test_manual_ticks_flow_through_the_queue() {
    let (handle, commands) = TimerHandle::channel();
    let scheduler = ManualScheduler::new();
    let engine = TimerEngine::new(
        Arc::new(MemorySettingsStore::default()),
        Box::new(MemorySessionStore::new()),
        Box::new(scheduler.clone()),
        handle.tick_sink(),
    )
    .with_clock(clock());
    let task = TimerService::new(engine, commands).spawn();

    assert!(handle.start());
    // The snapshot reply proves Start has been applied.
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.state.running);
    assert_eq!(scheduler.active().len(), 1);

    for _ in 0..3 {
        assert_eq!(scheduler.fire(), 1);
    }
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state.remaining_secs, 1497);
    assert_eq!(snap.state.phase, Phase::Work);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn test_tick_queued_by_cancelled_subscription_is_dropped() {
    let (handle, commands) = TimerHandle::channel();
    let scheduler = ManualScheduler::new();
    let engine = TimerEngine::new(
        Arc::new(MemorySettingsStore::default()),
        Box::new(MemorySessionStore::new()),
        Box::new(scheduler.clone()),
        handle.tick_sink(),
    );
    let task = TimerService::new(engine, commands).spawn();

    handle.start();
    handle.snapshot().await.unwrap();

    // Queued behind Pause/Start, so it arrives after its subscription died.
    handle.pause();
    handle.start();
    assert_eq!(scheduler.fire(), 1);

    let snap = handle.snapshot().await.unwrap();
    assert!(snap.state.running);
    assert_eq!(snap.state.remaining_secs, 1500);

    scheduler.fire();
    assert_eq!(handle.snapshot().await.unwrap().state.remaining_secs, 1499);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn test_settings_change_resyncs_stopped_timer() {
    let (handle, commands) = TimerHandle::channel();
    let settings = Arc::new(MemorySettingsStore::default());
    settings.subscribe(handle.settings_listener());

    let engine = TimerEngine::new(
        settings.clone(),
        Box::new(MemorySessionStore::new()),
        Box::new(ManualScheduler::new()),
        handle.tick_sink(),
    );
    let task = TimerService::new(engine, commands).spawn();

    settings.set(SettingKey::WorkMinutes, 30).unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state.remaining_secs, 1800);
    assert_eq!(snap.total_secs, 1800);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_config_edit_from_another_process_resyncs_stopped_timer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let (handle, commands) = TimerHandle::channel();
    let settings = Arc::new(ConfigStore::open(&path).unwrap());
    settings.subscribe(handle.settings_listener());
    let watch = settings.clone().spawn_watch(Duration::from_secs(1));

    let engine = TimerEngine::new(
        settings,
        Box::new(MemorySessionStore::new()),
        Box::new(ManualScheduler::new()),
        handle.tick_sink(),
    );
    let task = TimerService::new(engine, commands).spawn();

    // A second store on the same file stands in for `config set` elsewhere.
    ConfigStore::open(&path)
        .unwrap()
        .set(SettingKey::WorkMinutes, 30)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state.remaining_secs, 1800);

    watch.abort();
    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_hands_back_a_paused_engine() {
    let (handle, commands) = TimerHandle::channel();
    let scheduler = ManualScheduler::new();
    let engine = TimerEngine::new(
        Arc::new(MemorySettingsStore::default()),
        Box::new(MemorySessionStore::new()),
        Box::new(scheduler.clone()),
        handle.tick_sink(),
    );
    let task = TimerService::new(engine, commands).spawn();

    handle.start();
    handle.shutdown();
    let engine = task.await.unwrap();

    assert!(!engine.is_running());
    assert_eq!(engine.phase(), Phase::Paused);
    assert!(scheduler.active().is_empty());

    // The service is gone; further commands are refused.
    assert!(!handle.start());
    assert!(handle.snapshot().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_full_work_phase_on_tokio_scheduler() {
    let (handle, commands) = TimerHandle::channel();
    let settings = Arc::new(MemorySettingsStore::new(Settings::new(1, 1, 1, 4).unwrap()));
    let engine = TimerEngine::new(
        settings,
        Box::new(MemorySessionStore::new()),
        Box::new(TokioScheduler::new(tokio::runtime::Handle::current())),
        handle.tick_sink(),
    )
    .with_clock(clock())
    .with_quotes(QuotePicker::seeded(7));
    let task = TimerService::new(engine, commands).spawn();

    handle.start();
    // 60 ticks count down, the 61st rolls over into the break.
    tokio::time::sleep(Duration::from_millis(61_500)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.state.phase, Phase::ShortBreak);
    assert_eq!(snap.state.remaining_secs, 60);
    assert_eq!(snap.state.completed_pomodoros, 1);
    assert!(snap.state.running);

    let stats = handle.stats().await.unwrap();
    assert_eq!(stats.today.count, 1);
    assert_eq!(stats.today.total_secs, 60);
    assert_eq!(stats.streak, 1);

    handle.shutdown();
    let engine = task.await.unwrap();
    assert_eq!(engine.sessions().len(), 1);
    assert_eq!(engine.unsynced(), 0);
}
