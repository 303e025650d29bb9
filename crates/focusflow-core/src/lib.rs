//! # FocusFlow Core Library
//!
//! Core logic of the FocusFlow Pomodoro timer: a tick-driven phase state
//! machine and the statistics derived from its session log. Presentation
//! (the CLI, or any GUI) observes events and issues start/pause/reset.
//!
//! ## Architecture
//!
//! - **Timer Engine**: `Work -> Short/Long Break -> Work` state machine. It
//!   never owns a timer; ticks come from an injected [`Scheduler`]
//! - **Stats**: streak, achievements and windowed aggregates as pure
//!   functions of the log
//! - **Storage**: TOML settings ([`ConfigStore`]) and SQLite sessions
//!   ([`Database`]) behind the [`SettingsStore`] / [`SessionStore`] traits
//! - **Service**: [`TimerService`] actor, the single mutation point when
//!   running on tokio
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`StatsEngine`]: cached, observable statistics snapshot
//! - [`Settings`]: validated durations and long-break cadence
//! - [`Event`]: every engine state change

pub mod clock;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, Listener, Observers};
pub use scheduler::{ManualScheduler, Scheduler, SubscriptionHandle, TickSink, TokioScheduler};
pub use service::{Command, TimerHandle, TimerService};
pub use session::SessionRecord;
pub use settings::{SettingKey, Settings};
pub use stats::{Achievement, Aggregate, DailyCount, StatsEngine, StatsSnapshot};
pub use storage::{
    Config, ConfigStore, Database, MemorySessionStore, MemorySettingsStore, SessionStore,
    SettingsStore,
};
pub use timer::{Phase, QuotePicker, TimerEngine, TimerSnapshot, TimerState};
