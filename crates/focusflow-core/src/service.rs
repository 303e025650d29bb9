//! Single mutation point for a [`TimerEngine`] on a tokio runtime.
//!
//! Ticks, user commands and settings notifications all arrive as
//! [`Command`]s on one queue and are applied in order by one task, so no two
//! commands can interleave a phase transition.
//!
//! ```ignore
//! let (handle, commands) = TimerHandle::channel();
//! let engine = TimerEngine::new(settings.clone(), sessions, scheduler, handle.tick_sink());
//! settings.subscribe(handle.settings_listener());
//! let task = TimerService::new(engine, commands).spawn();
//! handle.start();
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::Listener;
use crate::scheduler::{SubscriptionHandle, TickSink};
use crate::settings::SettingKey;
use crate::stats::StatsSnapshot;
use crate::timer::{TimerEngine, TimerSnapshot};

#[derive(Debug)]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// One second elapsed on the given subscription.
    Tick(SubscriptionHandle),
    SettingsChanged,
    Snapshot(oneshot::Sender<TimerSnapshot>),
    Stats(oneshot::Sender<StatsSnapshot>),
    /// Pause if running and hand the engine back.
    Shutdown,
}

pub type CommandReceiver = mpsc::UnboundedReceiver<Command>;

/// Cloneable sender side. Methods return `false` once the service is gone.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TimerHandle {
    pub fn channel() -> (Self, CommandReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }

    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }

    /// Sink to hand the engine: every scheduler tick becomes a queued `Tick`.
    pub fn tick_sink(&self) -> TickSink {
        let tx = self.tx.clone();
        Arc::new(move |source| {
            let _ = tx.send(Command::Tick(source));
        })
    }

    /// Listener for a settings store: every change queues a resync check.
    pub fn settings_listener(&self) -> Listener<SettingKey> {
        let tx = self.tx.clone();
        Box::new(move |_key: &SettingKey| {
            let _ = tx.send(Command::SettingsChanged);
        })
    }

    pub async fn snapshot(&self) -> Option<TimerSnapshot> {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Snapshot(reply)) {
            return None;
        }
        rx.await.ok()
    }

    pub async fn stats(&self) -> Option<StatsSnapshot> {
        let (reply, rx) = oneshot::channel();
        if !self.send(Command::Stats(reply)) {
            return None;
        }
        rx.await.ok()
    }
}

/// Owns the engine and applies queued commands one at a time.
pub struct TimerService {
    engine: TimerEngine,
    commands: CommandReceiver,
}

impl TimerService {
    pub fn new(engine: TimerEngine, commands: CommandReceiver) -> Self {
        Self { engine, commands }
    }

    /// Process commands until `Shutdown` (or every handle is dropped).
    pub async fn run(mut self) -> TimerEngine {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Start => self.engine.start(),
                Command::Pause => self.engine.pause(),
                Command::Reset => self.engine.reset(),
                Command::Tick(source) => self.engine.tick_from(source),
                Command::SettingsChanged => {
                    self.engine.check_for_settings_changes();
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.engine.snapshot());
                }
                Command::Stats(reply) => {
                    let _ = reply.send(self.engine.stats().clone());
                }
                Command::Shutdown => {
                    debug!("timer service shutting down");
                    break;
                }
            }
        }

        if self.engine.is_running() {
            self.engine.pause();
        }
        info!(
            completed = self.engine.state().completed_pomodoros,
            "timer service stopped"
        );
        self.engine
    }

    pub fn spawn(self) -> JoinHandle<TimerEngine> {
        tokio::spawn(self.run())
    }
}
