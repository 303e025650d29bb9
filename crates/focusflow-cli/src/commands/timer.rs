use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use focusflow_core::timer::DEFAULT_QUOTES;
use focusflow_core::{
    ConfigStore, Database, Event, ManualScheduler, QuotePicker, SettingsStore, TimerEngine,
    SubscriptionHandle, TimerHandle, TimerService, TokioScheduler,
};
use tracing::warn;

use super::CmdResult;

const SETTINGS_POLL: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a live timer, printing every event as a JSON line. Ctrl-C pauses and exits.
    Run {
        /// Seed for quote selection (overrides `quote_seed` in config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the state a fresh timer would start in
    Status,
}

pub fn run(action: TimerAction) -> CmdResult {
    match action {
        TimerAction::Run { seed } => run_live(seed),
        TimerAction::Status => {
            let settings = Arc::new(ConfigStore::open_default()?);
            let engine = TimerEngine::new(
                settings,
                Box::new(Database::open_default()?),
                Box::new(ManualScheduler::new()),
                Arc::new(|_: SubscriptionHandle| {}),
            );
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "event not printable"),
    }
}

fn run_live(seed: Option<u64>) -> CmdResult {
    let settings = Arc::new(ConfigStore::open_default()?);
    let sessions = Database::open_default()?;
    let seed = seed.or(settings.config().quote_seed);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (handle, commands) = TimerHandle::channel();
        settings.subscribe(handle.settings_listener());
        // Picks up `config set` run from another shell.
        let watch = settings.clone().spawn_watch(SETTINGS_POLL);

        let mut engine = TimerEngine::new(
            settings,
            Box::new(sessions),
            Box::new(TokioScheduler::new(tokio::runtime::Handle::current())),
            handle.tick_sink(),
        )
        .with_quotes(QuotePicker::new(DEFAULT_QUOTES, seed));
        engine.subscribe(Box::new(print_event));

        let task = TimerService::new(engine, commands).spawn();
        handle.start();

        tokio::signal::ctrl_c().await?;
        watch.abort();
        handle.shutdown();
        let engine = task.await?;
        println!("{}", serde_json::to_string(&engine.snapshot())?);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
