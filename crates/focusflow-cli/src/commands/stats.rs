use chrono::Local;
use clap::Subcommand;
use focusflow_core::stats::{
    aggregate, compute_achievements, compute_streak, daily_counts, today_window, week_window,
};
use focusflow_core::{Database, Phase, SessionStore, StatsSnapshot};

use super::CmdResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Work sessions completed today
    Today,
    /// Work sessions over the last seven days
    Week,
    /// Consecutive days with at least one Work session
    Streak,
    /// Currently unlocked achievements
    Achievements,
    /// Work sessions per day, oldest first
    Days {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Everything above in one snapshot
    All,
}

pub fn run(action: StatsAction) -> CmdResult {
    let log = Database::open_default()?.load_all()?;
    let now = Local::now();

    let json = match action {
        StatsAction::Today => {
            serde_json::to_string_pretty(&aggregate(&log, &today_window(&now), Some(Phase::Work)))?
        }
        StatsAction::Week => {
            serde_json::to_string_pretty(&aggregate(&log, &week_window(&now), Some(Phase::Work)))?
        }
        StatsAction::Streak => {
            serde_json::to_string_pretty(&serde_json::json!({
                "streak": compute_streak(&log, &now),
            }))?
        }
        StatsAction::Achievements => {
            let streak = compute_streak(&log, &now);
            serde_json::to_string_pretty(&compute_achievements(&log, streak, &now))?
        }
        StatsAction::Days { days } => serde_json::to_string_pretty(&daily_counts(&log, &now, days))?,
        StatsAction::All => serde_json::to_string_pretty(&StatsSnapshot::compute(&log, &now))?,
    };
    println!("{json}");
    Ok(())
}
