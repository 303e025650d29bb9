use focusflow_core::stats::history;
use focusflow_core::{Database, SessionStore};

use super::CmdResult;

pub fn run(limit: usize) -> CmdResult {
    let log = Database::open_default()?.load_all()?;
    let recent: Vec<_> = history(&log).into_iter().take(limit).collect();
    println!("{}", serde_json::to_string_pretty(&recent)?);
    Ok(())
}
