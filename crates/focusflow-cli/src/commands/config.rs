use clap::Subcommand;
use focusflow_core::{ConfigStore, SettingKey, SettingsStore};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting (e.g. "workMinutes", "pomodorosUntilLongBreak")
    Get {
        key: String,
    },
    /// Set a setting; out-of-range values are refused
    Set {
        key: String,
        value: u32,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    let store = ConfigStore::open_default()?;
    match action {
        ConfigAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            println!("{}", store.get(key));
        }
        ConfigAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            store.set(key, value)?;
            println!("ok");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.config())?);
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
