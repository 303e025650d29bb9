//! Persistence collaborators.
//!
//! - [`SettingsStore`]: durable key-value settings with change notification
//! - [`SessionStore`]: append-only session log
//!
//! Production implementations are [`ConfigStore`] (TOML) and [`Database`]
//! (SQLite). The in-memory variants back tests and ephemeral runs.

mod config;
pub mod database;

pub use config::{Config, ConfigStore};
pub use database::Database;

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ConfigError, Result, StorageError};
use crate::events::{Listener, Observers};
use crate::session::SessionRecord;
use crate::settings::{SettingKey, Settings};

pub trait SettingsStore: Send + Sync {
    fn get(&self, key: SettingKey) -> u32;

    /// Refuses out-of-range values. Write failures are logged and retried on
    /// the next successful write; they never fail the call.
    fn set(&self, key: SettingKey, value: u32) -> Result<()>;

    fn settings(&self) -> Settings;

    /// Called with the changed key after every successful `set`.
    fn subscribe(&self, listener: Listener<SettingKey>);
}

pub trait SessionStore: Send {
    fn append(&mut self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Every appended record, in insertion order.
    fn load_all(&self) -> Result<Vec<SessionRecord>, StorageError>;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the data directory.
///
/// `FOCUSFLOW_DATA_DIR` wins outright. Otherwise `~/.config/focusflow[-dev]/`
/// based on `FOCUSFLOW_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns [`ConfigError::NoDataDir`] if there is no home directory and no
/// override, or an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSFLOW_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Settings held only in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
    observers: Mutex<Observers<SettingKey>>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            observers: Mutex::new(Observers::new()),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: SettingKey) -> u32 {
        lock(&self.settings).get(key)
    }

    fn set(&self, key: SettingKey, value: u32) -> Result<()> {
        lock(&self.settings).set(key, value)?;
        let observers = lock(&self.observers).clone();
        observers.notify(&key);
        Ok(())
    }

    fn settings(&self) -> Settings {
        *lock(&self.settings)
    }

    fn subscribe(&self, listener: Listener<SettingKey>) {
        lock(&self.observers).subscribe(listener);
    }
}

/// Session log held only in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    records: Vec<SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self { records }
    }
}

impl SessionStore for MemorySessionStore {
    fn append(&mut self, record: &SessionRecord) -> Result<(), StorageError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SessionRecord>, StorageError> {
        Ok(self.records.clone())
    }
}
