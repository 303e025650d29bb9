//! TOML-based application configuration.
//!
//! Stores the timer settings (one scalar per key under `[timer]`) and the
//! optional quote seed. Lives at `~/.config/focusflow/config.toml`.
//!
//! ```toml
//! [timer]
//! workMinutes = 25
//! shortBreakMinutes = 5
//! longBreakMinutes = 15
//! pomodorosUntilLongBreak = 4
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{info, warn};

use super::{data_dir, lock, SettingsStore};
use crate::error::{ConfigError, Result};
use crate::events::{Listener, Observers};
use crate::settings::{SettingKey, Settings};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fixed seed for quote selection (reproducible runs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_seed: Option<u64>,
    #[serde(default)]
    pub timer: Settings,
}

impl Config {
    /// Parse TOML. Out-of-range settings are clamped into range.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }
}

/// [`SettingsStore`] persisted to a TOML file.
///
/// The in-memory copy is authoritative. Every `set` rewrites the whole file,
/// so a failed write is retried by the next one. Edits made to the file by
/// another process are picked up by [`ConfigStore::reload_if_changed`], which
/// every read runs first.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
    /// File content as last read or written by this store.
    on_disk: Mutex<Option<String>>,
    observers: Mutex<Observers<SettingKey>>,
}

impl ConfigStore {
    /// Load from `path`, or start from defaults (and write them) if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let (config, on_disk) = match std::fs::read_to_string(&path) {
            Ok(content) => (Config::from_toml(&content)?, Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Config::default(), None),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };

        let fresh = on_disk.is_none();
        let store = Self {
            path,
            config: Mutex::new(config),
            on_disk: Mutex::new(on_disk),
            observers: Mutex::new(Observers::new()),
        };
        if fresh {
            store.save_best_effort();
        }
        Ok(store)
    }

    /// Open `config.toml` in the data directory.
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(data_dir()?.join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> Config {
        self.reload_if_changed();
        lock(&self.config).clone()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = lock(&self.config).to_toml()?;
        std::fs::write(&self.path, &content).map_err(|e| ConfigError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        *lock(&self.on_disk) = Some(content);
        Ok(())
    }

    fn save_best_effort(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "config not persisted; keeping in-memory value");
        }
    }

    /// Re-read the file if another writer changed it, and notify every
    /// timer setting whose value differs. Returns the changed keys.
    ///
    /// A missing, unreadable or malformed file keeps the in-memory values.
    pub fn reload_if_changed(&self) -> Vec<SettingKey> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        {
            let mut on_disk = lock(&self.on_disk);
            if on_disk.as_deref() == Some(content.as_str()) {
                return Vec::new();
            }
            *on_disk = Some(content.clone());
        }

        let loaded = match Config::from_toml(&content) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "config changed on disk but could not be parsed; ignoring");
                return Vec::new();
            }
        };

        let changed: Vec<SettingKey> = {
            let mut config = lock(&self.config);
            let changed = SettingKey::ALL
                .into_iter()
                .filter(|key| config.timer.get(*key) != loaded.timer.get(*key))
                .collect();
            *config = loaded;
            changed
        };
        if !changed.is_empty() {
            info!(keys = ?changed, "settings changed on disk");
            self.notify(&changed);
        }
        changed
    }

    /// Restore defaults, persist, and notify every key.
    pub fn reset(&self) -> Result<(), ConfigError> {
        *lock(&self.config) = Config::default();
        let saved = self.save();
        self.notify(&SettingKey::ALL);
        saved
    }

    /// Poll the file every `every` so edits from other processes reach
    /// subscribers even while nothing reads the store. Must be called from
    /// inside a tokio runtime; abort the handle to stop watching.
    pub fn spawn_watch(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                self.reload_if_changed();
            }
        })
    }

    fn notify(&self, keys: &[SettingKey]) {
        let observers = lock(&self.observers).clone();
        for key in keys {
            observers.notify(key);
        }
    }
}

impl SettingsStore for ConfigStore {
    fn get(&self, key: SettingKey) -> u32 {
        self.reload_if_changed();
        lock(&self.config).timer.get(key)
    }

    fn set(&self, key: SettingKey, value: u32) -> Result<()> {
        // Merge edits made elsewhere before the whole file is rewritten.
        self.reload_if_changed();
        lock(&self.config).timer.set(key, value)?;
        info!(key = %key, value, "setting changed");
        self.save_best_effort();
        self.notify(&[key]);
        Ok(())
    }

    fn settings(&self) -> Settings {
        self.reload_if_changed();
        lock(&self.config).timer
    }

    fn subscribe(&self, listener: Listener<SettingKey>) {
        lock(&self.observers).subscribe(listener);
    }
}
