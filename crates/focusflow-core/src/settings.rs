//! Timer settings and their validation.
//!
//! Every value is range-checked here, so the engine can assume durations are
//! positive and `pomodoros_until_long_break >= 2`.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::timer::Phase;

/// Recognized setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    WorkMinutes,
    ShortBreakMinutes,
    LongBreakMinutes,
    PomodorosUntilLongBreak,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::WorkMinutes,
        SettingKey::ShortBreakMinutes,
        SettingKey::LongBreakMinutes,
        SettingKey::PomodorosUntilLongBreak,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::WorkMinutes => "workMinutes",
            SettingKey::ShortBreakMinutes => "shortBreakMinutes",
            SettingKey::LongBreakMinutes => "longBreakMinutes",
            SettingKey::PomodorosUntilLongBreak => "pomodorosUntilLongBreak",
        }
    }

    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            SettingKey::WorkMinutes => 1..=60,
            SettingKey::ShortBreakMinutes => 1..=30,
            SettingKey::LongBreakMinutes => 1..=60,
            SettingKey::PomodorosUntilLongBreak => 2..=8,
        }
    }

    pub fn default_value(self) -> u32 {
        match self {
            SettingKey::WorkMinutes => default_work_minutes(),
            SettingKey::ShortBreakMinutes => default_short_break_minutes(),
            SettingKey::LongBreakMinutes => default_long_break_minutes(),
            SettingKey::PomodorosUntilLongBreak => default_pomodoros_until_long_break(),
        }
    }

    /// Refuse `value` unless it lies in this key's range.
    pub fn validate(self, value: u32) -> Result<u32, ValidationError> {
        let range = self.range();
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::InvalidSetting {
                key: self.as_str().to_string(),
                value,
                min: *range.start(),
                max: *range.end(),
            })
        }
    }

    pub fn clamp(self, value: u32) -> u32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSetting(s.to_string()))
    }
}

/// Durations (minutes) and the long-break cadence.
///
/// Deserialized values are clamped into range, so no `Settings` ever holds
/// an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSettings")]
pub struct Settings {
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    pomodoros_until_long_break: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    #[serde(default = "default_work_minutes")]
    work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    long_break_minutes: u32,
    #[serde(default = "default_pomodoros_until_long_break")]
    pomodoros_until_long_break: u32,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let mut settings = Self {
            work_minutes: raw.work_minutes,
            short_break_minutes: raw.short_break_minutes,
            long_break_minutes: raw.long_break_minutes,
            pomodoros_until_long_break: raw.pomodoros_until_long_break,
        };
        for key in settings.clamp_in_place() {
            warn!(key = %key, value = settings.get(key), "setting out of range, clamped");
        }
        settings
    }
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_pomodoros_until_long_break() -> u32 {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            pomodoros_until_long_break: default_pomodoros_until_long_break(),
        }
    }
}

impl Settings {
    /// Build settings, refusing any out-of-range value.
    pub fn new(
        work_minutes: u32,
        short_break_minutes: u32,
        long_break_minutes: u32,
        pomodoros_until_long_break: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            work_minutes: SettingKey::WorkMinutes.validate(work_minutes)?,
            short_break_minutes: SettingKey::ShortBreakMinutes.validate(short_break_minutes)?,
            long_break_minutes: SettingKey::LongBreakMinutes.validate(long_break_minutes)?,
            pomodoros_until_long_break: SettingKey::PomodorosUntilLongBreak
                .validate(pomodoros_until_long_break)?,
        })
    }

    pub fn get(&self, key: SettingKey) -> u32 {
        match key {
            SettingKey::WorkMinutes => self.work_minutes,
            SettingKey::ShortBreakMinutes => self.short_break_minutes,
            SettingKey::LongBreakMinutes => self.long_break_minutes,
            SettingKey::PomodorosUntilLongBreak => self.pomodoros_until_long_break,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: u32) -> Result<(), ValidationError> {
        let value = key.validate(value)?;
        match key {
            SettingKey::WorkMinutes => self.work_minutes = value,
            SettingKey::ShortBreakMinutes => self.short_break_minutes = value,
            SettingKey::LongBreakMinutes => self.long_break_minutes = value,
            SettingKey::PomodorosUntilLongBreak => self.pomodoros_until_long_break = value,
        }
        Ok(())
    }

    /// Pull every value into range. Returns the keys that had to change.
    fn clamp_in_place(&mut self) -> Vec<SettingKey> {
        let mut clamped = Vec::new();
        for key in SettingKey::ALL {
            let value = self.get(key);
            let fixed = key.clamp(value);
            if fixed != value {
                clamped.push(key);
                // In range by construction.
                let _ = self.set(key, fixed);
            }
        }
        clamped
    }

    pub fn pomodoros_until_long_break(&self) -> u32 {
        self.pomodoros_until_long_break
    }

    /// Configured length of `phase` in seconds. `Paused` maps to work.
    pub fn duration_secs(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Work | Phase::Paused => self.work_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        };
        minutes.saturating_mul(60)
    }
}
