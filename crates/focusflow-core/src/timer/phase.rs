use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
    /// Timer stopped mid-cycle. Forgets which phase was interrupted.
    Paused,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Work,
        Phase::ShortBreak,
        Phase::LongBreak,
        Phase::Paused,
    ];

    /// Built-in duration in seconds. `Paused` has none of its own.
    pub fn default_duration_secs(self) -> Option<u32> {
        match self {
            Phase::Work => Some(25 * 60),
            Phase::ShortBreak => Some(5 * 60),
            Phase::LongBreak => Some(15 * 60),
            Phase::Paused => None,
        }
    }

    /// Display color token.
    pub fn color(self) -> &'static str {
        match self {
            Phase::Work => "mint",
            Phase::ShortBreak => "blue",
            Phase::LongBreak => "purple",
            Phase::Paused => "gray",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
            Phase::Paused => "Paused",
        }
    }

    /// Stable tag used by the session store.
    pub fn as_tag(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
            Phase::Paused => "paused",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_tag() == s)
            .ok_or_else(|| ValidationError::InvalidRecord(format!("unknown phase tag '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_has_no_default_duration() {
        assert_eq!(Phase::Work.default_duration_secs(), Some(1500));
        assert_eq!(Phase::ShortBreak.default_duration_secs(), Some(300));
        assert_eq!(Phase::LongBreak.default_duration_secs(), Some(900));
        assert_eq!(Phase::Paused.default_duration_secs(), None);
    }

    #[test]
    fn tags_parse_back() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_tag().parse::<Phase>().unwrap(), phase);
        }
        assert!("focus".parse::<Phase>().is_err());
    }

    #[test]
    fn serde_uses_stable_tags() {
        let json = serde_json::to_string(&Phase::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");
    }
}
