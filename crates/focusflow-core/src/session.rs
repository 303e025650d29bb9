//! Completed-interval records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::timer::Phase;

/// One completed Work or break interval. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionRecord")]
pub struct SessionRecord {
    id: Uuid,
    completed_at: DateTime<Utc>,
    duration_secs: u32,
    phase: Phase,
}

#[derive(Deserialize)]
struct RawSessionRecord {
    id: Uuid,
    completed_at: DateTime<Utc>,
    duration_secs: u32,
    phase: Phase,
}

impl TryFrom<RawSessionRecord> for SessionRecord {
    type Error = ValidationError;

    fn try_from(raw: RawSessionRecord) -> Result<Self, Self::Error> {
        Self::restore(raw.id, raw.completed_at, raw.duration_secs, raw.phase)
    }
}

impl SessionRecord {
    /// Record a fresh completion with a new id.
    pub fn new(
        phase: Phase,
        duration_secs: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Self::restore(Uuid::new_v4(), completed_at, duration_secs, phase)
    }

    /// Rebuild a persisted record, re-checking its invariants.
    pub fn restore(
        id: Uuid,
        completed_at: DateTime<Utc>,
        duration_secs: u32,
        phase: Phase,
    ) -> Result<Self, ValidationError> {
        if phase == Phase::Paused {
            return Err(ValidationError::InvalidRecord(
                "a paused interval cannot be recorded".into(),
            ));
        }
        if duration_secs == 0 {
            return Err(ValidationError::InvalidRecord(
                "duration must be positive".into(),
            ));
        }
        Ok(Self {
            id,
            completed_at,
            duration_secs,
            phase,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_work(&self) -> bool {
        self.phase == Phase::Work
    }
}
