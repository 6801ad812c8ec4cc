//! Attempt (pull) records
//!
//! An attempt is one pull of an encounter as reported by the log site.
//! Every field deserializes with a default so that partially populated
//! upstream data still yields a usable record: missing events mean
//! "nothing matched", a missing kill flag means "wipe".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of in-combat event recorded for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Cast,
    Death,
    Wipe,
    Kill,
    #[default]
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Map a raw event `type` string from the API.
    pub fn from_api_type(kind: &str) -> Self {
        match kind {
            "cast" => EventKind::Cast,
            "death" => EventKind::Death,
            _ => EventKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptEvent {
    /// Absolute timestamp in epoch milliseconds
    pub timestamp: i64,
    pub ability_id: i64,
    pub kind: EventKind,
}

impl AttemptEvent {
    pub fn cast(timestamp: i64, ability_id: i64) -> Self {
        Self {
            timestamp,
            ability_id,
            kind: EventKind::Cast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attempt {
    /// Report (log upload) this pull belongs to
    pub report_code: String,
    /// Fight id within the report
    pub fight_id: u32,
    pub encounter_id: u32,
    /// Absolute start/end in epoch milliseconds
    pub start_time: i64,
    pub end_time: i64,
    pub ended_in_kill: bool,
    /// Boss HP remaining when the pull ended, as reported upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fight_percentage: Option<f64>,
    pub events: Vec<AttemptEvent>,
}

impl Attempt {
    /// Whether any event carries one of the given ability ids.
    pub fn has_any_ability<F>(&self, mut wanted: F) -> bool
    where
        F: FnMut(i64) -> bool,
    {
        self.events.iter().any(|e| wanted(e.ability_id))
    }

    /// Pull length in seconds (zero when the times are missing or inverted).
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).max(0) as f64 / 1000.0
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_time)
    }

    pub fn cast_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == EventKind::Cast)
            .count()
    }
}

/// Sort attempts oldest first. Ties keep their fetch order.
pub fn sort_chronologically(attempts: &mut [Attempt]) {
    attempts.sort_by_key(|a| a.start_time);
}
