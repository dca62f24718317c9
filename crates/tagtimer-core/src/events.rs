use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerStatus;

/// Every state change in the system produces an Event.
/// Hosts react to `TimerCompleted` and `TimerFinishedEarly` by collecting tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_secs: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero; the full configured length was tracked.
    TimerCompleted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user stopped the run early; always carries a positive value.
    TimerFinishedEarly {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    DurationChanged {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    EntryRecorded {
        id: String,
        duration_secs: u64,
        tags: Vec<String>,
        at: DateTime<Utc>,
    },
    EntryDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerStatus,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Elapsed seconds carried by a terminal event, if this is one.
    pub fn finished_elapsed(&self) -> Option<u64> {
        match self {
            Event::TimerCompleted { elapsed_secs, .. }
            | Event::TimerFinishedEarly { elapsed_secs, .. } => Some(*elapsed_secs),
            _ => None,
        }
    }
}

/// Converts epoch milliseconds into the timestamp type events carry.
pub(crate) fn at_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
