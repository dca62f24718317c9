use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::TimeEntry;
use super::tags::TagSet;
use crate::events::Event;

/// A finished run waiting for its tags.
///
/// Only constructible with a positive elapsed time, so a zero-length session
/// cannot reach the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSession {
    completed_at_ms: i64,
    elapsed_secs: u64,
}

impl PendingSession {
    pub fn from_elapsed(completed_at_ms: i64, elapsed_secs: u64) -> Option<Self> {
        (elapsed_secs > 0).then_some(Self {
            completed_at_ms,
            elapsed_secs,
        })
    }

    /// Build from a `TimerCompleted` or `TimerFinishedEarly` event.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::TimerCompleted { elapsed_secs, at }
            | Event::TimerFinishedEarly { elapsed_secs, at } => {
                Self::from_elapsed(at.timestamp_millis(), *elapsed_secs)
            }
            _ => None,
        }
    }

    /// Session start reconstructed as completion minus elapsed.
    pub fn started_at_ms(&self) -> i64 {
        self.completed_at_ms - (self.elapsed_secs as i64) * 1000
    }

    pub fn completed_at_ms(&self) -> i64 {
        self.completed_at_ms
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}

/// Turns pending sessions into entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionRecorder;

impl SessionRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, pending: &PendingSession, tags: TagSet) -> TimeEntry {
        TimeEntry {
            id: Uuid::new_v4().to_string(),
            start_time: pending.started_at_ms(),
            end_time: pending.completed_at_ms,
            duration: pending.elapsed_secs,
            tags: tags.into_vec(),
        }
    }

    /// Record without tags. Same as `record` with an empty [`TagSet`].
    pub fn skip(&self, pending: &PendingSession) -> TimeEntry {
        self.record(pending, TagSet::new())
    }
}
