use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::session::TimeEntry;

/// Aggregate line shown above the history list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub count: usize,
    pub total_secs: u64,
}

impl HistorySummary {
    pub fn of(entries: &[TimeEntry]) -> Self {
        Self {
            count: entries.len(),
            total_secs: entries.iter().map(|e| e.duration).sum(),
        }
    }
}

/// Entries ordered for display, most recent start first. Ties keep their
/// insertion order.
pub fn sorted_newest_first(entries: &[TimeEntry]) -> Vec<&TimeEntry> {
    let mut sorted: Vec<&TimeEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| Reverse(e.start_time));
    sorted
}

/// `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
