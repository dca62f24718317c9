use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::at_ms;

/// Persisted record of one finished session. Never mutated after creation.
///
/// Serialized in the camelCase shape the history list has always used:
/// `{ id, startTime, endTime, duration, tags }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    /// Epoch milliseconds.
    pub start_time: i64,
    /// Epoch milliseconds.
    pub end_time: i64,
    /// Seconds tracked.
    pub duration: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TimeEntry {
    pub fn started_at(&self) -> DateTime<Utc> {
        at_ms(self.start_time)
    }

    pub fn ended_at(&self) -> DateTime<Utc> {
        at_ms(self.end_time)
    }

    /// Checks `end >= start` and that `duration` matches the span to the second.
    pub fn is_consistent(&self) -> bool {
        let Some(span_ms) = self.end_time.checked_sub(self.start_time) else {
            return false;
        };
        span_ms >= 0 && i64::try_from(self.duration) == Ok(span_ms.saturating_add(500) / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_camel_case() {
        let entry = TimeEntry {
            id: "abc".into(),
            start_time: 1_000,
            end_time: 11_000,
            duration: 10,
            tags: vec!["focus".into()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["startTime"], 1_000);
        assert_eq!(json["endTime"], 11_000);
        assert_eq!(json["duration"], 10);
        assert_eq!(json["tags"][0], "focus");
    }

    #[test]
    fn legacy_fields_are_ignored() {
        let json = r#"{"id":"1","startTime":0,"endTime":60000,"duration":60,"tags":[],"timerDuration":1500}"#;
        let entry: TimeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.duration, 60);
        assert!(entry.is_consistent());
    }

    #[test]
    fn inconsistent_span_detected() {
        let entry = TimeEntry {
            id: "x".into(),
            start_time: 10_000,
            end_time: 5_000,
            duration: 0,
            tags: vec![],
        };
        assert!(!entry.is_consistent());
    }

    #[test]
    fn extreme_timestamps_are_inconsistent_not_a_panic() {
        let mut entry = TimeEntry {
            id: "x".into(),
            start_time: i64::MIN,
            end_time: i64::MAX,
            duration: 0,
            tags: vec![],
        };
        assert!(!entry.is_consistent());

        entry.start_time = 0;
        entry.duration = u64::MAX;
        assert!(!entry.is_consistent());

        entry.start_time = -1;
        assert!(!entry.is_consistent());
    }
}
