//! Property tests for the timer engine and tag collection.

use proptest::prelude::*;
use tagtimer_core::{TagSet, TimerEngine, TimerStatus};

const T0: i64 = 1_700_000_000_000;

proptest! {
    #[test]
    fn remaining_never_increases_while_running(
        minutes in 1u32..=240,
        offsets in proptest::collection::vec(0i64..20_000_000, 1..50),
    ) {
        let mut offsets = offsets;
        let mut engine = TimerEngine::new(minutes);
        engine.start(T0);
        offsets.sort_unstable();

        let mut last = engine.remaining_secs(T0);
        for offset in offsets {
            let now = T0 + offset;
            let remaining = engine.remaining_secs(now);
            prop_assert_eq!(remaining, engine.remaining_secs(now));
            prop_assert!(remaining <= last);
            last = remaining;
        }
    }

    #[test]
    fn pause_resume_at_same_instant_is_identity(
        minutes in 1u32..=240,
        offset in 0i64..14_400_000,
    ) {
        let mut engine = TimerEngine::new(minutes);
        engine.start(T0);
        let now = T0 + offset;
        let before = engine.remaining_secs(now);
        engine.pause(now);
        engine.resume(now);
        prop_assert_eq!(engine.remaining_secs(now), before);
    }

    #[test]
    fn finish_early_never_reports_more_than_configured(
        minutes in 1u32..=240,
        offset in 0i64..20_000_000,
    ) {
        let mut engine = TimerEngine::new(minutes);
        engine.start(T0);
        let event = engine.finish_early(T0 + offset);
        prop_assert_eq!(engine.status(), TimerStatus::Idle);
        prop_assert_eq!(engine.remaining_secs(T0 + offset), u64::from(minutes) * 60);
        if let Some(elapsed) = event.and_then(|e| e.finished_elapsed()) {
            prop_assert!(elapsed > 0);
            prop_assert!(elapsed <= u64::from(minutes) * 60);
        }
    }

    #[test]
    fn tags_are_distinct_trimmed_and_ordered(raw in proptest::collection::vec("[ a-c]{0,3}", 0..20)) {
        let tags: TagSet = raw.iter().collect();
        let slice = tags.as_slice();
        for (i, tag) in slice.iter().enumerate() {
            prop_assert!(!tag.is_empty());
            prop_assert_eq!(tag.trim(), tag.as_str());
            prop_assert!(!slice[i + 1..].contains(tag));
        }
        let mut expected: Vec<String> = Vec::new();
        for r in &raw {
            let t = r.trim();
            if !t.is_empty() && !expected.iter().any(|e| e == t) {
                expected.push(t.to_string());
            }
        }
        prop_assert_eq!(slice, expected.as_slice());
    }
}
