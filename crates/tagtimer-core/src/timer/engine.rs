//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads and never reads the system clock: every command takes the
//! current instant in epoch milliseconds, and the caller is responsible for
//! calling `tick()` periodically (or arming a [`super::Scheduler`]).
//!
//! Remaining time is derived from an absolute anchor (`anchor_end_ms`) rather
//! than a decrementing counter, so missed ticks, a suspended process or a
//! restart between CLI invocations do not skew it.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Completed -> Idle
//!         Running | Paused --finish_early--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(25);
//! engine.start(clock.now_ms());
//! // In a loop:
//! engine.tick(clock.now_ms()); // Returns Some(Event::TimerCompleted) once
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::{at_ms, Event};

/// Shortest accepted timer length in minutes.
pub const MIN_MINUTES: u32 = 1;
/// Longest accepted timer length in minutes.
pub const MAX_MINUTES: u32 = 240;
/// Length used when nothing else is configured.
pub const DEFAULT_MINUTES: u32 = 25;

/// Run state of the engine. Data that only makes sense in one state lives
/// inside that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running {
        /// Epoch milliseconds at which the run completes.
        anchor_end_ms: i64,
    },
    Paused {
        /// Remaining time captured when the run was paused.
        remaining_secs: u64,
    },
    Completed,
}

/// Field-less view of [`TimerState`] for snapshots and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerState {
    pub fn status(&self) -> TimerStatus {
        match self {
            TimerState::Idle => TimerStatus::Idle,
            TimerState::Running { .. } => TimerStatus::Running,
            TimerState::Paused { .. } => TimerStatus::Paused,
            TimerState::Completed => TimerStatus::Completed,
        }
    }
}

/// Core timer engine.
///
/// Operates on wall-clock instants -- no internal thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    configured_secs: u64,
    state: TimerState,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

impl TimerEngine {
    /// Create an idle engine. `minutes` is clamped into `[MIN_MINUTES, MAX_MINUTES]`.
    pub fn new(minutes: u32) -> Self {
        let minutes = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        Self {
            configured_secs: u64::from(minutes) * 60,
            state: TimerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    pub fn configured_secs(&self) -> u64 {
        self.configured_secs
    }

    pub fn configured_minutes(&self) -> u32 {
        (self.configured_secs / 60) as u32
    }

    /// Remaining whole seconds at `now_ms`, rounded up.
    ///
    /// While running this is a pure function of `(anchor_end_ms, now_ms)`:
    /// repeated reads at the same instant agree, and later instants never
    /// report more time left.
    pub fn remaining_secs(&self, now_ms: i64) -> u64 {
        match self.state {
            TimerState::Idle => self.configured_secs,
            TimerState::Running { anchor_end_ms } => ceil_secs(anchor_end_ms - now_ms),
            TimerState::Paused { remaining_secs } => remaining_secs,
            TimerState::Completed => 0,
        }
    }

    /// Seconds tracked so far in the current run.
    pub fn elapsed_secs(&self, now_ms: i64) -> u64 {
        match self.state {
            TimerState::Idle => 0,
            _ => self
                .configured_secs
                .saturating_sub(self.remaining_secs(now_ms)),
        }
    }

    /// 0.0 .. 1.0 progress within the current run.
    pub fn progress(&self, now_ms: i64) -> f64 {
        if self.configured_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs(now_ms) as f64 / self.configured_secs as f64)
    }

    /// Instant at which a running timer completes.
    pub fn anchor_end_ms(&self) -> Option<i64> {
        match self.state {
            TimerState::Running { anchor_end_ms } => Some(anchor_end_ms),
            _ => None,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: i64) -> Event {
        Event::StateSnapshot {
            state: self.status(),
            remaining_secs: self.remaining_secs(now_ms),
            total_secs: self.configured_secs,
            progress_pct: (self.progress(now_ms) * 100.0).clamp(0.0, 100.0),
            at: at_ms(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run from `Idle`, or continue a paused one.
    pub fn start(&mut self, now_ms: i64) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                if self.configured_secs == 0 {
                    return None;
                }
                let anchor_end_ms = anchor(now_ms, self.configured_secs);
                self.state = TimerState::Running { anchor_end_ms };
                tracing::debug!(duration_secs = self.configured_secs, "timer started");
                Some(Event::TimerStarted {
                    duration_secs: self.configured_secs,
                    ends_at: at_ms(anchor_end_ms),
                    at: at_ms(now_ms),
                })
            }
            TimerState::Paused { .. } => self.resume(now_ms),
            TimerState::Running { .. } | TimerState::Completed => None,
        }
    }

    pub fn pause(&mut self, now_ms: i64) -> Option<Event> {
        match self.state {
            TimerState::Running { anchor_end_ms } => {
                let remaining_secs = ceil_secs(anchor_end_ms - now_ms);
                self.state = TimerState::Paused { remaining_secs };
                tracing::debug!(remaining_secs, "timer paused");
                Some(Event::TimerPaused {
                    remaining_secs,
                    at: at_ms(now_ms),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self, now_ms: i64) -> Option<Event> {
        match self.state {
            TimerState::Paused { remaining_secs } => {
                let anchor_end_ms = anchor(now_ms, remaining_secs);
                self.state = TimerState::Running { anchor_end_ms };
                tracing::debug!(remaining_secs, "timer resumed");
                Some(Event::TimerResumed {
                    remaining_secs,
                    ends_at: at_ms(anchor_end_ms),
                    at: at_ms(now_ms),
                })
            }
            _ => None,
        }
    }

    /// Stop a running or paused run and report what was tracked.
    ///
    /// The engine always returns to `Idle` with the configured length
    /// restored. A run that tracked nothing yields `TimerReset` instead of
    /// `TimerFinishedEarly`, so no zero-length entry can come out of it.
    pub fn finish_early(&mut self, now_ms: i64) -> Option<Event> {
        match self.state {
            TimerState::Running { .. } | TimerState::Paused { .. } => {
                let elapsed_secs = self.elapsed_secs(now_ms);
                self.state = TimerState::Idle;
                if elapsed_secs > 0 {
                    tracing::debug!(elapsed_secs, "timer finished early");
                    Some(Event::TimerFinishedEarly {
                        elapsed_secs,
                        at: at_ms(now_ms),
                    })
                } else {
                    tracing::debug!("finish requested before any time elapsed");
                    Some(Event::TimerReset { at: at_ms(now_ms) })
                }
            }
            _ => None,
        }
    }

    /// Discard all run state. Valid from any state.
    pub fn reset(&mut self, now_ms: i64) -> Option<Event> {
        self.state = TimerState::Idle;
        Some(Event::TimerReset { at: at_ms(now_ms) })
    }

    /// Change the configured length. Ignored while running or when `minutes`
    /// is outside `[MIN_MINUTES, MAX_MINUTES]`; a paused run is discarded.
    pub fn set_duration(&mut self, minutes: u32, now_ms: i64) -> Option<Event> {
        if matches!(self.state, TimerState::Running { .. }) {
            return None;
        }
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
            return None;
        }
        self.configured_secs = u64::from(minutes) * 60;
        self.state = TimerState::Idle;
        Some(Event::DurationChanged {
            duration_secs: self.configured_secs,
            at: at_ms(now_ms),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` exactly once,
    /// on the first tick at or after the anchor.
    ///
    /// The event is stamped with the anchor, not with `now_ms`: a tick that
    /// arrives late still reports when the run actually ended.
    pub fn tick(&mut self, now_ms: i64) -> Option<Event> {
        match self.state {
            TimerState::Running { anchor_end_ms } if now_ms >= anchor_end_ms => {
                self.state = TimerState::Completed;
                tracing::debug!(
                    elapsed_secs = self.configured_secs,
                    late_ms = now_ms - anchor_end_ms,
                    "timer completed"
                );
                Some(Event::TimerCompleted {
                    elapsed_secs: self.configured_secs,
                    at: at_ms(anchor_end_ms),
                })
            }
            _ => None,
        }
    }
}

/// Parse a user-typed duration in minutes.
pub fn parse_minutes(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    let minutes: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if minutes < i64::from(MIN_MINUTES) || minutes > i64::from(MAX_MINUTES) {
        return Err(ValidationError::DurationOutOfRange {
            got: minutes,
            min: MIN_MINUTES,
            max: MAX_MINUTES,
        });
    }
    Ok(minutes as u32)
}

fn anchor(now_ms: i64, secs: u64) -> i64 {
    now_ms.saturating_add((secs as i64).saturating_mul(1000))
}

fn ceil_secs(ms_left: i64) -> u64 {
    if ms_left <= 0 {
        0
    } else {
        (ms_left.saturating_add(999) / 1000) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(25);
        assert_eq!(engine.status(), TimerStatus::Idle);

        assert!(engine.start(T0).is_some());
        assert_eq!(engine.status(), TimerStatus::Running);

        assert!(engine.pause(T0 + 1_000).is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);

        assert!(engine.resume(T0 + 5_000).is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn remaining_is_derived_from_anchor() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        assert_eq!(engine.remaining_secs(T0), 1500);
        assert_eq!(engine.remaining_secs(T0 + 500), 1500);
        assert_eq!(engine.remaining_secs(T0 + 1_000), 1499);
        assert_eq!(engine.remaining_secs(T0 + 1_000), 1499);
        // A long gap between ticks does not matter.
        assert_eq!(engine.remaining_secs(T0 + 1_000_000), 500);
        assert_eq!(engine.remaining_secs(T0 + 10_000_000), 0);
    }

    #[test]
    fn pause_then_immediate_resume_keeps_remaining() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        let now = T0 + 61_250;
        let before = engine.remaining_secs(now);
        engine.pause(now);
        engine.resume(now);
        assert_eq!(engine.remaining_secs(now), before);
    }

    #[test]
    fn paused_time_does_not_count() {
        let mut engine = TimerEngine::new(1);
        engine.start(T0);
        engine.pause(T0 + 20_000);
        assert_eq!(engine.remaining_secs(T0 + 500_000), 40);
        engine.resume(T0 + 500_000);
        assert!(engine.tick(T0 + 539_999).is_none());
        assert!(engine.tick(T0 + 540_000).is_some());
    }

    #[test]
    fn start_while_paused_resumes() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        engine.pause(T0 + 10_000);
        let event = engine.start(T0 + 20_000);
        assert!(matches!(event, Some(Event::TimerResumed { remaining_secs: 1490, .. })));
        assert_eq!(engine.remaining_secs(T0 + 20_000), 1490);
    }

    #[test]
    fn finish_early_reports_elapsed_and_restores_duration() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        let event = engine.finish_early(T0 + 10_000);
        assert_eq!(event.and_then(|e| e.finished_elapsed()), Some(10));
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(T0 + 10_000), 1500);
    }

    #[test]
    fn finish_early_from_pause_uses_snapshot() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        engine.pause(T0 + 42_000);
        let event = engine.finish_early(T0 + 900_000);
        assert_eq!(event.and_then(|e| e.finished_elapsed()), Some(42));
    }

    #[test]
    fn finish_early_with_nothing_elapsed_emits_no_entry() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        let event = engine.finish_early(T0);
        assert!(matches!(event, Some(Event::TimerReset { .. })));
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(T0), 1500);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut engine = TimerEngine::new(1);
        engine.start(T0);
        assert!(engine.tick(T0 + 59_999).is_none());
        let event = engine.tick(T0 + 60_000);
        assert_eq!(event.and_then(|e| e.finished_elapsed()), Some(60));
        assert_eq!(engine.status(), TimerStatus::Completed);
        assert_eq!(engine.remaining_secs(T0 + 60_000), 0);
        assert!(engine.tick(T0 + 61_000).is_none());
        assert!(engine.tick(T0 + 120_000).is_none());
    }

    #[test]
    fn missed_ticks_still_complete() {
        let mut engine = TimerEngine::new(1);
        engine.start(T0);
        let event = engine.tick(T0 + 3_600_000);
        assert!(matches!(event, Some(Event::TimerCompleted { elapsed_secs: 60, .. })));
    }

    #[test]
    fn completed_only_leaves_through_reset() {
        let mut engine = TimerEngine::new(1);
        engine.start(T0);
        engine.tick(T0 + 60_000);
        assert!(engine.start(T0 + 61_000).is_none());
        assert!(engine.pause(T0 + 61_000).is_none());
        assert!(engine.resume(T0 + 61_000).is_none());
        assert!(engine.finish_early(T0 + 61_000).is_none());
        assert_eq!(engine.status(), TimerStatus::Completed);
        engine.reset(T0 + 62_000);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(T0 + 62_000), 60);
    }

    #[test]
    fn invalid_transitions_are_ignored() {
        let mut engine = TimerEngine::new(25);
        assert!(engine.pause(T0).is_none());
        assert!(engine.resume(T0).is_none());
        assert!(engine.finish_early(T0).is_none());
        assert!(engine.tick(T0).is_none());
        assert_eq!(engine.state(), TimerState::Idle);

        engine.start(T0);
        let running = engine.state();
        assert!(engine.start(T0 + 1_000).is_none());
        assert!(engine.resume(T0 + 1_000).is_none());
        assert_eq!(engine.state(), running);
    }

    #[test]
    fn set_duration_validates_range() {
        let mut engine = TimerEngine::new(25);
        assert!(engine.set_duration(0, T0).is_none());
        assert!(engine.set_duration(241, T0).is_none());
        assert_eq!(engine.configured_secs(), 1500);

        assert!(engine.set_duration(240, T0).is_some());
        assert_eq!(engine.configured_secs(), 240 * 60);
        assert!(engine.set_duration(1, T0).is_some());
        assert_eq!(engine.remaining_secs(T0), 60);
    }

    #[test]
    fn set_duration_rejected_while_running() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        assert!(engine.set_duration(30, T0 + 1_000).is_none());
        assert_eq!(engine.configured_secs(), 1500);
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn set_duration_while_paused_discards_the_run() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        engine.pause(T0 + 30_000);
        assert!(engine.set_duration(60, T0 + 40_000).is_some());
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(T0 + 40_000), 3600);
    }

    #[test]
    fn late_tick_completes_at_anchor() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        let ten_hours = 10 * 3_600_000;
        match engine.tick(T0 + ten_hours) {
            Some(Event::TimerCompleted { elapsed_secs, at }) => {
                assert_eq!(elapsed_secs, 1500);
                assert_eq!(at.timestamp_millis(), T0 + 1_500_000);
            }
            other => panic!("Expected TimerCompleted, got {other:?}"),
        }
    }

    #[test]
    fn late_tick_after_pause_completes_at_resumed_anchor() {
        let mut engine = TimerEngine::new(1);
        engine.start(T0);
        engine.pause(T0 + 20_000);
        engine.resume(T0 + 120_000);
        // 40s left at resume, so the run ended 40s after it.
        match engine.tick(T0 + 3_600_000) {
            Some(Event::TimerCompleted { at, .. }) => {
                assert_eq!(at.timestamp_millis(), T0 + 160_000);
            }
            other => panic!("Expected TimerCompleted, got {other:?}"),
        }
    }

    #[test]
    fn new_clamps_out_of_range_minutes() {
        assert_eq!(TimerEngine::new(0).configured_minutes(), MIN_MINUTES);
        assert_eq!(TimerEngine::new(1_000).configured_minutes(), MAX_MINUTES);
    }

    #[test]
    fn parse_minutes_rejects_bad_input() {
        assert_eq!(parse_minutes(" 45 "), Ok(45));
        assert!(matches!(parse_minutes("abc"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(parse_minutes("2.5"), Err(ValidationError::NotANumber(_))));
        assert!(matches!(
            parse_minutes("0"),
            Err(ValidationError::DurationOutOfRange { got: 0, .. })
        ));
        assert!(matches!(
            parse_minutes("-5"),
            Err(ValidationError::DurationOutOfRange { got: -5, .. })
        ));
        assert!(parse_minutes("241").is_err());
    }

    #[test]
    fn engine_survives_serialization() {
        let mut engine = TimerEngine::new(25);
        engine.start(T0);
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, engine);
        assert_eq!(restored.remaining_secs(T0 + 5_000), 1495);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(25);
        match engine.snapshot(T0) {
            Event::StateSnapshot {
                state,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(state, TimerStatus::Idle);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(total_secs, 1500);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
