//! Cancelable completion wake-ups.
//!
//! A host that does not want to poll `tick()` on a fixed cadence arms a
//! [`Scheduler`] for the engine's anchor instant and ticks the engine when the
//! wake arrives. At most one wake is pending at a time: arming again or
//! cancelling aborts the previous task. Each wake carries the generation it was
//! armed under, and [`Scheduler::accept`] rejects anything older, so a wake
//! already sitting in the channel when the timer was paused or reset can never
//! complete a later run.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::engine::TimerEngine;

/// Delivered on the scheduler's channel when an armed delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    generation: u64,
}

#[derive(Debug)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Wake>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl Scheduler {
    /// Create a scheduler and the receiving end of its wake channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Wake>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                pending: None,
                generation: 0,
            },
            rx,
        )
    }

    /// Arm a wake `delay` from now, replacing any pending one.
    /// Must be called from within a tokio runtime.
    pub fn schedule_in(&mut self, delay: Duration) -> u64 {
        self.cancel();
        let generation = self.generation;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Wake { generation });
        }));
        generation
    }

    /// Arm a wake for the absolute instant `at_ms`.
    pub fn schedule_at(&mut self, at_ms: i64, now_ms: i64) -> u64 {
        let delay = u64::try_from(at_ms.saturating_sub(now_ms)).unwrap_or(0);
        self.schedule_in(Duration::from_millis(delay))
    }

    /// Drop the pending wake, if any. Wakes already delivered become stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Arm for a running engine's anchor, cancel otherwise.
    /// Call after every transition.
    pub fn follow(&mut self, engine: &TimerEngine, now_ms: i64) {
        match engine.anchor_end_ms() {
            Some(anchor_end_ms) => {
                self.schedule_at(anchor_end_ms, now_ms);
            }
            None => self.cancel(),
        }
    }

    /// Returns true if `wake` belongs to the currently armed delay, consuming it.
    pub fn accept(&mut self, wake: Wake) -> bool {
        if self.pending.is_some() && wake.generation == self.generation {
            self.pending = None;
            true
        } else {
            tracing::debug!(
                stale = wake.generation,
                current = self.generation,
                "ignoring stale wake"
            );
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
