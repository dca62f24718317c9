//! # tagtimer Core Library
//!
//! Business logic for tagtimer, a countdown timer that records each finished
//! session with free-form tags. Everything is available through the standalone
//! `tagtimer` CLI; the library itself has no terminal or UI dependencies.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine anchored on the
//!   absolute end time. The caller supplies `now` and either polls `tick()` or
//!   arms a [`timer::Scheduler`]
//! - **Session Recording**: Finished runs plus tags become [`TimeEntry`] records
//! - **Storage**: Entry list persisted as JSON in a key-value store (SQLite on
//!   disk), TOML-based configuration
//! - **Activity**: Per-day totals and intensity levels for a heat-map
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionRecorder`]: Builds entries from finished runs
//! - [`EntryStore`]: Ordered entry collection with save-on-change
//! - [`activity::aggregate`]: Day bucketing over a configurable window
//! - [`Config`]: Application configuration management

pub mod activity;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use activity::{ActivityWindow, DayBucket, HistorySummary, IntensityLevel};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use session::{PendingSession, SessionRecorder, TagSet, TimeEntry};
pub use storage::{Config, Database, EntryStore, KeyValueStore, MemoryKv};
pub use timer::{Scheduler, TimerEngine, TimerState, TimerStatus};
