mod engine;
mod scheduler;

pub use engine::{
    parse_minutes, TimerEngine, TimerState, TimerStatus, DEFAULT_MINUTES, MAX_MINUTES,
    MIN_MINUTES,
};
pub use scheduler::{Scheduler, Wake};
