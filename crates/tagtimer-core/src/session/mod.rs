//! Session recording: from a finished timer run plus tags to a [`TimeEntry`].

mod cue;
mod entry;
mod recorder;
mod tags;

pub use cue::{notify, CompletionCue, Silent, TerminalBell};
pub use entry::TimeEntry;
pub use recorder::{PendingSession, SessionRecorder};
pub use tags::TagSet;
