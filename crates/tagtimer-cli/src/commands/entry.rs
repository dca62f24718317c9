use clap::Subcommand;
use tagtimer_core::{CoreError, Database, EntryStore, SessionRecorder, TagSet};

use super::{clear_pending, load_pending, print_json, CliResult};

#[derive(Subcommand)]
pub enum EntryAction {
    /// Record the finished session with tags
    Save {
        /// Tags; duplicates and blanks are dropped, commas split
        tags: Vec<String>,
    },
    /// Record the finished session without tags
    Skip,
    /// Show the session waiting to be recorded
    Pending,
}

pub fn run(action: EntryAction) -> CliResult {
    let db = Database::open()?;
    let pending = load_pending(&db).ok_or(CoreError::NoPendingSession)?;
    let recorder = SessionRecorder::new();

    let entry = match action {
        EntryAction::Pending => return print_json(&pending),
        EntryAction::Save { tags } => {
            let tags: TagSet = tags.iter().flat_map(|t| t.split(',')).collect();
            recorder.record(&pending, tags)
        }
        EntryAction::Skip => recorder.skip(&pending),
    };

    let mut store = EntryStore::load(&db);
    store.append(entry.clone());
    clear_pending(&db)?;
    print_json(&entry)
}
