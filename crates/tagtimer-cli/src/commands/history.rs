use chrono::Local;
use clap::Subcommand;
use serde::Serialize;
use tagtimer_core::activity::{format_duration, sorted_newest_first, HistorySummary};
use tagtimer_core::{Database, EntryStore, Event, TimeEntry};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List sessions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a session by id
    Delete {
        id: String,
    },
    /// Total tracked time
    Total,
}

#[derive(Serialize)]
struct HistoryOutput<'a> {
    summary: HistorySummary,
    entries: Vec<&'a TimeEntry>,
}

pub fn run(action: HistoryAction) -> CliResult {
    let db = Database::open()?;
    let mut store = EntryStore::load(&db);

    match action {
        HistoryAction::List { json } => {
            let summary = HistorySummary::of(store.list());
            let entries = sorted_newest_first(store.list());
            if json {
                return print_json(&HistoryOutput { summary, entries });
            }
            if entries.is_empty() {
                println!("no sessions yet");
                return Ok(());
            }
            println!("TOTAL: {} across {} sessions", format_duration(summary.total_secs), summary.count);
            for entry in entries {
                println!("{}", render_line(entry));
            }
        }
        HistoryAction::Delete { id } => {
            if store.delete(&id) {
                print_json(&Event::EntryDeleted {
                    id,
                    at: chrono::Utc::now(),
                })?;
            } else {
                eprintln!("no session with id {id}");
            }
        }
        HistoryAction::Total => {
            print_json(&HistorySummary::of(store.list()))?;
        }
    }
    Ok(())
}

fn render_line(entry: &TimeEntry) -> String {
    let start = entry.started_at().with_timezone(&Local);
    let end = entry.ended_at().with_timezone(&Local);
    let tags = if entry.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", entry.tags.join(", "))
    };
    format!(
        "{}  {}-{}  {:>12}{}  {}",
        start.format("%b %-d, %Y"),
        start.format("%H:%M"),
        end.format("%H:%M"),
        format_duration(entry.duration),
        tags,
        entry.id
    )
}
