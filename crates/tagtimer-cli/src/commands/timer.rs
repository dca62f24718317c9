use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use tagtimer_core::session::{notify, CompletionCue, Silent, TerminalBell};
use tagtimer_core::timer::parse_minutes;
use tagtimer_core::{
    Clock, Config, Database, EntryStore, Event, PendingSession, Scheduler, SessionRecorder,
    SystemClock, TagSet, TimerEngine, TimerStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_engine, load_pending, print_json, save_engine, store_pending, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown (continues a paused one)
    Start,
    /// Pause the running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop now and keep the time tracked so far
    Finish,
    /// Discard the current run
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Set the timer length in minutes (1-240)
    Duration {
        /// Minutes
        minutes: String,
    },
    /// Use one of the configured preset lengths
    Preset {
        /// Position in the preset list, starting at 1
        number: usize,
    },
    /// Run the countdown in the foreground and record the session at the end
    Run {
        /// Override the timer length for this run
        #[arg(long)]
        minutes: Option<String>,
    },
}

fn cue(config: &Config) -> Box<dyn CompletionCue> {
    if config.notifications.bell {
        Box::new(TerminalBell)
    } else {
        Box::new(Silent)
    }
}

/// Turn a terminal event into a pending session waiting for tags.
///
/// Only one session can wait at a time. One that was never saved or skipped
/// is recorded without tags before the new one takes its place.
fn hold_for_tags(db: &Database, event: &Event) -> CliResult {
    let Some(pending) = PendingSession::from_event(event) else {
        return Ok(());
    };
    if let Some(unrecorded) = load_pending(db) {
        let entry = SessionRecorder::new().skip(&unrecorded);
        tracing::info!(id = %entry.id, "recording untagged session before holding the next one");
        eprintln!(
            "previous session ({}s) was never tagged; recorded it without tags as {}",
            entry.duration, entry.id
        );
        let mut store = EntryStore::load(db);
        store.append(entry);
    }
    store_pending(db, &pending)?;
    eprintln!("session finished: record it with `tagtimer entry save [TAG...]` or `tagtimer entry skip`");
    Ok(())
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let db = Database::open()?;
    let clock = SystemClock;
    let mut engine = load_engine(&db, config.timer.default_minutes);

    let action = match action {
        TimerAction::Run { minutes } => {
            if let Some(minutes) = minutes {
                let minutes = parse_minutes(&minutes)?;
                if engine.set_duration(minutes, clock.now_ms()).is_none() {
                    return Err("cannot change the duration while the timer is running".into());
                }
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            return runtime.block_on(foreground(&db, config, engine));
        }
        other => other,
    };

    // A run that ended while nobody was looking completes now. `status`
    // reports it as its result; other actions mention it on stderr so stdout
    // still carries a single JSON document.
    let completed = engine.tick(clock.now_ms());
    if let Some(event) = &completed {
        notify(cue(config).as_ref());
        hold_for_tags(&db, event)?;
        engine.reset(clock.now_ms());
        if !matches!(action, TimerAction::Status) {
            if let Event::TimerCompleted { at, .. } = event {
                let local = at.with_timezone(&chrono::Local);
                eprintln!("previous run completed at {}", local.format("%H:%M:%S"));
            }
        }
    }

    let now = clock.now_ms();
    let event = match action {
        TimerAction::Start => engine.start(now),
        TimerAction::Pause => engine.pause(now),
        TimerAction::Resume => engine.resume(now),
        TimerAction::Finish => engine.finish_early(now),
        TimerAction::Reset => engine.reset(now),
        TimerAction::Status => completed,
        TimerAction::Duration { minutes } => {
            let minutes = parse_minutes(&minutes)?;
            if engine.status() == TimerStatus::Running {
                return Err("cannot change the duration while the timer is running".into());
            }
            engine.set_duration(minutes, now)
        }
        TimerAction::Preset { number } => {
            let minutes = config.preset(number.saturating_sub(1))?;
            if engine.status() == TimerStatus::Running {
                return Err("cannot change the duration while the timer is running".into());
            }
            engine.set_duration(minutes, now)
        }
        TimerAction::Run { .. } => unreachable!("handled above"),
    };

    match event {
        Some(event) => {
            print_json(&event)?;
            if matches!(event, Event::TimerFinishedEarly { .. }) {
                hold_for_tags(&db, &event)?;
            }
        }
        None => print_json(&engine.snapshot(now))?,
    }

    save_engine(&db, &engine)?;
    Ok(())
}

/// Foreground countdown. Completion is driven by the scheduler's wake for the
/// anchor instant; the redraw interval only re-renders and ticks as a fallback.
async fn foreground(db: &Database, config: &Config, mut engine: TimerEngine) -> CliResult {
    let clock = SystemClock;
    let (mut scheduler, mut wakes) = Scheduler::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = tokio::time::interval(Duration::from_millis(
        config.timer.tick_interval_ms.max(10),
    ));
    let mut stdin_open = true;
    let mut shown: Option<(u64, TimerStatus)> = None;

    engine.start(clock.now_ms());
    scheduler.follow(&engine, clock.now_ms());
    save_engine(db, &engine)?;
    eprintln!("[p]ause  [r]esume  [f]inish  [q]uit");

    let finished = loop {
        tokio::select! {
            Some(wake) = wakes.recv() => {
                if scheduler.accept(wake) {
                    let now = clock.now_ms();
                    match engine.tick(now) {
                        Some(event) => break Some(event),
                        // Woke a little early; arm again for the anchor.
                        None => scheduler.follow(&engine, now),
                    }
                }
            }
            _ = redraw.tick() => {
                let now = clock.now_ms();
                if let Some(event) = engine.tick(now) {
                    scheduler.cancel();
                    break Some(event);
                }
                let current = (engine.remaining_secs(now), engine.status());
                if shown != Some(current) {
                    draw(current.0, current.1);
                    shown = Some(current);
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(command) = line? else {
                    stdin_open = false;
                    continue;
                };
                let now = clock.now_ms();
                match command.trim() {
                    "p" => { engine.pause(now); }
                    "r" => { engine.resume(now); }
                    "f" => {
                        let event = engine.finish_early(now);
                        scheduler.cancel();
                        break event.filter(|e| matches!(e, Event::TimerFinishedEarly { .. }));
                    }
                    "q" => {
                        engine.reset(now);
                        scheduler.cancel();
                        break None;
                    }
                    _ => {}
                }
                scheduler.follow(&engine, now);
                save_engine(db, &engine)?;
            }
        }
    };
    eprintln!();

    let Some(event) = finished else {
        engine.reset(clock.now_ms());
        save_engine(db, &engine)?;
        eprintln!("nothing recorded");
        return Ok(());
    };
    if matches!(event, Event::TimerCompleted { .. }) {
        notify(cue(config).as_ref());
    }
    engine.reset(clock.now_ms());
    save_engine(db, &engine)?;

    let Some(pending) = PendingSession::from_event(&event) else {
        return Ok(());
    };

    let tags = if stdin_open {
        prompt_tags(&mut lines).await?
    } else {
        TagSet::new()
    };
    let entry = SessionRecorder::new().record(&pending, tags);
    let mut store = EntryStore::load(db);
    store.append(entry.clone());
    print_json(&entry)
}

/// One tag per line; `-` drops the last one, an empty line finishes.
async fn prompt_tags<R>(lines: &mut tokio::io::Lines<R>) -> Result<TagSet, Box<dyn std::error::Error>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut tags = TagSet::new();
    eprintln!("tags: one per line, '-' removes the last, empty line saves");
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => break,
            "-" => {
                tags.pop_last();
            }
            tag => {
                if !tags.add(tag) {
                    eprintln!("'{tag}' already added");
                }
            }
        }
        eprintln!("  [{}]", tags.as_slice().join(", "));
    }
    Ok(tags)
}

fn draw(remaining_secs: u64, status: TimerStatus) {
    let label = match status {
        TimerStatus::Running => "",
        TimerStatus::Paused => " (paused)",
        TimerStatus::Idle => " (idle)",
        TimerStatus::Completed => " (done)",
    };
    let mut err = std::io::stderr();
    let _ = write!(
        err,
        "\r{:02}:{:02}{label}      ",
        remaining_secs / 60,
        remaining_secs % 60
    );
    let _ = err.flush();
}
