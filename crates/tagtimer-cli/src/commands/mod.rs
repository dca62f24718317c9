pub mod activity;
pub mod config;
pub mod entry;
pub mod history;
pub mod timer;

use tagtimer_core::{Database, KeyValueStore, PendingSession, TimerEngine};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

const ENGINE_KEY: &str = "timer_engine";
const PENDING_KEY: &str = "pending_session";

/// Engine state left by the previous invocation, or a fresh idle engine.
fn load_engine(db: &Database, default_minutes: u32) -> TimerEngine {
    if let Ok(Some(json)) = db.get(ENGINE_KEY) {
        match serde_json::from_str::<TimerEngine>(&json) {
            Ok(engine) => return engine,
            Err(e) => tracing::warn!(error = %e, "discarding unreadable timer state"),
        }
    }
    TimerEngine::new(default_minutes)
}

fn save_engine(db: &Database, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.set(ENGINE_KEY, &json)?;
    Ok(())
}

fn store_pending(db: &Database, pending: &PendingSession) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(pending)?;
    db.set(PENDING_KEY, &json)?;
    Ok(())
}

fn load_pending(db: &Database) -> Option<PendingSession> {
    let json = db.get(PENDING_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

fn clear_pending(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    db.remove(PENDING_KEY)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
