//! The entry collection and its persistence.
//!
//! Entries are kept in insertion order and written back as one JSON list after
//! every mutation. Storage problems never surface to the caller: a bad or
//! missing list loads as empty, and a failed write leaves the in-memory change
//! in place. Both are logged.

use super::kv::KeyValueStore;
use crate::session::TimeEntry;

/// Key the serialized entry list lives under.
pub const ENTRIES_KEY: &str = "time-entries";

pub struct EntryStore<K: KeyValueStore> {
    kv: K,
    entries: Vec<TimeEntry>,
}

impl<K: KeyValueStore> EntryStore<K> {
    /// Restore the collection from `kv`, falling back to empty.
    pub fn load(kv: K) -> Self {
        let entries = match kv.get(ENTRIES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<TimeEntry>>(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, "stored entries are unreadable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored entries, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = entries.len(), "entries loaded");
        Self { kv, entries }
    }

    pub fn append(&mut self, entry: TimeEntry) {
        tracing::info!(id = %entry.id, duration = entry.duration, "entry recorded");
        self.entries.push(entry);
        self.persist();
    }

    /// Remove the entry with `id`. Returns false (and writes nothing) when
    /// there is no such entry.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return false;
        }
        tracing::info!(id, "entry deleted");
        self.persist();
        true
    }

    /// All entries in insertion order.
    pub fn list(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize entries");
                return;
            }
        };
        if let Err(e) = self.kv.set(ENTRIES_KEY, &json) {
            tracing::warn!(error = %e, "failed to save entries");
        }
    }
}
