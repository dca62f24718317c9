//! Key-value persistence seam.
//!
//! The entry store and the CLI's engine state only ever read and write whole
//! strings under fixed keys, so anything that can do that can back them.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::DatabaseError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove(&self, key: &str) -> Result<(), DatabaseError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        (**self).remove(key)
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let kv = Self::new();
        kv.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        kv
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let values = self
            .values
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("memory store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("memory store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DatabaseError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("memory store poisoned".into()))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert!(kv.get("k").unwrap().is_none());
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
        kv.remove("k").unwrap();
        assert!(kv.get("k").unwrap().is_none());
    }

    #[test]
    fn references_are_stores_too() {
        let kv = MemoryKv::with_value("k", "v");
        let by_ref: &MemoryKv = &kv;
        assert_eq!(KeyValueStore::get(&by_ref, "k").unwrap().as_deref(), Some("v"));
    }
}
