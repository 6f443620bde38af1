use std::cell::RefCell;
use std::collections::HashMap;

use super::storage::{StoragePort, StorageResult};

/// Process-local storage. Everything is lost on exit, which is exactly what
/// the `memory` backend and the tests want.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a single key, handy for starting a store from a known snapshot.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Copy of the raw value under `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("teams").unwrap(), None);
        storage.set("teams", "[]").unwrap();
        assert_eq!(storage.get("teams").unwrap().as_deref(), Some("[]"));
        storage.set("teams", "[1]").unwrap();
        assert_eq!(storage.raw("teams").as_deref(), Some("[1]"));
        storage.remove("teams").unwrap();
        storage.remove("teams").unwrap();
        assert_eq!(storage.get("teams").unwrap(), None);
    }
}
