#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use zeroize::Zeroizing;

use super::{CredentialError, CredentialStore, Secret};

/// In-memory credential store for tests and short-lived processes
///
/// Values live in a `HashMap` behind `Arc<Mutex<>>`, so clones share the same
/// map and every operation is atomic with respect to the others. Stored
/// values are zeroed when replaced, deleted, or when the last clone is
/// dropped. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<Mutex<HashMap<String, Zeroizing<String>>>>,
}

impl MemoryCredentialStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    ///
    /// Useful for debugging and testing.
    pub fn len(&self) -> usize {
        self.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Zeroizing<String>>>, CredentialError> {
        self.inner
            .lock()
            .map_err(|_| CredentialError::Unavailable("credential map lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let mut map = self.lock()?;

        // Replace, never update in place: the old buffer is zeroed on drop.
        map.remove(name);
        map.insert(name.to_string(), Zeroizing::new(value.to_string()));

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Secret>, CredentialError> {
        let map = self.lock()?;

        Ok(map.get(name).map(|value| Secret::new(value.as_str())))
    }

    fn delete(&self, name: &str) -> Result<(), CredentialError> {
        self.lock()?.remove(name);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACCESS_TOKEN, REFRESH_TOKEN};

    #[test]
    fn set_then_get_returns_value() {
        let store = MemoryCredentialStore::new();
        store.set(ACCESS_TOKEN, "t1").expect("set failed");

        let value = store.get(ACCESS_TOKEN).expect("get failed");
        assert_eq!(value.as_ref().map(Secret::expose), Some("t1"));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = MemoryCredentialStore::new();
        store.set(ACCESS_TOKEN, "old").expect("set failed");
        store.set(ACCESS_TOKEN, "new").expect("set failed");

        let value = store.get(ACCESS_TOKEN).expect("get failed");
        assert_eq!(value.as_ref().map(Secret::expose), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_absent_key_is_noop() {
        let store = MemoryCredentialStore::new();
        store.delete(REFRESH_TOKEN).expect("delete of absent key must succeed");
        store.delete(REFRESH_TOKEN).expect("second delete must succeed");
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryCredentialStore::new();
        let clone = store.clone();

        store.set(ACCESS_TOKEN, "shared").expect("set failed");
        assert!(clone.contains(ACCESS_TOKEN).expect("contains failed"));

        clone.delete(ACCESS_TOKEN).expect("delete failed");
        assert!(!store.contains(ACCESS_TOKEN).expect("contains failed"));
    }

    #[test]
    fn names_are_independent() {
        let store = MemoryCredentialStore::new();
        store.set(ACCESS_TOKEN, "a").expect("set failed");
        store.set(REFRESH_TOKEN, "r").expect("set failed");
        store.delete(ACCESS_TOKEN).expect("delete failed");

        assert!(store.get(ACCESS_TOKEN).expect("get failed").is_none());
        assert_eq!(
            store.get(REFRESH_TOKEN).expect("get failed").as_ref().map(Secret::expose),
            Some("r")
        );
    }
}
