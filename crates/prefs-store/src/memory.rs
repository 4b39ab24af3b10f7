use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::DurableStore;
use crate::value::Value;

/// In-memory, HashMap-based durable store.
///
/// Intended for tests and embedding. Values live behind a `RwLock`; each
/// `get`/`set` takes the lock independently, so a get-then-set pair is not
/// atomic (matching every other backend).
pub struct InMemoryDurableStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryDurableStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of names currently stored.
    pub fn len(&self) -> usize {
        self.values.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every stored value (an external wipe).
    pub fn clear(&self) -> StoreResult<()> {
        let mut map = self.values.write().map_err(poisoned)?;
        map.clear();
        Ok(())
    }

    /// Return a sorted list of all stored names.
    pub fn names(&self) -> StoreResult<Vec<String>> {
        let map = self.values.read().map_err(poisoned)?;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Default for InMemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for InMemoryDurableStore {
    fn get(&self, name: &str) -> StoreResult<Option<Value>> {
        let map = self.values.read().map_err(poisoned)?;
        Ok(map.get(name).cloned())
    }

    fn set(&self, name: &str, value: Value) -> StoreResult<()> {
        let mut map = self.values.write().map_err(poisoned)?;
        map.insert(name.to_string(), value);
        Ok(())
    }

    fn contains(&self, name: &str) -> StoreResult<bool> {
        let map = self.values.read().map_err(poisoned)?;
        Ok(map.contains_key(name))
    }
}

impl std::fmt::Debug for InMemoryDurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDurableStore")
            .field("value_count", &self.len())
            .finish()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Core get / set
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get_string() {
        let store = InMemoryDurableStore::new();
        store.set_string("greeting", "hello").unwrap();
        assert_eq!(store.get_string("greeting", "").unwrap(), "hello");
    }

    #[test]
    fn set_and_get_int() {
        let store = InMemoryDurableStore::new();
        store.set_int("count", 42).unwrap();
        assert_eq!(store.get_int("count", 0).unwrap(), 42);
    }

    #[test]
    fn missing_values_use_default() {
        let store = InMemoryDurableStore::new();
        assert_eq!(store.get_int("absent", 0).unwrap(), 0);
        assert_eq!(store.get_int("absent", -9).unwrap(), -9);
        assert_eq!(store.get_string("absent", "[]").unwrap(), "[]");
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn set_overwrites() {
        let store = InMemoryDurableStore::new();
        store.set_int("n", 1).unwrap();
        store.set_int("n", 2).unwrap();
        assert_eq!(store.get_int("n", 0).unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Kind checking
    // -----------------------------------------------------------------------

    #[test]
    fn int_read_of_string_is_type_mismatch() {
        let store = InMemoryDurableStore::new();
        store.set_string("blob", "[1]").unwrap();
        let err = store.get_int("blob", 0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: "int", found: "string", .. }
        ));
    }

    #[test]
    fn string_read_of_int_is_type_mismatch() {
        let store = InMemoryDurableStore::new();
        store.set_int("n", 5).unwrap();
        let err = store.get_string("n", "").unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: "string", found: "int", .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn contains_and_clear() {
        let store = InMemoryDurableStore::new();
        assert!(store.is_empty());
        store.set_int("a", 1).unwrap();
        assert!(store.contains("a").unwrap());
        assert!(!store.contains("b").unwrap());

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!store.contains("a").unwrap());
    }

    #[test]
    fn names_are_sorted() {
        let store = InMemoryDurableStore::new();
        store.set_int("b", 1).unwrap();
        store.set_int("a", 1).unwrap();
        store.set_string("c", "x").unwrap();
        assert_eq!(store.names().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn arc_store_delegates() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryDurableStore::new());
        store.set_int("shared", 3).unwrap();
        let cloned = Arc::clone(&store);
        assert_eq!(cloned.get_int("shared", 0).unwrap(), 3);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDurableStore::new();
        store.set_int("x", 1).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDurableStore"));
        assert!(debug.contains("value_count"));
    }

    // -----------------------------------------------------------------------
    // Concurrent access
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_independent_names_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryDurableStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let name = format!("slot-{i}");
                    for v in 0..100 {
                        store.set_int(&name, v).unwrap();
                    }
                    assert_eq!(store.get_int(&name, -1).unwrap(), 99);
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.len(), 8);
    }
}
