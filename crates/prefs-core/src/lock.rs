//! Exclusion domain for list read-modify-write sequences.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// How mutation exclusion is partitioned across keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// One process-wide lock shared by every key.
    #[default]
    Global,
    /// One lock per key name, created on first use.
    PerKey,
}

/// Serializes read-modify-write sequences.
///
/// Acquisition is scoped to [`with_lock`](MutationLock::with_lock): the lock
/// is released when the closure returns, errors, or panics. Poisoning is
/// ignored because the guarded state lives in the durable store, not in the
/// mutex; a panicked sequence either persisted its blob or it did not.
#[derive(Debug)]
pub struct MutationLock {
    mode: LockMode,
    global: Mutex<()>,
    per_key: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MutationLock {
    pub fn new(mode: LockMode) -> Self {
        Self {
            mode,
            global: Mutex::new(()),
            per_key: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Run `f` while holding the exclusion domain for `name`.
    pub fn with_lock<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        match self.mode {
            LockMode::Global => {
                let _guard = self.global.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
            LockMode::PerKey => {
                let slot = self.slot(name);
                let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
        }
    }

    /// Number of per-key locks created so far (always 0 in global mode).
    pub fn domain_count(&self) -> usize {
        self.per_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, name: &str) -> Arc<Mutex<()>> {
        let mut slots = self.per_key.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_default())
    }
}

impl Default for MutationLock {
    fn default() -> Self {
        Self::new(LockMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{Barrier, Mutex as StdMutex};
    use std::thread;

    /// Non-atomic increment: read, yield, write. Only exact under exclusion.
    fn racy_increments(lock: &MutationLock, name: &str, cell: &StdMutex<u64>, n: usize) {
        for _ in 0..n {
            lock.with_lock(name, || {
                let v = *cell.lock().unwrap();
                thread::yield_now();
                *cell.lock().unwrap() = v + 1;
            });
        }
    }

    #[test]
    fn global_lock_excludes_across_names() {
        let lock = Arc::new(MutationLock::new(LockMode::Global));
        let cell = Arc::new(StdMutex::new(0u64));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let lock = Arc::clone(&lock);
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    let name = if i % 2 == 0 { "Long1" } else { "Long2" };
                    racy_increments(&lock, name, &cell, 500);
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(*cell.lock().unwrap(), 2000);
        assert_eq!(lock.domain_count(), 0);
    }

    #[test]
    fn per_key_lock_excludes_same_name() {
        let lock = Arc::new(MutationLock::new(LockMode::PerKey));
        let cell = Arc::new(StdMutex::new(0u64));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let cell = Arc::clone(&cell);
                thread::spawn(move || racy_increments(&lock, "Long1", &cell, 500))
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(*cell.lock().unwrap(), 2000);
        assert_eq!(lock.domain_count(), 1);
    }

    #[test]
    fn per_key_lock_lets_distinct_names_overlap() {
        // Both closures must be inside their locks at the same time to pass
        // the barrier; a shared lock would deadlock here.
        let lock = Arc::new(MutationLock::new(LockMode::PerKey));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["Long1", "Long2"]
            .into_iter()
            .map(|name| {
                let lock = Arc::clone(&lock);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || lock.with_lock(name, || barrier.wait()))
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(lock.domain_count(), 2);
    }

    #[test]
    fn returns_closure_result() {
        let lock = MutationLock::default();
        assert_eq!(lock.mode(), LockMode::Global);
        let r: Result<u8, &str> = lock.with_lock("k", || Err("boom"));
        assert_eq!(r, Err("boom"));
        assert_eq!(lock.with_lock("k", || 5), 5);
    }

    #[test]
    fn released_after_panic() {
        for mode in [LockMode::Global, LockMode::PerKey] {
            let lock = MutationLock::new(mode);
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                lock.with_lock("k", || panic!("mutation failed"))
            }));
            assert!(result.is_err());
            // Must not deadlock or propagate the poison.
            assert_eq!(lock.with_lock("k", || 1), 1);
        }
    }
}
