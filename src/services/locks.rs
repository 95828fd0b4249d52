use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Each key maps to its mutex and the number of live claims on it.
type LockTable = Arc<Mutex<HashMap<String, (Arc<AsyncMutex<()>>, usize)>>>;

/// Per-key async mutexes, used to serialize read-modify-write cycles on one
/// identity's session while leaving other identities unaffected.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    table: LockTable,
}

/// One task's claim on a key, taken before waiting and kept while holding.
///
/// Dropping it removes the table entry when no other claim remains, so a
/// waiter cancelled mid-wait cleans up the same way a released holder does.
struct Slot {
    key: String,
    table: LockTable,
    mutex: Arc<AsyncMutex<()>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let last = match table.get_mut(&self.key) {
            Some((_, claims)) => {
                *claims -= 1;
                *claims == 0
            }
            None => false,
        };
        if last {
            table.remove(&self.key);
        }
    }
}

/// Exclusive access to one key. Released on drop.
pub struct KeyedGuard {
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

impl KeyedLocks {
    /// Creates a new, empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds `key`, then takes it.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            let (mutex, claims) = table
                .entry(key.to_string())
                .or_insert_with(|| (Arc::new(AsyncMutex::new(())), 0));
            *claims += 1;
            let mutex = mutex.clone();
            Slot {
                key: key.to_string(),
                table: self.table.clone(),
                mutex,
            }
        };

        let guard = slot.mutex.clone().lock_owned().await;
        KeyedGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
