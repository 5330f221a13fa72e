use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A broadcast value as carried in the `message` field
pub type Value = i64;

/// Deduplicating set of every value this node has seen.
///
/// The set only grows. `insert` is the atomic check-and-set unit: the
/// membership test and the insertion happen under one lock, so among any
/// number of concurrent `insert(v)` calls exactly one reports the value as new.
#[derive(Debug, Default)]
pub struct ValueStore {
    values: Mutex<HashSet<Value>>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere cannot leave a HashSet half-inserted, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, HashSet<Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, value: Value) -> bool {
        self.lock().contains(&value)
    }

    /// Returns true iff this call added the value
    pub fn insert(&self, value: Value) -> bool {
        self.lock().insert(value)
    }

    /// Point-in-time copy of all stored values, in no particular order
    pub fn snapshot(&self) -> Vec<Value> {
        self.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
