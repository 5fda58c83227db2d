use crate::error::{Result, WeatherError};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Condvar, Mutex, PoisonError};

fn poisoned<T>(_: PoisonError<T>) -> WeatherError {
    WeatherError::Lock("key lock set poisoned".to_string())
}

/// Mutual exclusion per key: holders of different keys never wait on each
/// other, holders of the same key run one at a time.
pub struct KeyLocks<K> {
    held: Mutex<HashSet<K>>,
    released: Condvar,
}

impl<K: Eq + Hash + Clone> KeyLocks<K> {
    pub fn new() -> Self {
        Self {
            held: Mutex::new(HashSet::new()),
            released: Condvar::new(),
        }
    }

    /// Block until `key` is free, then hold it until the guard drops
    pub fn acquire(&self, key: K) -> Result<KeyGuard<'_, K>> {
        let mut held = self.held.lock().map_err(poisoned)?;
        while held.contains(&key) {
            held = self.released.wait(held).map_err(poisoned)?;
        }
        held.insert(key.clone());

        Ok(KeyGuard { locks: self, key })
    }

    /// Number of keys currently held
    #[cfg(test)]
    pub fn held(&self) -> usize {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct KeyGuard<'a, K: Eq + Hash + Clone> {
    locks: &'a KeyLocks<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> Drop for KeyGuard<'_, K> {
    fn drop(&mut self) {
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
        self.locks.released.notify_all();
    }
}
