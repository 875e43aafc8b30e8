//! Keyed trailing-edge debouncer driven by an explicit clock.

use crate::Instant;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Coalesces repeated requests per key into one, fired `delay` after the
/// last request.
///
/// Nothing runs on its own: the owner calls [`Debouncer::due`] from its tick
/// and acts on the returned keys.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Request `key`; pushes its deadline back to `now + delay`.
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.delay);
    }

    /// Keys whose deadline has passed. They are no longer pending.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let ready: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &ready {
            self.deadlines.remove(key);
        }
        ready
    }

    /// Drop a pending request, returning whether one existed.
    ///
    /// Used before forcing the work synchronously so it does not fire again.
    pub fn flush(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Drop every pending request and return their keys.
    pub fn flush_now(&mut self) -> Vec<K> {
        self.deadlines.drain().map(|(key, _)| key).collect()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Drop all pending requests without reporting them.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
